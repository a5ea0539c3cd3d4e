//! Deep Q-Network agent implemented with [candle](https://crates.io/crates/candle-core).
pub mod cnn;
pub mod dqn;
pub mod opt;
pub mod util;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
/// It is converted once, when an agent is built, and the resulting device is
/// passed to every network and tensor constructor.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The main GPU device.
    Cuda(usize),
}

impl Device {
    /// Uses a GPU if one is available.
    pub fn cuda_if_available(ordinal: usize) -> Self {
        match candle_core::utils::cuda_is_available() {
            true => Self::Cuda(ordinal),
            false => Self::Cpu,
        }
    }
}

impl TryFrom<Device> for candle_core::Device {
    type Error = candle_core::Error;

    fn try_from(device: Device) -> Result<Self, Self::Error> {
        match device {
            Device::Cpu => Ok(candle_core::Device::Cpu),
            Device::Cuda(n) => candle_core::Device::new_cuda(n),
        }
    }
}
