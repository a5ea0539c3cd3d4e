//! Configuration of [`ReplayMemory`](super::ReplayMemory).
use serde::{Deserialize, Serialize};

/// Capacity and sampling seed of [`ReplayMemory`](super::ReplayMemory).
///
/// The trainer derives it from `memory_size` and `seed` of
/// [`TrainerConfig`](crate::TrainerConfig).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ReplayMemoryConfig {
    pub(super) capacity: usize,
    pub(super) seed: u64,
}

impl Default for ReplayMemoryConfig {
    fn default() -> Self {
        Self {
            capacity: 50000,
            seed: 42,
        }
    }
}

impl ReplayMemoryConfig {
    /// Sets the maximum number of transitions kept.
    pub fn capacity(mut self, v: usize) -> Self {
        self.capacity = v;
        self
    }

    /// Sets the seed of batch sampling.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }
}
