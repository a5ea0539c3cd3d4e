//! Configuration of DQN agent.
use super::DqnModelConfig;
use crate::{cnn::CnnConfig, opt::OptimizerConfig, Device};
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Dqn`](super::Dqn) agent.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DqnConfig {
    /// Architecture and optimizer of the action-value function.
    pub model_config: DqnModelConfig,

    /// Discount factor of the bootstrapped target.
    pub discount_factor: f64,

    /// Random seed of exploration.
    pub seed: u64,

    /// Device on which both networks live.
    pub device: Device,
}

impl Default for DqnConfig {
    fn default() -> Self {
        Self {
            model_config: Default::default(),
            discount_factor: 0.9,
            seed: 42,
            device: Device::Cpu,
        }
    }
}

impl DqnConfig {
    /// Sets the configuration of the model.
    pub fn model_config(mut self, model_config: DqnModelConfig) -> Self {
        self.model_config = model_config;
        self
    }

    /// Sets the architecture of the action-value function.
    pub fn q_config(mut self, v: CnnConfig) -> Self {
        self.model_config = self.model_config.q_config(v);
        self
    }

    /// Sets the optimizer.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.model_config = self.model_config.opt_config(v);
        self
    }

    /// Sets the output dimention of the agent.
    pub fn out_dim(mut self, v: usize) -> Self {
        self.model_config = self.model_config.out_dim(v);
        self
    }

    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets device.
    pub fn device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Loads [`DqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of DQN agent from {:?}", path_);
        Ok(b)
    }

    /// Saves [`DqnConfig`] to YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of DQN agent into {:?}", path_);
        Ok(())
    }
}
