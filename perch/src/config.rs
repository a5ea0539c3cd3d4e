//! Configuration of a run, stored as a single YAML file.
use anyhow::Result;
use log::info;
use perch_candle_agent::{cnn::CnnConfig, dqn::DqnConfig};
use perch_core::TrainerConfig;
use perch_flappy_env::FlappyEnvConfig;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configurations of the environment, the agent and the trainer.
///
/// Missing sections fall back to their defaults.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PerchConfig {
    pub env: FlappyEnvConfig,
    pub agent: DqnConfig,
    pub trainer: TrainerConfig,
}

impl PerchConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let rdr = BufReader::new(File::open(path)?);
        let config = serde_yaml::from_reader(rdr)?;
        info!("Load config from {:?}", path_);
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config into {:?}", path_);
        Ok(())
    }

    /// Makes the input and output of the network agree with the frame stack,
    /// the preprocessed frame size and the action set.
    pub fn align_agent(mut self, n_actions: usize) -> Self {
        let q_config = CnnConfig::new(
            self.trainer.frame_stack,
            self.trainer.downscale as usize,
            n_actions,
        );
        self.agent = self.agent.q_config(q_config);
        self
    }
}
