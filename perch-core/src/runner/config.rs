//! Configurations of [`Runner`](super::Runner).
use crate::error::PerchError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of a training run.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct TrainerConfig {
    /// Number of transitions in a batch.
    pub batch_size: usize,

    /// Learning starts once the replay memory holds this many transitions.
    pub num_samples_pre: usize,

    /// Capacity of the replay memory.
    pub memory_size: usize,

    /// Step cap of an episode.
    pub max_ep_steps: usize,

    /// Interval of target network synchronization in environment steps.
    pub reset_target: usize,

    /// Environment step at which the exploration rate reaches its floor.
    pub final_exp_frame: usize,

    /// Interval of saving the online network in environment steps.
    pub save_freq: usize,

    /// Interval of the console summary in environment steps.
    pub log_interval: usize,

    /// Where checkpoints are written.
    pub model_dir: String,

    /// Number of stacked frames forming an observation.
    pub frame_stack: usize,

    /// Side length of preprocessed frames.
    pub downscale: u32,

    /// Prefix of the names of metric series.
    pub metrics_prefix: String,

    /// Random seed of replay sampling.
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            num_samples_pre: 30000,
            memory_size: 50000,
            max_ep_steps: 1000000,
            reset_target: 10000,
            final_exp_frame: 100000,
            save_freq: 100000,
            log_interval: 1000,
            model_dir: "./models".to_string(),
            frame_stack: 4,
            downscale: 84,
            metrics_prefix: "DQN_Flappy".to_string(),
            seed: 42,
        }
    }
}

impl TrainerConfig {
    /// Sets the batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the number of transitions collected before learning starts.
    pub fn num_samples_pre(mut self, v: usize) -> Self {
        self.num_samples_pre = v;
        self
    }

    /// Sets the capacity of the replay memory.
    pub fn memory_size(mut self, v: usize) -> Self {
        self.memory_size = v;
        self
    }

    /// Sets the step cap of an episode.
    pub fn max_ep_steps(mut self, v: usize) -> Self {
        self.max_ep_steps = v;
        self
    }

    /// Sets the interval of target synchronization.
    pub fn reset_target(mut self, v: usize) -> Self {
        self.reset_target = v;
        self
    }

    /// Sets the step at which exploration reaches its floor.
    pub fn final_exp_frame(mut self, v: usize) -> Self {
        self.final_exp_frame = v;
        self
    }

    /// Sets the interval of saving the online network.
    pub fn save_freq(mut self, v: usize) -> Self {
        self.save_freq = v;
        self
    }

    /// Sets the interval of the console summary.
    pub fn log_interval(mut self, v: usize) -> Self {
        self.log_interval = v;
        self
    }

    /// Sets the checkpoint directory.
    pub fn model_dir(mut self, v: impl Into<String>) -> Self {
        self.model_dir = v.into();
        self
    }

    /// Sets the number of stacked frames.
    pub fn frame_stack(mut self, v: usize) -> Self {
        self.frame_stack = v;
        self
    }

    /// Sets the side length of preprocessed frames.
    pub fn downscale(mut self, v: u32) -> Self {
        self.downscale = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Checks the values against each other.
    pub fn validate(&self) -> Result<(), PerchError> {
        let positive = [
            ("batch_size", self.batch_size),
            ("memory_size", self.memory_size),
            ("reset_target", self.reset_target),
            ("final_exp_frame", self.final_exp_frame),
            ("save_freq", self.save_freq),
            ("log_interval", self.log_interval),
            ("frame_stack", self.frame_stack),
            ("downscale", self.downscale as usize),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(PerchError::InvalidConfig(format!("{} must be positive", name)));
        }
        if self.batch_size > self.memory_size {
            return Err(PerchError::InvalidConfig(format!(
                "batch_size ({}) exceeds memory_size ({})",
                self.batch_size, self.memory_size
            )));
        }
        if self.num_samples_pre < self.batch_size {
            return Err(PerchError::InvalidConfig(format!(
                "num_samples_pre ({}) is smaller than batch_size ({})",
                self.num_samples_pre, self.batch_size
            )));
        }
        if self.num_samples_pre > self.memory_size {
            return Err(PerchError::InvalidConfig(format!(
                "num_samples_pre ({}) exceeds memory_size ({}), learning would never start",
                self.num_samples_pre, self.memory_size
            )));
        }
        Ok(())
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Configuration of an evaluation run.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct TesterConfig {
    /// Fixed exploration rate.
    pub eps: f64,

    /// Step cap of an episode.
    pub max_ep_steps: usize,

    /// Number of stacked frames forming an observation.
    pub frame_stack: usize,

    /// Side length of preprocessed frames.
    pub downscale: u32,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            eps: 0.01,
            max_ep_steps: 1000000,
            frame_stack: 4,
            downscale: 84,
        }
    }
}

impl TesterConfig {
    /// Sets the exploration rate.
    pub fn eps(mut self, v: f64) -> Self {
        self.eps = v;
        self
    }

    /// Sets the step cap of an episode.
    pub fn max_ep_steps(mut self, v: usize) -> Self {
        self.max_ep_steps = v;
        self
    }

    /// Sets the number of stacked frames.
    pub fn frame_stack(mut self, v: usize) -> Self {
        self.frame_stack = v;
        self
    }

    /// Sets the side length of preprocessed frames.
    pub fn downscale(mut self, v: u32) -> Self {
        self.downscale = v;
        self
    }

    /// Checks the values.
    pub fn validate(&self) -> Result<(), PerchError> {
        if !(0.0..=1.0).contains(&self.eps) {
            return Err(PerchError::InvalidConfig(format!(
                "eps ({}) is not in [0, 1]",
                self.eps
            )));
        }
        if self.frame_stack == 0 || self.downscale == 0 {
            return Err(PerchError::InvalidConfig(
                "frame_stack and downscale must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
