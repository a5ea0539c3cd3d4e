//! Configuration of [`FlappyEnv`](super::FlappyEnv).
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
/// Configurations of [`FlappyEnv`](super::FlappyEnv).
pub struct FlappyEnvConfig {
    /// Width of the screen.
    pub width: u32,

    /// Height of the screen.
    pub height: u32,

    /// Vertical size of the opening between pipes.
    pub pipe_gap: u32,

    /// Game frames advanced per action.
    pub frame_skip: usize,

    /// Random seed of pipe placement.
    pub seed: u64,
}

impl Default for FlappyEnvConfig {
    fn default() -> Self {
        Self {
            width: 288,
            height: 512,
            pipe_gap: 100,
            frame_skip: 2,
            seed: 42,
        }
    }
}

impl FlappyEnvConfig {
    /// Sets the size of the opening between pipes.
    pub fn pipe_gap(mut self, v: u32) -> Self {
        self.pipe_gap = v;
        self
    }

    /// Sets the number of game frames per action.
    pub fn frame_skip(mut self, v: usize) -> Self {
        self.frame_skip = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    pub(super) fn validate(&self) -> Result<()> {
        if self.frame_skip == 0 {
            return Err(anyhow!("frame_skip must be positive"));
        }
        if self.width < 100 || self.height < 200 {
            return Err(anyhow!(
                "screen of {}x{} is too small",
                self.width,
                self.height
            ));
        }
        if self.pipe_gap as f32 > self.height as f32 * 0.6 || self.pipe_gap < 30 {
            return Err(anyhow!("pipe_gap {} does not fit the screen", self.pipe_gap));
        }
        Ok(())
    }
}
