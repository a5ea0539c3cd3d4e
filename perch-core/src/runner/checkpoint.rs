//! Periodic checkpoints of the online network.
use crate::Agent;
use anyhow::Result;
use chrono::{DateTime, Local};
use log::{info, warn};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// A failed save is attempted this many times in total before it is skipped.
const SAVE_ATTEMPTS: usize = 2;

/// Writes timestamped, step-tagged checkpoints into a directory.
///
/// Saving never fails the caller: a failed write is retried once, then
/// logged and skipped.
pub struct CheckpointWriter {
    model_dir: PathBuf,
}

impl CheckpointWriter {
    /// Constructs a writer for `model_dir`. The directory is created on demand.
    pub fn new(model_dir: impl AsRef<Path>) -> Self {
        Self {
            model_dir: model_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the checkpoint taken at `steps` at time `now`.
    pub fn path(&self, steps: usize, now: DateTime<Local>) -> PathBuf {
        self.model_dir.join(format!(
            "params_dqn_{}_{}steps.safetensors",
            now.format("%Y-%m-%d-%H-%M"),
            steps
        ))
    }

    /// Saves the online network of `agent`.
    ///
    /// Returns the path of the checkpoint, or `None` if it was skipped.
    pub fn save<A: Agent + ?Sized>(&self, agent: &A, steps: usize) -> Option<PathBuf> {
        let path = self.path(steps, Local::now());
        info!("Saving model at {} steps", steps);

        for attempt in 1..=SAVE_ATTEMPTS {
            match self.try_save(agent, &path) {
                Ok(()) => {
                    info!("Saved the model in {:?}", &path);
                    return Some(path);
                }
                Err(e) => warn!(
                    "Failed to save the model in {:?} (attempt {}/{}): {}",
                    &path, attempt, SAVE_ATTEMPTS, e
                ),
            }
        }

        warn!("Skipped the checkpoint at {} steps", steps);
        None
    }

    fn try_save<A: Agent + ?Sized>(&self, agent: &A, path: &Path) -> Result<()> {
        fs::create_dir_all(&self.model_dir)?;
        agent.save_params(path)
    }
}
