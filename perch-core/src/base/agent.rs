//! Agent.
use super::Policy;
use crate::{record::Record, Transition};
use anyhow::Result;
use std::path::Path;

/// Represents a trainable policy.
pub trait Agent: Policy {
    /// Returns the number of actions.
    fn n_actions(&self) -> usize;

    /// Performs an optimization step on a batch sampled from the replay memory.
    ///
    /// The returned record contains the loss under the key `"loss"`.
    fn opt(&mut self, batch: &[&Transition]) -> Result<Record>;

    /// Copies the parameters of the online network into the target network.
    fn update_target(&mut self) -> Result<()>;

    /// Saves the parameters of the online network to the given file.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Loads the parameters of the online network from the given file.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
