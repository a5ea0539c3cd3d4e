//! Environment.
use anyhow::Result;
use image::DynamicImage;
use std::fmt::Debug;

/// A single-agent game with pixel observations and a discrete action set.
///
/// The game itself is outside of this library; implementations wrap it and
/// expose the frame buffer, the reward signal and the episode status.
pub trait Env {
    /// A discrete action of the game.
    type Act: Clone + Debug;

    /// Starts a new episode.
    fn reset(&mut self) -> Result<()>;

    /// Returns `true` if the current episode has ended.
    fn is_terminal(&self) -> bool;

    /// Advances the game with the given action and returns the raw reward.
    ///
    /// `None` is the no-op action, used while the frame stack is warming up.
    fn act(&mut self, act: Option<&Self::Act>) -> Result<f32>;

    /// Returns the current screen.
    fn frame(&self) -> Result<DynamicImage>;

    /// The ordered set of actions. It is queried once, when the agent is constructed.
    fn action_set(&self) -> Vec<Self::Act>;
}
