//! Policy.
use crate::StackedFrames;
use anyhow::Result;

/// A policy on stacked-frame observations.
///
/// The returned value is an index into the environment's action set.
pub trait Policy {
    /// Sample an action given an observation and an exploration rate.
    fn sample(&mut self, obs: &StackedFrames, eps: f64) -> Result<usize>;
}

/// Maps an observation to one value estimate per action.
///
/// `input` is the stacked observation scaled to `[0, 1]`
/// (see [`StackedFrames::scaled`]), laid out as `[n_stack, height, width]`.
pub trait ValueFunction {
    /// Returns the value of every action, in the order of the action set.
    fn evaluate(&self, input: &[f32]) -> Result<Vec<f32>>;
}
