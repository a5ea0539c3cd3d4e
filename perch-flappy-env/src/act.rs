//! Action for [`FlappyEnv`](crate::FlappyEnv).
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
/// Action for [`FlappyEnv`](crate::FlappyEnv).
pub enum FlappyAct {
    /// Pushes the bird up.
    Flap,

    /// Lets the bird fall.
    Idle,
}

impl FlappyAct {
    /// The action set in canonical order.
    pub const ALL: [FlappyAct; 2] = [FlappyAct::Flap, FlappyAct::Idle];

    /// Returns `true` for [`FlappyAct::Flap`].
    pub fn is_flap(&self) -> bool {
        matches!(self, Self::Flap)
    }
}
