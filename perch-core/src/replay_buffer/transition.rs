use crate::StackedFrames;

/// A recorded interaction `(o_t, a_t, o_t+1, r_t, done_t)`.
///
/// `action` is the index of the taken action in the environment's action set.
/// No-op actions taken while the frame stack warms up are never recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Observation before the action.
    pub state: StackedFrames,

    /// Index of the action in the action set.
    pub action: usize,

    /// Observation after the action.
    pub next_state: StackedFrames,

    /// Clipped reward in `[-1, 1]`.
    pub reward: f32,

    /// `true` if the episode ended with this transition.
    pub done: bool,
}

impl Transition {
    /// Constructs a transition.
    pub fn new(
        state: StackedFrames,
        action: usize,
        next_state: StackedFrames,
        reward: f32,
        done: bool,
    ) -> Self {
        Self {
            state,
            action,
            next_state,
            reward,
            done,
        }
    }
}
