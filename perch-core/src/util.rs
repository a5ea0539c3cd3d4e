//! Utilities.

/// Clips a raw reward into `[-1, 1]`.
pub fn clip_reward(r: f32) -> f32 {
    r.clamp(-1.0, 1.0)
}
