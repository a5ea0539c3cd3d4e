//! Replay memory of transitions.
mod base;
mod config;
mod transition;
pub use base::ReplayMemory;
pub use config::ReplayMemoryConfig;
pub use transition::Transition;
