#![warn(missing_docs)]
//! Core components of Deep Q-Network training on pixel observations.
//!
//! The crate is agnostic to the neural network backend and to the game.
//! A game is wrapped as [`Env`], a value network and its optimizer as
//! [`Agent`]. [`Runner`] drives both, turning raw screens into
//! [`StackedFrames`] observations and transitions stored in [`ReplayMemory`].
pub mod error;
pub mod explorer;
pub mod record;
pub mod replay_buffer;
pub mod util;

mod base;
pub use base::{Agent, Env, Policy, ValueFunction};

mod frame;
pub use frame::{FramePreprocessor, FrameStack, GrayFrame, StackedFrames};

pub use explorer::{decay_schedule, EpsilonGreedy};
pub use replay_buffer::{ReplayMemory, ReplayMemoryConfig, Transition};

mod runner;
pub use runner::{CheckpointWriter, Mode, Runner, TesterConfig, TrainerConfig};
