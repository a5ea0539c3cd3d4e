//! A side-scrolling flappy-bird game with pixel observations for perch.
//!
//! The screen is 288x512 RGB by default. Actions are [`FlappyAct::Flap`] and
//! [`FlappyAct::Idle`]. Passing a pipe gives +1, crashing into a pipe, the
//! ground or the ceiling gives -5 and ends the episode.
//!
//! ```no_run
//! use anyhow::Result;
//! use perch_core::Env as _;
//! use perch_flappy_env::{FlappyAct, FlappyEnv, FlappyEnvConfig};
//!
//! fn main() -> Result<()> {
//!     let mut env = FlappyEnv::build(&FlappyEnvConfig::default())?;
//!     env.reset()?;
//!     while !env.is_terminal() {
//!         env.act(Some(&FlappyAct::Idle))?;
//!     }
//!     Ok(())
//! }
//! ```
mod act;
mod env;
mod game;
pub use act::FlappyAct;
pub use env::{FlappyEnv, FlappyEnvConfig};
pub use game::FlappyGame;
