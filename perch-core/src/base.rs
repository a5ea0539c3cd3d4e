//! Core interfaces.
mod agent;
mod env;
mod policy;
pub use agent::Agent;
pub use env::Env;
pub use policy::{Policy, ValueFunction};
