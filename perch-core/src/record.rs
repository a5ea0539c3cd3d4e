//! Records of metrics and the sinks they are written to.
//!
//! The runner emits a [`Record`] per learning step, keyed by metric name,
//! and hands it to a [`Recorder`]. Recorders are purely observational:
//! an error returned from [`Recorder::write`] is logged by the runner and
//! otherwise ignored.
//!
//! ```rust
//! use perch_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_step("total_steps", 1000);
//! record.insert("DQN_Flappy/loss", RecordValue::Scalar(0.25));
//! assert_eq!(record.get_scalar("DQN_Flappy/loss").unwrap(), 0.25);
//! assert_eq!(record.get_step("total_steps").unwrap(), 1000);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
