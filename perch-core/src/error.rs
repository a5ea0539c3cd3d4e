//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
///
/// [`PerchError::InsufficientFrames`] and [`PerchError::InsufficientSamples`] are
/// precondition violations. The runner is written so that they never occur;
/// if one does, the run is aborted.
#[derive(Error, Debug)]
pub enum PerchError {
    /// The frame stack was read before it held the required number of frames.
    #[error("Insufficient frames: {available} of {required} frames stacked")]
    InsufficientFrames {
        /// Capacity of the frame stack.
        required: usize,
        /// Number of frames pushed since the last reset.
        available: usize,
    },

    /// A batch was requested from a replay memory holding too few transitions.
    #[error("Insufficient samples: requested {requested}, replay memory holds {available}")]
    InsufficientSamples {
        /// Requested batch size.
        requested: usize,
        /// Number of transitions in the replay memory.
        available: usize,
    },

    /// A checkpoint does not match the architecture of the network.
    #[error("Checkpoint format error: parameter {name}, expected {expected}, found {actual}")]
    CheckpointFormat {
        /// Name of the offending parameter.
        name: String,
        /// Shape expected by the constructed network, or `"unexpected"`.
        expected: String,
        /// Shape stored in the checkpoint, or `"missing"`.
        actual: String,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}
