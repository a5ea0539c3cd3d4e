use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Cnn`](super::Cnn).
pub struct CnnConfig {
    /// Number of stacked frames, the input channels.
    pub n_stack: usize,

    /// Height of input frames.
    pub height: usize,

    /// Width of input frames.
    pub width: usize,

    /// Number of actions.
    pub out_dim: usize,
}

impl Default for CnnConfig {
    fn default() -> Self {
        Self {
            n_stack: 4,
            height: 84,
            width: 84,
            out_dim: 2,
        }
    }
}

impl CnnConfig {
    /// Constructs [`CnnConfig`] for square frames.
    pub fn new(n_stack: usize, size: usize, out_dim: usize) -> Self {
        Self {
            n_stack,
            height: size,
            width: size,
            out_dim,
        }
    }

    /// Sets the output dimension.
    pub fn out_dim(mut self, v: usize) -> Self {
        self.out_dim = v;
        self
    }
}
