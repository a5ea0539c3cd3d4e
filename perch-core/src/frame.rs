//! Frame preprocessing and stacking.
//!
//! A raw screen goes through [`FramePreprocessor`], which produces a
//! fixed-size single-channel frame. [`FrameStack`] keeps the most recent
//! frames and emits them as one [`StackedFrames`] observation.
mod preprocessor;
mod stack;
pub use preprocessor::{FramePreprocessor, GrayFrame};
pub use stack::{FrameStack, StackedFrames};
