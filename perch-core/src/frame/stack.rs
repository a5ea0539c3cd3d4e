use super::GrayFrame;
use crate::error::PerchError;
use std::collections::VecDeque;

/// An observation made of the most recent frames, oldest first.
///
/// Pixels are stored as `u8` in `[n_stack, height, width]` order.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedFrames {
    data: Vec<u8>,
    shape: [usize; 3],
}

impl StackedFrames {
    /// Constructs an observation from raw pixels.
    ///
    /// Fails if `data.len()` does not match `shape`.
    pub fn from_raw(data: Vec<u8>, shape: [usize; 3]) -> Result<Self, PerchError> {
        if data.len() != shape.iter().product::<usize>() {
            return Err(PerchError::InvalidConfig(format!(
                "{} pixels do not form a stack of shape {:?}",
                data.len(),
                shape
            )));
        }
        Ok(Self { data, shape })
    }

    /// `[n_stack, height, width]`.
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Raw pixels.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Pixels scaled to `[0, 1]` as expected by value networks.
    pub fn scaled(&self) -> Vec<f32> {
        self.data.iter().map(|&v| v as f32 / 255.0).collect()
    }
}

/// Sliding window over the `n_stack` most recent frames.
pub struct FrameStack {
    n_stack: usize,
    frames: VecDeque<GrayFrame>,
}

impl FrameStack {
    /// Constructs an empty stack of capacity `n_stack`.
    pub fn new(n_stack: usize) -> Self {
        Self {
            n_stack,
            frames: VecDeque::with_capacity(n_stack),
        }
    }

    /// Pushes a frame, dropping the oldest one if the stack is full.
    pub fn push(&mut self, frame: GrayFrame) {
        if self.frames.len() == self.n_stack {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    /// Returns the stacked frames in push order.
    pub fn snapshot(&self) -> Result<StackedFrames, PerchError> {
        if !self.is_full() {
            return Err(PerchError::InsufficientFrames {
                required: self.n_stack,
                available: self.frames.len(),
            });
        }

        let (w, h) = self.frames[0].dimensions();
        let mut data = Vec::with_capacity(self.n_stack * (w * h) as usize);
        for frame in self.frames.iter() {
            data.extend_from_slice(frame.as_raw());
        }

        StackedFrames::from_raw(data, [self.n_stack, h as usize, w as usize])
    }

    /// Empties the stack. Called at episode boundaries.
    pub fn reset(&mut self) {
        self.frames.clear();
    }

    /// Number of frames currently held.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if no frame has been pushed since the last reset.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns `true` if the stack holds `n_stack` frames.
    pub fn is_full(&self) -> bool {
        self.frames.len() == self.n_stack
    }

    /// Capacity of the stack.
    pub fn n_stack(&self) -> usize {
        self.n_stack
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use image::Luma;

    fn frame(v: u8) -> GrayFrame {
        GrayFrame::from_pixel(3, 2, Luma([v]))
    }

    #[test]
    fn test_snapshot_before_full() {
        let mut stack = FrameStack::new(4);
        for i in 0..3 {
            assert!(matches!(
                stack.snapshot(),
                Err(PerchError::InsufficientFrames { required: 4, available }) if available == i
            ));
            stack.push(frame(i as u8));
        }
        assert!(stack.snapshot().is_err());
        stack.push(frame(3));
        assert!(stack.snapshot().is_ok());
    }

    #[test]
    fn test_sliding_window() -> anyhow::Result<()> {
        let mut stack = FrameStack::new(4);
        for i in 0..7u8 {
            stack.push(frame(i));
        }
        let obs = stack.snapshot()?;
        assert_eq!(obs.shape(), [4, 2, 3]);

        let firsts = obs.as_slice().chunks(6).map(|c| c[0]).collect::<Vec<_>>();
        assert_eq!(firsts, vec![3, 4, 5, 6]);
        Ok(())
    }

    #[test]
    fn test_reset() {
        let mut stack = FrameStack::new(2);
        stack.push(frame(0));
        stack.push(frame(1));
        assert!(stack.is_full());
        stack.reset();
        assert!(stack.is_empty());
        stack.push(frame(2));
        assert!(stack.snapshot().is_err());
    }

    #[test]
    fn test_scaled() -> anyhow::Result<()> {
        let obs = StackedFrames::from_raw(vec![0, 51, 255], [1, 1, 3])?;
        assert_eq!(obs.scaled(), vec![0.0, 0.2, 1.0]);
        assert!(StackedFrames::from_raw(vec![0; 5], [1, 2, 3]).is_err());
        Ok(())
    }
}
