use image::{
    imageops::{resize, FilterType},
    DynamicImage, ImageBuffer, Luma,
};

/// A preprocessed single-channel frame, row-major `[height, width]`.
pub type GrayFrame = ImageBuffer<Luma<u8>, Vec<u8>>;

/// Converts a raw screen into a fixed-size grayscale frame.
///
/// The conversion is a pure function of its input: grayscale, then resize with
/// triangle (bilinear) interpolation. Pixel values stay `u8`; scaling to
/// `[0, 1]` happens when an observation is fed to a network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePreprocessor {
    width: u32,
    height: u32,
}

impl FramePreprocessor {
    /// Constructs a preprocessor producing `width` x `height` frames.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Constructs a preprocessor producing square frames.
    pub fn square(size: u32) -> Self {
        Self::new(size, size)
    }

    /// Width of the output frames.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the output frames.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Preprocesses a raw screen.
    pub fn process(&self, frame: &DynamicImage) -> GrayFrame {
        let gray = frame.to_luma8();
        if gray.dimensions() == (self.width, self.height) {
            return gray;
        }
        resize(&gray, self.width, self.height, FilterType::Triangle)
    }
}

impl Default for FramePreprocessor {
    fn default() -> Self {
        Self::square(84)
    }
}
