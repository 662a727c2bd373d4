pub mod config;
pub mod cpu;
pub mod letterbox;

use ndarray::{Array, IxDyn};

pub use config::{DEFAULT_INPUT_SIZE, LETTERBOX_COLOR};
pub use cpu::CpuPreProcessor;
pub use letterbox::LetterboxMapping;

/// Result of preprocessing including transformation parameters
#[derive(Debug)]
pub struct PreprocessResult {
    /// `(1, 3, S, S)` planar RGB tensor with values in `[0, 1]`
    pub tensor: Array<f32, IxDyn>,
    /// Mapping used to build the tensor; the same instance must be used
    /// to map detections back to the source image
    pub mapping: LetterboxMapping,
}

/// Trait for image preprocessing implementations
pub trait Preprocess {
    /// Preprocess an image for inference
    ///
    /// # Arguments
    /// * `pixels` - RGB pixel data in HWC format
    /// * `width` - Image width
    /// * `height` - Image height
    ///
    /// # Returns
    /// Preprocessed result with transformation parameters
    fn preprocess(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> anyhow::Result<PreprocessResult>;

    /// Get the square input size this preprocessor targets
    fn input_size(&self) -> u32;
}
