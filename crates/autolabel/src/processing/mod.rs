//! Raw model output to original-image detections.
//!
//! normalize -> filter -> suppress (model-input space) -> map back and clip.

pub mod filter;
pub mod mapping;
pub mod nms;
pub mod normalize;

pub use filter::{Candidate, select_candidates};
pub use mapping::{Detection, map_to_original};
pub use nms::suppress;
pub use normalize::canonicalize;

use crate::error::Result;
use ndarray::ArrayViewD;
use preprocess::LetterboxMapping;

/// Thresholds shared by every image in a run.
#[derive(Debug, Clone, Copy)]
pub struct PostProcessor {
    pub num_classes: usize,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
}

impl PostProcessor {
    pub fn new(num_classes: usize, confidence_threshold: f32, iou_threshold: f32) -> Self {
        Self {
            num_classes,
            confidence_threshold,
            iou_threshold,
        }
    }

    /// Full post-processing chain for one raw output tensor.
    pub fn process(
        &self,
        raw: ArrayViewD<'_, f32>,
        mapping: &LetterboxMapping,
        orig_width: u32,
        orig_height: u32,
    ) -> Result<Vec<Detection>> {
        let table = canonicalize(raw, self.num_classes)?;
        let candidates =
            select_candidates(table.view(), self.num_classes, self.confidence_threshold);
        let kept = suppress(candidates, self.num_classes, self.iou_threshold);

        Ok(map_to_original(&kept, mapping, orig_width, orig_height))
    }
}
