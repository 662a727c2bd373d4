//! Letterbox geometry between source-image pixels and the square model input.
//!
//! The source is scaled by `scale = min(S / H, S / W)`, rounded to whole
//! pixels, and centred on an `S x S` canvas. `forward` and `inverse` use
//! exactly the same `scale`/padding pair, so a point mapped forward and back
//! only picks up float error.

/// Forward/inverse mapping computed once per image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxMapping {
    /// Factor applied to source coordinates (`> 0`)
    pub scale: f64,
    /// Horizontal padding in model-input pixels
    pub pad_left: u32,
    /// Vertical padding in model-input pixels
    pub pad_top: u32,
    /// Side of the square model input
    pub target_size: u32,
    /// Width of the resized image pasted on the canvas
    pub resized_width: u32,
    /// Height of the resized image pasted on the canvas
    pub resized_height: u32,
}

impl LetterboxMapping {
    /// Compute the mapping for a `width x height` source and a square target.
    ///
    /// Resized dimensions are rounded half-to-even and kept within
    /// `1..=target_size` so the paste is always valid.
    pub fn compute(width: u32, height: u32, target_size: u32) -> Self {
        // f64: resized sizes near `.5` must round exactly
        let scale =
            (target_size as f64 / height as f64).min(target_size as f64 / width as f64);

        let resized_width = resized_dim(width, scale, target_size);
        let resized_height = resized_dim(height, scale, target_size);

        Self {
            scale,
            pad_left: target_size.saturating_sub(resized_width) / 2,
            pad_top: target_size.saturating_sub(resized_height) / 2,
            target_size,
            resized_width,
            resized_height,
        }
    }

    /// Source pixel space -> model-input pixel space.
    #[inline]
    pub fn forward(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x as f64 * self.scale + self.pad_left as f64) as f32,
            (y as f64 * self.scale + self.pad_top as f64) as f32,
        )
    }

    /// Model-input pixel space -> source pixel space.
    #[inline]
    pub fn inverse(&self, x: f32, y: f32) -> (f32, f32) {
        (
            ((x as f64 - self.pad_left as f64) / self.scale) as f32,
            ((y as f64 - self.pad_top as f64) / self.scale) as f32,
        )
    }

    /// Inverse-map an `[x1, y1, x2, y2]` box.
    pub fn inverse_box(&self, bbox: [f32; 4]) -> [f32; 4] {
        let (x1, y1) = self.inverse(bbox[0], bbox[1]);
        let (x2, y2) = self.inverse(bbox[2], bbox[3]);
        [x1, y1, x2, y2]
    }
}

#[inline]
fn resized_dim(dim: u32, scale: f64, target_size: u32) -> u32 {
    ((dim as f64 * scale).round_ties_even() as u32).clamp(1, target_size.max(1))
}
