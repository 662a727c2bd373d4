use crate::config::{DEFAULT_INPUT_SIZE, LETTERBOX_COLOR};
use crate::letterbox::LetterboxMapping;
use crate::{Preprocess, PreprocessResult};
use common::{span, span_debug};
use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer,
    images::{Image, ImageRef},
};
use ndarray::{Array, IxDyn};

pub struct CpuPreProcessor {
    pub input_size: u32,
    fill: u8,
    letterboxed_buffer: Vec<u8>,
}

impl CpuPreProcessor {
    pub fn new(input_size: u32) -> Self {
        Self::with_fill(input_size, LETTERBOX_COLOR)
    }

    pub fn with_fill(input_size: u32, fill: u8) -> Self {
        Self {
            input_size,
            fill,
            letterboxed_buffer: vec![fill; (input_size * input_size * 3) as usize],
        }
    }

    pub fn preprocess_from_u8_slice(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> anyhow::Result<(Array<f32, IxDyn>, LetterboxMapping)> {
        let _s = span!("preprocess_image");

        tracing::trace!(
            width,
            height,
            pixel_bytes = pixels.len(),
            "Preprocessing image dimensions"
        );

        if self.input_size == 0 {
            anyhow::bail!("Model input size must be at least 1 pixel");
        }

        if width == 0 || height == 0 {
            anyhow::bail!("Cannot letterbox an empty {}x{} image", width, height);
        }

        let expected_size = (width * height * 3) as usize;
        if pixels.len() != expected_size {
            anyhow::bail!(
                "Buffer size mismatch: expected {}, got {} bytes",
                expected_size,
                pixels.len()
            );
        }

        let mapping = LetterboxMapping::compute(width, height, self.input_size);
        self.resize_and_letterbox(pixels, width, height, &mapping)?;
        let input = self.normalize()?;

        Ok((input, mapping))
    }

    fn resize_and_letterbox(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        mapping: &LetterboxMapping,
    ) -> anyhow::Result<()> {
        let _s = span_debug!("resize_and_letterbox");

        let new_width = mapping.resized_width;
        let new_height = mapping.resized_height;

        let src = ImageRef::new(width, height, pixels, PixelType::U8x3)?;
        let mut resized = Image::new(new_width, new_height, PixelType::U8x3);

        Resizer::new().resize(
            &src,
            &mut resized,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
        )?;

        self.letterboxed_buffer.fill(self.fill);

        let resized_data = resized.buffer();
        let stride = self.input_size * 3;
        let row_bytes = (new_width * 3) as usize;

        for y in 0..new_height {
            let src_row = (y * new_width * 3) as usize;
            let dst_row = ((y + mapping.pad_top) * stride + mapping.pad_left * 3) as usize;

            self.letterboxed_buffer[dst_row..dst_row + row_bytes]
                .copy_from_slice(&resized_data[src_row..src_row + row_bytes]);
        }

        Ok(())
    }

    fn normalize(&self) -> anyhow::Result<Array<f32, IxDyn>> {
        let _s = span_debug!("normalize");

        let side = self.input_size as usize;
        let spatial = side * side;

        let mut output = vec![0.0f32; 3 * spatial];

        for (i, px) in self.letterboxed_buffer.chunks_exact(3).enumerate() {
            output[i] = px[0] as f32 / 255.0;
            output[i + spatial] = px[1] as f32 / 255.0;
            output[i + 2 * spatial] = px[2] as f32 / 255.0;
        }

        Ok(Array::from_shape_vec(IxDyn(&[1, 3, side, side]), output)?)
    }
}

impl Default for CpuPreProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_SIZE)
    }
}

impl Preprocess for CpuPreProcessor {
    fn preprocess(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> anyhow::Result<PreprocessResult> {
        let (tensor, mapping) = self.preprocess_from_u8_slice(pixels, width, height)?;
        Ok(PreprocessResult { tensor, mapping })
    }

    fn input_size(&self) -> u32 {
        self.input_size
    }
}
