use crate::{
    backend::InferenceBackend,
    config::AutolabelConfig,
    error::{AutolabelError, Result},
    labels::{LabelWriter, WrittenLabels},
    names::load_class_names,
    processing::{Detection, PostProcessor},
};
use common::{span, span_debug};
use image::RgbImage;
use preprocess::{CpuPreProcessor, Preprocess, PreprocessResult};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// One labeling job: which image, where to write, and with what model.
#[derive(Debug, Clone)]
pub struct LabelRequest {
    pub image_path: PathBuf,
    pub label_path: PathBuf,
    pub names_path: PathBuf,
    /// Already resolved; existence is checked by [`run`].
    pub model_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LabelOutcome {
    /// The image could not be decoded; nothing was written.
    Skipped,
    /// Inference ran but no detection survived; nothing was written.
    NoDetections,
    Written(WrittenLabels),
}

/// Runs one image through preprocess, inference and post-processing.
pub struct Autolabeler<B: InferenceBackend> {
    backend: B,
    preprocessor: CpuPreProcessor,
    postprocessor: PostProcessor,
    writer: LabelWriter,
}

impl<B: InferenceBackend> Autolabeler<B> {
    pub fn new(backend: B, config: &AutolabelConfig, num_classes: usize) -> Self {
        Self {
            backend,
            preprocessor: CpuPreProcessor::with_fill(config.input_size, config.letterbox_color),
            postprocessor: PostProcessor::new(
                num_classes,
                config.confidence_threshold,
                config.iou_threshold,
            ),
            writer: LabelWriter::new(config.write_confidences),
        }
    }

    /// Detections for `image` in its own pixel coordinates.
    pub fn detect(&mut self, image: &RgbImage) -> Result<Vec<Detection>> {
        let (width, height) = image.dimensions();

        let PreprocessResult { tensor, mapping } = {
            let _span = span_debug!("preprocess");
            self.preprocessor
                .preprocess(image.as_raw(), width, height)
                .map_err(AutolabelError::Preprocess)?
        };

        let raw = {
            let _span = span!("model_inference");
            self.backend
                .infer(&tensor)
                .map_err(AutolabelError::Inference)?
        };

        let _span = span_debug!("postprocess");
        self.postprocessor
            .process(raw.view(), &mapping, width, height)
    }

    /// Detect and write labels for `image` to `label_path`.
    pub fn label_image(&mut self, image: &RgbImage, label_path: &Path) -> Result<LabelOutcome> {
        let detections = self.detect(image)?;
        let (width, height) = image.dimensions();

        let outcome = match self.writer.write(label_path, &detections, width, height)? {
            Some(written) => LabelOutcome::Written(written),
            None => LabelOutcome::NoDetections,
        };

        Ok(outcome)
    }
}

/// Label a single image end to end.
///
/// Class names are read first, then the image. An undecodable image is
/// [`LabelOutcome::Skipped`] before the model is ever looked at; a missing
/// model file is only an error once there is something to label.
pub fn run<B, F>(request: &LabelRequest, config: &AutolabelConfig, load_backend: F) -> Result<LabelOutcome>
where
    B: InferenceBackend,
    F: FnOnce(&Path) -> anyhow::Result<B>,
{
    let _span = tracing::info_span!(
        "autolabel",
        image = %request.image_path.display()
    )
    .entered();
    let start = Instant::now();

    let names = load_class_names(&request.names_path)?;
    tracing::debug!(classes = names.len(), "Class names loaded");

    let image = match image::open(&request.image_path) {
        Ok(image) => image.to_rgb8(),
        Err(e) => {
            tracing::warn!(error = %e, "Could not decode image, skipping");
            return Ok(LabelOutcome::Skipped);
        }
    };

    if !request.model_path.is_file() {
        return Err(AutolabelError::ModelNotFound(request.model_path.clone()));
    }

    let backend = load_backend(&request.model_path).map_err(|source| AutolabelError::ModelLoad {
        path: request.model_path.clone(),
        source,
    })?;

    let mut labeler = Autolabeler::new(backend, config, names.len());
    let outcome = labeler.label_image(&image, &request.label_path)?;

    tracing::debug!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Image processed"
    );

    Ok(outcome)
}
