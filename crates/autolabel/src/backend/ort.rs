use super::InferenceBackend;
use ndarray::{Array, ArrayD, IxDyn};
use ort::{
    session::{Session, builder::GraphOptimizationLevel},
    value::TensorRef,
};
use std::path::Path;

pub struct OrtBackend {
    session: Session,
}

impl OrtBackend {
    /// Load a model on the CPU execution provider
    pub fn load_model_with_threads(path: &Path, intra_threads: usize) -> anyhow::Result<Self> {
        // Initialize ORT environment (idempotent)
        let _ = ort::init().commit();

        tracing::info!("Initializing ONNX Runtime with CPU execution provider");
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(intra_threads)?
            .commit_from_file(path)?;

        tracing::info!("Model loaded from {}", path.display());
        Ok(Self { session })
    }
}

impl InferenceBackend for OrtBackend {
    fn load_model(path: &Path) -> anyhow::Result<Self> {
        Self::load_model_with_threads(path, 4)
    }

    fn infer(&mut self, images: &Array<f32, IxDyn>) -> anyhow::Result<ArrayD<f32>> {
        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(images.view())?])?;

        if outputs.len() == 0 {
            anyhow::bail!("Model produced no outputs");
        }

        let raw = outputs[0].try_extract_array::<f32>()?;
        tracing::debug!(shape = ?raw.shape(), "Raw model output");

        Ok(raw.into_owned())
    }
}
