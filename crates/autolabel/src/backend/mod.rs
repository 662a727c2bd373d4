use ndarray::{Array, ArrayD, IxDyn};
use std::path::Path;

#[cfg(feature = "ort-backend")]
pub mod ort;

/// Black-box inference engine: `(1, 3, S, S)` float tensor in, one raw
/// output tensor out.
pub trait InferenceBackend {
    fn load_model(path: &Path) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Run inference with a CPU array input
    fn infer(&mut self, images: &Array<f32, IxDyn>) -> anyhow::Result<ArrayD<f32>>;
}
