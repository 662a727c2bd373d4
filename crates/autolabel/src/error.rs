use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutolabelError {
    #[error("No ONNX models found in {}", format_dirs(.0))]
    NoModelFound(Vec<PathBuf>),

    #[error("Model not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    #[error("Failed to read class names from {}: {source}", path.display())]
    ClassNames { path: PathBuf, source: io::Error },

    #[error("Unexpected output ndim={ndim}, shape={shape:?}")]
    OutputRank { ndim: usize, shape: Vec<usize> },

    #[error("Unsupported batch size {0}; expected a single image")]
    UnsupportedBatch(usize),

    #[error("Unexpected output shape {shape:?}; can't find feature dim {features}")]
    OutputShape { shape: Vec<usize>, features: usize },

    #[error("Failed to load model {}: {source:#}", path.display())]
    ModelLoad {
        path: PathBuf,
        source: anyhow::Error,
    },

    #[error("Preprocessing failed: {0:#}")]
    Preprocess(anyhow::Error),

    #[error("Inference failed: {0:#}")]
    Inference(anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize confidences: {0}")]
    Json(#[from] serde_json::Error),
}

impl AutolabelError {
    /// Raw output could not be reconciled with the `4 + C` layout.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            AutolabelError::OutputRank { .. }
                | AutolabelError::UnsupportedBatch(_)
                | AutolabelError::OutputShape { .. }
        )
    }

    /// No usable model path could be produced.
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            AutolabelError::NoModelFound(_) | AutolabelError::ModelNotFound(_)
        )
    }
}

fn format_dirs(dirs: &[PathBuf]) -> String {
    dirs.iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, AutolabelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formatting() {
        let err = AutolabelError::ModelNotFound(PathBuf::from("/models/best.onnx"));
        assert_eq!(err.to_string(), "Model not found: /models/best.onnx");

        let err = AutolabelError::NoModelFound(vec![
            PathBuf::from("/opt/autolabel"),
            PathBuf::from("/opt/autolabel/models"),
        ]);
        assert_eq!(
            err.to_string(),
            "No ONNX models found in /opt/autolabel, /opt/autolabel/models"
        );

        let err = AutolabelError::OutputShape {
            shape: vec![10, 20],
            features: 64,
        };
        assert_eq!(
            err.to_string(),
            "Unexpected output shape [10, 20]; can't find feature dim 64"
        );

        let err = AutolabelError::OutputRank {
            ndim: 4,
            shape: vec![1, 1, 64, 8400],
        };
        assert_eq!(
            err.to_string(),
            "Unexpected output ndim=4, shape=[1, 1, 64, 8400]"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(AutolabelError::UnsupportedBatch(2).is_shape_error());
        assert!(!AutolabelError::UnsupportedBatch(2).is_resolution_error());
        assert!(AutolabelError::ModelNotFound(PathBuf::new()).is_resolution_error());
        assert!(AutolabelError::NoModelFound(vec![]).is_resolution_error());
    }

    #[test]
    fn test_error_conversion_from_io_error() {
        fn returns_io_error() -> std::result::Result<(), io::Error> {
            Err(io::Error::other("disk full"))
        }

        fn uses_question_mark() -> Result<()> {
            returns_io_error()?;
            Ok(())
        }

        match uses_question_mark().unwrap_err() {
            AutolabelError::Io(e) => assert_eq!(e.to_string(), "disk full"),
            other => panic!("Expected Io variant, got {other:?}"),
        }
    }
}
