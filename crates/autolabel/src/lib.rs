pub mod backend;
pub mod config;
pub mod error;
pub mod labels;
pub mod logging;
pub mod names;
pub mod pipeline;
pub mod processing;
pub mod resolve;

// Re-export commonly used types for convenience
pub use backend::InferenceBackend;
pub use config::AutolabelConfig;
pub use error::{AutolabelError, Result};
pub use labels::WrittenLabels;
pub use pipeline::{Autolabeler, LabelOutcome, LabelRequest, run};
pub use processing::Detection;
pub use resolve::{LatestModelSelector, ModelResolver, ModelSelector};
