use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub use common::Environment;
use preprocess::{DEFAULT_INPUT_SIZE, LETTERBOX_COLOR};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.35;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.60;

/// Environment variable naming a model file that wins over directory search.
pub const MODEL_PATH_ENV: &str = "YOLO_MODEL_PATH";

#[derive(Debug, Clone)]
pub struct AutolabelConfig {
    pub environment: Environment,
    pub input_size: u32,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub letterbox_color: u8,
    pub write_confidences: bool,
    pub model_override: Option<PathBuf>,
}

impl Default for AutolabelConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            input_size: DEFAULT_INPUT_SIZE,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            letterbox_color: LETTERBOX_COLOR,
            write_confidences: true,
            model_override: None,
        }
    }
}

impl AutolabelConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Missing or unparseable values keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let environment = lookup("ENVIRONMENT")
            .map(|value| Environment::parse(&value))
            .unwrap_or(defaults.environment);

        let model_override = lookup(MODEL_PATH_ENV)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Self {
            environment,
            input_size: parsed(&lookup, "INPUT_SIZE")
                .filter(|&size: &u32| size > 0)
                .unwrap_or(defaults.input_size),
            confidence_threshold: parsed(&lookup, "CONFIDENCE_THRESHOLD")
                .unwrap_or(defaults.confidence_threshold),
            iou_threshold: parsed(&lookup, "IOU_THRESHOLD").unwrap_or(defaults.iou_threshold),
            letterbox_color: parsed(&lookup, "LETTERBOX_COLOR")
                .unwrap_or(defaults.letterbox_color),
            write_confidences: parsed(&lookup, "WRITE_CONFIDENCES")
                .unwrap_or(defaults.write_confidences),
            model_override,
        }
    }
}

fn parsed<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key).and_then(|s| s.trim().parse().ok())
}
