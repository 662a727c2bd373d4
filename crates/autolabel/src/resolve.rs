//! Choosing which model file to load.
//!
//! Priority: explicit path > `YOLO_MODEL_PATH` > best `*.onnx` in the models
//! directory > best `*.onnx` in its nested `models/` directory. Which file is
//! "best" is a [`ModelSelector`], so the pipeline never depends on how
//! candidates are ranked.

use crate::error::{AutolabelError, Result};
use regex::Regex;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;

static DATE_IN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})[_-]?(\d{2})[_-]?(\d{2})").expect("date pattern is valid")
});

/// Picks one model out of a set of candidate paths.
pub trait ModelSelector {
    fn select(&self, candidates: &[PathBuf]) -> Option<PathBuf>;
}

impl<F> ModelSelector for F
where
    F: Fn(&[PathBuf]) -> Option<PathBuf>,
{
    fn select(&self, candidates: &[PathBuf]) -> Option<PathBuf> {
        self(candidates)
    }
}

/// Ranks by: name mentions `best`/`latest`, then a `YYYY_MM_DD` style date
/// in the name, then modification time, then file size. The first candidate
/// wins exact ties.
#[derive(Debug, Default, Clone, Copy)]
pub struct LatestModelSelector;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ModelRank {
    preferred: bool,
    date: (u32, u32, u32),
    modified: Option<SystemTime>,
    size: u64,
}

impl ModelRank {
    fn of(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let metadata = fs::metadata(path).ok();

        Self {
            preferred: name.contains("best") || name.contains("latest"),
            date: date_in_name(&name),
            modified: metadata.as_ref().and_then(|m| m.modified().ok()),
            size: metadata.map(|m| m.len()).unwrap_or(0),
        }
    }
}

fn date_in_name(name: &str) -> (u32, u32, u32) {
    DATE_IN_NAME
        .captures(name)
        .and_then(|caps| {
            let part = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();
            Some((part(1)?, part(2)?, part(3)?))
        })
        .unwrap_or((0, 0, 0))
}

impl ModelSelector for LatestModelSelector {
    fn select(&self, candidates: &[PathBuf]) -> Option<PathBuf> {
        // `max_by_key` keeps the last maximum; reversing makes the first one win.
        candidates
            .iter()
            .rev()
            .max_by_key(|path| ModelRank::of(path))
            .cloned()
    }
}

pub struct ModelResolver<S = LatestModelSelector> {
    models_dir: PathBuf,
    selector: S,
}

impl ModelResolver {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self::with_selector(models_dir, LatestModelSelector)
    }
}

impl<S: ModelSelector> ModelResolver<S> {
    pub fn with_selector(models_dir: impl Into<PathBuf>, selector: S) -> Self {
        Self {
            models_dir: models_dir.into(),
            selector,
        }
    }

    /// Resolve the model path. Explicit and environment paths are made
    /// absolute but not checked for existence here.
    pub fn resolve(&self, explicit: Option<&Path>, env_override: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "Using explicit model path");
            return Ok(absolute(path));
        }

        if let Some(path) = env_override {
            tracing::debug!(path = %path.display(), "Using model path from environment");
            return Ok(absolute(path));
        }

        let nested = self.models_dir.join("models");
        for dir in [&self.models_dir, &nested] {
            let candidates = onnx_files(dir);
            tracing::debug!(
                dir = %dir.display(),
                candidates = candidates.len(),
                "Searching for ONNX models"
            );
            if let Some(path) = self.selector.select(&candidates) {
                return Ok(path);
            }
        }

        Err(AutolabelError::NoModelFound(vec![
            self.models_dir.clone(),
            nested,
        ]))
    }
}

/// Directory holding the running executable, or the working directory.
pub fn default_models_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn onnx_files(dir: &Path) -> Vec<PathBuf> {
    let Some(dir_str) = dir.to_str() else {
        return Vec::new();
    };
    let pattern = format!("{}/*.onnx", glob::Pattern::escape(dir_str));

    match glob::glob(&pattern) {
        Ok(paths) => paths
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, pattern, "Invalid model search pattern");
            Vec::new()
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    let path = expand_home(path, std::env::var_os("HOME").as_deref());
    std::path::absolute(&path).unwrap_or(path)
}

/// Replace a leading `~` component with `home`, when known.
fn expand_home(path: &Path, home: Option<&OsStr>) -> PathBuf {
    let Some(home) = home.filter(|h| !h.is_empty()) else {
        return path.to_path_buf();
    };

    match path.strip_prefix("~") {
        Ok(rest) => Path::new(home).join(rest),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::tempdir;

    fn touch(path: &Path, bytes: usize, modified: SystemTime) {
        fs::write(path, vec![0u8; bytes]).unwrap();
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(modified)
            .unwrap();
    }

    #[test]
    fn test_date_in_name() {
        assert_eq!(date_in_name("yolo_2025_08_09.onnx"), (2025, 8, 9));
        assert_eq!(date_in_name("yolo-2024-12-31.onnx"), (2024, 12, 31));
        assert_eq!(date_in_name("yolo20230102.onnx"), (2023, 1, 2));
        assert_eq!(date_in_name("yolo.onnx"), (0, 0, 0));
    }

    #[test]
    fn test_explicit_path_wins() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("best.onnx"), 10, SystemTime::now());

        let resolver = ModelResolver::new(dir.path());
        let path = resolver
            .resolve(Some(Path::new("/elsewhere/model.onnx")), Some(Path::new("/env.onnx")))
            .unwrap();

        assert_eq!(path, PathBuf::from("/elsewhere/model.onnx"));
    }

    #[test]
    fn test_env_path_beats_search() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("best.onnx"), 10, SystemTime::now());

        let resolver = ModelResolver::new(dir.path());
        let path = resolver.resolve(None, Some(Path::new("/env.onnx"))).unwrap();

        assert_eq!(path, PathBuf::from("/env.onnx"));
    }

    #[test]
    fn test_relative_override_made_absolute() {
        let resolver = ModelResolver::new("/nowhere");
        let path = resolver.resolve(Some(Path::new("model.onnx")), None).unwrap();

        assert!(path.is_absolute());
        assert!(path.ends_with("model.onnx"));
    }

    #[test]
    fn test_leading_tilde_expands_to_home() {
        let home = OsStr::new("/home/labeler");

        assert_eq!(
            expand_home(Path::new("~/models/best.onnx"), Some(home)),
            PathBuf::from("/home/labeler/models/best.onnx")
        );
        assert_eq!(
            expand_home(Path::new("~"), Some(home)),
            PathBuf::from("/home/labeler")
        );
    }

    #[test]
    fn test_tilde_left_alone_without_home_or_when_not_leading() {
        let home = OsStr::new("/home/labeler");

        assert_eq!(
            expand_home(Path::new("~/best.onnx"), None),
            PathBuf::from("~/best.onnx")
        );
        assert_eq!(
            expand_home(Path::new("models/~/best.onnx"), Some(home)),
            PathBuf::from("models/~/best.onnx")
        );
        assert_eq!(
            expand_home(Path::new("~other/best.onnx"), Some(home)),
            PathBuf::from("~other/best.onnx")
        );
    }

    #[test]
    fn test_best_name_beats_newer_file() {
        let dir = tempdir().unwrap();
        let old = SystemTime::now() - Duration::from_secs(3600);
        touch(&dir.path().join("yolo_best.onnx"), 10, old);
        touch(&dir.path().join("yolo_2030_01_01.onnx"), 100, SystemTime::now());

        let path = ModelResolver::new(dir.path()).resolve(None, None).unwrap();
        assert_eq!(path.file_name().unwrap(), "yolo_best.onnx");
    }

    #[test]
    fn test_date_beats_modification_time() {
        let dir = tempdir().unwrap();
        let old = SystemTime::now() - Duration::from_secs(3600);
        touch(&dir.path().join("yolo_2025_08_09.onnx"), 10, old);
        touch(&dir.path().join("yolo_2024_01_01.onnx"), 10, SystemTime::now());

        let path = ModelResolver::new(dir.path()).resolve(None, None).unwrap();
        assert_eq!(path.file_name().unwrap(), "yolo_2025_08_09.onnx");
    }

    #[test]
    fn test_newest_then_largest() {
        let dir = tempdir().unwrap();
        let now = SystemTime::now();
        touch(&dir.path().join("a.onnx"), 10, now - Duration::from_secs(60));
        touch(&dir.path().join("b.onnx"), 5, now);
        touch(&dir.path().join("c.onnx"), 50, now);

        let path = ModelResolver::new(dir.path()).resolve(None, None).unwrap();
        assert_eq!(path.file_name().unwrap(), "c.onnx");
    }

    #[test]
    fn test_nested_models_directory_fallback() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("models")).unwrap();
        touch(&dir.path().join("models/yolo.onnx"), 10, SystemTime::now());
        touch(&dir.path().join("notes.txt"), 10, SystemTime::now());

        let path = ModelResolver::new(dir.path()).resolve(None, None).unwrap();
        assert!(path.ends_with("models/yolo.onnx"));
    }

    #[test]
    fn test_no_models_is_resolution_error() {
        let dir = tempdir().unwrap();

        let err = ModelResolver::new(dir.path()).resolve(None, None).unwrap_err();
        assert!(err.is_resolution_error());
        assert!(err.to_string().starts_with("No ONNX models found"));
    }

    #[test]
    fn test_custom_selector_is_used() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a_best.onnx"), 10, SystemTime::now());
        touch(&dir.path().join("z.onnx"), 10, SystemTime::now());

        let by_name = |candidates: &[PathBuf]| candidates.iter().max().cloned();
        let path = ModelResolver::with_selector(dir.path(), by_name)
            .resolve(None, None)
            .unwrap();

        assert_eq!(path.file_name().unwrap(), "z.onnx");
    }
}
