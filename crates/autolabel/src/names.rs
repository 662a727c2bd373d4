use crate::error::{AutolabelError, Result};
use std::fs;
use std::path::Path;

/// Read a `.names`/`.txt` class list: one name per line, trimmed, blank lines
/// skipped. Order and duplicates are kept as written.
pub fn load_class_names(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|source| AutolabelError::ClassNames {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(parse_class_names(&content))
}

pub fn parse_class_names(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
