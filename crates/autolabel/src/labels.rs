//! Label file and confidence side-record output.
//!
//! One line per detection, `class cx cy w h`, normalized by the original
//! image size and written with six decimals. The side-record is a JSON array
//! at `<label>.json`, index-aligned with the label lines.

use crate::error::Result;
use crate::processing::Detection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct LabelRecord {
    pub class_id: usize,
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
}

impl LabelRecord {
    pub fn from_detection(detection: &Detection, orig_width: u32, orig_height: u32) -> Self {
        let (width, height) = (orig_width as f32, orig_height as f32);
        let bw = detection.width();
        let bh = detection.height();

        Self {
            class_id: detection.class_id,
            cx: (detection.x1 + bw / 2.0) / width,
            cy: (detection.y1 + bh / 2.0) / height,
            w: bw / width,
            h: bh / height,
        }
    }
}

impl fmt::Display for LabelRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.cx, self.cy, self.w, self.h
        )
    }
}

/// Entry of the confidence side-record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceRecord {
    #[serde(rename = "cls")]
    pub class_id: usize,
    #[serde(rename = "conf")]
    pub confidence: f32,
}

impl From<&Detection> for ConfidenceRecord {
    fn from(detection: &Detection) -> Self {
        Self {
            class_id: detection.class_id,
            confidence: detection.confidence,
        }
    }
}

/// Paths produced by a successful write.
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenLabels {
    pub label_path: PathBuf,
    pub side_record: Option<PathBuf>,
    pub count: usize,
}

/// Newline-joined label lines, no trailing newline.
pub fn render_labels(detections: &[Detection], orig_width: u32, orig_height: u32) -> String {
    detections
        .iter()
        .map(|d| LabelRecord::from_detection(d, orig_width, orig_height).to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// `labels/img.txt` -> `labels/img.txt.json`
pub fn side_record_path(label_path: &Path) -> PathBuf {
    let mut name = label_path.as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

pub struct LabelWriter {
    write_confidences: bool,
}

impl LabelWriter {
    pub fn new(write_confidences: bool) -> Self {
        Self { write_confidences }
    }

    /// Write the label file (and side-record) for `detections`.
    ///
    /// Returns `None` without touching the filesystem when there is nothing
    /// to write.
    pub fn write(
        &self,
        label_path: &Path,
        detections: &[Detection],
        orig_width: u32,
        orig_height: u32,
    ) -> Result<Option<WrittenLabels>> {
        if detections.is_empty() {
            return Ok(None);
        }

        if let Some(parent) = label_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        fs::write(label_path, render_labels(detections, orig_width, orig_height))?;
        tracing::debug!(path = %label_path.display(), count = detections.len(), "Label file written");

        let side_record = if self.write_confidences {
            let path = side_record_path(label_path);
            let records: Vec<ConfidenceRecord> = detections.iter().map(Into::into).collect();
            fs::write(&path, serde_json::to_vec(&records)?)?;
            Some(path)
        } else {
            None
        };

        Ok(Some(WrittenLabels {
            label_path: label_path.to_path_buf(),
            side_record,
            count: detections.len(),
        }))
    }
}
