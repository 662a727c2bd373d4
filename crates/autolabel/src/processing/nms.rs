//! Per-class greedy non-maximum suppression.
//!
//! Areas use the pixel-inclusive convention `(x2 - x1 + 1) * (y2 - y1 + 1)`.
//! Equal scores keep their input order, so the result depends only on the
//! candidate list, never on sort internals.

use super::filter::Candidate;
use std::collections::BTreeMap;

/// Intersection-over-Union with the "+1" pixel-inclusive area convention.
#[inline]
pub fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let xx1 = a[0].max(b[0]);
    let yy1 = a[1].max(b[1]);
    let xx2 = a[2].min(b[2]);
    let yy2 = a[3].min(b[3]);

    let inter = (xx2 - xx1 + 1.0).max(0.0) * (yy2 - yy1 + 1.0).max(0.0);
    let union = area(a) + area(b) - inter;

    if union > 0.0 { inter / union } else { 0.0 }
}

#[inline]
fn area(b: &[f32; 4]) -> f32 {
    (b[2] - b[0] + 1.0) * (b[3] - b[1] + 1.0)
}

/// Suppress overlapping candidates within each class.
///
/// Classes outside `[0, num_classes)` are dropped. Output is grouped by
/// ascending class id, then in the order boxes were kept (descending score).
pub fn suppress(
    candidates: Vec<Candidate>,
    num_classes: usize,
    iou_threshold: f32,
) -> Vec<Candidate> {
    let total = candidates.len();
    let mut by_class: BTreeMap<usize, Vec<Candidate>> = BTreeMap::new();

    for candidate in candidates {
        if candidate.class_id < num_classes {
            by_class.entry(candidate.class_id).or_default().push(candidate);
        }
    }

    let mut kept = Vec::with_capacity(total);
    for (_, group) in by_class {
        kept.extend(suppress_class(group, iou_threshold));
    }

    tracing::debug!(
        candidates = total,
        kept = kept.len(),
        iou_threshold,
        "Non-maximum suppression applied"
    );

    kept
}

fn suppress_class(mut boxes: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    // Stable: equal scores stay in input order
    boxes.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut keep = Vec::new();
    let mut suppressed = vec![false; boxes.len()];

    for i in 0..boxes.len() {
        if suppressed[i] {
            continue;
        }

        for j in (i + 1)..boxes.len() {
            if !suppressed[j] && iou(&boxes[i].bbox, &boxes[j].bbox) > iou_threshold {
                suppressed[j] = true;
            }
        }

        keep.push(boxes[i].clone());
    }

    keep
}
