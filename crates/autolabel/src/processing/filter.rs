use ndarray::ArrayView2;

/// A row that passed the confidence threshold, box in model-input pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub class_id: usize,
    pub score: f32,
    /// `[x1, y1, x2, y2]`
    pub bbox: [f32; 4],
}

/// Best class per row, thresholded, with boxes converted to corner form.
///
/// Rows keep their table order. A score equal to the threshold passes.
pub fn select_candidates(
    table: ArrayView2<'_, f32>,
    num_classes: usize,
    confidence_threshold: f32,
) -> Vec<Candidate> {
    if num_classes == 0 {
        return Vec::new();
    }

    let mut candidates = Vec::new();

    for row in table.rows() {
        let Some((class_id, score)) = best_class(row.iter().skip(4).take(num_classes).copied())
        else {
            continue;
        };

        // NaN scores never pass
        if !(score >= confidence_threshold) {
            continue;
        }

        candidates.push(Candidate {
            class_id,
            score,
            bbox: cxcywh_to_xyxy(row[0], row[1], row[2], row[3]),
        });
    }

    tracing::debug!(
        rows = table.nrows(),
        candidates = candidates.len(),
        confidence_threshold,
        "Confidence filter applied"
    );

    candidates
}

/// Max score and the first index holding it.
fn best_class(scores: impl Iterator<Item = f32>) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, score) in scores.enumerate() {
        match best {
            Some((_, current)) if !(score > current) => {}
            _ => best = Some((idx, score)),
        }
    }
    best
}

/// Convert bounding box from center-width-height format to corner format
#[inline]
pub fn cxcywh_to_xyxy(cx: f32, cy: f32, w: f32, h: f32) -> [f32; 4] {
    [cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0]
}
