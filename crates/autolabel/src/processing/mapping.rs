use super::filter::Candidate;
use preprocess::LetterboxMapping;

/// A surviving detection in original-image pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
    pub class_id: usize,
}

impl Detection {
    #[inline]
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
}

/// Undo the letterbox and clip to `[0, W-1] x [0, H-1]`.
///
/// Order and count are preserved; out-of-range geometry only saturates.
pub fn map_to_original(
    candidates: &[Candidate],
    mapping: &LetterboxMapping,
    orig_width: u32,
    orig_height: u32,
) -> Vec<Detection> {
    let max_x = orig_width.saturating_sub(1) as f32;
    let max_y = orig_height.saturating_sub(1) as f32;

    candidates
        .iter()
        .map(|candidate| {
            let [x1, y1, x2, y2] = mapping.inverse_box(candidate.bbox);
            Detection {
                x1: x1.clamp(0.0, max_x),
                y1: y1.clamp(0.0, max_y),
                x2: x2.clamp(0.0, max_x),
                y2: y2.clamp(0.0, max_y),
                confidence: candidate.score,
                class_id: candidate.class_id,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(class_id: usize, bbox: [f32; 4]) -> Candidate {
        Candidate {
            class_id,
            score: 0.8,
            bbox,
        }
    }

    #[test]
    fn test_maps_back_through_letterbox() {
        let mapping = LetterboxMapping::compute(1920, 1080, 640);
        let detections = map_to_original(
            &[candidate(3, [100.0, 150.0, 200.0, 250.0])],
            &mapping,
            1920,
            1080,
        );

        let d = &detections[0];
        assert!((d.x1 - 300.0).abs() < 0.01);
        assert!((d.y1 - 30.0).abs() < 0.01);
        assert!((d.x2 - 600.0).abs() < 0.01);
        assert!((d.y2 - 330.0).abs() < 0.01);
        assert_eq!(d.class_id, 3);
        assert_eq!(d.confidence, 0.8);
    }

    #[test]
    fn test_clips_each_axis_to_its_own_bound() {
        // Box spilling into the top padding and past the right edge
        let mapping = LetterboxMapping::compute(1920, 1080, 640);
        let detections = map_to_original(
            &[candidate(0, [-20.0, 100.0, 700.0, 600.0])],
            &mapping,
            1920,
            1080,
        );

        let d = &detections[0];
        assert_eq!(d.x1, 0.0);
        assert_eq!(d.y1, 0.0);
        assert_eq!(d.x2, 1919.0);
        assert_eq!(d.y2, 1079.0);
    }

    #[test]
    fn test_order_and_count_preserved() {
        let mapping = LetterboxMapping::compute(100, 100, 100);
        let input = vec![
            candidate(2, [10.0, 10.0, 20.0, 20.0]),
            candidate(0, [-500.0, -500.0, -400.0, -400.0]),
            candidate(1, [30.0, 30.0, 40.0, 40.0]),
        ];

        let detections = map_to_original(&input, &mapping, 100, 100);
        let classes: Vec<usize> = detections.iter().map(|d| d.class_id).collect();
        assert_eq!(classes, vec![2, 0, 1]);
    }

    #[test]
    fn test_clipping_safety_for_well_formed_boxes() {
        let mapping = LetterboxMapping::compute(333, 777, 320);
        let mut input = Vec::new();
        for i in 0..50 {
            let x = i as f32 * 15.0 - 100.0;
            let y = i as f32 * 9.0 - 50.0;
            input.push(candidate(0, [x, y, x + 80.0, y + 120.0]));
        }

        for d in map_to_original(&input, &mapping, 333, 777) {
            assert!(0.0 <= d.x1 && d.x1 <= d.x2 && d.x2 <= 332.0, "{:?}", d);
            assert!(0.0 <= d.y1 && d.y1 <= d.y2 && d.y2 <= 776.0, "{:?}", d);
        }
    }
}
