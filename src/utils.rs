// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Box geometry helpers used by post-processing.

/// A decoded candidate box: `([x1, y1, x2, y2], score, class_id)`.
pub type Candidate = ([f32; 4], f32, usize);

/// Calculate `IoU` (Intersection over Union) between two xyxy boxes.
///
/// Returns `0.0` when the union is empty.
#[must_use]
pub fn calculate_iou(box1: &[f32; 4], box2: &[f32; 4]) -> f32 {
    let x1 = box1[0].max(box2[0]);
    let y1 = box1[1].max(box2[1]);
    let x2 = box1[2].min(box2[2]);
    let y2 = box1[3].min(box2[3]);

    let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);

    let area1 = (box1[2] - box1[0]) * (box1[3] - box1[1]);
    let area2 = (box2[2] - box2[0]) * (box2[3] - box2[1]);
    let union = area1 + area2 - intersection;

    if union > 0.0 { intersection / union } else { 0.0 }
}

/// Indices of `boxes` ordered by descending score.
///
/// The sort is stable, so equal scores keep their original order.
#[must_use]
pub fn argsort_desc(boxes: &[Candidate]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..boxes.len()).collect();
    indices.sort_by(|&a, &b| boxes[b].1.total_cmp(&boxes[a].1));
    indices
}

/// Per-class Non-Maximum Suppression.
///
/// Only boxes of the same class suppress each other. The returned indices are
/// ordered by descending score.
#[must_use]
pub fn nms_per_class(boxes: &[Candidate], iou_threshold: f32) -> Vec<usize> {
    let order = argsort_desc(boxes);
    let mut keep: Vec<usize> = Vec::new();

    for &i in &order {
        let (bbox, _, class_id) = &boxes[i];
        let suppressed = keep.iter().any(|&k| {
            let (kept_box, _, kept_class) = &boxes[k];
            kept_class == class_id && calculate_iou(kept_box, bbox) > iou_threshold
        });
        if !suppressed {
            keep.push(i);
        }
    }

    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iou_identical() {
        let b = [0.0, 0.0, 10.0, 10.0];
        assert!((calculate_iou(&b, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_disjoint_and_partial() {
        let a = [0.0, 0.0, 10.0, 10.0];
        let b = [20.0, 20.0, 30.0, 30.0];
        assert!(calculate_iou(&a, &b).abs() < 1e-6);

        // Half overlap: intersection 50, union 150
        let c = [5.0, 0.0, 15.0, 10.0];
        assert!((calculate_iou(&a, &c) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_degenerate() {
        let point = [5.0, 5.0, 5.0, 5.0];
        assert!(calculate_iou(&point, &point).abs() < 1e-6);
    }

    #[test]
    fn test_nms_suppresses_same_class_only() {
        let boxes = vec![
            ([0.0, 0.0, 10.0, 10.0], 0.8, 0),
            ([1.0, 1.0, 10.0, 10.0], 0.9, 0),
            ([1.0, 1.0, 10.0, 10.0], 0.7, 1),
            ([50.0, 50.0, 60.0, 60.0], 0.6, 0),
        ];
        let keep = nms_per_class(&boxes, 0.5);
        assert_eq!(keep, vec![1, 2, 3]);
    }

    #[test]
    fn test_argsort_is_stable_on_ties() {
        let boxes = vec![
            ([0.0, 0.0, 1.0, 1.0], 0.5, 0),
            ([0.0, 0.0, 1.0, 1.0], 0.9, 1),
            ([0.0, 0.0, 1.0, 1.0], 0.5, 2),
        ];
        assert_eq!(argsort_desc(&boxes), vec![1, 0, 2]);
    }

    #[test]
    fn test_nms_empty() {
        assert!(nms_per_class(&[], 0.5).is_empty());
    }
}
