// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Post-processing for YOLO detection outputs.
//!
//! Detection heads emit one tensor of shape `[1, 4 + nc, N]` (or its
//! transpose `[1, N, 4 + nc]`) where each prediction carries a center-format
//! box followed by one score per class. Decoding keeps the best class of each
//! prediction, drops low scores, maps boxes back onto the original image and
//! runs per-class NMS.

use std::collections::HashMap;

use ndarray::{Array2, ArrayView2, s};

use crate::error::{InferenceError, Result};
use crate::inference::InferenceConfig;
use crate::preprocessing::{PreprocessResult, clip_coords, scale_coords};
use crate::results::{Boxes, Results, Speed};
use crate::utils::{Candidate, nms_per_class};

/// Layout of a detection output tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectLayout {
    /// Number of class scores per prediction.
    pub num_classes: usize,
    /// Number of predictions.
    pub num_predictions: usize,
    /// `true` for `[N, 4 + nc]`, `false` for `[4 + nc, N]`.
    pub transposed: bool,
}

/// Post-process a raw detection output into [`Results`].
///
/// # Errors
///
/// Returns an error if the output shape does not describe a detection head
/// or disagrees with the amount of data.
#[allow(clippy::too_many_arguments)]
pub fn postprocess(
    output: &[f32],
    output_shape: &[usize],
    preprocess: &PreprocessResult,
    config: &InferenceConfig,
    names: &HashMap<usize, String>,
    path: String,
    speed: Speed,
) -> Result<Results> {
    let mut results = Results::new(
        preprocess.orig_shape,
        path,
        names.clone(),
        speed,
        preprocess.inference_shape(),
    );

    let layout = parse_detect_shape(output_shape, names.len())?;
    if layout.num_predictions == 0 {
        return Ok(results);
    }

    let num_features = 4 + layout.num_classes;
    let output_2d = if layout.transposed {
        Array2::from_shape_vec((layout.num_predictions, num_features), output.to_vec())
    } else {
        Array2::from_shape_vec((num_features, layout.num_predictions), output.to_vec())
            .map(|arr| arr.reversed_axes())
    }
    .map_err(|e| {
        InferenceError::PostProcessing(format!(
            "output of {} values does not match shape {output_shape:?}: {e}",
            output.len()
        ))
    })?;

    let boxes = extract_detect_boxes(output_2d.view(), preprocess, config);
    if boxes.nrows() > 0 {
        results.boxes = Some(Boxes::new(boxes, preprocess.orig_shape));
    }

    Ok(results)
}

/// Work out the detection layout from an output shape.
///
/// The batch dimension is ignored. When the model carries class names the
/// feature axis is the one equal to `4 + nc`; otherwise the smaller axis is
/// taken as features, since YOLO heads always have far more predictions than
/// classes.
///
/// # Errors
///
/// Returns an error for shapes with fewer than 2 or more than 3 dimensions,
/// or a batch size other than 1.
pub fn parse_detect_shape(shape: &[usize], expected_classes: usize) -> Result<DetectLayout> {
    let (a, b) = match *shape {
        [a, b] | [1, a, b] => (a, b),
        _ => {
            return Err(InferenceError::PostProcessing(format!(
                "unexpected detection output shape {shape:?}"
            )));
        }
    };

    let transposed = if expected_classes > 0 && a == 4 + expected_classes {
        false
    } else if expected_classes > 0 && b == 4 + expected_classes {
        true
    } else {
        b < a
    };

    let (num_features, num_predictions) = if transposed { (b, a) } else { (a, b) };
    if num_features <= 4 {
        return Err(InferenceError::PostProcessing(format!(
            "detection output shape {shape:?} has no class scores"
        )));
    }

    Ok(DetectLayout {
        num_classes: num_features - 4,
        num_predictions,
        transposed,
    })
}

/// Decode `[N, 4 + nc]` predictions into an `(M, 6)` array of kept boxes.
#[allow(clippy::cast_precision_loss)]
fn extract_detect_boxes(
    output: ArrayView2<'_, f32>,
    preprocess: &PreprocessResult,
    config: &InferenceConfig,
) -> Array2<f32> {
    let mut candidates: Vec<Candidate> = Vec::new();

    for row in output.rows() {
        // NaN scores count as zero
        let (best_class, best_score) = row
            .slice(s![4..])
            .iter()
            .map(|&score| if score.is_nan() { 0.0 } else { score })
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (idx, score)| {
                if score > best.1 { (idx, score) } else { best }
            });

        // Scores must beat the threshold, not just reach it
        if best_score <= config.confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);
        let xyxy = [cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0];
        let scaled = scale_coords(&xyxy, preprocess.scale, preprocess.padding);
        let clipped = clip_coords(&scaled, preprocess.orig_shape);

        candidates.push((clipped, best_score, best_class));
    }

    let keep = nms_per_class(&candidates, config.iou_threshold);
    let num_kept = keep.len().min(config.max_detections);

    let mut result = Array2::zeros((num_kept, 6));
    for (out_idx, &idx) in keep.iter().take(num_kept).enumerate() {
        let (bbox, score, class_id) = &candidates[idx];
        let mut row = result.row_mut(out_idx);
        row[0] = bbox[0];
        row[1] = bbox[1];
        row[2] = bbox[2];
        row[3] = bbox[3];
        row[4] = *score;
        row[5] = *class_id as f32;
    }

    result
}
