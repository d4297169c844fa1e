// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Results classes for YOLO inference output.
//!
//! The shapes follow the Ultralytics Python `Results` / `Boxes` API so code
//! written against `results[0].boxes.conf` reads the same way here.

use std::collections::BTreeMap;
use std::collections::HashMap;

use ndarray::{Array2, ArrayView1};

/// Timing information for inference operations (in milliseconds).
#[derive(Debug, Clone, Default)]
pub struct Speed {
    /// Time spent on preprocessing.
    pub preprocess: Option<f64>,
    /// Time spent on model inference.
    pub inference: Option<f64>,
    /// Time spent on postprocessing.
    pub postprocess: Option<f64>,
}

impl Speed {
    /// Create a new Speed instance with all timings.
    #[must_use]
    pub const fn new(preprocess: f64, inference: f64, postprocess: f64) -> Self {
        Self {
            preprocess: Some(preprocess),
            inference: Some(inference),
            postprocess: Some(postprocess),
        }
    }

    /// Sum of all recorded timings in milliseconds.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.preprocess.unwrap_or(0.0)
            + self.inference.unwrap_or(0.0)
            + self.postprocess.unwrap_or(0.0)
    }
}

/// Detection results for one image.
#[derive(Debug, Clone)]
pub struct Results {
    /// Original image shape (height, width).
    pub orig_shape: (u32, u32),
    /// Inference tensor shape (height, width) after letterboxing.
    pub inference_shape: (u32, u32),
    /// Detection bounding boxes, `None` when nothing passed the thresholds.
    pub boxes: Option<Boxes>,
    /// Inference timing information.
    pub speed: Speed,
    /// Class ID to name mapping.
    pub names: HashMap<usize, String>,
    /// Path to the source image.
    pub path: String,
}

impl Results {
    /// Create an empty Results instance.
    #[must_use]
    pub const fn new(
        orig_shape: (u32, u32),
        path: String,
        names: HashMap<usize, String>,
        speed: Speed,
        inference_shape: (u32, u32),
    ) -> Self {
        Self {
            orig_shape,
            inference_shape,
            boxes: None,
            speed,
            names,
            path,
        }
    }

    /// Number of detections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.as_ref().map_or(0, Boxes::len)
    }

    /// Check if there are no detections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of `class_id`, or `class{id}` when the model has no name for it.
    #[must_use]
    pub fn class_name(&self, class_id: usize) -> String {
        self.names
            .get(&class_id)
            .cloned()
            .unwrap_or_else(|| format!("class{class_id}"))
    }

    /// Detection summary such as `"2 cats, 1 dog"`, ordered by class ID.
    #[must_use]
    pub fn verbose(&self) -> String {
        let Some(boxes) = self.boxes.as_ref().filter(|b| !b.is_empty()) else {
            return "(no detections)".to_string();
        };

        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for &c in boxes.cls() {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let c = c as usize;
            *counts.entry(c).or_insert(0) += 1;
        }

        counts
            .iter()
            .map(|(&class_id, &count)| {
                let suffix = if count > 1 { "s" } else { "" };
                format!("{count} {}{suffix}", self.class_name(class_id))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Detection bounding boxes.
///
/// Stores boxes in xyxy format with confidence scores and class IDs, one row
/// per detection: `[x1, y1, x2, y2, conf, cls]`.
#[derive(Debug, Clone)]
pub struct Boxes {
    /// Raw data array with shape (N, 6).
    pub data: Array2<f32>,
    /// Original image shape (height, width).
    pub orig_shape: (u32, u32),
}

impl Boxes {
    /// Create a new Boxes instance from an (N, 6) array.
    #[must_use]
    pub const fn new(data: Array2<f32>, orig_shape: (u32, u32)) -> Self {
        Self { data, orig_shape }
    }

    /// Number of boxes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    /// Check if there are no boxes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Confidence scores.
    #[must_use]
    pub fn conf(&self) -> ArrayView1<'_, f32> {
        self.data.column(4)
    }

    /// Class IDs (stored as `f32`).
    #[must_use]
    pub fn cls(&self) -> ArrayView1<'_, f32> {
        self.data.column(5)
    }
}
