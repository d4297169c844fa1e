// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Inference configuration.
//!
//! [`InferenceConfig`] holds the detection thresholds, the input size override
//! and ONNX Runtime threading. The `predict` binary always uses the defaults,
//! which match the Ultralytics Python predictor.

/// Thresholds and runtime settings for a [`YOLOModel`](crate::YOLOModel).
///
/// # Example
///
/// ```rust
/// use yolo_top1::InferenceConfig;
///
/// let strict = InferenceConfig::new().with_confidence(0.6).with_iou(0.5);
/// assert_eq!(strict.max_detections, 300);
/// ```
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Minimum class score a prediction needs to survive decoding.
    pub confidence_threshold: f32,
    /// Overlap above which a lower-scoring box of the same class is suppressed.
    pub iou_threshold: f32,
    /// Upper bound on boxes kept per image.
    pub max_detections: usize,
    /// Letterbox target (height, width). `None` uses the model's `imgsz`.
    pub imgsz: Option<(usize, usize)>,
    /// ONNX Runtime intra-op threads, `0` for automatic.
    pub num_threads: usize,
    /// Log a summary line per image.
    pub verbose: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            iou_threshold: 0.7,
            max_detections: 300,
            imgsz: None,
            num_threads: 0,
            verbose: false,
        }
    }
}

impl InferenceConfig {
    /// Same as [`InferenceConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the confidence threshold.
    #[must_use]
    pub const fn with_confidence(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Replace the NMS IoU threshold.
    #[must_use]
    pub const fn with_iou(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    /// Cap the number of boxes returned.
    #[must_use]
    pub const fn with_max_detections(mut self, max: usize) -> Self {
        self.max_detections = max;
        self
    }

    /// Force the letterbox size instead of reading it from metadata.
    #[must_use]
    pub const fn with_imgsz(mut self, height: usize, width: usize) -> Self {
        self.imgsz = Some((height, width));
        self
    }

    /// Pin ONNX Runtime to `threads` intra-op threads.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Toggle per-image summaries.
    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_python_predictor() {
        let config = InferenceConfig::new();
        assert!((config.confidence_threshold - 0.25).abs() < f32::EPSILON);
        assert!((config.iou_threshold - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.max_detections, 300);
        assert_eq!(config.num_threads, 0);
        assert!(config.imgsz.is_none());
        assert!(!config.verbose);
    }

    #[test]
    fn test_overrides() {
        let config = InferenceConfig::new()
            .with_confidence(0.4)
            .with_iou(0.5)
            .with_max_detections(10)
            .with_imgsz(320, 480)
            .with_threads(2)
            .with_verbose(true);

        assert!((config.confidence_threshold - 0.4).abs() < f32::EPSILON);
        assert!((config.iou_threshold - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.max_detections, 10);
        assert_eq!(config.imgsz, Some((320, 480)));
        assert_eq!(config.num_threads, 2);
        assert!(config.verbose);
    }
}
