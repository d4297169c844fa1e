// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]

//! # YOLO top-1 detection
//!
//! Runs an Ultralytics YOLO detection model (ONNX export) on a single image
//! and reports the highest-confidence detection.
//!
//! The `predict` binary is the main entry point. It loads `best.onnx` from
//! the working directory, runs it on the image given as its only argument
//! and prints one JSON line:
//!
//! ```bash
//! $ predict photo.jpg
//! {"label": "cat", "confidence": 0.92}
//!
//! $ predict blank.jpg
//! {"label": "unknown", "confidence": 0.0}
//!
//! $ predict
//! {"label": "error", "confidence": 0}
//! $ echo $?
//! 1
//! ```
//!
//! Nothing else is written to stdout. Model, image and inference failures
//! exit non-zero with a plain-text report on stderr instead of JSON, so
//! callers can tell a hard failure from an image with no detections.
//!
//! ## Library
//!
//! ```no_run
//! use yolo_top1::{Prediction, YOLOModel};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut model = YOLOModel::load("best.onnx")?;
//!     let results = model.predict("photo.jpg")?;
//!
//!     let top = Prediction::from_results(&results);
//!     println!("{}", top.to_json_line()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`model`] | [`YOLOModel`]: ONNX Runtime session, loading and prediction |
//! | [`prediction`] | [`Prediction`]: top-1 selection and the JSON record |
//! | [`results`] | [`Results`], [`Boxes`], [`Speed`] |
//! | [`inference`] | [`InferenceConfig`] thresholds and sizes |
//! | [`metadata`] | Ultralytics ONNX metadata parsing |
//! | [`preprocessing`] | Letterbox resize and tensor conversion |
//! | [`postprocessing`] | Detection decoding and NMS |
//! | [`error`] | [`InferenceError`] and [`Result`] |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `cuda` | NVIDIA CUDA execution provider |
//! | `coreml` | Apple `CoreML` execution provider |

pub mod cli;
pub mod error;
pub mod inference;
pub mod metadata;
pub mod model;
pub mod postprocessing;
pub mod prediction;
pub mod preprocessing;
pub mod results;
pub mod utils;

pub use error::{InferenceError, Result};
pub use inference::InferenceConfig;
pub use metadata::ModelMetadata;
pub use model::{DEFAULT_MODEL, YOLOModel};
pub use prediction::Prediction;
pub use results::{Boxes, Results, Speed};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
