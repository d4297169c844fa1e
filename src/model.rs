// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! YOLO model loading and inference.
//!
//! [`YOLOModel`] wraps an ONNX Runtime session together with the metadata
//! embedded in the exported model.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use image::DynamicImage;
#[cfg(feature = "coreml")]
use ort::execution_providers::CoreMLExecutionProvider;
#[cfg(feature = "cuda")]
use ort::execution_providers::CUDAExecutionProvider;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::TensorRef;

use crate::error::{InferenceError, Result};
use crate::inference::InferenceConfig;
use crate::metadata::{METADATA_KEYS, ModelMetadata};
use crate::postprocessing::postprocess;
use crate::preprocessing::preprocess_image;
use crate::results::{Results, Speed};

/// Weights file loaded by the `predict` binary, relative to the working directory.
pub const DEFAULT_MODEL: &str = "best.onnx";

/// YOLO detection model.
///
/// # Example
///
/// ```no_run
/// use yolo_top1::YOLOModel;
///
/// let mut model = YOLOModel::load("best.onnx")?;
/// let results = model.predict("photo.jpg")?;
/// println!("Found {} detections", results[0].len());
/// # Ok::<(), yolo_top1::InferenceError>(())
/// ```
pub struct YOLOModel {
    /// ONNX Runtime session.
    session: Session,
    /// Model metadata (task, classes, etc.).
    metadata: ModelMetadata,
    /// Input tensor name.
    input_name: String,
    /// Name of the detection output.
    output_name: String,
    /// Inference configuration.
    config: InferenceConfig,
}

impl YOLOModel {
    /// Load a YOLO detection model from an ONNX file with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file doesn't exist, can't be loaded, or
    /// is not a detection model.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_config(path, InferenceConfig::default())
    }

    /// Load a YOLO detection model with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file doesn't exist, can't be loaded, or
    /// is not a detection model.
    pub fn load_with_config<P: AsRef<Path>>(path: P, config: InferenceConfig) -> Result<Self> {
        let path = path.as_ref();

        if let Some((h, w)) = config.imgsz
            && (h == 0 || w == 0)
        {
            return Err(InferenceError::ModelLoad(format!("Invalid input size {h}x{w}")));
        }

        if !path.exists() {
            return Err(InferenceError::ModelLoad(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        #[allow(unused_mut)]
        let mut builder = Session::builder()
            .map_err(|e| InferenceError::ModelLoad(format!("Failed to create session builder: {e}")))?;

        #[cfg(feature = "cuda")]
        {
            builder = builder
                .with_execution_providers([CUDAExecutionProvider::default().build()])
                .map_err(|e| InferenceError::ModelLoad(format!("Failed to register CUDA EP: {e}")))?;
        }

        #[cfg(feature = "coreml")]
        {
            builder = builder
                .with_execution_providers([CoreMLExecutionProvider::default()
                    .with_subgraphs(true)
                    .build()])
                .map_err(|e| InferenceError::ModelLoad(format!("Failed to register CoreML EP: {e}")))?;
        }

        let session = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::ModelLoad(format!("Failed to set optimization level: {e}")))?
            .with_intra_threads(config.num_threads)
            .map_err(|e| InferenceError::ModelLoad(format!("Failed to set intra-thread count: {e}")))?
            .commit_from_file(path)
            .map_err(|e| InferenceError::ModelLoad(format!("Failed to load model {}: {e}", path.display())))?;

        let metadata = Self::extract_metadata(&session)?;
        if !metadata.is_detect() {
            return Err(InferenceError::ModelLoad(format!(
                "{} is a '{}' model, expected a detection model",
                path.display(),
                metadata.task
            )));
        }

        let input_name = session
            .inputs
            .first()
            .map_or_else(|| "images".to_string(), |i| i.name.clone());
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| InferenceError::ModelLoad("Model has no outputs".to_string()))?;

        tracing::debug!(
            model = %path.display(),
            version = %metadata.version,
            classes = metadata.num_classes(),
            imgsz = ?metadata.imgsz,
            "loaded detection model"
        );

        Ok(Self {
            session,
            metadata,
            input_name,
            output_name,
            config,
        })
    }

    /// Read the Ultralytics custom properties from the session.
    fn extract_metadata(session: &Session) -> Result<ModelMetadata> {
        let model_metadata = session
            .metadata()
            .map_err(|e| InferenceError::ModelLoad(format!("Failed to get model metadata: {e}")))?;

        let properties: HashMap<String, String> = METADATA_KEYS
            .iter()
            .filter_map(|key| match model_metadata.custom(key) {
                Ok(Some(value)) => Some(((*key).to_string(), value)),
                _ => None,
            })
            .collect();

        if properties.is_empty() {
            tracing::warn!("model has no Ultralytics metadata, class names will be indices");
        }

        ModelMetadata::from_properties(&properties)
    }

    /// Run inference on an image file.
    ///
    /// Returns one [`Results`] per image (always one here).
    ///
    /// # Errors
    ///
    /// Returns an error if the image can't be loaded or inference fails.
    pub fn predict<P: AsRef<Path>>(&mut self, path: P) -> Result<Vec<Results>> {
        let path = path.as_ref();

        let img = image::open(path)?;

        self.predict_image(&img, path.to_string_lossy().into_owned())
    }

    /// Run inference on a decoded image.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails or the output can't be decoded.
    pub fn predict_image(&mut self, image: &DynamicImage, path: String) -> Result<Vec<Results>> {
        let target_size = self.config.imgsz.unwrap_or(self.metadata.imgsz);

        let start = Instant::now();
        let preprocessed = preprocess_image(image, target_size);
        let preprocess_time = start.elapsed().as_secs_f64() * 1000.0;

        let start = Instant::now();
        let (output, output_shape) = self.run_inference(&preprocessed.tensor)?;
        let inference_time = start.elapsed().as_secs_f64() * 1000.0;

        let start = Instant::now();
        let mut result = postprocess(
            &output,
            &output_shape,
            &preprocessed,
            &self.config,
            &self.metadata.names,
            path,
            Speed::new(preprocess_time, inference_time, 0.0),
        )?;
        result.speed.postprocess = Some(start.elapsed().as_secs_f64() * 1000.0);

        if self.config.verbose {
            let (h, w) = result.inference_shape;
            tracing::info!(
                "{}: {h}x{w} {}, {:.1}ms",
                result.path,
                result.verbose(),
                result.speed.inference.unwrap_or(0.0)
            );
        }
        tracing::debug!(
            preprocess_ms = preprocess_time,
            inference_ms = inference_time,
            postprocess_ms = result.speed.postprocess,
            total_ms = result.speed.total(),
            "prediction finished"
        );

        Ok(vec![result])
    }

    /// Run the ONNX session on an NCHW tensor, returning the first output and its shape.
    fn run_inference(&mut self, input: &ndarray::Array4<f32>) -> Result<(Vec<f32>, Vec<usize>)> {
        let input_contiguous = input.as_standard_layout();

        let input_tensor = TensorRef::from_array_view(&input_contiguous)
            .map_err(|e| InferenceError::Inference(format!("Failed to create input tensor: {e}")))?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| InferenceError::Inference(format!("Inference failed: {e}")))?;

        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            InferenceError::Inference(format!("Output '{}' not found", self.output_name))
        })?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Inference(format!("Failed to extract output: {e}")))?;

        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let shape_vec: Vec<usize> = shape.iter().map(|&d| d.max(0) as usize).collect();

        Ok((data.to_vec(), shape_vec))
    }

    /// Class ID to name mapping.
    #[must_use]
    pub const fn names(&self) -> &HashMap<usize, String> {
        &self.metadata.names
    }

    /// Number of classes.
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.metadata.num_classes()
    }

    /// Model input size (height, width) used for preprocessing.
    #[must_use]
    pub fn imgsz(&self) -> (usize, usize) {
        self.config.imgsz.unwrap_or(self.metadata.imgsz)
    }

    /// Model metadata.
    #[must_use]
    pub const fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

impl std::fmt::Debug for YOLOModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YOLOModel")
            .field("task", &self.metadata.task)
            .field("num_classes", &self.metadata.num_classes())
            .field("imgsz", &self.imgsz())
            .field("input", &self.input_name)
            .field("output", &self.output_name)
            .finish_non_exhaustive()
    }
}
