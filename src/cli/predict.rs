// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};

use crate::cli::args::Cli;
use crate::model::DEFAULT_MODEL;
use crate::prediction::Prediction;
use crate::{InferenceConfig, YOLOModel};

/// Exit status used when no image path was given.
pub const MISSING_INPUT_EXIT: u8 = 1;

/// Run the model on the image named in `args` and print the top detection.
///
/// A missing image argument prints the error record and exits with
/// [`MISSING_INPUT_EXIT`] without touching the model. Any failure after that
/// (model, image, inference) is returned as an error and nothing is printed
/// on stdout.
///
/// # Errors
///
/// Returns an error if the model or image can't be loaded or inference fails.
pub fn run_prediction(args: &Cli, config: InferenceConfig) -> Result<ExitCode> {
    let Some(source) = args.source.as_deref() else {
        tracing::debug!("no image argument given");
        emit(&Prediction::MissingInput)?;
        return Ok(ExitCode::from(MISSING_INPUT_EXIT));
    };

    let prediction = predict_top(Path::new(DEFAULT_MODEL), source, config)?;
    emit(&prediction)?;
    Ok(ExitCode::SUCCESS)
}

/// Load `model_path` and return the top detection for `source`.
///
/// # Errors
///
/// Returns an error if the model or image can't be loaded or inference fails.
pub fn predict_top(model_path: &Path, source: &Path, config: InferenceConfig) -> Result<Prediction> {
    let mut model = YOLOModel::load_with_config(model_path, config)
        .with_context(|| format!("failed to load model {}", model_path.display()))?;

    let results = model
        .predict(source)
        .with_context(|| format!("prediction failed for {}", source.display()))?;

    let prediction = Prediction::from_results(&results);
    tracing::debug!(label = prediction.label(), confidence = prediction.confidence(), "top detection");
    Ok(prediction)
}

fn emit(prediction: &Prediction) -> Result<()> {
    println!("{}", prediction.to_json_line()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_is_an_error() {
        let err = predict_top(
            Path::new("definitely-missing-model.onnx"),
            Path::new("photo.jpg"),
            InferenceConfig::default(),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("definitely-missing-model.onnx"));
    }
}
