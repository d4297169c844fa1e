// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"Loads best.onnx from the working directory and prints the
highest-confidence detection as one JSON line:

    {"label": "cat", "confidence": 0.92}

Examples:
    predict photo.jpg
    predict /data/uploads/blank.png"#)]
pub struct Cli {
    /// Image to run detection on
    #[arg(allow_hyphen_values = true)]
    pub source: Option<PathBuf>,

    /// Anything after the image path is accepted and ignored.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    pub rest: Vec<OsString>,
}
