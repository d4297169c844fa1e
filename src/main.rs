// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process::ExitCode;

use clap::Parser;
use yolo_top1::InferenceConfig;
use yolo_top1::cli::args::Cli;
use yolo_top1::cli::{logging, predict};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = InferenceConfig::default();
    logging::init(config.verbose);

    predict::run_prediction(&cli, config)
}
