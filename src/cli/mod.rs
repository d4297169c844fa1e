// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CLI module for the `predict` binary.
//!
//! Argument parsing, log setup and the prediction command itself.

/// CLI arguments.
pub mod args;

/// Log setup.
pub mod logging;

/// Prediction logic.
pub mod predict;
