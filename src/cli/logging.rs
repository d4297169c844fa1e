// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use tracing::Level;

/// Install the global `tracing` subscriber.
///
/// Everything goes to stderr; stdout is reserved for the JSON record.
/// Quiet runs only show warnings and errors. Calling this more than once is
/// harmless.
pub fn init(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init(false);
        init(true);
        tracing::warn!("logging initialised twice");
    }
}
