//! Logging setup built on `tracing-subscriber`.
//!
//! The base level comes from the configuration; a set `RUST_LOG` wins over
//! it. Output goes to stdout unless `logging.file_path` points at a file.

use std::ffi::OsStr;
use std::path::Path;

use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingSection;

/// Initializes logging from the loaded configuration. Safe to call more
/// than once; later calls are no-ops.
pub fn init_from_config(config: &LoggingSection) {
    let _ = try_init(config);
}

/// Initializes logging with defaults, for examples and tests.
pub fn init() {
    let _ = try_init(&LoggingSection::default());
}

fn build_filter(config: &LoggingSection) -> EnvFilter {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    for (module, level) in &config.filters {
        if let Ok(directive) = format!("{module}={level}").parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

fn try_init(config: &LoggingSection) -> Result<(), TryInitError> {
    let filter = build_filter(config);

    match &config.file_path {
        Some(path) => {
            let appender = tracing_appender::rolling::never(
                path.parent().unwrap_or_else(|| Path::new(".")),
                path.file_name().unwrap_or_else(|| OsStr::new("trellis.log")),
            );
            let layer = fmt::layer()
                .compact()
                .with_ansi(false)
                .with_writer(appender);
            tracing_subscriber::registry()
                .with(layer)
                .with(filter)
                .try_init()
        }
        None => {
            let layer = fmt::layer().compact().with_writer(std::io::stdout);
            tracing_subscriber::registry()
                .with(layer)
                .with(filter)
                .try_init()
        }
    }
}
