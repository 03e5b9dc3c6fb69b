//! Logger setup for the command-line binary.

use flexi_logger::{Logger, LoggerHandle, default_format};

use crate::{Error, Result};

/// Start logging to stderr.
///
/// `RUST_LOG` takes precedence; otherwise `verbose` selects `debug` over
/// `warn`. Keep the returned handle alive for as long as logs should be
/// written.
///
/// # Errors
///
/// Returns [`Error::Logger`] if the log specification is invalid or a logger
/// is already installed.
pub fn init_logging(verbose: bool) -> Result<LoggerHandle> {
    let fallback = if verbose { "debug" } else { "warn" };
    Logger::try_with_env_or_str(fallback)
        .and_then(|logger| logger.log_to_stderr().format(default_format).start())
        .map_err(|e| Error::Logger {
            message: e.to_string(),
        })
}
