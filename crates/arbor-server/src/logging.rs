use tracing_subscriber::EnvFilter;

use crate::error::{ServerError, ServerResult};

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over `level`. Fails if a subscriber is
/// already installed.
pub fn init_logging(level: &str, json: bool) -> ServerResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| ServerError::Config(format!("invalid log level {level:?}: {e}")))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| ServerError::Config(format!("cannot install logger: {e}")))
}
