//! Tracing subscriber setup for the `ocgraph` binary.
//!
//! Logs always go to stderr so stdout carries only command output.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogConfig;

/// Install the global subscriber.
///
/// `config.level` is an `EnvFilter` directive; by the time it gets here it
/// already reflects `OCGRAPH_LOG`. With `quiet`, only errors are logged.
pub(crate) fn init_logging(config: &LogConfig, quiet: bool) -> Result<(), String> {
    let directive = if quiet { "error" } else { config.level.as_str() };
    let filter = EnvFilter::try_new(directive)
        .map_err(|e| format!("invalid log level '{}': {}", directive, e))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()
    };
    result.map_err(|e| format!("could not install log subscriber: {}", e))
}
