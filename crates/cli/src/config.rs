//! `ocgraph.toml` configuration.
//!
//! Every section is optional; missing keys take their defaults. Environment
//! variables override the file, and command-line flags override both.
//!
//! # Example
//!
//! ```toml
//! [evaluator]
//! url = "http://localhost:3000"
//! timeout_secs = 120
//!
//! [server]
//! port = 8080
//!
//! [log]
//! level = "info"
//! json = false
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// File read when `--config` is not given, if it exists.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "ocgraph.toml";

pub(crate) const ENV_EVALUATOR_URL: &str = "OCGRAPH_EVALUATOR_URL";
pub(crate) const ENV_PORT: &str = "OCGRAPH_PORT";
pub(crate) const ENV_LOG: &str = "OCGRAPH_LOG";

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub(crate) evaluator: EvaluatorConfig,
    pub(crate) server: ServerConfig,
    pub(crate) log: LogConfig,
}

/// `[evaluator]` section: where plans are sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct EvaluatorConfig {
    pub(crate) url: String,
    pub(crate) timeout_secs: u64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        EvaluatorConfig {
            url: "http://localhost:3000".to_string(),
            timeout_secs: 120,
        }
    }
}

impl EvaluatorConfig {
    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[server]` section for `ocgraph serve`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ServerConfig {
    pub(crate) port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { port: 8080 }
    }
}

/// `[log]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LogConfig {
    /// An `EnvFilter` directive, e.g. `"info"` or `"ocgraph_core=debug,warn"`.
    pub(crate) level: String,
    pub(crate) json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ── Functions ─────────────────────────────────────────────────────────────────

/// Load the configuration.
///
/// An explicit `path` must exist. Without one, `./ocgraph.toml` is read
/// when present and defaults are used otherwise. Environment overrides
/// are applied last.
pub(crate) fn load(path: Option<&Path>) -> Result<Config, String> {
    let mut config = match path {
        Some(p) => read_config(p)?,
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                read_config(&default)?
            } else {
                Config::default()
            }
        }
    };
    apply_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

/// Read and parse a config TOML file from `path`.
pub(crate) fn read_config(path: &Path) -> Result<Config, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

/// Apply environment overrides, reading variables through `lookup`.
pub(crate) fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_EVALUATOR_URL).filter(|v| !v.is_empty()) {
        config.evaluator.url = url;
    }
    if let Some(port) = lookup(ENV_PORT).filter(|v| !v.is_empty()) {
        config.server.port = port
            .parse()
            .map_err(|_| format!("invalid {}: '{}' is not a port number", ENV_PORT, port))?;
    }
    if let Some(level) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
        config.log.level = level;
    }
    Ok(())
}
