//! Subcommand implementations. Each `cmd_*` prints its result and exits
//! with status 1 on failure.

pub(crate) mod compile;
pub(crate) mod evaluate;
pub(crate) mod replay;
pub(crate) mod scope;

use std::path::Path;
use std::process;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{report_error, OutputFormat};

/// Read `path` and parse it as JSON into `T`, or report and exit.
/// `what` names the file in error messages ("graph", "commands").
pub(crate) fn read_json_file<T: DeserializeOwned>(
    path: &Path,
    what: &str,
    output: OutputFormat,
    quiet: bool,
) -> T {
    let content = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => {
            let msg = format!("error: {} file not found: {}", what, path.display());
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("error: invalid {} in {}: {}", what, path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

/// Print `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| format!("serialization error: {}", e))
    );
}
