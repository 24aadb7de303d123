use std::path::Path;
use std::process;

use ocgraph_core::{compile, CompileError, Diagnostic, Graph};

use super::{print_json, read_json_file};
use crate::OutputFormat;

pub(crate) fn cmd_compile(graph_path: &Path, output: OutputFormat, quiet: bool) {
    let graph: Graph = read_json_file(graph_path, "graph", output, quiet);
    let compilation = compile(&graph);

    let order = compilation.order.clone();
    let warnings: Vec<Diagnostic> = compilation.warnings().cloned().collect();
    let plan = match compilation.into_plan() {
        Ok(p) => p,
        Err(e) => {
            report_compile_error(&e, output, quiet);
            process::exit(1);
        }
    };

    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => {
            for w in &warnings {
                eprintln!("{}", w);
            }
            eprintln!("order: {}", order.join(" -> "));
            print_json(&plan);
        }
        OutputFormat::Json => {
            let diagnostics: Vec<serde_json::Value> =
                warnings.iter().map(Diagnostic::to_json_value).collect();
            print_json(&serde_json::json!({
                "order": order,
                "plan": plan,
                "diagnostics": diagnostics,
            }));
        }
    }
}

/// Every diagnostic goes to stderr, warnings included, so the user sees
/// what else was wrong with the graph.
pub(crate) fn report_compile_error(err: &CompileError, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => {
            for d in &err.diagnostics {
                eprintln!("{}", d);
            }
        }
        OutputFormat::Json => {
            let diagnostics: Vec<serde_json::Value> =
                err.diagnostics.iter().map(Diagnostic::to_json_value).collect();
            let err_json = serde_json::json!({
                "error": err.to_string(),
                "diagnostics": diagnostics,
            });
            eprintln!("{}", err_json);
        }
    }
}
