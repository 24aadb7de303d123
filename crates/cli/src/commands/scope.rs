use std::path::Path;
use std::process;

use ocgraph_core::{resolve_variables, Graph, Variable, VariableKind};

use super::{print_json, read_json_file};
use crate::{report_error, KindArg, OutputFormat};

pub(crate) fn cmd_scope(
    graph_path: &Path,
    node_id: &str,
    kind: Option<KindArg>,
    output: OutputFormat,
    quiet: bool,
) {
    let graph: Graph = read_json_file(graph_path, "graph", output, quiet);
    if graph.node(node_id).is_none() {
        let msg = format!("error: node '{}' not found in {}", node_id, graph_path.display());
        report_error(&msg, output, quiet);
        process::exit(1);
    }

    let resolved = resolve_variables(&graph, node_id);
    if quiet {
        return;
    }

    let kinds: Vec<VariableKind> = match kind {
        Some(k) => vec![k.into()],
        None => vec![VariableKind::Event, VariableKind::Object],
    };

    match output {
        OutputFormat::Json => {
            let mut scope = serde_json::Map::new();
            scope.insert("node".to_string(), serde_json::json!(node_id));
            for k in &kinds {
                scope.insert(k.to_string(), serde_json::json!(resolved.of_kind(*k)));
            }
            print_json(&serde_json::Value::Object(scope));
        }
        OutputFormat::Text => {
            for k in kinds {
                let names: Vec<String> = resolved
                    .of_kind(k)
                    .iter()
                    .map(|i| Variable::of_kind(k, *i).to_string())
                    .collect();
                let listed = if names.is_empty() {
                    "(none)".to_string()
                } else {
                    names.join(", ")
                };
                println!("{}: {}", k, listed);
            }
        }
    }
}
