use std::path::Path;
use std::process;

use ocgraph_core::{Graph, GraphCommand, GraphState};

use super::{print_json, read_json_file};
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_replay(
    commands_path: &Path,
    graph_path: Option<&Path>,
    output: OutputFormat,
    quiet: bool,
) {
    let commands: Vec<GraphCommand> = read_json_file(commands_path, "commands", output, quiet);
    let mut state = match graph_path {
        Some(p) => GraphState::from_graph(read_json_file::<Graph>(p, "graph", output, quiet)),
        None => GraphState::new(),
    };

    let count = commands.len();
    if let Err(e) = state.replay(commands) {
        report_error(&format!("error: {}", e), output, quiet);
        process::exit(1);
    }
    tracing::debug!(commands = count, "replay applied");

    if quiet {
        return;
    }
    let graph = state.into_graph();
    match output {
        OutputFormat::Json => print_json(&graph),
        OutputFormat::Text => {
            eprintln!(
                "applied {} command(s): {} node(s), {} edge(s)",
                count,
                graph.nodes.len(),
                graph.edges.len()
            );
            print_json(&graph);
        }
    }
}
