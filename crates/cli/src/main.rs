mod commands;
mod config;
mod logging;
mod serve;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Variable kind accepted by `ocgraph scope --kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum KindArg {
    Event,
    Object,
}

impl From<KindArg> for ocgraph_core::VariableKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Event => ocgraph_core::VariableKind::Event,
            KindArg::Object => ocgraph_core::VariableKind::Object,
        }
    }
}

/// Constraint-graph compiler for object-centric event logs.
#[derive(Parser)]
#[command(
    name = "ocgraph",
    version,
    about = "Constraint-graph compiler for object-centric event logs"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Path to the configuration file (default: ./ocgraph.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a graph and print the evaluator plan
    Compile {
        /// Path to the graph JSON file
        graph: PathBuf,
    },

    /// Print the variables visible at a node
    Scope {
        /// Path to the graph JSON file
        graph: PathBuf,
        /// Node id to resolve
        #[arg(long)]
        node: String,
        /// Only list variables of this kind
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },

    /// Apply a list of graph commands and print the resulting graph
    Replay {
        /// Path to the JSON array of commands
        commands: PathBuf,
        /// Graph to start from (default: empty)
        #[arg(long)]
        graph: Option<PathBuf>,
    },

    /// Compile a graph, send it to an evaluator and print per-node results
    Evaluate {
        /// Path to the graph JSON file
        graph: PathBuf,
        /// Evaluator base URL (overrides the config file)
        #[arg(long)]
        evaluator: Option<String>,
        /// Answer with a saved evaluator response instead of calling out
        #[arg(long, conflicts_with = "evaluator")]
        response: Option<PathBuf>,
        /// Maximum number of violations listed per node
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },

    /// Start the HTTP JSON API server
    Serve {
        /// Port to listen on (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            report_error(&format!("error: {}", e), cli.output, cli.quiet);
            process::exit(1);
        }
    };
    if let Err(e) = logging::init_logging(&config.log, cli.quiet) {
        report_error(&format!("error: {}", e), cli.output, cli.quiet);
        process::exit(1);
    }

    match cli.command {
        Commands::Compile { graph } => {
            commands::compile::cmd_compile(&graph, cli.output, cli.quiet);
        }
        Commands::Scope { graph, node, kind } => {
            commands::scope::cmd_scope(&graph, &node, kind, cli.output, cli.quiet);
        }
        Commands::Replay { commands, graph } => {
            commands::replay::cmd_replay(&commands, graph.as_deref(), cli.output, cli.quiet);
        }
        Commands::Evaluate {
            graph,
            evaluator,
            response,
            limit,
        } => {
            let mut evaluator_config = config.evaluator.clone();
            if let Some(url) = evaluator {
                evaluator_config.url = url;
            }
            commands::evaluate::cmd_evaluate(commands::evaluate::EvaluateOptions {
                graph: &graph,
                evaluator: &evaluator_config,
                response: response.as_deref(),
                limit,
                output: cli.output,
                quiet: cli.quiet,
            });
        }
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    report_error(
                        &format!("error: failed to create tokio runtime: {}", e),
                        cli.output,
                        cli.quiet,
                    );
                    process::exit(1);
                }
            };
            if let Err(e) = rt.block_on(serve::start_server(port, config.evaluator)) {
                eprintln!("Server error: {}", e);
                process::exit(1);
            }
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
