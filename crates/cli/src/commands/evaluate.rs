use std::path::Path;
use std::process;
use std::sync::Arc;

use ocgraph_core::{compile_plan, Graph};
use ocgraph_eval::{
    violation_percentage, EvaluationOutcome, Evaluator, HttpEvaluator, Orchestrator,
    ResultsView, StaticEvaluator,
};

use super::compile::report_compile_error;
use super::{print_json, read_json_file};
use crate::config::EvaluatorConfig;
use crate::{report_error, OutputFormat};

pub(crate) struct EvaluateOptions<'a> {
    pub(crate) graph: &'a Path,
    pub(crate) evaluator: &'a EvaluatorConfig,
    /// Saved evaluator response to answer with instead of the HTTP evaluator.
    pub(crate) response: Option<&'a Path>,
    /// Violations listed per node in text output.
    pub(crate) limit: usize,
    pub(crate) output: OutputFormat,
    pub(crate) quiet: bool,
}

pub(crate) fn cmd_evaluate(opts: EvaluateOptions<'_>) {
    let output = opts.output;
    let quiet = opts.quiet;

    let graph: Graph = read_json_file(opts.graph, "graph", output, quiet);
    let plan = match compile_plan(&graph) {
        Ok(p) => p,
        Err(e) => {
            report_compile_error(&e, output, quiet);
            process::exit(1);
        }
    };

    let evaluator: Arc<dyn Evaluator> = match opts.response {
        Some(path) => Arc::new(load_saved_response(path, output, quiet)),
        None => Arc::new(
            HttpEvaluator::new(&opts.evaluator.url).with_timeout(opts.evaluator.timeout()),
        ),
    };
    let orchestrator = Orchestrator::new(evaluator);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            let msg = format!("error: failed to create tokio runtime: {}", e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let view = match rt.block_on(orchestrator.evaluate(&plan)) {
        Ok(EvaluationOutcome::Applied(view)) => view,
        Ok(EvaluationOutcome::Stale) => {
            report_error("error: evaluation result was discarded", output, quiet);
            process::exit(1);
        }
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => print_json(&view),
        OutputFormat::Text => print_view(&view, opts.limit),
    }
}

fn load_saved_response(path: &Path, output: OutputFormat, quiet: bool) -> StaticEvaluator {
    let content = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => {
            let msg = format!("error: response file not found: {}", path.display());
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    match ocgraph_interchange::parse_response(&content) {
        Ok(response) => StaticEvaluator::from_response(&response),
        Err(e) => {
            let msg = format!("error: invalid response in {}: {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

fn print_view(view: &ResultsView, limit: usize) {
    for r in &view.results {
        println!(
            "{}: {} situation(s), {} violated ({}%)",
            r.node_id,
            r.result.situation_count,
            r.result.situation_violated_count,
            violation_percentage(&r.result)
        );
        for binding in view.violations(&r.node_id, limit) {
            let bound: Vec<String> = binding
                .events
                .iter()
                .chain(binding.objects.iter())
                .map(|(var, id)| format!("{}={}", var, id))
                .collect();
            match binding.violation {
                Some(reason) => println!("  - {}: {}", reason, bound.join(", ")),
                None => println!("  - {}", bound.join(", ")),
            }
        }
    }
    println!("{}", view.summary());
}
