//! CLI integration tests for all subcommands.
//!
//! Uses `assert_cmd` to spawn the `ocgraph` binary and verify
//! exit codes, stdout content, and stderr content.
//!
//! All tests set `current_dir` to the workspace root so that relative
//! paths to the shared graph fixtures resolve correctly.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Locate the workspace root by walking up from CARGO_MANIFEST_DIR.
fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    // crates/cli -> workspace root is two levels up
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}

/// Helper: create a Command for the `ocgraph` binary, rooted at workspace,
/// with no configuration leaking in from the environment.
fn ocgraph() -> Command {
    let mut cmd = cargo_bin_cmd!("ocgraph");
    cmd.current_dir(workspace_root())
        .env_remove("OCGRAPH_EVALUATOR_URL")
        .env_remove("OCGRAPH_PORT")
        .env_remove("OCGRAPH_LOG");
    cmd
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().expect("failed to run ocgraph");
    assert!(output.status.success(), "ocgraph exited with {:?}", output.status);
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    ocgraph()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Constraint-graph compiler for object-centric event logs",
        ));
}

#[test]
fn version_exits_0() {
    ocgraph()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ocgraph"));
}

#[test]
fn unknown_subcommand_fails() {
    ocgraph().arg("frobnicate").assert().failure();
}

// ──────────────────────────────────────────────
// 2. compile
// ──────────────────────────────────────────────

#[test]
fn compile_prints_plan_in_evaluation_order() {
    ocgraph()
        .args(["compile", "fixtures/order-flow.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"nodesOrder\""))
        .stdout(predicate::str::contains("9007199254740991"))
        .stderr(predicate::str::contains("order: gate -> place -> pay"));
}

#[test]
fn compile_json_output_has_order_and_plan() {
    let json = stdout_json(ocgraph().args(["--output", "json", "compile", "fixtures/order-flow.json"]));
    assert_eq!(json["order"], serde_json::json!(["gate", "place", "pay"]));
    let nodes = json["plan"]["nodesOrder"].as_array().expect("nodesOrder array");
    let ids: Vec<&str> = nodes.iter().map(|n| n["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["place", "pay"]);
    assert_eq!(json["plan"]["variables"].as_array().unwrap().len(), 3);
    assert_eq!(json["diagnostics"], serde_json::json!([]));
}

#[test]
fn compile_cycle_exits_1_with_diagnostic() {
    ocgraph()
        .args(["compile", "fixtures/cycle.json"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("cycle detected"))
        .stderr(predicate::str::contains("load"));
}

#[test]
fn compile_cycle_json_lists_diagnostics() {
    ocgraph()
        .args(["--output", "json", "compile", "fixtures/cycle.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"kind\":\"cycle_detected\""))
        .stderr(predicate::str::contains("invalid requirements"));
}

#[test]
fn compile_missing_file_exits_1() {
    ocgraph()
        .args(["compile", "fixtures/nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("graph file not found"));
}

#[test]
fn compile_invalid_json_exits_1() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ \"nodes\": [").unwrap();
    ocgraph()
        .arg("compile")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid graph"));
}

#[test]
fn compile_quiet_prints_nothing() {
    ocgraph()
        .args(["--quiet", "compile", "fixtures/order-flow.json"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

// ──────────────────────────────────────────────
// 3. scope
// ──────────────────────────────────────────────

#[test]
fn scope_lists_inherited_variables() {
    ocgraph()
        .args(["scope", "fixtures/order-flow.json", "--node", "pay"])
        .assert()
        .success()
        .stdout(predicate::str::contains("event: ev_0"))
        .stdout(predicate::str::contains("object: ob_0, ob_1"));
}

#[test]
fn scope_of_gate_is_empty() {
    ocgraph()
        .args(["scope", "fixtures/order-flow.json", "--node", "gate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("event: (none)"))
        .stdout(predicate::str::contains("object: (none)"));
}

#[test]
fn scope_json_filters_by_kind() {
    let json = stdout_json(ocgraph().args([
        "--output",
        "json",
        "scope",
        "fixtures/order-flow.json",
        "--node",
        "pay",
        "--kind",
        "object",
    ]));
    assert_eq!(json, serde_json::json!({"node": "pay", "object": [0, 1]}));
}

#[test]
fn scope_unknown_node_exits_1() {
    ocgraph()
        .args(["scope", "fixtures/order-flow.json", "--node", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("node 'nope' not found"));
}

// ──────────────────────────────────────────────
// 4. replay
// ──────────────────────────────────────────────

#[test]
fn replay_builds_graph_from_commands() {
    let json = stdout_json(ocgraph().args(["--output", "json", "replay", "fixtures/commands.json"]));
    assert_eq!(json["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(json["edges"].as_array().unwrap().len(), 2);
    let ship = json["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["id"] == "ship")
        .expect("ship node");
    assert_eq!(ship["countConstraint"]["min"], 1);
}

#[test]
fn replay_text_reports_counts() {
    ocgraph()
        .args(["replay", "fixtures/commands.json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("3 node(s), 2 edge(s)"));
}

#[test]
fn replay_rejects_loop_with_index() {
    ocgraph()
        .args(["replay", "fixtures/loop-commands.json"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("command 3 rejected"))
        .stderr(predicate::str::contains("loops are forbidden"));
}

#[test]
fn replay_onto_existing_graph() {
    let dir = TempDir::new().unwrap();
    let commands = dir.path().join("commands.json");
    fs::write(
        &commands,
        r#"[
            {"command": "deleteNode", "id": "place"},
            {"command": "addNode", "node": {"id": "ship", "type": "eventType", "eventType": "ship order"}}
        ]"#,
    )
    .unwrap();
    let json = stdout_json(
        ocgraph()
            .args(["--output", "json", "replay"])
            .arg(&commands)
            .args(["--graph", "fixtures/order-flow.json"]),
    );
    let ids: Vec<&str> = json["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["pay", "gate", "ship"]);
    // Deleting a node removes the edges touching it.
    assert_eq!(json["edges"], serde_json::json!([]));
}

// ──────────────────────────────────────────────
// 5. evaluate
// ──────────────────────────────────────────────

#[test]
fn evaluate_with_saved_response_prints_results() {
    ocgraph()
        .args([
            "evaluate",
            "fixtures/order-flow.json",
            "--response",
            "fixtures/order-flow-response.json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("place: 2 situation(s), 0 violated (0%)"))
        .stdout(predicate::str::contains("pay: 3 situation(s), 1 violated (33.33%)"))
        .stdout(predicate::str::contains("ob_0=order-2, ob_1=customer-2"))
        .stdout(predicate::str::contains("Violations per step: 0, 1"));
}

#[test]
fn evaluate_json_keys_results_by_node() {
    let json = stdout_json(ocgraph().args([
        "--output",
        "json",
        "evaluate",
        "fixtures/order-flow.json",
        "--response",
        "fixtures/order-flow-response.json",
    ]));
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["nodeId"], "place");
    assert_eq!(results[1]["nodeId"], "pay");
    assert_eq!(results[1]["situationViolatedCount"], 1);
    assert_eq!(json["objectIds"][3], "customer-2");
}

#[test]
fn evaluate_unreachable_evaluator_exits_1() {
    ocgraph()
        .args([
            "evaluate",
            "fixtures/order-flow.json",
            "--evaluator",
            "http://127.0.0.1:1",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("evaluation failed"));
}

#[test]
fn evaluate_cycle_never_calls_evaluator() {
    ocgraph()
        .args([
            "evaluate",
            "fixtures/cycle.json",
            "--evaluator",
            "http://127.0.0.1:1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cycle detected"))
        .stderr(predicate::str::contains("evaluation failed").not());
}

#[test]
fn evaluate_short_response_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("short.json");
    fs::write(
        &path,
        r#"{"evaluationResults": [{"situationCount": 0, "situationViolatedCount": 0, "situations": []}],
            "eventIds": [], "objectIds": []}"#,
    )
    .unwrap();
    ocgraph()
        .args(["evaluate", "fixtures/order-flow.json", "--response"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected 2 results, got 1"));
}

// ──────────────────────────────────────────────
// 6. Configuration
// ──────────────────────────────────────────────

#[test]
fn config_file_sets_evaluator_url() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("ocgraph.toml");
    fs::write(
        &config,
        "[evaluator]\nurl = \"http://127.0.0.1:1\"\ntimeout_secs = 5\n",
    )
    .unwrap();
    ocgraph()
        .arg("--config")
        .arg(&config)
        .args(["evaluate", "fixtures/order-flow.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("evaluation failed"));
}

#[test]
fn config_default_file_is_read_from_current_dir() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("ocgraph.toml"), "[log]\nlevel = \"ocgraph=loud\"\n").unwrap();
    ocgraph()
        .current_dir(dir.path())
        .arg("compile")
        .arg(workspace_root().join("fixtures/order-flow.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid log level"));
}

#[test]
fn config_unknown_key_exits_1() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("ocgraph.toml");
    fs::write(&config, "[server]\nhost = \"0.0.0.0\"\n").unwrap();
    ocgraph()
        .arg("--config")
        .arg(&config)
        .args(["compile", "fixtures/order-flow.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not parse"));
}

#[test]
fn config_missing_explicit_file_exits_1() {
    ocgraph()
        .args(["--config", "no-such-config.toml", "compile", "fixtures/order-flow.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not read"));
}

#[test]
fn env_port_must_be_numeric() {
    ocgraph()
        .env("OCGRAPH_PORT", "http")
        .args(["compile", "fixtures/order-flow.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid OCGRAPH_PORT"));
}

#[test]
fn json_errors_are_objects() {
    ocgraph()
        .args(["--output", "json", "compile", "fixtures/nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("{\"error\":"));
}
