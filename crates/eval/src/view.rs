//! Evaluation results as the display layer sees them: keyed by node id,
//! with bindings resolvable to concrete event and object ids.

use ocgraph_core::Plan;
use ocgraph_interchange::{Binding, EvaluationResponse, NodeEvaluationResult, ViolationReason};
use serde::Serialize;
use std::collections::BTreeMap;

/// Share of violated situations in percent, rounded to two decimals.
/// A node without situations has no violations.
pub fn violation_percentage(result: &NodeEvaluationResult) -> f64 {
    if result.situation_count == 0 {
        return 0.0;
    }
    let ratio = result.situation_violated_count as f64 / result.situation_count as f64;
    (ratio * 100.0 * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResult {
    pub node_id: String,
    #[serde(flatten)]
    pub result: NodeEvaluationResult,
}

/// A binding with variable names and concrete ids in place of indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedBinding {
    /// `ev_{n}` -> event id.
    pub events: BTreeMap<String, String>,
    /// `ob_{n}` -> object id.
    pub objects: BTreeMap<String, String>,
    pub violation: Option<ViolationReason>,
}

/// Latest applied evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsView {
    pub results: Vec<NodeResult>,
    pub event_ids: Vec<String>,
    pub object_ids: Vec<String>,
}

impl ResultsView {
    /// Zip a response onto the plan it answers. Callers check the lengths
    /// first; surplus entries on either side are dropped.
    pub fn new(plan: &Plan, response: EvaluationResponse) -> Self {
        let results = plan
            .node_ids()
            .zip(response.evaluation_results)
            .map(|(id, result)| NodeResult {
                node_id: id.to_string(),
                result,
            })
            .collect();
        ResultsView {
            results,
            event_ids: response.event_ids,
            object_ids: response.object_ids,
        }
    }

    pub fn get(&self, node_id: &str) -> Option<&NodeEvaluationResult> {
        self.results
            .iter()
            .find(|r| r.node_id == node_id)
            .map(|r| &r.result)
    }

    pub fn violation_percentage(&self, node_id: &str) -> Option<f64> {
        self.get(node_id).map(violation_percentage)
    }

    pub fn total_violations(&self) -> usize {
        self.results
            .iter()
            .map(|r| r.result.situation_violated_count)
            .sum()
    }

    /// Two-line per-step summary shown once an evaluation finishes.
    pub fn summary(&self) -> String {
        let situations: Vec<String> = self
            .results
            .iter()
            .map(|r| r.result.situation_count.to_string())
            .collect();
        let violations: Vec<String> = self
            .results
            .iter()
            .map(|r| r.result.situation_violated_count.to_string())
            .collect();
        format!(
            "Situations per step: {}\nViolations per step: {}",
            situations.join(", "),
            violations.join(", ")
        )
    }

    /// Replace indices with ids. Indices outside the tables are skipped;
    /// responses are validated before they reach a view.
    pub fn resolve(&self, binding: &Binding, violation: Option<ViolationReason>) -> ResolvedBinding {
        let events = binding
            .event_map
            .iter()
            .filter_map(|(var, idx)| Some((format!("ev_{}", var), self.event_ids.get(*idx)?.clone())))
            .collect();
        let objects = binding
            .object_map
            .iter()
            .filter_map(|(var, idx)| {
                Some((format!("ob_{}", var), self.object_ids.get(*idx)?.clone()))
            })
            .collect();
        ResolvedBinding {
            events,
            objects,
            violation,
        }
    }

    /// Violated situations of one node, resolved. At most `limit` are returned.
    pub fn violations(&self, node_id: &str, limit: usize) -> Vec<ResolvedBinding> {
        self.get(node_id)
            .map(|result| {
                result
                    .violations()
                    .take(limit)
                    .map(|(binding, reason)| self.resolve(binding, Some(reason)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(total: usize, violated: usize) -> NodeEvaluationResult {
        NodeEvaluationResult {
            situation_count: total,
            situation_violated_count: violated,
            situations: vec![],
        }
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert_eq!(violation_percentage(&result(3, 1)), 33.33);
        assert_eq!(violation_percentage(&result(3, 2)), 66.67);
        assert_eq!(violation_percentage(&result(4, 4)), 100.0);
    }

    #[test]
    fn percentage_without_situations_is_zero() {
        assert_eq!(violation_percentage(&result(0, 0)), 0.0);
    }

    fn view() -> ResultsView {
        let mut binding = Binding::default();
        binding.event_map.insert(0, 1);
        binding.object_map.insert(2, 0);
        ResultsView {
            results: vec![
                NodeResult {
                    node_id: "a".into(),
                    result: result(5, 0),
                },
                NodeResult {
                    node_id: "b".into(),
                    result: NodeEvaluationResult {
                        situation_count: 2,
                        situation_violated_count: 1,
                        situations: vec![
                            (Binding::default(), None),
                            (binding, Some(ViolationReason::ChildNotSatisfied)),
                        ],
                    },
                },
            ],
            event_ids: vec!["e0".into(), "e1".into()],
            object_ids: vec!["o0".into()],
        }
    }

    #[test]
    fn summary_lists_counts_per_step() {
        assert_eq!(
            view().summary(),
            "Situations per step: 5, 2\nViolations per step: 0, 1"
        );
    }

    #[test]
    fn violations_resolve_to_ids() {
        let v = view();
        let resolved = v.violations("b", 10);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].events["ev_0"], "e1");
        assert_eq!(resolved[0].objects["ob_2"], "o0");
        assert_eq!(resolved[0].violation, Some(ViolationReason::ChildNotSatisfied));
        assert!(v.violations("zzz", 10).is_empty());
        assert_eq!(v.violation_percentage("b"), Some(50.0));
        assert_eq!(v.total_violations(), 1);
    }
}
