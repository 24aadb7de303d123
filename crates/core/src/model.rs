//! Graph model: nodes, edges, variables and authored bounds.
//!
//! These are the types the canvas layer edits. They carry no logic beyond
//! lookups; validation lives in [`crate::edit`] and [`crate::compile`].

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// Default stroke color of a freshly connected edge.
pub const DEFAULT_EDGE_COLOR: &str = "#969696";

// ── Bounds ───────────────────────────────────────────────────────────────────

/// An authored numeric bound. The canvas shows the infinite variants as ∞.
///
/// Ordering follows the number line: `NegInfinity < Finite(_) < PosInfinity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Limit {
    NegInfinity,
    Finite(i64),
    PosInfinity,
}

impl From<i64> for Limit {
    fn from(value: i64) -> Self {
        Limit::Finite(value)
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::NegInfinity => write!(f, "-∞"),
            Limit::Finite(n) => write!(f, "{}", n),
            Limit::PosInfinity => write!(f, "∞"),
        }
    }
}

impl Serialize for Limit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Limit::NegInfinity => serializer.serialize_str("-inf"),
            Limit::Finite(n) => serializer.serialize_i64(*n),
            Limit::PosInfinity => serializer.serialize_str("inf"),
        }
    }
}

struct LimitVisitor;

impl<'de> Visitor<'de> for LimitVisitor {
    type Value = Limit;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer, \"inf\" or \"-inf\"")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Limit, E> {
        Ok(Limit::Finite(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Limit, E> {
        i64::try_from(v)
            .map(Limit::Finite)
            .map_err(|_| E::custom(format!("bound {} is out of range", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Limit, E> {
        if v == f64::INFINITY {
            Ok(Limit::PosInfinity)
        } else if v == f64::NEG_INFINITY {
            Ok(Limit::NegInfinity)
        } else if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
            Ok(Limit::Finite(v as i64))
        } else {
            Err(E::custom(format!("bound {} is not an integer", v)))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Limit, E> {
        match v.trim() {
            "inf" | "+inf" | "∞" | "+∞" | "Infinity" | "+Infinity" => Ok(Limit::PosInfinity),
            "-inf" | "-∞" | "-Infinity" => Ok(Limit::NegInfinity),
            other => other
                .parse::<i64>()
                .map(Limit::Finite)
                .map_err(|_| E::custom(format!("invalid bound '{}'", other))),
        }
    }
}

impl<'de> Deserialize<'de> for Limit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LimitVisitor)
    }
}

/// `{min, max}` over a count. A `null` minimum reads as -∞, a `null`
/// maximum as +∞. An absent minimum is 0, an absent maximum +∞.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawCountRange")]
pub struct CountRange {
    pub min: Limit,
    pub max: Limit,
}

#[derive(Deserialize)]
struct RawCountRange {
    // Outer `None`: field absent. Inner `None`: explicit `null`.
    #[serde(default, deserialize_with = "present")]
    min: Option<Option<Limit>>,
    #[serde(default)]
    max: Option<Limit>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl From<RawCountRange> for CountRange {
    fn from(raw: RawCountRange) -> Self {
        let min = match raw.min {
            None => Limit::Finite(0),
            Some(None) => Limit::NegInfinity,
            Some(Some(limit)) => limit,
        };
        CountRange {
            min,
            max: raw.max.unwrap_or(Limit::PosInfinity),
        }
    }
}

impl CountRange {
    pub fn new(min: impl Into<Limit>, max: impl Into<Limit>) -> Self {
        CountRange {
            min: min.into(),
            max: max.into(),
        }
    }

    pub fn at_least(min: i64) -> Self {
        CountRange::new(min, Limit::PosInfinity)
    }

    pub fn is_well_formed(&self) -> bool {
        self.min <= self.max
    }
}

/// A node without an explicit count constraint accepts any number of
/// occurrences.
impl Default for CountRange {
    fn default() -> Self {
        CountRange::at_least(0)
    }
}

/// `{minSeconds, maxSeconds}` over a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawTimeWindow")]
pub struct TimeWindow {
    pub min_seconds: Limit,
    pub max_seconds: Limit,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTimeWindow {
    #[serde(default)]
    min_seconds: Option<Limit>,
    #[serde(default)]
    max_seconds: Option<Limit>,
}

impl From<RawTimeWindow> for TimeWindow {
    fn from(raw: RawTimeWindow) -> Self {
        TimeWindow {
            min_seconds: raw.min_seconds.unwrap_or(Limit::NegInfinity),
            max_seconds: raw.max_seconds.unwrap_or(Limit::PosInfinity),
        }
    }
}

impl TimeWindow {
    pub fn new(min_seconds: impl Into<Limit>, max_seconds: impl Into<Limit>) -> Self {
        TimeWindow {
            min_seconds: min_seconds.into(),
            max_seconds: max_seconds.into(),
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.min_seconds <= self.max_seconds
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        TimeWindow::new(Limit::NegInfinity, Limit::PosInfinity)
    }
}

// ── Variables ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Event,
    Object,
}

impl VariableKind {
    /// Short prefix used in display names (`ev_0`, `ob_1`).
    pub fn prefix(self) -> &'static str {
        match self {
            VariableKind::Event => "ev",
            VariableKind::Object => "ob",
        }
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableKind::Event => write!(f, "event"),
            VariableKind::Object => write!(f, "object"),
        }
    }
}

impl std::str::FromStr for VariableKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "event" | "ev" => Ok(VariableKind::Event),
            "object" | "ob" => Ok(VariableKind::Object),
            other => Err(format!("unknown variable kind '{}'", other)),
        }
    }
}

/// An event or object variable. Indices are only unique within the node
/// that introduces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Variable {
    Event(u32),
    Object(u32),
}

impl Variable {
    pub fn kind(self) -> VariableKind {
        match self {
            Variable::Event(_) => VariableKind::Event,
            Variable::Object(_) => VariableKind::Object,
        }
    }

    pub fn index(self) -> u32 {
        match self {
            Variable::Event(i) | Variable::Object(i) => i,
        }
    }

    pub fn of_kind(kind: VariableKind, index: u32) -> Self {
        match kind {
            VariableKind::Event => Variable::Event(index),
            VariableKind::Object => Variable::Object(index),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind().prefix(), self.index())
    }
}

// ── Predicates ───────────────────────────────────────────────────────────────

/// When an object attribute is read by an attribute filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Timepoint {
    Always,
    Sometime,
    AtEvent { event: u32 },
}

/// A filter or constraint predicate attached to an event-type node.
///
/// Only the variables a predicate mentions matter to the compiler; value
/// filters and timepoints are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Filter {
    O2E {
        object: u32,
        event: u32,
        #[serde(default)]
        qualifier: Option<String>,
    },
    O2O {
        object: u32,
        other_object: u32,
        #[serde(default)]
        qualifier: Option<String>,
    },
    TimeBetweenEvents {
        from_event: u32,
        to_event: u32,
        #[serde(default)]
        min_seconds: Option<f64>,
        #[serde(default)]
        max_seconds: Option<f64>,
    },
    NotEqual {
        var_1: Variable,
        var_2: Variable,
    },
    EventAttributeValueFilter {
        event: u32,
        attribute_name: String,
        value_filter: serde_json::Value,
    },
    ObjectAttributeValueFilter {
        object: u32,
        attribute_name: String,
        at_time: Timepoint,
        value_filter: serde_json::Value,
    },
    #[serde(rename = "BasicFilterCEL")]
    BasicFilterCel {
        cel: String,
    },
}

impl Filter {
    /// Variables this predicate reads. CEL expressions are opaque and
    /// report none.
    pub fn involved_variables(&self) -> Vec<Variable> {
        match self {
            Filter::O2E { object, event, .. } => {
                vec![Variable::Object(*object), Variable::Event(*event)]
            }
            Filter::O2O {
                object,
                other_object,
                ..
            } => vec![Variable::Object(*object), Variable::Object(*other_object)],
            Filter::TimeBetweenEvents {
                from_event,
                to_event,
                ..
            } => vec![Variable::Event(*from_event), Variable::Event(*to_event)],
            Filter::NotEqual { var_1, var_2 } => vec![*var_1, *var_2],
            Filter::EventAttributeValueFilter { event, .. } => vec![Variable::Event(*event)],
            Filter::ObjectAttributeValueFilter {
                object, at_time, ..
            } => match at_time {
                Timepoint::AtEvent { event } => {
                    vec![Variable::Object(*object), Variable::Event(*event)]
                }
                Timepoint::Always | Timepoint::Sometime => vec![Variable::Object(*object)],
            },
            Filter::BasicFilterCel { .. } => Vec::new(),
        }
    }
}

// ── Nodes ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occurrence {
    First,
    Last,
}

/// Authored data of an event-type node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTypeNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Event variables introduced here, with the event types they may bind to.
    #[serde(default, deserialize_with = "index_keyed")]
    pub new_event_vars: BTreeMap<u32, BTreeSet<String>>,
    /// Object variables introduced here, with the object types they may bind to.
    #[serde(default, deserialize_with = "index_keyed")]
    pub new_object_vars: BTreeMap<u32, BTreeSet<String>>,
    #[serde(default)]
    pub count_constraint: CountRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_or_last_event_of_type: Option<Occurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting_time_constraint: Option<TimeWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_qualified_objects_constraint: Option<BTreeMap<String, CountRange>>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub constraints: Vec<Filter>,
}

/// Variable maps arrive with string keys (`{"0": [...]}`). Node payloads are
/// buffered before they reach this field, so the keys are parsed by hand.
fn index_keyed<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<u32, BTreeSet<String>>, D::Error> {
    let raw: BTreeMap<String, BTreeSet<String>> = BTreeMap::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, types)| {
            key.trim()
                .parse::<u32>()
                .map(|index| (index, types))
                .map_err(|_| de::Error::custom(format!("invalid variable index '{}'", key)))
        })
        .collect()
}

impl EventTypeNode {
    pub fn new(event_type: impl Into<String>) -> Self {
        EventTypeNode {
            event_type: Some(event_type.into()),
            ..Default::default()
        }
    }

    pub fn with_event_var(mut self, index: u32, types: &[&str]) -> Self {
        self.new_event_vars
            .insert(index, types.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn with_object_var(mut self, index: u32, types: &[&str]) -> Self {
        self.new_object_vars
            .insert(index, types.iter().map(|t| t.to_string()).collect());
        self
    }

    /// Indices of the variables of `kind` introduced at this node, ascending.
    pub fn introduced(&self, kind: VariableKind) -> impl Iterator<Item = u32> + '_ {
        match kind {
            VariableKind::Event => self.new_event_vars.keys(),
            VariableKind::Object => self.new_object_vars.keys(),
        }
        .copied()
    }

    pub fn variables_mut(&mut self, kind: VariableKind) -> &mut BTreeMap<u32, BTreeSet<String>> {
        match kind {
            VariableKind::Event => &mut self.new_event_vars,
            VariableKind::Object => &mut self.new_object_vars,
        }
    }

    /// Filters followed by constraints, in authoring order.
    pub fn predicates(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter().chain(self.constraints.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateKind {
    And,
    Or,
    Not,
}

impl GateKind {
    /// Outgoing anchor suffixes: NOT has one slot, AND/OR have two.
    pub fn source_slots(self) -> &'static [&'static str] {
        match self {
            GateKind::Not => &["source"],
            GateKind::And | GateKind::Or => &["left-source", "right-source"],
        }
    }

    /// NOT and the binary gates have different slot layouts, so only
    /// AND ↔ OR can be swapped in place.
    pub fn can_become(self, other: GateKind) -> bool {
        self.source_slots().len() == other.source_slots().len()
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateKind::And => write!(f, "and"),
            GateKind::Or => write!(f, "or"),
            GateKind::Not => write!(f, "not"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateNode {
    pub gate: GateKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    EventType(EventTypeNode),
    Gate(GateNode),
}

/// A node on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    pub fn event_type(id: impl Into<String>, data: EventTypeNode) -> Self {
        Node {
            id: id.into(),
            kind: NodeKind::EventType(data),
        }
    }

    pub fn gate(id: impl Into<String>, gate: GateKind) -> Self {
        Node {
            id: id.into(),
            kind: NodeKind::Gate(GateNode { gate }),
        }
    }

    /// Event type label; `None` for gates and unlabeled event nodes.
    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::EventType(data) => data.event_type.as_deref(),
            NodeKind::Gate(_) => None,
        }
    }

    pub fn as_event_type(&self) -> Option<&EventTypeNode> {
        match &self.kind {
            NodeKind::EventType(data) => Some(data),
            NodeKind::Gate(_) => None,
        }
    }

    pub fn target_handle(&self) -> String {
        format!("{}-target", self.id)
    }

    pub fn source_handles(&self) -> Vec<String> {
        match &self.kind {
            NodeKind::EventType(_) => vec![format!("{}-source", self.id)],
            NodeKind::Gate(g) => g
                .gate
                .source_slots()
                .iter()
                .map(|slot| format!("{}-{}", self.id, slot))
                .collect(),
        }
    }
}

// ── Edges ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstraintType {
    #[default]
    Response,
    UnaryResponse,
    NonResponse,
}

/// Authored data carried by an edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeConstraint {
    #[serde(default)]
    pub constraint_type: ConstraintType,
    #[serde(default)]
    pub time_constraint: TimeWindow,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    DEFAULT_EDGE_COLOR.to_string()
}

impl Default for EdgeConstraint {
    fn default() -> Self {
        EdgeConstraint {
            constraint_type: ConstraintType::default(),
            time_constraint: TimeWindow::default(),
            color: default_color(),
        }
    }
}

/// A directed edge between two node anchors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
    #[serde(default)]
    pub data: Option<EdgeConstraint>,
}

impl Edge {
    /// Edge between explicit anchors, id `"{sourceHandle}|||{targetHandle}"`.
    pub fn between_handles(
        source: &str,
        source_handle: &str,
        target: &str,
        target_handle: &str,
    ) -> Self {
        Edge {
            id: format!("{}|||{}", source_handle, target_handle),
            source: source.to_string(),
            target: target.to_string(),
            source_handle: Some(source_handle.to_string()),
            target_handle: Some(target_handle.to_string()),
            data: Some(EdgeConstraint::default()),
        }
    }

    /// Edge from an event-type node (or NOT gate) to any node, using the
    /// default anchors.
    pub fn new(source: &str, target: &str) -> Self {
        Edge::between_handles(
            source,
            &format!("{}-source", source),
            target,
            &format!("{}-target", target),
        )
    }

    /// Both anchors and the constraint data are present.
    pub fn is_complete(&self) -> bool {
        self.source_handle.is_some() && self.target_handle.is_some() && self.data.is_some()
    }
}

// ── Graph ────────────────────────────────────────────────────────────────────

/// The whole authored graph, in insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Graph { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn edge_mut(&mut self, id: &str) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| e.id == id)
    }

    /// Whether `edge` links two nodes of this graph. Incomplete edges and
    /// edges with a dangling endpoint stay on the canvas but carry no
    /// dependency.
    pub fn is_linked(&self, edge: &Edge) -> bool {
        edge.is_complete() && self.node(&edge.source).is_some() && self.node(&edge.target).is_some()
    }

    /// Source of the first linked edge (insertion order) that targets `id`.
    pub fn first_parent(&self, id: &str) -> Option<&str> {
        self.edges
            .iter()
            .find(|e| e.target == id && self.is_linked(e))
            .map(|e| e.source.as_str())
    }

    /// Every node from which `id` can be reached by following edges.
    /// Terminates on cyclic graphs.
    pub fn ancestors(&self, id: &str) -> HashSet<&str> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = vec![id];
        while let Some(current) = stack.pop() {
            for e in self.edges.iter().filter(|e| e.target == current) {
                if seen.insert(e.source.as_str()) {
                    stack.push(e.source.as_str());
                }
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_orders_along_number_line() {
        assert!(Limit::NegInfinity < Limit::Finite(i64::MIN));
        assert!(Limit::Finite(-3) < Limit::Finite(2));
        assert!(Limit::Finite(i64::MAX) < Limit::PosInfinity);
    }

    #[test]
    fn limit_parses_numbers_and_infinity_markers() {
        let parsed: Vec<Limit> =
            serde_json::from_str(r#"[3, "inf", "∞", "-inf", "-∞", "+inf", 4.0]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                Limit::Finite(3),
                Limit::PosInfinity,
                Limit::PosInfinity,
                Limit::NegInfinity,
                Limit::NegInfinity,
                Limit::PosInfinity,
                Limit::Finite(4),
            ]
        );
    }

    #[test]
    fn limit_rejects_fractions_and_garbage() {
        assert!(serde_json::from_str::<Limit>("1.5").is_err());
        assert!(serde_json::from_str::<Limit>("\"lots\"").is_err());
    }

    #[test]
    fn null_bounds_read_as_unbounded() {
        let range: CountRange = serde_json::from_str(r#"{"min": null, "max": null}"#).unwrap();
        assert_eq!(range, CountRange::new(Limit::NegInfinity, Limit::PosInfinity));

        let window: TimeWindow = serde_json::from_str(r#"{"minSeconds": 0}"#).unwrap();
        assert_eq!(window, TimeWindow::new(0, Limit::PosInfinity));
    }

    #[test]
    fn missing_count_minimum_is_zero() {
        let range: CountRange = serde_json::from_str(r#"{"max": 3}"#).unwrap();
        assert_eq!(range, CountRange::new(0, 3));

        let range: CountRange = serde_json::from_str("{}").unwrap();
        assert_eq!(range, CountRange::default());

        let range: CountRange = serde_json::from_str(r#"{"min": null, "max": 3}"#).unwrap();
        assert_eq!(range.min, Limit::NegInfinity);
    }

    #[test]
    fn node_json_uses_type_tag() {
        let json = r#"{"id": "g", "type": "gate", "gate": "or"}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node, Node::gate("g", GateKind::Or));

        let json = r#"{
            "id": "a",
            "type": "eventType",
            "eventType": "place order",
            "newObjectVars": {"0": ["orders"]},
            "countConstraint": {"min": 1, "max": "inf"}
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        let data = node.as_event_type().unwrap();
        assert_eq!(data.event_type.as_deref(), Some("place order"));
        assert_eq!(data.introduced(VariableKind::Object).collect::<Vec<_>>(), vec![0]);
        assert_eq!(data.count_constraint, CountRange::at_least(1));
    }

    #[test]
    fn gate_handles_follow_slot_layout() {
        assert_eq!(Node::gate("n", GateKind::Not).source_handles(), vec!["n-source"]);
        assert_eq!(
            Node::gate("a", GateKind::And).source_handles(),
            vec!["a-left-source", "a-right-source"]
        );
        assert!(GateKind::And.can_become(GateKind::Or));
        assert!(!GateKind::Not.can_become(GateKind::And));
    }

    #[test]
    fn variable_display_names() {
        assert_eq!(Variable::Event(0).to_string(), "ev_0");
        assert_eq!(Variable::Object(12).to_string(), "ob_12");
    }

    #[test]
    fn filter_reports_involved_variables() {
        let f: Filter = serde_json::from_str(
            r#"{"type": "O2E", "object": 1, "event": 0, "qualifier": "places"}"#,
        )
        .unwrap();
        assert_eq!(
            f.involved_variables(),
            vec![Variable::Object(1), Variable::Event(0)]
        );

        let f: Filter = serde_json::from_str(
            r#"{"type": "NotEqual", "var_1": {"Object": 0}, "var_2": {"Object": 2}}"#,
        )
        .unwrap();
        assert_eq!(
            f.involved_variables(),
            vec![Variable::Object(0), Variable::Object(2)]
        );

        let f: Filter = serde_json::from_str(
            r#"{
                "type": "ObjectAttributeValueFilter",
                "object": 3,
                "attribute_name": "price",
                "at_time": {"type": "AtEvent", "event": 1},
                "value_filter": {"type": "Float", "min": 0.0, "max": null}
            }"#,
        )
        .unwrap();
        assert_eq!(
            f.involved_variables(),
            vec![Variable::Object(3), Variable::Event(1)]
        );

        let f = Filter::BasicFilterCel {
            cel: "true".to_string(),
        };
        assert!(f.involved_variables().is_empty());
    }

    #[test]
    fn ancestors_terminate_on_cycles() {
        let graph = Graph::new(
            vec![
                Node::event_type("a", EventTypeNode::default()),
                Node::event_type("b", EventTypeNode::default()),
            ],
            vec![Edge::new("a", "b"), Edge::new("b", "a")],
        );
        let ancestors = graph.ancestors("a");
        assert!(ancestors.contains("a"));
        assert!(ancestors.contains("b"));
    }
}
