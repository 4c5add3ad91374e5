//! Suggestion Engine
//!
//! Proactive hints derived from a partially filled specification. Each rule
//! is an independent predicate over the serialized specification paired with
//! one message; the engine evaluates rules in order and concatenates what
//! fires. Output is not deduplicated.

use serde_json::{Map, Value};

use crate::spec_model::{has_value, Specification};

/// Predicate over the serialized specification
pub type SuggestionPredicate = fn(&Map<String, Value>) -> bool;

/// One heuristic rule
#[derive(Clone)]
pub struct SuggestionRule {
    /// Stable identifier
    pub id: &'static str,
    /// Specification fields the predicate inspects
    pub fields: &'static [&'static str],
    /// Human-readable suggestion emitted when the predicate holds
    pub message: &'static str,
    predicate: SuggestionPredicate,
}

impl SuggestionRule {
    pub fn new(
        id: &'static str,
        fields: &'static [&'static str],
        predicate: SuggestionPredicate,
        message: &'static str,
    ) -> Self {
        Self {
            id,
            fields,
            message,
            predicate,
        }
    }

    /// Evaluate this rule alone
    pub fn evaluate(&self, spec: &Map<String, Value>) -> Option<&'static str> {
        (self.predicate)(spec).then_some(self.message)
    }
}

impl std::fmt::Debug for SuggestionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionRule")
            .field("id", &self.id)
            .field("fields", &self.fields)
            .finish()
    }
}

pub const ROLES_SUGGESTION: &str =
    "You added agents but not their roles. Would you like to define what each agent type does?";
pub const COMMUNICATION_SUGGESTION: &str =
    "Since your system has multiple agents, you may want to define how they communicate.";
pub const TOPOLOGY_SUGGESTION: &str =
    "Agent topology is missing. Should agents be connected in a hierarchy, peer-to-peer, or something else?";
pub const MEMORY_SUGGESTION: &str =
    "Would you like the system to use memory? (None, shared memory, or per-agent memory.)";
pub const PLANNING_SUGGESTION: &str =
    "Some multi-agent systems include a planning component. Should your system include planning?";

fn declared(spec: &Map<String, Value>, key: &str) -> bool {
    spec.get(key).is_some_and(has_value)
}

/// `agents` is present and is not the number zero
fn agents_declared(spec: &Map<String, Value>) -> bool {
    match spec.get("agents") {
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(other) => has_value(other),
        None => false,
    }
}

fn roles_missing(spec: &Map<String, Value>) -> bool {
    agents_declared(spec) && !declared(spec, "agent_purposes")
}

fn communication_missing(spec: &Map<String, Value>) -> bool {
    agents_declared(spec) && !declared(spec, "communication")
}

fn topology_missing(spec: &Map<String, Value>) -> bool {
    agents_declared(spec) && !declared(spec, "topology")
}

fn memory_missing(spec: &Map<String, Value>) -> bool {
    !declared(spec, "memory")
}

fn planning_missing(spec: &Map<String, Value>) -> bool {
    !declared(spec, "planning")
}

/// The fixed rule set, in evaluation order
pub fn builtin_rules() -> Vec<SuggestionRule> {
    vec![
        SuggestionRule::new(
            "agent_roles",
            &["agents", "agent_purposes"],
            roles_missing,
            ROLES_SUGGESTION,
        ),
        SuggestionRule::new(
            "communication",
            &["agents", "communication"],
            communication_missing,
            COMMUNICATION_SUGGESTION,
        ),
        SuggestionRule::new(
            "topology",
            &["agents", "topology"],
            topology_missing,
            TOPOLOGY_SUGGESTION,
        ),
        SuggestionRule::new("memory", &["memory"], memory_missing, MEMORY_SUGGESTION),
        SuggestionRule::new("planning", &["planning"], planning_missing, PLANNING_SUGGESTION),
    ]
}

/// Ordered list of independent rules
#[derive(Debug, Clone)]
pub struct SuggestionEngine {
    rules: Vec<SuggestionRule>,
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self {
            rules: builtin_rules(),
        }
    }
}

impl SuggestionEngine {
    /// An engine with no rules
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule after the existing ones
    pub fn with_rule(mut self, rule: SuggestionRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[SuggestionRule] {
        &self.rules
    }

    /// Rule identifiers in evaluation order
    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id).collect()
    }

    /// Suggestions for a serialized specification
    pub fn suggest(&self, spec: &Map<String, Value>) -> Vec<String> {
        self.rules
            .iter()
            .filter_map(|rule| rule.evaluate(spec))
            .map(str::to_string)
            .collect()
    }

    /// Suggestions for a typed specification
    pub fn suggest_for(&self, spec: &Specification) -> Vec<String> {
        self.suggest(&spec.to_map())
    }
}
