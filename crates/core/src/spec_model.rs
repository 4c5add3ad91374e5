//! Specification Model
//!
//! Mutable, schema-bound accumulator of field values. Values only enter
//! through `merge`, which accepts a field wholesale or rejects it: unknown
//! keys and values of the wrong top-level shape are never stored.

use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::schema::SchemaDescriptor;

/// Whether a stored value counts as "provided".
///
/// Null, blank strings, empty arrays and empty objects do not. Numbers and
/// booleans always do.
pub fn has_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Outcome of a single `merge` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Keys that were stored (or cleared by an explicit null)
    pub accepted: Vec<String>,
    /// Keys that were dropped: unknown to the schema or of the wrong shape
    pub rejected: Vec<String>,
}

/// Caller-supplied specification for one turn.
///
/// Either an already-typed model or a raw mapping hydrated from a previous
/// turn. A raw value that is not a JSON object normalizes to an empty
/// specification.
#[derive(Debug, Clone)]
pub enum SpecInput {
    Model(Specification),
    Raw(Value),
}

impl Default for SpecInput {
    fn default() -> Self {
        Self::Raw(Value::Null)
    }
}

impl From<Specification> for SpecInput {
    fn from(spec: Specification) -> Self {
        Self::Model(spec)
    }
}

impl From<&Specification> for SpecInput {
    fn from(spec: &Specification) -> Self {
        Self::Model(spec.clone())
    }
}

impl From<Value> for SpecInput {
    fn from(value: Value) -> Self {
        Self::Raw(value)
    }
}

impl From<Map<String, Value>> for SpecInput {
    fn from(map: Map<String, Value>) -> Self {
        Self::Raw(Value::Object(map))
    }
}

/// The evolving structured description of the system being designed
#[derive(Debug, Clone)]
pub struct Specification {
    schema: Arc<SchemaDescriptor>,
    values: Map<String, Value>,
}

impl Specification {
    /// Create an empty specification bound to `schema`
    pub fn new(schema: Arc<SchemaDescriptor>) -> Self {
        Self {
            schema,
            values: Map::new(),
        }
    }

    /// Hydrate from a raw mapping. Non-object values yield an empty model.
    pub fn from_value(schema: Arc<SchemaDescriptor>, value: &Value) -> Self {
        let mut spec = Self::new(schema);
        match value {
            Value::Object(map) => {
                spec.merge(map);
            }
            Value::Null => {}
            other => {
                debug!(kind = %json_kind(other), "Ignoring non-object specification input");
            }
        }
        spec
    }

    /// Normalize caller input into a fresh model bound to `schema`
    pub fn normalize(schema: Arc<SchemaDescriptor>, input: SpecInput) -> Self {
        match input {
            SpecInput::Model(model) => {
                let mut spec = Self::new(schema);
                spec.merge(&model.to_map());
                spec
            }
            SpecInput::Raw(value) => Self::from_value(schema, &value),
        }
    }

    /// The schema this specification is bound to
    pub fn schema(&self) -> &Arc<SchemaDescriptor> {
        &self.schema
    }

    /// Merge an update mapping. Last write wins for accepted keys; `null`
    /// clears a known field.
    pub fn merge(&mut self, incoming: &Map<String, Value>) -> MergeReport {
        let mut report = MergeReport::default();

        for (key, value) in incoming {
            if !self.schema.accepts(key, value) {
                report.rejected.push(key.clone());
                continue;
            }
            if value.is_null() {
                self.values.remove(key);
            } else {
                self.values.insert(key.clone(), value.clone());
            }
            report.accepted.push(key.clone());
        }

        if !report.rejected.is_empty() {
            debug!(rejected = ?report.rejected, "Dropped fields during specification merge");
        }

        report
    }

    /// Required fields that are absent, null or empty, in declaration order
    pub fn missing_required_fields(&self) -> Vec<String> {
        self.schema
            .required_fields()
            .filter(|f| !self.values.get(&f.name).is_some_and(has_value))
            .map(|f| f.name.clone())
            .collect()
    }

    /// Whether every required field is provided
    pub fn is_complete(&self) -> bool {
        self.missing_required_fields().is_empty()
    }

    /// Current value of a field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Defensive plain copy of the stored values, in declaration order
    pub fn to_map(&self) -> Map<String, Value> {
        self.schema
            .fields()
            .iter()
            .filter_map(|f| {
                self.values
                    .get(&f.name)
                    .map(|v| (f.name.clone(), v.clone()))
            })
            .collect()
    }

    /// `to_map` wrapped as a JSON value
    pub fn to_value(&self) -> Value {
        Value::Object(self.to_map())
    }

    /// Pretty-printed JSON of the stored values
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.to_value()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PartialEq for Specification {
    fn eq(&self, other: &Self) -> bool {
        self.to_map() == other.to_map()
    }
}

impl Serialize for Specification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
