//! Schema Descriptor
//!
//! Static, declarative table of every field a specification may hold. The
//! table is data, not code: the built-in descriptor is embedded JSON and any
//! other descriptor with the same format can be loaded at runtime.
//!
//! Format: a JSON object mapping field name to
//! `{ "required", "type", "description", "ask_user", "example", "structure" }`.
//! Field order in the document is the declaration order used everywhere else.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};

/// Embedded default descriptor for multi-agent system designs
const BUILTIN_SCHEMA_JSON: &str = include_str!("../data/spec_schema.json");

/// Placeholder rendered for string-typed nested keys in example objects
pub const STRING_PLACEHOLDER: &str = "<string>";

/// Declared shape of a top-level field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Scalar string
    String,
    /// Scalar number
    Number,
    /// List of objects
    List,
    /// Single object
    Object,
}

impl FieldType {
    /// Get the string form used in descriptor documents and prompts
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::List => "list",
            Self::Object => "object",
        }
    }

    /// Whether this type carries a nested `structure`
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::List | Self::Object)
    }

    /// Top-level shape check. Nested keys are not inspected.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::List => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primitive type of a key inside a structured field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestedType {
    String,
    Number,
    Boolean,
    #[serde(other)]
    Other,
}

impl NestedType {
    /// Minimal example value for this nested type: strings get a placeholder
    /// literal, everything else renders as zero.
    pub fn placeholder(&self) -> Value {
        match self {
            Self::String => Value::String(STRING_PLACEHOLDER.to_string()),
            _ => Value::from(0),
        }
    }
}

/// One field of the schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    /// Field identifier
    pub name: String,
    /// Whether the specification is incomplete without it
    pub required: bool,
    /// Declared shape
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// What the field means
    pub description: String,
    /// Question to ask the user when the field is still missing
    pub ask_user: String,
    /// Example value shown to the backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    /// Nested key set for list/object fields, in declaration order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<Vec<(String, NestedType)>>,
}

impl FieldDescriptor {
    /// Nested key names in declaration order (empty for scalar fields)
    pub fn nested_keys(&self) -> Vec<&str> {
        self.structure
            .as_ref()
            .map(|s| s.iter().map(|(k, _)| k.as_str()).collect())
            .unwrap_or_default()
    }

    /// Synthesize a minimal example object from `structure`
    pub fn example_object(&self) -> Option<Value> {
        let structure = self.structure.as_ref()?;
        let obj: Map<String, Value> = structure
            .iter()
            .map(|(key, ty)| (key.clone(), ty.placeholder()))
            .collect();
        Some(Value::Object(obj))
    }

    /// Whether `value` has the declared top-level shape. List fields with a
    /// declared structure additionally require every element to be an object.
    pub fn accepts(&self, value: &Value) -> bool {
        if !self.field_type.accepts(value) {
            return false;
        }
        match (self.field_type, value) {
            (FieldType::List, Value::Array(items)) if self.structure.is_some() => {
                items.iter().all(Value::is_object)
            }
            _ => true,
        }
    }
}

/// Wire format of one descriptor record
#[derive(Debug, Deserialize)]
struct RawFieldDescriptor {
    #[serde(default)]
    required: bool,
    #[serde(rename = "type")]
    field_type: FieldType,
    #[serde(default)]
    description: String,
    #[serde(default)]
    ask_user: String,
    #[serde(default)]
    example: Option<Value>,
    #[serde(default)]
    structure: Option<Map<String, Value>>,
}

impl RawFieldDescriptor {
    fn into_descriptor(self, name: &str) -> CoreResult<FieldDescriptor> {
        let structure = match self.structure {
            Some(map) => {
                let mut keys = Vec::with_capacity(map.len());
                for (key, ty) in map {
                    let nested: NestedType = serde_json::from_value(ty).map_err(|e| {
                        CoreError::schema(format!("{}.{}: invalid nested type: {}", name, key, e))
                    })?;
                    keys.push((key, nested));
                }
                Some(keys)
            }
            None => None,
        };

        let example = self.example.and_then(|v| match v {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        });

        Ok(FieldDescriptor {
            name: name.to_string(),
            required: self.required,
            field_type: self.field_type,
            description: self.description,
            ask_user: self.ask_user,
            example,
            structure,
        })
    }
}

/// Ordered, read-only table of field descriptors
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    fields: Vec<FieldDescriptor>,
}

impl SchemaDescriptor {
    /// Build a descriptor from already-typed fields, validating the table
    pub fn new(fields: Vec<FieldDescriptor>) -> CoreResult<Self> {
        let schema = Self { fields };
        schema.validate()?;
        Ok(schema)
    }

    /// The descriptor shipped with the crate
    pub fn builtin() -> CoreResult<Self> {
        Self::from_json_str(BUILTIN_SCHEMA_JSON)
    }

    /// Parse a descriptor document
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let doc: Value = serde_json::from_str(json)?;
        let Value::Object(entries) = doc else {
            return Err(CoreError::schema(
                "schema document must be a JSON object of field descriptors",
            ));
        };

        let mut fields = Vec::with_capacity(entries.len());
        for (name, record) in entries {
            let raw: RawFieldDescriptor = serde_json::from_value(record)
                .map_err(|e| CoreError::schema(format!("{}: {}", name, e)))?;
            fields.push(raw.into_descriptor(&name)?);
        }

        Self::new(fields)
    }

    /// Load a descriptor document from disk
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    fn validate(&self) -> CoreResult<()> {
        if self.fields.is_empty() {
            return Err(CoreError::schema("schema declares no fields"));
        }

        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(CoreError::schema("field name must not be empty"));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(CoreError::schema(format!("duplicate field: {}", field.name)));
            }
            if field.structure.is_some() && !field.field_type.is_structured() {
                return Err(CoreError::schema(format!(
                    "{}: structure is only allowed on list or object fields",
                    field.name
                )));
            }
            if field.required && field.ask_user.trim().is_empty() {
                return Err(CoreError::schema(format!(
                    "{}: required fields need an ask_user question",
                    field.name
                )));
            }
        }

        Ok(())
    }

    /// All fields in declaration order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether the schema defines `name`
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Required fields in declaration order
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Whether `value` may be stored under `name`. `null` is accepted for any
    /// known field and means "clear".
    pub fn accepts(&self, name: &str, value: &Value) -> bool {
        match self.get(name) {
            Some(field) => value.is_null() || field.accepts(value),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
