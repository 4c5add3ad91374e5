//! Prompt Composer
//!
//! Renders the schema, the current specification, the gap analysis and the
//! recent conversation into one instruction for the backend. Composition is
//! pure: identical inputs always produce identical text.

use std::sync::Arc;

use agent_blueprint_core::{FieldDescriptor, FieldType, SchemaDescriptor};
use serde_json::{Map, Value};

use super::types::HistoryEntry;

/// Number of most recent history entries rendered by default
pub const DEFAULT_HISTORY_WINDOW: usize = 6;

const RULE: &str = "===================================================";

/// Everything one prompt is composed from
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub user_message: &'a str,
    pub spec: &'a Map<String, Value>,
    pub missing_required: &'a [String],
    pub suggestions: &'a [String],
    pub history: &'a [HistoryEntry],
}

/// Builds backend instructions for a fixed schema
#[derive(Debug, Clone)]
pub struct PromptComposer {
    schema: Arc<SchemaDescriptor>,
    history_window: usize,
}

impl PromptComposer {
    pub fn new(schema: Arc<SchemaDescriptor>) -> Self {
        Self {
            schema,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    pub fn history_window(&self) -> usize {
        self.history_window
    }

    /// Render one schema entry
    pub fn render_field(field: &FieldDescriptor) -> String {
        let marker = if field.required { "required" } else { "optional" };
        let mut lines = vec![
            format!(
                "- {} ({}, type={}): {}",
                field.name, marker, field.field_type, field.description
            ),
            format!("  Ask user: {}", field.ask_user),
        ];

        if let Some(example) = field.example.as_deref().filter(|e| !e.is_empty()) {
            lines.push(format!("  Example: {}", example));
        }

        if let Some(example_obj) = field.example_object() {
            let keys = render_list(field.nested_keys());
            let example_obj = serde_json::to_string(&example_obj).unwrap_or_else(|_| "{}".to_string());
            if field.field_type == FieldType::List {
                lines.push(format!("  This is a LIST of OBJECTS with keys: {}", keys));
                lines.push(format!("  Example: [ {} ]", example_obj));
            } else {
                lines.push(format!("  This is an OBJECT with keys: {}", keys));
                lines.push(format!("  Example: {}", example_obj));
            }
        }

        lines.join("\n")
    }

    /// Render every schema entry in declaration order
    pub fn render_schema(&self) -> String {
        self.schema
            .fields()
            .iter()
            .map(Self::render_field)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// The most recent `history_window` entries, oldest first, role-labelled
    pub fn render_history(&self, history: &[HistoryEntry]) -> String {
        let start = history.len().saturating_sub(self.history_window);
        history[start..]
            .iter()
            .map(|entry| format!("{}: {}\n", entry.role.label(), entry.content))
            .collect()
    }

    /// Compose the full instruction
    pub fn compose(&self, ctx: &PromptContext<'_>) -> String {
        let spec_text =
            serde_json::to_string_pretty(ctx.spec).unwrap_or_else(|_| "{}".to_string());
        let suggestion_text = ctx
            .suggestions
            .iter()
            .map(|s| format!("- {}", s))
            .collect::<Vec<_>>()
            .join("\n");
        let allowed_fields = render_list(self.schema.field_names());

        format!(
            r#"You are the Requirements Agent.

Your JSON output MUST strictly follow the schema.

{rule}
SCHEMA YOU MUST FOLLOW:
{rule}
{schema}

{rule}
CURRENT SPEC:
{spec}

MISSING REQUIRED:
{missing}

PROACTIVE SUGGESTIONS:
{suggestions}

CONVERSATION HISTORY:
{history}

USER MESSAGE:
{user_message}

{rule}
NOW OUTPUT STRICT JSON ONLY, with exactly these three keys:
{{
  "updated_fields": {{
      // Only fields from the schema above
  }},
  "reply": "Friendly natural-language reply that may include one suggestion.",
  "follow_up_question": "ONE question that moves the specification forward. Use proactive suggestions when helpful."
}}
Never put a field name in "updated_fields" that is not one of: {allowed}
{rule}"#,
            rule = RULE,
            schema = self.render_schema(),
            spec = spec_text,
            missing = render_list(ctx.missing_required.iter().map(String::as_str)),
            suggestions = suggestion_text,
            history = self.render_history(ctx.history),
            user_message = ctx.user_message,
            allowed = allowed_fields,
        )
    }
}

/// `["a", "b"]`
fn render_list<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let items: Vec<&str> = items.into_iter().collect();
    serde_json::to_string(&items).unwrap_or_else(|_| "[]".to_string())
}
