//! Requirements Engine
//!
//! Runs one conversation turn: normalize the caller's specification, analyse
//! what is missing, ask the backend once, and turn its (possibly malformed)
//! answer into a reply, schema-clean updates and a continuation flag.
//!
//! The engine keeps no state between turns. Callers own the specification
//! and history and pass them in on every call.

use std::sync::Arc;

use agent_blueprint_core::{SchemaDescriptor, SpecInput, Specification, SuggestionEngine};
use agent_blueprint_llm::{
    generate_text, sanitize_response, LlmProvider, LlmRequestOptions, SanitizedResponse,
};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::prompt::{PromptComposer, PromptContext};
use super::types::{BackendReply, HistoryEntry, TurnOutcome};
use crate::models::settings::AppConfig;
use crate::utils::error::AppResult;

/// Reply used when the backend offers neither a reply nor a follow-up
pub const FALLBACK_REPLY: &str = "Could you clarify what you want next?";

/// Conversation engine for one schema and one backend
pub struct RequirementsEngine {
    schema: Arc<SchemaDescriptor>,
    provider: Arc<dyn LlmProvider>,
    suggestions: SuggestionEngine,
    composer: PromptComposer,
    reply_max_tokens: Option<u32>,
}

impl RequirementsEngine {
    pub fn new(schema: Arc<SchemaDescriptor>, provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            composer: PromptComposer::new(schema.clone()),
            schema,
            provider,
            suggestions: SuggestionEngine::default(),
            reply_max_tokens: None,
        }
    }

    /// Replace the suggestion rules
    pub fn with_suggestion_engine(mut self, suggestions: SuggestionEngine) -> Self {
        self.suggestions = suggestions;
        self
    }

    /// Number of history entries rendered into each prompt
    pub fn with_history_window(mut self, window: usize) -> Self {
        self.composer = self.composer.with_history_window(window);
        self
    }

    /// Response-size bound passed to the backend on every turn
    pub fn with_reply_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.reply_max_tokens = max_tokens;
        self
    }

    /// Build from application settings, loading the configured schema file
    /// or falling back to the built-in schema
    pub fn from_config(config: &AppConfig, provider: Arc<dyn LlmProvider>) -> AppResult<Self> {
        let schema = match &config.schema_path {
            Some(path) => SchemaDescriptor::load(path)?,
            None => SchemaDescriptor::builtin()?,
        };
        debug!(fields = schema.len(), "Schema loaded");

        Ok(Self::new(Arc::new(schema), provider)
            .with_history_window(config.history_window)
            .with_reply_max_tokens(Some(config.effective_reply_max_tokens())))
    }

    pub fn schema(&self) -> &Arc<SchemaDescriptor> {
        &self.schema
    }

    pub fn composer(&self) -> &PromptComposer {
        &self.composer
    }

    /// Build the prompt for a turn without calling the backend
    pub fn compose_prompt(
        &self,
        user_message: &str,
        spec: &Specification,
        history: &[HistoryEntry],
    ) -> String {
        let spec_map = spec.to_map();
        let missing = spec.missing_required_fields();
        let suggestions = self.suggestions.suggest(&spec_map);
        debug!(suggestion_count = suggestions.len(), "Composing requirements prompt");
        self.composer.compose(&PromptContext {
            user_message,
            spec: &spec_map,
            missing_required: &missing,
            suggestions: &suggestions,
            history,
        })
    }

    /// Run one turn. Exactly one backend call; transport failures propagate.
    pub async fn run_turn(
        &self,
        user_message: &str,
        current_spec: impl Into<SpecInput>,
        history: &[HistoryEntry],
    ) -> AppResult<TurnOutcome> {
        let spec = Specification::normalize(self.schema.clone(), current_spec.into());
        let missing = spec.missing_required_fields();

        debug!(
            spec = %spec.to_json_pretty(),
            missing = ?missing,
            history_len = history.len(),
            "Requirements turn started"
        );

        let prompt = self.compose_prompt(user_message, &spec, history);

        let options = LlmRequestOptions::with_max_tokens(self.reply_max_tokens);
        let raw = generate_text(self.provider.as_ref(), &prompt, options).await?;
        debug!(provider = self.provider.name(), raw = %raw, "Backend reply received");

        let sanitized = sanitize_response(&raw);
        if let SanitizedResponse::Unparsed(text) = &sanitized {
            debug!(text = %text, "Backend reply is not structured, using fallback");
        }
        let backend = BackendReply::from_value(&sanitized.into_value());

        let reply = select_reply(&backend);
        let needs_more = backend.follow_up_question.is_some()
            || !backend.updated_fields.is_empty()
            || !missing.is_empty();
        let updated_fields = self.filter_updates(&backend.updated_fields);

        info!(
            updated = ?updated_fields.keys().collect::<Vec<_>>(),
            needs_more,
            "Requirements turn finished"
        );

        Ok(TurnOutcome {
            reply,
            updated_fields,
            needs_more,
        })
    }

    /// Keep only updates the schema defines with an acceptable shape
    pub fn filter_updates(&self, updates: &Map<String, Value>) -> Map<String, Value> {
        let mut kept = Map::new();
        let mut dropped = Vec::new();

        for (key, value) in updates {
            if self.schema.accepts(key, value) {
                kept.insert(key.clone(), value.clone());
            } else {
                dropped.push(key.as_str());
            }
        }

        if !dropped.is_empty() {
            debug!(dropped = ?dropped, "Dropped backend updates outside the schema");
        }

        kept
    }
}

/// Reply, else follow-up question, else the fixed fallback
pub fn select_reply(backend: &BackendReply) -> String {
    backend
        .reply
        .as_ref()
        .or(backend.follow_up_question.as_ref())
        .cloned()
        .unwrap_or_else(|| FALLBACK_REPLY.to_string())
}
