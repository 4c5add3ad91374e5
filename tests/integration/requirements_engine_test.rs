//! Requirements Engine Integration Tests
//!
//! Full turns through `RequirementsEngine::run_turn` against a scripted
//! backend:
//! - Reply selection and continuation flag
//! - Degraded backend output
//! - Schema filtering of updates
//! - Prompt contents (history window, determinism)
//! - Transport failure propagation

use std::sync::Arc;

use agent_blueprint::services::requirements::{HistoryEntry, RequirementsEngine, FALLBACK_REPLY};
use agent_blueprint::AppError;
use agent_blueprint_core::{SchemaDescriptor, Specification, SuggestionEngine};
use agent_blueprint_llm::LlmError;
use serde_json::{json, Value};

use super::support::ScriptedProvider;

// ============================================================================
// Helpers
// ============================================================================

fn schema() -> Arc<SchemaDescriptor> {
    Arc::new(SchemaDescriptor::builtin().unwrap())
}

fn engine_with(provider: Arc<ScriptedProvider>) -> RequirementsEngine {
    RequirementsEngine::new(schema(), provider)
}

fn complete_spec() -> Value {
    json!({
        "system_name": "ResearchCrew",
        "goal": "Summarize new papers weekly",
        "agents": 3
    })
}

// ============================================================================
// Turn scenarios
// ============================================================================

#[tokio::test]
async fn test_three_agents_turn() {
    let provider = ScriptedProvider::new([r#"{"updated_fields": {"agents": 3}, "reply": "Got it, three agents.", "follow_up_question": "How should they communicate?"}"#]);
    let engine = engine_with(provider.clone());

    let outcome = engine
        .run_turn("I want three agents", Value::Null, &[])
        .await
        .unwrap();

    assert_eq!(outcome.reply, "Got it, three agents.");
    assert_eq!(Value::Object(outcome.updated_fields), json!({"agents": 3}));
    assert!(outcome.needs_more);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_complete_spec_stops_conversation() {
    let provider = ScriptedProvider::new([
        r#"{"updated_fields": {}, "reply": "All set!", "follow_up_question": ""}"#,
    ]);
    let engine = engine_with(provider);

    let outcome = engine
        .run_turn("That's everything", complete_spec(), &[])
        .await
        .unwrap();

    assert_eq!(outcome.reply, "All set!");
    assert!(outcome.updated_fields.is_empty());
    assert!(!outcome.needs_more);
}

#[tokio::test]
async fn test_unparseable_backend_output_uses_fallback() {
    let provider = ScriptedProvider::new(["Sorry, I can't help with JSON today."]);
    let engine = engine_with(provider);

    let outcome = engine.run_turn("hello", Value::Null, &[]).await.unwrap();

    assert_eq!(outcome.reply, FALLBACK_REPLY);
    assert!(outcome.updated_fields.is_empty());
    // required fields are still missing
    assert!(outcome.needs_more);
}

#[tokio::test]
async fn test_fenced_output_is_decoded() {
    let provider = ScriptedProvider::new([
        "```json\n{\"updated_fields\": {\"topology\": \"hierarchy\"}, \"reply\": \"Hierarchy it is.\"}\n```",
    ]);
    let engine = engine_with(provider);

    let outcome = engine
        .run_turn("Use a hierarchy", complete_spec(), &[])
        .await
        .unwrap();

    assert_eq!(outcome.reply, "Hierarchy it is.");
    assert_eq!(
        Value::Object(outcome.updated_fields),
        json!({"topology": "hierarchy"})
    );
    assert!(outcome.needs_more);
}

#[tokio::test]
async fn test_follow_up_used_when_reply_missing() {
    let provider = ScriptedProvider::new([
        r#"{"updated_fields": {}, "reply": "", "follow_up_question": "What is the goal?"}"#,
    ]);
    let engine = engine_with(provider);

    let outcome = engine.run_turn("hi", complete_spec(), &[]).await.unwrap();

    assert_eq!(outcome.reply, "What is the goal?");
    assert!(outcome.needs_more);
}

#[tokio::test]
async fn test_unknown_and_malformed_updates_are_dropped() {
    let provider = ScriptedProvider::new([r#"{
        "updated_fields": {
            "system_name": "Crew",
            "favorite_color": "blue",
            "agents": "three",
            "agent_purposes": ["writer"]
        },
        "reply": "Noted."
    }"#]);
    let engine = engine_with(provider);

    let outcome = engine.run_turn("call it Crew", Value::Null, &[]).await.unwrap();

    assert_eq!(
        Value::Object(outcome.updated_fields),
        json!({"system_name": "Crew"})
    );
}

#[tokio::test]
async fn test_non_object_spec_normalizes_to_empty() {
    let provider = ScriptedProvider::new([r#"{"updated_fields": {}, "reply": "ok"}"#]);
    let engine = engine_with(provider.clone());

    let outcome = engine
        .run_turn("hi", json!(["not", "a", "spec"]), &[])
        .await
        .unwrap();

    assert!(outcome.needs_more);
    let prompt = &provider.prompts()[0];
    assert!(prompt.contains("CURRENT SPEC:\n{}"));
    assert!(prompt.contains("MISSING REQUIRED:\n[\"system_name\",\"goal\",\"agents\"]"));
}

#[tokio::test]
async fn test_typed_spec_input_is_accepted() {
    let provider = ScriptedProvider::new([r#"{"updated_fields": {}, "reply": "ok"}"#]);
    let engine = engine_with(provider.clone());

    let spec = Specification::from_value(schema(), &complete_spec());
    let outcome = engine.run_turn("done?", &spec, &[]).await.unwrap();

    assert!(!outcome.needs_more);
    assert!(provider.prompts()[0].contains("MISSING REQUIRED:\n[]"));
}

// ============================================================================
// Prompt contents
// ============================================================================

#[tokio::test]
async fn test_prompt_contains_suggestions_and_recent_history() {
    let provider = ScriptedProvider::new([r#"{"reply": "ok"}"#]);
    let engine = engine_with(provider.clone());

    let history: Vec<HistoryEntry> = (1..=8)
        .map(|i| {
            if i % 2 == 1 {
                HistoryEntry::user(format!("question {}", i))
            } else {
                HistoryEntry::assistant(format!("answer {}", i))
            }
        })
        .collect();

    engine
        .run_turn("next", json!({"agents": 2}), &history)
        .await
        .unwrap();

    let prompt = &provider.prompts()[0];
    assert!(!prompt.contains("question 1\n"));
    assert!(!prompt.contains("answer 2\n"));
    assert!(prompt.contains("User: question 3\nAssistant: answer 4\n"));
    assert!(prompt.contains("User: question 7\nAssistant: answer 8\n"));
    assert!(prompt.contains("- You added agents but not their roles."));
    assert!(prompt.contains("USER MESSAGE:\nnext"));
}

#[tokio::test]
async fn test_prompt_is_reproducible() {
    let provider = ScriptedProvider::new([r#"{"reply": "a"}"#, r#"{"reply": "b"}"#]);
    let engine = engine_with(provider.clone());
    let history = vec![HistoryEntry::user("hi"), HistoryEntry::assistant("hello")];

    engine.run_turn("same", complete_spec(), &history).await.unwrap();
    engine.run_turn("same", complete_spec(), &history).await.unwrap();

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 2);
    assert_eq!(prompts[0], prompts[1]);
}

#[tokio::test]
async fn test_custom_suggestion_engine_is_used() {
    let provider = ScriptedProvider::new([r#"{"reply": "ok"}"#]);
    let engine = engine_with(provider.clone()).with_suggestion_engine(SuggestionEngine::empty());

    engine.run_turn("hi", Value::Null, &[]).await.unwrap();

    assert!(provider.prompts()[0].contains("PROACTIVE SUGGESTIONS:\n\n"));
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_transport_failure_is_not_retried() {
    let provider = ScriptedProvider::with_results([
        Err(LlmError::NetworkError {
            message: "connection reset".to_string(),
        }),
        Ok(r#"{"reply": "should not be reached"}"#.to_string()),
    ]);
    let engine = engine_with(provider.clone());

    let err = engine.run_turn("hi", Value::Null, &[]).await.unwrap_err();

    assert!(matches!(err, AppError::Llm(LlmError::NetworkError { .. })));
    assert_eq!(provider.call_count(), 1);
}
