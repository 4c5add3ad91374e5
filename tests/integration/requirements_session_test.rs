//! Requirements Session Integration Tests
//!
//! Multi-turn conversations where the session merges each turn's updates and
//! grows the transcript.

use std::sync::Arc;

use agent_blueprint::services::requirements::{
    ConversationRole, HistoryEntry, RequirementsEngine, RequirementsSession,
};
use agent_blueprint_core::{SchemaDescriptor, Specification};
use agent_blueprint_llm::LlmError;
use serde_json::json;

use super::support::ScriptedProvider;

fn session_with(provider: Arc<ScriptedProvider>) -> RequirementsSession {
    let schema = Arc::new(SchemaDescriptor::builtin().unwrap());
    RequirementsSession::new(Arc::new(RequirementsEngine::new(schema, provider)))
}

#[tokio::test]
async fn test_multi_turn_conversation_completes_spec() {
    let provider = ScriptedProvider::new([
        r#"{"updated_fields": {"agents": 3}, "reply": "Three agents.", "follow_up_question": "What is the goal?"}"#,
        r#"{"updated_fields": {"goal": "Weekly paper digest"}, "reply": "Great goal.", "follow_up_question": "What should it be called?"}"#,
        r#"{"updated_fields": {"system_name": "ResearchCrew"}, "reply": "Nice name."}"#,
        r#"{"updated_fields": {}, "reply": "All set!", "follow_up_question": ""}"#,
    ]);
    let mut session = session_with(provider.clone());

    let first = session.submit("I want three agents").await.unwrap();
    assert!(first.needs_more);
    assert_eq!(session.missing_required_fields(), vec!["system_name", "goal"]);

    session.submit("They digest papers weekly").await.unwrap();
    let third = session.submit("Call it ResearchCrew").await.unwrap();
    assert!(third.needs_more);
    assert!(session.is_complete());

    let last = session.submit("That's it").await.unwrap();
    assert!(!last.needs_more);

    assert_eq!(
        session.spec().to_value(),
        json!({
            "system_name": "ResearchCrew",
            "goal": "Weekly paper digest",
            "agents": 3
        })
    );

    assert_eq!(session.history().len(), 8);
    assert_eq!(session.history()[0], HistoryEntry::user("I want three agents"));
    assert_eq!(session.history()[1], HistoryEntry::assistant("Three agents."));

    // the second prompt already sees the first turn
    let prompts = provider.prompts();
    assert!(prompts[1].contains("User: I want three agents\nAssistant: Three agents.\n"));
    assert!(prompts[1].contains("\"agents\": 3"));
}

#[tokio::test]
async fn test_fallback_reply_enters_history() {
    let provider = ScriptedProvider::new(["no json here"]);
    let mut session = session_with(provider);

    let outcome = session.submit("hello").await.unwrap();

    let last = session.history().last().unwrap();
    assert_eq!(last.role, ConversationRole::Assistant);
    assert_eq!(last.content, outcome.reply);
    assert!(session.spec().is_empty());
}

#[tokio::test]
async fn test_failed_turn_leaves_session_untouched() {
    let provider = ScriptedProvider::with_results([Err(LlmError::RateLimited {
        message: "slow down".to_string(),
        retry_after: Some(5),
    })]);
    let mut session = session_with(provider);

    assert!(session.submit("hello").await.is_err());
    assert!(session.history().is_empty());
    assert!(session.spec().is_empty());
}

#[tokio::test]
async fn test_resume_continues_from_saved_state() {
    let schema = Arc::new(SchemaDescriptor::builtin().unwrap());
    let provider = ScriptedProvider::new([r#"{"updated_fields": {"memory": "shared"}, "reply": "Shared memory."}"#]);
    let engine = Arc::new(RequirementsEngine::new(schema.clone(), provider.clone()));

    let spec = Specification::from_value(schema, &json!({"agents": 2}));
    let history = vec![HistoryEntry::user("two agents"), HistoryEntry::assistant("Okay.")];
    let mut session = RequirementsSession::resume(engine, spec, history);

    session.submit("use shared memory").await.unwrap();

    assert_eq!(session.history().len(), 4);
    let spec = session.into_spec();
    assert_eq!(spec.get("memory"), Some(&json!("shared")));
    assert_eq!(spec.get("agents"), Some(&json!(2)));
    assert!(provider.prompts()[0].contains("User: two agents\nAssistant: Okay.\n"));
}
