//! OpenAI Pipeline Integration Tests
//!
//! Configuration file -> schema file -> engine -> OpenAI-compatible HTTP
//! backend, with wiremock standing in for the server.

use std::sync::Arc;

use agent_blueprint::{AppError, ConfigService, RequirementsEngine, SettingsUpdate, FALLBACK_REPLY};
use agent_blueprint_llm::{LlmError, LlmProvider, OpenAIProvider};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TASK_SCHEMA: &str = r#"{
  "project": {
    "required": true,
    "type": "string",
    "description": "Project name",
    "ask_user": "What is the project called?"
  },
  "workers": {
    "required": false,
    "type": "list",
    "description": "Worker definitions",
    "ask_user": "Which workers do you need?",
    "structure": {"name": "string", "replicas": "number"}
  }
}"#;

fn completion(content: &str) -> Value {
    json!({
        "model": "gpt-4o-mini",
        "choices": [{
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 100, "completion_tokens": 20}
    })
}

async fn engine_for(server: &MockServer, dir: &tempfile::TempDir) -> RequirementsEngine {
    let schema_path = dir.path().join("schema.json");
    std::fs::write(&schema_path, TASK_SCHEMA).unwrap();

    let mut service = ConfigService::open(dir.path().join("config.json")).unwrap();
    service
        .update_config(SettingsUpdate {
            base_url: Some(format!("{}/v1", server.uri())),
            schema_path: Some(schema_path),
            reply_max_tokens: Some(300),
            ..Default::default()
        })
        .unwrap();

    let mut config = service.get_config().clone();
    config.provider = config.provider.with_api_key("sk-test");

    let provider: Arc<dyn LlmProvider> =
        Arc::new(OpenAIProvider::new(config.provider.clone()).unwrap());
    RequirementsEngine::from_config(&config, provider).unwrap()
}

#[tokio::test]
async fn test_turn_over_http_with_custom_schema() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"max_tokens": 300})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "```json\n{\"updated_fields\": {\"project\": \"Atlas\", \"agents\": 4, \"workers\": [{\"name\": \"crawler\", \"replicas\": 2}]}, \"reply\": \"Atlas it is.\"}\n```",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let engine = engine_for(&server, &dir).await;
    assert_eq!(engine.schema().field_names(), vec!["project", "workers"]);

    let outcome = engine.run_turn("It's called Atlas", Value::Null, &[]).await.unwrap();

    assert_eq!(outcome.reply, "Atlas it is.");
    assert_eq!(
        Value::Object(outcome.updated_fields),
        json!({"project": "Atlas", "workers": [{"name": "crawler", "replicas": 2}]})
    );
    assert!(outcome.needs_more);

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("- project (required, type=string): Project name"));
    assert!(prompt.contains("  Example: [ {\"name\":\"<string>\",\"replicas\":0} ]"));
    assert!(!prompt.contains("system_name"));
}

#[tokio::test]
async fn test_plain_text_completion_degrades_gracefully() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("I am not sure what you mean.")),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let engine = engine_for(&server, &dir).await;

    let outcome = engine.run_turn("???", Value::Null, &[]).await.unwrap();

    assert_eq!(outcome.reply, FALLBACK_REPLY);
    assert!(outcome.updated_fields.is_empty());
    assert!(outcome.needs_more);
}

#[tokio::test]
async fn test_http_error_surfaces_to_caller() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let engine = engine_for(&server, &dir).await;

    let err = engine.run_turn("hi", Value::Null, &[]).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Llm(LlmError::AuthenticationFailed { .. })
    ));
}
