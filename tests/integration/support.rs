//! Scripted backend shared by the integration tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use agent_blueprint_llm::{
    LlmError, LlmProvider, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig,
    StopReason, UsageStats,
};
use async_trait::async_trait;

/// Replays queued replies in order and records every prompt it was sent
pub struct ScriptedProvider {
    config: ProviderConfig,
    replies: Mutex<VecDeque<LlmResult<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_results(replies.into_iter().map(|r| Ok(r.into())))
    }

    pub fn with_results(replies: impl IntoIterator<Item = LlmResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            config: ProviderConfig::default(),
            replies: Mutex::new(replies.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        _system: Option<String>,
        _request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        let prompt = messages
            .into_iter()
            .map(|m| m.content)
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt);

        let next = self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(LlmError::Other {
                message: "script exhausted".to_string(),
            })
        });

        next.map(|text| LlmResponse {
            content: Some(text),
            stop_reason: StopReason::EndTurn,
            usage: UsageStats::default(),
            model: self.config.model.clone(),
        })
    }
}
