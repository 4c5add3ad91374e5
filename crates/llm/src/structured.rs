//! Structured Output
//!
//! Tolerant decoding of backend replies that were asked to be JSON. Backends
//! routinely wrap JSON in markdown fences or add chatter around it, and
//! sometimes return no JSON at all; decoding never fails; the caller
//! pattern-matches on `SanitizedResponse` instead.
//!
//! Also hosts the thin "generate" helpers built on `LlmProvider`.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::provider::LlmProvider;
use crate::types::{LlmRequestOptions, LlmResult, Message, MessageRole};

/// Key of the single-entry structure produced for unparseable replies
pub const RAW_OUTPUT_KEY: &str = "raw_output";

const FENCE: &str = "```";

/// Result of decoding a backend reply
#[derive(Debug, Clone, PartialEq)]
pub enum SanitizedResponse {
    /// The reply (after fence stripping) was valid JSON
    Parsed(Value),
    /// The reply could not be parsed; carries the post-stripping text
    Unparsed(String),
}

impl SanitizedResponse {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }

    /// The parsed payload, if any
    pub fn as_parsed(&self) -> Option<&Value> {
        match self {
            Self::Parsed(value) => Some(value),
            Self::Unparsed(_) => None,
        }
    }

    /// Collapse into a plain structure. Unparsed replies become
    /// `{"raw_output": <text>}`.
    pub fn into_value(self) -> Value {
        match self {
            Self::Parsed(value) => value,
            Self::Unparsed(raw) => serde_json::json!({ RAW_OUTPUT_KEY: raw }),
        }
    }
}

fn fenced_block_regex() -> Option<&'static Regex> {
    static FENCED: OnceLock<Option<Regex>> = OnceLock::new();
    FENCED
        .get_or_init(|| Regex::new(r"(?s)```[A-Za-z0-9_+\-]*(.*?)```").ok())
        .as_ref()
}

/// Remove markdown fences from a reply.
///
/// 1. A leading fence is dropped together with a language tag that directly
///    follows it (`json`, `JSON`, ...).
/// 2. A trailing fence is dropped.
/// 3. If a complete fenced block remains anywhere in the text, its content
///    replaces the working text.
pub fn strip_code_fences(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix(FENCE) {
        let rest = rest.trim_start_matches('`');
        let tag_len: usize = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-'))
            .map(char::len_utf8)
            .sum();
        text = rest[tag_len..].trim();
    }

    if let Some(rest) = text.strip_suffix(FENCE) {
        text = rest.trim();
    }

    if let Some(inner) = fenced_block_regex()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
    {
        return inner.as_str().trim().to_string();
    }

    text.to_string()
}

/// Outermost `{ ... }` span, used when chatter surrounds a bare object
fn outer_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Decode a raw backend reply. Never fails.
pub fn sanitize_response(raw: &str) -> SanitizedResponse {
    let text = strip_code_fences(raw);

    match serde_json::from_str::<Value>(&text) {
        Ok(value) => SanitizedResponse::Parsed(value),
        Err(strict_err) => {
            if let Some(value) = outer_object_span(&text)
                .filter(|span| span.len() < text.len())
                .and_then(|span| serde_json::from_str::<Value>(span).ok())
            {
                debug!("Recovered JSON object from surrounding text");
                return SanitizedResponse::Parsed(value);
            }
            debug!(error = %strict_err, "Backend reply is not JSON, returning raw text");
            SanitizedResponse::Unparsed(text)
        }
    }
}

/// Single prompt -> trimmed completion text
pub async fn generate_text(
    provider: &dyn LlmProvider,
    prompt: &str,
    options: LlmRequestOptions,
) -> LlmResult<String> {
    let response = provider
        .send_message(vec![Message::user(prompt)], None, options)
        .await?;
    Ok(response.text().to_string())
}

/// Single prompt -> decoded structured reply
pub async fn generate_structured(
    provider: &dyn LlmProvider,
    prompt: &str,
    options: LlmRequestOptions,
) -> LlmResult<SanitizedResponse> {
    let raw = generate_text(provider, prompt, options).await?;
    debug!(provider = provider.name(), raw_len = raw.len(), "Decoding structured reply");
    Ok(sanitize_response(&raw))
}

/// Flatten role-labelled messages into one prompt ending with an open
/// assistant turn.
pub fn chat_transcript(messages: &[Message]) -> String {
    let mut prompt: String = messages
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str().to_uppercase(), m.content))
        .collect::<Vec<_>>()
        .join("\n");
    prompt.push('\n');
    prompt.push_str(&MessageRole::Assistant.as_str().to_uppercase());
    prompt.push(':');
    prompt
}

/// Chat-style completion over a flattened transcript
pub async fn chat(
    provider: &dyn LlmProvider,
    messages: &[Message],
    options: LlmRequestOptions,
) -> LlmResult<String> {
    generate_text(provider, &chat_transcript(messages), options).await
}
