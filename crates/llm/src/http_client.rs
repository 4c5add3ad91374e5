//! HTTP Client Factory
//!
//! Provides a factory function for building reqwest clients from provider
//! configuration.

use std::time::Duration;

use crate::types::{LlmError, LlmResult, ProviderConfig};

/// Build a `reqwest::Client` honoring the configured request timeout.
///
/// - `Some(secs)` -> whole-request timeout
/// - `None` -> no client-side timeout; the caller owns cancellation
pub fn build_http_client(config: &ProviderConfig) -> LlmResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().map_err(|e| LlmError::Other {
        message: format!("failed to build HTTP client: {}", e),
    })
}
