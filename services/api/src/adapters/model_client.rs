//! services/api/src/adapters/model_client.rs
//!
//! This module contains the adapter for the hosted text-completion endpoint.
//! It implements the `LanguageModelService` port from the `core` crate; JSON
//! extraction from the returned text happens in the port's `complete` method.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use tutor_core::ports::{LanguageModelService, PortError, PortResult};

const API_VERSION: &str = "2023-06-01";

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [UserMessage<'a>; 1],
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `LanguageModelService` over a messages-style HTTP API.
#[derive(Clone)]
pub struct MessagesApiAdapter {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
    api_key: Option<String>,
}

impl MessagesApiAdapter {
    /// Creates a new `MessagesApiAdapter`.
    pub fn new(
        http: reqwest::Client,
        endpoint: String,
        model: String,
        max_tokens: u32,
        api_key: Option<String>,
    ) -> Self {
        Self {
            http,
            endpoint,
            model,
            max_tokens,
            api_key,
        }
    }
}

//=========================================================================================
// `LanguageModelService` Trait Implementation
//=========================================================================================

#[async_trait]
impl LanguageModelService for MessagesApiAdapter {
    /// Sends a single-turn request and returns `content[0].text`.
    async fn complete_text(&self, system: &str, user: &str) -> PortResult<String> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: [UserMessage {
                role: "user",
                content: user,
            }],
        };

        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request
                .header("x-api-key", key)
                .header("anthropic-version", API_VERSION);
        }

        let response = request.send().await.map_err(|e| {
            error!("Model request failed: {}", e);
            PortError::ModelTransport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!("Model endpoint returned {}: {}", status, detail);
            return Err(PortError::ModelTransport(format!(
                "endpoint returned {}",
                status
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| PortError::ModelResponse(format!("unreadable response body: {}", e)))?;

        let text = parsed
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| {
                PortError::ModelResponse("response contained no text content".to_string())
            })?;

        debug!("Model replied with {} characters", text.len());
        Ok(text)
    }
}
