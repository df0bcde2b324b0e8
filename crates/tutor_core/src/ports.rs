//! crates/tutor_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete key-value store and the hosted language model.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::extract::extract_json;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
///
/// The three user-facing classes are `Validation`, `ModelTransport` and
/// `ModelResponse`; callers only ever see the message text.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("{0}")]
    Validation(String),
    #[error("Model request failed: {0}")]
    ModelTransport(String),
    #[error("Model returned an unusable response: {0}")]
    ModelResponse(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Generic get/set over string keys to JSON values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when the key has never been written.
    async fn get(&self, key: &str) -> PortResult<Option<Value>>;

    /// Overwrites the whole value stored under `key`.
    async fn set(&self, key: &str, value: Value) -> PortResult<()>;
}

/// A single-turn text completion endpoint that is asked to answer in JSON.
#[async_trait]
pub trait LanguageModelService: Send + Sync {
    /// Sends the instructions and returns the raw text the model produced.
    async fn complete_text(&self, system: &str, user: &str) -> PortResult<String>;

    /// Sends the instructions and extracts the JSON embedded in the reply.
    async fn complete(&self, system: &str, user: &str) -> PortResult<Value> {
        let text = self.complete_text(system, user).await?;
        extract_json(&text)
    }
}

/// Calls the model and deserializes the extracted JSON into `T`.
///
/// A reply whose shape does not match `T` is a `ModelResponse` error.
pub async fn complete_as<T: DeserializeOwned>(
    model: &dyn LanguageModelService,
    system: &str,
    user: &str,
) -> PortResult<T> {
    let value = model.complete(system, user).await?;
    serde_json::from_value(value)
        .map_err(|e| PortError::ModelResponse(format!("unexpected response shape: {}", e)))
}

/// Reads `key` and deserializes it, treating an absent key as `None`.
pub async fn get_typed<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> PortResult<Option<T>> {
    match store.get(key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| PortError::Unexpected(format!("corrupt value under '{}': {}", key, e))),
        None => Ok(None),
    }
}

/// Serializes `value` and stores it under `key`.
pub async fn set_typed<T: serde::Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> PortResult<()> {
    let value = serde_json::to_value(value).map_err(|e| PortError::Unexpected(e.to_string()))?;
    store.set(key, value).await
}
