//! Shared helpers for the API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use api_lib::web::{router, state::AppState};
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use tutor_core::{testing::ScriptedModel, InMemoryStore, LanguageModelService};

pub const TEACHER_PASSPHRASE: &str = "letmein";

pub struct TestApp<M = ScriptedModel> {
    pub router: Router,
    pub state: Arc<AppState>,
    pub model: Arc<M>,
}

impl TestApp<ScriptedModel> {
    pub fn new() -> Self {
        Self::with_model(Arc::new(ScriptedModel::new()))
    }
}

impl<M: LanguageModelService + 'static> TestApp<M> {
    pub fn with_model(model: Arc<M>) -> Self {
        let state = Arc::new(AppState::new(
            Arc::new(InMemoryStore::new()),
            model.clone(),
            TEACHER_PASSPHRASE.to_string(),
        ));
        Self {
            router: router(state.clone()),
            state,
            model,
        }
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, HeaderMap, Value) {
        send(self.router.clone(), method, uri, cookie, body).await
    }
}

/// Sends one request. Bodies that are not JSON come back as a JSON string.
pub async fn send(
    router: Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, headers, value)
}

/// The `name=value` pair from a `Set-Cookie` header, ready to send back.
pub fn session_cookie(headers: &HeaderMap) -> String {
    headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
        .expect("response should set a session cookie")
}
