//! Test doubles for the unit tests of this crate and, behind the `testing`
//! feature, for the service's integration tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{LanguageModelService, PortError, PortResult};

/// Replays canned model replies in order and records every prompt it saw.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str) -> Self {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    /// Queues another reply on a double that is already shared.
    pub fn push(&self, text: &str) {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModelService for ScriptedModel {
    async fn complete_text(&self, system: &str, user: &str) -> PortResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(PortError::ModelTransport(message)),
            None => Err(PortError::ModelTransport("no scripted reply left".to_string())),
        }
    }
}
