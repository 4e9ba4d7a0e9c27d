//! Wire format of the chat endpoint.
//!
//! `POST /api/chat` takes a [`ChatRequest`] and always answers with a
//! [`ChatResponse`] body, including on 4xx/5xx statuses.

use crate::domain::a001_chat::ChatMessage;
use crate::shared::serde_utils::null_as_default;
use serde::{Deserialize, Serialize};

/// Path of the chat endpoint, relative to the page origin
pub const CHAT_ENDPOINT: &str = "/api/chat";

/// Тело запроса `POST /api/chat`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    /// Full transcript so far, including the current user message.
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<ChatMessage>,
}

/// Тело ответа `POST /api/chat`
///
/// A body without `success` decodes as a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<ChatMessage>>,
}

impl ChatResponse {
    pub fn success(response: impl Into<String>, history: Vec<ChatMessage>) -> Self {
        Self {
            success: true,
            response: Some(response.into()),
            error: None,
            history: Some(history),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(error.into()),
            history: None,
        }
    }
}
