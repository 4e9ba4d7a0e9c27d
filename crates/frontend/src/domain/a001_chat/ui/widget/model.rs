//! Chat Widget - Model (HTTP transport)

use crate::domain::a001_chat::client::ChatTransport;
use async_trait::async_trait;
use contracts::shared::chat_api::{ChatRequest, ChatResponse};
use gloo_net::http::Request;

/// `POST /api/chat` over `fetch`
pub struct HttpChatTransport {
    url: String,
}

impl HttpChatTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait(?Send)]
impl ChatTransport for HttpChatTransport {
    /// The body is decoded whatever the HTTP status is: the endpoint answers
    /// 4xx/5xx with a `{success: false, error}` body.
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, String> {
        Request::post(&self.url)
            .json(request)
            .map_err(|e| e.to_string())?
            .send()
            .await
            .map_err(|e| e.to_string())?
            .json::<ChatResponse>()
            .await
            .map_err(|e| e.to_string())
    }
}
