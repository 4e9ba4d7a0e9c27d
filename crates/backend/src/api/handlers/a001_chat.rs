use axum::{body::Bytes, http::StatusCode, Json};
use contracts::domain::a001_chat::ChatMessage;
use contracts::shared::chat_api::{ChatRequest, ChatResponse};

use crate::domain::a001_chat::service::{self, ChatService};

pub const INVALID_JSON_ERROR: &str = "Request body must be valid JSON.";
pub const EMPTY_MESSAGE_ERROR: &str = "Message cannot be empty.";
pub const AGENT_FAILURE_ERROR: &str = "Ocurrió un error generando la respuesta del agente.";

type ChatReply = (StatusCode, Json<ChatResponse>);

fn failure(status: StatusCode, error: &str) -> ChatReply {
    (status, Json(ChatResponse::failure(error)))
}

/// POST /api/chat
///
/// Принимает `{ message, history }`, возвращает `{ success, response, history }`.
/// The body is parsed whatever its content type; failures are answered with
/// a `{ success: false, error }` body.
pub async fn send_message(body: Bytes) -> ChatReply {
    let (message, history) = match parse_request(&body) {
        Ok(parsed) => parsed,
        Err(reply) => return reply,
    };

    let Some(chat_service) = service::get_service() else {
        tracing::error!("/api/chat: chat service is not initialized");
        return failure(StatusCode::INTERNAL_SERVER_ERROR, AGENT_FAILURE_ERROR);
    };

    respond(chat_service, &message, history).await
}

/// Validate the raw body: valid JSON (`null` counts as `{}`) with a
/// non-blank `message`. Returns the trimmed message and the history.
pub fn parse_request(body: &[u8]) -> Result<(String, Vec<ChatMessage>), ChatReply> {
    let request = match serde_json::from_slice::<Option<ChatRequest>>(body) {
        Ok(request) => request.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("/api/chat: invalid JSON body: {}", e);
            return Err(failure(StatusCode::BAD_REQUEST, INVALID_JSON_ERROR));
        }
    };

    let message = request.message.trim();
    if message.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, EMPTY_MESSAGE_ERROR));
    }

    Ok((message.to_string(), request.history))
}

/// Ask the agent and wrap its answer; the received history is echoed back.
pub async fn respond(
    chat_service: &ChatService,
    message: &str,
    history: Vec<ChatMessage>,
) -> ChatReply {
    match chat_service.generate_response(message, &history).await {
        Ok(text) => (StatusCode::OK, Json(ChatResponse::success(text, history))),
        Err(e) => {
            tracing::error!("/api/chat: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, AGENT_FAILURE_ERROR)
        }
    }
}
