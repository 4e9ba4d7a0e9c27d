use axum::http::{header, Method};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use contracts::shared::chat_api::CHAT_ENDPOINT;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::{api::handlers, system};

/// Конфигурация всех роутов приложения
///
/// Unknown paths are served from `static_dir` (the built widget).
pub fn configure_routes(static_dir: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(CHAT_ENDPOINT, post(handlers::a001_chat::send_message))
        .fallback_service(ServeDir::new(static_dir))
        .layer(middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ))
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use contracts::shared::chat_api::ChatResponse;
    use tower::ServiceExt;

    async fn call(request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = configure_routes("dist").oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
    }

    #[tokio::test]
    async fn test_chat_rejects_invalid_json() {
        let request = Request::post(CHAT_ENDPOINT)
            .body(Body::from("not json"))
            .unwrap();
        let (status, body) = call(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let resp: ChatResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            resp,
            ChatResponse::failure(handlers::a001_chat::INVALID_JSON_ERROR)
        );
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_message() {
        let request = Request::post(CHAT_ENDPOINT)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"message":"  ","history":[]}"#))
            .unwrap();
        let (status, body) = call(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let resp: ChatResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp.error.as_deref(), Some(handlers::a001_chat::EMPTY_MESSAGE_ERROR));
    }
}
