//! API utilities for frontend-backend communication
//!
//! Provides helper functions for constructing API URLs.

/// Get the base URL for API requests
///
/// The backend serves the widget itself, so API calls go to the page origin
/// (scheme, host and port of the current page).
///
/// # Returns
/// - Origin like "http://localhost:3000" or "https://chat.example.com"
/// - Empty string if window is not available (requests become relative)
pub fn api_base() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

/// Build a full API URL from a path
///
/// # Example
/// ```ignore
/// let url = api_url("/api/chat");
/// ```
pub fn api_url(path: &str) -> String {
    join_url(&api_base(), path)
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_keeps_origin_port() {
        assert_eq!(
            join_url("https://chat.example.com", "/api/chat"),
            "https://chat.example.com/api/chat"
        );
        assert_eq!(
            join_url("http://localhost:8080/", "/api/chat"),
            "http://localhost:8080/api/chat"
        );
    }

    #[test]
    fn test_join_url_without_origin_is_relative() {
        assert_eq!(join_url("", "/api/chat"), "/api/chat");
        assert_eq!(join_url("", "api/chat"), "/api/chat");
    }
}
