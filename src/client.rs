use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::session::SessionStore;

/// Error body the backend sends when the admin token has been revoked or
/// has expired. Matching it exactly is what distinguishes a fatal session
/// error from an ordinary 403.
const INVALID_ADMIN_TOKEN_BODY: &str = "Forbidden: Invalid admin token.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("request failed with status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("admin session invalidated: {0}")]
    Auth(String),
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// Message suitable for a toast or inline banner.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => {
                "Network error. Please check your connection and try again.".to_string()
            }
            ApiError::Api { message, .. } => message.clone(),
            ApiError::Auth(_) => "Your session has expired. Please sign in again.".to_string(),
            ApiError::Validation(message) => message.clone(),
            ApiError::Json(_) => "Received an unexpected response from the server.".to_string(),
        }
    }
}

/// Thin JSON transport over the admin REST backend.
///
/// Attaches the bearer credential when one is stored, turns non-2xx
/// responses into [`ApiError::Api`], and treats the backend's
/// invalid-admin-token 403 as fatal to the session: the session store is
/// invalidated so subscribers can redirect to sign-in.
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
    default_page_size: u32,
    scroll_threshold_px: f64,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
            default_page_size: config.default_page_size,
            scroll_threshold_px: config.scroll_threshold_px,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Page size used by controllers built through the service facades.
    pub fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    /// Scroll threshold applied to controllers built through the service
    /// facades.
    pub fn scroll_threshold_px(&self) -> f64 {
        self.scroll_threshold_px
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, ApiError> {
        let request = self.http.get(self.url(path)).query(query);
        self.send(path, request).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let request = self.http.post(self.url(path)).json(body);
        self.send(path, request).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let request = self.http.put(self.url(path)).json(body);
        self.send(path, request).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let request = self.http.patch(self.url(path)).json(body);
        self.send(path, request).await
    }

    pub async fn delete(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let request = self.http.delete(self.url(path)).json(body);
        self.send(path, request).await
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> Result<Value, ApiError> {
        let request_id = Uuid::new_v4();
        debug!(%request_id, path, "Sending admin API request");

        let request = match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            if status == StatusCode::NO_CONTENT {
                return Ok(Value::Null);
            }
            let body: Value = response.json().await?;
            return Ok(body);
        }

        // Error bodies are best-effort JSON; a non-JSON body still maps to
        // a displayable message below.
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if status == StatusCode::FORBIDDEN && is_invalid_admin_token(&body) {
            warn!(%request_id, path, "Admin token rejected, invalidating session");
            self.session.invalidate();
            return Err(ApiError::Auth(INVALID_ADMIN_TOKEN_BODY.to_string()));
        }

        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("Request failed with HTTP {}", status.as_u16()));
        warn!(%request_id, path, status = status.as_u16(), "Admin API request failed: {}", message);

        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Percent-encode a value interpolated into a URL path segment.
pub(crate) fn encode_path_segment(raw: &str) -> String {
    raw.bytes()
        .map(|byte| match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (byte as char).to_string()
            }
            _ => format!("%{:02X}", byte),
        })
        .collect()
}

pub(crate) fn is_invalid_admin_token(body: &Value) -> bool {
    body.get("error").and_then(Value::as_str) == Some(INVALID_ADMIN_TOKEN_BODY)
}

pub(crate) fn extract_error_message(body: &Value) -> Option<String> {
    for key in ["message", "error"] {
        if let Some(text) = body.get(key).and_then(Value::as_str) {
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invalid_token_body_is_detected_exactly() {
        assert!(is_invalid_admin_token(&json!({
            "error": "Forbidden: Invalid admin token."
        })));
        assert!(!is_invalid_admin_token(&json!({
            "error": "Forbidden"
        })));
        assert!(!is_invalid_admin_token(&json!({
            "message": "Forbidden: Invalid admin token."
        })));
        assert!(!is_invalid_admin_token(&Value::Null));
    }

    #[test]
    fn error_message_prefers_message_field() {
        let body = json!({ "message": "Rate not found", "error": "NOT_FOUND" });
        assert_eq!(extract_error_message(&body).as_deref(), Some("Rate not found"));

        let body = json!({ "error": "NOT_FOUND" });
        assert_eq!(extract_error_message(&body).as_deref(), Some("NOT_FOUND"));

        assert_eq!(extract_error_message(&Value::Null), None);
    }

    #[test]
    fn config_defaults_are_carried_by_the_client() {
        let config = ClientConfig {
            base_url: "http://backend.test/".to_string(),
            request_timeout_seconds: 5,
            default_page_size: 25,
            scroll_threshold_px: 250.0,
        };
        let client = ApiClient::new(&config, Arc::new(SessionStore::new())).unwrap();

        assert_eq!(client.default_page_size(), 25);
        assert_eq!(client.scroll_threshold_px(), 250.0);
        assert_eq!(client.url("/onramp/onramp-rate"), "http://backend.test/onramp/onramp-rate");
    }

    #[test]
    fn path_segments_are_percent_encoded() {
        assert_eq!(encode_path_segment("BTC"), "BTC");
        assert_eq!(encode_path_segment("BNB Smart Chain"), "BNB%20Smart%20Chain");
        assert_eq!(encode_path_segment("a/b"), "a%2Fb");
    }

    #[test]
    fn user_messages_do_not_leak_internals() {
        let error = ApiError::Api {
            status: 404,
            message: "Rate not found".to_string(),
        };
        assert_eq!(error.user_message(), "Rate not found");

        let error = ApiError::Auth("Forbidden: Invalid admin token.".to_string());
        assert_eq!(
            error.user_message(),
            "Your session has expired. Please sign in again."
        );
    }
}
