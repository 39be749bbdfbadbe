//! Admin security-token inspection.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::client::{ApiClient, ApiError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRecord {
    pub token: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenList {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub refresh_tokens: Vec<RefreshTokenRecord>,
}

pub struct SecurityService {
    client: Arc<ApiClient>,
}

impl SecurityService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Exchange a refresh token for a new admin access token. The caller
    /// decides whether to store it in the session.
    pub async fn refresh_admin_token(&self, refresh_token: &str) -> Result<Option<String>, ApiError> {
        let raw = self
            .client
            .post(
                "/adminsignin/refresh-token",
                &json!({ "refreshToken": refresh_token }),
            )
            .await?;
        Ok(raw
            .get("accessToken")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string))
    }

    /// List the refresh tokens issued for an email, for token inspection.
    pub async fn refresh_tokens_for(&self, email: &str) -> Result<RefreshTokenList, ApiError> {
        let query = vec![("email".to_string(), email.to_string())];
        let raw = self
            .client
            .get("/fetching/refresh-tokens", &query)
            .await?;
        Ok(serde_json::from_value(raw)?)
    }
}
