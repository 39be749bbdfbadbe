//! Global asset markdown configuration.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::client::{ApiClient, ApiError};
use crate::normalize::{normalize_global_markdown, MarkdownResponse};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PriceCalculation {
    #[serde(default)]
    pub asset: String,
    #[serde(default)]
    pub original_price: f64,
    #[serde(default)]
    pub markdown_percentage: f64,
    #[serde(default)]
    pub discount_amount: f64,
    #[serde(default)]
    pub discounted_price: f64,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub calculated_at: Option<String>,
}

pub struct AssetMarkdownService {
    client: Arc<ApiClient>,
}

impl AssetMarkdownService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn global(&self) -> Result<MarkdownResponse, ApiError> {
        let raw = self.client.get("/asset-markdown/global", &[]).await?;
        Ok(normalize_global_markdown(&raw))
    }

    pub async fn set_global(
        &self,
        markdown_percentage: f64,
        description: Option<&str>,
        updated_by: Option<&str>,
    ) -> Result<MarkdownResponse, ApiError> {
        let mut body = Map::new();
        body.insert(
            "markdownPercentage".to_string(),
            json!(markdown_percentage),
        );
        if let Some(description) = description {
            body.insert("description".to_string(), json!(description));
        }
        if let Some(updated_by) = updated_by {
            body.insert("updatedBy".to_string(), json!(updated_by));
        }

        let raw = self
            .client
            .post("/asset-markdown/set-global", &Value::Object(body))
            .await?;
        Ok(normalize_global_markdown(&raw))
    }

    pub async fn toggle_global(&self, updated_by: Option<&str>) -> Result<MarkdownResponse, ApiError> {
        let body = match updated_by {
            Some(updated_by) => json!({ "updatedBy": updated_by }),
            None => json!({}),
        };
        let raw = self
            .client
            .put("/asset-markdown/toggle-global", &body)
            .await?;
        Ok(normalize_global_markdown(&raw))
    }

    pub async fn calculate_price(
        &self,
        original_price: f64,
        asset: &str,
    ) -> Result<Option<PriceCalculation>, ApiError> {
        let query = vec![
            ("originalPrice".to_string(), original_price.to_string()),
            ("asset".to_string(), asset.to_string()),
        ];
        let raw = self
            .client
            .get("/asset-markdown/calculate-price", &query)
            .await?;

        match raw.get("data") {
            Some(data) if data.is_object() => Ok(Some(serde_json::from_value(data.clone())?)),
            _ => Ok(None),
        }
    }
}
