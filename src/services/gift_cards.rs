//! Gift-card rate table.
//!
//! A third pagination shape: `currentPage`/`totalPages`/`totalRates`, with
//! no has-next flag of its own, so the next-page signal is derived from
//! the backend's reported page count. The rate listing takes its filters
//! (`country`, `cardType`, `vanillaType`, `isActive`) on the same endpoint
//! as the plain listing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::client::{encode_path_segment, ApiClient, ApiError};
use crate::collection::{
    CollectionController, FilterSet, PageCursor, PageResult, PagedSource,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GiftCardRate {
    pub id: String,
    pub card_type: String,
    pub country: String,
    #[serde(default)]
    pub rate: f64,
    #[serde(default)]
    pub rate_display: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub physical_rate: Option<f64>,
    #[serde(default)]
    pub ecode_rate: Option<f64>,
    #[serde(default)]
    pub min_amount: Option<f64>,
    #[serde(default)]
    pub max_amount: Option<f64>,
    #[serde(default)]
    pub vanilla_type: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RatesPagination {
    #[serde(default = "default_page")]
    current_page: u32,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    total_rates: u64,
}

fn default_page() -> u32 {
    1
}

#[derive(Debug, Deserialize, Default)]
struct RatesData {
    #[serde(default)]
    rates: Vec<GiftCardRate>,
    #[serde(default)]
    pagination: RatesPagination,
}

#[derive(Debug, Deserialize)]
struct RatesPayload {
    #[serde(default)]
    data: RatesData,
}

pub struct GiftCardRateSource {
    client: Arc<ApiClient>,
}

impl GiftCardRateSource {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    async fn fetch(&self, query: Vec<(String, String)>) -> Result<PageResult<GiftCardRate>, ApiError> {
        let raw = self.client.get("/admingiftcard/rates", &query).await?;
        let payload: RatesPayload = serde_json::from_value(raw)?;
        let pagination = payload.data.pagination;

        Ok(PageResult {
            items: payload.data.rates,
            current_page: pagination.current_page,
            has_next_page: pagination.current_page < pagination.total_pages,
            total_count: pagination.total_rates,
        })
    }
}

#[async_trait]
impl PagedSource for GiftCardRateSource {
    type Item = GiftCardRate;

    async fn fetch_plain(&self, cursor: &PageCursor) -> Result<PageResult<GiftCardRate>, ApiError> {
        self.fetch(cursor.query_pairs()).await
    }

    async fn fetch_filtered(
        &self,
        filters: &FilterSet,
        cursor: &PageCursor,
    ) -> Result<PageResult<GiftCardRate>, ApiError> {
        let mut query = filters.active_query();
        query.extend(cursor.query_pairs());
        self.fetch(query).await
    }
}

/// Payload for creating a gift-card rate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGiftCardRate {
    pub card_type: String,
    pub country: String,
    pub rate: f64,
    pub rate_display: String,
    pub is_active: bool,
    pub physical_rate: f64,
    pub ecode_rate: f64,
    pub min_amount: f64,
    pub max_amount: f64,
    pub vanilla_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update for an existing rate. Unset fields are left untouched
/// by the backend, so they are omitted from the body entirely.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftCardRateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

pub struct GiftCardService {
    client: Arc<ApiClient>,
}

impl GiftCardService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Controller for the gift-card rate table, using the client's
    /// configured page size and scroll threshold.
    pub fn rate_table(&self) -> Result<CollectionController<GiftCardRateSource>, ApiError> {
        let controller = CollectionController::new(
            GiftCardRateSource::new(Arc::clone(&self.client)),
            self.client.default_page_size(),
        )?;
        Ok(controller.scroll_threshold_px(self.client.scroll_threshold_px()))
    }

    pub async fn create_rate(&self, rate: &NewGiftCardRate) -> Result<GiftCardRate, ApiError> {
        let body = serde_json::to_value(rate)?;
        let raw = self.client.post("/admingiftcard/rates", &body).await?;
        let data = raw.get("data").cloned().unwrap_or(Value::Null);
        Ok(serde_json::from_value(data)?)
    }

    pub async fn bulk_create_rates(&self, rates: &[NewGiftCardRate]) -> Result<Value, ApiError> {
        let body = json!({ "rates": rates });
        self.client.post("/admingiftcard/rates/bulk", &body).await
    }

    pub async fn update_rate(
        &self,
        id: &str,
        update: &GiftCardRateUpdate,
    ) -> Result<GiftCardRate, ApiError> {
        let path = format!("/admingiftcard/rates/{}", encode_path_segment(id));
        let body = serde_json::to_value(update)?;
        let raw = self.client.put(&path, &body).await?;
        let data = raw.get("data").cloned().unwrap_or(Value::Null);
        Ok(serde_json::from_value(data)?)
    }

    pub async fn delete_rate(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/admingiftcard/rates/{}", encode_path_segment(id));
        self.client.delete(&path, &Value::Null).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_next_is_derived_from_reported_page_count() {
        let payload: RatesPayload = serde_json::from_value(json!({
            "success": true,
            "data": {
                "rates": [
                    { "id": "r1", "cardType": "Amazon", "country": "US", "rate": 1100.0, "rateDisplay": "1100 NGN/USD", "isActive": true, "createdAt": "2024-01-01" }
                ],
                "pagination": { "currentPage": 2, "totalPages": 4, "totalRates": 95, "limit": 25 }
            },
            "message": "ok"
        }))
        .unwrap();

        let pagination = &payload.data.pagination;
        assert_eq!(pagination.current_page, 2);
        assert!(pagination.current_page < pagination.total_pages);
        assert_eq!(pagination.total_rates, 95);
    }

    #[test]
    fn rate_update_omits_unset_fields() {
        let update = GiftCardRateUpdate {
            rate: Some(1150.0),
            is_active: None,
            notes: None,
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "rate": 1150.0 })
        );

        let update = GiftCardRateUpdate {
            rate: None,
            is_active: Some(false),
            notes: Some("paused".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "isActive": false, "notes": "paused" })
        );
    }

    #[test]
    fn last_page_has_no_next() {
        let payload: RatesPayload = serde_json::from_value(json!({
            "data": {
                "rates": [],
                "pagination": { "currentPage": 4, "totalPages": 4, "totalRates": 95, "limit": 25 }
            }
        }))
        .unwrap();
        let pagination = &payload.data.pagination;
        assert!(pagination.current_page >= pagination.total_pages);
    }
}
