//! On/off-ramp NGN rates and the NGN markup record.
//!
//! Three endpoints deliver "one number plus a timestamp" under three
//! different field names; everything here funnels through
//! [`normalize_rate`] so consumers only ever see the canonical record.

use futures::future::try_join3;
use serde_json::json;
use std::sync::Arc;

use crate::client::{ApiClient, ApiError};
use crate::normalize::{normalize_rate, RateResponse};

/// All three rate records fetched together for the fees screen.
#[derive(Debug, Clone)]
pub struct RateOverview {
    pub onramp: RateResponse,
    pub offramp: RateResponse,
    pub markup: RateResponse,
}

pub struct RateService {
    client: Arc<ApiClient>,
}

impl RateService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn onramp_rate(&self) -> Result<RateResponse, ApiError> {
        let raw = self.client.get("/onramp/onramp-rate", &[]).await?;
        Ok(normalize_rate(&raw))
    }

    pub async fn set_onramp_rate(&self, rate: f64) -> Result<RateResponse, ApiError> {
        let raw = self
            .client
            .post("/onramp/onramp-rate", &json!({ "rate": rate }))
            .await?;
        Ok(normalize_rate(&raw))
    }

    pub async fn offramp_rate(&self) -> Result<RateResponse, ApiError> {
        let raw = self.client.get("/offramp/offramp-rate", &[]).await?;
        Ok(normalize_rate(&raw))
    }

    pub async fn set_offramp_rate(&self, rate: f64) -> Result<RateResponse, ApiError> {
        let raw = self
            .client
            .post("/offramp/offramp-rate", &json!({ "rate": rate }))
            .await?;
        Ok(normalize_rate(&raw))
    }

    pub async fn markup_record(&self) -> Result<RateResponse, ApiError> {
        let raw = self.client.get("/marker/markup-record", &[]).await?;
        Ok(normalize_rate(&raw))
    }

    pub async fn update_markup(&self, markup: f64) -> Result<RateResponse, ApiError> {
        let raw = self
            .client
            .put("/marker/markup", &json!({ "markup": markup }))
            .await?;
        Ok(normalize_rate(&raw))
    }

    /// Fetch all three rate records concurrently.
    pub async fn fetch_overview(&self) -> Result<RateOverview, ApiError> {
        let (onramp, offramp, markup) = try_join3(
            self.onramp_rate(),
            self.offramp_rate(),
            self.markup_record(),
        )
        .await?;

        Ok(RateOverview {
            onramp,
            offramp,
            markup,
        })
    }
}
