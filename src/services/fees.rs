//! Crypto network fee table.
//!
//! The fee table is the smallest instance of the collection pattern: the
//! backend returns the whole list in one response, so the source serves it
//! as a single page and the fee search filters client-side.

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
pub struct CryptoFee {
    pub currency: String,
    pub network: String,
    #[serde(default)]
    pub network_name: String,
    #[serde(default)]
    pub network_fee: f64,
}

fn matches_filters(fee: &CryptoFee, filters: &FilterSet) -> bool {
    filters.active_pairs().all(|(key, value)| match key {
        "search" => {
            let needle = value.to_lowercase();
            fee.currency.to_lowercase().contains(&needle)
                || fee.network.to_lowercase().contains(&needle)
                || fee.network_name.to_lowercase().contains(&needle)
        }
        "currency" => fee.currency.eq_ignore_ascii_case(value),
        "network" => fee.network.eq_ignore_ascii_case(value),
        _ => true,
    })
}

pub struct CryptoFeeSource {
    client: Arc<ApiClient>,
}

impl CryptoFeeSource {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    async fn fetch_all(&self) -> Result<Vec<CryptoFee>, ApiError> {
        let raw = self.client.get("/set-fee/crypto-fee", &[]).await?;
        let data = raw.get("data").cloned().unwrap_or(Value::Array(Vec::new()));
        Ok(serde_json::from_value(data)?)
    }

    fn single_page(fees: Vec<CryptoFee>) -> PageResult<CryptoFee> {
        PageResult {
            total_count: fees.len() as u64,
            current_page: 1,
            has_next_page: false,
            items: fees,
        }
    }
}

#[async_trait]
impl PagedSource for CryptoFeeSource {
    type Item = CryptoFee;

    async fn fetch_plain(&self, _cursor: &PageCursor) -> Result<PageResult<CryptoFee>, ApiError> {
        Ok(Self::single_page(self.fetch_all().await?))
    }

    async fn fetch_filtered(
        &self,
        filters: &FilterSet,
        _cursor: &PageCursor,
    ) -> Result<PageResult<CryptoFee>, ApiError> {
        let fees = self.fetch_all().await?;
        let filtered = fees
            .into_iter()
            .filter(|fee| matches_filters(fee, filters))
            .collect();
        Ok(Self::single_page(filtered))
    }
}

pub struct CryptoFeeService {
    client: Arc<ApiClient>,
}

impl CryptoFeeService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Controller for the fee table, using the client's configured page
    /// size and scroll threshold.
    pub fn fee_table(&self) -> Result<CollectionController<CryptoFeeSource>, ApiError> {
        let controller = CollectionController::new(
            CryptoFeeSource::new(Arc::clone(&self.client)),
            self.client.default_page_size(),
        )?;
        Ok(controller.scroll_threshold_px(self.client.scroll_threshold_px()))
    }

    pub async fn get_fee(&self, currency: &str, network: &str) -> Result<CryptoFee, ApiError> {
        let path = format!(
            "/set-fee/crypto-fee/{}/{}",
            encode_path_segment(currency),
            encode_path_segment(network)
        );
        let raw = self.client.get(&path, &[]).await?;
        let data = raw.get("data").cloned().unwrap_or(Value::Null);
        Ok(serde_json::from_value(data)?)
    }

    pub async fn update_fee(
        &self,
        currency: &str,
        network: &str,
        network_name: &str,
        network_fee: f64,
    ) -> Result<CryptoFee, ApiError> {
        let body = json!({
            "currency": currency,
            "network": network,
            "networkName": network_name,
            "networkFee": network_fee,
        });
        let raw = self.client.put("/set-fee/crypto-fee", &body).await?;
        let data = raw.get("data").cloned().unwrap_or(Value::Null);
        Ok(serde_json::from_value(data)?)
    }

    pub async fn update_network_name(
        &self,
        currency: &str,
        network: &str,
        network_name: &str,
    ) -> Result<(), ApiError> {
        let body = json!({
            "currency": currency,
            "network": network,
            "networkName": network_name,
        });
        self.client.patch("/set-fee/crypto-fee-name", &body).await?;
        Ok(())
    }
}
