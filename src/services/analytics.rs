//! Dashboard analytics and the recent-transaction feed.
//!
//! The feed is the busiest instance of the collection pattern: the plain
//! endpoint returns transactions only, while the filter endpoint also
//! returns the matching users and aggregate statistics, which the view
//! shows alongside the table.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use crate::client::{ApiClient, ApiError};
use crate::collection::{
    CollectionController, FilterSet, PageCursor, PageResult, PagedSource,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub status: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub fee: Option<f64>,
    #[serde(default)]
    pub narration: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    // Swap fields
    #[serde(default)]
    pub from_currency: Option<String>,
    #[serde(default)]
    pub to_currency: Option<String>,
    #[serde(default)]
    pub from_amount: Option<f64>,
    #[serde(default)]
    pub to_amount: Option<f64>,
    #[serde(default)]
    pub swap_type: Option<String>,
    #[serde(default)]
    pub exchange_rate: Option<f64>,
    // Withdrawal fields
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub account_number_masked: Option<String>,
    #[serde(default)]
    pub withdrawal_fee: Option<f64>,
    // Internal transfer fields
    #[serde(default)]
    pub recipient_username: Option<String>,
    #[serde(default)]
    pub sender_username: Option<String>,
    // Gift-card fields
    #[serde(default)]
    pub card_type: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub expected_rate: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ListPagination {
    #[serde(default = "default_page")]
    current_page: u32,
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    has_next_page: bool,
}

fn default_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct RecentTransactionsPayload {
    #[serde(default)]
    pagination: ListPagination,
    #[serde(default)]
    data: Vec<Transaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilteredUser {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub bvn_verified: bool,
    #[serde(default)]
    pub chatbot_verified: bool,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub total_fees: f64,
    #[serde(default)]
    pub avg_amount: f64,
    #[serde(default)]
    pub successful_count: u64,
    #[serde(default)]
    pub pending_count: u64,
    #[serde(default)]
    pub failed_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilteredPayload {
    #[serde(default)]
    pagination: ListPagination,
    #[serde(default)]
    aggregate_stats: AggregateStats,
    #[serde(default)]
    data: FilteredData,
}

#[derive(Debug, Deserialize, Default)]
struct FilteredData {
    #[serde(default)]
    transactions: Vec<Transaction>,
    #[serde(default)]
    users: Vec<FilteredUser>,
}

/// Secondary results the filter endpoint computes beyond the transaction
/// page itself.
#[derive(Debug, Clone, Default)]
pub struct FilterSideData {
    pub users: Vec<FilteredUser>,
    pub aggregate_stats: AggregateStats,
}

/// Endpoint pair for the dashboard transaction feed.
pub struct TransactionSource {
    client: Arc<ApiClient>,
    side_data: Mutex<Option<FilterSideData>>,
}

impl TransactionSource {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            side_data: Mutex::new(None),
        }
    }

    /// Matching users and aggregate stats from the most recent filtered
    /// fetch; `None` after a plain fetch.
    pub fn filter_side_data(&self) -> Option<FilterSideData> {
        self.side_data.lock().expect("side data lock poisoned").clone()
    }
}

#[async_trait]
impl PagedSource for TransactionSource {
    type Item = Transaction;

    async fn fetch_plain(&self, cursor: &PageCursor) -> Result<PageResult<Transaction>, ApiError> {
        let raw = self
            .client
            .get("/analytics/recent-transactions", &cursor.query_pairs())
            .await?;
        let payload: RecentTransactionsPayload = serde_json::from_value(raw)?;

        *self.side_data.lock().expect("side data lock poisoned") = None;

        Ok(PageResult {
            items: payload.data,
            current_page: payload.pagination.current_page,
            has_next_page: payload.pagination.has_next_page,
            total_count: payload.pagination.total_count,
        })
    }

    async fn fetch_filtered(
        &self,
        filters: &FilterSet,
        cursor: &PageCursor,
    ) -> Result<PageResult<Transaction>, ApiError> {
        let mut query = filters.active_query();
        query.extend(cursor.query_pairs());

        let raw = self.client.get("/analytics/filter", &query).await?;
        let payload: FilteredPayload = serde_json::from_value(raw)?;

        *self.side_data.lock().expect("side data lock poisoned") = Some(FilterSideData {
            users: payload.data.users,
            aggregate_stats: payload.aggregate_stats,
        });

        Ok(PageResult {
            items: payload.data.transactions,
            current_page: payload.pagination.current_page,
            has_next_page: payload.pagination.has_next_page,
            total_count: payload.pagination.total_count,
        })
    }
}

/// Draft filter values for the transaction feed, validated before they are
/// turned into query parameters. Empty strings mean "inactive".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilters {
    pub search_term: String,
    pub date_from: String,
    pub date_to: String,
    pub transaction_type: String,
    pub transaction_status: String,
    pub user_verification_status: String,
    pub currency: String,
    pub min_amount: String,
    pub max_amount: String,
}

impl TransactionFilters {
    /// Validate and convert into a [`FilterSet`]. Amount bounds must parse
    /// as decimals and form a sane range; failures surface before any
    /// request is issued.
    pub fn into_filter_set(self) -> Result<FilterSet, ApiError> {
        let min = parse_amount("Minimum amount", &self.min_amount)?;
        let max = parse_amount("Maximum amount", &self.max_amount)?;
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(ApiError::Validation(
                    "Minimum amount cannot exceed maximum amount".to_string(),
                ));
            }
        }

        let mut filters = FilterSet::new();
        filters.set("searchTerm", self.search_term);
        filters.set("dateFrom", self.date_from);
        filters.set("dateTo", self.date_to);
        filters.set("transactionType", self.transaction_type);
        filters.set("transactionStatus", self.transaction_status);
        filters.set("userVerificationStatus", self.user_verification_status);
        filters.set("currency", self.currency);
        filters.set("minAmount", self.min_amount);
        filters.set("maxAmount", self.max_amount);
        Ok(filters)
    }
}

fn parse_amount(label: &str, raw: &str) -> Result<Option<Decimal>, ApiError> {
    if raw.is_empty() {
        return Ok(None);
    }
    let amount = Decimal::from_str(raw.trim())
        .map_err(|_| ApiError::Validation(format!("{} is not a valid number", label)))?;
    if amount.is_sign_negative() {
        return Err(ApiError::Validation(format!("{} cannot be negative", label)));
    }
    Ok(Some(amount))
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardUsers {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub email_verified: u64,
    #[serde(default)]
    pub bvn_verified: u64,
    #[serde(default)]
    pub chatbot_verified: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub deposits: u64,
    #[serde(default)]
    pub withdrawals: u64,
    #[serde(default)]
    pub swaps: u64,
    #[serde(default)]
    pub giftcards: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub failed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SwapStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub onramps: u64,
    #[serde(default)]
    pub offramps: u64,
    #[serde(default)]
    pub crypto_to_crypto: u64,
    #[serde(default)]
    pub successful: u64,
    #[serde(default)]
    pub total_volume: f64,
    #[serde(default)]
    pub total_fees: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TokenStat {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub trade_count: u64,
    #[serde(default)]
    pub sell_count: u64,
    #[serde(default)]
    pub buy_count: u64,
    #[serde(default)]
    pub total_volume: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAnalytics {
    #[serde(default)]
    pub users: DashboardUsers,
    #[serde(default)]
    pub transactions: Option<TransactionStats>,
    #[serde(default)]
    pub swap_stats: Option<SwapStats>,
    #[serde(default)]
    pub token_stats: Vec<TokenStat>,
    #[serde(default)]
    pub transaction_volume: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SwapPairStat {
    #[serde(default)]
    pub swap_pair: String,
    #[serde(default)]
    pub total_swaps: u64,
    #[serde(default)]
    pub total_volume: f64,
    #[serde(default)]
    pub avg_exchange_rate: f64,
    #[serde(default)]
    pub unique_users: u64,
}

pub struct AnalyticsService {
    client: Arc<ApiClient>,
}

impl AnalyticsService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn dashboard_analytics(&self) -> Result<DashboardAnalytics, ApiError> {
        let raw = self.client.get("/analytics/dashboard", &[]).await?;
        let data = raw.get("data").cloned().unwrap_or(Value::Null);
        Ok(serde_json::from_value(data)?)
    }

    pub async fn swap_pair_analytics(&self, timeframe: &str) -> Result<Vec<SwapPairStat>, ApiError> {
        let query = vec![("timeframe".to_string(), timeframe.to_string())];
        let raw = self.client.get("/analytics/swap-pairs", &query).await?;
        let data = raw.get("data").cloned().unwrap_or(Value::Array(Vec::new()));
        Ok(serde_json::from_value(data)?)
    }

    /// Controller for the dashboard transaction feed, using the client's
    /// configured page size and scroll threshold. Callers that need a
    /// different page size build a controller over [`TransactionSource`]
    /// directly.
    pub fn transaction_feed(&self) -> Result<CollectionController<TransactionSource>, ApiError> {
        let controller = CollectionController::new(
            TransactionSource::new(Arc::clone(&self.client)),
            self.client.default_page_size(),
        )?;
        Ok(controller.scroll_threshold_px(self.client.scroll_threshold_px()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_payload_parses_with_missing_optionals() {
        let payload: RecentTransactionsPayload = serde_json::from_value(json!({
            "success": true,
            "pagination": {
                "currentPage": 2,
                "totalPages": 5,
                "limit": 50,
                "totalCount": 230,
                "hasNextPage": true,
                "hasPreviousPage": true
            },
            "data": [
                { "id": "t1", "type": "DEPOSIT", "status": "PENDING", "currency": "BTC", "amount": 0.5, "createdAt": "2024-01-01" },
                { "id": "t2", "type": "SWAP", "status": "COMPLETED", "currency": "ETH" }
            ]
        }))
        .unwrap();

        assert_eq!(payload.data.len(), 2);
        assert_eq!(payload.pagination.current_page, 2);
        assert!(payload.pagination.has_next_page);
        assert_eq!(payload.data[1].amount, 0.0);
        assert!(payload.data[1].created_at.is_empty());
    }

    #[test]
    fn filtered_payload_splits_transactions_and_users() {
        let payload: FilteredPayload = serde_json::from_value(json!({
            "success": true,
            "filters": { "currency": "BTC" },
            "pagination": { "currentPage": 1, "totalCount": 1, "hasNextPage": false, "transactionCount": 1, "userCount": 1 },
            "aggregateStats": { "totalAmount": 12.0, "successfulCount": 1 },
            "data": {
                "transactions": [
                    { "id": "t1", "type": "DEPOSIT", "status": "SUCCESSFUL", "currency": "BTC", "amount": 12.0, "createdAt": "2024-01-01" }
                ],
                "users": [
                    { "id": "u1", "username": "ada", "email": "ada@example.com" }
                ]
            }
        }))
        .unwrap();

        assert_eq!(payload.data.transactions.len(), 1);
        assert_eq!(payload.data.users.len(), 1);
        assert_eq!(payload.aggregate_stats.total_amount, 12.0);
    }

    #[test]
    fn amount_filters_are_validated_before_any_request() {
        let mut filters = TransactionFilters::default();
        filters.min_amount = "abc".to_string();
        assert!(matches!(
            filters.clone().into_filter_set(),
            Err(ApiError::Validation(_))
        ));

        filters.min_amount = "100".to_string();
        filters.max_amount = "50".to_string();
        assert!(matches!(
            filters.clone().into_filter_set(),
            Err(ApiError::Validation(_))
        ));

        filters.max_amount = "500".to_string();
        let set = filters.into_filter_set().unwrap();
        assert_eq!(set.get("minAmount"), Some("100"));
        assert_eq!(set.get("maxAmount"), Some("500"));
    }

    #[test]
    fn inactive_filter_keys_are_never_sent() {
        let mut filters = TransactionFilters::default();
        filters.currency = "BTC".to_string();
        let set = filters.into_filter_set().unwrap();

        assert_eq!(
            set.active_query(),
            vec![("currency".to_string(), "BTC".to_string())]
        );
    }
}
