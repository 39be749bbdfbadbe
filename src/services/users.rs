//! User management and funding/wallet operations.
//!
//! The user list uses the offset-style variant of the collection pattern:
//! one endpoint serves both plain and filtered listings, pagination is a
//! skip/limit pair, and the response reports `hasMore`/`total` instead of
//! the page-number shape the analytics endpoints use.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::client::{ApiClient, ApiError};
use crate::collection::{
    CollectionController, FilterSet, PageCursor, PageResult, PagedSource,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub phonenumber: String,
    #[serde(default)]
    pub kyc_level: u32,
    #[serde(default)]
    pub kyc_status: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub bvn_verified: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub ngnb_balance: f64,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct OffsetPagination {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    limit: u32,
    #[serde(default)]
    skip: u64,
    #[serde(rename = "hasMore", default)]
    has_more: bool,
}

#[derive(Debug, Deserialize, Default)]
struct UsersData {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    pagination: OffsetPagination,
}

#[derive(Debug, Deserialize)]
struct UsersPayload {
    #[serde(default)]
    data: UsersData,
}

fn page_from_offset(pagination: &OffsetPagination, cursor: &PageCursor) -> u32 {
    if pagination.limit > 0 {
        (pagination.skip / u64::from(pagination.limit)) as u32 + 1
    } else {
        cursor.current_page()
    }
}

/// Endpoint adapter for the user list. Plain and filtered listings hit the
/// same path; the filter keys (`q`, `kycLevel`, `emailVerified`) just ride
/// along as extra query parameters when active.
pub struct UserSource {
    client: Arc<ApiClient>,
}

impl UserSource {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    async fn fetch(
        &self,
        query: Vec<(String, String)>,
        cursor: &PageCursor,
    ) -> Result<PageResult<User>, ApiError> {
        let raw = self.client.get("/usermanagement/users", &query).await?;
        let payload: UsersPayload = serde_json::from_value(raw)?;

        Ok(PageResult {
            current_page: page_from_offset(&payload.data.pagination, cursor),
            has_next_page: payload.data.pagination.has_more,
            total_count: payload.data.pagination.total,
            items: payload.data.users,
        })
    }
}

#[async_trait]
impl PagedSource for UserSource {
    type Item = User;

    async fn fetch_plain(&self, cursor: &PageCursor) -> Result<PageResult<User>, ApiError> {
        self.fetch(cursor.query_pairs(), cursor).await
    }

    async fn fetch_filtered(
        &self,
        filters: &FilterSet,
        cursor: &PageCursor,
    ) -> Result<PageResult<User>, ApiError> {
        let mut query = filters.active_query();
        query.extend(cursor.query_pairs());
        self.fetch(query, cursor).await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UsersSummary {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub email_verified: u64,
    #[serde(default)]
    pub bvn_verified: u64,
}

/// Outcome of a manual balance credit.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FundingResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub new_balance: f64,
    #[serde(default)]
    pub total_portfolio_balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
}

pub struct UserService {
    client: Arc<ApiClient>,
}

impl UserService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Controller for the user list, driven by an offset/limit cursor at
    /// the client's configured page size.
    pub fn user_list(&self) -> Result<CollectionController<UserSource>, ApiError> {
        let cursor = PageCursor::offset(self.client.default_page_size())?;
        let controller =
            CollectionController::with_cursor(UserSource::new(Arc::clone(&self.client)), cursor);
        Ok(controller.scroll_threshold_px(self.client.scroll_threshold_px()))
    }

    pub async fn users_summary(&self) -> Result<UsersSummary, ApiError> {
        let raw = self
            .client
            .get("/usermanagement/users/summary", &[])
            .await?;
        let data = raw.get("data").cloned().unwrap_or(Value::Null);
        Ok(serde_json::from_value(data)?)
    }

    pub async fn delete_user(&self, email: &str) -> Result<(), ApiError> {
        self.client
            .delete("/deleteuser/user", &json!({ "email": email }))
            .await?;
        Ok(())
    }

    /// Credit a user's balance manually.
    pub async fn fund_user(
        &self,
        email: &str,
        amount: f64,
        currency: &str,
    ) -> Result<FundingResult, ApiError> {
        let raw = self
            .client
            .post(
                "/fund/fund-user",
                &json!({ "email": email, "amount": amount, "currency": currency }),
            )
            .await?;
        Ok(serde_json::from_value(raw)?)
    }

    pub async fn disable_two_fa(&self, email: &str) -> Result<(), ApiError> {
        self.client
            .patch("/2FA-Disable/disable-2fa", &json!({ "email": email }))
            .await?;
        Ok(())
    }

    pub async fn remove_password_pin(&self, email: &str) -> Result<(), ApiError> {
        self.client
            .patch("/delete-pin/remove-passwordpin", &json!({ "email": email }))
            .await?;
        Ok(())
    }

    pub async fn fetch_user_wallets(
        &self,
        email: &str,
        tokens: &[String],
    ) -> Result<Vec<WalletRecord>, ApiError> {
        let raw = self
            .client
            .post(
                "/fetch-wallet/wallets/fetch",
                &json!({ "email": email, "tokens": tokens }),
            )
            .await?;
        let data = raw
            .get("data")
            .and_then(|data| data.get("wallets"))
            .cloned()
            .unwrap_or(Value::Array(Vec::new()));
        Ok(serde_json::from_value(data)?)
    }

    pub async fn wipe_pending_balance(&self, email: &str, currency: &str) -> Result<(), ApiError> {
        self.client
            .post(
                "/pending/wipe",
                &json!({ "email": email, "currency": currency }),
            )
            .await?;
        Ok(())
    }

    pub async fn generate_wallets_by_phone(
        &self,
        phonenumber: &str,
        force: bool,
    ) -> Result<Value, ApiError> {
        self.client
            .post(
                "/updateuseraddress/generate-wallets-by-phone",
                &json!({ "phonenumber": phonenumber, "force": force }),
            )
            .await
    }

    pub async fn regenerate_wallets_by_phone(
        &self,
        phonenumber: &str,
        tokens: &[String],
        force: bool,
    ) -> Result<Value, ApiError> {
        self.client
            .patch(
                "/updateuseraddress/regenerate-by-phone",
                &json!({ "phonenumber": phonenumber, "tokens": tokens, "force": force }),
            )
            .await
    }

    pub async fn wallet_status_by_phone(&self, phonenumber: &str) -> Result<Value, ApiError> {
        let query = vec![("phonenumber".to_string(), phonenumber.to_string())];
        self.client
            .get("/updateuseraddress/status-by-phone", &query)
            .await
    }
}
