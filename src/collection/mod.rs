// Paginated/filtered collection fetching, shared by the transaction feed,
// the user list, the gift-card rate table, and the crypto-fee table.

pub mod controller;
pub mod filter;
pub mod merge;
pub mod page;

pub use controller::{CollectionController, CollectionSnapshot, FetchPhase, ScrollMetrics};
pub use filter::FilterSet;
pub use merge::{merge, MergeMode};
pub use page::{PageCursor, PageResult, ALLOWED_PAGE_SIZES};

use async_trait::async_trait;

use crate::client::ApiError;

/// A backend endpoint pair serving one paginated collection.
///
/// `fetch_plain` hits the cheap unfiltered listing; `fetch_filtered` hits
/// the search endpoint, which on some collections also computes aggregate
/// statistics. The controller picks between them based on whether any
/// filter is active, so the expensive path is only paid for when asked.
#[async_trait]
pub trait PagedSource: Send + Sync {
    type Item: Send;

    async fn fetch_plain(&self, cursor: &PageCursor) -> Result<PageResult<Self::Item>, ApiError>;

    async fn fetch_filtered(
        &self,
        filters: &FilterSet,
        cursor: &PageCursor,
    ) -> Result<PageResult<Self::Item>, ApiError>;
}
