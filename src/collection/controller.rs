use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::filter::FilterSet;
use super::merge::{merge, MergeMode};
use super::page::{PageCursor, PageResult};
use super::PagedSource;
use crate::client::ApiError;

/// Where the controller is in its fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    /// First page in flight (mount, filter change, manual refresh).
    Fetching,
    /// A "load more" page in flight.
    FetchingMore,
    /// The last fetch failed; recovery is an explicit re-apply or refresh,
    /// never automatic.
    Error,
}

/// Scroll geometry of the view's list container, in pixels.
#[derive(Debug, Clone, Copy)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    fn remaining(&self) -> f64 {
        self.scroll_height - self.scroll_top - self.client_height
    }
}

/// Read-only view of the controller for rendering.
#[derive(Debug, Clone)]
pub struct CollectionSnapshot<T> {
    pub items: Vec<T>,
    pub phase: FetchPhase,
    pub has_next_page: bool,
    pub total_count: u64,
    pub current_page: u32,
    pub active_filters: FilterSet,
    pub last_error: Option<String>,
}

struct CollectionState<T> {
    items: Vec<T>,
    draft: FilterSet,
    active: FilterSet,
    cursor: PageCursor,
    phase: FetchPhase,
    has_next_page: bool,
    total_count: u64,
    /// Bumped on every first-page fetch. A fetch that resolves with a
    /// stale generation was superseded and its result is discarded, so a
    /// slow response can never overwrite a newer list.
    generation: u64,
    last_error: Option<String>,
}

/// Owner of one view's filter, pagination, and accumulated-list state.
///
/// The invariant it maintains: the displayed items were fetched with the
/// currently active filters. Active filters change only through
/// [`apply_filters`](Self::apply_filters) /
/// [`clear_filters`](Self::clear_filters) (draft edits never fetch), and
/// every such change resets the cursor to page one, with the stale list
/// kept on screen until the replacement page arrives.
pub struct CollectionController<S: PagedSource> {
    source: Arc<S>,
    state: Arc<RwLock<CollectionState<S::Item>>>,
    scroll_threshold_px: f64,
}

impl<S: PagedSource> Clone for CollectionController<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            state: Arc::clone(&self.state),
            scroll_threshold_px: self.scroll_threshold_px,
        }
    }
}

impl<S: PagedSource> CollectionController<S> {
    /// Controller over a page-number endpoint pair.
    pub fn new(source: S, page_size: u32) -> Result<Self, ApiError> {
        Ok(Self::with_cursor(source, PageCursor::page(page_size)?))
    }

    /// Controller with an explicit cursor style, for offset/limit
    /// endpoints.
    pub fn with_cursor(source: S, cursor: PageCursor) -> Self {
        Self {
            source: Arc::new(source),
            state: Arc::new(RwLock::new(CollectionState {
                items: Vec::new(),
                draft: FilterSet::new(),
                active: FilterSet::new(),
                cursor,
                phase: FetchPhase::Idle,
                has_next_page: false,
                total_count: 0,
                generation: 0,
                last_error: None,
            })),
            scroll_threshold_px: 100.0,
        }
    }

    pub fn scroll_threshold_px(mut self, threshold: f64) -> Self {
        self.scroll_threshold_px = threshold;
        self
    }

    /// Edit the draft filter set. Never triggers a fetch and never touches
    /// the active set.
    pub async fn set_draft(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut state = self.state.write().await;
        state.draft.set(key, value);
    }

    pub async fn draft(&self) -> FilterSet {
        self.state.read().await.draft.clone()
    }

    pub async fn snapshot(&self) -> CollectionSnapshot<S::Item>
    where
        S::Item: Clone,
    {
        let state = self.state.read().await;
        CollectionSnapshot {
            items: state.items.clone(),
            phase: state.phase,
            has_next_page: state.has_next_page,
            total_count: state.total_count,
            current_page: state.cursor.current_page(),
            active_filters: state.active.clone(),
            last_error: state.last_error.clone(),
        }
    }

    /// First-page fetch under the current active filters: used on mount
    /// and for manual refresh, and as the retry path out of the error
    /// phase.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.fetch_first_page().await
    }

    /// Promote the draft filters to active and refetch from page one.
    pub async fn apply_filters(&self) -> Result<(), ApiError> {
        {
            let mut state = self.state.write().await;
            state.active = state.draft.clone();
        }
        self.fetch_first_page().await
    }

    /// Deactivate every filter and refetch from page one.
    pub async fn clear_filters(&self) -> Result<(), ApiError> {
        {
            let mut state = self.state.write().await;
            state.draft.clear();
            state.active.clear();
        }
        self.fetch_first_page().await
    }

    /// Deactivate a single filter key. Implemented as "apply with one key
    /// cleared" so it goes through exactly the same reset path as a full
    /// apply.
    pub async fn remove_filter(&self, key: &str) -> Result<(), ApiError> {
        {
            let mut state = self.state.write().await;
            state.draft.clear_key(key);
        }
        self.apply_filters().await
    }

    /// Fetch the next page and append it. Returns `Ok(false)` without
    /// issuing a request when there is no next page or a fetch is already
    /// in flight.
    pub async fn load_more(&self) -> Result<bool, ApiError> {
        let (filters, cursor, generation) = {
            let mut state = self.state.write().await;
            if state.phase != FetchPhase::Idle || !state.has_next_page {
                return Ok(false);
            }
            state.phase = FetchPhase::FetchingMore;
            (state.active.clone(), state.cursor.advanced(), state.generation)
        };

        debug!(page = cursor.current_page(), "Loading next collection page");
        let fetched = self.route_fetch(&filters, &cursor).await;

        let mut state = self.state.write().await;
        if state.generation != generation {
            // Filters changed while this page was in flight; its result
            // belongs to the old filter set.
            debug!("Discarding load-more result from a superseded filter set");
            return Ok(false);
        }

        match fetched {
            Ok(page) => {
                state.has_next_page = page.has_next_page;
                state.total_count = page.total_count;
                let mode = MergeMode::for_page(page.current_page);
                let previous = std::mem::take(&mut state.items);
                state.items = merge(previous, page, mode);
                state.cursor = cursor;
                state.phase = FetchPhase::Idle;
                state.last_error = None;
                Ok(true)
            }
            Err(error) => {
                warn!("Load-more fetch failed: {}", error);
                state.phase = FetchPhase::Error;
                state.last_error = Some(error.user_message());
                Err(error)
            }
        }
    }

    /// Feed scroll geometry from the list container; loads the next page
    /// once the remaining distance to the bottom edge drops inside the
    /// threshold. The in-flight guard in [`load_more`](Self::load_more)
    /// keeps repeated scroll events from stacking requests.
    pub async fn on_scroll(&self, metrics: ScrollMetrics) -> Result<bool, ApiError> {
        if metrics.remaining() <= self.scroll_threshold_px {
            self.load_more().await
        } else {
            Ok(false)
        }
    }

    async fn fetch_first_page(&self) -> Result<(), ApiError> {
        let (filters, cursor, generation) = {
            let mut state = self.state.write().await;
            state.cursor.reset();
            state.generation += 1;
            state.phase = FetchPhase::Fetching;
            (state.active.clone(), state.cursor.clone(), state.generation)
        };

        debug!(
            active_filters = filters.active_count(),
            "Fetching first collection page"
        );
        let fetched = self.route_fetch(&filters, &cursor).await;

        let mut state = self.state.write().await;
        if state.generation != generation {
            // A newer first-page fetch started while this one was in
            // flight; last request to start wins.
            debug!("Discarding superseded first-page result");
            return Ok(());
        }

        match fetched {
            Ok(page) => {
                state.has_next_page = page.has_next_page;
                state.total_count = page.total_count;
                let mode = MergeMode::for_page(page.current_page);
                let previous = std::mem::take(&mut state.items);
                state.items = merge(previous, page, mode);
                state.phase = FetchPhase::Idle;
                state.last_error = None;
                Ok(())
            }
            Err(error) => {
                // The stale list stays on screen; only the phase flips.
                warn!("First-page fetch failed: {}", error);
                state.phase = FetchPhase::Error;
                state.last_error = Some(error.user_message());
                Err(error)
            }
        }
    }

    async fn route_fetch(
        &self,
        filters: &FilterSet,
        cursor: &PageCursor,
    ) -> Result<PageResult<S::Item>, ApiError> {
        if filters.has_active() {
            self.source.fetch_filtered(filters, cursor).await
        } else {
            self.source.fetch_plain(cursor).await
        }
    }
}
