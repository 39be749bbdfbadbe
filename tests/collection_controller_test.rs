//! End-to-end tests for the collection controller against a scripted
//! in-memory source, covering filter/pagination consistency, merge
//! behavior, the in-flight guard, and stale-response handling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;

use backoffice_client::{
    ApiError, CollectionController, FetchPhase, FilterSet, PageCursor, PageResult, PagedSource,
    ScrollMetrics,
};

const PAGE_SIZE: u32 = 10;
const ITEMS_PER_PAGE: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Plain { page: u32 },
    Filtered { page: u32, query: Vec<(String, String)> },
}

struct MockInner {
    calls: Mutex<Vec<Call>>,
    total_pages: u32,
    fail_next: AtomicBool,
    /// When armed, the next fetch parks on this receiver until the test
    /// fires it, so response ordering can be controlled.
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

/// Source serving `total_pages` pages of two labelled items each. Items
/// carry the filter tag and page number so tests can assert exactly which
/// response produced the visible list.
#[derive(Clone)]
struct MockSource {
    inner: Arc<MockInner>,
}

impl MockSource {
    fn new(total_pages: u32) -> Self {
        Self {
            inner: Arc::new(MockInner {
                calls: Mutex::new(Vec::new()),
                total_pages,
                fail_next: AtomicBool::new(false),
                gate: Mutex::new(None),
            }),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.inner.calls.lock().unwrap().clone()
    }

    fn fail_next(&self) {
        self.inner.fail_next.store(true, Ordering::SeqCst);
    }

    fn arm_gate(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.inner.gate.lock().unwrap() = Some(rx);
        tx
    }

    /// Wait until `n` fetches have started. Calls are recorded before a
    /// fetch parks on the gate, so this returns while the gated fetch is
    /// still in flight.
    async fn wait_for_calls(&self, n: usize) {
        while self.calls().len() < n {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    }

    async fn respond(&self, tag: &str, page: u32) -> Result<PageResult<String>, ApiError> {
        let gate = self.inner.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if self.inner.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ApiError::Api {
                status: 500,
                message: "upstream exploded".to_string(),
            });
        }

        let items = (0..ITEMS_PER_PAGE)
            .map(|i| format!("{tag}-p{page}-i{i}"))
            .collect();
        Ok(PageResult {
            items,
            current_page: page,
            has_next_page: page < self.inner.total_pages,
            total_count: u64::from(self.inner.total_pages * ITEMS_PER_PAGE),
        })
    }
}

#[async_trait]
impl PagedSource for MockSource {
    type Item = String;

    async fn fetch_plain(&self, cursor: &PageCursor) -> Result<PageResult<String>, ApiError> {
        let page = cursor.current_page();
        self.inner.calls.lock().unwrap().push(Call::Plain { page });
        self.respond("plain", page).await
    }

    async fn fetch_filtered(
        &self,
        filters: &FilterSet,
        cursor: &PageCursor,
    ) -> Result<PageResult<String>, ApiError> {
        let page = cursor.current_page();
        self.inner.calls.lock().unwrap().push(Call::Filtered {
            page,
            query: filters.active_query(),
        });
        let tag = filters.get("searchTerm").unwrap_or("filtered").to_string();
        self.respond(&tag, page).await
    }
}

fn controller(source: &MockSource) -> CollectionController<MockSource> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    CollectionController::new(source.clone(), PAGE_SIZE).unwrap()
}

#[tokio::test]
async fn load_more_appends_in_order() {
    let source = MockSource::new(3);
    let ctl = controller(&source);

    ctl.refresh().await.unwrap();
    assert!(ctl.load_more().await.unwrap());

    let snap = ctl.snapshot().await;
    assert_eq!(
        snap.items,
        vec!["plain-p1-i0", "plain-p1-i1", "plain-p2-i0", "plain-p2-i1"]
    );
    assert_eq!(snap.current_page, 2);
    assert_eq!(snap.phase, FetchPhase::Idle);
    assert!(snap.has_next_page);
}

#[tokio::test]
async fn applying_filters_resets_to_page_one_and_replaces() {
    let source = MockSource::new(3);
    let ctl = controller(&source);

    ctl.refresh().await.unwrap();
    ctl.load_more().await.unwrap();
    assert_eq!(ctl.snapshot().await.items.len(), 4);

    ctl.set_draft("searchTerm", "acme").await;
    ctl.apply_filters().await.unwrap();

    let snap = ctl.snapshot().await;
    assert_eq!(snap.items, vec!["acme-p1-i0", "acme-p1-i1"]);
    assert_eq!(snap.current_page, 1);
    assert_eq!(
        snap.active_filters.get("searchTerm"),
        Some("acme"),
        "applied draft becomes the active set"
    );
}

#[tokio::test]
async fn draft_edits_never_fetch() {
    let source = MockSource::new(1);
    let ctl = controller(&source);

    ctl.refresh().await.unwrap();
    ctl.set_draft("searchTerm", "acme").await;
    ctl.set_draft("currency", "NGN").await;

    assert_eq!(source.calls(), vec![Call::Plain { page: 1 }]);
    assert!(!ctl.snapshot().await.active_filters.has_active());
}

#[tokio::test]
async fn routes_to_filtered_endpoint_with_only_active_params() {
    let source = MockSource::new(1);
    let ctl = controller(&source);

    ctl.set_draft("searchTerm", "acme").await;
    ctl.set_draft("transactionStatus", "").await;
    ctl.apply_filters().await.unwrap();

    let calls = source.calls();
    assert_eq!(
        calls,
        vec![Call::Filtered {
            page: 1,
            query: vec![("searchTerm".to_string(), "acme".to_string())],
        }],
        "blank values must not reach the wire"
    );
}

#[tokio::test]
async fn clearing_filters_returns_to_plain_endpoint() {
    let source = MockSource::new(1);
    let ctl = controller(&source);

    ctl.set_draft("searchTerm", "acme").await;
    ctl.apply_filters().await.unwrap();
    ctl.clear_filters().await.unwrap();

    let calls = source.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1], Call::Plain { page: 1 });
    assert_eq!(ctl.snapshot().await.items, vec!["plain-p1-i0", "plain-p1-i1"]);
}

#[tokio::test]
async fn removing_one_filter_keeps_the_rest_active() {
    let source = MockSource::new(1);
    let ctl = controller(&source);

    ctl.set_draft("searchTerm", "acme").await;
    ctl.set_draft("currency", "NGN").await;
    ctl.apply_filters().await.unwrap();
    ctl.remove_filter("searchTerm").await.unwrap();

    let calls = source.calls();
    assert_eq!(
        calls[1],
        Call::Filtered {
            page: 1,
            query: vec![("currency".to_string(), "NGN".to_string())],
        }
    );
}

#[tokio::test]
async fn concurrent_load_more_is_coalesced() {
    let source = MockSource::new(3);
    let ctl = controller(&source);
    ctl.refresh().await.unwrap();

    let release = source.arm_gate();
    let racing = ctl.clone();
    let in_flight = tokio::spawn(async move { racing.load_more().await });
    source.wait_for_calls(2).await;

    // Second request while the first page-2 fetch is parked.
    assert!(!ctl.load_more().await.unwrap());

    let _ = release.send(());
    assert!(in_flight.await.unwrap().unwrap());

    let page_two_fetches = source
        .calls()
        .iter()
        .filter(|call| matches!(call, Call::Plain { page: 2 }))
        .count();
    assert_eq!(page_two_fetches, 1, "page 2 fetched exactly once");
    assert_eq!(ctl.snapshot().await.items.len(), 4);
}

#[tokio::test]
async fn no_load_more_past_the_last_page() {
    let source = MockSource::new(1);
    let ctl = controller(&source);
    ctl.refresh().await.unwrap();

    assert!(!ctl.load_more().await.unwrap());
    assert_eq!(source.calls().len(), 1);
}

#[tokio::test]
async fn scroll_inside_threshold_loads_next_page() {
    let source = MockSource::new(2);
    let ctl = controller(&source).scroll_threshold_px(100.0);
    ctl.refresh().await.unwrap();

    let far_from_bottom = ScrollMetrics {
        scroll_top: 0.0,
        scroll_height: 2000.0,
        client_height: 600.0,
    };
    assert!(!ctl.on_scroll(far_from_bottom).await.unwrap());
    assert_eq!(source.calls().len(), 1);

    let near_bottom = ScrollMetrics {
        scroll_top: 1350.0,
        scroll_height: 2000.0,
        client_height: 600.0,
    };
    assert!(ctl.on_scroll(near_bottom).await.unwrap());
    assert_eq!(ctl.snapshot().await.items.len(), 4);
}

#[tokio::test]
async fn failed_fetch_keeps_previous_items_visible() {
    let source = MockSource::new(2);
    let ctl = controller(&source);
    ctl.refresh().await.unwrap();

    source.fail_next();
    ctl.set_draft("searchTerm", "acme").await;
    let result = ctl.apply_filters().await;
    assert!(matches!(result, Err(ApiError::Api { status: 500, .. })));

    let snap = ctl.snapshot().await;
    assert_eq!(
        snap.items,
        vec!["plain-p1-i0", "plain-p1-i1"],
        "stale list stays on screen through a failure"
    );
    assert_eq!(snap.phase, FetchPhase::Error);
    assert_eq!(snap.last_error.as_deref(), Some("upstream exploded"));

    // Explicit retry recovers.
    ctl.apply_filters().await.unwrap();
    assert_eq!(ctl.snapshot().await.phase, FetchPhase::Idle);
    assert_eq!(ctl.snapshot().await.items, vec!["acme-p1-i0", "acme-p1-i1"]);
}

#[tokio::test]
async fn slow_response_never_overwrites_a_newer_filter_set() {
    let source = MockSource::new(2);
    let ctl = controller(&source);

    let release = source.arm_gate();
    let slow_ctl = ctl.clone();
    let slow = tokio::spawn(async move {
        slow_ctl.set_draft("searchTerm", "old").await;
        slow_ctl.apply_filters().await
    });
    source.wait_for_calls(1).await;

    // A second filter change lands while the first response is parked.
    ctl.set_draft("searchTerm", "new").await;
    ctl.apply_filters().await.unwrap();
    assert_eq!(ctl.snapshot().await.items, vec!["new-p1-i0", "new-p1-i1"]);

    // Releasing the stale response must not change what is displayed.
    let _ = release.send(());
    slow.await.unwrap().unwrap();

    let snap = ctl.snapshot().await;
    assert_eq!(snap.items, vec!["new-p1-i0", "new-p1-i1"]);
    assert_eq!(snap.active_filters.get("searchTerm"), Some("new"));
}
