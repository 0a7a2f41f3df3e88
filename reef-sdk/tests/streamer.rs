//! Fetch-counting tests for the pagination streamer: laziness, ordering,
//! backpressure and failure propagation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use thiserror::Error;

use reef_sdk::criteria::{MosaicSearchCriteria, SearchCriteria};
use reef_sdk::page::Page;
use reef_sdk::streamer::{PaginationStreamer, Searcher};

#[derive(Debug, Error)]
#[error("backend unavailable")]
struct BackendError;

/// Serves `rows` in slices, counting every page fetch. Pages past
/// `fail_at_page` (when set) error instead.
struct PagedBackend {
    rows: Vec<u32>,
    fetches: AtomicUsize,
    fail_at_page: Option<u32>,
}

impl PagedBackend {
    fn new(row_count: u32) -> Arc<Self> {
        Arc::new(Self {
            rows: (0..row_count).collect(),
            fetches: AtomicUsize::new(0),
            fail_at_page: None,
        })
    }

    fn failing_at(row_count: u32, fail_at_page: u32) -> Arc<Self> {
        Arc::new(Self {
            rows: (0..row_count).collect(),
            fetches: AtomicUsize::new(0),
            fail_at_page: Some(fail_at_page),
        })
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Searcher for PagedBackend {
    type Entity = u32;
    type Criteria = MosaicSearchCriteria;
    type Error = BackendError;

    async fn search(
        &self,
        criteria: MosaicSearchCriteria,
    ) -> Result<Page<u32>, BackendError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let page_number = criteria.page_number().unwrap_or(1);
        if self.fail_at_page == Some(page_number) {
            return Err(BackendError);
        }
        // The server-side default applies when the criteria leaves the
        // page size absent.
        let page_size = criteria.paging().page_size.unwrap_or(20) as usize;
        let start = (page_number as usize - 1) * page_size;
        let data: Vec<u32> = self
            .rows
            .iter()
            .skip(start)
            .take(page_size)
            .copied()
            .collect();
        Ok(Page::new(data, page_number, page_size as u32))
    }
}

fn criteria_with_page_size(page_size: u32) -> MosaicSearchCriteria {
    MosaicSearchCriteria::default().with_page_size(page_size)
}

#[tokio::test]
async fn yields_every_row_across_pages_in_order() {
    let backend = PagedBackend::new(110);
    let streamer = PaginationStreamer::new(Arc::clone(&backend));

    let rows: Vec<u32> = streamer
        .search(criteria_with_page_size(20))
        .map(|item| item.expect("no fetch fails"))
        .collect()
        .await;

    assert_eq!(rows, (0..110).collect::<Vec<u32>>());
    // Pages of 20,20,20,20,20,10: the short sixth page ends the stream.
    assert_eq!(backend.fetches(), 6);
}

#[tokio::test]
async fn a_single_short_page_costs_one_fetch() {
    let backend = PagedBackend::new(19);
    let streamer = PaginationStreamer::new(Arc::clone(&backend));

    let rows: Vec<u32> = streamer
        .search(criteria_with_page_size(20))
        .map(|item| item.expect("no fetch fails"))
        .collect()
        .await;

    assert_eq!(rows.len(), 19);
    assert_eq!(backend.fetches(), 1);
}

#[tokio::test]
async fn a_limited_consumer_stops_fetching_mid_collection() {
    let backend = PagedBackend::new(110);
    let streamer = PaginationStreamer::new(Arc::clone(&backend));

    let rows: Vec<u32> = streamer
        .search(criteria_with_page_size(20))
        .take(30)
        .map(|item| item.expect("no fetch fails"))
        .collect()
        .await;

    assert_eq!(rows, (0..30).collect::<Vec<u32>>());
    assert_eq!(backend.fetches(), 2, "30 rows at page size 20 is two pages");
}

#[tokio::test]
async fn a_limit_on_a_page_boundary_does_not_prefetch() {
    let backend = PagedBackend::new(110);
    let streamer = PaginationStreamer::new(Arc::clone(&backend));

    let rows: Vec<u32> = streamer
        .search(criteria_with_page_size(20))
        .take(40)
        .map(|item| item.expect("no fetch fails"))
        .collect()
        .await;

    assert_eq!(rows, (0..40).collect::<Vec<u32>>());
    assert_eq!(backend.fetches(), 2);
}

#[tokio::test]
async fn dropping_the_stream_stops_all_fetching() {
    let backend = PagedBackend::new(110);
    let streamer = PaginationStreamer::new(Arc::clone(&backend));

    {
        let mut stream = Box::pin(streamer.search(criteria_with_page_size(20)));
        let first = stream.next().await.expect("one row").expect("no error");
        assert_eq!(first, 0);
    }

    assert_eq!(backend.fetches(), 1);
}

#[tokio::test]
async fn a_failed_fetch_ends_the_stream_with_the_error() {
    let backend = PagedBackend::failing_at(110, 3);
    let streamer = PaginationStreamer::new(Arc::clone(&backend));

    let items: Vec<Result<u32, _>> = streamer.search(criteria_with_page_size(20)).collect().await;

    // Two full pages, then the failure, then nothing.
    assert_eq!(items.len(), 41);
    assert!(items[..40].iter().all(Result::is_ok));
    let error = items[40].as_ref().expect_err("third fetch fails");
    assert!(error.criteria().contains("page_number: Some(3)"));
    assert_eq!(backend.fetches(), 3);
}

#[tokio::test]
async fn resumes_from_the_criteria_page_number() {
    let backend = PagedBackend::new(110);
    let streamer = PaginationStreamer::new(Arc::clone(&backend));

    let rows: Vec<u32> = streamer
        .search(criteria_with_page_size(20).with_page_number(5))
        .map(|item| item.expect("no fetch fails"))
        .collect()
        .await;

    assert_eq!(rows, (80..110).collect::<Vec<u32>>());
    assert_eq!(backend.fetches(), 2);
}

#[tokio::test]
async fn independent_searches_share_no_state() {
    let backend = PagedBackend::new(40);
    let streamer = PaginationStreamer::new(Arc::clone(&backend));

    let (a, b): (Vec<_>, Vec<_>) = tokio::join!(
        streamer
            .search(criteria_with_page_size(20))
            .map(|item| item.expect("no fetch fails"))
            .collect::<Vec<u32>>(),
        streamer
            .search(criteria_with_page_size(20))
            .map(|item| item.expect("no fetch fails"))
            .collect::<Vec<u32>>(),
    );

    assert_eq!(a, (0..40).collect::<Vec<u32>>());
    assert_eq!(b, a);
    assert_eq!(backend.fetches(), 6, "three sequential fetches per stream");
}
