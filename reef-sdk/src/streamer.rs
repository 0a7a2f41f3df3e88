//! # Pagination Streamer
//!
//! Presents an arbitrarily large server-side paged collection as one lazy
//! stream of entities, fetching only as many pages as the consumer actually
//! polls for.
//!
//! The streamer is transport-agnostic: it drives an externally supplied
//! [`Searcher`] (a single-page async fetch) and never builds requests
//! itself. Fetches within one stream are strictly sequential, because each
//! page's shortness decides whether another fetch happens at all; separate
//! `search` calls are fully independent and may run concurrently.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, Stream, TryStreamExt};

use crate::criteria::SearchCriteria;
use crate::error::PageFetchError;
use crate::page::Page;

/// A single-page fetch over some repository transport.
///
/// Implementations must be idempotent per criteria value: the streamer calls
/// `search` once per page with a clone of the original criteria whose
/// `page_number` is the only difference.
#[async_trait]
pub trait Searcher: Send + Sync {
    type Entity: Send;
    type Criteria: SearchCriteria;
    type Error: std::error::Error + Send + Sync + 'static;

    async fn search(
        &self,
        criteria: Self::Criteria,
    ) -> Result<Page<Self::Entity>, Self::Error>;
}

/// Flattens the pages produced by a [`Searcher`] into one entity stream.
pub struct PaginationStreamer<S> {
    searcher: Arc<S>,
}

impl<S> Clone for PaginationStreamer<S> {
    fn clone(&self) -> Self {
        Self {
            searcher: Arc::clone(&self.searcher),
        }
    }
}

impl<S> PaginationStreamer<S>
where
    S: Searcher + 'static,
    S::Entity: 'static,
    S::Criteria: 'static,
{
    pub fn new(searcher: Arc<S>) -> Self {
        Self { searcher }
    }

    /// Streams every entity matching `criteria`, page by page, starting from
    /// `criteria.page_number` (or 1 when absent).
    ///
    /// The stream is lazy end to end: the next page is fetched only once the
    /// previous one has been fully consumed, so a consumer that stops
    /// polling — mid-page included — causes no further fetch. A failed fetch
    /// ends the stream with a [`PageFetchError`]; no retry is attempted.
    pub fn search(
        &self,
        criteria: S::Criteria,
    ) -> impl Stream<Item = Result<S::Entity, PageFetchError>> + Send {
        let searcher = Arc::clone(&self.searcher);
        let first_page = criteria.page_number().unwrap_or(1);
        stream::try_unfold(
            Some(criteria.with_page_number(first_page)),
            move |state| {
                let searcher = Arc::clone(&searcher);
                async move {
                    let Some(criteria) = state else {
                        return Ok(None);
                    };
                    let page = searcher
                        .search(criteria.clone())
                        .await
                        .map_err(|source| PageFetchError::new(&criteria, source))?;
                    tracing::trace!(
                        page_number = page.page_number(),
                        rows = page.data().len(),
                        is_last = page.is_last(),
                        "fetched page"
                    );
                    let next = if page.is_last() {
                        None
                    } else {
                        let current = criteria.page_number().unwrap_or(first_page);
                        Some(criteria.with_page_number(current + 1))
                    };
                    let rows =
                        stream::iter(page.into_data().into_iter().map(Ok::<_, PageFetchError>));
                    Ok(Some((rows, next)))
                }
            },
        )
        .try_flatten()
    }
}
