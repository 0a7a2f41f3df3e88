//! One page of a server-side paged collection, plus the legacy query-param
//! form of pagination input.

use crate::criteria::Order;

/// An immutable batch of results returned by a single paged-query call.
///
/// Whether more batches exist is derived, not transmitted: a page shorter
/// than its requested size cannot have data after it, while a full page may
/// or may not be the last one. The streamer leans on exactly this rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<E> {
    data: Vec<E>,
    page_number: u32,
    page_size: u32,
}

impl<E> Page<E> {
    pub fn new(data: Vec<E>, page_number: u32, page_size: u32) -> Self {
        Self {
            data,
            page_number,
            page_size,
        }
    }

    /// The rows of this page, in server order.
    pub fn data(&self) -> &[E] {
        &self.data
    }

    pub fn into_data(self) -> Vec<E> {
        self.data
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// True when no page can follow this one.
    pub fn is_last(&self) -> bool {
        (self.data.len() as u32) < self.page_size
    }
}

/// Smallest page size the legacy endpoints accept.
pub const MIN_PAGE_SIZE: u32 = 10;
/// Largest page size the legacy endpoints accept.
pub const MAX_PAGE_SIZE: u32 = 100;
/// Page size used when the requested one is out of range.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Pagination input of the legacy (cursor-style) query endpoints.
///
/// An out-of-range page size, negative included, silently falls back to
/// [`DEFAULT_PAGE_SIZE`]; a bad size must never surface as a pagination
/// error to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryParams {
    page_size: u32,
    id: Option<String>,
    order: Option<Order>,
}

impl QueryParams {
    pub fn new(page_size: i32) -> Self {
        let page_size = if (MIN_PAGE_SIZE as i32..=MAX_PAGE_SIZE as i32).contains(&page_size) {
            page_size as u32
        } else {
            DEFAULT_PAGE_SIZE
        };
        Self {
            page_size,
            id: None,
            order: None,
        }
    }

    /// Resume after the entity with this identifier (opaque cursor).
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn cursor_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The query pairs sent to the paged endpoint.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("pageSize", self.page_size.to_string())];
        if let Some(id) = &self.id {
            pairs.push(("id", id.clone()));
        }
        if let Some(order) = self.order {
            pairs.push(("order", order.as_str().to_owned()));
        }
        pairs
    }
}

impl Default for QueryParams {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE as i32)
    }
}
