//! Page sequencing for list endpoints.
//!
//! A [`PagePlan`] hands out one [`PageRequest`] at a time and decides the
//! next one from the page just fetched. Every plan stops when a page yields
//! zero items or the page budget is spent; the pagination style decides
//! what "next" means otherwise.

use serde_json::Value;

use crate::json_path::text_at;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pagination {
    /// One document holds every item.
    Single,
    /// The body carries the absolute URL of the next page under `next`.
    NextLink,
    /// `pageIndex` / `pageSize` query parameters, `pageIndex` starting at the
    /// requested start page.
    PageIndex { page_size: u32 },
    /// A URL template with a `{page}` placeholder.
    PageTemplate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub url: String,
    pub query: Vec<(&'static str, String)>,
}

#[derive(Debug)]
pub struct PagePlan {
    pagination: Pagination,
    base_url: String,
    pending: Option<PageRequest>,
    remaining: u32,
}

impl PagePlan {
    /// `base_url` is the first page's URL, or the template for
    /// [`Pagination::PageTemplate`]. `start_page` is ignored by styles that
    /// cannot address a page directly (single documents and next links).
    #[must_use]
    pub fn new(pagination: Pagination, base_url: &str, start_page: u32, max_pages: u32) -> Self {
        let start_page = start_page.max(1);
        let first = match &pagination {
            Pagination::Single | Pagination::NextLink => PageRequest {
                page: 1,
                url: base_url.to_owned(),
                query: Vec::new(),
            },
            Pagination::PageIndex { page_size } => PageRequest {
                page: start_page,
                url: base_url.to_owned(),
                query: index_query(start_page, *page_size),
            },
            Pagination::PageTemplate => PageRequest {
                page: start_page,
                url: base_url.replace("{page}", &start_page.to_string()),
                query: Vec::new(),
            },
        };

        Self {
            pagination,
            base_url: base_url.to_owned(),
            pending: Some(first),
            remaining: max_pages,
        }
    }

    /// Next page to fetch, or `None` once the plan is finished.
    pub fn next_request(&mut self) -> Option<PageRequest> {
        if self.remaining == 0 {
            self.pending = None;
            return None;
        }
        let request = self.pending.take()?;
        self.remaining -= 1;
        Some(request)
    }

    /// Records the outcome of `fetched` and schedules its successor.
    pub fn record_page(&mut self, fetched: &PageRequest, body: &Value, item_count: usize) {
        if item_count == 0 {
            self.pending = None;
            return;
        }

        let page = fetched.page + 1;
        self.pending = match &self.pagination {
            Pagination::Single => None,
            Pagination::NextLink => text_at(body, "next")
                .filter(|next| *next != fetched.url)
                .map(|url| PageRequest {
                    page,
                    url,
                    query: Vec::new(),
                }),
            Pagination::PageIndex { page_size } => Some(PageRequest {
                page,
                url: self.base_url.clone(),
                query: index_query(page, *page_size),
            }),
            Pagination::PageTemplate => Some(PageRequest {
                page,
                url: self.base_url.replace("{page}", &page.to_string()),
                query: Vec::new(),
            }),
        };
    }
}

fn index_query(page: u32, page_size: u32) -> Vec<(&'static str, String)> {
    vec![
        ("pageIndex", page.to_string()),
        ("pageSize", page_size.to_string()),
    ]
}
