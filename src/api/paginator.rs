//! Walks the result pages of an operation.

use crate::api::client::ApiClient;
use crate::api::operations::Operation;
use crate::api::params::Params;
use crate::api::response::XmlResponse;
use crate::error::Result;
use tracing::{debug, warn};

/// Where a paged operation keeps its page counter and totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpec {
    pub page_param: String,
    pub total_pages_path: String,
    pub total_results_path: String,
}

impl PageSpec {
    pub fn new(page_param: &str, total_pages_path: &str, total_results_path: &str) -> Self {
        Self {
            page_param: page_param.to_string(),
            total_pages_path: total_pages_path.to_string(),
            total_results_path: total_results_path.to_string(),
        }
    }

    /// `ItemSearch` result pages.
    pub fn item_search() -> Self {
        Self::new("ItemPage", "Items/TotalPages", "Items/TotalResults")
    }

    /// Customer review pages of an `ItemLookup` with the `Reviews` group.
    pub fn reviews() -> Self {
        Self::new(
            "ReviewPage",
            "Items/Item/CustomerReviews/TotalReviewPages",
            "Items/Item/CustomerReviews/TotalReviews",
        )
    }
}

/// Fetches one page per [`Paginator::next_page`] call until the last page,
/// the limit, or the first error.
pub struct Paginator<'a> {
    client: &'a ApiClient,
    operation: Operation,
    params: Params,
    spec: PageSpec,
    next: u32,
    current: u32,
    fetched: u32,
    limit: Option<u32>,
    total_pages: Option<u32>,
    total_results: Option<u64>,
    done: bool,
}

impl<'a> Paginator<'a> {
    /// Starts at the page already set in `params`, or page 1.
    ///
    /// Pages are numbered from 1; a start page of 0 or one that is not a
    /// number starts at page 1.
    pub fn new(client: &'a ApiClient, operation: Operation, params: Params, spec: PageSpec) -> Self {
        let next = match params.get(&spec.page_param) {
            None => 1,
            Some(value) => match value.trim().parse::<u32>() {
                Ok(page) => page.max(1),
                Err(_) => {
                    warn!("Ignoring invalid {} '{}', starting at page 1", spec.page_param, value);
                    1
                }
            },
        };
        Self {
            client,
            operation,
            params,
            spec,
            next,
            current: 0,
            fetched: 0,
            limit: None,
            total_pages: None,
            total_results: None,
            done: false,
        }
    }

    /// Stops after `pages` pages.
    pub fn limit(mut self, pages: u32) -> Self {
        self.limit = Some(pages);
        self
    }

    /// Last page fetched, 0 before the first one.
    pub fn current_page(&self) -> u32 {
        self.current
    }

    /// Total page count reported by the last response.
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn total_results(&self) -> Option<u64> {
        self.total_results
    }

    pub async fn next_page(&mut self) -> Option<Result<XmlResponse>> {
        if self.done || self.limit == Some(0) {
            return None;
        }

        let page = self.next;
        self.params.insert(self.spec.page_param.clone(), page);
        debug!("Fetching {} page {}", self.operation, page);

        let response = match self.client.call(self.operation, self.params.clone()).await {
            Ok(response) => response,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        self.current = page;
        self.next = page.saturating_add(1);
        self.fetched += 1;
        self.total_pages = response.text(&self.spec.total_pages_path).and_then(|t| t.parse().ok());
        self.total_results = response.text(&self.spec.total_results_path).and_then(|t| t.parse().ok());

        let last_page = self.total_pages.map_or(true, |total| page >= total);
        let limit_reached = self.limit.is_some_and(|limit| self.fetched >= limit);
        self.done = last_page || limit_reached || page == u32::MAX;

        Some(Ok(response))
    }

    /// Collects every remaining page, stopping at the first error.
    pub async fn collect_all(mut self) -> Result<Vec<XmlResponse>> {
        let mut pages = Vec::new();
        while let Some(page) = self.next_page().await {
            pages.push(page?);
        }
        Ok(pages)
    }
}
