//! List queries and the two ways of answering them.
//!
//! `ServerPaged` forwards `page`/`limit`/`search` to the backend and reports
//! the backend's totals. `LocalSearch` fetches the whole collection once,
//! filters and sorts it in memory, and computes its own totals. The choice is
//! made by [`PaginationPolicy::select`] from a declared size threshold.

use std::collections::HashSet;
use std::num::NonZeroU32;

use serde::Serialize;
use storydesk_api_types::{Entity, ListResponse};
use tracing::warn;

use crate::application::repos::{EntityRepo, RepoError};

const MAX_DRAIN_PAGES: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn new(page: u32, limit: u32, search: Option<String>) -> Self {
        let search = search.and_then(|value| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        });
        Self {
            page: page.max(1),
            limit: limit.max(1),
            search,
        }
    }

    pub fn page(page: u32, limit: u32) -> Self {
        Self::new(page, limit, None)
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }

    pub fn offset(&self) -> usize {
        (self.page as usize)
            .saturating_sub(1)
            .saturating_mul(self.limit as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStrategy {
    ServerPaged,
    LocalSearch,
}

#[derive(Debug, Clone, Copy)]
pub struct PaginationPolicy {
    pub default_limit: NonZeroU32,
    /// Largest collection searched in memory rather than by the server.
    pub local_search_threshold: u64,
    /// Page size used when draining a whole collection.
    pub full_fetch_limit: NonZeroU32,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            default_limit: NonZeroU32::new(20).unwrap_or(NonZeroU32::MIN),
            local_search_threshold: 2_000,
            full_fetch_limit: NonZeroU32::new(200).unwrap_or(NonZeroU32::MIN),
        }
    }
}

impl PaginationPolicy {
    /// Unsearched queries always page on the server; searches run locally only
    /// when the collection is known to fit under the threshold.
    pub fn select(&self, query: &ListQuery, known_total: Option<u64>) -> QueryStrategy {
        match (query.search_term(), known_total) {
            (None, _) => QueryStrategy::ServerPaged,
            (Some(_), Some(total)) if total <= self.local_search_threshold => {
                QueryStrategy::LocalSearch
            }
            (Some(_), _) => QueryStrategy::ServerPaged,
        }
    }
}

/// One page of results with the totals the caller should display.
#[derive(Debug, Clone, Serialize)]
pub struct ListPage<E> {
    pub items: Vec<E>,
    pub page: u32,
    pub limit: u32,
    pub total: Option<u64>,
    pub total_pages: u32,
    pub strategy: QueryStrategy,
}

impl<E: Entity> ListPage<E> {
    pub fn from_server(query: &ListQuery, response: ListResponse<E>) -> Self {
        let total_pages = match (response.total_pages, response.total) {
            (Some(pages), _) => pages,
            (None, Some(total)) => pages_for(total, query.limit),
            (None, None) => u32::from(!response.items.is_empty()),
        };
        Self {
            page: response.page.unwrap_or(query.page),
            limit: query.limit,
            total: response.total,
            total_pages,
            items: response.items,
            strategy: QueryStrategy::ServerPaged,
        }
    }
}

/// Filter, sort and slice an in-memory collection.
pub fn local_search<E: Entity>(all: &[E], query: &ListQuery) -> ListPage<E> {
    let mut matching: Vec<&E> = match query.search_term() {
        Some(needle) => all.iter().filter(|item| item.matches(needle)).collect(),
        None => all.iter().collect(),
    };
    matching.sort_by_cached_key(|item| item.sort_key());

    let total = matching.len() as u64;
    let items = matching
        .into_iter()
        .skip(query.offset())
        .take(query.limit as usize)
        .cloned()
        .collect();

    ListPage {
        items,
        page: query.page,
        limit: query.limit,
        total: Some(total),
        total_pages: pages_for(total, query.limit),
        strategy: QueryStrategy::LocalSearch,
    }
}

pub fn pages_for(total: u64, limit: u32) -> u32 {
    let pages = total.div_ceil(u64::from(limit.max(1)));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Walk every server page and return the whole collection.
///
/// Rows repeated across page boundaries are dropped and logged; a response
/// without paging totals is taken to be the complete collection.
pub async fn fetch_all<E, R>(repo: &R, limit: NonZeroU32) -> Result<Vec<E>, RepoError>
where
    E: Entity,
    R: EntityRepo<E> + ?Sized,
{
    let mut items: Vec<E> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut duplicates = 0usize;
    let mut page = 1u32;

    loop {
        let response = repo.list(&ListQuery::page(page, limit.get())).await?;
        let received = response.items.len();
        let (total, total_pages) = (response.total, response.total_pages);

        for item in response.items {
            if item.id().is_empty() || seen.insert(item.id().to_string()) {
                items.push(item);
            } else {
                duplicates += 1;
            }
        }

        let done = match (total_pages, total) {
            (Some(pages), _) => page >= pages,
            (None, Some(total)) => items.len() as u64 >= total,
            (None, None) => true,
        };
        if done || received == 0 || page >= MAX_DRAIN_PAGES {
            break;
        }
        page += 1;
    }

    if duplicates > 0 {
        warn!(
            collection = E::COLLECTION,
            duplicates, "server pages overlapped; duplicate rows dropped"
        );
    }
    Ok(items)
}
