//! Response envelopes.
//!
//! Collection endpoints answer either with a bare JSON array or with an
//! object carrying the rows under `data`, `items` or `results` plus optional
//! paging totals. Single-record endpoints answer with the record or with
//! `{ "data": record }`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawList<T>")]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: Option<u64>,
    pub total_pages: Option<u32>,
    pub page: Option<u32>,
}

impl<T> ListResponse<T> {
    pub fn from_items(items: Vec<T>) -> Self {
        Self {
            items,
            total: None,
            total_pages: None,
            page: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawList<T> {
    Bare(Vec<T>),
    Wrapped(WrappedList<T>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WrappedList<T> {
    #[serde(alias = "items", alias = "results")]
    data: Vec<T>,
    #[serde(default, alias = "totalCount", alias = "totalItems")]
    total: Option<u64>,
    #[serde(default)]
    total_pages: Option<u32>,
    #[serde(default, alias = "currentPage")]
    page: Option<u32>,
}

impl<T> From<RawList<T>> for ListResponse<T> {
    fn from(raw: RawList<T>) -> Self {
        match raw {
            RawList::Bare(items) => Self::from_items(items),
            RawList::Wrapped(list) => Self {
                items: list.data,
                total: list.total,
                total_pages: list.total_pages,
                page: list.page,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ItemResponse<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> ItemResponse<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}
