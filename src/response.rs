use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Pagination block attached to every paginated list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current_page: i64,
    pub total_pages: i64,
    pub items_per_page: i64,
    pub total_items: i64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PaginationMeta {
    /// Derive the meta block from a requested page, the page size, and the
    /// total row count. When there are rows, `current_page` is clamped into
    /// `[1, total_pages]`.
    pub fn new(page: i64, items_per_page: i64, total_items: i64) -> Self {
        let total_pages = if items_per_page > 0 {
            (total_items + items_per_page - 1) / items_per_page
        } else {
            0
        };
        let current_page = if total_items > 0 {
            page.clamp(1, total_pages)
        } else {
            page.max(1)
        };
        Self {
            current_page,
            total_pages,
            items_per_page,
            total_items,
            has_next_page: current_page < total_pages,
            has_previous_page: current_page > 1 && total_items > 0,
        }
    }

    /// Meta for a response that arrived as a bare array: one full page.
    pub fn single_page(len: usize) -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            items_per_page: len as i64,
            total_items: len as i64,
            has_next_page: false,
            has_previous_page: false,
        }
    }
}

/// The paginated list envelope: `{ data, meta }`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, page: i64, items_per_page: i64, total_items: i64) -> Self {
        Self {
            data,
            meta: PaginationMeta::new(page, items_per_page, total_items),
        }
    }
}
