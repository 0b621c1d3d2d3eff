//! The list-fetch protocol shared by the management views: query building,
//! response-shape normalization, and the view-state machine.

use std::time::{Duration, Instant};

use serde::{Deserialize, de::DeserializeOwned};

use crate::pagination::{PageItem, page_window};
use crate::response::PaginationMeta;

use super::http::ClientError;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// Query parameters of one list fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: i64,
    pub limit: i64,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortDirection>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            search: None,
            sort_by: None,
            sort_order: None,
        }
    }
}

impl ListQuery {
    /// Apply the column-header toggle rule: the active column flips
    /// direction, a new column starts descending. Either way the query goes
    /// back to the first page.
    pub fn toggle_sort(&mut self, column: &str) {
        if self.sort_by.as_deref() == Some(column) {
            let direction = self.sort_order.unwrap_or(SortDirection::Descending);
            self.sort_order = Some(direction.flipped());
        } else {
            self.sort_by = Some(column.to_string());
            self.sort_order = Some(SortDirection::Descending);
        }
        self.page = 1;
    }

    /// Install a committed search term and return to the first page.
    pub fn set_search(&mut self, term: &str) {
        self.search = if term.is_empty() {
            None
        } else {
            Some(term.to_string())
        };
        self.page = 1;
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(search) = self.search.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.clone()));
        }
        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sortBy", sort_by.clone()));
        }
        if let Some(sort_order) = self.sort_order {
            pairs.push(("sortOrder", sort_order.as_param().to_string()));
        }
        pairs
    }
}

/// The two response shapes a list endpoint may serve. Anything else is a
/// decoding failure, surfaced as [`ClientError::UnexpectedFormat`].
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListPayload<T> {
    Paginated { data: Vec<T>, meta: PaginationMeta },
    Legacy(Vec<T>),
}

/// A normalized page of items.
#[derive(Debug)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub meta: PaginationMeta,
}

/// Normalize a raw response body into a [`ListPage`]. Bare arrays become a
/// single full page.
pub fn decode_list<T: DeserializeOwned>(
    value: serde_json::Value,
) -> Result<ListPage<T>, ClientError> {
    match serde_json::from_value::<ListPayload<T>>(value) {
        Ok(ListPayload::Paginated { data, meta }) => Ok(ListPage { items: data, meta }),
        Ok(ListPayload::Legacy(items)) => {
            let meta = PaginationMeta::single_page(items.len());
            Ok(ListPage { items, meta })
        }
        Err(_) => Err(ClientError::UnexpectedFormat),
    }
}

/// Token identifying one in-flight fetch. A response is only applied when its
/// token is still the newest one issued, so a slow response can never
/// overwrite a newer request's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// View state behind a management list.
#[derive(Debug)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub meta: Option<PaginationMeta>,
    pub error: Option<ClientError>,
    pub loading: bool,
    generation: u64,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ListState<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            meta: None,
            error: None,
            loading: false,
            generation: 0,
        }
    }

    /// Register a new fetch. Any response carrying an older token is stale
    /// and will be discarded.
    pub fn begin_fetch(&mut self) -> RequestToken {
        self.generation += 1;
        self.loading = true;
        RequestToken(self.generation)
    }

    /// Apply a fetch outcome atomically. On success the whole view state is
    /// replaced; on failure the items are emptied so stale rows are never
    /// shown next to an error banner. Returns false when the response was
    /// stale and ignored.
    pub fn apply(&mut self, token: RequestToken, outcome: Result<ListPage<T>, ClientError>) -> bool {
        if token.0 != self.generation {
            return false;
        }
        self.loading = false;
        match outcome {
            Ok(page) => {
                self.items = page.items;
                self.meta = Some(page.meta);
                self.error = None;
            }
            Err(err) => {
                self.items = Vec::new();
                self.meta = None;
                self.error = Some(err);
            }
        }
        true
    }

    pub fn current_page(&self) -> i64 {
        self.meta.as_ref().map(|m| m.current_page).unwrap_or(1)
    }

    pub fn total_pages(&self) -> i64 {
        self.meta.as_ref().map(|m| m.total_pages).unwrap_or(0)
    }

    /// Page-selector slots for the current state.
    pub fn page_items(&self) -> Vec<PageItem> {
        page_window(self.current_page(), self.total_pages())
    }
}

/// Buffers free-text search input: a term commits after 500 ms of
/// inactivity, clearing commits immediately. Every commit requires the
/// caller to reset to page 1.
#[derive(Debug)]
pub struct SearchDebounce {
    committed: String,
    pending: Option<(String, Instant)>,
}

impl Default for SearchDebounce {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchDebounce {
    pub fn new() -> Self {
        Self {
            committed: String::new(),
            pending: None,
        }
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }

    /// Record a keystroke. Returns true when the committed term changed
    /// immediately (only happens on clear).
    pub fn input(&mut self, text: &str, now: Instant) -> bool {
        if text.is_empty() {
            self.pending = None;
            if self.committed.is_empty() {
                return false;
            }
            self.committed.clear();
            return true;
        }
        self.pending = Some((text.to_string(), now + SEARCH_DEBOUNCE));
        false
    }

    /// Commit the pending term once its deadline has passed. Returns the
    /// newly committed term, if any.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = matches!(&self.pending, Some((_, deadline)) if now >= *deadline);
        if !due {
            return None;
        }
        let (text, _) = self.pending.take()?;
        if text == self.committed {
            return None;
        }
        self.committed = text.clone();
        Some(text)
    }
}
