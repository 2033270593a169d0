//! Application state and request tracking.

use std::collections::HashMap;

use serde::Serialize;

use crate::favorites::FavoriteIds;
use crate::repository::{CatalogRecord, ErrorKind, RepositoryError};

/// Identifier attached to every async request, increasing per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestId(pub u64);

/// Async operation slots. Each slot tracks only its latest request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Page,
    Record,
    Search,
    Category,
    Categories,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Page => "page",
            Operation::Record => "record",
            Operation::Search => "search",
            Operation::Category => "category",
            Operation::Categories => "categories",
        }
    }
}

/// Failure carried by a rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl RequestFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<&RepositoryError> for RequestFailure {
    fn from(err: &RepositoryError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

/// Lifecycle of one async request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", content = "value", rename_all = "snake_case")]
pub enum RequestPhase<T = ()> {
    Pending,
    Fulfilled(T),
    Rejected(RequestFailure),
}

impl<T> RequestPhase<T> {
    /// Same phase with the payload dropped.
    pub fn status(&self) -> RequestPhase {
        match self {
            RequestPhase::Pending => RequestPhase::Pending,
            RequestPhase::Fulfilled(_) => RequestPhase::Fulfilled(()),
            RequestPhase::Rejected(failure) => RequestPhase::Rejected(failure.clone()),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, RequestPhase::Pending)
    }
}

/// Latest request of a slot and where it is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestSlot {
    pub latest: RequestId,
    pub status: RequestPhase,
}

/// Per-operation request bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestTracker {
    slots: HashMap<Operation, RequestSlot>,
}

impl RequestTracker {
    /// Make `request` the latest for `operation`, superseding any earlier one.
    pub fn begin(&mut self, operation: Operation, request: RequestId) {
        self.slots.insert(
            operation,
            RequestSlot {
                latest: request,
                status: RequestPhase::Pending,
            },
        );
    }

    /// True when `request` is the latest unsettled request for `operation`.
    pub fn is_current(&self, operation: Operation, request: RequestId) -> bool {
        self.slots
            .get(&operation)
            .is_some_and(|slot| slot.latest == request && slot.status.is_pending())
    }

    pub fn settle(&mut self, operation: Operation, status: RequestPhase) {
        if let Some(slot) = self.slots.get_mut(&operation) {
            slot.status = status;
        }
    }

    /// Forget the slot so that an in-flight response can no longer land.
    pub fn cancel(&mut self, operation: Operation) -> bool {
        self.slots.remove(&operation).is_some()
    }

    pub fn slot(&self, operation: Operation) -> Option<&RequestSlot> {
        self.slots.get(&operation)
    }

    /// True while any slot has an unsettled latest request.
    pub fn is_loading(&self) -> bool {
        self.slots.values().any(|slot| slot.status.is_pending())
    }
}

/// Pagination fields of the last loaded page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: u32,
    pub items_per_page: u32,
    pub total_items: u64,
}

impl PageInfo {
    pub fn new(items_per_page: u32) -> Self {
        Self {
            current_page: 1,
            items_per_page,
            total_items: 0,
        }
    }
}

/// What the filtered view currently shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordView {
    /// The loaded page itself.
    #[default]
    Page,
    /// Results of the active search.
    SearchResults { records: Vec<CatalogRecord> },
    /// Members of a category.
    Category {
        name: String,
        records: Vec<CatalogRecord>,
    },
}

/// Whole application state. Mutated only through [`super::reduce`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationState {
    pub records: Vec<CatalogRecord>,
    pub view: RecordView,
    pub selected_id: Option<u32>,
    pub search_term: String,
    pub favorites: FavoriteIds,
    pub page: PageInfo,
    pub categories: Vec<String>,
    pub error: Option<String>,
    pub last_dropped: usize,
    pub requests: RequestTracker,
}

impl ApplicationState {
    pub fn new(favorites: FavoriteIds, items_per_page: u32) -> Self {
        Self {
            records: Vec::new(),
            view: RecordView::Page,
            selected_id: None,
            search_term: String::new(),
            favorites,
            page: PageInfo::new(items_per_page),
            categories: Vec::new(),
            error: None,
            last_dropped: 0,
            requests: RequestTracker::default(),
        }
    }
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self::new(FavoriteIds::new(), 20)
    }
}
