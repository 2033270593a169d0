//! Derived values over an [`ApplicationState`] snapshot.
//!
//! Nothing here is stored; every value is recomputed from the state it is
//! given.

use std::collections::BTreeSet;

use serde::Serialize;

use super::state::{ApplicationState, PageInfo, RecordView};
use crate::favorites::FavoriteIds;
use crate::repository::{total_pages as pages_for, CatalogRecord};

/// Records currently shown: the page, the search results or a category.
pub fn filtered_records(state: &ApplicationState) -> &[CatalogRecord] {
    match &state.view {
        RecordView::Page => &state.records,
        RecordView::SearchResults { records } => records,
        RecordView::Category { records, .. } => records,
    }
}

/// Record by id among loaded records, then the filtered view.
pub fn record_by_id(state: &ApplicationState, id: u32) -> Option<&CatalogRecord> {
    state
        .records
        .iter()
        .chain(filtered_records(state))
        .find(|r| r.id == id)
}

pub fn selected_record(state: &ApplicationState) -> Option<&CatalogRecord> {
    state.selected_id.and_then(|id| record_by_id(state, id))
}

/// Position of the selection within the filtered view.
pub fn selected_index(state: &ApplicationState) -> Option<usize> {
    let id = state.selected_id?;
    filtered_records(state).iter().position(|r| r.id == id)
}

pub fn can_navigate_next(state: &ApplicationState) -> bool {
    selected_index(state).is_some_and(|index| index + 1 < filtered_records(state).len())
}

pub fn can_navigate_previous(state: &ApplicationState) -> bool {
    selected_index(state).is_some_and(|index| index > 0)
}

pub fn total_pages(state: &ApplicationState) -> u32 {
    pages_for(state.page.total_items, state.page.items_per_page)
}

pub fn has_next_page(state: &ApplicationState) -> bool {
    state.page.current_page < total_pages(state)
}

pub fn has_previous_page(state: &ApplicationState) -> bool {
    state.page.current_page > 1
}

pub fn is_loading(state: &ApplicationState) -> bool {
    state.requests.is_loading()
}

pub fn is_favorite(state: &ApplicationState, id: u32) -> bool {
    state.favorites.contains(id)
}

/// Loaded records that are favorites, in page order.
pub fn favorite_records(state: &ApplicationState) -> Vec<&CatalogRecord> {
    state
        .records
        .iter()
        .filter(|r| state.favorites.contains(r.id))
        .collect()
}

pub fn favorites_count(state: &ApplicationState) -> usize {
    state.favorites.len()
}

/// Loaded records tagged with `category`.
pub fn records_in_category<'a>(state: &'a ApplicationState, category: &str) -> Vec<&'a CatalogRecord> {
    state
        .records
        .iter()
        .filter(|r| r.has_category(category))
        .collect()
}

/// Count of loaded records and their distinct categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub total: usize,
    pub categories: Vec<String>,
}

pub fn catalog_summary(state: &ApplicationState) -> CatalogSummary {
    let categories: BTreeSet<&str> = state
        .records
        .iter()
        .flat_map(|r| r.categories.iter().map(String::as_str))
        .collect();

    CatalogSummary {
        total: state.records.len(),
        categories: categories.into_iter().map(str::to_string).collect(),
    }
}

/// Serializable snapshot with every derived value resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateView {
    pub records: Vec<CatalogRecord>,
    pub filtered_records: Vec<CatalogRecord>,
    pub view: &'static str,
    pub category: Option<String>,
    pub selected_id: Option<u32>,
    pub search_term: String,
    pub favorites: FavoriteIds,
    #[serde(flatten)]
    pub page: PageInfo,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub can_navigate_next: bool,
    pub can_navigate_previous: bool,
    pub categories: Vec<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_dropped: usize,
}

pub fn snapshot(state: &ApplicationState) -> StateView {
    let (view, category) = match &state.view {
        RecordView::Page => ("page", None),
        RecordView::SearchResults { .. } => ("search_results", None),
        RecordView::Category { name, .. } => ("category", Some(name.clone())),
    };

    StateView {
        records: state.records.clone(),
        filtered_records: filtered_records(state).to_vec(),
        view,
        category,
        selected_id: state.selected_id,
        search_term: state.search_term.clone(),
        favorites: state.favorites.clone(),
        page: state.page,
        total_pages: total_pages(state),
        has_next_page: has_next_page(state),
        has_previous_page: has_previous_page(state),
        can_navigate_next: can_navigate_next(state),
        can_navigate_previous: can_navigate_previous(state),
        categories: state.categories.clone(),
        loading: is_loading(state),
        error: state.error.clone(),
        last_dropped: state.last_dropped,
    }
}
