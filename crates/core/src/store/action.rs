//! Store actions and the reducer.

use tracing::debug;

use super::selectors;
use super::state::{ApplicationState, Operation, PageInfo, RecordView, RequestId, RequestPhase};
use crate::repository::{CatalogRecord, CategoryListing, PaginationWindow};

/// Every state mutation, by name.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    FetchPage {
        request: RequestId,
        phase: RequestPhase<PaginationWindow>,
    },
    FetchRecord {
        request: RequestId,
        phase: RequestPhase<CatalogRecord>,
    },
    Search {
        request: RequestId,
        term: String,
        phase: RequestPhase<Vec<CatalogRecord>>,
    },
    FilterByCategory {
        request: RequestId,
        phase: RequestPhase<CategoryListing>,
    },
    LoadCategories {
        request: RequestId,
        phase: RequestPhase<Vec<String>>,
    },
    SetSearchTerm(String),
    ClearSearch,
    ToggleFavorite(u32),
    AddFavorite(u32),
    RemoveFavorite(u32),
    ClearFavorites,
    SelectRecord(Option<u32>),
    SelectNext,
    SelectPrevious,
    Reset,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::FetchPage { .. } => "fetch_page",
            Action::FetchRecord { .. } => "fetch_record",
            Action::Search { .. } => "search",
            Action::FilterByCategory { .. } => "filter_by_category",
            Action::LoadCategories { .. } => "load_categories",
            Action::SetSearchTerm(_) => "set_search_term",
            Action::ClearSearch => "clear_search",
            Action::ToggleFavorite(_) => "toggle_favorite",
            Action::AddFavorite(_) => "add_favorite",
            Action::RemoveFavorite(_) => "remove_favorite",
            Action::ClearFavorites => "clear_favorites",
            Action::SelectRecord(_) => "select_record",
            Action::SelectNext => "select_next",
            Action::SelectPrevious => "select_previous",
            Action::Reset => "reset",
        }
    }
}

/// Side effect requested by the reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// The favorite set changed and must be written through.
    PersistFavorites,
    /// A response arrived for a request that is no longer the latest.
    Stale(Operation),
}

/// Apply `action` to `state`.
pub fn reduce(state: &mut ApplicationState, action: Action) -> Effect {
    match action {
        Action::FetchPage { request, phase } => {
            settle(state, Operation::Page, request, phase, page_loaded)
        }
        Action::FetchRecord { request, phase } => {
            settle(state, Operation::Record, request, phase, record_loaded)
        }
        Action::Search {
            request,
            term,
            phase,
        } => settle(state, Operation::Search, request, phase, |state, results| {
            search_settled(state, &term, results)
        }),
        Action::FilterByCategory { request, phase } => {
            settle(state, Operation::Category, request, phase, |state, listing| {
                state.last_dropped = listing.dropped;
                state.view = RecordView::Category {
                    name: listing.category,
                    records: listing.records,
                };
            })
        }
        Action::LoadCategories { request, phase } => {
            settle(state, Operation::Categories, request, phase, |state, categories| {
                state.categories = categories;
            })
        }
        Action::SetSearchTerm(term) => {
            state.search_term = term;
            Effect::None
        }
        Action::ClearSearch => {
            state.search_term.clear();
            state.view = RecordView::Page;
            if state.requests.cancel(Operation::Search) {
                debug!("Cancelled in-flight search");
            }
            Effect::None
        }
        Action::ToggleFavorite(id) => {
            state.favorites.toggle(id);
            Effect::PersistFavorites
        }
        Action::AddFavorite(id) => {
            if state.favorites.insert(id) {
                Effect::PersistFavorites
            } else {
                Effect::None
            }
        }
        Action::RemoveFavorite(id) => {
            state.favorites.remove(id);
            Effect::PersistFavorites
        }
        Action::ClearFavorites => {
            state.favorites.clear();
            Effect::PersistFavorites
        }
        Action::SelectRecord(id) => {
            let known = id.filter(|&id| selectors::record_by_id(state, id).is_some());
            state.selected_id = known;
            Effect::None
        }
        Action::SelectNext => {
            step_selection(state, 1);
            Effect::None
        }
        Action::SelectPrevious => {
            step_selection(state, -1);
            Effect::None
        }
        Action::Reset => {
            let favorites = std::mem::take(&mut state.favorites);
            *state = ApplicationState::new(favorites, state.page.items_per_page);
            Effect::None
        }
    }
}

/// Shared pending/fulfilled/rejected handling for one operation slot.
fn settle<T>(
    state: &mut ApplicationState,
    operation: Operation,
    request: RequestId,
    phase: RequestPhase<T>,
    on_fulfilled: impl FnOnce(&mut ApplicationState, T),
) -> Effect {
    if phase.is_pending() {
        state.requests.begin(operation, request);
        state.error = None;
        return Effect::None;
    }

    if !state.requests.is_current(operation, request) {
        debug!(
            "Discarding {} response for request {:?}",
            operation.as_str(),
            request
        );
        return Effect::Stale(operation);
    }

    state.requests.settle(operation, phase.status());
    match phase {
        RequestPhase::Fulfilled(value) => on_fulfilled(state, value),
        RequestPhase::Rejected(failure) => state.error = Some(failure.message),
        RequestPhase::Pending => {}
    }
    Effect::None
}

fn page_loaded(state: &mut ApplicationState, window: PaginationWindow) {
    let mut records: Vec<CatalogRecord> = Vec::with_capacity(window.items.len());
    for record in window.items {
        if !records.iter().any(|r| r.id == record.id) {
            records.push(record);
        }
    }

    state.records = records;
    state.page = PageInfo {
        current_page: window.current_page,
        items_per_page: window.items_per_page,
        total_items: window.total_items,
    };
    state.last_dropped = window.dropped;

    if state.search_term.is_empty() {
        state.view = RecordView::Page;
    }
}

fn record_loaded(state: &mut ApplicationState, record: CatalogRecord) {
    match state.records.iter_mut().find(|r| r.id == record.id) {
        Some(existing) => *existing = record,
        None => state.records.push(record),
    }

    if state.search_term.is_empty() {
        state.view = RecordView::Page;
    }
}

/// Upstream results win when non-empty; otherwise match the loaded page locally.
fn search_settled(state: &mut ApplicationState, term: &str, results: Vec<CatalogRecord>) {
    let records = if results.is_empty() {
        state
            .records
            .iter()
            .filter(|r| r.matches_term(term))
            .cloned()
            .collect()
    } else {
        results
    };

    state.view = RecordView::SearchResults { records };
}

fn step_selection(state: &mut ApplicationState, step: isize) {
    let Some(index) = selectors::selected_index(state) else {
        return;
    };

    let filtered = selectors::filtered_records(state);
    let target = index as isize + step;
    if target < 0 || target as usize >= filtered.len() {
        return;
    }

    let next = filtered[target as usize].id;
    state.selected_id = Some(next);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::ErrorKind;
    use crate::store::state::RequestFailure;
    use crate::testing::fixtures;

    fn loaded(ids: &[u32]) -> ApplicationState {
        let mut state = ApplicationState::default();
        let items = ids
            .iter()
            .map(|&id| fixtures::record(id, &format!("record-{}", id), &["normal"]))
            .collect();
        reduce(
            &mut state,
            Action::FetchPage {
                request: RequestId(1),
                phase: RequestPhase::Pending,
            },
        );
        reduce(
            &mut state,
            Action::FetchPage {
                request: RequestId(1),
                phase: RequestPhase::Fulfilled(fixtures::window(items, 60, 20, 0)),
            },
        );
        state
    }

    #[test]
    fn test_selection_walks_filtered_view() {
        let mut state = loaded(&[1, 4, 7]);

        reduce(&mut state, Action::SelectRecord(Some(4)));
        reduce(&mut state, Action::SelectNext);
        assert_eq!(state.selected_id, Some(7));

        reduce(&mut state, Action::SelectNext);
        assert_eq!(state.selected_id, Some(7));

        reduce(&mut state, Action::SelectPrevious);
        reduce(&mut state, Action::SelectPrevious);
        assert_eq!(state.selected_id, Some(1));

        reduce(&mut state, Action::SelectPrevious);
        assert_eq!(state.selected_id, Some(1));

        reduce(&mut state, Action::SelectRecord(None));
        assert_eq!(state.selected_id, None);
        reduce(&mut state, Action::SelectNext);
        assert_eq!(state.selected_id, None);
    }

    #[test]
    fn test_select_unknown_id_clears_selection() {
        let mut state = loaded(&[1, 4, 7]);
        reduce(&mut state, Action::SelectRecord(Some(4)));
        reduce(&mut state, Action::SelectRecord(Some(99)));
        assert_eq!(state.selected_id, None);
    }

    #[test]
    fn test_selection_outside_view_does_not_move() {
        let mut state = loaded(&[1, 4, 7]);
        reduce(&mut state, Action::SelectRecord(Some(1)));
        state.view = RecordView::SearchResults {
            records: vec![fixtures::record(7, "record-7", &["normal"])],
        };

        reduce(&mut state, Action::SelectNext);
        assert_eq!(state.selected_id, Some(1));
    }

    #[test]
    fn test_page_lifecycle() {
        let mut state = ApplicationState::default();
        state.error = Some("old".to_string());

        reduce(
            &mut state,
            Action::FetchPage {
                request: RequestId(1),
                phase: RequestPhase::Pending,
            },
        );
        assert!(state.requests.is_loading());
        assert_eq!(state.error, None);

        let items = vec![
            fixtures::record(1, "a", &[]),
            fixtures::record(2, "b", &[]),
            fixtures::record(1, "a", &[]),
        ];
        let effect = reduce(
            &mut state,
            Action::FetchPage {
                request: RequestId(1),
                phase: RequestPhase::Fulfilled(fixtures::window(items, 45, 20, 20).with_dropped(3)),
            },
        );

        assert_eq!(effect, Effect::None);
        assert!(!state.requests.is_loading());
        assert_eq!(state.records.len(), 2);
        assert_eq!(state.page.current_page, 2);
        assert_eq!(state.page.total_items, 45);
        assert_eq!(state.last_dropped, 3);
    }

    #[test]
    fn test_rejection_sets_error() {
        let mut state = ApplicationState::default();
        reduce(
            &mut state,
            Action::FetchPage {
                request: RequestId(1),
                phase: RequestPhase::Pending,
            },
        );
        reduce(
            &mut state,
            Action::FetchPage {
                request: RequestId(1),
                phase: RequestPhase::Rejected(RequestFailure::new(
                    ErrorKind::Network,
                    "Network error: connection refused",
                )),
            },
        );

        assert_eq!(state.error.as_deref(), Some("Network error: connection refused"));
        assert!(!state.requests.is_loading());
    }

    #[test]
    fn test_superseded_page_is_discarded() {
        let mut state = ApplicationState::default();
        for request in [RequestId(1), RequestId(2)] {
            reduce(
                &mut state,
                Action::FetchPage {
                    request,
                    phase: RequestPhase::Pending,
                },
            );
        }

        let newer = vec![fixtures::record(21, "newer", &[])];
        reduce(
            &mut state,
            Action::FetchPage {
                request: RequestId(2),
                phase: RequestPhase::Fulfilled(fixtures::window(newer, 60, 20, 20)),
            },
        );

        let older = vec![fixtures::record(1, "older", &[])];
        let effect = reduce(
            &mut state,
            Action::FetchPage {
                request: RequestId(1),
                phase: RequestPhase::Fulfilled(fixtures::window(older, 60, 20, 0)),
            },
        );

        assert_eq!(effect, Effect::Stale(Operation::Page));
        assert_eq!(state.records[0].name, "newer");
        assert_eq!(state.page.current_page, 2);
    }

    #[test]
    fn test_page_keeps_search_view() {
        let mut state = loaded(&[1, 2]);
        let found = vec![fixtures::record(150, "found", &[])];
        reduce(&mut state, Action::SetSearchTerm("found".to_string()));
        reduce(
            &mut state,
            Action::Search {
                request: RequestId(2),
                term: "found".to_string(),
                phase: RequestPhase::Pending,
            },
        );
        reduce(
            &mut state,
            Action::Search {
                request: RequestId(2),
                term: "found".to_string(),
                phase: RequestPhase::Fulfilled(found.clone()),
            },
        );
        assert_eq!(selectors::filtered_records(&state), found.as_slice());

        reduce(
            &mut state,
            Action::FetchPage {
                request: RequestId(3),
                phase: RequestPhase::Pending,
            },
        );
        reduce(
            &mut state,
            Action::FetchPage {
                request: RequestId(3),
                phase: RequestPhase::Fulfilled(fixtures::window(vec![], 60, 20, 20)),
            },
        );
        assert_eq!(selectors::filtered_records(&state), found.as_slice());
    }

    #[test]
    fn test_empty_search_falls_back_to_local_match() {
        let mut state = ApplicationState::default();
        reduce(
            &mut state,
            Action::FetchPage {
                request: RequestId(1),
                phase: RequestPhase::Pending,
            },
        );
        reduce(
            &mut state,
            Action::FetchPage {
                request: RequestId(1),
                phase: RequestPhase::Fulfilled(fixtures::window(
                    vec![
                        fixtures::record(1, "bulbasaur", &["grass", "poison"]),
                        fixtures::record(4, "charmander", &["fire"]),
                        fixtures::record(25, "pikachu", &["electric"]),
                    ],
                    3,
                    20,
                    0,
                )),
            },
        );

        for (term, expected) in [("SAUR", vec![1]), ("fire", vec![4]), ("#025", vec![25]), ("zzz", vec![])] {
            reduce(&mut state, Action::SetSearchTerm(term.to_string()));
            reduce(
                &mut state,
                Action::Search {
                    request: RequestId(2),
                    term: term.to_string(),
                    phase: RequestPhase::Pending,
                },
            );
            reduce(
                &mut state,
                Action::Search {
                    request: RequestId(2),
                    term: term.to_string(),
                    phase: RequestPhase::Fulfilled(vec![]),
                },
            );
            let ids: Vec<u32> = selectors::filtered_records(&state).iter().map(|r| r.id).collect();
            assert_eq!(ids, expected, "term {}", term);
        }
    }

    #[test]
    fn test_clear_search_cancels_in_flight_search() {
        let mut state = loaded(&[1, 2]);
        reduce(&mut state, Action::SetSearchTerm("slow".to_string()));
        reduce(
            &mut state,
            Action::Search {
                request: RequestId(5),
                term: "slow".to_string(),
                phase: RequestPhase::Pending,
            },
        );
        reduce(&mut state, Action::ClearSearch);
        assert!(!state.requests.is_loading());

        let effect = reduce(
            &mut state,
            Action::Search {
                request: RequestId(5),
                term: "slow".to_string(),
                phase: RequestPhase::Fulfilled(vec![fixtures::record(9, "late", &[])]),
            },
        );

        assert_eq!(effect, Effect::Stale(Operation::Search));
        assert_eq!(state.view, RecordView::Page);
        assert_eq!(selectors::filtered_records(&state), state.records.as_slice());
    }

    #[test]
    fn test_record_upsert() {
        let mut state = loaded(&[1, 2]);
        let mut updated = fixtures::record(2, "renamed", &[]);
        updated.description = "fresh".to_string();

        for record in [updated, fixtures::record(3, "new", &[])] {
            reduce(
                &mut state,
                Action::FetchRecord {
                    request: RequestId(9),
                    phase: RequestPhase::Pending,
                },
            );
            reduce(
                &mut state,
                Action::FetchRecord {
                    request: RequestId(9),
                    phase: RequestPhase::Fulfilled(record),
                },
            );
        }

        let names: Vec<&str> = state.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["record-1", "renamed", "new"]);
    }

    #[test]
    fn test_category_view() {
        let mut state = loaded(&[1, 2]);
        let listing = CategoryListing {
            category: "fire".to_string(),
            records: vec![fixtures::record(4, "charmander", &["fire"])],
            dropped: 1,
        };
        reduce(
            &mut state,
            Action::FilterByCategory {
                request: RequestId(3),
                phase: RequestPhase::Pending,
            },
        );
        reduce(
            &mut state,
            Action::FilterByCategory {
                request: RequestId(3),
                phase: RequestPhase::Fulfilled(listing),
            },
        );

        assert!(matches!(state.view, RecordView::Category { ref name, .. } if name == "fire"));
        assert_eq!(selectors::filtered_records(&state).len(), 1);
        assert_eq!(state.last_dropped, 1);
        assert_eq!(state.records.len(), 2);
    }

    #[test]
    fn test_favorite_effects() {
        let mut state = ApplicationState::default();

        assert_eq!(reduce(&mut state, Action::ToggleFavorite(25)), Effect::PersistFavorites);
        assert!(state.favorites.contains(25));
        assert_eq!(reduce(&mut state, Action::AddFavorite(25)), Effect::None);
        assert_eq!(reduce(&mut state, Action::ToggleFavorite(25)), Effect::PersistFavorites);
        assert!(state.favorites.is_empty());

        reduce(&mut state, Action::AddFavorite(1));
        reduce(&mut state, Action::AddFavorite(2));
        assert_eq!(reduce(&mut state, Action::RemoveFavorite(1)), Effect::PersistFavorites);
        assert_eq!(reduce(&mut state, Action::ClearFavorites), Effect::PersistFavorites);
        assert!(state.favorites.is_empty());
    }

    #[test]
    fn test_reset_keeps_favorites() {
        let mut state = loaded(&[1, 2]);
        reduce(&mut state, Action::AddFavorite(2));
        reduce(&mut state, Action::SelectRecord(Some(1)));

        reduce(&mut state, Action::Reset);

        assert!(state.records.is_empty());
        assert_eq!(state.selected_id, None);
        assert!(state.favorites.contains(2));
        assert!(!state.requests.is_loading());
    }
}
