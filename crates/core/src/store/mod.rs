//! Application state store.
//!
//! [`CatalogStore`] owns the single [`ApplicationState`] and is the only
//! writer. Every mutation is an [`Action`] applied by [`reduce`]; async
//! operations dispatch a pending action, call the repository, then dispatch
//! the settled action tagged with the same [`RequestId`]. Settles that are no
//! longer the latest request for their slot are discarded.

mod action;
mod selectors;
mod state;

pub use action::{reduce, Action, Effect};
pub use selectors::*;
pub use state::*;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::favorites::{FavoriteIds, FavoritesPersistence};
use crate::metrics::{STALE_RESPONSES, STORE_ACTIONS};
use crate::repository::{
    CatalogRecord, CatalogRepository, CategoryListing, ErrorKind, PaginationWindow,
    RepositoryError,
};

/// Errors returned by store operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("No more pages available")]
    NoNextPage,

    #[error("No previous pages available")]
    NoPreviousPage,

    /// A newer request of the same kind was issued, or the request was cancelled.
    #[error("Request superseded by a newer {0} request")]
    Superseded(&'static str),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Owner of the application state.
pub struct CatalogStore {
    state: RwLock<ApplicationState>,
    repository: Arc<dyn CatalogRepository>,
    favorites: FavoritesPersistence,
    next_request: AtomicU64,
}

impl CatalogStore {
    /// Create a store with favorites rehydrated from `favorites`.
    pub fn new(
        repository: Arc<dyn CatalogRepository>,
        favorites: FavoritesPersistence,
        items_per_page: u32,
    ) -> Self {
        let loaded = favorites.load();
        info!("Loaded {} favorite(s)", loaded.len());

        Self {
            state: RwLock::new(ApplicationState::new(loaded, items_per_page)),
            repository,
            favorites,
            next_request: AtomicU64::new(1),
        }
    }

    /// Clone of the current state.
    pub async fn state(&self) -> ApplicationState {
        self.state.read().await.clone()
    }

    /// Current state with derived values resolved.
    pub async fn view(&self) -> StateView {
        snapshot(&*self.state.read().await)
    }

    /// Apply `action` and run its effect.
    pub async fn dispatch(&self, action: Action) -> Effect {
        STORE_ACTIONS.with_label_values(&[action.name()]).inc();

        let mut state = self.state.write().await;
        let effect = reduce(&mut state, action);

        match effect {
            Effect::PersistFavorites => {
                if let Err(e) = self.favorites.save(&state.favorites) {
                    warn!("Failed to persist favorites: {}", e);
                }
            }
            Effect::Stale(operation) => {
                STALE_RESPONSES.with_label_values(&[operation.as_str()]).inc();
            }
            Effect::None => {}
        }

        effect
    }

    fn next_request_id(&self) -> RequestId {
        RequestId(self.next_request.fetch_add(1, Ordering::Relaxed))
    }

    /// Run `call` as a tracked request: pending, then fulfilled or rejected.
    async fn track<T, Fut>(
        &self,
        call: Fut,
        action: impl Fn(RequestId, RequestPhase<T>) -> Action,
    ) -> Result<T, StoreError>
    where
        T: Clone,
        Fut: Future<Output = Result<T, RepositoryError>>,
    {
        let request = self.next_request_id();
        self.dispatch(action(request, RequestPhase::Pending)).await;

        match call.await {
            Ok(value) => {
                match self
                    .dispatch(action(request, RequestPhase::Fulfilled(value.clone())))
                    .await
                {
                    Effect::Stale(operation) => Err(StoreError::Superseded(operation.as_str())),
                    _ => Ok(value),
                }
            }
            Err(e) => {
                debug!("Request {:?} failed: {}", request, e);
                match self
                    .dispatch(action(request, RequestPhase::Rejected(RequestFailure::from(&e))))
                    .await
                {
                    Effect::Stale(operation) => Err(StoreError::Superseded(operation.as_str())),
                    _ => Err(e.into()),
                }
            }
        }
    }

    /// Reject a page request locally, without calling the repository.
    async fn reject_page(&self, error: StoreError) -> StoreError {
        let request = self.next_request_id();
        self.dispatch(Action::FetchPage {
            request,
            phase: RequestPhase::Pending,
        })
        .await;
        self.dispatch(Action::FetchPage {
            request,
            phase: RequestPhase::Rejected(RequestFailure::new(ErrorKind::Other, error.to_string())),
        })
        .await;
        error
    }

    // ------------------------------------------------------------------
    // Pages
    // ------------------------------------------------------------------

    pub async fn fetch_page(&self, limit: u32, offset: u32) -> Result<PaginationWindow, StoreError> {
        self.track(self.repository.list_page(limit, offset), |request, phase| {
            Action::FetchPage { request, phase }
        })
        .await
    }

    /// Reload the first page.
    pub async fn refresh(&self) -> Result<PaginationWindow, StoreError> {
        self.track(self.repository.refresh(), |request, phase| Action::FetchPage {
            request,
            phase,
        })
        .await
    }

    pub async fn go_to_next_page(&self) -> Result<PaginationWindow, StoreError> {
        let (available, page) = {
            let state = self.state.read().await;
            (has_next_page(&state), state.page)
        };

        if !available {
            return Err(self.reject_page(StoreError::NoNextPage).await);
        }

        match page.current_page.checked_mul(page.items_per_page) {
            Some(offset) => self.fetch_page(page.items_per_page, offset).await,
            None => Err(self.reject_page(StoreError::NoNextPage).await),
        }
    }

    pub async fn go_to_previous_page(&self) -> Result<PaginationWindow, StoreError> {
        let (available, page) = {
            let state = self.state.read().await;
            (has_previous_page(&state), state.page)
        };

        if !available {
            return Err(self.reject_page(StoreError::NoPreviousPage).await);
        }

        match (page.current_page - 2).checked_mul(page.items_per_page) {
            Some(offset) => self.fetch_page(page.items_per_page, offset).await,
            None => Err(self.reject_page(StoreError::NoPreviousPage).await),
        }
    }

    // ------------------------------------------------------------------
    // Records, search and categories
    // ------------------------------------------------------------------

    /// Fetch one record and upsert it into the loaded records.
    pub async fn fetch_record(&self, id: u32) -> Result<CatalogRecord, StoreError> {
        self.track(self.repository.get_by_id(id), |request, phase| {
            Action::FetchRecord { request, phase }
        })
        .await
    }

    /// Record `term` and run a search. A blank term clears the search instead.
    ///
    /// Returns the filtered view once the search settles.
    pub async fn set_search_term(&self, term: &str) -> Result<Vec<CatalogRecord>, StoreError> {
        self.dispatch(Action::SetSearchTerm(term.to_string())).await;

        if term.trim().is_empty() {
            return Ok(self.clear_search().await);
        }

        let term = term.to_string();
        self.track(self.repository.search(&term), |request, phase| Action::Search {
            request,
            term: term.clone(),
            phase,
        })
        .await?;

        Ok(filtered_records(&*self.state.read().await).to_vec())
    }

    /// Drop the search term, cancel any in-flight search and show the page again.
    pub async fn clear_search(&self) -> Vec<CatalogRecord> {
        self.dispatch(Action::ClearSearch).await;
        self.state.read().await.records.clone()
    }

    /// Replace the filtered view with the members of category `name`.
    pub async fn filter_by_category(&self, name: &str) -> Result<CategoryListing, StoreError> {
        self.track(self.repository.list_by_category(name), |request, phase| {
            Action::FilterByCategory { request, phase }
        })
        .await
    }

    pub async fn load_categories(&self) -> Result<Vec<String>, StoreError> {
        self.track(self.repository.list_categories(), |request, phase| {
            Action::LoadCategories { request, phase }
        })
        .await
    }

    // ------------------------------------------------------------------
    // Favorites
    // ------------------------------------------------------------------

    /// Flip membership of `id`. Returns the new membership.
    pub async fn toggle_favorite(&self, id: u32) -> bool {
        self.dispatch(Action::ToggleFavorite(id)).await;
        self.state.read().await.favorites.contains(id)
    }

    pub async fn add_favorite(&self, id: u32) -> FavoriteIds {
        self.dispatch(Action::AddFavorite(id)).await;
        self.favorite_ids().await
    }

    pub async fn remove_favorite(&self, id: u32) -> FavoriteIds {
        self.dispatch(Action::RemoveFavorite(id)).await;
        self.favorite_ids().await
    }

    pub async fn clear_favorites(&self) {
        self.dispatch(Action::ClearFavorites).await;
    }

    pub async fn favorite_ids(&self) -> FavoriteIds {
        self.state.read().await.favorites.clone()
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Select `id`, or close the selection with `None`. Returns the selection.
    pub async fn select_record(&self, id: Option<u32>) -> Option<u32> {
        self.dispatch(Action::SelectRecord(id)).await;
        self.state.read().await.selected_id
    }

    pub async fn select_next(&self) -> Option<u32> {
        self.dispatch(Action::SelectNext).await;
        self.state.read().await.selected_id
    }

    pub async fn select_previous(&self) -> Option<u32> {
        self.dispatch(Action::SelectPrevious).await;
        self.state.read().await.selected_id
    }

    /// Back to the initial state, keeping favorites. In-flight requests are dropped.
    pub async fn reset(&self) {
        self.dispatch(Action::Reset).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favorites::{KeyValueStore, MemoryKeyValueStore};
    use crate::testing::{fixtures, MockCatalogRepository, RecordedCall};

    struct Harness {
        repository: Arc<MockCatalogRepository>,
        kv: Arc<MemoryKeyValueStore>,
        store: CatalogStore,
    }

    async fn harness(catalog_size: u32) -> Harness {
        let repository = Arc::new(MockCatalogRepository::new());
        repository.set_catalog(fixtures::records(catalog_size)).await;
        let kv = Arc::new(MemoryKeyValueStore::new());
        let store = CatalogStore::new(
            Arc::clone(&repository) as Arc<dyn CatalogRepository>,
            FavoritesPersistence::new(Arc::clone(&kv) as Arc<dyn KeyValueStore>, "favorites"),
            20,
        );
        Harness {
            repository,
            kv,
            store,
        }
    }

    #[tokio::test]
    async fn test_toggle_favorite_persists_each_time() {
        let h = harness(0).await;

        assert!(h.store.toggle_favorite(25).await);
        assert_eq!(h.kv.raw("favorites").as_deref(), Some("[25]"));

        assert!(!h.store.toggle_favorite(25).await);
        assert_eq!(h.kv.raw("favorites").as_deref(), Some("[]"));
        assert!(h.store.favorite_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_favorites_rehydrate_on_startup() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        kv.set_raw("favorites", "[7,3]");
        let store = CatalogStore::new(
            Arc::new(MockCatalogRepository::new()),
            FavoritesPersistence::new(Arc::clone(&kv) as Arc<dyn KeyValueStore>, "favorites"),
            20,
        );

        let ids: Vec<u32> = store.favorite_ids().await.iter().collect();
        assert_eq!(ids, vec![7, 3]);
    }

    #[tokio::test]
    async fn test_favorite_write_failure_keeps_memory_state() {
        let h = harness(0).await;
        h.kv.fail_writes(true);

        assert!(h.store.toggle_favorite(1).await);
        assert!(h.store.favorite_ids().await.contains(1));
        assert_eq!(h.kv.raw("favorites"), None);
    }

    #[tokio::test]
    async fn test_refresh_loads_first_page() {
        let h = harness(45).await;

        let window = h.store.refresh().await.unwrap();
        assert_eq!(window.items.len(), 20);

        let view = h.store.view().await;
        assert_eq!(view.records.len(), 20);
        assert_eq!(view.filtered_records, view.records);
        assert_eq!(view.total_pages, 3);
        assert!(view.has_next_page);
        assert!(!view.has_previous_page);
        assert!(!view.loading);
        assert_eq!(h.repository.recorded_calls().await, vec![RecordedCall::Refresh]);
    }

    #[tokio::test]
    async fn test_next_and_previous_page() {
        let h = harness(45).await;
        h.store.refresh().await.unwrap();

        let window = h.store.go_to_next_page().await.unwrap();
        assert_eq!(window.current_page, 2);
        let window = h.store.go_to_next_page().await.unwrap();
        assert_eq!(window.current_page, 3);
        assert_eq!(window.items.len(), 5);

        let window = h.store.go_to_previous_page().await.unwrap();
        assert_eq!(window.current_page, 2);

        let calls = h.repository.recorded_calls().await;
        assert_eq!(
            calls[1..],
            [
                RecordedCall::ListPage { limit: 20, offset: 20 },
                RecordedCall::ListPage { limit: 20, offset: 40 },
                RecordedCall::ListPage { limit: 20, offset: 20 },
            ]
        );
    }

    #[tokio::test]
    async fn test_page_boundaries_fail_without_calling_repository() {
        let h = harness(5).await;
        h.store.refresh().await.unwrap();
        h.repository.clear_calls().await;

        assert_eq!(h.store.go_to_next_page().await.unwrap_err(), StoreError::NoNextPage);
        assert_eq!(h.store.state().await.error.as_deref(), Some("No more pages available"));

        assert_eq!(
            h.store.go_to_previous_page().await.unwrap_err(),
            StoreError::NoPreviousPage
        );
        let state = h.store.state().await;
        assert_eq!(state.error.as_deref(), Some("No previous pages available"));
        assert!(!is_loading(&state));

        assert!(h.repository.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_repository_error_lands_in_state() {
        let h = harness(10).await;
        h.repository
            .set_next_error(RepositoryError::Network("connection refused".to_string()))
            .await;

        let err = h.store.refresh().await.unwrap_err();
        assert!(matches!(err, StoreError::Repository(RepositoryError::Network(_))));

        let state = h.store.state().await;
        assert_eq!(state.error.as_deref(), Some("Network error: connection refused"));

        h.store.refresh().await.unwrap();
        assert_eq!(h.store.state().await.error, None);
    }

    #[tokio::test]
    async fn test_slow_page_does_not_overwrite_newer_page() {
        let h = harness(60).await;
        h.repository
            .delay_page(0, std::time::Duration::from_millis(150))
            .await;

        let (slow, fast) = tokio::join!(h.store.fetch_page(20, 0), async {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            h.store.fetch_page(20, 20).await
        });

        assert_eq!(slow.unwrap_err(), StoreError::Superseded("page"));
        assert_eq!(fast.unwrap().current_page, 2);

        let state = h.store.state().await;
        assert_eq!(state.page.current_page, 2);
        assert_eq!(state.records[0].id, 21);
        assert!(!is_loading(&state));
    }

    #[tokio::test]
    async fn test_empty_search_term_shows_full_page() {
        let h = harness(20).await;
        h.store.refresh().await.unwrap();

        h.repository
            .set_search_results("record-003", vec![fixtures::record(3, "record-003", &["normal"])])
            .await;
        let results = h.store.set_search_term("record-003").await.unwrap();
        assert_eq!(results.len(), 1);

        let results = h.store.set_search_term("").await.unwrap();
        let state = h.store.state().await;
        assert_eq!(results, state.records);
        assert_eq!(filtered_records(&state), state.records.as_slice());
        assert_eq!(state.search_term, "");
    }

    #[tokio::test]
    async fn test_search_falls_back_to_loaded_page() {
        let h = harness(20).await;
        h.store.refresh().await.unwrap();

        let results = h.store.set_search_term("record-01").await.unwrap();
        let ids: Vec<u32> = results.iter().map(|r| r.id).collect();
        assert_eq!(ids, (10..=19).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_clear_search_discards_late_results() {
        let h = Arc::new(harness(20).await);
        h.store.refresh().await.unwrap();
        h.repository
            .set_search_results("slow", vec![fixtures::record(99, "slow", &[])])
            .await;
        h.repository
            .delay_search("slow", std::time::Duration::from_millis(100))
            .await;

        let searching = {
            let h = Arc::clone(&h);
            tokio::spawn(async move { h.store.set_search_term("slow").await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        h.store.clear_search().await;

        let result = searching.await.unwrap();
        assert_eq!(result.unwrap_err(), StoreError::Superseded("search"));

        let state = h.store.state().await;
        assert_eq!(state.view, RecordView::Page);
        assert_eq!(state.search_term, "");
    }

    #[tokio::test]
    async fn test_fetch_record_not_found() {
        let h = harness(3).await;

        let err = h.store.fetch_record(42).await.unwrap_err();
        assert_eq!(err, StoreError::Repository(RepositoryError::NotFound(42)));
        assert_eq!(
            h.store.state().await.error.as_deref(),
            Some("Record with ID 42 not found")
        );

        let record = h.store.fetch_record(2).await.unwrap();
        assert_eq!(record.id, 2);
        assert_eq!(h.store.state().await.records.len(), 1);
    }

    #[tokio::test]
    async fn test_category_and_categories() {
        let h = harness(3).await;
        h.repository
            .set_categories(vec!["normal".to_string(), "fire".to_string()])
            .await;

        assert_eq!(h.store.load_categories().await.unwrap(), vec!["normal", "fire"]);

        let listing = h.store.filter_by_category("normal").await.unwrap();
        assert_eq!(listing.records.len(), 3);

        let view = h.store.view().await;
        assert_eq!(view.view, "category");
        assert_eq!(view.category.as_deref(), Some("normal"));
        assert_eq!(view.categories, vec!["normal", "fire"]);
    }

    #[tokio::test]
    async fn test_selection_scenario() {
        let h = harness(0).await;
        h.repository
            .set_catalog(vec![
                fixtures::record(1, "a", &[]),
                fixtures::record(4, "b", &[]),
                fixtures::record(7, "c", &[]),
            ])
            .await;
        h.store.refresh().await.unwrap();

        assert_eq!(h.store.select_record(Some(4)).await, Some(4));
        assert_eq!(h.store.select_next().await, Some(7));
        assert_eq!(h.store.select_previous().await, Some(4));
        assert_eq!(h.store.select_previous().await, Some(1));
        assert_eq!(h.store.select_previous().await, Some(1));
        assert_eq!(h.store.select_record(None).await, None);
    }

    #[tokio::test]
    async fn test_dropped_count_is_reported() {
        let h = harness(10).await;
        h.repository.set_dropped_per_page(2).await;

        h.store.refresh().await.unwrap();
        assert_eq!(h.store.view().await.last_dropped, 2);
    }

    #[tokio::test]
    async fn test_reset_keeps_favorites() {
        let h = harness(10).await;
        h.store.refresh().await.unwrap();
        h.store.toggle_favorite(3).await;

        h.store.reset().await;

        let state = h.store.state().await;
        assert!(state.records.is_empty());
        assert!(state.favorites.contains(3));
    }
}
