//! Mock catalog repository for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::repository::{
    CatalogRecord, CatalogRepository, CategoryListing, PaginationWindow, RepositoryError,
};

/// A recorded repository call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    ListPage { limit: u32, offset: u32 },
    GetById(u32),
    Search(String),
    ListByCategory(String),
    ListCategories,
    Refresh,
}

/// Mock implementation of the CatalogRepository trait.
///
/// Pages are sliced out of a configurable in-memory catalog, so pagination
/// behaves like the real upstream. Provides controllable behavior for testing:
/// - Canned search results and category listings
/// - Per-page and per-term delays to stage overlapping requests
/// - One-shot error injection
/// - Call recording
#[derive(Debug, Default)]
pub struct MockCatalogRepository {
    catalog: Arc<RwLock<Vec<CatalogRecord>>>,
    search_results: Arc<RwLock<HashMap<String, Vec<CatalogRecord>>>>,
    categories: Arc<RwLock<Vec<String>>>,
    page_delays: Arc<RwLock<HashMap<u32, Duration>>>,
    search_delays: Arc<RwLock<HashMap<String, Duration>>>,
    dropped_per_page: Arc<RwLock<usize>>,
    next_error: Arc<RwLock<Option<RepositoryError>>>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
}

impl MockCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole catalog.
    pub async fn set_catalog(&self, records: Vec<CatalogRecord>) {
        *self.catalog.write().await = records;
    }

    /// Results returned by `search(term)`; unknown terms return nothing.
    pub async fn set_search_results(&self, term: &str, records: Vec<CatalogRecord>) {
        self.search_results
            .write()
            .await
            .insert(term.to_string(), records);
    }

    pub async fn set_categories(&self, categories: Vec<String>) {
        *self.categories.write().await = categories;
    }

    /// Delay `list_page` calls at `offset`.
    pub async fn delay_page(&self, offset: u32, delay: Duration) {
        self.page_delays.write().await.insert(offset, delay);
    }

    /// Delay `search(term)` calls.
    pub async fn delay_search(&self, term: &str, delay: Duration) {
        self.search_delays
            .write()
            .await
            .insert(term.to_string(), delay);
    }

    /// Report `dropped` unresolvable entries with every page.
    pub async fn set_dropped_per_page(&self, dropped: usize) {
        *self.dropped_per_page.write().await = dropped;
    }

    /// Fail the next call with `error`.
    pub async fn set_next_error(&self, error: RepositoryError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    async fn record(&self, call: RecordedCall) -> Result<(), RepositoryError> {
        self.calls.write().await.push(call);
        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn page(&self, limit: u32, offset: u32) -> Result<PaginationWindow, RepositoryError> {
        if limit == 0 {
            return Err(RepositoryError::Other(
                "Page size must be greater than 0".to_string(),
            ));
        }

        let delay = self.page_delays.read().await.get(&offset).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let catalog = self.catalog.read().await;
        let items: Vec<CatalogRecord> = catalog
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        let dropped = *self.dropped_per_page.read().await;

        Ok(PaginationWindow::new(items, catalog.len() as u64, limit, offset).with_dropped(dropped))
    }
}

#[async_trait]
impl CatalogRepository for MockCatalogRepository {
    async fn list_page(&self, limit: u32, offset: u32) -> Result<PaginationWindow, RepositoryError> {
        self.record(RecordedCall::ListPage { limit, offset }).await?;
        self.page(limit, offset).await
    }

    async fn get_by_id(&self, id: u32) -> Result<CatalogRecord, RepositoryError> {
        self.record(RecordedCall::GetById(id)).await?;
        self.catalog
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn search(&self, term: &str) -> Result<Vec<CatalogRecord>, RepositoryError> {
        self.record(RecordedCall::Search(term.to_string())).await?;

        let delay = self.search_delays.read().await.get(term).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(self
            .search_results
            .read()
            .await
            .get(term)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_by_category(&self, name: &str) -> Result<CategoryListing, RepositoryError> {
        self.record(RecordedCall::ListByCategory(name.to_string()))
            .await?;

        let records = self
            .catalog
            .read()
            .await
            .iter()
            .filter(|r| r.has_category(name))
            .cloned()
            .collect();

        Ok(CategoryListing {
            category: name.to_string(),
            records,
            dropped: 0,
        })
    }

    async fn list_categories(&self) -> Result<Vec<String>, RepositoryError> {
        self.record(RecordedCall::ListCategories).await?;
        Ok(self.categories.read().await.clone())
    }

    async fn refresh(&self) -> Result<PaginationWindow, RepositoryError> {
        self.record(RecordedCall::Refresh).await?;
        self.page(20, 0).await
    }
}
