//! Catalog repository.
//!
//! The single translation boundary between the upstream data source and the
//! rest of the application: nothing above it ever sees a raw gateway or
//! decode failure, only a [`RepositoryError`].

mod batch;
mod rest;
mod types;

pub use batch::{resolve_in_batches, BatchOutcome};
pub use rest::RestCatalogRepository;
pub use types::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gateway::GatewayError;
use crate::normalizer::NormalizeError;

/// Errors surfaced by the repository.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// Transport or connectivity failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Malformed or unexpected payload.
    #[error("Data parsing error: {0}")]
    DataParsing(String),

    /// The requested id does not exist upstream.
    #[error("Record with ID {0} not found")]
    NotFound(u32),

    /// Anything else (invalid arguments and the like).
    #[error("{0}")]
    Other(String),
}

/// Discriminant of [`RepositoryError`], carried into store state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    DataParsing,
    NotFound,
    Other,
}

impl RepositoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::Network(_) => ErrorKind::Network,
            RepositoryError::DataParsing(_) => ErrorKind::DataParsing,
            RepositoryError::NotFound(_) => ErrorKind::NotFound,
            RepositoryError::Other(_) => ErrorKind::Other,
        }
    }
}

impl From<GatewayError> for RepositoryError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Transport { .. } => RepositoryError::Network(err.to_string()),
            GatewayError::Decode(_) => RepositoryError::DataParsing(err.to_string()),
        }
    }
}

impl From<NormalizeError> for RepositoryError {
    fn from(err: NormalizeError) -> Self {
        RepositoryError::DataParsing(err.to_string())
    }
}

/// Query contract over the catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Fetch one listing page and resolve every entry to a full record.
    ///
    /// Records are ordered by name within the page.
    async fn list_page(&self, limit: u32, offset: u32) -> Result<PaginationWindow, RepositoryError>;

    /// Fetch a single record (detail and species concurrently).
    async fn get_by_id(&self, id: u32) -> Result<CatalogRecord, RepositoryError>;

    /// Exact-name lookup, then id lookup. Empty when neither matches.
    async fn search(&self, term: &str) -> Result<Vec<CatalogRecord>, RepositoryError>;

    /// Resolve the first members of a category.
    async fn list_by_category(&self, name: &str) -> Result<CategoryListing, RepositoryError>;

    /// Names of every category.
    async fn list_categories(&self) -> Result<Vec<String>, RepositoryError>;

    /// First page at the default page size.
    async fn refresh(&self) -> Result<PaginationWindow, RepositoryError>;
}
