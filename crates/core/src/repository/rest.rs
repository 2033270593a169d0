//! Repository backed by the upstream REST API through a [`Gateway`].

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::debug;

use super::{
    checked_page_for_offset, resolve_in_batches, CatalogRecord, CatalogRepository,
    CategoryListing, PaginationWindow, RepositoryError,
};
use crate::config::{FetchConfig, PathTemplates, UpstreamConfig};
use crate::gateway::Gateway;
use crate::metrics::RECORDS_DROPPED;
use crate::normalizer::{
    extract_id_from_url, parse_category, parse_detail, parse_listing, parse_species,
    NormalizeError, Normalizer, SpeciesResponse,
};

/// REST implementation of [`CatalogRepository`].
pub struct RestCatalogRepository {
    gateway: Arc<dyn Gateway>,
    paths: PathTemplates,
    fetch: FetchConfig,
    normalizer: Normalizer,
}

impl RestCatalogRepository {
    pub fn new(gateway: Arc<dyn Gateway>, upstream: &UpstreamConfig, fetch: FetchConfig) -> Self {
        Self {
            gateway,
            paths: upstream.paths.clone(),
            fetch,
            normalizer: Normalizer::new(upstream.fallback_image_url.clone()),
        }
    }

    /// Species payload for `id`, `None` on any failure.
    async fn fetch_species(&self, id: u32) -> Option<SpeciesResponse> {
        let value = match self.gateway.get(&self.paths.species(id), &[]).await {
            Ok(value) => value,
            Err(e) => {
                debug!("Species lookup for {} failed: {}", id, e);
                return None;
            }
        };

        match parse_species(value) {
            Ok(species) => Some(species),
            Err(e) => {
                debug!("Ignoring species payload for {}: {}", id, e);
                None
            }
        }
    }

    /// Detail and species for `id`, fetched concurrently and normalized.
    async fn fetch_record(&self, id: u32) -> Result<CatalogRecord, RepositoryError> {
        let detail_path = self.paths.item(&id.to_string());
        let (detail, species) = futures::join!(
            self.gateway.get(&detail_path, &[]),
            self.fetch_species(id)
        );

        let detail = match detail {
            Ok(value) => value,
            Err(e) if e.is_not_found() => return Err(RepositoryError::NotFound(id)),
            Err(e) => return Err(e.into()),
        };

        let detail = match parse_detail(detail) {
            Ok(detail) => detail,
            Err(NormalizeError::InvalidShape(_)) => return Err(RepositoryError::NotFound(id)),
            Err(e) => return Err(e.into()),
        };

        Ok(self.normalizer.to_catalog_record(&detail, species.as_ref()))
    }

    /// Exact lowercase name lookup against the detail endpoint.
    async fn fetch_record_by_name(&self, name: &str) -> Result<CatalogRecord, RepositoryError> {
        let value = self
            .gateway
            .get(&self.paths.item(&urlencoding::encode(name)), &[])
            .await?;
        let detail = parse_detail(value)?;
        let species = self.fetch_species(detail.id).await;

        Ok(self.normalizer.to_catalog_record(&detail, species.as_ref()))
    }
}

#[async_trait]
impl CatalogRepository for RestCatalogRepository {
    async fn list_page(&self, limit: u32, offset: u32) -> Result<PaginationWindow, RepositoryError> {
        if limit == 0 {
            return Err(RepositoryError::Other(
                "Page size must be greater than 0".to_string(),
            ));
        }
        if checked_page_for_offset(limit, offset).is_none() {
            return Err(RepositoryError::Other(format!(
                "Offset {} is out of range for page size {}",
                offset, limit
            )));
        }

        debug!("Listing page: limit={}, offset={}", limit, offset);

        let value = self
            .gateway
            .get(
                &self.paths.items,
                &[("limit", limit.to_string()), ("offset", offset.to_string())],
            )
            .await?;
        let listing = parse_listing(value)?;

        let mut entries = listing.results;
        entries.truncate(limit as usize);
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let mut unresolvable = 0;
        let ids: Vec<u32> = entries
            .iter()
            .filter_map(|entry| {
                let id = extract_id_from_url(&entry.url);
                if id.is_none() {
                    debug!("No id in listing entry '{}' ({})", entry.name, entry.url);
                    unresolvable += 1;
                }
                id
            })
            .collect();

        let outcome = resolve_in_batches(
            &ids,
            self.fetch.batch_size,
            self.fetch.batch_delay(),
            |id| self.fetch_record(id),
        )
        .await;

        RECORDS_DROPPED.inc_by(unresolvable as u64);
        let window = PaginationWindow::new(outcome.resolved, listing.count, limit, offset)
            .with_dropped(outcome.dropped + unresolvable);

        if window.has_next != listing.next.is_some()
            || window.has_previous != listing.previous.is_some()
        {
            debug!(
                "Upstream cursors disagree with totals (next={}, previous={}, total={})",
                listing.next.is_some(),
                listing.previous.is_some(),
                listing.count
            );
        }

        Ok(window)
    }

    async fn get_by_id(&self, id: u32) -> Result<CatalogRecord, RepositoryError> {
        if id == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        self.fetch_record(id).await
    }

    async fn search(&self, term: &str) -> Result<Vec<CatalogRecord>, RepositoryError> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        match self.fetch_record_by_name(&term).await {
            Ok(record) => return Ok(vec![record]),
            Err(e) => debug!("Exact lookup for '{}' failed: {}", term, e),
        }

        match term.parse::<u32>() {
            Ok(id) if id > 0 => match self.get_by_id(id).await {
                Ok(record) => Ok(vec![record]),
                Err(RepositoryError::NotFound(_)) => Ok(Vec::new()),
                Err(e) => Err(e),
            },
            _ => Ok(Vec::new()),
        }
    }

    async fn list_by_category(&self, name: &str) -> Result<CategoryListing, RepositoryError> {
        let name = name.trim().to_lowercase();
        let value = self
            .gateway
            .get(&self.paths.category(&urlencoding::encode(&name)), &[])
            .await?;
        let category = parse_category(value)?;

        let mut dropped = 0;
        let ids: Vec<u32> = category
            .members
            .iter()
            .take(self.fetch.category_member_cap)
            .filter_map(|member| {
                let id = extract_id_from_url(&member.item.url);
                if id.is_none() {
                    dropped += 1;
                }
                id
            })
            .collect();

        let results = join_all(ids.iter().map(|&id| self.fetch_record(id))).await;

        let mut records = Vec::with_capacity(results.len());
        for (id, result) in ids.iter().zip(results) {
            match result {
                Ok(record) => records.push(record),
                Err(e) => {
                    debug!("Dropping category member {}: {}", id, e);
                    dropped += 1;
                }
            }
        }

        RECORDS_DROPPED.inc_by(dropped as u64);

        Ok(CategoryListing {
            category: category.name,
            records,
            dropped,
        })
    }

    async fn list_categories(&self) -> Result<Vec<String>, RepositoryError> {
        let value = self
            .gateway
            .get(
                &self.paths.categories,
                &[("limit", self.fetch.category_list_limit.to_string())],
            )
            .await?;
        let listing = parse_listing(value)?;

        Ok(listing.results.into_iter().map(|r| r.name).collect())
    }

    async fn refresh(&self) -> Result<PaginationWindow, RepositoryError> {
        self.list_page(self.fetch.page_size, 0).await
    }
}
