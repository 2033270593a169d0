//! Canonical record types handed out by the repository.

use serde::{Deserialize, Serialize};

/// A normalized catalog record.
///
/// Built once by the normalizer and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    /// Positive upstream id.
    pub id: u32,
    pub name: String,
    /// Resolved artwork URL, never empty.
    pub image_url: String,
    /// Categories in upstream declaration order.
    pub categories: Vec<String>,
    /// `#NNN`, zero padded to at least three digits.
    pub display_number: String,
    pub weight_kg: f64,
    pub height_m: f64,
    /// Visible traits, hidden ones are filtered out.
    pub traits: Vec<String>,
    /// Single-line description.
    pub description: String,
    pub stats: RecordStats,
}

impl CatalogRecord {
    /// Case-insensitive substring match against name, display number and categories.
    pub fn matches_term(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.display_number.contains(term)
            || self
                .categories
                .iter()
                .any(|c| c.to_lowercase().contains(&needle))
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

/// The six canonical base stats.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecordStats {
    pub primary: u32,
    pub offense: u32,
    pub defense: u32,
    pub special_offense: u32,
    pub special_defense: u32,
    pub speed: u32,
}

impl RecordStats {
    pub fn total(&self) -> u32 {
        self.primary
            + self.offense
            + self.defense
            + self.special_offense
            + self.special_defense
            + self.speed
    }
}

/// One page of records plus its position in the full listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationWindow {
    pub items: Vec<CatalogRecord>,
    pub total_items: u64,
    /// 1-based.
    pub current_page: u32,
    pub items_per_page: u32,
    pub has_next: bool,
    pub has_previous: bool,
    /// Listing entries that failed to resolve and were left out of `items`.
    pub dropped: usize,
}

impl PaginationWindow {
    /// Build a window for `limit`/`offset`, deriving the navigation flags from the totals.
    pub fn new(items: Vec<CatalogRecord>, total_items: u64, limit: u32, offset: u32) -> Self {
        let current_page = page_for_offset(limit, offset);
        Self {
            items,
            total_items,
            current_page,
            items_per_page: limit,
            has_next: (current_page as u64) * (limit as u64) < total_items,
            has_previous: current_page > 1,
            dropped: 0,
        }
    }

    pub fn with_dropped(mut self, dropped: usize) -> Self {
        self.dropped = dropped;
        self
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_items, self.items_per_page)
    }
}

/// Records resolved for one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListing {
    pub category: String,
    pub records: Vec<CatalogRecord>,
    /// Members that failed to resolve.
    pub dropped: usize,
}

/// `floor(offset / limit) + 1`, or `None` when the page number overflows `u32`.
pub fn checked_page_for_offset(limit: u32, offset: u32) -> Option<u32> {
    if limit == 0 {
        return Some(1);
    }
    (offset / limit).checked_add(1)
}

/// `floor(offset / limit) + 1`, saturating at `u32::MAX`.
pub fn page_for_offset(limit: u32, offset: u32) -> u32 {
    checked_page_for_offset(limit, offset).unwrap_or(u32::MAX)
}

/// `ceil(total_items / per_page)`, 0 for an empty listing.
pub fn total_pages(total_items: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    total_items.div_ceil(per_page as u64) as u32
}
