//! Testing utilities and mock implementations.
//!
//! Mocks for the gateway and repository seams, allowing store and server
//! tests to run without a live upstream.
//!
//! # Example
//!
//! ```rust,ignore
//! use bestiary_core::testing::{fixtures, MockCatalogRepository};
//!
//! let repository = MockCatalogRepository::new();
//! repository.set_catalog(vec![
//!     fixtures::record(1, "bulbasaur", &["grass", "poison"]),
//!     fixtures::record(4, "charmander", &["fire"]),
//! ]).await;
//!
//! // Use in CatalogStore::new(...)
//! ```

mod mock_gateway;
mod mock_repository;

pub use mock_gateway::{MockGateway, RecordedRequest};
pub use mock_repository::{MockCatalogRepository, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::repository::{CatalogRecord, PaginationWindow, RecordStats};

    /// Base URL used for upstream resource links in fixtures.
    pub const BASE_URL: &str = "https://api.example.org/v2";

    /// Upstream resource URL for an item id.
    pub fn item_url(id: u32) -> String {
        format!("{}/item/{}/", BASE_URL, id)
    }

    /// A normalized record.
    pub fn record(id: u32, name: &str, categories: &[&str]) -> CatalogRecord {
        CatalogRecord {
            id,
            name: name.to_string(),
            image_url: format!("https://img.example.org/artwork/{}.png", id),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            display_number: format!("#{:03}", id),
            weight_kg: 6.0,
            height_m: 0.4,
            traits: vec!["static".to_string()],
            description: format!("The {} record.", name),
            stats: RecordStats {
                primary: 35,
                offense: 55,
                defense: 40,
                special_offense: 50,
                special_defense: 50,
                speed: 90,
            },
        }
    }

    /// `count` records with ids `1..=count`, named `record-001` and so on.
    pub fn records(count: u32) -> Vec<CatalogRecord> {
        (1..=count)
            .map(|id| record(id, &format!("record-{:03}", id), &["normal"]))
            .collect()
    }

    /// A window over `items` as the repository would return it.
    pub fn window(items: Vec<CatalogRecord>, total: u64, limit: u32, offset: u32) -> PaginationWindow {
        PaginationWindow::new(items, total, limit, offset)
    }

    /// Upstream item detail payload.
    pub fn detail_json(id: u32, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "height": 4,
            "weight": 60,
            "types": [
                { "slot": 1, "type": { "name": "normal", "url": format!("{}/category/1/", BASE_URL) } }
            ],
            "abilities": [
                { "ability": { "name": "static", "url": "" }, "is_hidden": false, "slot": 1 },
                { "ability": { "name": "lightning-rod", "url": "" }, "is_hidden": true, "slot": 3 }
            ],
            "stats": [
                { "base_stat": 35, "stat": { "name": "hp", "url": "" } },
                { "base_stat": 55, "stat": { "name": "attack", "url": "" } },
                { "base_stat": 40, "stat": { "name": "defense", "url": "" } },
                { "base_stat": 50, "stat": { "name": "special-attack", "url": "" } },
                { "base_stat": 50, "stat": { "name": "special-defense", "url": "" } },
                { "base_stat": 90, "stat": { "name": "speed", "url": "" } }
            ],
            "sprites": {
                "front_default": format!("https://img.example.org/sprites/{}.png", id),
                "other": {
                    "official-artwork": {
                        "front_default": format!("https://img.example.org/artwork/{}.png", id)
                    },
                    "home": {
                        "front_default": format!("https://img.example.org/home/{}.png", id)
                    }
                }
            }
        })
    }

    /// Upstream species payload with one English and one French entry.
    pub fn species_json(id: u32, name: &str, english_text: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "flavor_text_entries": [
                { "flavor_text": "Texte", "language": { "name": "fr", "url": "" } },
                { "flavor_text": english_text, "language": { "name": "en", "url": "" } }
            ]
        })
    }

    /// Upstream listing payload. Cursors are set only when requested.
    pub fn listing_json(count: u64, entries: &[(u32, &str)], has_next: bool, has_previous: bool) -> Value {
        let results: Vec<Value> = entries
            .iter()
            .map(|(id, name)| json!({ "name": name, "url": item_url(*id) }))
            .collect();

        json!({
            "count": count,
            "next": has_next.then(|| format!("{}/items?offset=next", BASE_URL)),
            "previous": has_previous.then(|| format!("{}/items?offset=previous", BASE_URL)),
            "results": results
        })
    }

    /// Upstream category payload with members `ids`.
    pub fn category_json(name: &str, ids: &[u32]) -> Value {
        let members: Vec<Value> = ids
            .iter()
            .map(|id| {
                json!({
                    "item": { "name": format!("item-{}", id), "url": item_url(*id) },
                    "slot": 1
                })
            })
            .collect();

        json!({ "id": 1, "name": name, "members": members })
    }
}
