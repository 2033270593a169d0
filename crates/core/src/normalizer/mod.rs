//! Response normalizer.
//!
//! Turns loosely-typed upstream payloads into [`CatalogRecord`]s. Everything
//! in here is pure: no I/O, no logging side channels.
//!
//! Input is gated twice: a structural shape predicate on the raw JSON
//! (`is_valid_detail_shape` / `is_valid_species_shape`) and then a typed serde
//! decode. A payload that fails either is rejected whole, never partially
//! mapped.

mod upstream;

pub use upstream::*;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::repository::{CatalogRecord, RecordStats};

/// Description used when no English flavor text exists.
pub const NO_DESCRIPTION: &str = "No description available.";

/// Language code of the flavor text entry used as description.
const DESCRIPTION_LANGUAGE: &str = "en";

/// Trailing numeric path segment of a resource URL.
static TRAILING_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/(\d+)/?$").unwrap());

/// Errors raised while validating or decoding an upstream payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NormalizeError {
    /// The payload failed the structural shape check.
    #[error("Invalid {0} payload shape")]
    InvalidShape(&'static str),

    /// The payload passed the shape check but could not be decoded.
    #[error("Failed to decode {kind} payload: {message}")]
    Decode { kind: &'static str, message: String },
}

/// Canonical stat slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKey {
    Primary,
    Offense,
    Defense,
    SpecialOffense,
    SpecialDefense,
    Speed,
}

/// Upstream stat name to canonical slot. Names not listed are dropped.
pub const STAT_TABLE: [(&str, StatKey); 6] = [
    ("hp", StatKey::Primary),
    ("attack", StatKey::Offense),
    ("defense", StatKey::Defense),
    ("special-attack", StatKey::SpecialOffense),
    ("special-defense", StatKey::SpecialDefense),
    ("speed", StatKey::Speed),
];

impl StatKey {
    pub fn from_upstream(name: &str) -> Option<Self> {
        STAT_TABLE
            .iter()
            .find(|(upstream, _)| *upstream == name)
            .map(|(_, key)| *key)
    }

    fn slot(self, stats: &mut RecordStats) -> &mut u32 {
        match self {
            StatKey::Primary => &mut stats.primary,
            StatKey::Offense => &mut stats.offense,
            StatKey::Defense => &mut stats.defense,
            StatKey::SpecialOffense => &mut stats.special_offense,
            StatKey::SpecialDefense => &mut stats.special_defense,
            StatKey::Speed => &mut stats.speed,
        }
    }
}

// ============================================================================
// Shape predicates
// ============================================================================

/// Detail payloads need a positive id, a non-empty name, `types` and `stats`
/// arrays and a `sprites` object.
pub fn is_valid_detail_shape(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };

    obj.get("id").and_then(Value::as_u64).is_some_and(|id| id > 0)
        && obj
            .get("name")
            .and_then(Value::as_str)
            .is_some_and(|name| !name.is_empty())
        && obj.get("types").is_some_and(Value::is_array)
        && obj.get("stats").is_some_and(Value::is_array)
        && obj.get("sprites").is_some_and(Value::is_object)
}

/// Species payloads need a numeric id, a string name and a
/// `flavor_text_entries` array.
pub fn is_valid_species_shape(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };

    obj.get("id").is_some_and(Value::is_u64)
        && obj.get("name").is_some_and(Value::is_string)
        && obj.get("flavor_text_entries").is_some_and(Value::is_array)
}

// ============================================================================
// Decoding
// ============================================================================

fn decode<T: DeserializeOwned>(kind: &'static str, value: Value) -> Result<T, NormalizeError> {
    serde_json::from_value(value).map_err(|e| NormalizeError::Decode {
        kind,
        message: e.to_string(),
    })
}

/// Validate and decode an item detail payload.
pub fn parse_detail(value: Value) -> Result<DetailResponse, NormalizeError> {
    if !is_valid_detail_shape(&value) {
        return Err(NormalizeError::InvalidShape("detail"));
    }
    decode("detail", value)
}

/// Validate and decode a species payload.
pub fn parse_species(value: Value) -> Result<SpeciesResponse, NormalizeError> {
    if !is_valid_species_shape(&value) {
        return Err(NormalizeError::InvalidShape("species"));
    }
    decode("species", value)
}

/// Decode a paginated listing payload.
pub fn parse_listing(value: Value) -> Result<ListResponse, NormalizeError> {
    decode("listing", value)
}

/// Decode a category payload.
pub fn parse_category(value: Value) -> Result<CategoryResponse, NormalizeError> {
    decode("category", value)
}

// ============================================================================
// Mapping
// ============================================================================

/// Maps upstream payloads to canonical records.
#[derive(Debug, Clone)]
pub struct Normalizer {
    fallback_image_url: String,
}

impl Normalizer {
    /// `fallback_image_url` is a template where `{id}` is replaced by the record id.
    pub fn new(fallback_image_url: impl Into<String>) -> Self {
        Self {
            fallback_image_url: fallback_image_url.into(),
        }
    }

    /// Build a record from a detail payload and its optional species payload.
    pub fn to_catalog_record(
        &self,
        detail: &DetailResponse,
        species: Option<&SpeciesResponse>,
    ) -> CatalogRecord {
        CatalogRecord {
            id: detail.id,
            name: detail.name.clone(),
            image_url: resolve_image_url(&detail.sprites, detail.id, &self.fallback_image_url),
            categories: detail
                .types
                .iter()
                .map(|t| t.category.name.clone())
                .collect(),
            display_number: format_display_number(detail.id),
            weight_kg: detail.weight as f64 / 10.0,
            height_m: detail.height as f64 / 10.0,
            traits: detail
                .abilities
                .iter()
                .filter(|a| !a.is_hidden)
                .map(|a| a.ability.name.clone())
                .collect(),
            description: english_description(species),
            stats: map_stats(&detail.stats),
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_FALLBACK_IMAGE_URL)
    }
}

/// First non-empty of: official artwork, home artwork, default front sprite,
/// then the fallback template.
pub fn resolve_image_url(sprites: &Sprites, id: u32, fallback_template: &str) -> String {
    let other = sprites.other.as_ref();
    let candidates = [
        other
            .and_then(|o| o.official_artwork.as_ref())
            .and_then(|a| a.front_default.as_deref()),
        other
            .and_then(|o| o.home.as_ref())
            .and_then(|h| h.front_default.as_deref()),
        sprites.front_default.as_deref(),
    ];

    candidates
        .into_iter()
        .flatten()
        .find(|url| !url.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback_template.replace("{id}", &id.to_string()))
}

/// Map upstream stat entries onto the six canonical stats. Missing stats stay 0.
pub fn map_stats(entries: &[StatEntry]) -> RecordStats {
    let mut stats = RecordStats::default();
    for entry in entries {
        if let Some(key) = StatKey::from_upstream(&entry.stat.name) {
            *key.slot(&mut stats) = entry.base_stat;
        }
    }
    stats
}

/// Cleaned text of the first English flavor text entry.
pub fn english_description(species: Option<&SpeciesResponse>) -> String {
    species
        .and_then(|s| {
            s.flavor_text_entries
                .iter()
                .find(|e| e.language.name == DESCRIPTION_LANGUAGE)
        })
        .map(|e| clean_description(&e.flavor_text))
        .unwrap_or_else(|| NO_DESCRIPTION.to_string())
}

/// Collapse form feeds, newlines and whitespace runs into single spaces.
pub fn clean_description(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `#` followed by the id zero padded to three digits.
pub fn format_display_number(id: u32) -> String {
    format!("#{:03}", id)
}

/// Positive numeric id at the end of a resource URL (`.../item/25/`).
pub fn extract_id_from_url(url: &str) -> Option<u32> {
    TRAILING_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|id| *id > 0)
}
