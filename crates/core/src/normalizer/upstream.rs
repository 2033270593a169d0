//! Wire shapes of the upstream REST payloads.
//!
//! Only the fields the normalizer reads are declared; everything else in the
//! upstream JSON is ignored.

use serde::{Deserialize, Serialize};

/// `{ name, url }` reference used all over the upstream API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// Item detail payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetailResponse {
    pub id: u32,
    pub name: String,
    /// Decimetres.
    #[serde(default)]
    pub height: u32,
    /// Hectograms.
    #[serde(default)]
    pub weight: u32,
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
    pub stats: Vec<StatEntry>,
    pub sprites: Sprites,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypeSlot {
    #[serde(default)]
    pub slot: u32,
    #[serde(rename = "type")]
    pub category: NamedResource,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AbilitySlot {
    pub ability: NamedResource,
    #[serde(default)]
    pub is_hidden: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatEntry {
    pub base_stat: u32,
    pub stat: NamedResource,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Sprites {
    #[serde(default)]
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OtherSprites {
    #[serde(default, rename = "official-artwork")]
    pub official_artwork: Option<FrontImage>,
    #[serde(default)]
    pub home: Option<FrontImage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FrontImage {
    #[serde(default)]
    pub front_default: Option<String>,
}

/// Species payload carrying the flavor text used as description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeciesResponse {
    pub id: u32,
    pub name: String,
    pub flavor_text_entries: Vec<FlavorTextEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlavorTextEntry {
    pub flavor_text: String,
    pub language: NamedResource,
}

/// Paginated listing (`/items`, `/category`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListResponse {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<NamedResource>,
}

/// Category payload with its member references.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryResponse {
    #[serde(default)]
    pub id: u32,
    pub name: String,
    #[serde(default, alias = "pokemon")]
    pub members: Vec<CategoryMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryMember {
    #[serde(alias = "pokemon")]
    pub item: NamedResource,
}
