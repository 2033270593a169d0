use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub favorites: FavoritesConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Upstream REST data source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Base URL every path template is appended to (e.g., "https://api.example.org/v2")
    pub base_url: String,
    /// Request timeout in seconds. Unset means the transport default (no timeout).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    /// Image URL used when a record has no artwork, `{id}` is replaced by the record id
    #[serde(default = "default_fallback_image_url")]
    pub fallback_image_url: String,
    #[serde(default)]
    pub paths: PathTemplates,
}

impl UpstreamConfig {
    /// Upstream config with default paths and no timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout_secs: None,
            fallback_image_url: default_fallback_image_url(),
            paths: PathTemplates::default(),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

pub const DEFAULT_FALLBACK_IMAGE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork/{id}.png";

fn default_fallback_image_url() -> String {
    DEFAULT_FALLBACK_IMAGE_URL.to_string()
}

/// Path templates for the upstream endpoints.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PathTemplates {
    /// Item detail, `{id}` is an id or an exact lowercase name
    #[serde(default = "default_item_path")]
    pub item: String,
    /// Paginated item listing (`limit` / `offset` query parameters)
    #[serde(default = "default_items_path")]
    pub items: String,
    /// Species / description record for an item
    #[serde(default = "default_species_path")]
    pub species: String,
    /// Category members
    #[serde(default = "default_category_path")]
    pub category: String,
    /// Category listing (`limit` query parameter)
    #[serde(default = "default_categories_path")]
    pub categories: String,
}

impl Default for PathTemplates {
    fn default() -> Self {
        Self {
            item: default_item_path(),
            items: default_items_path(),
            species: default_species_path(),
            category: default_category_path(),
            categories: default_categories_path(),
        }
    }
}

impl PathTemplates {
    pub fn item(&self, key: &str) -> String {
        self.item.replace("{id}", key)
    }

    pub fn species(&self, id: u32) -> String {
        self.species.replace("{id}", &id.to_string())
    }

    pub fn category(&self, name: &str) -> String {
        self.category.replace("{name}", name)
    }
}

fn default_item_path() -> String {
    "/item/{id}".to_string()
}

fn default_items_path() -> String {
    "/items".to_string()
}

fn default_species_path() -> String {
    "/item-species/{id}".to_string()
}

fn default_category_path() -> String {
    "/category/{name}".to_string()
}

fn default_categories_path() -> String {
    "/category".to_string()
}

/// Fetch fan-out and paging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FetchConfig {
    /// Detail lookups issued concurrently per batch (default: 8)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause between batches in milliseconds (default: 50)
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    /// Max members resolved for a category listing (default: 20)
    #[serde(default = "default_category_member_cap")]
    pub category_member_cap: usize,
    /// Items per page for the initial load and refresh (default: 20)
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// `limit` sent with the category listing request (default: 50)
    #[serde(default = "default_category_list_limit")]
    pub category_list_limit: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            category_member_cap: default_category_member_cap(),
            page_size: default_page_size(),
            category_list_limit: default_category_list_limit(),
        }
    }
}

impl FetchConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

fn default_batch_size() -> usize {
    8
}

fn default_batch_delay_ms() -> u64 {
    50
}

fn default_category_member_cap() -> usize {
    20
}

fn default_page_size() -> u32 {
    20
}

fn default_category_list_limit() -> u32 {
    50
}

/// Favorites persistence configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FavoritesConfig {
    /// SQLite database holding the key-value table
    #[serde(default = "default_favorites_path")]
    pub path: PathBuf,
    /// Key the JSON-encoded id array is stored under
    #[serde(default = "default_favorites_key")]
    pub key: String,
}

impl Default for FavoritesConfig {
    fn default() -> Self {
        Self {
            path: default_favorites_path(),
            key: default_favorites_key(),
        }
    }
}

fn default_favorites_path() -> PathBuf {
    PathBuf::from("bestiary.db")
}

fn default_favorites_key() -> String {
    "favorites".to_string()
}
