pub mod config;
pub mod favorites;
pub mod gateway;
pub mod metrics;
pub mod normalizer;
pub mod repository;
pub mod store;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, FetchConfig,
    FavoritesConfig, ServerConfig, UpstreamConfig,
};
pub use favorites::{
    FavoriteIds, FavoritesPersistence, KeyValueStore, MemoryKeyValueStore, PersistenceError,
    SqliteKeyValueStore,
};
pub use gateway::{Gateway, GatewayError, HttpGateway};
pub use normalizer::{NormalizeError, Normalizer};
pub use repository::{
    CatalogRecord, CatalogRepository, CategoryListing, ErrorKind, PaginationWindow,
    RecordStats, RepositoryError, RestCatalogRepository,
};
pub use store::{ApplicationState, CatalogStore, StateView, StoreError};
