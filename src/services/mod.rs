// Service exports
pub mod cache;
pub mod catalog;
pub mod eventx;
pub mod matchmaking;
pub mod saved_matches;

pub use cache::{CacheError, CacheKey, CacheManager, CacheStats};
pub use catalog::{resolve_industry_names, CatalogSource, ExhibitorCatalog, IndustryTaxonomy};
pub use eventx::{EventxClient, EventxError};
pub use matchmaking::{
    MatchmakingService, PersistencePolicy, PreferenceSelection, SaveOutcome, ServiceError,
    SessionSnapshot,
};
pub use saved_matches::{
    InMemorySavedMatchRepository, PostgresSavedMatchRepository, RepositoryError,
    SavedMatchRepository,
};
