//! Upstream collaborators: the exhibitor catalog and the industry taxonomy.
//!
//! Both are read through [`CatalogSource`], which caches responses and turns
//! every upstream failure into an empty collection so matching never fails
//! because a fetch did.

use crate::models::{Industry, RawExhibitor};
use crate::services::cache::{CacheKey, CacheManager};
use crate::services::eventx::EventxError;
use async_trait::async_trait;
use std::sync::Arc;

/// Source of raw exhibitor records
#[async_trait]
pub trait ExhibitorCatalog: Send + Sync {
    async fn get_exhibitors(&self) -> Result<Vec<RawExhibitor>, EventxError>;
}

/// Source of the industry taxonomy
#[async_trait]
pub trait IndustryTaxonomy: Send + Sync {
    async fn get_industries(&self) -> Result<Vec<Industry>, EventxError>;
}

/// Cached, failure-tolerant access to the catalog and taxonomy
#[derive(Clone)]
pub struct CatalogSource {
    catalog: Arc<dyn ExhibitorCatalog>,
    taxonomy: Arc<dyn IndustryTaxonomy>,
    cache: Arc<CacheManager>,
    event_id: u32,
}

impl CatalogSource {
    pub fn new(
        catalog: Arc<dyn ExhibitorCatalog>,
        taxonomy: Arc<dyn IndustryTaxonomy>,
        cache: Arc<CacheManager>,
        event_id: u32,
    ) -> Self {
        Self {
            catalog,
            taxonomy,
            cache,
            event_id,
        }
    }

    /// Exhibitors, served from cache when possible
    pub async fn exhibitors(&self) -> Vec<RawExhibitor> {
        let key = CacheKey::catalog(self.event_id);
        match self.cache.get::<Vec<RawExhibitor>>(&key).await {
            Ok(exhibitors) => exhibitors,
            Err(e) => {
                tracing::trace!("Catalog cache lookup failed: {}", e);
                self.fresh_exhibitors().await
            }
        }
    }

    /// Exhibitors straight from the catalog; repopulates the cache
    ///
    /// An empty response evicts the cached list. A failed fetch leaves it.
    pub async fn fresh_exhibitors(&self) -> Vec<RawExhibitor> {
        match self.catalog.get_exhibitors().await {
            Ok(exhibitors) if exhibitors.is_empty() => {
                tracing::warn!("Catalog returned no exhibitors for event {}", self.event_id);
                if let Err(e) = self.cache.delete(&CacheKey::catalog(self.event_id)).await {
                    tracing::warn!("Failed to evict cached catalog: {}", e);
                }
                exhibitors
            }
            Ok(exhibitors) => {
                let key = CacheKey::catalog(self.event_id);
                if let Err(e) = self.cache.set(&key, &exhibitors).await {
                    tracing::warn!("Failed to cache catalog: {}", e);
                }
                exhibitors
            }
            Err(e) => {
                tracing::warn!("Catalog fetch failed, scoring no exhibitors: {}", e);
                Vec::new()
            }
        }
    }

    /// Industry taxonomy, served from cache when possible
    pub async fn industries(&self) -> Vec<Industry> {
        let key = CacheKey::industries();
        if let Ok(industries) = self.cache.get::<Vec<Industry>>(&key).await {
            return industries;
        }

        match self.taxonomy.get_industries().await {
            Ok(industries) => {
                if !industries.is_empty() {
                    if let Err(e) = self.cache.set(&key, &industries).await {
                        tracing::warn!("Failed to cache industries: {}", e);
                    }
                }
                industries
            }
            Err(e) => {
                tracing::warn!("Industry taxonomy fetch failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// Translate selected industry ids into the names the scorer compares
///
/// Unknown ids are dropped. Output follows the order of `ids`.
pub fn resolve_industry_names(taxonomy: &[Industry], ids: &[String]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| {
            let found = taxonomy.iter().find(|industry| industry.id == id.trim());
            if found.is_none() {
                tracing::debug!("Unknown industry id {}", id);
            }
            found.map(|industry| industry.name.clone())
        })
        .collect()
}
