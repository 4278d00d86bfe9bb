//! Ordered fallback chain of collection data sources.
//!
//! `load()` is modeled as a list of sources tried in sequence with
//! first-success-wins, so adding another backend is a matter of appending a
//! source, not editing control flow.

use async_trait::async_trait;

use cdstock_ledger::Formulary;

use crate::cache::LocalCache;
use crate::error::{StoreError, StoreResult};
use crate::remote::{BinClient, RemoteConfig};
use crate::seed;

/// One place a full collection snapshot can come from.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Short name for log lines.
    fn name(&self) -> &'static str;

    /// Produce the full collection, or fail so the next source is tried.
    async fn fetch(&self) -> StoreResult<Formulary>;
}

/// Walk the chain in order; failures are absorbed (logged) and the next
/// source is tried. `None` only when every source fails.
pub async fn first_available(sources: &[Box<dyn DataSource>]) -> Option<Formulary> {
    for source in sources {
        match source.fetch().await {
            Ok(formulary) => {
                tracing::debug!(source = source.name(), drugs = formulary.len(), "loaded collection");
                return Some(formulary);
            }
            Err(e) => {
                tracing::warn!(source = source.name(), "source failed, trying next: {e}");
            }
        }
    }
    None
}

/// The configured remote bin.
pub struct RemoteSource {
    pub client: BinClient,
    pub config: RemoteConfig,
}

#[async_trait]
impl DataSource for RemoteSource {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn fetch(&self) -> StoreResult<Formulary> {
        self.client.fetch_latest(&self.config).await
    }
}

/// The local document cache.
pub struct CacheSource {
    pub cache: LocalCache,
}

#[async_trait]
impl DataSource for CacheSource {
    fn name(&self) -> &'static str {
        "cache"
    }

    async fn fetch(&self) -> StoreResult<Formulary> {
        self.cache
            .load_drugs()?
            .ok_or_else(|| StoreError::cache("cache is empty"))
    }
}

/// The built-in seed dataset. Never fails; always the last link.
pub struct SeedSource;

#[async_trait]
impl DataSource for SeedSource {
    fn name(&self) -> &'static str {
        "seed"
    }

    async fn fetch(&self) -> StoreResult<Formulary> {
        Ok(seed::seed_formulary())
    }
}
