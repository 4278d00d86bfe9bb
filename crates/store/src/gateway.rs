//! The persistence gateway: one load/save contract over both backends.
//!
//! Writes go local-first (the cache is the durability floor), then
//! best-effort to the remote bin when one is configured. Reads walk the
//! ordered source chain and never fail outward.

use serde_json::Value;

use cdstock_ledger::Formulary;

use crate::cache::LocalCache;
use crate::error::{StoreError, StoreResult};
use crate::remote::{BinClient, RemoteConfig};
use crate::seed;
use crate::source::{self, CacheSource, DataSource, RemoteSource, SeedSource};

/// Facade over the local cache and the optional remote bin.
#[derive(Debug, Clone)]
pub struct PersistenceGateway {
    cache: LocalCache,
    client: BinClient,
}

impl PersistenceGateway {
    /// Gateway rooted at the default OS app-data cache and the hosted
    /// remote endpoint.
    pub fn new() -> StoreResult<Self> {
        Ok(Self {
            cache: LocalCache::new()?,
            client: BinClient::new(),
        })
    }

    /// Gateway over explicit parts (tests, alternative endpoints).
    pub fn with_parts(cache: LocalCache, client: BinClient) -> Self {
        Self { cache, client }
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    /// Load the collection: remote (if configured), then local cache, then
    /// seed. Never fails; every source failure is absorbed and logged.
    pub async fn load(&self) -> Formulary {
        let mut sources: Vec<Box<dyn DataSource>> = Vec::new();

        if let Some(config) = self.configured_remote() {
            sources.push(Box::new(RemoteSource {
                client: self.client.clone(),
                config,
            }));
        }
        sources.push(Box::new(CacheSource {
            cache: self.cache.clone(),
        }));
        sources.push(Box::new(SeedSource));

        // The seed source is infallible, so the chain always yields.
        source::first_available(&sources).await.unwrap_or_default()
    }

    /// Persist the collection. The local write always happens first and is
    /// never rolled back; a remote failure afterwards is surfaced so the UI
    /// can show a sync error.
    pub async fn save(&self, formulary: &Formulary) -> StoreResult<()> {
        self.cache.save_drugs(formulary)?;

        if let Some(config) = self.configured_remote() {
            self.client.replace(&config, formulary).await?;
        }
        Ok(())
    }

    /// The stored remote config, complete or not.
    pub fn get_config(&self) -> StoreResult<Option<RemoteConfig>> {
        self.cache.load_config()
    }

    /// Persist a remote configuration after validating it is complete.
    pub fn set_config(&self, config: &RemoteConfig) -> StoreResult<()> {
        config.validate()?;
        self.cache.save_config(config)
    }

    /// Disconnect from the remote store. Only the local reference is
    /// removed; remote data stays where it is.
    pub fn clear_config(&self) -> StoreResult<()> {
        self.cache.clear_config()
    }

    /// Pure predicate over stored configuration; no network call.
    pub fn is_remote_configured(&self) -> bool {
        self.configured_remote().is_some()
    }

    /// Probe the remote with supplied (not-yet-saved) credentials.
    pub async fn test_connection(&self, config: &RemoteConfig) -> bool {
        self.client.test_connection(config).await
    }

    /// One-shot migration: snapshot the local cache (seed if empty), create
    /// a new remote bin seeded with it, and persist the resulting id plus
    /// credentials as the new configuration. Calling this twice creates two
    /// distinct bins.
    pub async fn migrate(&self, api_key: &str) -> StoreResult<String> {
        if api_key.is_empty() {
            return Err(StoreError::config_incomplete("missing API key"));
        }

        let snapshot = self.local_snapshot();
        let bin_id = self.client.create(api_key, &snapshot).await?;

        let config = RemoteConfig {
            api_key: api_key.to_string(),
            bin_id: bin_id.clone(),
        };
        self.cache.save_config(&config)?;
        tracing::info!(%bin_id, "migrated local data to new remote bin");
        Ok(bin_id)
    }

    /// Pretty-printed JSON dump of the current local data.
    pub fn export_json(&self) -> StoreResult<String> {
        let snapshot = self.local_snapshot();
        serde_json::to_string_pretty(&snapshot)
            .map_err(|e| StoreError::cache(format!("serialize export: {e}")))
    }

    /// Validate and import a bulk JSON document, replacing the local cache.
    /// The cache is untouched when the document is rejected.
    pub fn import_json(&self, raw: &str) -> StoreResult<Formulary> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| StoreError::import_invalid(format!("not valid JSON: {e}")))?;

        if !value.is_array() {
            return Err(StoreError::import_invalid("expected a JSON array of drugs"));
        }

        let formulary: Formulary = serde_json::from_value(value)
            .map_err(|e| StoreError::import_invalid(format!("schema violation: {e}")))?;

        for drug in formulary.iter() {
            if drug.name.trim().is_empty() {
                return Err(StoreError::import_invalid(format!(
                    "drug {} has an empty name",
                    drug.id
                )));
            }
        }

        self.cache.save_drugs(&formulary)?;
        Ok(formulary)
    }

    /// Replace the local cache with the built-in seed dataset.
    pub fn reset(&self) -> StoreResult<Formulary> {
        let seed = seed::seed_formulary();
        self.cache.save_drugs(&seed)?;
        Ok(seed)
    }

    fn configured_remote(&self) -> Option<RemoteConfig> {
        match self.cache.load_config() {
            Ok(config) => config.filter(RemoteConfig::is_configured),
            Err(e) => {
                tracing::warn!("remote config unreadable, treating as absent: {e}");
                None
            }
        }
    }

    /// Cache contents, seed when empty or unreadable.
    fn local_snapshot(&self) -> Formulary {
        match self.cache.load_drugs() {
            Ok(Some(formulary)) => formulary,
            Ok(None) => seed::seed_formulary(),
            Err(e) => {
                tracing::warn!("cache unreadable, using seed snapshot: {e}");
                seed::seed_formulary()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdstock_ledger::{DrugDetails, Presentation, StockAction};
    use chrono::{NaiveDate, Utc};

    fn gateway(dir: &std::path::Path) -> PersistenceGateway {
        // Remote stays unconfigured in these tests; the client is inert.
        PersistenceGateway::with_parts(LocalCache::with_dir(dir), BinClient::new())
    }

    fn populated() -> Formulary {
        let mut formulary = Formulary::new();
        let id = formulary
            .add_drug(
                DrugDetails {
                    name: "Fentanyl".to_string(),
                    strength: "100mcg/2ml".to_string(),
                    presentation: Presentation::Ampoule,
                    minimum_stock: 10,
                },
                Utc::now(),
            )
            .unwrap();
        formulary
            .apply(
                id,
                StockAction::CheckIn {
                    quantity: 20,
                    expiry: NaiveDate::from_ymd_opt(2027, 6, 30).unwrap(),
                },
                Utc::now(),
            )
            .unwrap();
        formulary
    }

    #[tokio::test]
    async fn load_with_nothing_anywhere_returns_seed() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(gateway(tmp.path()).load().await, seed::seed_formulary());
    }

    #[tokio::test]
    async fn load_is_idempotent_without_saves() {
        let tmp = tempfile::tempdir().unwrap();
        let gateway = gateway(tmp.path());
        assert_eq!(gateway.load().await, gateway.load().await);
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let gateway = gateway(tmp.path());

        let formulary = populated();
        gateway.save(&formulary).await.unwrap();
        assert_eq!(gateway.load().await, formulary);
    }

    #[tokio::test]
    async fn corrupt_cache_falls_back_to_seed() {
        let tmp = tempfile::tempdir().unwrap();
        let gateway = gateway(tmp.path());

        std::fs::write(tmp.path().join("drugs.json"), b"]oops").unwrap();
        assert_eq!(gateway.load().await, seed::seed_formulary());
    }

    #[tokio::test]
    async fn reset_replaces_cache_with_seed() {
        let tmp = tempfile::tempdir().unwrap();
        let gateway = gateway(tmp.path());

        gateway.save(&populated()).await.unwrap();
        let reset = gateway.reset().unwrap();
        assert_eq!(reset, seed::seed_formulary());
        assert_eq!(gateway.load().await, reset);
    }

    #[tokio::test]
    async fn export_parses_back_to_same_collection() {
        let tmp = tempfile::tempdir().unwrap();
        let gateway = gateway(tmp.path());

        let formulary = populated();
        gateway.save(&formulary).await.unwrap();

        let exported = gateway.export_json().unwrap();
        let back: Formulary = serde_json::from_str(&exported).unwrap();
        assert_eq!(back, formulary);
    }

    #[tokio::test]
    async fn import_round_trips_through_export() {
        let tmp = tempfile::tempdir().unwrap();
        let gateway = gateway(tmp.path());

        let formulary = populated();
        gateway.save(&formulary).await.unwrap();
        let exported = gateway.export_json().unwrap();

        gateway.reset().unwrap();
        let imported = gateway.import_json(&exported).unwrap();
        assert_eq!(imported, formulary);
        assert_eq!(gateway.load().await, formulary);
    }

    #[tokio::test]
    async fn invalid_imports_are_rejected_and_cache_is_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let gateway = gateway(tmp.path());

        let formulary = populated();
        gateway.save(&formulary).await.unwrap();

        for bad in [
            "not json at all",
            r#"{"drugs": []}"#,
            r#"[{"name": "orphan"}]"#,
        ] {
            let err = gateway.import_json(bad).unwrap_err();
            assert!(matches!(err, StoreError::ImportInvalid(_)), "{bad}");
        }

        assert_eq!(gateway.load().await, formulary);
    }

    #[tokio::test]
    async fn config_lifecycle() {
        let tmp = tempfile::tempdir().unwrap();
        let gateway = gateway(tmp.path());

        assert!(!gateway.is_remote_configured());
        assert!(gateway.get_config().unwrap().is_none());

        let incomplete = RemoteConfig {
            api_key: "key".to_string(),
            bin_id: String::new(),
        };
        assert!(matches!(
            gateway.set_config(&incomplete).unwrap_err(),
            StoreError::ConfigIncomplete(_)
        ));
        assert!(!gateway.is_remote_configured());

        let config = RemoteConfig {
            api_key: "key".to_string(),
            bin_id: "bin".to_string(),
        };
        gateway.set_config(&config).unwrap();
        assert!(gateway.is_remote_configured());
        assert_eq!(gateway.get_config().unwrap(), Some(config));

        gateway.clear_config().unwrap();
        assert!(!gateway.is_remote_configured());
        // Disconnect leaves the cached data alone.
        assert!(gateway.get_config().unwrap().is_none());
    }

    #[tokio::test]
    async fn migrate_requires_an_api_key() {
        let tmp = tempfile::tempdir().unwrap();
        let err = gateway(tmp.path()).migrate("").await.unwrap_err();
        assert!(matches!(err, StoreError::ConfigIncomplete(_)));
    }
}
