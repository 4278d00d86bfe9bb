//! Local JSON document cache.
//!
//! Two documents in the OS app-data directory: `drugs.json` (the whole
//! collection, a JSON array) and `remote.json` (the two-field remote
//! configuration). The cache is the durability floor: it is written before
//! any remote I/O, so local state never depends on the network.

use std::fs;
use std::path::{Path, PathBuf};

use cdstock_ledger::Formulary;

use crate::error::{StoreError, StoreResult};
use crate::remote::RemoteConfig;

const DRUGS_FILE: &str = "drugs.json";
const CONFIG_FILE: &str = "remote.json";

/// Filesystem-backed whole-document cache.
#[derive(Debug, Clone)]
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    /// Cache rooted at the OS app-data directory (`{data_dir}/cdstock`).
    pub fn new() -> StoreResult<Self> {
        Ok(Self { dir: default_dir()? })
    }

    /// Cache rooted at an explicit directory (tests, portable installs).
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn drugs_path(&self) -> PathBuf {
        self.dir.join(DRUGS_FILE)
    }

    fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// Read the cached collection. `Ok(None)` when nothing has been cached
    /// yet; a present-but-unreadable document is an error so callers can
    /// fall through to the next data source.
    pub fn load_drugs(&self) -> StoreResult<Option<Formulary>> {
        let path = self.drugs_path();
        if !path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&path)
            .map_err(|e| StoreError::cache(format!("read {}: {e}", path.display())))?;
        let formulary = serde_json::from_str(&raw)
            .map_err(|e| StoreError::cache(format!("corrupt {}: {e}", path.display())))?;
        Ok(Some(formulary))
    }

    /// Overwrite the cached collection.
    pub fn save_drugs(&self, formulary: &Formulary) -> StoreResult<()> {
        let payload = serde_json::to_vec(formulary)
            .map_err(|e| StoreError::cache(format!("serialize collection: {e}")))?;
        self.write(&self.drugs_path(), &payload)
    }

    /// Read the remote configuration. A corrupt config document is treated
    /// as absent (the UI must stay usable with remote disabled).
    pub fn load_config(&self) -> StoreResult<Option<RemoteConfig>> {
        let path = self.config_path();
        if !path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&path)
            .map_err(|e| StoreError::cache(format!("read {}: {e}", path.display())))?;
        match serde_json::from_str(&raw) {
            Ok(config) => Ok(Some(config)),
            Err(e) => {
                tracing::warn!("discarding corrupt remote config: {e}");
                Ok(None)
            }
        }
    }

    pub fn save_config(&self, config: &RemoteConfig) -> StoreResult<()> {
        let payload = serde_json::to_vec(config)
            .map_err(|e| StoreError::cache(format!("serialize config: {e}")))?;
        self.write(&self.config_path(), &payload)
    }

    /// Forget the remote configuration. Remote data is left untouched.
    pub fn clear_config(&self) -> StoreResult<()> {
        let path = self.config_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::cache(format!("remove {}: {e}", path.display()))),
        }
    }

    fn write(&self, path: &Path, payload: &[u8]) -> StoreResult<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| StoreError::cache(format!("create {}: {e}", self.dir.display())))?;
        fs::write(path, payload)
            .map_err(|e| StoreError::cache(format!("write {}: {e}", path.display())))
    }
}

/// Resolve `{app_data_dir}/cdstock`, falling back to `~/.local/share` when
/// the platform dir cannot be determined.
fn default_dir() -> StoreResult<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut home| {
                home.push(".local");
                home.push("share");
                home
            })
        })
        .ok_or_else(|| StoreError::cache("cannot resolve OS app data directory"))?;

    Ok(base.join("cdstock"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdstock_ledger::{DrugDetails, Presentation};
    use chrono::Utc;

    fn sample_formulary() -> Formulary {
        let mut formulary = Formulary::new();
        formulary
            .add_drug(
                DrugDetails {
                    name: "Morphine".to_string(),
                    strength: "10mg/1ml".to_string(),
                    presentation: Presentation::Ampoule,
                    minimum_stock: 10,
                },
                Utc::now(),
            )
            .unwrap();
        formulary
    }

    #[test]
    fn empty_cache_loads_none() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = LocalCache::with_dir(tmp.path());
        assert!(cache.load_drugs().unwrap().is_none());
        assert!(cache.load_config().unwrap().is_none());
    }

    #[test]
    fn drugs_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = LocalCache::with_dir(tmp.path());

        let formulary = sample_formulary();
        cache.save_drugs(&formulary).unwrap();
        assert_eq!(cache.load_drugs().unwrap(), Some(formulary));
    }

    #[test]
    fn corrupt_drugs_document_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = LocalCache::with_dir(tmp.path());

        std::fs::write(tmp.path().join(DRUGS_FILE), b"{not json").unwrap();
        assert!(matches!(
            cache.load_drugs().unwrap_err(),
            StoreError::Cache(_)
        ));
    }

    #[test]
    fn corrupt_config_is_treated_as_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = LocalCache::with_dir(tmp.path());

        std::fs::write(tmp.path().join(CONFIG_FILE), b"garbage").unwrap();
        assert!(cache.load_config().unwrap().is_none());
    }

    #[test]
    fn config_set_and_clear() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = LocalCache::with_dir(tmp.path());

        let config = RemoteConfig {
            api_key: "key".to_string(),
            bin_id: "bin".to_string(),
        };
        cache.save_config(&config).unwrap();
        assert_eq!(cache.load_config().unwrap(), Some(config));

        cache.clear_config().unwrap();
        assert!(cache.load_config().unwrap().is_none());
        // Clearing twice is fine.
        cache.clear_config().unwrap();
    }
}
