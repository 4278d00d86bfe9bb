//! Remote bin client.
//!
//! The remote store is an opaque whole-document JSON bin: three verbs
//! (fetch latest, replace, create), addressed by a bin id and authenticated
//! by a static master-key header. No partial updates, no merge, no conflict
//! detection; a replace overwrites the whole snapshot.

use serde::{Deserialize, Serialize};

use cdstock_ledger::Formulary;

use crate::error::{StoreError, StoreResult};

/// Hosted JSONBin-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.jsonbin.io/v3";

const MASTER_KEY_HEADER: &str = "X-Master-Key";
const BIN_NAME_HEADER: &str = "X-Bin-Name";
const BIN_NAME: &str = "cdstock-drugs";

/// The two-field remote configuration (credential + store identifier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    pub api_key: String,
    pub bin_id: String,
}

impl RemoteConfig {
    /// Pure predicate: both fields present. No network call.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.bin_id.is_empty()
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.api_key.is_empty() {
            return Err(StoreError::config_incomplete("missing API key"));
        }
        if self.bin_id.is_empty() {
            return Err(StoreError::config_incomplete("missing bin id"));
        }
        Ok(())
    }
}

/// Fetch-latest responses wrap the document in a `record` field.
#[derive(Debug, Deserialize)]
struct FetchLatestResponse {
    record: Formulary,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    metadata: CreateMetadata,
}

#[derive(Debug, Deserialize)]
struct CreateMetadata {
    id: String,
}

/// HTTP client for the remote bin protocol.
#[derive(Debug, Clone)]
pub struct BinClient {
    base_url: String,
    http: reqwest::Client,
}

impl Default for BinClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BinClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at a different endpoint (tests, self-hosted bins).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Fetch the latest snapshot of the collection.
    pub async fn fetch_latest(&self, config: &RemoteConfig) -> StoreResult<Formulary> {
        config.validate()?;
        let url = format!("{}/b/{}/latest", self.base_url, config.bin_id);

        let response = self
            .http
            .get(&url)
            .header(MASTER_KEY_HEADER, &config.api_key)
            .send()
            .await
            .map_err(|e| StoreError::remote_unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::remote_unavailable(format!(
                "fetch returned {}",
                response.status()
            )));
        }

        let body: FetchLatestResponse = response
            .json()
            .await
            .map_err(|e| StoreError::remote_malformed(e.to_string()))?;
        Ok(body.record)
    }

    /// Replace the whole remote snapshot with `formulary`.
    pub async fn replace(&self, config: &RemoteConfig, formulary: &Formulary) -> StoreResult<()> {
        config.validate()?;
        let url = format!("{}/b/{}", self.base_url, config.bin_id);

        let response = self
            .http
            .put(&url)
            .header(MASTER_KEY_HEADER, &config.api_key)
            .json(formulary)
            .send()
            .await
            .map_err(|e| StoreError::remote_unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::remote_unavailable(format!(
                "replace returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    /// Create a new bin seeded with `formulary`; returns the allocated id.
    pub async fn create(&self, api_key: &str, formulary: &Formulary) -> StoreResult<String> {
        if api_key.is_empty() {
            return Err(StoreError::config_incomplete("missing API key"));
        }
        let url = format!("{}/b", self.base_url);

        let response = self
            .http
            .post(&url)
            .header(MASTER_KEY_HEADER, api_key)
            .header(BIN_NAME_HEADER, BIN_NAME)
            .json(formulary)
            .send()
            .await
            .map_err(|e| StoreError::remote_unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::remote_unavailable(format!(
                "create returned {}",
                response.status()
            )));
        }

        let body: CreateResponse = response
            .json()
            .await
            .map_err(|e| StoreError::remote_malformed(e.to_string()))?;
        Ok(body.metadata.id)
    }

    /// Probe the remote with not-yet-saved credentials. Never mutates
    /// config or data; any failure is simply `false`.
    pub async fn test_connection(&self, config: &RemoteConfig) -> bool {
        self.fetch_latest(config).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_requires_both_fields() {
        let full = RemoteConfig {
            api_key: "key".to_string(),
            bin_id: "bin".to_string(),
        };
        assert!(full.is_configured());

        let missing_key = RemoteConfig {
            api_key: String::new(),
            bin_id: "bin".to_string(),
        };
        assert!(!missing_key.is_configured());
        assert!(matches!(
            missing_key.validate().unwrap_err(),
            StoreError::ConfigIncomplete(_)
        ));

        let missing_bin = RemoteConfig {
            api_key: "key".to_string(),
            bin_id: String::new(),
        };
        assert!(!missing_bin.is_configured());
    }

    #[test]
    fn config_uses_camel_case_wire_keys() {
        let config = RemoteConfig {
            api_key: "key".to_string(),
            bin_id: "bin".to_string(),
        };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value, serde_json::json!({"apiKey": "key", "binId": "bin"}));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_remote_unavailable() {
        // Nothing listens on the discard port; connection is refused fast.
        let client = BinClient::with_base_url("http://127.0.0.1:9");
        let config = RemoteConfig {
            api_key: "key".to_string(),
            bin_id: "bin".to_string(),
        };

        let err = client.fetch_latest(&config).await.unwrap_err();
        assert!(matches!(err, StoreError::RemoteUnavailable(_)));
        assert!(!client.test_connection(&config).await);
    }
}
