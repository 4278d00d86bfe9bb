//! The drug stock service: in-memory collection + persistence gateway.
//!
//! Execution is single-threaded and event-driven: the UI calls one method
//! per user action, the engine mutates the in-memory collection, and the
//! result is persisted straight away. Each save ships the *current*
//! collection, never a captured snapshot, so a mutation that lands while a
//! prior remote save is in flight is carried by the next save cycle
//! (last-write-wins on the remote, single active writer assumed).

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use cdstock_core::{DomainError, DrugId};
use cdstock_ledger::{Drug, DrugDetails, Formulary, StockAction};
use cdstock_store::{PersistenceGateway, RemoteConfig, StoreError};

/// Anything the UI layer can be handed back.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Sync indicator state for the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    pub syncing: bool,
    pub last_error: Option<String>,
}

/// Facade over the transaction engine and the persistence gateway.
pub struct DrugService {
    formulary: Formulary,
    gateway: PersistenceGateway,
    sync: SyncState,
}

impl DrugService {
    /// Service over an explicit gateway, with nothing loaded yet.
    pub fn new(gateway: PersistenceGateway) -> Self {
        Self {
            formulary: Formulary::new(),
            gateway,
            sync: SyncState::default(),
        }
    }

    /// Service over the default gateway (OS app-data cache, hosted remote).
    pub fn with_default_gateway() -> Result<Self, ServiceError> {
        Ok(Self::new(PersistenceGateway::new()?))
    }

    // ---- collection access -------------------------------------------------

    pub fn drugs(&self) -> &[Drug] {
        self.formulary.drugs()
    }

    pub fn drug_by_id(&self, id: DrugId) -> Option<&Drug> {
        self.formulary.get(id)
    }

    pub fn collection(&self) -> &Formulary {
        &self.formulary
    }

    pub fn sync_state(&self) -> &SyncState {
        &self.sync
    }

    // ---- load/save ---------------------------------------------------------

    /// Load the collection through the gateway's fallback chain. Never
    /// fails; the seed dataset is the floor.
    pub async fn load_collection(&mut self) -> &Formulary {
        self.formulary = self.gateway.load().await;
        tracing::info!(drugs = self.formulary.len(), "collection loaded");
        &self.formulary
    }

    /// Re-read from the backends, e.g. after the remote config changed.
    pub async fn reload(&mut self) -> &Formulary {
        self.load_collection().await
    }

    /// Explicitly persist the current in-memory collection.
    pub async fn save_collection(&mut self) -> Result<(), ServiceError> {
        self.persist().await
    }

    // ---- actions -----------------------------------------------------------

    pub async fn check_in(
        &mut self,
        id: DrugId,
        quantity: u32,
        expiry: NaiveDate,
    ) -> Result<(), ServiceError> {
        self.apply_and_persist(id, StockAction::CheckIn { quantity, expiry })
            .await
    }

    /// Dispense to a theatre location; a check-out to `"Pharmacy"` is
    /// applied (and logged) as a pharmacy return of OOD stock.
    pub async fn check_out(
        &mut self,
        id: DrugId,
        quantity: u32,
        location: impl Into<String>,
    ) -> Result<(), ServiceError> {
        self.apply_and_persist(
            id,
            StockAction::CheckOut {
                quantity,
                location: location.into(),
            },
        )
        .await
    }

    pub async fn mark_ood(&mut self, id: DrugId, quantity: u32) -> Result<(), ServiceError> {
        self.apply_and_persist(id, StockAction::MarkOod { quantity })
            .await
    }

    pub async fn edit_drug(
        &mut self,
        id: DrugId,
        details: DrugDetails,
    ) -> Result<(), ServiceError> {
        self.apply_and_persist(
            id,
            StockAction::Edit {
                name: details.name,
                strength: details.strength,
                presentation: details.presentation,
                minimum_stock: details.minimum_stock,
            },
        )
        .await
    }

    /// Privileged override of the counted stock; still audit-logged.
    pub async fn admin_edit(
        &mut self,
        id: DrugId,
        details: DrugDetails,
        available: u32,
        ood: u32,
    ) -> Result<(), ServiceError> {
        self.apply_and_persist(
            id,
            StockAction::AdminEdit {
                name: details.name,
                strength: details.strength,
                presentation: details.presentation,
                minimum_stock: details.minimum_stock,
                available,
                ood,
            },
        )
        .await
    }

    pub async fn add_drug(&mut self, details: DrugDetails) -> Result<DrugId, ServiceError> {
        let id = self.formulary.add_drug(details, Utc::now())?;
        self.persist().await?;
        Ok(id)
    }

    pub async fn delete_drug(&mut self, id: DrugId) -> Result<(), ServiceError> {
        self.formulary.remove_drug(id)?;
        self.persist().await?;
        Ok(())
    }

    pub async fn clear_all_logs(&mut self) -> Result<(), ServiceError> {
        self.formulary.clear_all_logs(Utc::now());
        self.persist().await
    }

    // ---- remote configuration ---------------------------------------------

    pub fn get_config(&self) -> Result<Option<RemoteConfig>, ServiceError> {
        Ok(self.gateway.get_config()?)
    }

    pub fn set_config(&self, config: &RemoteConfig) -> Result<(), ServiceError> {
        Ok(self.gateway.set_config(config)?)
    }

    pub fn clear_config(&self) -> Result<(), ServiceError> {
        Ok(self.gateway.clear_config()?)
    }

    pub fn is_configured(&self) -> bool {
        self.gateway.is_remote_configured()
    }

    pub async fn test_connection(&self, config: &RemoteConfig) -> bool {
        self.gateway.test_connection(config).await
    }

    pub async fn migrate(&self, api_key: &str) -> Result<String, ServiceError> {
        Ok(self.gateway.migrate(api_key).await?)
    }

    // ---- bulk data ---------------------------------------------------------

    pub fn export_data(&self) -> Result<String, ServiceError> {
        Ok(self.gateway.export_json()?)
    }

    /// Import a bulk document; on success it becomes the live collection.
    pub fn import_data(&mut self, raw: &str) -> Result<(), ServiceError> {
        self.formulary = self.gateway.import_json(raw)?;
        Ok(())
    }

    /// Reset to the built-in seed dataset.
    pub fn reset_data(&mut self) -> Result<(), ServiceError> {
        self.formulary = self.gateway.reset()?;
        Ok(())
    }

    // ---- internals ---------------------------------------------------------

    async fn apply_and_persist(
        &mut self,
        id: DrugId,
        action: StockAction,
    ) -> Result<(), ServiceError> {
        self.formulary.apply(id, action, Utc::now())?;
        self.persist().await
    }

    /// Save the current in-memory collection. The gateway writes the local
    /// cache first; a remote failure is recorded for the sync indicator and
    /// surfaced, but the local write stands.
    async fn persist(&mut self) -> Result<(), ServiceError> {
        self.sync.syncing = true;
        self.sync.last_error = None;

        let result = self.gateway.save(&self.formulary).await;
        self.sync.syncing = false;

        if let Err(e) = &result {
            self.sync.last_error = Some(e.to_string());
            tracing::error!("save failed: {e}");
        }
        result.map_err(Into::into)
    }
}
