//! Collaborator-facing service layer.
//!
//! The UI (forms, cards, charts) is an external collaborator: it supplies
//! validated action inputs and renders the entity list. Everything it may
//! call lives on [`DrugService`].

pub mod service;

pub use service::{DrugService, ServiceError, SyncState};

/// Process-wide tracing setup; the embedding shell calls this once at
/// startup, before constructing a [`DrugService`].
pub fn init_observability() {
    cdstock_observability::init();
}
