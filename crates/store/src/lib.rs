//! Persistence gateway for the drug collection.
//!
//! Durably stores and retrieves the full [`cdstock_ledger::Formulary`],
//! favoring availability over strict consistency: a local JSON document
//! cache is always written first, and an optional remote bin store is a
//! best-effort sync target behind it. Loads walk an ordered chain of data
//! sources (remote, cache, seed) and never fail outward.

pub mod cache;
pub mod error;
pub mod gateway;
pub mod remote;
pub mod seed;
pub mod source;

pub use cache::LocalCache;
pub use error::{StoreError, StoreResult};
pub use gateway::PersistenceGateway;
pub use remote::{BinClient, RemoteConfig};
pub use source::DataSource;
