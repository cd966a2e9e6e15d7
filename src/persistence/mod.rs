//! Loading and saving actor ledgers

pub mod record;
pub mod store;

pub use record::{AllocationRecord, LedgerLoadReport, LedgerRecord};
pub use store::{JsonFileStore, MemoryStore};

use crate::core::types::ActorId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage backend for ledger records
///
/// `load` returns `Ok(None)` for an actor that has never been saved.
pub trait PersistenceAdapter {
    fn load(&self, actor: ActorId) -> Result<Option<LedgerRecord>, PersistenceError>;
    fn save(&mut self, actor: ActorId, record: &LedgerRecord) -> Result<(), PersistenceError>;
}
