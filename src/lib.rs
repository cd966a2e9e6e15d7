//! Perk Progression - per-school skill points and perk trees
//!
//! Actors earn points in eight magic schools and spend them on nodes of
//! each school's perk tree. The crate owns the rules (budgets,
//! prerequisites, active-ability exclusivity, tier activation, respecs)
//! and leaves effects, UI and transport to the host.

pub mod core;
pub mod perks;
pub mod persistence;
pub mod progression;
pub mod session;

pub use crate::core::{ActorId, ProgressionConfig, ProgressionError, School};
pub use crate::perks::{CatalogHandle, PerkCatalog, PerkNode, PerkType};
pub use crate::persistence::{JsonFileStore, LedgerRecord, MemoryStore, PersistenceAdapter};
pub use crate::progression::{AllocationEngine, ProgressionLedger, RespecService};
pub use crate::session::LedgerStore;
