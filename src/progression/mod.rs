//! Per-actor progression: points, allocations, tier activation and respecs

pub mod allocation;
pub mod gain;
pub mod ledger;
pub mod oracles;
pub mod respec;
pub mod tier_index;

pub use allocation::{AllocationEngine, AllocationOutcome, AllocationRefusal, DeallocationRefusal};
pub use ledger::{PerkAllocation, ProgressionLedger};
pub use oracles::{AffordabilityOracle, ExternalUnlockOracle, NoExternalRequirements, Wallet};
pub use respec::{RespecRefusal, RespecService, RespecSummary};
pub use tier_index::{PerkChange, PerkReference, TierActivationIndex};
