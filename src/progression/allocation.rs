//! Spending and refunding points on perk nodes
//!
//! The engine never leaves a ledger half-changed: every check runs before
//! the first mutation, and a refusal means nothing was touched.

use crate::perks::{PerkCatalog, PerkNode};
use crate::progression::ledger::{PerkAllocation, ProgressionLedger};
use crate::progression::oracles::ExternalUnlockOracle;
use thiserror::Error;

/// Why a node cannot be allocated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationRefusal {
    #[error("no perk node '{0}'")]
    UnknownNode(String),

    #[error("'{0}' is already allocated")]
    AlreadyAllocated(String),

    #[error("needs {needed} points, {available} available")]
    InsufficientPoints { needed: u32, available: u32 },

    #[error("requires {}", .0.join(", "))]
    MissingPrerequisites(Vec<String>),

    #[error("requires '{0}'")]
    ExternalRequirement(String),

    #[error("another active ability is selected: '{held}'")]
    ActiveAbilityConflict { held: String },
}

/// Why a node cannot be deallocated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeallocationRefusal {
    #[error("'{0}' is not allocated")]
    NotAllocated(String),

    #[error("required by {}", .0.join(", "))]
    HasDependents(Vec<String>),
}

/// Result of a successful allocate call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationOutcome {
    /// Node allocated; this many points were spent
    Allocated { cost: u32 },
    /// The node is the actor's current active ability; nothing changed
    AlreadyHeld,
}

/// Validates and applies allocation changes against one catalog
pub struct AllocationEngine<'a> {
    catalog: &'a PerkCatalog,
    unlocks: &'a dyn ExternalUnlockOracle,
}

impl<'a> AllocationEngine<'a> {
    pub fn new(catalog: &'a PerkCatalog, unlocks: &'a dyn ExternalUnlockOracle) -> Self {
        Self { catalog, unlocks }
    }

    /// First reason the node cannot be allocated, checked in order:
    /// existence, duplicate, budget, prerequisites, external requirement,
    /// active-ability exclusivity.
    ///
    /// The actor's currently held active ability passes, since allocating it
    /// again is a no-op success.
    pub fn check_allocation(&self, ledger: &ProgressionLedger, node_id: &str) -> Result<&'a PerkNode, AllocationRefusal> {
        let node = self
            .catalog
            .node(node_id)
            .ok_or_else(|| AllocationRefusal::UnknownNode(node_id.to_string()))?;

        if Self::is_held_active(ledger, node_id) {
            return Ok(node);
        }
        if ledger.is_perk_allocated(node_id) {
            return Err(AllocationRefusal::AlreadyAllocated(node_id.to_string()));
        }

        if let Some(refusal) = Self::budget_refusal(ledger, node) {
            return Err(refusal);
        }
        if let Some(refusal) = self.prerequisite_refusal(ledger, node) {
            return Err(refusal);
        }
        if let Some(refusal) = self.external_refusal(ledger, node) {
            return Err(refusal);
        }
        if let Some(refusal) = Self::exclusivity_refusal(ledger, node) {
            return Err(refusal);
        }

        Ok(node)
    }

    pub fn can_allocate(&self, ledger: &ProgressionLedger, node_id: &str) -> bool {
        self.check_allocation(ledger, node_id).is_ok()
    }

    /// Every reason the node cannot be allocated, for tooltips
    ///
    /// Empty when the node can be allocated.
    pub fn allocation_refusals(&self, ledger: &ProgressionLedger, node_id: &str) -> Vec<AllocationRefusal> {
        let Some(node) = self.catalog.node(node_id) else {
            return vec![AllocationRefusal::UnknownNode(node_id.to_string())];
        };
        if Self::is_held_active(ledger, node_id) {
            return Vec::new();
        }

        let mut refusals = Vec::new();
        if ledger.is_perk_allocated(node_id) {
            refusals.push(AllocationRefusal::AlreadyAllocated(node_id.to_string()));
        }
        refusals.extend(Self::budget_refusal(ledger, node));
        refusals.extend(self.prerequisite_refusal(ledger, node));
        refusals.extend(self.external_refusal(ledger, node));
        refusals.extend(Self::exclusivity_refusal(ledger, node));
        refusals
    }

    fn budget_refusal(ledger: &ProgressionLedger, node: &PerkNode) -> Option<AllocationRefusal> {
        let available = ledger.available_points(node.school);
        (available < node.point_cost).then(|| AllocationRefusal::InsufficientPoints {
            needed: node.point_cost,
            available,
        })
    }

    fn prerequisite_refusal(&self, ledger: &ProgressionLedger, node: &PerkNode) -> Option<AllocationRefusal> {
        let missing = ledger.unmet_prerequisites(self.catalog, node);
        (!missing.is_empty()).then_some(AllocationRefusal::MissingPrerequisites(missing))
    }

    fn is_held_active(ledger: &ProgressionLedger, node_id: &str) -> bool {
        ledger
            .current_active_ability()
            .is_some_and(|held| held.node_id == node_id)
    }

    fn external_refusal(&self, ledger: &ProgressionLedger, node: &PerkNode) -> Option<AllocationRefusal> {
        let token = node.external_requirement.as_deref()?;
        (!self.unlocks.is_satisfied(ledger.actor(), token))
            .then(|| AllocationRefusal::ExternalRequirement(token.to_string()))
    }

    fn exclusivity_refusal(ledger: &ProgressionLedger, node: &PerkNode) -> Option<AllocationRefusal> {
        if !node.perk_type.is_active_ability() {
            return None;
        }
        ledger
            .current_active_ability()
            .filter(|held| held.node_id != node.id)
            .map(|held| AllocationRefusal::ActiveAbilityConflict {
                held: held.node_id.clone(),
            })
    }

    /// Spend points on a node
    pub fn allocate(&self, ledger: &mut ProgressionLedger, node_id: &str) -> Result<AllocationOutcome, AllocationRefusal> {
        if Self::is_held_active(ledger, node_id) {
            return Ok(AllocationOutcome::AlreadyHeld);
        }

        let node = self.check_allocation(ledger, node_id).map_err(|refusal| {
            tracing::debug!("Actor {} cannot allocate {}: {}", ledger.actor(), node_id, refusal);
            refusal
        })?;

        ledger.insert_allocation(PerkAllocation {
            node_id: node.id.clone(),
            school: node.school,
            perk_type: node.perk_type,
            points_invested: node.point_cost,
            active: true,
        });

        tracing::debug!(
            "Actor {} allocated {} ({} points, {} left in {})",
            ledger.actor(),
            node.id,
            node.point_cost,
            ledger.available_points(node.school),
            node.school
        );

        Ok(AllocationOutcome::Allocated {
            cost: node.point_cost,
        })
    }

    /// Allocated nodes that list `node_id` as a prerequisite
    pub fn allocated_dependents(&self, ledger: &ProgressionLedger, node_id: &str) -> Vec<String> {
        let mut dependents: Vec<String> = ledger
            .all_allocated_perks()
            .filter(|a| {
                self.catalog
                    .node(&a.node_id)
                    .is_some_and(|n| n.requires(node_id))
            })
            .map(|a| a.node_id.clone())
            .collect();
        dependents.sort_unstable();
        dependents
    }

    /// Refund a node; returns the points given back
    ///
    /// Refused while any allocated node depends on it. There is no cascade.
    pub fn deallocate(&self, ledger: &mut ProgressionLedger, node_id: &str) -> Result<u32, DeallocationRefusal> {
        if !ledger.is_perk_allocated(node_id) {
            return Err(DeallocationRefusal::NotAllocated(node_id.to_string()));
        }

        let dependents = self.allocated_dependents(ledger, node_id);
        if !dependents.is_empty() {
            tracing::debug!("Actor {} cannot deallocate {}: required by {:?}", ledger.actor(), node_id, dependents);
            return Err(DeallocationRefusal::HasDependents(dependents));
        }

        let removed = ledger
            .remove_allocation(node_id)
            .ok_or_else(|| DeallocationRefusal::NotAllocated(node_id.to_string()))?;

        tracing::debug!(
            "Actor {} deallocated {} (refunded {})",
            ledger.actor(),
            node_id,
            removed.points_invested
        );
        Ok(removed.points_invested)
    }
}
