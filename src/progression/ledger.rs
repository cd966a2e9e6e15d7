//! Per-actor progression state
//!
//! The ledger owns an actor's earned points, what they have spent them on,
//! and the derived tier index. Every mutation re-derives available points
//! from the allocations rather than adjusting them incrementally:
//! `available[s] = school_points[s] - sum(cost of allocations in s)`.

use crate::core::types::{ActorId, School};
use crate::perks::{PerkCatalog, PerkNode, PerkType};
use crate::progression::tier_index::{PerkChange, PerkReference, TierActivationIndex};
use ahash::{AHashMap, AHashSet};
use serde::Serialize;

/// A node an actor has spent points on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerkAllocation {
    pub node_id: String,
    pub school: School,
    pub perk_type: PerkType,
    /// Cost of the node when it was allocated
    pub points_invested: u32,
    /// Whether the effect is switched on
    pub active: bool,
}

/// Mutable progression record for one actor
#[derive(Debug, Clone)]
pub struct ProgressionLedger {
    actor: ActorId,
    school_points: [u32; 8],
    available_points: [u32; 8],
    allocated: AHashMap<String, PerkAllocation>,
    /// Mirrors `allocated` keys for prerequisite checks
    unlocked: AHashSet<String>,
    /// Percentage progress towards the next points, 0 to 100
    school_progress: [f32; 8],
    tier_index: TierActivationIndex,
    /// Index changes not yet consumed by effect code
    pending_changes: Vec<PerkChange>,
    dirty: bool,
}

impl ProgressionLedger {
    /// Fresh ledger: no points, nothing allocated
    pub fn new(actor: ActorId) -> Self {
        Self {
            actor,
            school_points: [0; 8],
            available_points: [0; 8],
            allocated: AHashMap::new(),
            unlocked: AHashSet::new(),
            school_progress: [0.0; 8],
            tier_index: TierActivationIndex::new(),
            pending_changes: Vec::new(),
            dirty: false,
        }
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    // === POINTS ===

    pub fn school_points(&self, school: School) -> u32 {
        self.school_points[school.index()]
    }

    pub fn available_points(&self, school: School) -> u32 {
        self.available_points[school.index()]
    }

    /// Earned points summed over every school
    pub fn total_points(&self) -> u32 {
        self.school_points.iter().sum()
    }

    pub fn has_any_available_points(&self) -> bool {
        self.available_points.iter().any(|&p| p > 0)
    }

    /// Points tied up in allocations of one school
    pub fn allocated_cost(&self, school: School) -> u32 {
        self.allocated_perks_for_school(school)
            .map(|a| a.points_invested)
            .sum()
    }

    /// Earn up to `delta` points in a school, never past its cap
    ///
    /// Returns the number of points actually applied.
    pub fn add_school_points(&mut self, catalog: &PerkCatalog, school: School, delta: u32) -> u32 {
        let current = self.school_points(school);
        let headroom = catalog.max_points(school).saturating_sub(current);
        let applied = delta.min(headroom);
        if applied == 0 {
            return 0;
        }

        self.school_points[school.index()] = current + applied;
        self.points_changed(catalog, school);
        tracing::debug!(
            "Actor {} gained {} {} points ({} total)",
            self.actor,
            applied,
            school,
            current + applied
        );
        applied
    }

    /// Overwrite a school's points, clamped to `[0, max_points]`
    pub fn set_school_points(&mut self, catalog: &PerkCatalog, school: School, value: i64) {
        let max = catalog.max_points(school);
        let clamped = value.clamp(0, i64::from(max)) as u32;
        self.school_points[school.index()] = clamped;

        if clamped < self.allocated_cost(school) {
            tracing::warn!(
                "Actor {} {} points set to {} below {} already invested; no points available until respec",
                self.actor,
                school,
                clamped,
                self.allocated_cost(school)
            );
        }

        self.points_changed(catalog, school);
    }

    fn points_changed(&mut self, catalog: &PerkCatalog, school: School) {
        self.recompute_available(school);
        self.rebuild_index(catalog);
        self.dirty = true;
    }

    pub(crate) fn recompute_available(&mut self, school: School) {
        let invested = self.allocated_cost(school);
        self.available_points[school.index()] = self.school_points(school).saturating_sub(invested);
    }

    // === PROGRESS ===

    /// Percentage progress in a school, 0 to 100
    pub fn school_progress(&self, school: School) -> f32 {
        self.school_progress[school.index()]
    }

    /// Add percentage progress and award any points it crosses
    ///
    /// Progress caps at 100%, which corresponds to the school's max points.
    /// Returns the points awarded.
    pub fn add_school_progress(&mut self, catalog: &PerkCatalog, school: School, percentage: f32) -> u32 {
        let current = self.school_progress(school);
        let progress = (current + percentage.max(0.0)).min(100.0);
        self.school_progress[school.index()] = progress;
        if progress != current {
            self.dirty = true;
        }

        let max = catalog.max_points(school);
        if max == 0 {
            tracing::warn!("No perks defined for {}, progress cannot award points", school);
            return 0;
        }

        let earned = ((progress / 100.0) * max as f32).floor() as u32;
        let awarded = earned.saturating_sub(self.school_points(school));
        if awarded == 0 {
            return 0;
        }

        let applied = self.add_school_points(catalog, school, awarded);
        tracing::info!(
            "Actor {} reached {:.1}% in {}: awarded {} points",
            self.actor,
            progress,
            school,
            applied
        );
        applied
    }

    pub(crate) fn set_school_progress(&mut self, school: School, percentage: f32) {
        self.school_progress[school.index()] = percentage.clamp(0.0, 100.0);
    }

    // === ALLOCATIONS ===

    pub fn is_perk_allocated(&self, node_id: &str) -> bool {
        self.allocated.contains_key(node_id)
    }

    pub fn is_unlocked(&self, node_id: &str) -> bool {
        self.unlocked.contains(node_id)
    }

    /// Prerequisites of `node` this ledger does not satisfy
    ///
    /// A prerequisite that is not a node of `node`'s own school is never
    /// satisfied, whatever the actor holds elsewhere.
    pub fn unmet_prerequisites(&self, catalog: &PerkCatalog, node: &PerkNode) -> Vec<String> {
        node.prerequisites
            .iter()
            .filter(|p| {
                let same_school = catalog.node(p).is_some_and(|n| n.school == node.school);
                !same_school || !self.is_unlocked(p)
            })
            .cloned()
            .collect()
    }

    pub fn allocated_perk(&self, node_id: &str) -> Option<&PerkAllocation> {
        self.allocated.get(node_id)
    }

    pub fn allocated_perks_for_school(&self, school: School) -> impl Iterator<Item = &PerkAllocation> {
        self.allocated.values().filter(move |a| a.school == school)
    }

    pub fn all_allocated_perks(&self) -> impl Iterator<Item = &PerkAllocation> {
        self.allocated.values()
    }

    pub fn unlocked_nodes(&self) -> impl Iterator<Item = &str> {
        self.unlocked.iter().map(String::as_str)
    }

    /// The allocated node from the exclusive active-ability group, if any
    pub fn current_active_ability(&self) -> Option<&PerkAllocation> {
        self.allocated
            .values()
            .find(|a| a.perk_type.is_active_ability())
    }

    /// Record an allocation and keep the unlocked set and budget in step
    pub(crate) fn insert_allocation(&mut self, allocation: PerkAllocation) {
        let school = allocation.school;
        self.unlocked.insert(allocation.node_id.clone());
        self.allocated.insert(allocation.node_id.clone(), allocation);
        self.recompute_available(school);
        self.dirty = true;
    }

    pub(crate) fn remove_allocation(&mut self, node_id: &str) -> Option<PerkAllocation> {
        let removed = self.allocated.remove(node_id)?;
        self.unlocked.remove(node_id);
        self.recompute_available(removed.school);
        self.dirty = true;
        Some(removed)
    }

    /// Remove every allocation in `school`, returning them
    pub(crate) fn clear_school(&mut self, school: School) -> Vec<PerkAllocation> {
        let ids: Vec<String> = self
            .allocated_perks_for_school(school)
            .map(|a| a.node_id.clone())
            .collect();

        let mut removed: Vec<PerkAllocation> = ids
            .iter()
            .filter_map(|id| {
                self.unlocked.remove(id);
                self.allocated.remove(id)
            })
            .collect();
        removed.sort_by(|a, b| a.node_id.cmp(&b.node_id));

        self.recompute_available(school);
        if !removed.is_empty() {
            self.dirty = true;
        }
        removed
    }

    // === TIER INDEX ===

    /// Winning reference for a perk type, if any school activates it
    pub fn active_perk(&self, perk_type: PerkType) -> Option<PerkReference> {
        self.tier_index.get(perk_type)
    }

    pub fn active_perks(&self) -> impl Iterator<Item = PerkReference> + '_ {
        self.tier_index.iter()
    }

    pub fn tier_index(&self) -> &TierActivationIndex {
        &self.tier_index
    }

    /// Recompute the tier index and queue any changes
    pub fn rebuild_index(&mut self, catalog: &PerkCatalog) {
        let changes = self.tier_index.rebuild(catalog, &self.school_points);
        self.pending_changes.extend(changes);
    }

    /// Index changes since the last drain, oldest first
    pub fn drain_perk_changes(&mut self) -> Vec<PerkChange> {
        std::mem::take(&mut self.pending_changes)
    }

    // === DIRTY TRACKING ===

    /// Has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub(crate) fn school_points_table(&self) -> &[u32; 8] {
        &self.school_points
    }

    pub(crate) fn replace_pending_changes(&mut self, changes: Vec<PerkChange>) {
        self.pending_changes = changes;
    }

    pub(crate) fn raw_set_school_points(&mut self, school: School, value: u32) {
        self.school_points[school.index()] = value;
    }
}
