//! Which tier of each perk type an actor currently benefits from
//!
//! Tier gating is driven by school points, not by allocations: holding
//! `n` points in a school activates every catalog entry of that school
//! with tier `<= n`. For each perk type only the best tier across all
//! schools counts.

use crate::core::types::School;
use crate::perks::{PerkCatalog, PerkType};
use ahash::AHashMap;
use serde::Serialize;

/// The winning (school, tier) for one perk type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PerkReference {
    pub perk_type: PerkType,
    pub school: School,
    pub tier: u32,
}

/// An entry of the index that changed during a rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerkChange {
    pub perk_type: PerkType,
    pub old: Option<PerkReference>,
    pub new: Option<PerkReference>,
}

impl PerkChange {
    pub fn is_gained(&self) -> bool {
        self.old.is_none() && self.new.is_some()
    }

    pub fn is_lost(&self) -> bool {
        self.old.is_some() && self.new.is_none()
    }
}

/// Derived cache: perk type -> active reference
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierActivationIndex {
    active: AHashMap<PerkType, PerkReference>,
}

impl TierActivationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the index from scratch for the given point totals
    pub fn compute(catalog: &PerkCatalog, school_points: &[u32; 8]) -> Self {
        let mut active = AHashMap::new();

        for perk_type in PerkType::ALL {
            let mut best: Option<PerkReference> = None;

            for school in School::ALL {
                let ceiling = school_points[school.index()].min(catalog.max_tier(school));
                let candidate = (1..=ceiling)
                    .rev()
                    .find(|&tier| catalog.node_by_key(school, perk_type, tier).is_some());

                if let Some(tier) = candidate {
                    // Strictly higher only: on a tie the earlier school keeps it
                    if best.map_or(true, |b| tier > b.tier) {
                        best = Some(PerkReference {
                            perk_type,
                            school,
                            tier,
                        });
                    }
                }
            }

            if let Some(reference) = best {
                active.insert(perk_type, reference);
            }
        }

        Self { active }
    }

    /// Replace the index and report what changed, in perk type order
    pub fn rebuild(&mut self, catalog: &PerkCatalog, school_points: &[u32; 8]) -> Vec<PerkChange> {
        let next = Self::compute(catalog, school_points);

        let changes = PerkType::ALL
            .into_iter()
            .filter_map(|perk_type| {
                let old = self.get(perk_type);
                let new = next.get(perk_type);
                (old != new).then_some(PerkChange { perk_type, old, new })
            })
            .collect();

        *self = next;
        changes
    }

    pub fn get(&self, perk_type: PerkType) -> Option<PerkReference> {
        self.active.get(&perk_type).copied()
    }

    /// Active references in perk type order
    pub fn iter(&self) -> impl Iterator<Item = PerkReference> + '_ {
        PerkType::ALL.into_iter().filter_map(move |t| self.get(t))
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> PerkCatalog {
        let fire = r#"{"perks": [
            {"id": "f1", "perk": "PASSIVE_MANA_TAP", "tier": 1, "pointCost": 1, "category": "PASSIVE", "amount": 1},
            {"id": "f3", "perk": "PASSIVE_MANA_TAP", "tier": 3, "pointCost": 1, "category": "PASSIVE", "amount": 3},
            {"id": "f_pad", "perk": "PASSIVE_FIRE_THORNS", "tier": 1, "pointCost": 1, "category": "PASSIVE", "amount": 1}
        ]}"#;
        let water = r#"{"perks": [
            {"id": "w2", "perk": "PASSIVE_MANA_TAP", "tier": 2, "pointCost": 1, "category": "PASSIVE", "amount": 2},
            {"id": "w3", "perk": "PASSIVE_MANA_TAP", "tier": 3, "pointCost": 1, "category": "PASSIVE", "amount": 3},
            {"id": "w_pad", "perk": "PASSIVE_HYDRATION", "tier": 1, "pointCost": 1, "category": "PASSIVE", "amount": 1, "time": 10}
        ]}"#;
        PerkCatalog::load_documents([(School::Fire, fire), (School::Water, water)]).0
    }

    fn points(fire: u32, water: u32) -> [u32; 8] {
        let mut p = [0; 8];
        p[School::Fire.index()] = fire;
        p[School::Water.index()] = water;
        p
    }

    #[test]
    fn test_highest_tier_across_schools() {
        let index = TierActivationIndex::compute(&catalog(), &points(1, 2));
        let tap = index.get(PerkType::PassiveManaTap).unwrap();
        assert_eq!((tap.school, tap.tier), (School::Water, 2));
    }

    #[test]
    fn test_scan_skips_missing_tiers() {
        // Fire has no tier 2 entry; two points still activate tier 1
        let index = TierActivationIndex::compute(&catalog(), &points(2, 0));
        let tap = index.get(PerkType::PassiveManaTap).unwrap();
        assert_eq!((tap.school, tap.tier), (School::Fire, 1));
    }

    #[test]
    fn test_tie_goes_to_first_school() {
        let index = TierActivationIndex::compute(&catalog(), &points(3, 3));
        let tap = index.get(PerkType::PassiveManaTap).unwrap();
        assert_eq!((tap.school, tap.tier), (School::Fire, 3));
    }

    #[test]
    fn test_zero_points_activates_nothing() {
        let index = TierActivationIndex::compute(&catalog(), &[0; 8]);
        assert!(index.is_empty());
    }

    #[test]
    fn test_rebuild_reports_changes() {
        let catalog = catalog();
        let mut index = TierActivationIndex::new();

        let changes = index.rebuild(&catalog, &points(1, 0));
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(PerkChange::is_gained));

        let changes = index.rebuild(&catalog, &points(1, 0));
        assert!(changes.is_empty());

        let changes = index.rebuild(&catalog, &points(0, 2));
        let lost: Vec<_> = changes.iter().filter(|c| c.is_lost()).map(|c| c.perk_type).collect();
        assert_eq!(lost, [PerkType::PassiveFireThorns]);
        let tap = changes
            .iter()
            .find(|c| c.perk_type == PerkType::PassiveManaTap)
            .unwrap();
        assert_eq!(tap.new.map(|r| r.school), Some(School::Water));
        assert_eq!(index.len(), 2);
    }
}
