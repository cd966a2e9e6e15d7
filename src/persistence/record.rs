//! Serialized ledger shape and conversion to and from live ledgers

use crate::core::types::{ActorId, School};
use crate::perks::PerkCatalog;
use crate::progression::ledger::{PerkAllocation, ProgressionLedger};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ledger as stored, keyed by school short id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    #[serde(default)]
    pub school_points: BTreeMap<String, i64>,
    /// Written for external readers; recomputed on load
    #[serde(default)]
    pub available_points: BTreeMap<String, i64>,
    #[serde(default)]
    pub allocated_perks: Vec<AllocationRecord>,
    #[serde(default)]
    pub unlocked_nodes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub school_progress: BTreeMap<String, f32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRecord {
    pub node_id: String,
    pub points_invested: i64,
    #[serde(default = "default_active", alias = "isActive")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// What had to be repaired while hydrating a ledger
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerLoadReport {
    /// School ids that match no known school
    pub unknown_schools: Vec<String>,
    /// Allocations whose node no longer exists in the catalog
    pub dropped_allocations: Vec<String>,
    /// Extra active abilities beyond the first
    pub dropped_active_abilities: Vec<String>,
    /// Schools whose stored points exceeded the current cap
    pub clamped_schools: Vec<School>,
    /// Allocations dropped because a prerequisite was not held
    pub orphaned_allocations: Vec<String>,
    /// Schools whose allocations cost more than their points
    ///
    /// Kept as they are; the school has nothing available until a respec.
    pub overspent_schools: Vec<School>,
}

impl LedgerLoadReport {
    /// Whether nothing had to be repaired
    ///
    /// Overspent schools are reported but not repaired, so they do not count.
    pub fn is_clean(&self) -> bool {
        self.unknown_schools.is_empty()
            && self.dropped_allocations.is_empty()
            && self.dropped_active_abilities.is_empty()
            && self.clamped_schools.is_empty()
            && self.orphaned_allocations.is_empty()
    }
}

fn school_map<T: Copy>(values: impl Iterator<Item = (School, T)>) -> BTreeMap<String, T> {
    values.map(|(school, v)| (school.short_id().to_string(), v)).collect()
}

impl ProgressionLedger {
    /// Snapshot the ledger in its persisted shape
    ///
    /// Allocations and unlocked ids are sorted so equal ledgers produce
    /// identical documents.
    pub fn to_record(&self) -> LedgerRecord {
        let mut allocated_perks: Vec<AllocationRecord> = self
            .all_allocated_perks()
            .map(|a| AllocationRecord {
                node_id: a.node_id.clone(),
                points_invested: i64::from(a.points_invested),
                active: a.active,
            })
            .collect();
        allocated_perks.sort_by(|a, b| a.node_id.cmp(&b.node_id));

        let mut unlocked_nodes: Vec<String> = self.unlocked_nodes().map(str::to_string).collect();
        unlocked_nodes.sort_unstable();

        LedgerRecord {
            school_points: school_map(School::ALL.iter().map(|&s| (s, i64::from(self.school_points(s))))),
            available_points: school_map(School::ALL.iter().map(|&s| (s, i64::from(self.available_points(s))))),
            allocated_perks,
            unlocked_nodes,
            school_progress: school_map(
                School::ALL
                    .iter()
                    .map(|&s| (s, self.school_progress(s)))
                    .filter(|(_, p)| *p > 0.0),
            ),
        }
    }

    /// Rebuild a ledger from its persisted shape
    ///
    /// Unknown schools and allocations of nodes missing from the catalog are
    /// dropped and reported. Available points and the unlocked set are
    /// re-derived from the surviving allocations. The ledger comes back dirty
    /// only if something had to be repaired.
    pub fn from_record(actor: ActorId, record: &LedgerRecord, catalog: &PerkCatalog) -> (ProgressionLedger, LedgerLoadReport) {
        let mut ledger = ProgressionLedger::new(actor);
        let mut report = LedgerLoadReport::default();

        for (id, &points) in &record.school_points {
            let Some(school) = School::from_id(id) else {
                tracing::warn!("Actor {}: skipping points for unknown school '{}'", actor, id);
                report.unknown_schools.push(id.clone());
                continue;
            };

            let max = catalog.max_points(school);
            let stored = points.max(0);
            if stored > i64::from(max) {
                tracing::warn!(
                    "Actor {}: {} points {} exceed cap {}, clamping",
                    actor,
                    school,
                    stored,
                    max
                );
                report.clamped_schools.push(school);
            }
            ledger.raw_set_school_points(school, stored.min(i64::from(max)) as u32);
        }

        for (id, &progress) in &record.school_progress {
            match School::from_id(id) {
                Some(school) => ledger.set_school_progress(school, progress),
                None => {
                    tracing::warn!("Actor {}: skipping progress for unknown school '{}'", actor, id);
                    if !report.unknown_schools.contains(id) {
                        report.unknown_schools.push(id.clone());
                    }
                }
            }
        }

        for entry in &record.allocated_perks {
            let Some(node) = catalog.node(&entry.node_id) else {
                tracing::error!(
                    "Actor {}: dropping allocation of '{}', no such perk node",
                    actor,
                    entry.node_id
                );
                report.dropped_allocations.push(entry.node_id.clone());
                continue;
            };

            if node.perk_type.is_active_ability() {
                if let Some(held) = ledger.current_active_ability() {
                    tracing::warn!(
                        "Actor {}: dropping active ability '{}', already holding '{}'",
                        actor,
                        node.id,
                        held.node_id
                    );
                    report.dropped_active_abilities.push(node.id.clone());
                    continue;
                }
            }

            let points_invested = u32::try_from(entry.points_invested)
                .ok()
                .filter(|p| *p > 0)
                .unwrap_or(node.point_cost);

            ledger.insert_allocation(PerkAllocation {
                node_id: node.id.clone(),
                school: node.school,
                perk_type: node.perk_type,
                points_invested,
                active: entry.active,
            });
        }

        // Dropping one allocation can orphan its own dependents
        loop {
            let mut orphans: Vec<String> = ledger
                .all_allocated_perks()
                .filter(|a| {
                    catalog
                        .node(&a.node_id)
                        .is_some_and(|node| !ledger.unmet_prerequisites(catalog, node).is_empty())
                })
                .map(|a| a.node_id.clone())
                .collect();
            if orphans.is_empty() {
                break;
            }
            orphans.sort_unstable();
            for id in orphans {
                tracing::warn!("Actor {}: dropping allocation of '{}', prerequisites not held", actor, id);
                ledger.remove_allocation(&id);
                report.orphaned_allocations.push(id);
            }
        }

        let stray = record
            .unlocked_nodes
            .iter()
            .filter(|id| !ledger.is_perk_allocated(id))
            .count();
        if stray > 0 {
            tracing::debug!("Actor {}: ignoring {} unlocked ids without an allocation", actor, stray);
        }

        for school in School::ALL {
            ledger.recompute_available(school);
            let invested = ledger.allocated_cost(school);
            if invested > ledger.school_points(school) {
                tracing::warn!(
                    "Actor {}: {} allocations cost {} but only {} points are held",
                    actor,
                    school,
                    invested,
                    ledger.school_points(school)
                );
                report.overspent_schools.push(school);
            }
        }
        ledger.rebuild_index(catalog);

        if report.is_clean() {
            ledger.mark_clean();
        } else {
            ledger.mark_dirty();
        }

        (ledger, report)
    }
}

impl ProgressionLedger {
    /// Re-validate a resident ledger against a newly published catalog
    ///
    /// Unsaved state survives: pending index changes are kept, and the
    /// changes caused by the new catalog itself are queued after them.
    pub fn reconcile(mut self, catalog: &PerkCatalog) -> (ProgressionLedger, LedgerLoadReport) {
        let was_dirty = self.is_dirty();
        let (mut fresh, report) = ProgressionLedger::from_record(self.actor(), &self.to_record(), catalog);

        let mut changes = self.drain_perk_changes();
        let mut previous_index = self.tier_index().clone();
        changes.extend(previous_index.rebuild(catalog, fresh.school_points_table()));
        fresh.replace_pending_changes(changes);

        if was_dirty || !report.is_clean() {
            fresh.mark_dirty();
        }
        (fresh, report)
    }
}
