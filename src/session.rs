//! Resident ledgers for the actors currently in a session
//!
//! The store is the host's single entry point: it loads a ledger the first
//! time an actor is referenced, routes every mutation through the engine
//! types, and writes dirty ledgers back on leave and at shutdown. Storage
//! failures are logged and never surface to callers; an actor whose ledger
//! cannot be read simply starts fresh.

use crate::core::config::{GainConfig, ProgressionConfig};
use crate::core::types::{ActorId, School};
use crate::perks::{CatalogHandle, PerkCatalog, PerkType};
use crate::persistence::PersistenceAdapter;
use crate::progression::allocation::{AllocationEngine, AllocationOutcome, AllocationRefusal, DeallocationRefusal};
use crate::progression::gain;
use crate::progression::ledger::ProgressionLedger;
use crate::progression::oracles::{AffordabilityOracle, ExternalUnlockOracle, NoExternalRequirements};
use crate::progression::respec::{RespecRefusal, RespecService, RespecSummary};
use crate::progression::tier_index::{PerkChange, PerkReference};
use ahash::AHashMap;
use std::sync::Arc;

/// Session-scoped cache of progression ledgers keyed by actor
pub struct LedgerStore<P: PersistenceAdapter> {
    catalog: CatalogHandle,
    adapter: P,
    respec: RespecService,
    gain: GainConfig,
    ledgers: AHashMap<ActorId, ProgressionLedger>,
}

impl<P: PersistenceAdapter> LedgerStore<P> {
    pub fn new(catalog: CatalogHandle, adapter: P, config: &ProgressionConfig) -> Self {
        Self {
            catalog,
            adapter,
            respec: RespecService::new(config.respec),
            gain: config.gain,
            ledgers: AHashMap::new(),
        }
    }

    /// Snapshot of the catalog currently in force
    pub fn catalog(&self) -> Arc<PerkCatalog> {
        self.catalog.current()
    }

    pub fn catalog_handle(&self) -> &CatalogHandle {
        &self.catalog
    }

    pub fn adapter(&self) -> &P {
        &self.adapter
    }

    pub fn respec_service(&self) -> &RespecService {
        &self.respec
    }

    // === LIFECYCLE ===

    /// Make the actor's ledger resident, loading it if needed
    pub fn on_join(&mut self, actor: ActorId) -> &mut ProgressionLedger {
        if !self.ledgers.contains_key(&actor) {
            let ledger = self.hydrate(actor);
            self.ledgers.insert(actor, ledger);
        }
        self.ledgers.entry(actor).or_insert_with(|| ProgressionLedger::new(actor))
    }

    fn hydrate(&self, actor: ActorId) -> ProgressionLedger {
        let catalog = self.catalog.current();

        match self.adapter.load(actor) {
            Ok(Some(record)) => {
                let (ledger, report) = ProgressionLedger::from_record(actor, &record, &catalog);
                if !report.is_clean() {
                    tracing::warn!("Actor {} ledger repaired on load: {:?}", actor, report);
                }
                ledger
            }
            Ok(None) => {
                tracing::debug!("Actor {} has no saved progression, starting fresh", actor);
                ProgressionLedger::new(actor)
            }
            Err(e) => {
                tracing::error!("Failed to load progression for actor {}: {}; starting fresh", actor, e);
                ProgressionLedger::new(actor)
            }
        }
    }

    /// Flush the actor's ledger if dirty and evict it
    pub fn on_leave(&mut self, actor: ActorId) {
        if let Some(mut ledger) = self.ledgers.remove(&actor) {
            Self::flush_ledger(&mut self.adapter, &mut ledger);
        }
    }

    /// Write one resident ledger if it has unsaved changes
    ///
    /// Returns whether a save succeeded.
    pub fn flush(&mut self, actor: ActorId) -> bool {
        match self.ledgers.get_mut(&actor) {
            Some(ledger) => Self::flush_ledger(&mut self.adapter, ledger),
            None => false,
        }
    }

    /// Write every dirty resident ledger; returns how many were saved
    pub fn flush_all(&mut self) -> usize {
        let mut saved = 0;
        for ledger in self.ledgers.values_mut() {
            if Self::flush_ledger(&mut self.adapter, ledger) {
                saved += 1;
            }
        }
        saved
    }

    /// Final flush of everything still resident, then evict all
    pub fn shutdown(&mut self) {
        let saved = self.flush_all();
        let resident = self.ledgers.len();
        self.ledgers.clear();
        tracing::info!("Progression store shut down: {} of {} ledgers saved", saved, resident);
    }

    fn flush_ledger(adapter: &mut P, ledger: &mut ProgressionLedger) -> bool {
        if !ledger.is_dirty() {
            return false;
        }
        match adapter.save(ledger.actor(), &ledger.to_record()) {
            Ok(()) => {
                ledger.mark_clean();
                true
            }
            Err(e) => {
                tracing::error!("Failed to save progression for actor {}: {}", ledger.actor(), e);
                false
            }
        }
    }

    pub fn is_resident(&self, actor: ActorId) -> bool {
        self.ledgers.contains_key(&actor)
    }

    pub fn resident_count(&self) -> usize {
        self.ledgers.len()
    }

    /// Resident ledger, without loading
    pub fn ledger(&self, actor: ActorId) -> Option<&ProgressionLedger> {
        self.ledgers.get(&actor)
    }

    /// Ledger for the actor, loading it on first reference
    pub fn ledger_mut(&mut self, actor: ActorId) -> &mut ProgressionLedger {
        self.on_join(actor)
    }

    // === POINTS ===

    pub fn add_school_points(&mut self, actor: ActorId, school: School, delta: u32) -> u32 {
        let catalog = self.catalog.current();
        self.ledger_mut(actor).add_school_points(&catalog, school, delta)
    }

    pub fn set_school_points(&mut self, actor: ActorId, school: School, value: i64) {
        let catalog = self.catalog.current();
        self.ledger_mut(actor).set_school_points(&catalog, school, value);
    }

    pub fn add_school_progress(&mut self, actor: ActorId, school: School, percentage: f32) -> u32 {
        let catalog = self.catalog.current();
        self.ledger_mut(actor).add_school_progress(&catalog, school, percentage)
    }

    /// Whether the actor has unspent points in any school
    pub fn has_any_available_points(&mut self, actor: ActorId) -> bool {
        self.ledger_mut(actor).has_any_available_points()
    }

    /// Turn a spell cast's mana cost into school progress
    ///
    /// Returns the points awarded, usually zero.
    pub fn record_spell_cast(&mut self, actor: ActorId, school: School, mana: f32) -> u32 {
        let catalog = self.catalog.current();
        let gain_config = self.gain;
        let ledger = self.ledger_mut(actor);

        if ledger.school_points(school) >= catalog.max_points(school) {
            tracing::debug!("Actor {} already at max points in {}", actor, school);
            return 0;
        }

        let increase = gain::percentage_increase(
            mana,
            ledger.school_progress(school),
            ledger.total_points(),
            &gain_config,
        );
        ledger.add_school_progress(&catalog, school, increase)
    }

    // === ALLOCATION ===

    pub fn can_allocate(&mut self, actor: ActorId, node_id: &str, unlocks: &dyn ExternalUnlockOracle) -> bool {
        let catalog = self.catalog.current();
        let ledger = self.ledger_mut(actor);
        AllocationEngine::new(&catalog, unlocks).can_allocate(ledger, node_id)
    }

    pub fn allocation_refusals(
        &mut self,
        actor: ActorId,
        node_id: &str,
        unlocks: &dyn ExternalUnlockOracle,
    ) -> Vec<AllocationRefusal> {
        let catalog = self.catalog.current();
        let ledger = self.ledger_mut(actor);
        AllocationEngine::new(&catalog, unlocks).allocation_refusals(ledger, node_id)
    }

    pub fn allocate(
        &mut self,
        actor: ActorId,
        node_id: &str,
        unlocks: &dyn ExternalUnlockOracle,
    ) -> Result<AllocationOutcome, AllocationRefusal> {
        let catalog = self.catalog.current();
        let ledger = self.ledger_mut(actor);
        AllocationEngine::new(&catalog, unlocks).allocate(ledger, node_id)
    }

    pub fn deallocate(&mut self, actor: ActorId, node_id: &str) -> Result<u32, DeallocationRefusal> {
        let catalog = self.catalog.current();
        let ledger = self.ledger_mut(actor);
        // Deallocation never consults external requirements
        AllocationEngine::new(&catalog, &NoExternalRequirements).deallocate(ledger, node_id)
    }

    pub fn respec_school(
        &mut self,
        actor: ActorId,
        school: School,
        oracle: &mut dyn AffordabilityOracle,
    ) -> Result<RespecSummary, RespecRefusal> {
        let service = self.respec;
        service.respec_school(self.ledger_mut(actor), school, oracle)
    }

    pub fn respec_all(
        &mut self,
        actor: ActorId,
        oracle: &mut dyn AffordabilityOracle,
    ) -> Result<RespecSummary, RespecRefusal> {
        let service = self.respec;
        service.respec_all(self.ledger_mut(actor), oracle)
    }

    // === EFFECTS ===

    /// Tier of `perk_type` the actor currently benefits from
    pub fn active_perk(&mut self, actor: ActorId, perk_type: PerkType) -> Option<PerkReference> {
        self.ledger_mut(actor).active_perk(perk_type)
    }

    pub fn drain_perk_changes(&mut self, actor: ActorId) -> Vec<PerkChange> {
        self.ledgers
            .get_mut(&actor)
            .map(ProgressionLedger::drain_perk_changes)
            .unwrap_or_default()
    }

    // === RELOAD ===

    /// Publish a new catalog and re-validate every resident ledger against it
    pub fn reload_catalog(&mut self, catalog: PerkCatalog) {
        let catalog = self.catalog.publish(catalog);

        let actors: Vec<ActorId> = self.ledgers.keys().copied().collect();
        for actor in actors {
            if let Some(ledger) = self.ledgers.remove(&actor) {
                let (ledger, report) = ledger.reconcile(&catalog);
                if !report.is_clean() {
                    tracing::warn!("Actor {} ledger repaired after catalog reload: {:?}", actor, report);
                }
                self.ledgers.insert(actor, ledger);
            }
        }
    }
}
