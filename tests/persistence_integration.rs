//! Integration tests for saving, loading and repairing ledgers

use perk_progression::persistence::{
    AllocationRecord, JsonFileStore, LedgerRecord, MemoryStore, PersistenceAdapter,
    PersistenceError,
};
use perk_progression::perks::{CatalogHandle, PerkCatalog};
use perk_progression::progression::{AllocationEngine, NoExternalRequirements, ProgressionLedger};
use perk_progression::{ActorId, LedgerStore, ProgressionConfig, School};

fn catalog() -> PerkCatalog {
    let fire = r#"{"perks": [
        {"id": "f1", "perk": "PASSIVE_FIRE_THORNS", "tier": 1, "pointCost": 1, "category": "PASSIVE", "amount": 0.1},
        {"id": "f2", "perk": "PASSIVE_FIRE_THORNS", "tier": 2, "pointCost": 1, "category": "PASSIVE", "amount": 0.2, "prerequisites": ["f1"]},
        {"id": "f3", "perk": "PASSIVE_MANA_TAP", "tier": 1, "pointCost": 1, "category": "PASSIVE", "amount": 0.1}
    ]}"#;
    let water = r#"{"perks": [
        {"id": "w1", "perk": "PASSIVE_HYDRATION", "tier": 1, "pointCost": 1, "category": "PASSIVE", "amount": 1, "time": 100},
        {"id": "w2", "perk": "ACTIVE_ICE_BLAST", "tier": 2, "pointCost": 1, "category": "ACTIVE",
         "manaCost": 0.4, "cooldown": 300, "damage": 8.0, "freezeTime": 100, "radius": 6.0, "prerequisites": ["w1"]}
    ]}"#;
    PerkCatalog::load_documents([(School::Fire, fire), (School::Water, water)]).0
}

fn populated_ledger(catalog: &PerkCatalog) -> ProgressionLedger {
    let engine = AllocationEngine::new(catalog, &NoExternalRequirements);
    let mut ledger = ProgressionLedger::new(ActorId::new());
    ledger.add_school_points(catalog, School::Fire, 3);
    ledger.add_school_points(catalog, School::Water, 2);
    ledger.add_school_progress(catalog, School::Water, 12.5);
    for id in ["f1", "f2", "w1", "w2"] {
        engine.allocate(&mut ledger, id).unwrap();
    }
    ledger
}

#[test]
fn test_round_trip_preserves_ledger() {
    let catalog = catalog();
    let ledger = populated_ledger(&catalog);
    let record = ledger.to_record();

    let json = serde_json::to_string(&record).unwrap();
    let parsed: LedgerRecord = serde_json::from_str(&json).unwrap();
    let (restored, report) = ProgressionLedger::from_record(ledger.actor(), &parsed, &catalog);

    assert!(report.is_clean());
    assert_eq!(restored.to_record(), record);
    assert_eq!(restored.tier_index(), ledger.tier_index());
    assert_eq!(
        restored.current_active_ability().map(|a| a.node_id.as_str()),
        Some("w2")
    );
    for school in School::ALL {
        assert_eq!(restored.available_points(school), ledger.available_points(school));
    }
}

/// Scenario 5: a node removed from the catalog is dropped on load
#[test]
fn test_ghost_node_dropped_on_load() {
    let catalog = catalog();
    let mut record = populated_ledger(&catalog).to_record();
    record.allocated_perks.push(AllocationRecord {
        node_id: "ghost".into(),
        points_invested: 1,
        active: true,
    });
    record.unlocked_nodes.push("ghost".into());

    let (ledger, report) = ProgressionLedger::from_record(ActorId::new(), &record, &catalog);
    assert_eq!(report.dropped_allocations, vec!["ghost".to_string()]);
    assert!(!ledger.is_perk_allocated("ghost"));
    assert!(!ledger.is_unlocked("ghost"));
    for id in ["f1", "f2", "w1", "w2"] {
        assert!(ledger.is_perk_allocated(id), "{} should survive", id);
    }
    assert_eq!(ledger.available_points(School::Fire), 1);
    assert!(ledger.is_dirty());
}

#[test]
fn test_file_store_through_session() {
    let dir = tempfile::tempdir().unwrap();
    let config = ProgressionConfig {
        save_dir: dir.path().join("progression"),
        ..ProgressionConfig::default()
    };
    let handle = CatalogHandle::new(catalog());
    let actor = ActorId::new();

    let mut store = LedgerStore::new(handle.clone(), JsonFileStore::new(&config.save_dir), &config);
    store.add_school_points(actor, School::Fire, 2);
    store.allocate(actor, "f1", &NoExternalRequirements).unwrap();
    store.shutdown();

    let saved = dir.path().join("progression").join(format!("{}.json", actor));
    let text = std::fs::read_to_string(&saved).unwrap();
    assert!(text.contains("\"allocatedPerks\""));
    assert!(text.contains("\"nodeId\": \"f1\""));

    let mut store = LedgerStore::new(handle, JsonFileStore::new(&config.save_dir), &config);
    let ledger = store.on_join(actor);
    assert!(ledger.is_perk_allocated("f1"));
    assert_eq!(ledger.school_points(School::Fire), 2);
    assert_eq!(ledger.available_points(School::Fire), 1);
}

#[test]
fn test_corrupt_save_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let files = JsonFileStore::new(dir.path());
    let actor = ActorId::new();
    std::fs::write(files.path_for(actor), "{\"schoolPoints\": ").unwrap();
    assert!(matches!(files.load(actor), Err(PersistenceError::Json(_))));

    let mut store = LedgerStore::new(
        CatalogHandle::new(catalog()),
        files,
        &ProgressionConfig::default(),
    );
    let ledger = store.on_join(actor);
    assert_eq!(ledger.total_points(), 0);
    assert_eq!(ledger.all_allocated_perks().count(), 0);
}

#[test]
fn test_legacy_namespaced_record() {
    let json = r#"{
        "schoolPoints": {"ars_nouveau:elemental_fire": 2, "ars_nouveau:elemental_water": 1},
        "availablePoints": {"ars_nouveau:elemental_fire": 1},
        "allocatedPerks": [{"nodeId": "f1", "pointsInvested": 1, "isActive": true}],
        "unlockedNodes": ["f1"]
    }"#;
    let record: LedgerRecord = serde_json::from_str(json).unwrap();

    let mut memory = MemoryStore::new();
    let actor = ActorId::new();
    memory.insert(actor, record);

    let mut store = LedgerStore::new(
        CatalogHandle::new(catalog()),
        memory,
        &ProgressionConfig::default(),
    );
    let ledger = store.on_join(actor);
    assert_eq!(ledger.school_points(School::Fire), 2);
    assert_eq!(ledger.school_points(School::Water), 1);
    assert_eq!(ledger.available_points(School::Fire), 1);

    // Rewritten with short ids on the next save
    let record = ledger.to_record();
    assert_eq!(
        record.school_points.get("fire").copied(),
        Some(2),
        "{:?}",
        record.school_points
    );
    assert!(record.school_points.keys().all(|k| !k.contains(':')));
    assert_eq!(record.school_points.len(), School::ALL.len());
}
