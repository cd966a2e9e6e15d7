//! Integration tests for point budgets, allocation and exclusivity

use perk_progression::persistence::MemoryStore;
use perk_progression::perks::{CatalogHandle, PerkCatalog, PerkType};
use perk_progression::progression::{
    AllocationEngine, AllocationOutcome, AllocationRefusal, DeallocationRefusal,
    NoExternalRequirements, ProgressionLedger,
};
use perk_progression::{ActorId, LedgerStore, ProgressionConfig, School};

const A_AND_B: &str = r#"
    {"id": "A", "perk": "PASSIVE_FIRE_THORNS", "tier": 1, "pointCost": 2, "category": "PASSIVE", "amount": 0.1},
    {"id": "B", "perk": "PASSIVE_FIRE_THORNS", "tier": 2, "pointCost": 2, "category": "PASSIVE", "amount": 0.2, "prerequisites": ["A"]}
"#;

const FILLER: &str = r#"
    {"id": "tap_1", "perk": "PASSIVE_MANA_TAP", "tier": 1, "pointCost": 1, "category": "PASSIVE", "amount": 0.1},
    {"id": "tap_2", "perk": "PASSIVE_MANA_TAP", "tier": 2, "pointCost": 1, "category": "PASSIVE", "amount": 0.2}
"#;

fn fire_tree(entries: &[&str]) -> PerkCatalog {
    let document = format!(r#"{{"perks": [{}]}}"#, entries.join(","));
    let (catalog, report) = PerkCatalog::load_documents([(School::Fire, document.as_str())]);
    assert!(report.is_clean(), "{:?}", report);
    catalog
}

fn assert_budget(ledger: &ProgressionLedger) {
    for school in School::ALL {
        assert_eq!(
            ledger.available_points(school),
            ledger.school_points(school) - ledger.allocated_cost(school)
        );
    }
}

/// Scenario 1: overshooting a school's cap clamps to its node count
#[test]
fn test_add_points_clamped_to_node_count() {
    let extra = r#"{"id": "tap_1", "perk": "PASSIVE_MANA_TAP", "tier": 1, "pointCost": 1, "category": "PASSIVE", "amount": 0.1}"#;
    let catalog = fire_tree(&[A_AND_B, extra]);
    let mut ledger = ProgressionLedger::new(ActorId::new());

    assert_eq!(catalog.max_points(School::Fire), 3);
    assert_eq!(ledger.add_school_points(&catalog, School::Fire, 10), 3);
    assert_eq!(ledger.school_points(School::Fire), 3);
    assert_eq!(ledger.available_points(School::Fire), 3);

    ledger.set_school_points(&catalog, School::Fire, 1_000);
    assert_eq!(ledger.school_points(School::Fire), 3);
}

/// Scenario 2: prerequisites first, then the budget runs out
#[test]
fn test_prerequisite_then_budget() {
    let catalog = fire_tree(&[A_AND_B, FILLER]);
    let engine = AllocationEngine::new(&catalog, &NoExternalRequirements);
    let mut ledger = ProgressionLedger::new(ActorId::new());
    ledger.add_school_points(&catalog, School::Fire, 3);

    assert_eq!(
        engine.allocate(&mut ledger, "B"),
        Err(AllocationRefusal::MissingPrerequisites(vec!["A".into()]))
    );
    assert_eq!(engine.allocate(&mut ledger, "A"), Ok(AllocationOutcome::Allocated { cost: 2 }));
    assert_eq!(ledger.available_points(School::Fire), 1);
    assert_eq!(
        engine.allocate(&mut ledger, "B"),
        Err(AllocationRefusal::InsufficientPoints { needed: 2, available: 1 })
    );
    assert!(!ledger.is_perk_allocated("B"));
    assert_budget(&ledger);
}

/// Scenario 3: dependents block refunds until they are refunded themselves
#[test]
fn test_deallocate_in_dependency_order() {
    let catalog = fire_tree(&[A_AND_B, FILLER]);
    let engine = AllocationEngine::new(&catalog, &NoExternalRequirements);
    let mut ledger = ProgressionLedger::new(ActorId::new());
    ledger.add_school_points(&catalog, School::Fire, 4);

    engine.allocate(&mut ledger, "A").unwrap();
    engine.allocate(&mut ledger, "B").unwrap();
    assert_eq!(ledger.available_points(School::Fire), 0);

    assert_eq!(
        engine.deallocate(&mut ledger, "A"),
        Err(DeallocationRefusal::HasDependents(vec!["B".into()]))
    );
    assert!(ledger.is_perk_allocated("A"));
    assert_eq!(ledger.available_points(School::Fire), 0);

    assert_eq!(engine.deallocate(&mut ledger, "B"), Ok(2));
    assert_eq!(engine.deallocate(&mut ledger, "A"), Ok(2));
    assert_eq!(ledger.available_points(School::Fire), 4);
    assert_budget(&ledger);
}

/// Scenario 4: one active ability across all schools
#[test]
fn test_active_ability_exclusive_across_schools() {
    let fire = r#"{"perks": [
        {"id": "X", "perk": "ACTIVE_FIRE_DASH", "tier": 1, "pointCost": 1, "category": "ACTIVE",
         "manaCost": 0.3, "cooldown": 200, "dashLength": 6.0, "dashDuration": 0.4},
        {"id": "fire_filler", "perk": "PASSIVE_FIRE_THORNS", "tier": 1, "pointCost": 1, "category": "PASSIVE", "amount": 0.1}
    ]}"#;
    let air = r#"{"perks": [
        {"id": "Y", "perk": "ACTIVE_AIR_DASH", "tier": 1, "pointCost": 1, "category": "ACTIVE",
         "manaCost": 0.3, "cooldown": 200, "dashLength": 6.0, "dashDuration": 0.4}
    ]}"#;
    let (catalog, _) = PerkCatalog::load_documents([(School::Fire, fire), (School::Air, air)]);
    let engine = AllocationEngine::new(&catalog, &NoExternalRequirements);
    let mut ledger = ProgressionLedger::new(ActorId::new());
    ledger.add_school_points(&catalog, School::Fire, 2);
    ledger.add_school_points(&catalog, School::Air, 1);

    assert!(engine.allocate(&mut ledger, "X").is_ok());
    assert_eq!(ledger.available_points(School::Fire), 1);

    assert_eq!(
        engine.allocate(&mut ledger, "Y"),
        Err(AllocationRefusal::ActiveAbilityConflict { held: "X".into() })
    );
    assert_eq!(ledger.available_points(School::Air), 1);

    assert!(engine.can_allocate(&ledger, "X"));
    assert_eq!(engine.allocate(&mut ledger, "X"), Ok(AllocationOutcome::AlreadyHeld));
    assert_eq!(ledger.available_points(School::Fire), 1);
    assert_eq!(
        ledger
            .all_allocated_perks()
            .filter(|a| a.perk_type.is_active_ability())
            .count(),
        1
    );
}

/// The same flows driven through the session store
#[test]
fn test_store_entry_points() {
    let catalog = fire_tree(&[A_AND_B, FILLER]);
    let mut store = LedgerStore::new(
        CatalogHandle::new(catalog),
        MemoryStore::new(),
        &ProgressionConfig::default(),
    );
    let actor = ActorId::new();

    assert!(!store.has_any_available_points(actor));
    assert_eq!(store.add_school_points(actor, School::Fire, 3), 3);
    assert!(store.has_any_available_points(actor));
    assert!(store.can_allocate(actor, "A", &NoExternalRequirements));
    assert!(!store.can_allocate(actor, "B", &NoExternalRequirements));

    store.allocate(actor, "A", &NoExternalRequirements).unwrap();
    let refusals = store.allocation_refusals(actor, "B", &NoExternalRequirements);
    assert_eq!(
        refusals,
        vec![AllocationRefusal::InsufficientPoints { needed: 2, available: 1 }]
    );

    let tap = store.active_perk(actor, PerkType::PassiveManaTap).unwrap();
    assert_eq!((tap.school, tap.tier), (School::Fire, 2));
    assert_eq!(store.active_perk(actor, PerkType::PassiveColdWalker), None);
}
