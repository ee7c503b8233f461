//! Store semantics: status toggling, remediation exclusivity and
//! persistence through the port.

use cuitrack_core::{
    load_state, state_key, AssessmentStore, CatalogRevision, MemoryPort, ObjectiveStatus,
    PersistencePort, RemediationEntry, RiskLevel, StorageError,
};

fn entry(objective_id: &str) -> RemediationEntry {
    RemediationEntry {
        objective_id: objective_id.to_string(),
        control_id: objective_id.split('[').next().unwrap().to_string(),
        weakness: "session lock not configured on shared workstations".to_string(),
        remediation_plan: "roll out the hardened workstation baseline".to_string(),
        scheduled_date: "2026-11-30".to_string(),
        responsible_party: "IT Operations".to_string(),
        risk_level: RiskLevel::Moderate,
        cost: None,
        notes: None,
    }
}

#[test]
fn pressing_the_stored_status_toggles_back_to_not_assessed() {
    let mut store = AssessmentStore::new(CatalogRevision::Rev2);

    store.set_status("3.1.1[a]", ObjectiveStatus::Met, "3.1.1", "AC");
    assert_eq!(store.status_of("3.1.1[a]"), Some(ObjectiveStatus::Met));

    store.set_status("3.1.1[a]", ObjectiveStatus::Met, "3.1.1", "AC");
    assert_eq!(store.status_of("3.1.1[a]"), None);
    assert!(store.record("3.1.1[a]").is_none());
}

#[test]
fn pressing_a_different_status_replaces_the_record() {
    let mut store = AssessmentStore::new(CatalogRevision::Rev2);

    store.set_status("3.1.1[a]", ObjectiveStatus::NotMet, "3.1.1", "AC");
    store.set_status("3.1.1[a]", ObjectiveStatus::Met, "3.1.1", "AC");

    let record = store.record("3.1.1[a]").unwrap();
    assert_eq!(record.status, ObjectiveStatus::Met);
    assert_eq!(record.control_id, "3.1.1");
    assert_eq!(record.family_id, "AC");
    assert!(record.updated_at_ms > 0);
}

#[test]
fn blank_implementation_note_removes_the_entry() {
    let mut store = AssessmentStore::new(CatalogRevision::Rev2);

    store.set_implementation_note("3.1.1[a]", "  enforced via group policy  ");
    assert_eq!(
        store.implementation_note("3.1.1[a]"),
        Some("enforced via group policy")
    );

    store.set_implementation_note("3.1.1[a]", "   ");
    assert_eq!(store.implementation_note("3.1.1[a]"), None);
}

#[test]
fn poam_and_deficiency_stores_stay_mutually_exclusive() {
    let mut store = AssessmentStore::new(CatalogRevision::Rev2);

    store.upsert_poam_entry(entry("3.1.10[a]"));
    assert!(store.state().poam_entries.contains_key("3.1.10[a]"));

    store.upsert_deficiency_entry(entry("3.1.10[a]"));
    assert!(!store.state().poam_entries.contains_key("3.1.10[a]"));
    assert!(store.state().deficiency_entries.contains_key("3.1.10[a]"));

    store.upsert_poam_entry(entry("3.1.10[a]"));
    assert!(store.state().poam_entries.contains_key("3.1.10[a]"));
    assert!(!store.state().deficiency_entries.contains_key("3.1.10[a]"));
}

#[test]
fn demote_moves_a_stray_poam_entry_into_deficiencies() {
    let mut store = AssessmentStore::new(CatalogRevision::Rev2);
    store.upsert_poam_entry(entry("3.5.1[a]"));

    assert!(store.demote_poam_entry("3.5.1[a]"));
    assert!(store.state().poam_entries.is_empty());
    assert!(store.state().deficiency_entries.contains_key("3.5.1[a]"));

    // Nothing left to move.
    assert!(!store.demote_poam_entry("3.5.1[a]"));
}

#[test]
fn save_and_load_round_trip_through_the_port() {
    let port = MemoryPort::new();
    let mut store = AssessmentStore::new(CatalogRevision::Rev2);
    store.set_status("3.1.1[a]", ObjectiveStatus::Met, "3.1.1", "AC");
    store.set_implementation_note("3.1.1[a]", "badge readers at every entrance");
    store.upsert_poam_entry(entry("3.1.10[a]"));
    store.save(&port).unwrap();

    let mut restored = AssessmentStore::new(CatalogRevision::Rev2);
    restored.load(&port).unwrap();
    assert_eq!(restored.state(), store.state());
}

#[test]
fn revisions_persist_under_separate_keys() {
    let port = MemoryPort::new();

    let mut rev2 = AssessmentStore::new(CatalogRevision::Rev2);
    rev2.set_status("3.1.1[a]", ObjectiveStatus::Met, "3.1.1", "AC");
    rev2.save(&port).unwrap();

    let mut rev3 = AssessmentStore::new(CatalogRevision::Rev3);
    rev3.set_status("03.01.01[a]", ObjectiveStatus::NotMet, "03.01.01", "AC");
    rev3.save(&port).unwrap();

    assert_ne!(
        state_key(CatalogRevision::Rev2),
        state_key(CatalogRevision::Rev3)
    );
    assert_eq!(port.len(), 2);

    let rev2_state = load_state(&port, CatalogRevision::Rev2).unwrap();
    assert_eq!(rev2_state.status_of("3.1.1[a]"), Some(ObjectiveStatus::Met));
    assert_eq!(rev2_state.status_of("03.01.01[a]"), None);
}

#[test]
fn missing_persisted_state_loads_as_empty() {
    let port = MemoryPort::new();
    let state = load_state(&port, CatalogRevision::Rev3).unwrap();
    assert!(state.is_empty());
}

#[test]
fn malformed_persisted_state_recovers_as_empty() {
    let port = MemoryPort::new();
    port.set(&state_key(CatalogRevision::Rev2), "{not valid json")
        .unwrap();

    let state = load_state(&port, CatalogRevision::Rev2).unwrap();
    assert!(state.is_empty());
}

#[test]
fn quota_failure_surfaces_and_keeps_memory_state_intact() {
    let port = MemoryPort::with_capacity(32);
    let mut store = AssessmentStore::new(CatalogRevision::Rev2);
    store.set_status("3.1.1[a]", ObjectiveStatus::Met, "3.1.1", "AC");

    let err = store.save(&port).unwrap_err();
    assert!(matches!(err, StorageError::QuotaExceeded { .. }));

    // The failed write must not have clobbered anything in memory.
    assert_eq!(store.status_of("3.1.1[a]"), Some(ObjectiveStatus::Met));
    assert!(port.is_empty());
}
