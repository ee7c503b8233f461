//! End-to-end service flows against the embedded reference catalogs.

use cuitrack_core::catalog::reference;
use cuitrack_core::{
    AssessmentService, AssessmentStore, CatalogError, CatalogLevel, CatalogProvider,
    CatalogRevision, MemoryPort, ObjectiveStatus, PoamEligibility, RemediationEntry,
    RemediationRouting, RiskLevel, ServiceError, StaticCatalogProvider, SPRS_MAX_SCORE,
};

fn entry(objective_id: &str) -> RemediationEntry {
    RemediationEntry {
        objective_id: objective_id.to_string(),
        control_id: objective_id.split('[').next().unwrap().to_string(),
        weakness: "requirement not yet implemented".to_string(),
        remediation_plan: "implement and verify before next assessment".to_string(),
        scheduled_date: "2026-12-15".to_string(),
        responsible_party: "Compliance Lead".to_string(),
        risk_level: RiskLevel::High,
        cost: None,
        notes: None,
    }
}

fn level_two_service(port: &MemoryPort) -> AssessmentService<'_, StaticCatalogProvider> {
    AssessmentService::new(
        reference::builtin().unwrap(),
        port,
        CatalogLevel::L2,
        CatalogRevision::Rev2,
    )
}

#[test]
fn empty_assessment_scores_below_zero_at_level_two() {
    let port = MemoryPort::new();
    let service = level_two_service(&port);

    let provider = reference::builtin().unwrap();
    let catalog = provider
        .catalog(CatalogLevel::L2, CatalogRevision::Rev2)
        .unwrap();
    let full_deduction: i32 = catalog
        .iter()
        .flat_map(|family| family.controls.iter())
        .map(|control| control.point_value as i32)
        .sum();

    let summary = service.score_summary().unwrap();
    assert_eq!(summary.total_sprs, SPRS_MAX_SCORE - full_deduction);
    assert!(summary.total_sprs < 0);
    assert_eq!(summary.controls_met, 0);
    assert_eq!(summary.total_controls, 110);
    assert_eq!(summary.level_one.met, 0);
    assert_eq!(summary.level_one.total, 17);
}

#[test]
fn mutating_calls_return_fresh_aggregates() {
    let port = MemoryPort::new();
    let mut service = level_two_service(&port);
    let baseline_score = service.score_summary().unwrap().total_sprs;

    // 3.1.3 is a one-point control with three objectives.
    let after_two = {
        service
            .set_objective_status("3.1.3[a]", ObjectiveStatus::Met)
            .unwrap();
        service
            .set_objective_status("3.1.3[b]", ObjectiveStatus::Met)
            .unwrap()
    };
    assert_eq!(after_two.total_sprs, baseline_score);

    let after_all = service
        .set_objective_status("3.1.3[c]", ObjectiveStatus::Met)
        .unwrap();
    assert_eq!(after_all.total_sprs, baseline_score + 1);
    assert_eq!(after_all.controls_met, 1);

    // Pressing the stored status again toggles the objective off and the
    // deduction returns.
    let after_toggle = service
        .set_objective_status("3.1.3[c]", ObjectiveStatus::Met)
        .unwrap();
    assert_eq!(after_toggle.total_sprs, baseline_score);
    assert_eq!(service.status_of("3.1.3[c]"), None);
}

#[test]
fn classification_follows_the_shipped_baseline() {
    let port = MemoryPort::new();
    let service = level_two_service(&port);

    assert_eq!(
        service.classify("3.1.1").unwrap(),
        PoamEligibility::NeverDeferrable
    );
    assert_eq!(
        service.classify("3.13.11").unwrap(),
        PoamEligibility::FipsException
    );
    assert_eq!(
        service.classify("3.4.1").unwrap(),
        PoamEligibility::HighValueWarning
    );
    assert_eq!(service.classify("3.1.3").unwrap(), PoamEligibility::Eligible);

    let err = service.classify("9.9.9").unwrap_err();
    assert!(matches!(err, ServiceError::UnknownControl(_)));
}

#[test]
fn remediation_entries_route_by_eligibility() {
    let port = MemoryPort::new();
    let mut service = level_two_service(&port);

    // Level 1 practice: deferral forbidden.
    let routing = service.save_remediation_entry(entry("3.1.1[a]")).unwrap();
    assert_eq!(routing, RemediationRouting::Deficiency);
    assert!(service.state().deficiency_entries.contains_key("3.1.1[a]"));

    // FIPS carve-out: deferrable without the high-value caveat.
    let routing = service.save_remediation_entry(entry("3.13.11[a]")).unwrap();
    assert_eq!(
        routing,
        RemediationRouting::Poam {
            high_value_warning: false
        }
    );

    // Five-point control outside the carve-out: deferrable with caveat.
    let routing = service.save_remediation_entry(entry("3.4.1[a]")).unwrap();
    assert_eq!(
        routing,
        RemediationRouting::Poam {
            high_value_warning: true
        }
    );

    // One-point control: deferrable without caveats.
    let routing = service.save_remediation_entry(entry("3.1.3[a]")).unwrap();
    assert_eq!(
        routing,
        RemediationRouting::Poam {
            high_value_warning: false
        }
    );
}

#[test]
fn stray_poam_under_level_one_control_is_demoted_on_gap() {
    let port = MemoryPort::new();

    // Older persisted data can hold a POA&M entry for a control the
    // current baseline forbids deferring.
    let mut seed = AssessmentStore::new(CatalogRevision::Rev2);
    seed.upsert_poam_entry(entry("3.5.1[a]"));
    seed.save(&port).unwrap();

    let mut service = level_two_service(&port);
    service.reload().unwrap();
    assert!(service.state().poam_entries.contains_key("3.5.1[a]"));

    service
        .set_objective_status("3.5.1[a]", ObjectiveStatus::NotMet)
        .unwrap();
    assert!(!service.state().poam_entries.contains_key("3.5.1[a]"));
    assert!(service.state().deficiency_entries.contains_key("3.5.1[a]"));
}

#[test]
fn unknown_objective_ids_are_rejected_without_mutation() {
    let port = MemoryPort::new();
    let mut service = level_two_service(&port);

    let err = service
        .set_objective_status("9.9.9[z]", ObjectiveStatus::Met)
        .unwrap_err();
    assert!(matches!(err, ServiceError::UnknownObjective(_)));

    let err = service
        .save_implementation_note("9.9.9[z]", "noise")
        .unwrap_err();
    assert!(matches!(err, ServiceError::UnknownObjective(_)));

    assert!(service.state().is_empty());
}

#[test]
fn migration_pulls_prior_revision_data_through_declared_lineage() {
    let port = MemoryPort::new();

    let mut rev2 = AssessmentStore::new(CatalogRevision::Rev2);
    rev2.set_status("3.1.1[a]", ObjectiveStatus::Met, "3.1.1", "AC");
    rev2.set_status("3.4.1[a]", ObjectiveStatus::Met, "3.4.1", "CM");
    rev2.set_status("3.12.4[a]", ObjectiveStatus::Met, "3.12.4", "CA");
    rev2.set_implementation_note("3.1.1[a]", "documented in the access roster");
    rev2.save(&port).unwrap();

    let mut service = AssessmentService::new(
        reference::builtin().unwrap(),
        &port,
        CatalogLevel::L2,
        CatalogRevision::Rev3,
    );
    let report = service.migrate_revision(CatalogRevision::Rev2).unwrap();

    // 3.4.1 split into the baseline-configuration control and the new
    // component-inventory control, so its one record lands twice; the
    // system security plan moved into the Planning family.
    assert_eq!(report.migrated, 4);
    assert_eq!(report.skipped, 0);
    assert_eq!(service.status_of("03.01.01[a]"), Some(ObjectiveStatus::Met));
    assert_eq!(service.status_of("03.04.01[a]"), Some(ObjectiveStatus::Met));
    assert_eq!(service.status_of("03.04.10[a]"), Some(ObjectiveStatus::Met));
    assert_eq!(service.status_of("03.15.02[a]"), Some(ObjectiveStatus::Met));
    assert_eq!(
        service
            .state()
            .implementation_notes
            .get("03.01.01[a]")
            .map(String::as_str),
        Some("documented in the access roster")
    );

    // The merge is not persisted until the caller saves; the source
    // revision's snapshot stays untouched either way.
    service.save().unwrap();
    let rev2_after = cuitrack_core::load_state(&port, CatalogRevision::Rev2).unwrap();
    assert_eq!(rev2_after.status_of("3.1.1[a]"), Some(ObjectiveStatus::Met));
}

#[test]
fn migration_fails_closed_when_the_destination_catalog_is_missing() {
    let port = MemoryPort::new();

    let mut seed = AssessmentStore::new(CatalogRevision::Rev2);
    seed.set_status("3.1.1[a]", ObjectiveStatus::Met, "3.1.1", "AC");
    seed.save(&port).unwrap();

    // Provider with no Rev3 document registered.
    let provider = StaticCatalogProvider::new();
    let mut service =
        AssessmentService::new(provider, &port, CatalogLevel::L2, CatalogRevision::Rev3);

    let err = service.migrate_revision(CatalogRevision::Rev2).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Catalog(CatalogError::Unavailable {
            level: CatalogLevel::L2,
            revision: CatalogRevision::Rev3
        })
    ));
    assert!(service.state().is_empty());
}

#[test]
fn family_report_covers_every_family_with_consistent_counts() {
    let port = MemoryPort::new();
    let mut service = level_two_service(&port);
    service
        .set_objective_status("3.1.1[a]", ObjectiveStatus::Met)
        .unwrap();
    service
        .set_objective_status("3.1.1[b]", ObjectiveStatus::Partial)
        .unwrap();

    let report = service.family_report().unwrap();
    assert_eq!(report.len(), 14);

    let access_control = report
        .iter()
        .find(|row| row.family_id == "AC")
        .unwrap();
    assert_eq!(access_control.counts.met, 1);
    assert_eq!(access_control.counts.partial, 1);
    assert_eq!(access_control.counts.not_met, 0);
    assert!(access_control.deduction.lost <= access_control.deduction.max_possible);

    for row in &report {
        assert!(!row.family_name.is_empty());
        assert!(row.deduction.lost <= row.deduction.max_possible);
        if row.family_id != "AC" {
            assert_eq!(row.counts.assessed(), 0);
            assert_eq!(row.deduction.lost, row.deduction.max_possible);
        }
    }
}

#[test]
fn save_and_reload_round_trip_through_the_service() {
    let port = MemoryPort::new();
    let mut service = level_two_service(&port);
    service
        .set_objective_status("3.1.1[a]", ObjectiveStatus::Met)
        .unwrap();
    service
        .save_implementation_note("3.1.1[a]", "reviewed quarterly")
        .unwrap();
    service.save().unwrap();

    let mut restored = level_two_service(&port);
    assert!(restored.state().is_empty());
    restored.reload().unwrap();
    assert_eq!(restored.status_of("3.1.1[a]"), Some(ObjectiveStatus::Met));
    assert_eq!(
        restored
            .state()
            .implementation_notes
            .get("3.1.1[a]")
            .map(String::as_str),
        Some("reviewed quarterly")
    );
}
