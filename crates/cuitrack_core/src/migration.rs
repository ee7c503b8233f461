//! Revision migration mapper.
//!
//! # Responsibility
//! - Copy assessment data recorded under one catalog revision into the
//!   identifier space of another, following declared control lineage.
//!
//! # Invariants
//! - The source state is never modified.
//! - Existing destination data always wins; the mapper never overwrites.
//! - Running the mapper twice leaves the destination unchanged after the
//!   first run.

use crate::model::assessment::{AssessmentState, RemediationEntry};
use crate::model::catalog::{Control, Family, Objective};
use log::info;
use serde::Serialize;

/// Outcome counters for one mapper run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Objectives copied from the source identifier space.
    pub migrated: usize,
    /// Destination objectives skipped because data already existed.
    pub skipped: usize,
}

/// Copies recorded statuses from `source` into `dest` under the
/// destination catalog's identifier space.
///
/// For every destination control declaring a `prior_revision_id`, each of
/// its objectives maps to the source objective formed by substituting the
/// prior control id while keeping the bracket suffix (the bare prior id
/// when the objective has no suffix). Controls without lineage are
/// net-new and left untouched.
pub fn migrate_assessment(
    source: &AssessmentState,
    dest: &mut AssessmentState,
    dest_catalog: &[Family],
) -> MigrationReport {
    let mut report = MigrationReport::default();

    for family in dest_catalog {
        for control in &family.controls {
            let Some(prior_id) = control.prior_revision_id.as_deref() else {
                continue;
            };
            for objective in &control.objectives {
                let source_id = match objective.suffix() {
                    Some(suffix) => format!("{prior_id}{suffix}"),
                    None => prior_id.to_string(),
                };

                if dest.records.contains_key(&objective.id) {
                    report.skipped += 1;
                    continue;
                }
                let Some(record) = source.records.get(&source_id) else {
                    continue;
                };

                let mut copied = record.clone();
                copied.objective_id = objective.id.clone();
                copied.control_id = control.id.clone();
                copied.family_id = family.id.clone();
                dest.records.insert(objective.id.clone(), copied);

                if let Some(entry) = source.poam_entries.get(&source_id) {
                    dest.poam_entries
                        .insert(objective.id.clone(), rekey_entry(entry, objective, control));
                }
                if let Some(entry) = source.deficiency_entries.get(&source_id) {
                    dest.deficiency_entries
                        .insert(objective.id.clone(), rekey_entry(entry, objective, control));
                }
                if let Some(note) = source.implementation_notes.get(&source_id) {
                    dest.implementation_notes
                        .insert(objective.id.clone(), note.clone());
                }

                report.migrated += 1;
            }
        }
    }

    info!(
        "event=revision_migrate module=migration status=ok migrated={} skipped={}",
        report.migrated, report.skipped
    );
    report
}

fn rekey_entry(entry: &RemediationEntry, objective: &Objective, control: &Control) -> RemediationEntry {
    let mut copied = entry.clone();
    copied.objective_id = objective.id.clone();
    copied.control_id = control.id.clone();
    copied
}
