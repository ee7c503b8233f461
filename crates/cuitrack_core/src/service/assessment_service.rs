//! Assessment use-case service.
//!
//! # Responsibility
//! - Resolve objective ids against the active catalog before mutating.
//! - Route remediation entries per eligibility classification.
//! - Drive revision migration fail-closed.
//!
//! # Invariants
//! - Mutating calls return aggregates recomputed from the post-mutation
//!   state; callers never need to re-derive manually.
//! - No mutation happens when the required catalog is unavailable.

use crate::catalog::{CatalogError, CatalogProvider};
use crate::migration::{migrate_assessment, MigrationReport};
use crate::model::assessment::{AssessmentState, ObjectiveStatus, RemediationEntry};
use crate::model::catalog::{CatalogLevel, CatalogRevision, Control, Family};
use crate::policy::{classify_control, PoamEligibility, PolicyBaseline};
use crate::port::{PersistencePort, StorageError};
use crate::repo::assessment_store::{load_state, AssessmentStore};
use crate::scoring::{
    self, FamilyDeduction, FamilyStatusCounts, ScoreSummary,
};
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors surfaced by the mutation API.
#[derive(Debug)]
pub enum ServiceError {
    Catalog(CatalogError),
    Storage(StorageError),
    /// Objective id not present in the active catalog.
    UnknownObjective(String),
    /// Control id not present in the active catalog.
    UnknownControl(String),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Catalog(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::UnknownObjective(id) => write!(f, "unknown objective id: {id}"),
            Self::UnknownControl(id) => write!(f, "unknown control id: {id}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Catalog(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::UnknownObjective(_) | Self::UnknownControl(_) => None,
        }
    }
}

impl From<CatalogError> for ServiceError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<StorageError> for ServiceError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Which store received a remediation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RemediationRouting {
    /// Deferral recorded; `high_value_warning` flags advisory risk.
    Poam { high_value_warning: bool },
    /// Deferral forbidden; remediation required before credit.
    Deficiency,
}

/// Per-family reporting row for export consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyReport {
    pub family_id: String,
    pub family_name: String,
    pub counts: FamilyStatusCounts,
    pub not_assessed: usize,
    pub deduction: FamilyDeduction,
}

/// Mutation API facade over catalog provider, policy baseline, assessment
/// store and persistence port.
pub struct AssessmentService<'p, P: CatalogProvider> {
    provider: P,
    baseline: PolicyBaseline,
    level: CatalogLevel,
    store: AssessmentStore,
    port: &'p dyn PersistencePort,
}

impl<'p, P: CatalogProvider> AssessmentService<'p, P> {
    /// Creates a service with an empty store. Call [`reload`] to pick up
    /// previously persisted state.
    ///
    /// [`reload`]: AssessmentService::reload
    pub fn new(
        provider: P,
        port: &'p dyn PersistencePort,
        level: CatalogLevel,
        revision: CatalogRevision,
    ) -> Self {
        Self {
            provider,
            baseline: PolicyBaseline::default(),
            level,
            store: AssessmentStore::new(revision),
            port,
        }
    }

    /// Replaces the default policy baseline (versioned regulatory sets).
    pub fn with_baseline(mut self, baseline: PolicyBaseline) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn revision(&self) -> CatalogRevision {
        self.store.revision()
    }

    /// Read-only state access for export consumers.
    pub fn state(&self) -> &AssessmentState {
        self.store.state()
    }

    /// Recorded status for an objective; `None` means not assessed.
    pub fn status_of(&self, objective_id: &str) -> Option<ObjectiveStatus> {
        self.store.status_of(objective_id)
    }

    /// Eligibility badge classification for one control.
    pub fn classify(&self, control_id: &str) -> Result<PoamEligibility, ServiceError> {
        let catalog = self.provider.catalog(self.level, self.store.revision())?;
        let control = find_control(catalog, control_id)
            .ok_or_else(|| ServiceError::UnknownControl(control_id.to_string()))?;
        Ok(classify_control(control, &self.baseline))
    }

    /// Applies a status button press and returns fresh aggregates.
    ///
    /// Pressing the currently stored status toggles the objective back to
    /// not-assessed. When an objective under a never-deferrable control
    /// transitions to not-met/partial, any stray POA&M entry for it is
    /// moved into the deficiency store.
    pub fn set_objective_status(
        &mut self,
        objective_id: &str,
        status: ObjectiveStatus,
    ) -> Result<ScoreSummary, ServiceError> {
        let catalog = self.provider.catalog(self.level, self.store.revision())?;
        let (family, control) = locate_objective(catalog, objective_id)
            .ok_or_else(|| ServiceError::UnknownObjective(objective_id.to_string()))?;
        let eligibility = classify_control(control, &self.baseline);
        let control_id = control.id.clone();
        let family_id = family.id.clone();

        self.store
            .set_status(objective_id, status, &control_id, &family_id);

        let is_gap = self.store.status_of(objective_id)
            == Some(status) && matches!(status, ObjectiveStatus::NotMet | ObjectiveStatus::Partial);
        if is_gap && eligibility.routes_to_deficiency() {
            self.store.demote_poam_entry(objective_id);
        }

        Ok(scoring::score_summary(
            catalog,
            self.store.state(),
            &self.baseline,
        ))
    }

    /// Stores or clears a free-form implementation note for an objective.
    pub fn save_implementation_note(
        &mut self,
        objective_id: &str,
        note: &str,
    ) -> Result<(), ServiceError> {
        let catalog = self.provider.catalog(self.level, self.store.revision())?;
        if locate_objective(catalog, objective_id).is_none() {
            return Err(ServiceError::UnknownObjective(objective_id.to_string()));
        }
        self.store.set_implementation_note(objective_id, note);
        Ok(())
    }

    /// Records remediation documentation, routed by the owning control's
    /// eligibility classification. Reports which store received it.
    pub fn save_remediation_entry(
        &mut self,
        entry: RemediationEntry,
    ) -> Result<RemediationRouting, ServiceError> {
        let catalog = self.provider.catalog(self.level, self.store.revision())?;
        let (_, control) = locate_objective(catalog, &entry.objective_id)
            .ok_or_else(|| ServiceError::UnknownObjective(entry.objective_id.clone()))?;
        let eligibility = classify_control(control, &self.baseline);

        info!(
            "event=remediation_entry module=service status=ok objective={} eligibility={}",
            entry.objective_id,
            eligibility.as_key()
        );

        if eligibility.routes_to_deficiency() {
            self.store.upsert_deficiency_entry(entry);
            return Ok(RemediationRouting::Deficiency);
        }
        self.store.upsert_poam_entry(entry);
        Ok(RemediationRouting::Poam {
            high_value_warning: eligibility == PoamEligibility::HighValueWarning,
        })
    }

    /// Merges assessment data recorded under `source_revision` into the
    /// active store.
    ///
    /// Fail-closed: when the destination catalog is unavailable nothing is
    /// mutated and the error is reported. The merged result is not
    /// persisted automatically; call [`save`] afterwards.
    ///
    /// [`save`]: AssessmentService::save
    pub fn migrate_revision(
        &mut self,
        source_revision: CatalogRevision,
    ) -> Result<MigrationReport, ServiceError> {
        let dest_catalog = self.provider.catalog(self.level, self.store.revision())?;
        let source_state = load_state(self.port, source_revision)?;
        let report = migrate_assessment(&source_state, self.store.state_mut(), dest_catalog);
        Ok(report)
    }

    /// Persists the active store through the port. In-memory state is kept
    /// intact on failure.
    pub fn save(&self) -> Result<(), ServiceError> {
        self.store.save(self.port).map_err(Into::into)
    }

    /// Replaces in-memory state with the persisted snapshot (empty when
    /// missing or malformed).
    pub fn reload(&mut self) -> Result<(), ServiceError> {
        self.store.load(self.port).map_err(Into::into)
    }

    /// Current aggregate bundle without mutation.
    pub fn score_summary(&self) -> Result<ScoreSummary, ServiceError> {
        let catalog = self.provider.catalog(self.level, self.store.revision())?;
        Ok(scoring::score_summary(
            catalog,
            self.store.state(),
            &self.baseline,
        ))
    }

    /// Per-family reporting rows for export consumers.
    pub fn family_report(&self) -> Result<Vec<FamilyReport>, ServiceError> {
        let catalog = self.provider.catalog(self.level, self.store.revision())?;
        let state = self.store.state();
        Ok(catalog
            .iter()
            .map(|family| {
                let counts = scoring::family_status_counts(family, state);
                let total = scoring::family_objective_total(family);
                FamilyReport {
                    family_id: family.id.clone(),
                    family_name: family.name.clone(),
                    counts,
                    not_assessed: counts.not_assessed(total),
                    deduction: scoring::family_sprs(family, state),
                }
            })
            .collect())
    }
}

fn locate_objective<'a>(
    catalog: &'a [Family],
    objective_id: &str,
) -> Option<(&'a Family, &'a Control)> {
    catalog.iter().find_map(|family| {
        family
            .controls
            .iter()
            .find(|control| {
                control
                    .objectives
                    .iter()
                    .any(|objective| objective.id == objective_id)
            })
            .map(|control| (family, control))
    })
}

fn find_control<'a>(catalog: &'a [Family], control_id: &str) -> Option<&'a Control> {
    catalog
        .iter()
        .flat_map(|family| family.controls.iter())
        .find(|control| control.id == control_id)
}
