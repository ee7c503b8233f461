//! Pure scoring computations over catalog + assessment snapshots.
//!
//! # Responsibility
//! - Compute aggregate statistics, the deduction-based score and
//!   per-family deductions.
//! - Stay side-effect free: every function derives its output from the
//!   inputs passed in, with no caching.
//!
//! # Invariants
//! - A control with zero objectives is never counted as met and never
//!   deducts points.
//! - `FamilyDeduction::lost <= FamilyDeduction::max_possible`.
//! - The score is not clamped; negative values are valid and meaningful.

use crate::model::assessment::{AssessmentState, ObjectiveStatus};
use crate::model::catalog::{Control, Family};
use crate::policy::PolicyBaseline;
use serde::Serialize;

/// Score awarded when every requirement is fully implemented.
pub const SPRS_MAX_SCORE: i32 = 110;

/// Objective counts by recorded status within one family.
///
/// Objectives with no record belong to none of the buckets; they are
/// reported by subtraction against the family's total objective count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FamilyStatusCounts {
    pub met: usize,
    pub partial: usize,
    pub not_met: usize,
}

impl FamilyStatusCounts {
    /// Objectives with any recorded status.
    pub fn assessed(&self) -> usize {
        self.met + self.partial + self.not_met
    }

    /// Remainder against the family's total objective count.
    pub fn not_assessed(&self, total_objectives: usize) -> usize {
        total_objectives.saturating_sub(self.assessed())
    }
}

/// Per-family deduction summary used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FamilyDeduction {
    /// Points currently deducted within the family.
    pub lost: u32,
    /// Sum of point values across the family's controls.
    pub max_possible: u32,
}

/// Level 1 tally. `total` is the baseline set size, independent of what
/// the active catalog contains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LevelOneSummary {
    pub met: usize,
    pub total: usize,
}

/// Aggregate bundle returned by every mutating service call so callers
/// always hold aggregates consistent with the latest mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreSummary {
    pub total_sprs: i32,
    pub controls_met: usize,
    pub total_controls: usize,
    pub level_one: LevelOneSummary,
}

/// True iff the control has at least one objective and every objective is
/// recorded as met.
pub fn control_is_fully_met(control: &Control, state: &AssessmentState) -> bool {
    control.is_scoreable()
        && control
            .objectives
            .iter()
            .all(|objective| state.status_of(&objective.id) == Some(ObjectiveStatus::Met))
}

/// Counts objectives (not controls) by recorded status across one family.
pub fn family_status_counts(family: &Family, state: &AssessmentState) -> FamilyStatusCounts {
    let mut counts = FamilyStatusCounts::default();
    for control in &family.controls {
        for objective in &control.objectives {
            match state.status_of(&objective.id) {
                Some(ObjectiveStatus::Met) => counts.met += 1,
                Some(ObjectiveStatus::Partial) => counts.partial += 1,
                Some(ObjectiveStatus::NotMet) => counts.not_met += 1,
                None => {}
            }
        }
    }
    counts
}

/// Total objective count for one family, assessed or not.
pub fn family_objective_total(family: &Family) -> usize {
    family
        .controls
        .iter()
        .map(|control| control.objectives.len())
        .sum()
}

/// Count of fully met controls across the catalog.
pub fn controls_met(catalog: &[Family], state: &AssessmentState) -> usize {
    catalog
        .iter()
        .flat_map(|family| family.controls.iter())
        .filter(|control| control_is_fully_met(control, state))
        .count()
}

/// Deduction-based score: start at 110 and subtract the point value of
/// every scoreable control that is not fully met.
pub fn total_sprs(catalog: &[Family], state: &AssessmentState) -> i32 {
    let mut score = SPRS_MAX_SCORE;
    for family in catalog {
        for control in &family.controls {
            if control.is_scoreable() && !control_is_fully_met(control, state) {
                score -= control.point_value as i32;
            }
        }
    }
    score
}

/// Per-family deduction report.
pub fn family_sprs(family: &Family, state: &AssessmentState) -> FamilyDeduction {
    let mut deduction = FamilyDeduction::default();
    for control in &family.controls {
        deduction.max_possible += control.point_value;
        if !control_is_fully_met(control, state) {
            deduction.lost += control.point_value;
        }
    }
    deduction
}

/// Tally of fully met Level 1 practices.
///
/// Controls outside the baseline set are excluded even when present in the
/// active catalog; `total` always equals the set size.
pub fn level_one_controls_met(
    catalog: &[Family],
    state: &AssessmentState,
    baseline: &PolicyBaseline,
) -> LevelOneSummary {
    let met = catalog
        .iter()
        .flat_map(|family| family.controls.iter())
        .filter(|control| baseline.level_one_ids.contains(&control.id))
        .filter(|control| control_is_fully_met(control, state))
        .count();
    LevelOneSummary {
        met,
        total: baseline.level_one_ids.len(),
    }
}

/// Full aggregate bundle over the active catalog.
pub fn score_summary(
    catalog: &[Family],
    state: &AssessmentState,
    baseline: &PolicyBaseline,
) -> ScoreSummary {
    let total_controls = catalog.iter().map(|family| family.controls.len()).sum();
    ScoreSummary {
        total_sprs: total_sprs(catalog, state),
        controls_met: controls_met(catalog, state),
        total_controls,
        level_one: level_one_controls_met(catalog, state, baseline),
    }
}
