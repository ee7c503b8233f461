//! Assessment state model: status records and remediation entries.
//!
//! # Responsibility
//! - Define the mutable state written by the single interactive user.
//! - Keep "not assessed" as key absence, never as a stored status value.
//!
//! # Invariants
//! - At most one `AssessmentRecord` per objective id.
//! - POA&M and deficiency stores are mutually exclusive per objective id.
//!
//! # See also
//! - docs/architecture/data-model.md

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Recorded conformance state for one objective.
///
/// Absence of a record is the fourth, implicit state ("not assessed").
/// Encoding it as key absence keeps invalid status strings from silently
/// skewing aggregate counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectiveStatus {
    Met,
    Partial,
    NotMet,
}

impl ObjectiveStatus {
    /// Stable key used in log events and export payloads.
    pub fn as_key(self) -> &'static str {
        match self {
            Self::Met => "met",
            Self::Partial => "partial",
            Self::NotMet => "not-met",
        }
    }
}

impl Display for ObjectiveStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_key())
    }
}

/// Risk rating attached to a remediation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

/// One recorded status for one objective. The only state carrying a
/// modification timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub objective_id: String,
    pub status: ObjectiveStatus,
    /// Unix epoch milliseconds of the last direct user action.
    pub updated_at_ms: i64,
    pub control_id: String,
    pub family_id: String,
}

/// Remediation documentation for a not-met/partial objective.
///
/// The same shape backs both the POA&M store (deferred remediation) and the
/// deficiency store (remediation required before credit); which store holds
/// the entry is decided by eligibility classification of the owning control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationEntry {
    pub objective_id: String,
    pub control_id: String,
    pub weakness: String,
    pub remediation_plan: String,
    /// Planned completion date, ISO-8601 calendar date.
    pub scheduled_date: String,
    pub responsible_party: String,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub cost: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Full mutable assessment state for one catalog revision.
///
/// Owned by a single component and passed by reference to scoring,
/// eligibility and migration logic; there are no ambient globals. `BTreeMap`
/// keeps iteration deterministic for export consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentState {
    pub records: BTreeMap<String, AssessmentRecord>,
    pub poam_entries: BTreeMap<String, RemediationEntry>,
    pub deficiency_entries: BTreeMap<String, RemediationEntry>,
    pub implementation_notes: BTreeMap<String, String>,
}

impl AssessmentState {
    /// Recorded status for an objective; `None` means not assessed.
    pub fn status_of(&self, objective_id: &str) -> Option<ObjectiveStatus> {
        self.records.get(objective_id).map(|record| record.status)
    }

    /// Whether no user data of any kind has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
            && self.poam_entries.is_empty()
            && self.deficiency_entries.is_empty()
            && self.implementation_notes.is_empty()
    }
}
