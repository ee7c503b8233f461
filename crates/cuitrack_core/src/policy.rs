//! POA&M eligibility baseline and control classification.
//!
//! # Responsibility
//! - Classify every control into exactly one deferability category.
//! - Keep the regulatory identifier sets as versioned baseline data rather
//!   than inlined constants.
//!
//! # Invariants
//! - Classification priority is fixed: never-deferrable membership, then
//!   the cryptographic-module carve-out, then point-value weight.
//! - The cryptographic-module control is never classified `NeverDeferrable`
//!   by the shipped baseline.

use crate::model::catalog::Control;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifier of the FIPS-validated-cryptography requirement carved out
/// from the "no deferral above one point" rule.
const FIPS_CONTROL_ID: &str = "3.13.11";

/// The 17 basic-safeguarding practices assessed at Level 1. Regulatory
/// policy forbids deferring any of them via a corrective-action plan.
const LEVEL_ONE_CONTROL_IDS: [&str; 17] = [
    "3.1.1", "3.1.2", "3.1.20", "3.1.22", "3.5.1", "3.5.2", "3.8.3", "3.10.1", "3.10.3",
    "3.10.4", "3.10.5", "3.13.1", "3.13.5", "3.14.1", "3.14.2", "3.14.4", "3.14.5",
];

/// Mutually exclusive deferability categories for a control's gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PoamEligibility {
    /// Gap must be remediated before credit; routed to the deficiency store.
    NeverDeferrable,
    /// Cryptographic-module carve-out; deferral permitted despite weight.
    FipsException,
    /// Deferral permitted but flagged as high risk; advisory only.
    HighValueWarning,
    /// Deferral permitted without caveats.
    Eligible,
}

impl PoamEligibility {
    /// Whether gaps under this classification belong in the deficiency
    /// store instead of the POA&M store.
    pub fn routes_to_deficiency(self) -> bool {
        matches!(self, Self::NeverDeferrable)
    }

    /// Stable key for badge rendering and log events.
    pub fn as_key(self) -> &'static str {
        match self {
            Self::NeverDeferrable => "never-deferrable",
            Self::FipsException => "fips-exception",
            Self::HighValueWarning => "high-value-warning",
            Self::Eligible => "eligible",
        }
    }
}

/// Versioned regulatory identifier sets backing eligibility and the
/// Level 1 tally.
///
/// The shipped default tracks the current federal baseline; deployments
/// pinned to a different rule version load their own copy instead of
/// patching code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyBaseline {
    /// Human-readable baseline identifier, e.g. a rule citation.
    pub version: String,
    /// Controls counted by the Level 1 tally; its size is the tally total.
    pub level_one_ids: BTreeSet<String>,
    /// Controls whose gaps may never be deferred.
    pub never_poam_ids: BTreeSet<String>,
    /// The designated cryptographic-module control.
    pub fips_control_id: String,
}

impl Default for PolicyBaseline {
    fn default() -> Self {
        let level_one: BTreeSet<String> = LEVEL_ONE_CONTROL_IDS
            .iter()
            .map(|id| (*id).to_string())
            .collect();
        Self {
            version: "32cfr170-2024".to_string(),
            never_poam_ids: level_one.clone(),
            level_one_ids: level_one,
            fips_control_id: FIPS_CONTROL_ID.to_string(),
        }
    }
}

/// Classifies one control under the given baseline.
///
/// Categories are checked in priority order; exactly one applies.
pub fn classify_control(control: &Control, baseline: &PolicyBaseline) -> PoamEligibility {
    if control.never_deferrable || baseline.never_poam_ids.contains(&control.id) {
        return PoamEligibility::NeverDeferrable;
    }
    if control.id == baseline.fips_control_id && control.point_value > 1 {
        return PoamEligibility::FipsException;
    }
    if control.point_value > 1 {
        return PoamEligibility::HighValueWarning;
    }
    PoamEligibility::Eligible
}
