//! Control catalog reference model.
//!
//! # Responsibility
//! - Define the family -> control -> objective tree for one catalog
//!   revision and assessment level.
//! - Resolve optional reference fields once at construction instead of at
//!   every call site.
//!
//! # Invariants
//! - Identifiers are stable across calls for one (level, revision) pair so
//!   assessment records keyed by objective id stay valid.
//! - `point_value` is always >= 1 after decode (`1` when unspecified).
//!
//! # See also
//! - docs/architecture/catalog-data.md

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Assessment scope: the Level 1 basic-safeguarding subset or the full
/// Level 2 CUI requirement set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogLevel {
    L1,
    L2,
}

impl CatalogLevel {
    /// Stable key used in log events and persistence namespacing.
    pub fn as_key(self) -> &'static str {
        match self {
            Self::L1 => "l1",
            Self::L2 => "l2",
        }
    }
}

impl Display for CatalogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_key())
    }
}

/// Catalog taxonomy revision. The two revisions have partially overlapping
/// but non-identical identifier spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogRevision {
    Rev2,
    Rev3,
}

impl CatalogRevision {
    /// Stable key used in log events and persistence namespacing.
    pub fn as_key(self) -> &'static str {
        match self {
            Self::Rev2 => "rev2",
            Self::Rev3 => "rev3",
        }
    }
}

impl Display for CatalogRevision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_key())
    }
}

/// How a control relates to its counterpart in the prior revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Carried over without identifier or substance changes.
    #[serde(rename = "none")]
    Unchanged,
    /// Introduced by this revision; no prior counterpart exists.
    New,
    /// Same lineage, materially strengthened requirement text.
    Enhanced,
    /// Same lineage under a different identifier (split/merge included).
    Renumbered,
}

/// Single assessment objective (determinative statement) under a control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    /// Control id plus optional bracket suffix, e.g. `3.1.1[a]`.
    pub id: String,
    pub text: String,
}

impl Objective {
    /// Returns the bracket suffix including brackets (`[a]`), or `None`
    /// when the objective id is the bare control id.
    pub fn suffix(&self) -> Option<&str> {
        let start = self.id.find('[')?;
        self.id.get(start..)
    }
}

/// Security requirement with scoring weight and revision lineage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    pub id: String,
    pub name: String,
    /// Score deduction incurred while any objective is not fully met.
    #[serde(default = "default_point_value")]
    pub point_value: u32,
    /// Reference-data override forcing deficiency routing for this control.
    #[serde(default)]
    pub never_deferrable: bool,
    /// Identifier of the counterpart control in the prior revision, when
    /// one exists. Drives assessment migration.
    #[serde(default)]
    pub prior_revision_id: Option<String>,
    #[serde(default)]
    pub change_kind: Option<ChangeKind>,
    pub objectives: Vec<Objective>,
}

fn default_point_value() -> u32 {
    1
}

impl Control {
    /// Whether this control participates in scoring at all.
    ///
    /// A control without objectives can never be counted as met and never
    /// incurs a deduction.
    pub fn is_scoreable(&self) -> bool {
        !self.objectives.is_empty()
    }
}

/// Top-level catalog grouping (e.g. Access Control).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    pub id: String,
    pub name: String,
    pub controls: Vec<Control>,
}
