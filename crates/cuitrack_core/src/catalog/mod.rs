//! Catalog provider contracts and JSON-backed registry.
//!
//! # Responsibility
//! - Provide deterministic `(level, revision) -> Family[]` lookup.
//! - Decode and validate catalog documents once at registration time.
//!
//! # Invariants
//! - A registered catalog is never mutated afterwards.
//! - Consumers must treat `CatalogError::Unavailable` as fail-closed: no
//!   scoring or migration against a missing catalog.
//!
//! # See also
//! - docs/architecture/catalog-data.md

use crate::model::catalog::{CatalogLevel, CatalogRevision, Family};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod reference;

/// Bracket suffix shape appended to a control id to form an objective id.
static OBJECTIVE_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[[a-z]{1,2}\]$").expect("objective suffix pattern must compile"));

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Reference-data errors. `Unavailable` is fatal to the requesting
/// operation only; decode errors reject the whole document.
#[derive(Debug)]
pub enum CatalogError {
    Unavailable {
        level: CatalogLevel,
        revision: CatalogRevision,
    },
    Decode(String),
    InvalidObjectiveId {
        control_id: String,
        objective_id: String,
    },
    InvalidPointValue {
        control_id: String,
    },
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable { level, revision } => {
                write!(f, "no catalog registered for level {level} revision {revision}")
            }
            Self::Decode(message) => write!(f, "catalog document rejected: {message}"),
            Self::InvalidObjectiveId {
                control_id,
                objective_id,
            } => write!(
                f,
                "objective id `{objective_id}` does not extend control id `{control_id}`"
            ),
            Self::InvalidPointValue { control_id } => {
                write!(f, "control `{control_id}` declares a zero point value")
            }
        }
    }
}

impl Error for CatalogError {}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

/// Read-only catalog lookup consumed by scoring, eligibility and migration.
pub trait CatalogProvider {
    fn catalog(&self, level: CatalogLevel, revision: CatalogRevision) -> CatalogResult<&[Family]>;
}

/// On-disk/embedded catalog document shape.
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    level: CatalogLevel,
    revision: CatalogRevision,
    families: Vec<Family>,
}

/// In-memory catalog registry keyed by (level, revision).
#[derive(Debug, Default)]
pub struct StaticCatalogProvider {
    entries: BTreeMap<(CatalogLevel, CatalogRevision), Vec<Family>>,
}

impl StaticCatalogProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a validated family tree for one (level, revision) pair.
    /// Later registrations for the same pair replace earlier ones.
    pub fn register(
        &mut self,
        level: CatalogLevel,
        revision: CatalogRevision,
        families: Vec<Family>,
    ) -> CatalogResult<()> {
        validate_families(&families)?;
        self.entries.insert((level, revision), families);
        Ok(())
    }

    /// Decodes one JSON catalog document and registers it.
    pub fn register_json(&mut self, json: &str) -> CatalogResult<(CatalogLevel, CatalogRevision)> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        self.register(document.level, document.revision, document.families)?;
        Ok((document.level, document.revision))
    }
}

impl CatalogProvider for StaticCatalogProvider {
    fn catalog(&self, level: CatalogLevel, revision: CatalogRevision) -> CatalogResult<&[Family]> {
        self.entries
            .get(&(level, revision))
            .map(Vec::as_slice)
            .ok_or(CatalogError::Unavailable { level, revision })
    }
}

fn validate_families(families: &[Family]) -> CatalogResult<()> {
    for family in families {
        for control in &family.controls {
            if control.point_value == 0 {
                return Err(CatalogError::InvalidPointValue {
                    control_id: control.id.clone(),
                });
            }
            for objective in &control.objectives {
                if objective.id == control.id {
                    continue;
                }
                let suffix = objective.id.strip_prefix(control.id.as_str());
                let valid = matches!(suffix, Some(rest) if OBJECTIVE_SUFFIX_RE.is_match(rest));
                if !valid {
                    return Err(CatalogError::InvalidObjectiveId {
                        control_id: control.id.clone(),
                        objective_id: objective.id.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}
