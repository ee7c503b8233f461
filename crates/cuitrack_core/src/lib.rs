//! Core compliance-state and scoring engine for CUITrack.
//! This crate is the single source of truth for assessment invariants.

pub mod catalog;
pub mod db;
pub mod logging;
pub mod migration;
pub mod model;
pub mod policy;
pub mod port;
pub mod repo;
pub mod scoring;
pub mod service;

pub use catalog::{CatalogError, CatalogProvider, CatalogResult, StaticCatalogProvider};
pub use logging::{default_log_level, init_logging, logging_status};
pub use migration::{migrate_assessment, MigrationReport};
pub use model::assessment::{
    AssessmentRecord, AssessmentState, ObjectiveStatus, RemediationEntry, RiskLevel,
};
pub use model::catalog::{CatalogLevel, CatalogRevision, ChangeKind, Control, Family, Objective};
pub use policy::{classify_control, PoamEligibility, PolicyBaseline};
pub use port::{MemoryPort, PersistencePort, SqlitePort, StorageError};
pub use repo::assessment_store::{load_state, state_key, AssessmentStore};
pub use scoring::{
    control_is_fully_met, controls_met, family_objective_total, family_sprs,
    family_status_counts, level_one_controls_met, score_summary, total_sprs, FamilyDeduction,
    FamilyStatusCounts, LevelOneSummary, ScoreSummary, SPRS_MAX_SCORE,
};
pub use service::assessment_service::{
    AssessmentService, FamilyReport, RemediationRouting, ServiceError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
