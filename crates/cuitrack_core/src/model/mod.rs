//! Domain model for catalog reference data and assessment state.
//!
//! # Responsibility
//! - Define canonical data structures used by scoring, eligibility and
//!   migration logic.
//! - Keep reference data (catalog) and mutable state (assessment) in
//!   clearly separated shapes.
//!
//! # Invariants
//! - Catalog structures are immutable at runtime once constructed.
//! - Assessment state holds at most one record per objective identifier.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod assessment;
pub mod catalog;
