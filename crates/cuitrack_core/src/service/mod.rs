//! Use-case orchestration layer.
//!
//! # Responsibility
//! - Expose the mutation API consumed by UI and export collaborators.
//! - Enforce the recompute contract: every mutating call returns fresh
//!   aggregates.
//!
//! # Invariants
//! - Service APIs never bypass store toggle/exclusivity semantics.
//! - Operations refuse to run against an unavailable catalog.

pub mod assessment_service;
