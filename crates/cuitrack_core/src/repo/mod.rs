//! State ownership layer.
//!
//! # Responsibility
//! - Own the mutable assessment state and its persistence round trip.
//! - Isolate port/serialization details from service orchestration.
//!
//! # Invariants
//! - Save failures leave in-memory state untouched.
//! - Malformed persisted data is recovered to an empty state, never
//!   propagated.

pub mod assessment_store;
