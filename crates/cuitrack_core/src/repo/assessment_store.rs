//! Assessment store: the single owner of mutable assessment state.
//!
//! # Responsibility
//! - Apply status toggles, remediation entries and implementation notes.
//! - Serialize the full state through the persistence port under a
//!   revision-namespaced key.
//!
//! # Invariants
//! - Setting the currently stored status again deletes the record (back to
//!   not-assessed); it never stores a null status.
//! - POA&M and deficiency stores never both hold an entry for the same
//!   objective id.
//! - `load` substitutes an empty state for missing or malformed data.

use crate::model::assessment::{
    AssessmentRecord, AssessmentState, ObjectiveStatus, RemediationEntry,
};
use crate::model::catalog::CatalogRevision;
use crate::port::{PersistencePort, StorageError};
use log::{info, warn};
use std::time::{SystemTime, UNIX_EPOCH};

const STATE_KEY_PREFIX: &str = "cuitrack::assessment";

/// Persistence key for one revision's assessment state. Namespacing by
/// revision keeps Rev2 and Rev3 data from colliding in the port.
pub fn state_key(revision: CatalogRevision) -> String {
    format!("{STATE_KEY_PREFIX}::{}", revision.as_key())
}

/// Reads one revision's state from the port.
///
/// Missing and malformed payloads both resolve to an empty state; only
/// transport failures are surfaced.
pub fn load_state(
    port: &dyn PersistencePort,
    revision: CatalogRevision,
) -> Result<AssessmentState, StorageError> {
    let key = state_key(revision);
    match port.get(&key)? {
        None => {
            info!(
                "event=state_load module=repo status=empty revision={}",
                revision.as_key()
            );
            Ok(AssessmentState::default())
        }
        Some(raw) => match serde_json::from_str::<AssessmentState>(&raw) {
            Ok(state) => {
                info!(
                    "event=state_load module=repo status=ok revision={} records={}",
                    revision.as_key(),
                    state.records.len()
                );
                Ok(state)
            }
            Err(err) => {
                warn!(
                    "event=state_load module=repo status=recovered revision={} error_code=malformed_state error={err}",
                    revision.as_key()
                );
                Ok(AssessmentState::default())
            }
        },
    }
}

/// Owner of one revision's mutable assessment state.
pub struct AssessmentStore {
    revision: CatalogRevision,
    state: AssessmentState,
}

impl AssessmentStore {
    /// Creates an empty store for one catalog revision.
    pub fn new(revision: CatalogRevision) -> Self {
        Self {
            revision,
            state: AssessmentState::default(),
        }
    }

    /// Creates a store around pre-existing state (import/migration paths).
    pub fn with_state(revision: CatalogRevision, state: AssessmentState) -> Self {
        Self { revision, state }
    }

    pub fn revision(&self) -> CatalogRevision {
        self.revision
    }

    /// Read-only state snapshot for scoring and export consumers.
    pub fn state(&self) -> &AssessmentState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut AssessmentState {
        &mut self.state
    }

    /// Recorded status for an objective; `None` means not assessed.
    pub fn status_of(&self, objective_id: &str) -> Option<ObjectiveStatus> {
        self.state.status_of(objective_id)
    }

    pub fn record(&self, objective_id: &str) -> Option<&AssessmentRecord> {
        self.state.records.get(objective_id)
    }

    /// Applies a status button press.
    ///
    /// Toggle semantics: pressing the currently stored status removes the
    /// record entirely; any other status upserts a record with a fresh
    /// timestamp. Callers re-derive aggregates afterwards.
    pub fn set_status(
        &mut self,
        objective_id: &str,
        status: ObjectiveStatus,
        control_id: &str,
        family_id: &str,
    ) {
        if self.status_of(objective_id) == Some(status) {
            self.state.records.remove(objective_id);
            info!(
                "event=status_set module=repo status=toggled_off objective={objective_id} value={}",
                status.as_key()
            );
            return;
        }

        self.state.records.insert(
            objective_id.to_string(),
            AssessmentRecord {
                objective_id: objective_id.to_string(),
                status,
                updated_at_ms: now_epoch_ms(),
                control_id: control_id.to_string(),
                family_id: family_id.to_string(),
            },
        );
        info!(
            "event=status_set module=repo status=ok objective={objective_id} value={}",
            status.as_key()
        );
    }

    /// Stores or clears a free-form implementation note. A blank note
    /// removes the entry.
    pub fn set_implementation_note(&mut self, objective_id: &str, note: &str) {
        let trimmed = note.trim();
        if trimmed.is_empty() {
            self.state.implementation_notes.remove(objective_id);
        } else {
            self.state
                .implementation_notes
                .insert(objective_id.to_string(), trimmed.to_string());
        }
    }

    pub fn implementation_note(&self, objective_id: &str) -> Option<&str> {
        self.state
            .implementation_notes
            .get(objective_id)
            .map(String::as_str)
    }

    /// Inserts a POA&M entry, evicting any deficiency entry for the same
    /// objective to keep the stores mutually exclusive.
    pub fn upsert_poam_entry(&mut self, entry: RemediationEntry) {
        self.state.deficiency_entries.remove(&entry.objective_id);
        self.state
            .poam_entries
            .insert(entry.objective_id.clone(), entry);
    }

    /// Inserts a deficiency entry, evicting any POA&M entry for the same
    /// objective.
    pub fn upsert_deficiency_entry(&mut self, entry: RemediationEntry) {
        self.state.poam_entries.remove(&entry.objective_id);
        self.state
            .deficiency_entries
            .insert(entry.objective_id.clone(), entry);
    }

    /// Moves a stray POA&M entry into the deficiency store. Applied when a
    /// never-deferrable control gains a not-met/partial objective.
    ///
    /// Returns whether an entry was moved.
    pub fn demote_poam_entry(&mut self, objective_id: &str) -> bool {
        match self.state.poam_entries.remove(objective_id) {
            Some(entry) => {
                warn!(
                    "event=poam_demoted module=repo status=ok objective={objective_id}"
                );
                self.state
                    .deficiency_entries
                    .insert(objective_id.to_string(), entry);
                true
            }
            None => false,
        }
    }

    /// Serializes the full state through the port.
    ///
    /// On failure the in-memory state is untouched and the error is
    /// surfaced for user-visible handling.
    pub fn save(&self, port: &dyn PersistencePort) -> Result<(), StorageError> {
        let payload = serde_json::to_string(&self.state)
            .map_err(|err| StorageError::Backend(format!("state serialization failed: {err}")))?;
        let key = state_key(self.revision);

        if let Err(err) = port.set(&key, &payload) {
            warn!(
                "event=state_save module=repo status=error revision={} error_code=write_failed error={err}",
                self.revision.as_key()
            );
            return Err(err);
        }

        info!(
            "event=state_save module=repo status=ok revision={} bytes={}",
            self.revision.as_key(),
            payload.len()
        );
        Ok(())
    }

    /// Replaces in-memory state with the persisted snapshot, falling back
    /// to an empty state for missing or malformed data.
    pub fn load(&mut self, port: &dyn PersistencePort) -> Result<(), StorageError> {
        self.state = load_state(port, self.revision)?;
        Ok(())
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
