//! Two-phase mutation journal.
//!
//! Every coordinator mutation is recorded as `Pending` when it is issued and moves to
//! `Confirmed` or `Failed` when the backend answers. A failed optimistic move that was undone
//! ends as `RolledBack`. Only the most recent entries are kept.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use ward_directory::PatientId;

/// Sequence number of a mutation, increasing in issue order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MutationId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
    Move,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum MutationPhase {
    Pending,
    Confirmed,
    Failed { reason: String },
    RolledBack { reason: String },
}

impl MutationPhase {
    pub fn is_settled(&self) -> bool {
        !matches!(self, MutationPhase::Pending)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MutationRecord {
    pub id: MutationId,
    pub kind: MutationKind,
    /// Unknown for a create until the backend assigns an id.
    pub patient_id: Option<PatientId>,
    pub phase: MutationPhase,
    pub issued_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct MutationJournal {
    next_id: u64,
    capacity: usize,
    records: VecDeque<MutationRecord>,
}

impl MutationJournal {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            next_id: 1,
            capacity,
            records: VecDeque::with_capacity(capacity),
        }
    }

    /// Record a newly issued mutation.
    pub fn begin(&mut self, kind: MutationKind, patient_id: Option<PatientId>) -> MutationId {
        let id = MutationId(self.next_id);
        self.next_id += 1;

        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(MutationRecord {
            id,
            kind,
            patient_id,
            phase: MutationPhase::Pending,
            issued_at: Utc::now(),
            settled_at: None,
        });
        id
    }

    pub fn confirm(&mut self, id: MutationId, patient_id: PatientId) {
        self.settle(id, Some(patient_id), MutationPhase::Confirmed);
    }

    pub fn fail(&mut self, id: MutationId, reason: impl Into<String>) {
        self.settle(
            id,
            None,
            MutationPhase::Failed {
                reason: reason.into(),
            },
        );
    }

    pub fn roll_back(&mut self, id: MutationId, reason: impl Into<String>) {
        self.settle(
            id,
            None,
            MutationPhase::RolledBack {
                reason: reason.into(),
            },
        );
    }

    fn settle(&mut self, id: MutationId, patient_id: Option<PatientId>, phase: MutationPhase) {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                if patient_id.is_some() {
                    record.patient_id = patient_id;
                }
                record.phase = phase;
                record.settled_at = Some(Utc::now());
            }
            None => {
                tracing::debug!(mutation = id.0, "mutation settled after leaving the journal");
            }
        }
    }

    /// Oldest first.
    pub fn records(&self) -> Vec<MutationRecord> {
        self.records.iter().cloned().collect()
    }
}
