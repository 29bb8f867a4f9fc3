//! The department state coordinator.
//!
//! [`DepartmentCoordinator`] owns the board partition, the loading flag, the single user-visible
//! error message and the mutation journal. It is a cheap `Clone` handle over shared state, built
//! once at start-up and handed to whoever needs it.
//!
//! State changes happen in short critical sections. No lock guard is held across a directory
//! call, so overlapping operations interleave freely and the last response to settle decides
//! where a patient ends up.

use crate::board::{DepartmentBoard, DepartmentBucket};
use crate::config::{CoreConfig, MoveFailurePolicy};
use crate::drag::{DropEvent, MoveIntent};
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::journal::{MutationId, MutationJournal, MutationKind, MutationRecord};
use crate::stats::{self, DepartmentStats, DepartmentSummary};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use ward_directory::{Department, DirectoryResult, NewPatient, Patient, PatientDirectory, PatientId};

#[derive(Debug)]
struct CoordinatorState {
    board: DepartmentBoard,
    loading: bool,
    error: Option<String>,
    journal: MutationJournal,
}

/// An optimistic move that has been applied to the board but not yet persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingMove {
    mutation: MutationId,
    original: Patient,
    origin_index: usize,
    moved: Patient,
}

impl PendingMove {
    /// The patient as the move placed it, with its new department. This is what gets persisted.
    pub fn moved(&self) -> &Patient {
        &self.moved
    }
}

/// Coordinates the board with a [`PatientDirectory`].
pub struct DepartmentCoordinator<D: ?Sized> {
    directory: Arc<D>,
    cfg: Arc<CoreConfig>,
    state: Arc<RwLock<CoordinatorState>>,
}

impl<D: ?Sized> Clone for DepartmentCoordinator<D> {
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
            cfg: Arc::clone(&self.cfg),
            state: Arc::clone(&self.state),
        }
    }
}

impl<D: PatientDirectory> DepartmentCoordinator<D> {
    /// Creates a coordinator with all five departments empty.
    pub fn new(directory: D, cfg: Arc<CoreConfig>) -> Self {
        Self::with_shared_directory(Arc::new(directory), cfg)
    }
}

impl<D: PatientDirectory + ?Sized> DepartmentCoordinator<D> {
    pub fn with_shared_directory(directory: Arc<D>, cfg: Arc<CoreConfig>) -> Self {
        let journal = MutationJournal::new(cfg.mutation_history());
        Self {
            directory,
            cfg,
            state: Arc::new(RwLock::new(CoordinatorState {
                board: DepartmentBoard::new(),
                loading: false,
                error: None,
                journal,
            })),
        }
    }

    pub fn directory(&self) -> &Arc<D> {
        &self.directory
    }

    fn read(&self) -> RwLockReadGuard<'_, CoordinatorState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CoordinatorState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current partition.
    pub fn board(&self) -> DepartmentBoard {
        self.read().board.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    /// The most recent user-visible error message, if any.
    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub fn total_patients(&self) -> usize {
        stats::total_patients(&self.read().board)
    }

    pub fn department_stats(&self) -> Vec<DepartmentStats> {
        stats::department_stats(&self.read().board)
    }

    pub fn department_summary(&self, department: Department) -> DepartmentSummary {
        DepartmentSummary::for_bucket(
            self.read().board.bucket(department),
            self.cfg.department_capacity(),
        )
    }

    /// Recent mutations, oldest first.
    pub fn mutations(&self) -> Vec<MutationRecord> {
        self.read().journal.records()
    }

    /// Replace the partition with the directory's current patient list.
    ///
    /// On failure the previous partition is kept.
    pub async fn load(&self) -> CoordinatorResult<usize> {
        {
            let mut state = self.write();
            state.loading = true;
            state.error = None;
        }
        tracing::debug!("loading patients");

        match self.directory.list().await {
            Ok(patients) => {
                let board = DepartmentBoard::from_patients(patients);
                let total = board.total_patients();
                let mut state = self.write();
                state.board = board;
                state.loading = false;
                tracing::info!(total, "patients loaded");
                Ok(total)
            }
            Err(source) => {
                let err = CoordinatorError::Load(source);
                tracing::error!(error = %err, "failed to load patients");
                let mut state = self.write();
                state.loading = false;
                state.error = Some(err.user_message().to_string());
                Err(err)
            }
        }
    }

    /// Persist `patient` and place the server's copy in the bucket its department names.
    pub async fn update_patient(&self, patient: Patient) -> CoordinatorResult<Patient> {
        let id = patient.id;
        let mutation = self.write().journal.begin(MutationKind::Update, Some(id));

        match self.directory.update(&patient).await {
            Ok(saved) => {
                let mut state = self.write();
                if saved.id != id {
                    state.board.remove(id);
                }
                // Same-department edits keep their slot instead of moving to the end.
                let index = state.board.reconcile(saved.clone());
                state.journal.confirm(mutation, saved.id);
                tracing::info!(patient = %saved.id, department = %saved.department, index, "patient updated");
                Ok(saved)
            }
            Err(source) => Err(self.fail(mutation, CoordinatorError::Update { id, source })),
        }
    }

    pub async fn create_patient(&self, patient: NewPatient) -> CoordinatorResult<Patient> {
        let mutation = self.write().journal.begin(MutationKind::Create, None);

        match self.directory.create(&patient).await {
            Ok(saved) => {
                let mut state = self.write();
                state.board.reconcile(saved.clone());
                state.journal.confirm(mutation, saved.id);
                tracing::info!(patient = %saved.id, department = %saved.department, "patient created");
                Ok(saved)
            }
            Err(source) => Err(self.fail(mutation, CoordinatorError::Create(source))),
        }
    }

    pub async fn delete_patient(&self, id: PatientId) -> CoordinatorResult<()> {
        let mutation = self.write().journal.begin(MutationKind::Delete, Some(id));

        match self.directory.delete(id).await {
            Ok(()) => {
                let mut state = self.write();
                state.board.remove(id);
                state.journal.confirm(mutation, id);
                tracing::info!(patient = %id, "patient deleted");
                Ok(())
            }
            Err(source) => Err(self.fail(mutation, CoordinatorError::Delete { id, source })),
        }
    }

    /// Apply a move to the board without persisting it.
    ///
    /// Returns `None`, touching nothing, when the move stays within one department or the
    /// patient is not in `from`.
    pub fn begin_move(&self, intent: MoveIntent) -> Option<PendingMove> {
        if intent.is_noop() {
            tracing::debug!(patient = %intent.patient_id, "move within the same department ignored");
            return None;
        }

        let mut state = self.write();
        let Some(origin_index) = state.board.bucket(intent.from).position(intent.patient_id) else {
            tracing::debug!(
                patient = %intent.patient_id,
                from = %intent.from,
                "patient not in source department, move ignored"
            );
            return None;
        };

        let original = state
            .board
            .bucket_mut(intent.from)
            .patients
            .remove(origin_index);
        let mut moved = original.clone();
        moved.department = intent.to;
        let placed_index = state.board.insert_at(intent.target_index, moved.clone());
        let mutation = state
            .journal
            .begin(MutationKind::Move, Some(intent.patient_id));

        tracing::debug!(
            patient = %intent.patient_id,
            from = %intent.from,
            to = %intent.to,
            index = placed_index,
            "patient moved optimistically"
        );

        Some(PendingMove {
            mutation,
            original,
            origin_index,
            moved,
        })
    }

    /// Settle an optimistic move with the directory's answer.
    pub fn settle_move(
        &self,
        pending: PendingMove,
        outcome: DirectoryResult<Patient>,
    ) -> CoordinatorResult<Patient> {
        let id = pending.original.id;
        let source = match outcome {
            Ok(saved) => {
                let mut state = self.write();
                state.board.reconcile(saved.clone());
                state.journal.confirm(pending.mutation, saved.id);
                tracing::info!(patient = %saved.id, department = %saved.department, "move persisted");
                return Ok(saved);
            }
            Err(source) => source,
        };

        let err = CoordinatorError::Move { id, source };
        tracing::error!(error = %err, mutation = pending.mutation.0, "failed to persist move");
        let reason = err.directory_error().to_string();

        let mut state = self.write();
        state.error = Some(err.user_message().to_string());

        match self.cfg.move_failure_policy() {
            MoveFailurePolicy::Keep => state.journal.fail(pending.mutation, reason),
            MoveFailurePolicy::Rollback => {
                let still_placed = state
                    .board
                    .bucket(pending.moved.department)
                    .patients
                    .iter()
                    .any(|p| *p == pending.moved);

                if still_placed {
                    state.board.remove(id);
                    state
                        .board
                        .insert_at(pending.origin_index, pending.original.clone());
                    state.journal.roll_back(pending.mutation, reason);
                    tracing::info!(patient = %id, department = %pending.original.department, "move rolled back");
                } else {
                    tracing::warn!(patient = %id, "patient changed since the move, not rolling back");
                    state.journal.fail(pending.mutation, reason);
                }
            }
        }

        Err(err)
    }

    /// Move a patient optimistically and persist the move.
    ///
    /// `Ok(None)` means the intent was a no-op and nothing was sent.
    pub async fn move_patient(&self, intent: MoveIntent) -> CoordinatorResult<Option<Patient>> {
        let Some(pending) = self.begin_move(intent) else {
            return Ok(None);
        };
        let outcome = self.directory.update(pending.moved()).await;
        self.settle_move(pending, outcome).map(Some)
    }

    /// Resolve a drop event against the view it came from and move the patient.
    pub async fn handle_drop(
        &self,
        event: &DropEvent,
        view: &[DepartmentBucket],
    ) -> CoordinatorResult<Option<Patient>> {
        match event.resolve(view) {
            Some(intent) => self.move_patient(intent).await,
            None => Ok(None),
        }
    }

    fn fail(&self, mutation: MutationId, err: CoordinatorError) -> CoordinatorError {
        tracing::error!(error = %err, mutation = mutation.0, "patient mutation failed");
        let mut state = self.write();
        state.error = Some(err.user_message().to_string());
        state
            .journal
            .fail(mutation, err.directory_error().to_string());
        drop(state);
        err
    }
}
