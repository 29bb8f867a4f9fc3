//! Drop events from the board and the move intents they resolve to.

use crate::board::DepartmentBucket;
use serde::{Deserialize, Serialize};
use ward_directory::{Department, PatientId};

/// A request to move one patient between departments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveIntent {
    pub patient_id: PatientId,
    pub from: Department,
    pub to: Department,
    /// Position in the destination bucket; clamped to its length.
    pub target_index: usize,
}

impl MoveIntent {
    pub fn new(patient_id: PatientId, from: Department, to: Department, target_index: usize) -> Self {
        Self {
            patient_id,
            from,
            to,
            target_index,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// A drag-and-drop gesture as reported by the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropEvent {
    pub previous_container: Department,
    pub container: Department,
    pub previous_index: usize,
    pub current_index: usize,
}

impl DropEvent {
    pub fn is_same_container(&self) -> bool {
        self.previous_container == self.container
    }

    /// Resolve the event against the buckets it was emitted from.
    ///
    /// `view` is what the board displayed when the drag started, which is the filtered view when
    /// a filter is active, so `previous_index` is looked up there. Dropping back into the same
    /// container, or from an index that holds no patient, resolves to nothing.
    pub fn resolve(&self, view: &[DepartmentBucket]) -> Option<MoveIntent> {
        if self.is_same_container() {
            tracing::debug!(department = %self.container, "drop within the same department ignored");
            return None;
        }

        let patient = view
            .iter()
            .find(|bucket| bucket.name == self.previous_container)?
            .patients
            .get(self.previous_index)?;

        Some(MoveIntent::new(
            patient.id,
            self.previous_container,
            self.container,
            self.current_index,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::patient;
    use crate::board::DepartmentBoard;
    use crate::filter::BoardFilter;
    use ward_directory::Priority;

    fn board() -> DepartmentBoard {
        let mut urgent = patient(2, Department::Emergency);
        urgent.priority = Priority::Urgent;
        DepartmentBoard::from_patients(vec![
            patient(1, Department::Emergency),
            urgent,
            patient(3, Department::Icu),
        ])
    }

    #[test]
    fn test_resolve_reads_patient_from_previous_container() {
        let event = DropEvent {
            previous_container: Department::Emergency,
            container: Department::Icu,
            previous_index: 1,
            current_index: 0,
        };

        let intent = event.resolve(board().buckets()).expect("should resolve");

        assert_eq!(
            intent,
            MoveIntent::new(PatientId(2), Department::Emergency, Department::Icu, 0)
        );
    }

    #[test]
    fn test_resolve_ignores_same_container() {
        let event = DropEvent {
            previous_container: Department::Icu,
            container: Department::Icu,
            previous_index: 0,
            current_index: 0,
        };

        assert_eq!(event.resolve(board().buckets()), None);
    }

    #[test]
    fn test_resolve_ignores_empty_slot() {
        let event = DropEvent {
            previous_container: Department::Radiology,
            container: Department::Icu,
            previous_index: 0,
            current_index: 0,
        };

        assert_eq!(event.resolve(board().buckets()), None);
    }

    #[test]
    fn test_resolve_uses_filtered_view_indices() {
        let filter = BoardFilter {
            priority: Some(Priority::Urgent),
            ..BoardFilter::default()
        };
        let view = filter.apply(board().buckets());
        let event = DropEvent {
            previous_container: Department::Emergency,
            container: Department::Outpatient,
            previous_index: 0,
            current_index: 3,
        };

        let intent = event.resolve(&view).expect("should resolve");
        assert_eq!(intent.patient_id, PatientId(2));
        assert_eq!(intent.target_index, 3);
    }
}
