//! The department board: patients partitioned into the five fixed departments.
//!
//! Every patient on the board sits in exactly one bucket, and that bucket is named by the
//! patient's `department` field. All mutators below preserve this; [`DepartmentBoard::is_consistent`]
//! checks it.

use serde::Serialize;
use ward_directory::{Department, Patient, PatientId};

/// The ordered patients currently attributed to one department.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DepartmentBucket {
    pub name: Department,
    pub patients: Vec<Patient>,
}

impl DepartmentBucket {
    pub fn new(name: Department) -> Self {
        Self {
            name,
            patients: Vec::new(),
        }
    }

    /// Index of the patient with `id` in this bucket.
    pub fn position(&self, id: PatientId) -> Option<usize> {
        self.patients.iter().position(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }
}

/// Snapshot of every department bucket, in board order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DepartmentBoard {
    buckets: Vec<DepartmentBucket>,
}

impl Default for DepartmentBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl DepartmentBoard {
    /// A board with all five departments and no patients.
    pub fn new() -> Self {
        Self {
            buckets: Department::ALL.into_iter().map(DepartmentBucket::new).collect(),
        }
    }

    /// Partition a flat patient list by department, keeping list order within each bucket.
    ///
    /// A repeated id keeps its last occurrence.
    pub fn from_patients(patients: impl IntoIterator<Item = Patient>) -> Self {
        let mut board = Self::new();
        for patient in patients {
            board.remove(patient.id);
            board.bucket_mut(patient.department).patients.push(patient);
        }
        board
    }

    pub fn buckets(&self) -> &[DepartmentBucket] {
        &self.buckets
    }

    pub fn bucket(&self, department: Department) -> &DepartmentBucket {
        &self.buckets[department.index()]
    }

    pub(crate) fn bucket_mut(&mut self, department: Department) -> &mut DepartmentBucket {
        &mut self.buckets[department.index()]
    }

    pub fn total_patients(&self) -> usize {
        self.buckets.iter().map(DepartmentBucket::len).sum()
    }

    /// Department and index of the patient with `id`.
    pub fn locate(&self, id: PatientId) -> Option<(Department, usize)> {
        self.buckets
            .iter()
            .find_map(|bucket| bucket.position(id).map(|index| (bucket.name, index)))
    }

    pub fn find(&self, id: PatientId) -> Option<&Patient> {
        self.locate(id)
            .map(|(department, index)| &self.bucket(department).patients[index])
    }

    /// Remove every patient with `id` from every bucket, returning the first one found with its
    /// former department and index.
    pub fn remove(&mut self, id: PatientId) -> Option<(Department, usize, Patient)> {
        let mut removed = None;
        for bucket in &mut self.buckets {
            while let Some(index) = bucket.position(id) {
                let patient = bucket.patients.remove(index);
                if removed.is_none() {
                    removed = Some((bucket.name, index, patient));
                }
            }
        }
        removed
    }

    /// Insert `patient` into its department at `index`, clamped to the bucket length.
    ///
    /// Returns the index it was placed at. The caller must make sure the id is not already on
    /// the board.
    pub(crate) fn insert_at(&mut self, index: usize, patient: Patient) -> usize {
        let bucket = self.bucket_mut(patient.department);
        let index = index.min(bucket.patients.len());
        bucket.patients.insert(index, patient);
        index
    }

    /// Apply a server-confirmed patient to the board.
    ///
    /// Any other copy of the id is removed. If the patient already sits in the bucket its
    /// department names, it is replaced in place; otherwise it is appended to that bucket.
    /// Returns the index the patient ended up at.
    pub fn reconcile(&mut self, patient: Patient) -> usize {
        let target = patient.department;
        let kept_index = self.bucket(target).position(patient.id);

        for bucket in &mut self.buckets {
            if bucket.name == target && kept_index.is_some() {
                continue;
            }
            bucket.patients.retain(|p| p.id != patient.id);
        }

        let bucket = self.bucket_mut(target);
        match kept_index {
            Some(index) => {
                // Drop duplicates after the kept slot before replacing it.
                let id = patient.id;
                let mut seen = 0usize;
                bucket.patients.retain(|p| {
                    if p.id != id {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
                bucket.patients[index] = patient;
                index
            }
            None => {
                bucket.patients.push(patient);
                bucket.patients.len() - 1
            }
        }
    }

    /// True when every patient sits in the bucket named by its department and no id repeats.
    pub fn is_consistent(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.buckets.iter().all(|bucket| {
            bucket
                .patients
                .iter()
                .all(|p| p.department == bucket.name && seen.insert(p.id))
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ward_directory::{Priority, StatusTrack};

    pub(crate) fn patient(id: u64, department: Department) -> Patient {
        Patient {
            id: PatientId(id),
            mrn: format!("MRN{id}"),
            name: format!("Patient {id}"),
            status_track: StatusTrack::Admission,
            department,
            priority: Priority::Standard,
            doctor_name: "Dr. Mensah".into(),
            nurse_name: "Nurse Lind".into(),
            admission_date: "2024-05-01T09:00:00.000Z".into(),
            bed_number: format!("B-{id}"),
            waiting_time: 0,
        }
    }

    fn ids(bucket: &DepartmentBucket) -> Vec<u64> {
        bucket.patients.iter().map(|p| p.id.0).collect()
    }

    #[test]
    fn test_new_board_has_five_empty_buckets_in_order() {
        let board = DepartmentBoard::new();
        let names: Vec<Department> = board.buckets().iter().map(|b| b.name).collect();

        assert_eq!(names, Department::ALL.to_vec());
        assert_eq!(board.total_patients(), 0);
    }

    #[test]
    fn test_from_patients_partitions_by_department() {
        let board = DepartmentBoard::from_patients(vec![
            patient(1, Department::Emergency),
            patient(2, Department::Icu),
            patient(3, Department::Emergency),
            patient(4, Department::Radiology),
        ]);

        assert_eq!(board.total_patients(), 4);
        assert_eq!(ids(board.bucket(Department::Emergency)), vec![1, 3]);
        assert_eq!(ids(board.bucket(Department::Icu)), vec![2]);
        assert!(board.bucket(Department::GeneralWard).is_empty());
        assert_eq!(ids(board.bucket(Department::Radiology)), vec![4]);
        assert!(board.is_consistent());
    }

    #[test]
    fn test_from_patients_keeps_last_copy_of_repeated_id() {
        let board = DepartmentBoard::from_patients(vec![
            patient(1, Department::Emergency),
            patient(1, Department::Outpatient),
        ]);

        assert_eq!(board.locate(PatientId(1)), Some((Department::Outpatient, 0)));
        assert!(board.is_consistent());
    }

    #[test]
    fn test_reconcile_replaces_in_place_within_same_bucket() {
        let mut board = DepartmentBoard::from_patients(vec![
            patient(1, Department::Icu),
            patient(2, Department::Icu),
            patient(3, Department::Icu),
        ]);
        let mut edited = patient(2, Department::Icu);
        edited.name = "Renamed".into();

        let index = board.reconcile(edited);

        assert_eq!(index, 1);
        assert_eq!(ids(board.bucket(Department::Icu)), vec![1, 2, 3]);
        assert_eq!(board.bucket(Department::Icu).patients[1].name, "Renamed");
    }

    #[test]
    fn test_reconcile_moves_to_returned_department() {
        let mut board = DepartmentBoard::from_patients(vec![
            patient(1, Department::Emergency),
            patient(2, Department::Icu),
        ]);

        let index = board.reconcile(patient(1, Department::Icu));

        assert_eq!(index, 1);
        assert!(board.bucket(Department::Emergency).is_empty());
        assert_eq!(ids(board.bucket(Department::Icu)), vec![2, 1]);
        assert!(board.is_consistent());
    }

    #[test]
    fn test_insert_at_clamps_index() {
        let mut board = DepartmentBoard::from_patients(vec![patient(1, Department::Outpatient)]);

        let index = board.insert_at(99, patient(2, Department::Outpatient));

        assert_eq!(index, 1);
        assert_eq!(ids(board.bucket(Department::Outpatient)), vec![1, 2]);
    }

    #[test]
    fn test_remove_reports_former_position() {
        let mut board = DepartmentBoard::from_patients(vec![
            patient(1, Department::GeneralWard),
            patient(2, Department::GeneralWard),
        ]);

        let (department, index, removed) =
            board.remove(PatientId(2)).expect("patient 2 should be removed");

        assert_eq!(department, Department::GeneralWard);
        assert_eq!(index, 1);
        assert_eq!(removed.id, PatientId(2));
        assert!(board.remove(PatientId(2)).is_none());
    }

    #[test]
    fn test_is_consistent_detects_mismatched_bucket() {
        let mut board = DepartmentBoard::new();
        board
            .bucket_mut(Department::Icu)
            .patients
            .push(patient(9, Department::Emergency));

        assert!(!board.is_consistent());
    }
}
