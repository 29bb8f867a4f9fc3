//! Derived board statistics.
//!
//! These are pure functions of a board snapshot and are recomputed on every read.

use crate::board::{DepartmentBoard, DepartmentBucket};
use serde::Serialize;
use ward_directory::{Department, Priority, StatusTrack};

/// Headline numbers for one department.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DepartmentStats {
    pub name: Department,
    pub count: usize,
    /// Patients with priority Critical.
    pub critical_count: usize,
    /// Patients whose status track is Waiting.
    pub waiting_count: usize,
}

impl DepartmentStats {
    pub fn for_bucket(bucket: &DepartmentBucket) -> Self {
        Self {
            name: bucket.name,
            count: bucket.len(),
            critical_count: count_priority(bucket, Priority::Critical),
            waiting_count: bucket
                .patients
                .iter()
                .filter(|p| p.status_track == StatusTrack::Waiting)
                .count(),
        }
    }
}

/// Sum of all bucket sizes.
pub fn total_patients(board: &DepartmentBoard) -> usize {
    board.total_patients()
}

/// Stats for every department, in board order.
pub fn department_stats(board: &DepartmentBoard) -> Vec<DepartmentStats> {
    board
        .buckets()
        .iter()
        .map(DepartmentStats::for_bucket)
        .collect()
}

/// The detail panel for one department.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DepartmentSummary {
    pub name: Department,
    pub count: usize,
    pub capacity: usize,
    /// Capacity minus headcount; negative when the department is over capacity.
    pub available_capacity: i64,
    /// Mean waiting time in minutes, rounded half up. Zero for an empty department.
    pub average_wait_minutes: u64,
    pub critical_count: usize,
    pub urgent_count: usize,
}

impl DepartmentSummary {
    pub fn for_bucket(bucket: &DepartmentBucket, capacity: usize) -> Self {
        let count = bucket.len();
        Self {
            name: bucket.name,
            count,
            capacity,
            available_capacity: capacity as i64 - count as i64,
            average_wait_minutes: average_wait(bucket),
            critical_count: count_priority(bucket, Priority::Critical),
            urgent_count: count_priority(bucket, Priority::Urgent),
        }
    }
}

fn count_priority(bucket: &DepartmentBucket, priority: Priority) -> usize {
    bucket
        .patients
        .iter()
        .filter(|p| p.priority == priority)
        .count()
}

fn average_wait(bucket: &DepartmentBucket) -> u64 {
    let count = bucket.len() as u64;
    if count == 0 {
        return 0;
    }
    let total: u64 = bucket
        .patients
        .iter()
        .map(|p| u64::from(p.waiting_time))
        .sum();
    (2 * total + count) / (2 * count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::patient;

    fn icu_with(specs: &[(Priority, StatusTrack, u32)]) -> DepartmentBoard {
        DepartmentBoard::from_patients(specs.iter().enumerate().map(
            |(i, (priority, status, wait))| {
                let mut p = patient(i as u64 + 1, Department::Icu);
                p.priority = *priority;
                p.status_track = *status;
                p.waiting_time = *wait;
                p
            },
        ))
    }

    #[test]
    fn test_department_stats_counts_critical_and_waiting() {
        let board = icu_with(&[
            (Priority::Critical, StatusTrack::Waiting, 0),
            (Priority::Critical, StatusTrack::Admission, 0),
            (Priority::Standard, StatusTrack::Waiting, 0),
        ]);

        let stats = department_stats(&board);
        let icu = &stats[Department::Icu.index()];

        assert_eq!(stats.len(), 5);
        assert_eq!(icu.name, Department::Icu);
        assert_eq!(icu.count, 3);
        assert_eq!(icu.critical_count, 2);
        assert_eq!(icu.waiting_count, 2);
        assert_eq!(stats[Department::Emergency.index()].count, 0);
        assert_eq!(total_patients(&board), 3);
    }

    #[test]
    fn test_summary_rounds_average_wait_half_up() {
        let board = icu_with(&[
            (Priority::Urgent, StatusTrack::Waiting, 10),
            (Priority::Critical, StatusTrack::Waiting, 15),
        ]);

        let summary = DepartmentSummary::for_bucket(board.bucket(Department::Icu), 20);

        assert_eq!(summary.average_wait_minutes, 13);
        assert_eq!(summary.available_capacity, 18);
        assert_eq!(summary.critical_count, 1);
        assert_eq!(summary.urgent_count, 1);
    }

    #[test]
    fn test_summary_of_empty_department() {
        let board = DepartmentBoard::new();
        let summary = DepartmentSummary::for_bucket(board.bucket(Department::Radiology), 20);

        assert_eq!(summary.count, 0);
        assert_eq!(summary.average_wait_minutes, 0);
        assert_eq!(summary.available_capacity, 20);
    }

    #[test]
    fn test_summary_reports_over_capacity_as_negative() {
        let board = icu_with(&[
            (Priority::Routine, StatusTrack::Admission, 0),
            (Priority::Routine, StatusTrack::Admission, 0),
            (Priority::Routine, StatusTrack::Admission, 0),
        ]);

        let summary = DepartmentSummary::for_bucket(board.bucket(Department::Icu), 2);
        assert_eq!(summary.available_capacity, -1);
    }

    #[test]
    fn test_stats_serialize_with_display_names() {
        let board = icu_with(&[(Priority::Critical, StatusTrack::Waiting, 5)]);
        let stats = DepartmentStats::for_bucket(board.bucket(Department::GeneralWard));

        let json = serde_json::to_value(&stats).expect("stats should serialize");

        assert_eq!(json["name"], "General Ward");
        assert_eq!(json["count"], 0);
    }
}
