//! Board filtering and search.

use crate::board::DepartmentBucket;
use serde::{Deserialize, Serialize};
use ward_directory::{Department, Patient, Priority};

/// Filter applied to the board view.
///
/// All five buckets survive filtering; only their patient lists shrink.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardFilter {
    /// Case-insensitive substring matched against name, MRN, department and doctor.
    pub search: Option<String>,
    pub department: Option<Department>,
    pub priority: Option<Priority>,
}

impl BoardFilter {
    pub fn is_empty(&self) -> bool {
        self.search_term().is_none() && self.department.is_none() && self.priority.is_none()
    }

    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Does `patient`, shown in `bucket`, pass the filter?
    pub fn matches(&self, bucket: Department, patient: &Patient) -> bool {
        self.matches_with(bucket, patient, self.search_term().as_deref())
    }

    fn matches_with(&self, bucket: Department, patient: &Patient, term: Option<&str>) -> bool {
        if self.department.is_some_and(|wanted| wanted != bucket) {
            return false;
        }
        if self.priority.is_some_and(|wanted| wanted != patient.priority) {
            return false;
        }
        match term {
            Some(term) => [
                patient.name.as_str(),
                patient.mrn.as_str(),
                patient.department.as_str(),
                patient.doctor_name.as_str(),
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(term)),
            None => true,
        }
    }

    /// Filtered copy of `buckets`.
    pub fn apply(&self, buckets: &[DepartmentBucket]) -> Vec<DepartmentBucket> {
        let term = self.search_term();
        buckets
            .iter()
            .map(|bucket| DepartmentBucket {
                name: bucket.name,
                patients: bucket
                    .patients
                    .iter()
                    .filter(|p| self.matches_with(bucket.name, p, term.as_deref()))
                    .cloned()
                    .collect(),
            })
            .collect()
    }
}
