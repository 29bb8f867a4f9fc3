//! # Ward Directory
//!
//! Client side of the patients REST resource.
//!
//! This crate contains:
//! - the patient wire model (`Patient`, `NewPatient` and the enumerated fields)
//! - the [`PatientDirectory`] trait: list, update, create, delete
//! - [`HttpPatientDirectory`], the `reqwest` implementation
//!
//! **No board state**: partitioning, reconciliation and derived statistics belong in `ward-core`.
//! Each operation is a single round trip with no retry and no batching.

pub mod http;
pub mod model;

pub use http::{decode_patient, decode_patient_list, HttpPatientDirectory};
pub use model::{
    Department, NewPatient, ParseOptionError, Patient, PatientId, Priority, StatusTrack,
    DEPARTMENT_OPTIONS, PRIORITY_OPTIONS, STATUS_OPTIONS,
};

use async_trait::async_trait;

/// Errors returned by a patient directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("invalid directory configuration: {0}")]
    InvalidConfig(String),

    #[error("patients request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("patients endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode patients response at {path}: {message}")]
    Decode { path: String, message: String },
}

impl DirectoryError {
    /// True when the backend reported that the addressed patient does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DirectoryError::Status { status: 404, .. })
    }
}

/// Type alias for Results that can fail with a [`DirectoryError`].
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// The four operations the board needs from the patients resource.
///
/// Implementations hold no board state. Failures are returned as-is; callers decide whether
/// and how to surface them.
#[async_trait]
pub trait PatientDirectory: Send + Sync {
    /// Fetch the full current patient list.
    async fn list(&self) -> DirectoryResult<Vec<Patient>>;

    /// Persist `patient` by id and return the server's resulting representation.
    async fn update(&self, patient: &Patient) -> DirectoryResult<Patient>;

    /// Create a patient and return the stored record carrying its server-assigned id.
    async fn create(&self, patient: &NewPatient) -> DirectoryResult<Patient>;

    /// Delete the patient with `id`.
    async fn delete(&self, id: PatientId) -> DirectoryResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found_only_matches_404() {
        let missing = DirectoryError::Status {
            status: 404,
            body: "Not Found".into(),
        };
        let rejected = DirectoryError::Status {
            status: 400,
            body: "bad".into(),
        };

        assert!(missing.is_not_found());
        assert!(!rejected.is_not_found());
        assert_eq!(
            missing.to_string(),
            "patients endpoint returned 404: Not Found"
        );
    }
}
