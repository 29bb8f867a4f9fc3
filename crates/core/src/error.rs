use crate::constants::{
    CREATE_FAILURE_MESSAGE, DELETE_FAILURE_MESSAGE, LOAD_FAILURE_MESSAGE, UPDATE_FAILURE_MESSAGE,
};
use ward_directory::{DirectoryError, PatientId};

/// Errors raised while resolving [`CoreConfig`](crate::CoreConfig).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{key} must be a positive integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },
    #[error("unknown move failure policy '{0}' (expected 'keep' or 'rollback')")]
    UnknownMoveFailurePolicy(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Failures of coordinator operations.
///
/// Each variant wraps the directory error unchanged; [`CoordinatorError::user_message`] gives the
/// fixed text the coordinator stores as its visible error.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("failed to load patients: {0}")]
    Load(#[source] DirectoryError),
    #[error("failed to update patient {id}: {source}")]
    Update {
        id: PatientId,
        #[source]
        source: DirectoryError,
    },
    #[error("failed to create patient: {0}")]
    Create(#[source] DirectoryError),
    #[error("failed to delete patient {id}: {source}")]
    Delete {
        id: PatientId,
        #[source]
        source: DirectoryError,
    },
    #[error("failed to persist move of patient {id}: {source}")]
    Move {
        id: PatientId,
        #[source]
        source: DirectoryError,
    },
}

impl CoordinatorError {
    pub fn user_message(&self) -> &'static str {
        match self {
            CoordinatorError::Load(_) => LOAD_FAILURE_MESSAGE,
            CoordinatorError::Update { .. } | CoordinatorError::Move { .. } => {
                UPDATE_FAILURE_MESSAGE
            }
            CoordinatorError::Create(_) => CREATE_FAILURE_MESSAGE,
            CoordinatorError::Delete { .. } => DELETE_FAILURE_MESSAGE,
        }
    }

    /// The directory failure behind this error.
    pub fn directory_error(&self) -> &DirectoryError {
        match self {
            CoordinatorError::Load(source) | CoordinatorError::Create(source) => source,
            CoordinatorError::Update { source, .. }
            | CoordinatorError::Delete { source, .. }
            | CoordinatorError::Move { source, .. } => source,
        }
    }
}

pub type CoordinatorResult<T> = std::result::Result<T, CoordinatorError>;
