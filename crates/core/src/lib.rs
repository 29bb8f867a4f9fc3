//! # Ward Core
//!
//! Board state and business rules for the department patient board.
//!
//! This crate contains:
//! - the department partition and its derived statistics
//! - the [`DepartmentCoordinator`], which routes create/update/delete/move intents through a
//!   [`PatientDirectory`](ward_directory::PatientDirectory) and keeps the partition in step
//! - the mutation journal, drop-event resolution, filtering and the patient form
//! - runtime configuration resolved once at start-up
//!
//! **No transport concerns**: HTTP clients live in `ward-directory`, servers in `api-rest`.

pub mod board;
pub mod config;
pub mod constants;
pub mod coordinator;
pub mod drag;
pub mod error;
pub mod filter;
pub mod form;
pub mod journal;
pub mod stats;

pub use board::{DepartmentBoard, DepartmentBucket};
pub use config::{CoreConfig, MoveFailurePolicy};
pub use coordinator::{DepartmentCoordinator, PendingMove};
pub use drag::{DropEvent, MoveIntent};
pub use error::{ConfigError, ConfigResult, CoordinatorError, CoordinatorResult};
pub use filter::BoardFilter;
pub use form::{FormError, FormField, PatientForm, ValidatedForm};
pub use journal::{MutationId, MutationKind, MutationPhase, MutationRecord};
pub use stats::{DepartmentStats, DepartmentSummary};
