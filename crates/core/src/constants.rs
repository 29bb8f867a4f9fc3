//! Constants used throughout the ward core crate.

/// Patients backend used when no base URL is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001";

/// Beds per department assumed by the department summary.
pub const DEFAULT_DEPARTMENT_CAPACITY: usize = 20;

/// Number of recent mutations kept in the coordinator journal.
pub const DEFAULT_MUTATION_HISTORY: usize = 64;

/// Prefix of client-generated medical record numbers.
pub const MRN_PREFIX: &str = "MRN";

/// Exclusive upper bound of the numeric part of a generated MRN.
pub const MRN_NUMBER_LIMIT: u32 = 1_000_000;

/// User-visible message set when loading the board fails.
pub const LOAD_FAILURE_MESSAGE: &str = "Failed to load patients";

/// User-visible message set when updating or moving a patient fails.
pub const UPDATE_FAILURE_MESSAGE: &str = "Failed to update patient";

/// User-visible message set when creating a patient fails.
pub const CREATE_FAILURE_MESSAGE: &str = "Failed to create patient";

/// User-visible message set when deleting a patient fails.
pub const DELETE_FAILURE_MESSAGE: &str = "Failed to delete patient";

/// Environment variable naming the patients backend base URL.
pub const ENV_API_BASE_URL: &str = "WARD_API_BASE_URL";

/// Environment variable holding the transport timeout in seconds.
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "WARD_REQUEST_TIMEOUT_SECS";

/// Environment variable holding the per-department capacity.
pub const ENV_DEPARTMENT_CAPACITY: &str = "WARD_DEPARTMENT_CAPACITY";

/// Environment variable selecting the move failure policy (`keep` or `rollback`).
pub const ENV_MOVE_FAILURE_POLICY: &str = "WARD_MOVE_FAILURE_POLICY";

/// Environment variable holding the mutation journal size.
pub const ENV_MUTATION_HISTORY: &str = "WARD_MUTATION_HISTORY";
