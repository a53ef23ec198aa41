//! Constants used throughout the HerbDx core crate.
//!
//! Scoring weights and result caps are fixed behaviour of the diagnosis pipeline; paths and
//! tunables are defaults for [`crate::CoreConfig`].

/// Added when a selected symptom name occurs in a syndrome's characteristics text.
pub const CHARACTERISTIC_MATCH_WEIGHT: u32 = 30;

/// Added when a selected symptom shares the syndrome's category.
pub const CATEGORY_MATCH_WEIGHT: u32 = 10;

/// Added to every syndrome for each numeric answer at or above [`HIGH_INTENSITY_THRESHOLD`].
pub const HIGH_INTENSITY_ANSWER_BONUS: u32 = 5;

/// Numeric answers at or above this value earn [`HIGH_INTENSITY_ANSWER_BONUS`].
pub const HIGH_INTENSITY_THRESHOLD: f64 = 7.0;

/// Maximum syndromes returned by one diagnosis.
pub const MAX_SYNDROMES: usize = 5;

/// Maximum treatment axes returned by one diagnosis.
pub const MAX_TREATMENT_AXES: usize = 3;

/// Maximum herb recommendations returned by one diagnosis.
pub const MAX_HERBS: usize = 5;

/// Default catalog location, relative to the working directory.
pub const DEFAULT_CATALOG_PATH: &str = "catalog/seed.yaml";

/// Default root directory for diagnosis log files.
pub const DEFAULT_AUDIT_DIR: &str = "diagnosis_logs";

/// Filename of the diagnosis log inside a session's sharded directory.
pub const DIAGNOSIS_LOG_FILENAME: &str = "diagnosis_log.json";

/// Prefix of a diagnosis log record id (`log-<session id>`).
pub const DIAGNOSIS_LOG_ID_PREFIX: &str = "log-";

pub const DEFAULT_CATALOG_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_AUDIT_QUEUE_CAPACITY: usize = 1_024;
pub const DEFAULT_AUDIT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_AUDIT_RETRY_BACKOFF_MS: u64 = 200;
pub const DEFAULT_AUDIT_WRITE_TIMEOUT_MS: u64 = 2_000;
