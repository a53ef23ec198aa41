/// Failures while loading or reading the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}", path = path.display())]
    FileRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to deserialize catalog YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },
    #[error("{kind} {id} references unknown {target} {reference}")]
    UnknownReference {
        kind: &'static str,
        id: String,
        target: &'static str,
        reference: String,
    },
    #[error("invalid {kind} {id}: {reason}")]
    InvalidEntry {
        kind: &'static str,
        id: String,
        reason: String,
    },
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Failures that abort a diagnosis run before a result exists.
///
/// Empty catalog data is never an error; it produces empty result lists.
#[derive(Debug, thiserror::Error)]
pub enum DiagnosisError {
    #[error("catalog error during {stage}: {source}")]
    Catalog {
        stage: &'static str,
        #[source]
        source: CatalogError,
    },
    #[error("catalog fetch timed out during {stage} after {timeout_ms} ms")]
    CatalogTimeout { stage: &'static str, timeout_ms: u128 },
}

pub type DiagnosisResult<T> = std::result::Result<T, DiagnosisError>;

/// Failures while persisting a diagnosis log record.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("failed to create diagnosis log directory: {0}")]
    DirCreation(std::io::Error),
    #[error("failed to write diagnosis log: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize diagnosis log: {0}")]
    Serialization(serde_json::Error),
    #[error("diagnosis log for session {0} already exists")]
    AlreadyRecorded(String),
    #[error("diagnosis log write timed out after {0} ms")]
    Timeout(u128),
    #[error("diagnosis log store failure: {0}")]
    Store(String),
}

pub type AuditResult<T> = std::result::Result<T, AuditError>;

/// Invalid startup configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
