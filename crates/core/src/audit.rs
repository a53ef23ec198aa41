//! # Diagnosis audit log
//!
//! Every diagnosis run produces one write-once [`DiagnosisLogRecord`]. Records are handed to an
//! [`AuditWriter`], which queues them for a background worker; the diagnosis response never
//! waits on the write and never fails because of it.
//!
//! The worker retries failed appends a bounded number of times. A record that still cannot be
//! written is logged at `error` level and dropped. A full queue drops the new record at `warn`
//! level instead of blocking the caller.
//!
//! ## Storage layout
//!
//! [`FileDiagnosisLogStore`] writes one JSON file per session, sharded by the session's UUID:
//!
//! ```text
//! <audit_dir>/<s1>/<s2>/<uuid>/diagnosis_log.json
//! ```
//!
//! where `s1` and `s2` are the first two and next two hex characters of the UUID. Each record is
//! written to a staging file in the same directory and then hard-linked into place, so a
//! complete record is never overwritten and an interrupted write never blocks a retry.

use crate::config::AuditOptions;
use crate::constants::{DIAGNOSIS_LOG_FILENAME, DIAGNOSIS_LOG_ID_PREFIX};
use crate::diagnosis::{created_at_format, Answer, DiagnosisRequest};
use crate::error::{AuditError, AuditResult};
use crate::herbs::HerbRecommendation;
use crate::scoring::SyndromeMatch;
use crate::treatment::TreatmentAxisMatch;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use herbdx_uuid::{SessionId, UuidService};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Computed results of one diagnosis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisOutcome {
    pub syndromes: Vec<SyndromeMatch>,
    pub treatment_axes: Vec<TreatmentAxisMatch>,
    pub herbs: Vec<HerbRecommendation>,
}

impl DiagnosisOutcome {
    pub fn empty() -> Self {
        Self {
            syndromes: Vec::new(),
            treatment_axes: Vec::new(),
            herbs: Vec::new(),
        }
    }
}

/// Audit record of one diagnosis run: the request as submitted plus the full result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisLogRecord {
    pub id: String,
    pub session_id: SessionId,
    pub selected_symptoms: Vec<String>,
    pub answers: Vec<Answer>,
    pub results: DiagnosisOutcome,
    #[serde(with = "created_at_format")]
    pub created_at: DateTime<Utc>,
}

impl DiagnosisLogRecord {
    pub fn new(session_id: &SessionId, request: &DiagnosisRequest, results: DiagnosisOutcome) -> Self {
        Self {
            id: format!("{}{}", DIAGNOSIS_LOG_ID_PREFIX, session_id),
            session_id: session_id.clone(),
            selected_symptoms: request.symptom_ids.clone(),
            answers: request.answers.clone(),
            results,
            created_at: session_id.timestamp(),
        }
    }
}

/// Append-only sink for diagnosis log records.
#[async_trait]
pub trait DiagnosisLogStore: Send + Sync {
    /// Persist `record`. Fails with [`AuditError::AlreadyRecorded`] if a record for the same
    /// session exists.
    async fn append(&self, record: &DiagnosisLogRecord) -> AuditResult<()>;
}

/// Stores each record as a JSON file in a sharded directory tree.
#[derive(Debug, Clone)]
pub struct FileDiagnosisLogStore {
    root: PathBuf,
}

impl FileDiagnosisLogStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Location of the record file for `session_id`.
    pub fn path_for(&self, session_id: &SessionId) -> PathBuf {
        session_id
            .uuid()
            .sharded_dir(&self.root)
            .join(DIAGNOSIS_LOG_FILENAME)
    }
}

#[async_trait]
impl DiagnosisLogStore for FileDiagnosisLogStore {
    async fn append(&self, record: &DiagnosisLogRecord) -> AuditResult<()> {
        let dir = record.session_id.uuid().sharded_dir(&self.root);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(AuditError::DirCreation)?;

        let json = serde_json::to_vec_pretty(record).map_err(AuditError::Serialization)?;

        // The record only becomes visible under its final name once fully written.
        let staging = dir.join(format!(
            "{}.{}.tmp",
            DIAGNOSIS_LOG_FILENAME,
            UuidService::new()
        ));
        tokio::fs::write(&staging, &json)
            .await
            .map_err(AuditError::FileWrite)?;

        let result = publish(&staging, &dir.join(DIAGNOSIS_LOG_FILENAME), &json, record).await;
        if let Err(e) = tokio::fs::remove_file(&staging).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %staging.display(), "failed to remove staging file: {}", e);
            }
        }
        result
    }
}

/// Link a fully written staging file into place without overwriting a complete record.
///
/// An existing file with the same bytes counts as success, so a retry after an attempt that
/// timed out once the link was made does not report a duplicate. An existing file that does
/// not parse is left over from an interrupted write and is replaced.
async fn publish(
    staging: &Path,
    path: &Path,
    json: &[u8],
    record: &DiagnosisLogRecord,
) -> AuditResult<()> {
    match tokio::fs::hard_link(staging, path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            let existing = tokio::fs::read(path).await.map_err(AuditError::FileWrite)?;
            if existing == json {
                return Ok(());
            }
            if serde_json::from_slice::<DiagnosisLogRecord>(&existing).is_ok() {
                return Err(AuditError::AlreadyRecorded(record.session_id.to_string()));
            }
            tracing::warn!(
                session_id = %record.session_id,
                "replacing incomplete diagnosis log file"
            );
            tokio::fs::rename(staging, path)
                .await
                .map_err(AuditError::FileWrite)
        }
        Err(e) => Err(AuditError::FileWrite(e)),
    }
}

/// Keeps records in memory. Used by tests and CLI dry runs.
#[derive(Debug, Default)]
pub struct InMemoryDiagnosisLogStore {
    records: RwLock<Vec<DiagnosisLogRecord>>,
}

impl InMemoryDiagnosisLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> AuditResult<Vec<DiagnosisLogRecord>> {
        let records = self
            .records
            .read()
            .map_err(|e| AuditError::Store(e.to_string()))?;
        Ok(records.clone())
    }
}

#[async_trait]
impl DiagnosisLogStore for InMemoryDiagnosisLogStore {
    async fn append(&self, record: &DiagnosisLogRecord) -> AuditResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| AuditError::Store(e.to_string()))?;
        if records.iter().any(|r| r.id == record.id) {
            return Err(AuditError::AlreadyRecorded(record.session_id.to_string()));
        }
        records.push(record.clone());
        Ok(())
    }
}

/// Handle for queueing diagnosis log records. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AuditWriter {
    tx: mpsc::Sender<DiagnosisLogRecord>,
}

/// The background task draining an [`AuditWriter`] queue.
#[derive(Debug)]
pub struct AuditWorker {
    handle: JoinHandle<()>,
}

impl AuditWriter {
    /// Start a worker that appends queued records to `store`.
    ///
    /// Must be called from within a Tokio runtime. The worker stops once every clone of the
    /// returned writer has been dropped and the queue is drained.
    pub fn spawn(store: Arc<dyn DiagnosisLogStore>, options: AuditOptions) -> (Self, AuditWorker) {
        let (tx, rx) = mpsc::channel(options.queue_capacity.max(1));
        let handle = tokio::spawn(run_worker(rx, store, options));
        (Self { tx }, AuditWorker { handle })
    }

    /// Queue `record` without waiting. Never fails; dropped records are logged.
    pub fn submit(&self, record: DiagnosisLogRecord) {
        match self.tx.try_send(record) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(record)) => {
                tracing::warn!(
                    session_id = %record.session_id,
                    "audit queue full; dropping diagnosis log"
                );
            }
            Err(mpsc::error::TrySendError::Closed(record)) => {
                tracing::error!(
                    session_id = %record.session_id,
                    "audit worker stopped; dropping diagnosis log"
                );
            }
        }
    }
}

impl AuditWorker {
    /// Wait for the worker to finish writing queued records.
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            tracing::error!("audit worker failed: {}", e);
        }
    }
}

async fn run_worker(
    mut rx: mpsc::Receiver<DiagnosisLogRecord>,
    store: Arc<dyn DiagnosisLogStore>,
    options: AuditOptions,
) {
    while let Some(record) = rx.recv().await {
        // Failures are already logged inside.
        let _ = write_with_retry(store.as_ref(), &record, &options).await;
    }
    tracing::debug!("audit worker stopped");
}

async fn write_with_retry(
    store: &dyn DiagnosisLogStore,
    record: &DiagnosisLogRecord,
    options: &AuditOptions,
) -> AuditResult<()> {
    let max_attempts = options.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let result = match tokio::time::timeout(options.write_timeout, store.append(record)).await
        {
            Ok(result) => result,
            Err(_) => Err(AuditError::Timeout(options.write_timeout.as_millis())),
        };

        match result {
            Ok(()) => {
                tracing::debug!(session_id = %record.session_id, attempt, "diagnosis log written");
                return Ok(());
            }
            Err(e @ AuditError::AlreadyRecorded(_)) => {
                tracing::error!(session_id = %record.session_id, "{}", e);
                return Err(e);
            }
            Err(e) if attempt < max_attempts => {
                tracing::warn!(
                    session_id = %record.session_id,
                    attempt,
                    "diagnosis log write failed, retrying: {}",
                    e
                );
                tokio::time::sleep(options.retry_backoff * attempt).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(
                    session_id = %record.session_id,
                    attempts = attempt,
                    "diagnosis log lost: {}",
                    e
                );
                return Err(e);
            }
        }
    }
}
