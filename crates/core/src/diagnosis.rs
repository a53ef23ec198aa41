//! Diagnosis orchestration.
//!
//! One run: resolve symptoms, score syndromes, select treatment axes, recommend herbs, queue
//! the audit record, return the result. Each catalog call is bounded by the configured
//! timeout. The audit write happens in the background and cannot fail the run.

use crate::audit::{AuditWriter, DiagnosisLogRecord, DiagnosisOutcome};
use crate::catalog::{CatalogReader, Question, Symptom};
use crate::error::{CatalogResult, DiagnosisError, DiagnosisResult};
use crate::herbs::{recommend_herbs, HerbRecommendation};
use crate::scoring::{score_syndromes, SyndromeMatch};
use crate::treatment::{select_treatment_axes, TreatmentAxisMatch};
use chrono::{DateTime, Utc};
use herbdx_uuid::{SessionId, SessionIdGenerator};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// An answer value: numeric for sliders, text for radio options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(f64),
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: String,
    pub value: AnswerValue,
}

/// Input of one diagnosis run. Assumed already validated by the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRequest {
    pub symptom_ids: Vec<String>,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

/// Result of one diagnosis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub session_id: SessionId,
    pub syndromes: Vec<SyndromeMatch>,
    pub treatment_axes: Vec<TreatmentAxisMatch>,
    pub herbs: Vec<HerbRecommendation>,
    #[serde(with = "created_at_format")]
    pub created_at: DateTime<Utc>,
}

impl Diagnosis {
    fn new(session_id: SessionId, outcome: DiagnosisOutcome) -> Self {
        Self {
            created_at: session_id.timestamp(),
            session_id,
            syndromes: outcome.syndromes,
            treatment_axes: outcome.treatment_axes,
            herbs: outcome.herbs,
        }
    }

    /// `createdAt` as sent to clients: RFC 3339, UTC, millisecond precision.
    pub fn created_at_rfc3339(&self) -> String {
        created_at_format::render(&self.created_at)
    }
}

/// Serde adapter for `createdAt` timestamps (`2026-01-11T14:35:22.045Z`).
pub(crate) mod created_at_format {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn render(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&render(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Runs the diagnosis pipeline against a catalog. Cheap to clone; clones share the catalog,
/// the audit queue and the session id sequence.
#[derive(Clone)]
pub struct DiagnosisService {
    catalog: Arc<dyn CatalogReader>,
    audit: AuditWriter,
    sessions: Arc<SessionIdGenerator>,
    catalog_timeout: Duration,
}

impl DiagnosisService {
    pub fn new(catalog: Arc<dyn CatalogReader>, audit: AuditWriter, catalog_timeout: Duration) -> Self {
        Self {
            catalog,
            audit,
            sessions: Arc::new(SessionIdGenerator::new()),
            catalog_timeout,
        }
    }

    pub async fn active_symptoms(&self, category: Option<&str>) -> DiagnosisResult<Vec<Symptom>> {
        self.fetch("symptoms", self.catalog.active_symptoms(category))
            .await
    }

    pub async fn active_questions(&self, symptom_id: Option<&str>) -> DiagnosisResult<Vec<Question>> {
        self.fetch("questions", self.catalog.active_questions(symptom_id))
            .await
    }

    /// Run one diagnosis.
    ///
    /// # Errors
    ///
    /// Returns [`DiagnosisError`] only when the catalog cannot be read in time. Empty catalog
    /// data yields empty result lists. Audit failures are logged and never returned.
    pub async fn diagnose(&self, request: DiagnosisRequest) -> DiagnosisResult<Diagnosis> {
        let session_id = self.sessions.generate();

        let symptoms = self
            .fetch("symptoms", self.catalog.symptoms_by_ids(&request.symptom_ids))
            .await?;
        if symptoms.len() < request.symptom_ids.len() {
            tracing::debug!(
                session_id = %session_id,
                requested = request.symptom_ids.len(),
                resolved = symptoms.len(),
                "some selected symptoms are unknown or repeated"
            );
        }
        let symptom_ids: Vec<String> = symptoms.into_iter().map(|s| s.id).collect();

        let relations = self
            .fetch("relations", self.catalog.symptom_relations(&symptom_ids))
            .await?;
        let syndromes = self
            .fetch("syndromes", self.catalog.active_syndromes())
            .await?;

        let matches = score_syndromes(&syndromes, &relations, &request.answers);

        let outcome = if matches.is_empty() {
            DiagnosisOutcome::empty()
        } else {
            let matched_ids: Vec<String> = matches.iter().map(|m| m.id.clone()).collect();
            let axes = self
                .fetch(
                    "treatment_axes",
                    self.catalog.treatment_axes_for_syndromes(&matched_ids),
                )
                .await?;
            let links = self
                .fetch("herbs", self.catalog.herb_links_for_syndromes(&matched_ids))
                .await?;

            DiagnosisOutcome {
                syndromes: matches,
                treatment_axes: select_treatment_axes(axes),
                herbs: recommend_herbs(links),
            }
        };

        self.audit.submit(DiagnosisLogRecord::new(
            &session_id,
            &request,
            outcome.clone(),
        ));

        tracing::info!(
            session_id = %session_id,
            syndromes = outcome.syndromes.len(),
            treatment_axes = outcome.treatment_axes.len(),
            herbs = outcome.herbs.len(),
            "diagnosis completed"
        );

        Ok(Diagnosis::new(session_id, outcome))
    }

    async fn fetch<T>(
        &self,
        stage: &'static str,
        call: impl Future<Output = CatalogResult<T>>,
    ) -> DiagnosisResult<T> {
        match tokio::time::timeout(self.catalog_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => {
                tracing::error!(stage, "catalog read failed: {}", source);
                Err(DiagnosisError::Catalog { stage, source })
            }
            Err(_) => {
                tracing::error!(stage, "catalog read timed out");
                Err(DiagnosisError::CatalogTimeout {
                    stage,
                    timeout_ms: self.catalog_timeout.as_millis(),
                })
            }
        }
    }
}
