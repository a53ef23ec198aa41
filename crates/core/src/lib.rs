//! # HerbDx Core
//!
//! Core diagnosis pipeline for the HerbDx syndrome matcher.
//!
//! This crate contains the catalog model and the matching logic:
//! - Catalog loading and read access ([`catalog`])
//! - The precomputed symptom↔syndrome relation table ([`relations`])
//! - Syndrome scoring, treatment-axis selection, and herb recommendation
//! - Orchestration of a diagnosis run ([`DiagnosisService`])
//! - The write-behind diagnosis audit log ([`audit`])
//!
//! **No API concerns**: HTTP servers, request validation, and CLI parsing belong in `api-rest`,
//! `api-shared`, and `herbdx-cli`.

pub mod audit;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod diagnosis;
pub mod error;
pub mod herbs;
pub mod relations;
pub mod scoring;
pub mod treatment;

#[cfg(test)]
mod test_support;

pub use audit::{
    AuditWorker, AuditWriter, DiagnosisLogRecord, DiagnosisLogStore, DiagnosisOutcome,
    FileDiagnosisLogStore, InMemoryDiagnosisLogStore,
};
pub use catalog::{CatalogReader, CatalogSummary, InMemoryCatalog};
pub use config::{AuditOptions, CoreConfig};
pub use diagnosis::{Answer, AnswerValue, Diagnosis, DiagnosisRequest, DiagnosisService};
pub use error::{
    AuditError, AuditResult, CatalogError, CatalogResult, ConfigError, ConfigResult,
    DiagnosisError, DiagnosisResult,
};
pub use herbs::HerbRecommendation;
pub use scoring::SyndromeMatch;
pub use treatment::TreatmentAxisMatch;

pub use herbdx_types::{MatchScore, NonEmptyText};
pub use herbdx_uuid::SessionId;
