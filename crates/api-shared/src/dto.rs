//! JSON request and response bodies.
//!
//! Field names are camelCase on the wire. Successful responses are wrapped as
//! `{ "success": true, "data": ... }`; failures use [`ErrorRes`].

use crate::validation::FieldError;
use herbdx_core::catalog::{Question, QuestionKind, RadioOption, Symptom};
use herbdx_core::{Diagnosis, HerbRecommendation, SyndromeMatch, TreatmentAxisMatch};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SymptomDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub display_order: u32,
    pub is_active: bool,
}

impl From<Symptom> for SymptomDto {
    fn from(s: Symptom) -> Self {
        Self {
            id: s.id,
            name: s.name.into_inner(),
            description: s.description,
            category: s.category,
            display_order: s.display_order,
            is_active: s.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RadioOptionDto {
    pub value: String,
    pub label: String,
}

impl From<RadioOption> for RadioOptionDto {
    fn from(o: RadioOption) -> Self {
        Self {
            value: o.value,
            label: o.label,
        }
    }
}

/// A questionnaire item. Radio questions carry `options`; sliders carry `sliderMin` and
/// `sliderMax`. The other fields are `null`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDto {
    pub id: String,
    pub symptom_id: Option<String>,
    pub question_text: String,
    /// `radio` or `slider`.
    pub question_type: String,
    pub options: Option<Vec<RadioOptionDto>>,
    pub slider_min: Option<i64>,
    pub slider_max: Option<i64>,
    pub display_order: u32,
    pub is_active: bool,
}

impl From<Question> for QuestionDto {
    fn from(q: Question) -> Self {
        let question_type = q.kind.type_name().to_string();
        let (options, slider_min, slider_max) = match q.kind {
            QuestionKind::Radio { options } => (
                Some(options.into_iter().map(RadioOptionDto::from).collect()),
                None,
                None,
            ),
            QuestionKind::Slider { min, max } => (None, Some(min), Some(max)),
        };

        Self {
            id: q.id,
            symptom_id: q.symptom_id,
            question_text: q.text.into_inner(),
            question_type,
            options,
            slider_min,
            slider_max,
            display_order: q.display_order,
            is_active: q.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerReq {
    #[serde(default)]
    pub question_id: String,
    /// A string or a number.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
}

/// Diagnosis submission as received. Validate with
/// [`validate_diagnosis_request`](crate::validate_diagnosis_request) before use.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisReq {
    #[serde(default)]
    pub symptom_ids: Vec<String>,
    pub answers: Vec<AnswerReq>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyndromeResultDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// 0 to 100.
    pub match_score: u8,
    pub evidences: Vec<String>,
}

impl From<SyndromeMatch> for SyndromeResultDto {
    fn from(m: SyndromeMatch) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            match_score: m.match_score.value(),
            evidences: m.evidences,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TreatmentAxisDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<TreatmentAxisMatch> for TreatmentAxisDto {
    fn from(a: TreatmentAxisMatch) -> Self {
        Self {
            id: a.id,
            name: a.name,
            description: a.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HerbDto {
    pub id: String,
    pub name: String,
    pub scientific_name: Option<String>,
    pub effect: Option<String>,
    pub relevance_score: f64,
    pub evidence: Option<String>,
    pub reference_url: Option<String>,
}

impl From<HerbRecommendation> for HerbDto {
    fn from(h: HerbRecommendation) -> Self {
        Self {
            id: h.id,
            name: h.name,
            scientific_name: h.scientific_name,
            effect: h.effect,
            relevance_score: h.relevance_score,
            evidence: h.evidence,
            reference_url: h.reference_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisDto {
    pub session_id: String,
    pub syndromes: Vec<SyndromeResultDto>,
    pub treatment_axes: Vec<TreatmentAxisDto>,
    pub herbs: Vec<HerbDto>,
    /// RFC 3339 UTC timestamp with milliseconds.
    pub created_at: String,
}

impl From<Diagnosis> for DiagnosisDto {
    fn from(d: Diagnosis) -> Self {
        let created_at = d.created_at_rfc3339();
        Self {
            session_id: d.session_id.to_string(),
            syndromes: d.syndromes.into_iter().map(Into::into).collect(),
            treatment_axes: d.treatment_axes.into_iter().map(Into::into).collect(),
            herbs: d.herbs.into_iter().map(Into::into).collect(),
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SymptomListRes {
    pub success: bool,
    pub data: Vec<SymptomDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct QuestionListRes {
    pub success: bool,
    pub data: Vec<QuestionDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DiagnosisRes {
    pub success: bool,
    pub data: DiagnosisDto,
}

/// Error body: `{ "success": false, "error": CODE, "message": ..., "details": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ErrorRes {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
}

impl ErrorRes {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: code.to_string(),
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = details;
        self
    }
}
