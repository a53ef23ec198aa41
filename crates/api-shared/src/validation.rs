//! Request-schema validation for diagnosis submissions.
//!
//! The core assumes its input is well formed. Everything a client can get wrong is caught
//! here and reported per field, using dotted paths such as `answers.1.questionId`.

use crate::dto::DiagnosisReq;
use herbdx_core::{Answer, AnswerValue, DiagnosisRequest};
use serde::Serialize;
use std::collections::HashSet;
use utoipa::ToSchema;

/// Field name used when the request body itself cannot be parsed.
pub const BODY_FIELD: &str = "body";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// An error against the request body as a whole.
    pub fn body(message: impl Into<String>) -> Self {
        Self::new(BODY_FIELD, message)
    }
}

/// Check a diagnosis submission and convert it into a core request.
///
/// # Errors
///
/// Returns every problem found, not just the first:
/// - `symptomIds` is empty, contains a blank id, or repeats an id
/// - an answer has a blank `questionId` or a `value` that is neither a string nor a number
/// - two answers share a `questionId`
pub fn validate_diagnosis_request(req: DiagnosisReq) -> Result<DiagnosisRequest, Vec<FieldError>> {
    let mut errors = Vec::new();

    if req.symptom_ids.is_empty() {
        errors.push(FieldError::new(
            "symptomIds",
            "최소 1개 이상의 증상을 선택해주세요",
        ));
    }
    for (i, id) in req.symptom_ids.iter().enumerate() {
        if id.trim().is_empty() {
            errors.push(FieldError::new(
                format!("symptomIds.{}", i),
                "증상 ID는 비어 있을 수 없습니다",
            ));
        }
    }
    let unique_symptoms: HashSet<&str> = req.symptom_ids.iter().map(String::as_str).collect();
    if unique_symptoms.len() != req.symptom_ids.len() {
        errors.push(FieldError::new("symptomIds", "중복된 증상이 선택되었습니다"));
    }

    let mut answers = Vec::with_capacity(req.answers.len());
    for (i, answer) in req.answers.iter().enumerate() {
        if answer.question_id.trim().is_empty() {
            errors.push(FieldError::new(
                format!("answers.{}.questionId", i),
                "질문 ID는 필수입니다",
            ));
        }

        let value = match &answer.value {
            serde_json::Value::String(s) => Some(AnswerValue::Label(s.clone())),
            serde_json::Value::Number(n) => n.as_f64().map(AnswerValue::Number),
            _ => None,
        };
        match value {
            Some(value) => answers.push(Answer {
                question_id: answer.question_id.clone(),
                value,
            }),
            None => errors.push(FieldError::new(
                format!("answers.{}.value", i),
                "응답 값은 문자열 또는 숫자여야 합니다",
            )),
        }
    }
    let unique_questions: HashSet<&str> =
        req.answers.iter().map(|a| a.question_id.as_str()).collect();
    if unique_questions.len() != req.answers.len() {
        errors.push(FieldError::new("answers", "중복된 질문 응답이 있습니다"));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(DiagnosisRequest {
        symptom_ids: req.symptom_ids,
        answers,
    })
}
