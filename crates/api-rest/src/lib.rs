//! # API REST
//!
//! REST API implementation for HerbDx.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON envelopes, CORS, rejection mapping)
//!
//! Uses `api-shared` for wire types and request validation, and `herbdx-core` for the
//! diagnosis pipeline. The server itself is started by the root `herbdx-run` binary.

#![warn(rust_2018_idioms)]

mod error;

pub use error::ApiError;

use api_shared::{
    validate_diagnosis_request, DiagnosisDto, DiagnosisReq, DiagnosisRes, ErrorRes, FieldError,
    HealthRes, HealthService, QuestionDto, QuestionListRes, SymptomDto, SymptomListRes,
};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use herbdx_core::DiagnosisService;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Application state for the REST API server.
#[derive(Clone)]
pub struct AppState {
    pub diagnosis: DiagnosisService,
}

impl AppState {
    pub fn new(diagnosis: DiagnosisService) -> Self {
        Self { diagnosis }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, list_symptoms, list_questions, create_diagnosis),
    components(schemas(
        HealthRes,
        SymptomDto,
        SymptomListRes,
        QuestionDto,
        api_shared::RadioOptionDto,
        QuestionListRes,
        DiagnosisReq,
        api_shared::AnswerReq,
        DiagnosisRes,
        DiagnosisDto,
        api_shared::SyndromeResultDto,
        api_shared::TreatmentAxisDto,
        api_shared::HerbDto,
        ErrorRes,
        FieldError,
    ))
)]
struct ApiDoc;

/// Build the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/symptoms", get(list_symptoms))
        .route("/api/questions", get(list_questions))
        .route("/api/diagnosis", post(create_diagnosis))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
struct SymptomQuery {
    /// Only return symptoms in this category.
    category: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/symptoms",
    params(SymptomQuery),
    responses(
        (status = 200, description = "Active symptoms in display order", body = SymptomListRes),
        (status = 503, description = "Catalog unavailable", body = ErrorRes)
    )
)]
/// List active symptoms
///
/// # Errors
/// Returns `503 Service Unavailable` if the catalog cannot be read in time.
#[axum::debug_handler]
async fn list_symptoms(
    State(state): State<AppState>,
    Query(query): Query<SymptomQuery>,
) -> Result<Json<SymptomListRes>, ApiError> {
    let symptoms = state
        .diagnosis
        .active_symptoms(query.category.as_deref())
        .await?;

    Ok(Json(SymptomListRes {
        success: true,
        data: symptoms.into_iter().map(SymptomDto::from).collect(),
    }))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
struct QuestionQuery {
    /// Only return this symptom's questions plus universal ones.
    symptom_id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/questions",
    params(QuestionQuery),
    responses(
        (status = 200, description = "Active questions in display order", body = QuestionListRes),
        (status = 503, description = "Catalog unavailable", body = ErrorRes)
    )
)]
/// List active questions
///
/// # Errors
/// Returns `503 Service Unavailable` if the catalog cannot be read in time.
#[axum::debug_handler]
async fn list_questions(
    State(state): State<AppState>,
    Query(query): Query<QuestionQuery>,
) -> Result<Json<QuestionListRes>, ApiError> {
    let questions = state
        .diagnosis
        .active_questions(query.symptom_id.as_deref())
        .await?;

    Ok(Json(QuestionListRes {
        success: true,
        data: questions.into_iter().map(QuestionDto::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/diagnosis",
    request_body = DiagnosisReq,
    responses(
        (status = 200, description = "Diagnosis result", body = DiagnosisRes),
        (status = 400, description = "Validation error", body = ErrorRes),
        (status = 503, description = "Catalog unavailable", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Run a diagnosis
///
/// Scores syndromes for the selected symptoms and answers, and returns them with treatment
/// axes and herb recommendations. The audit record is written in the background; a failure
/// to write it does not affect this response.
///
/// # Errors
/// Returns `400 Bad Request` if the body is not valid JSON or fails validation, and
/// `503 Service Unavailable` if the catalog cannot be read in time.
#[axum::debug_handler]
async fn create_diagnosis(
    State(state): State<AppState>,
    payload: Result<Json<DiagnosisReq>, JsonRejection>,
) -> Result<Json<DiagnosisRes>, ApiError> {
    let Json(req) =
        payload.map_err(|e| ApiError::Validation(vec![FieldError::body(e.body_text())]))?;
    let request = validate_diagnosis_request(req).map_err(ApiError::Validation)?;

    let diagnosis = state.diagnosis.diagnose(request).await?;

    Ok(Json(DiagnosisRes {
        success: true,
        data: DiagnosisDto::from(diagnosis),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use herbdx_core::{AuditOptions, AuditWriter, InMemoryCatalog, InMemoryDiagnosisLogStore};
    use http_body_util::BodyExt;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let seed = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../catalog/seed.yaml");
        let catalog = InMemoryCatalog::from_file(&seed).unwrap();
        let store = Arc::new(InMemoryDiagnosisLogStore::new());
        let (writer, _worker) = AuditWriter::spawn(store, AuditOptions::default());
        let service = DiagnosisService::new(Arc::new(catalog), writer, Duration::from_secs(2));
        router(AppState::new(service))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_alive() {
        let response = test_app().oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["ok"], true);
    }

    #[tokio::test]
    async fn symptoms_filtered_by_category() {
        let response = test_app()
            .oneshot(get("/api/symptoms?category=%EC%86%8C%ED%99%94%EA%B8%B0"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        let names: Vec<&str> = json["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["소화불량", "복통"]);
        assert_eq!(json["data"][0]["displayOrder"], 3);
    }

    #[tokio::test]
    async fn questions_use_wire_shape() {
        let response = test_app()
            .oneshot(get("/api/questions?symptomId=s-fatigue"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let data = json["data"].as_array().unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data[0]["questionType"], "radio");
        assert_eq!(data[0]["options"].as_array().unwrap().len(), 4);
        assert_eq!(data[2]["questionType"], "slider");
        assert_eq!(data[2]["sliderMax"], 10);
    }

    #[tokio::test]
    async fn diagnosis_returns_ranked_result() {
        let response = test_app()
            .oneshot(post_json(
                "/api/diagnosis",
                r#"{"symptomIds":["s-fatigue"],"answers":[{"questionId":"q-fatigue-level","value":"3"}]}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let data = &json["data"];
        assert!(data["sessionId"].as_str().unwrap().starts_with("diag-"));
        assert!(data["createdAt"].as_str().unwrap().ends_with('Z'));
        assert_eq!(data["syndromes"][0]["name"], "기허");
        assert_eq!(data["syndromes"][0]["matchScore"], 30);
        assert_eq!(data["syndromes"][0]["evidences"][0], "피로");
        assert_eq!(data["treatmentAxes"][0]["name"], "보기법(補氣法)");
        assert_eq!(data["herbs"][0]["name"], "인삼");
        assert_eq!(data["herbs"][1]["name"], "황기");
    }

    #[tokio::test]
    async fn diagnosis_without_matches_is_still_success() {
        let response = test_app()
            .oneshot(post_json("/api/diagnosis", r#"{"symptomIds":["s-insomnia"],"answers":[]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["data"]["syndromes"].as_array().unwrap().is_empty());
        assert!(json["data"]["treatmentAxes"].as_array().unwrap().is_empty());
        assert!(json["data"]["herbs"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn diagnosis_rejects_duplicate_symptoms() {
        let response = test_app()
            .oneshot(post_json(
                "/api/diagnosis",
                r#"{"symptomIds":["s-fatigue","s-fatigue"],"answers":[]}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "VALIDATION_ERROR");
        assert_eq!(json["details"][0]["field"], "symptomIds");
    }

    #[tokio::test]
    async fn diagnosis_rejects_malformed_json() {
        let response = test_app()
            .oneshot(post_json("/api/diagnosis", "{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["details"][0]["field"], "body");
    }

    #[tokio::test]
    async fn diagnosis_requires_answers_key() {
        let response = test_app()
            .oneshot(post_json("/api/diagnosis", r#"{"symptomIds":["s-fatigue"]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "VALIDATION_ERROR");
        assert_eq!(json["details"][0]["field"], "body");
        assert!(json["details"][0]["message"]
            .as_str()
            .unwrap()
            .contains("answers"));
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let response = test_app()
            .oneshot(get("/api-docs/openapi.json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["paths"]["/api/diagnosis"].is_object());
    }
}
