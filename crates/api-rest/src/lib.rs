//! # API REST
//!
//! Development backend for the ward board.
//!
//! Handles:
//! - the patients resource (`/patients`, `/patients/:id`) over an in-memory [`PatientStore`]
//! - the health check and the OpenAPI document
//! - REST-specific concerns (JSON bodies, status codes, CORS)
//!
//! The binary in the workspace root wires this router to a listener.

#![warn(rust_2018_idioms)]

pub mod store;

pub use store::{PatientStore, StoreError, StoreResult};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};
use ward_directory::{Department, NewPatient, Patient, PatientId, Priority, StatusTrack};

/// Health check response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, list_patients, create_patient, update_patient, delete_patient),
    components(schemas(
        HealthRes,
        Patient,
        NewPatient,
        PatientId,
        StatusTrack,
        Department,
        Priority
    ))
)]
pub struct ApiDoc;

/// Errors returned by the handlers, mapped onto HTTP statuses.
#[derive(Debug)]
struct ApiError(StoreError);

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Invalid { .. } => StatusCode::BAD_REQUEST,
            StoreError::SeedRead(_) | StoreError::SeedParse { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Build the backend router over `store`.
pub fn router(store: PatientStore) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/patients", get(list_patients).post(create_patient))
        .route(
            "/patients/:id",
            axum::routing::patch(update_patient).delete(delete_patient),
        )
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(CorsLayer::permissive())
        .with_state(store)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
#[axum::debug_handler]
async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Ward patients backend is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "All stored patients", body = [Patient])
    )
)]
#[axum::debug_handler]
async fn list_patients(State(store): State<PatientStore>) -> Json<Vec<Patient>> {
    Json(store.list())
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = NewPatient,
    responses(
        (status = 201, description = "Patient created", body = Patient),
        (status = 422, description = "Body is not a valid patient")
    )
)]
#[axum::debug_handler]
async fn create_patient(
    State(store): State<PatientStore>,
    Json(req): Json<NewPatient>,
) -> (StatusCode, Json<Patient>) {
    let created = store.create(req);
    tracing::info!(id = %created.id, department = %created.department, "patient created");
    (StatusCode::CREATED, Json(created))
}

#[utoipa::path(
    patch,
    path = "/patients/{id}",
    params(("id" = u64, Path, description = "Patient id")),
    request_body(content = Patient, description = "Full or partial patient; omitted fields keep their stored values"),
    responses(
        (status = 200, description = "Merged patient", body = Patient),
        (status = 400, description = "Merged record is not a valid patient"),
        (status = 404, description = "Unknown patient id")
    )
)]
#[axum::debug_handler]
async fn update_patient(
    State(store): State<PatientStore>,
    Path(id): Path<u64>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<Patient>, ApiError> {
    let id = PatientId(id);
    match store.merge(id, patch) {
        Ok(updated) => {
            tracing::info!(%id, department = %updated.department, "patient updated");
            Ok(Json(updated))
        }
        Err(err) => {
            tracing::warn!(%id, error = %err, "patient update rejected");
            Err(err.into())
        }
    }
}

#[utoipa::path(
    delete,
    path = "/patients/{id}",
    params(("id" = u64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient deleted"),
        (status = 404, description = "Unknown patient id")
    )
)]
#[axum::debug_handler]
async fn delete_patient(
    State(store): State<PatientStore>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = PatientId(id);
    store.delete(id)?;
    tracing::info!(%id, "patient deleted");
    Ok(Json(serde_json::json!({})))
}
