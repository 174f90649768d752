//! JSON endpoints shared by both front-ends.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::error::{Error, InferenceError};
use crate::inference::InferenceService;
use crate::record::RawInput;
use crate::schema;

#[derive(Clone)]
struct ApiState {
    service: InferenceService,
    name: &'static str,
}

/// Build `/health`, `/api/schema` and `/api/predict`.
pub fn api_routes(service: InferenceService, name: &'static str) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/schema", get(describe_schema))
        .route("/api/predict", post(predict))
        .layer(CorsLayer::permissive())
        .with_state(ApiState { service, name })
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": state.name
    }))
}

async fn describe_schema() -> impl IntoResponse {
    Json(schema::describe())
}

/// POST /api/predict
///
/// 200 with the label, 422 for invalid input, 500/504 for inference failures.
/// A body that is not a JSON object gets axum's status with a JSON error.
async fn predict(
    State(state): State<ApiState>,
    payload: Result<Json<RawInput>, JsonRejection>,
) -> impl IntoResponse {
    let request_id = Uuid::new_v4();

    // Field values of any JSON shape deserialize; only a body that is not a
    // JSON object ends up here.
    let raw = match payload {
        Ok(Json(raw)) => raw,
        Err(rejection) => {
            return (
                rejection.status(),
                Json(serde_json::json!({
                    "request_id": request_id,
                    "error": rejection.body_text(),
                    "kind": "request",
                })),
            );
        }
    };

    match state.service.handle(request_id, &raw).await {
        Ok(result) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "request_id": request_id,
                "label": result.label().as_i64(),
                "likely": result.label().as_i64() == 1,
                "message": result.message(),
            })),
        ),
        Err(Error::Input(e)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "request_id": request_id,
                "error": e.to_string(),
                "kind": "input",
                "field": e.field(),
            })),
        ),
        Err(Error::Inference(e)) => {
            let status = match e {
                InferenceError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                Json(serde_json::json!({
                    "request_id": request_id,
                    "error": e.to_string(),
                    "kind": "inference",
                })),
            )
        }
    }
}
