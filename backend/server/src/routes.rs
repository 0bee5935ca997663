use std::sync::Arc;

use axum::{
    Extension, Json,
    body::Bytes,
    extract::State as AxumState,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;
use questions::SurveySubmission;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;

use crate::{
    config::{APP_NAME, APP_VERSION},
    error::AppError,
    page,
    state::State,
    stats,
    store::NewResponse,
    utils::{ClientIp, is_json, user_agent},
};

pub const SUBMIT_MESSAGE: &str = "¡Respuesta guardada correctamente!";
const NO_RESPONSES_MESSAGE: &str = "No hay respuestas aún";

#[derive(Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: &'static str,
    pub id: String,
}

pub async fn index_handler() -> Html<String> {
    Html(page::render())
}

pub async fn script_handler() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "application/javascript; charset=utf-8")],
        page::SCRIPT,
    )
}

pub async fn submit_handler(
    AxumState(state): AxumState<Arc<State>>,
    Extension(ClientIp(client_ip)): Extension<ClientIp>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SubmitResponse>, AppError> {
    if !is_json(&headers) {
        return Err(AppError::InvalidContentType);
    }

    let payload: Value =
        serde_json::from_slice(&body).map_err(|e| AppError::MalformedPayload(e.to_string()))?;
    let answers = SurveySubmission::from_json(&payload)?;

    let stored = state
        .store
        .save(NewResponse {
            created_at: Utc::now(),
            client_ip: Some(client_ip),
            user_agent: Some(user_agent(&headers)),
            answers,
        })
        .await?;

    Ok(Json(SubmitResponse {
        success: true,
        message: SUBMIT_MESSAGE,
        id: stored.id,
    }))
}

pub async fn responses_handler(
    AxumState(state): AxumState<Arc<State>>,
) -> Result<Json<Value>, AppError> {
    let responses = state.store.list().await?;

    Ok(Json(json!({
        "total": responses.len(),
        "responses": responses,
        "storage": state.store.kind(),
    })))
}

pub async fn stats_handler(AxumState(state): AxumState<Arc<State>>) -> Result<Json<Value>, AppError> {
    let responses = state.store.list().await?;

    if responses.is_empty() {
        return Ok(Json(json!({
            "total_responses": 0,
            "message": NO_RESPONSES_MESSAGE,
            "storage": state.store.kind(),
        })));
    }

    let stats = stats::compute(&responses);

    Ok(Json(json!({
        "total_responses": stats.total_responses,
        "distributions": stats.distributions,
        "averages": stats.averages,
        "storage": state.store.kind(),
    })))
}

pub async fn info_handler(AxumState(state): AxumState<Arc<State>>) -> Json<Value> {
    Json(json!({
        "app": APP_NAME,
        "version": APP_VERSION,
        "environment": state.config.environment,
        "storage": state.store.kind().label(),
        "started_at": state.started_at.to_rfc3339(),
        "rate_limit_enabled": state.config.rate_limit.enabled,
    }))
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "version": APP_VERSION,
    }))
}

pub async fn live_handler() -> Json<Value> {
    Json(json!({
        "status": "alive",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn ready_handler(AxumState(state): AxumState<Arc<State>>) -> Response {
    let mut checks = serde_json::Map::new();
    checks.insert("app".to_string(), json!(true));

    let ready = match state.store.check_database().await {
        Some(Ok(())) => {
            checks.insert("database".to_string(), json!(true));
            true
        }
        Some(Err(e)) => {
            error!("Database health check failed: {e}");
            checks.insert("database".to_string(), json!(false));
            false
        }
        None => {
            let writable = state.store.check_files().await;
            checks.insert("storage".to_string(), json!("file-based"));
            checks.insert("storage_writable".to_string(), json!(writable));
            writable
        }
    };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if ready { "ready" } else { "not_ready" },
            "checks": checks,
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
        .into_response()
}

pub async fn not_found_handler() -> AppError {
    AppError::NotFound
}
