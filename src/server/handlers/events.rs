//! Recent event listing and manual event emission.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::super::error::ApiError;
use super::super::AppState;
use super::bounded;

#[derive(Debug, Deserialize)]
pub struct RecentParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EmitPayload {
    #[serde(default)]
    pub data: serde_json::Value,
}

pub async fn recent_events(
    State(state): State<AppState>,
    params: Result<Query<RecentParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params?;
    let limit = bounded("limit", params.limit, 20, 1, 200)?;

    let Some(log) = state.event_log.as_ref() else {
        return Ok(Json(json!({ "enabled": false, "items": [] })));
    };
    let recent = log.recent(limit).await;
    Ok(Json(json!(recent)))
}

pub async fn emit_event(
    State(state): State<AppState>,
    payload: Result<Json<EmitPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;

    let Some(log) = state.event_log.as_ref() else {
        return Ok(Json(json!({ "enabled": false })));
    };

    let data = match payload.data {
        serde_json::Value::Null => serde_json::Value::String(String::new()),
        other => other,
    };
    let bytes = match &data {
        serde_json::Value::String(s) => s.len(),
        other => other.to_string().len(),
    };

    let event = log.emit(data).await;
    state.metrics.record_event();
    Ok(Json(json!({ "ok": true, "bytes": bytes, "offset": event.offset })))
}
