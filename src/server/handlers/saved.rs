//! Saved search endpoints.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use super::super::error::ApiError;
use super::super::AppState;
use super::bounded;
use crate::models::{NewSavedSearch, SavedSearchOrder, SavedSearchPage, SavedSearchQuery, SortDir};
use crate::repository::DieselSavedSearchRepository;

#[derive(Debug, Deserialize)]
pub struct ListSavedParams {
    pub q: Option<String>,
    pub limit: Option<usize>,
    pub cursor: Option<i32>,
    pub order: Option<SavedSearchOrder>,
    pub dir: Option<SortDir>,
}

fn repo(state: &AppState) -> Result<Arc<DieselSavedSearchRepository>, ApiError> {
    state
        .saved
        .clone()
        .ok_or_else(|| ApiError::NotFound("Not found".to_string()))
}

pub async fn list_saved(
    State(state): State<AppState>,
    params: Result<Query<ListSavedParams>, QueryRejection>,
) -> Result<Json<SavedSearchPage>, ApiError> {
    let Query(params) = params?;
    let query = SavedSearchQuery {
        q: params.q,
        limit: bounded("limit", params.limit, 20, 1, 100)?,
        cursor: params.cursor,
        order: params.order.unwrap_or_default(),
        dir: params.dir.unwrap_or_default(),
    };

    let page = repo(&state)?.list(&query).await?;
    Ok(Json(page))
}

pub async fn create_saved(
    State(state): State<AppState>,
    payload: Result<Json<NewSavedSearch>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(new) = payload?;
    new.validate().map_err(ApiError::Validation)?;

    let saved = repo(&state)?.create(&new).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn delete_saved(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    repo(&state)?.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
