//! Generic CRUD endpoints shared by every resource kind.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;

use super::{done, success, ApiResult};
use crate::errors::AppError;
use crate::models::{validate_scope_id, Record, Resource, ScopedFields};
use crate::AppState;

/// Query parameters of a delete request.
#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    #[serde(rename = "adminID")]
    pub admin_id: Option<String>,
}

/// GET /api/{kind}/{scopeId} - List all records of a scope.
pub async fn list_records<R: Resource>(
    State(state): State<AppState>,
    Path(scope_id): Path<String>,
) -> ApiResult<Vec<Record<R>>> {
    validate_scope_id(&scope_id).map_err(AppError::Validation)?;

    let records = state.repo.list::<R>(&scope_id).await?;
    success(format!("{} records fetched successfully", R::LABEL), records)
}

/// POST /api/{kind} - Create a record.
pub async fn create_record<R: Resource>(
    State(state): State<AppState>,
    payload: Result<Json<ScopedFields<R>>, JsonRejection>,
) -> ApiResult<Record<R>> {
    let ScopedFields { admin_id, fields } = parse_body(payload)?;
    validate_request(&admin_id, &fields)?;

    let record = state
        .repo
        .create(&admin_id, fields, state.config.unique_scope(R::KIND))
        .await?;
    success(format!("{} created successfully", R::LABEL), record)
}

/// PUT /api/{kind}/{id} - Replace the fields of a record.
pub async fn update_record<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ScopedFields<R>>, JsonRejection>,
) -> ApiResult<Record<R>> {
    let ScopedFields { admin_id, fields } = parse_body(payload)?;
    validate_request(&admin_id, &fields)?;

    let record = state
        .repo
        .update(&admin_id, &id, fields, state.config.unique_scope(R::KIND))
        .await?;
    success(format!("{} updated successfully", R::LABEL), record)
}

/// DELETE /api/{kind}/{id}?adminID= - Delete a record.
pub async fn delete_record<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    params: Result<Query<DeleteParams>, QueryRejection>,
) -> ApiResult<()> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let admin_id = params
        .admin_id
        .ok_or_else(|| AppError::Validation("Admin ID is required".to_string()))?;
    validate_scope_id(&admin_id).map_err(AppError::Validation)?;

    state.repo.delete::<R>(&admin_id, &id).await?;
    done(format!("{} deleted successfully", R::LABEL))
}

fn parse_body<R: Resource>(
    payload: Result<Json<ScopedFields<R>>, JsonRejection>,
) -> Result<ScopedFields<R>, AppError> {
    let Json(body) = payload.map_err(|e| {
        tracing::debug!("Rejected {} body: {}", R::KIND, e);
        AppError::BadRequest(e.body_text())
    })?;
    Ok(body)
}

fn validate_request<R: Resource>(admin_id: &str, fields: &R) -> Result<(), AppError> {
    validate_scope_id(admin_id).map_err(AppError::Validation)?;
    fields.validate().map_err(AppError::Validation)
}
