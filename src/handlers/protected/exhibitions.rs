// handlers/protected/exhibitions.rs - /api/exhibitions and /api/ex_active/:eid handlers

use axum::Extension;
use serde_json::{json, Value};

use super::SearchQuery;
use crate::database::models::{Exhibition, ExhibitionPatch, NewExhibition};
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser};
use crate::services::ExhibitionService;

/// GET /api/exhibitions?q=
pub async fn exhibitions_get(ApiQuery(query): ApiQuery<SearchQuery>) -> ApiResult<Vec<Exhibition>> {
    let rows = ExhibitionService::new().await?.list(query.q.as_deref()).await?;
    Ok(ApiResponse::success(rows))
}

/// PUT /api/exhibitions
pub async fn exhibitions_put(
    Extension(auth): Extension<AuthUser>,
    ApiJson(input): ApiJson<NewExhibition>,
) -> ApiResult<Exhibition> {
    auth.require_admin()?;
    let row = ExhibitionService::new().await?.create(input).await?;
    Ok(ApiResponse::success(row))
}

/// GET /api/exhibitions/:id
pub async fn exhibition_get(ApiPath(id): ApiPath<i64>) -> ApiResult<Exhibition> {
    let row = ExhibitionService::new().await?.get(id).await?;
    Ok(ApiResponse::success(row))
}

/// PATCH /api/exhibitions/:id
pub async fn exhibition_patch(
    Extension(auth): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<ExhibitionPatch>,
) -> ApiResult<Exhibition> {
    auth.require_admin()?;
    let row = ExhibitionService::new().await?.update(id, patch).await?;
    Ok(ApiResponse::success(row))
}

/// DELETE /api/exhibitions/:id
pub async fn exhibition_delete(Extension(auth): Extension<AuthUser>, ApiPath(id): ApiPath<i64>) -> ApiResult<Value> {
    auth.require_admin()?;
    ExhibitionService::new().await?.delete(id).await?;
    Ok(ApiResponse::success(json!({ "message": "exhibition deleted successfully" })))
}

/// POST /api/ex_active/:eid
pub async fn ex_active_post(Extension(auth): Extension<AuthUser>, ApiPath(eid): ApiPath<i64>) -> ApiResult<Exhibition> {
    auth.require_admin()?;
    let row = ExhibitionService::new().await?.activate(eid).await?;
    tracing::info!("Exhibition {} marked active by {}", eid, auth.username);
    Ok(ApiResponse::success(row))
}
