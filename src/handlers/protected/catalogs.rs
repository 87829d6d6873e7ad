// handlers/protected/catalogs.rs - /api/:eid/catalogs* and hierarchy handlers

use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{Catalog, CatalogNode, CatalogPatch, NewCatalog};
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser};
use crate::services::CatalogService;

#[derive(Debug, Deserialize)]
pub struct DepthQuery {
    pub depth: Option<u32>,
}

/// GET /api/:eid/catalogs
pub async fn catalogs_get(Extension(auth): Extension<AuthUser>, ApiPath(eid): ApiPath<i64>) -> ApiResult<Vec<Catalog>> {
    auth.require_exhibition(eid)?;
    let rows = CatalogService::new().await?.list(eid).await?;
    Ok(ApiResponse::success(rows))
}

/// PUT /api/:eid/catalogs
pub async fn catalogs_put(
    Extension(auth): Extension<AuthUser>,
    ApiPath(eid): ApiPath<i64>,
    ApiJson(input): ApiJson<NewCatalog>,
) -> ApiResult<Catalog> {
    auth.require_admin()?;
    let row = CatalogService::new().await?.create(eid, input).await?;
    Ok(ApiResponse::success(row))
}

/// GET /api/:eid/catalogs/:id
pub async fn catalog_get(
    Extension(auth): Extension<AuthUser>,
    ApiPath((eid, id)): ApiPath<(i64, i64)>,
) -> ApiResult<Catalog> {
    auth.require_exhibition(eid)?;
    let row = CatalogService::new().await?.get(id, eid).await?;
    Ok(ApiResponse::success(row))
}

/// PATCH /api/:eid/catalogs/:id
pub async fn catalog_patch(
    Extension(auth): Extension<AuthUser>,
    ApiPath((eid, id)): ApiPath<(i64, i64)>,
    ApiJson(patch): ApiJson<CatalogPatch>,
) -> ApiResult<Catalog> {
    auth.require_admin()?;
    let row = CatalogService::new().await?.update(id, eid, patch).await?;
    Ok(ApiResponse::success(row))
}

/// DELETE /api/:eid/catalogs/:id - children are left in place
pub async fn catalog_delete(
    Extension(auth): Extension<AuthUser>,
    ApiPath((eid, id)): ApiPath<(i64, i64)>,
) -> ApiResult<Value> {
    auth.require_admin()?;
    CatalogService::new().await?.delete(id, eid).await?;
    Ok(ApiResponse::success(json!({ "message": "catalog deleted successfully" })))
}

/// GET /api/:eid/catalogs_root/:id
pub async fn catalog_root_get(
    Extension(auth): Extension<AuthUser>,
    ApiPath((eid, id)): ApiPath<(i64, i64)>,
) -> ApiResult<Catalog> {
    auth.require_exhibition(eid)?;
    let row = CatalogService::new().await?.root(id, eid).await?;
    Ok(ApiResponse::success(row))
}

/// GET /api/:eid/catalogs_path/:id - root first
pub async fn catalog_path_get(
    Extension(auth): Extension<AuthUser>,
    ApiPath((eid, id)): ApiPath<(i64, i64)>,
) -> ApiResult<Vec<Catalog>> {
    auth.require_exhibition(eid)?;
    let rows = CatalogService::new().await?.path(id, eid).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/:eid/sub_catalogs/:id?depth=N
pub async fn sub_catalogs_get(
    Extension(auth): Extension<AuthUser>,
    ApiPath((eid, id)): ApiPath<(i64, i64)>,
    ApiQuery(query): ApiQuery<DepthQuery>,
) -> ApiResult<Vec<CatalogNode>> {
    auth.require_exhibition(eid)?;
    let rows = CatalogService::new().await?.subtree(id, eid, query.depth).await?;
    Ok(ApiResponse::success(rows))
}
