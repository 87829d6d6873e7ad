// handlers/protected/items.rs - /api/:eid/items* handlers

use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{Item, ItemPatch, ItemSummary, NewItem};
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser};
use crate::services::ItemService;

#[derive(Debug, Deserialize)]
pub struct ItemQuery {
    pub q: Option<String>,
    pub cid: Option<i64>,
}

/// GET /api/:eid/items?q=&cid=
pub async fn items_get(
    Extension(auth): Extension<AuthUser>,
    ApiPath(eid): ApiPath<i64>,
    ApiQuery(query): ApiQuery<ItemQuery>,
) -> ApiResult<Vec<ItemSummary>> {
    auth.require_exhibition(eid)?;
    let rows = ItemService::new().await?.list(eid, query.q.as_deref(), query.cid).await?;
    Ok(ApiResponse::success(rows))
}

/// PUT /api/:eid/items
pub async fn items_put(
    Extension(auth): Extension<AuthUser>,
    ApiPath(eid): ApiPath<i64>,
    ApiJson(input): ApiJson<NewItem>,
) -> ApiResult<Item> {
    auth.require_admin()?;
    let row = ItemService::new().await?.create(eid, input).await?;
    Ok(ApiResponse::success(row))
}

/// GET /api/:eid/items/:id
pub async fn item_get(Extension(auth): Extension<AuthUser>, ApiPath((eid, id)): ApiPath<(i64, i64)>) -> ApiResult<Item> {
    auth.require_exhibition(eid)?;
    let row = ItemService::new().await?.get(id, eid).await?;
    Ok(ApiResponse::success(row))
}

/// PATCH /api/:eid/items/:id
pub async fn item_patch(
    Extension(auth): Extension<AuthUser>,
    ApiPath((eid, id)): ApiPath<(i64, i64)>,
    ApiJson(patch): ApiJson<ItemPatch>,
) -> ApiResult<Item> {
    auth.require_admin()?;
    let row = ItemService::new().await?.update(id, eid, patch).await?;
    Ok(ApiResponse::success(row))
}

/// DELETE /api/:eid/items/:id
pub async fn item_delete(Extension(auth): Extension<AuthUser>, ApiPath((eid, id)): ApiPath<(i64, i64)>) -> ApiResult<Value> {
    auth.require_admin()?;
    ItemService::new().await?.delete(id, eid).await?;
    Ok(ApiResponse::success(json!({ "message": "item deleted successfully" })))
}
