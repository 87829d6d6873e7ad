// handlers/protected/amounts.rs - /api/:eid/amounts*, amount_item handlers

use axum::Extension;

use crate::database::models::{Amount, AmountInput};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, AuthUser};
use crate::services::FactService;

/// PUT /api/:eid/amounts - upsert the caller's order amount for an item
pub async fn amounts_put(
    Extension(auth): Extension<AuthUser>,
    ApiPath(eid): ApiPath<i64>,
    ApiJson(input): ApiJson<AmountInput>,
) -> ApiResult<Amount> {
    auth.require_exhibition(eid)?;
    let row = FactService::new().await?.upsert_amount(auth.user_id, eid, input).await?;
    Ok(ApiResponse::success(row))
}

/// GET /api/:eid/amounts/:id
pub async fn amount_get(
    Extension(auth): Extension<AuthUser>,
    ApiPath((eid, id)): ApiPath<(i64, i64)>,
) -> ApiResult<Amount> {
    auth.require_exhibition(eid)?;
    let row = FactService::new().await?.amount(id, eid).await?;
    Ok(ApiResponse::success(row))
}

/// GET /api/:eid/amount_item/:iid - the caller's amount
pub async fn amount_item_get(
    Extension(auth): Extension<AuthUser>,
    ApiPath((eid, iid)): ApiPath<(i64, i64)>,
) -> ApiResult<Amount> {
    auth.require_exhibition(eid)?;
    let row = FactService::new().await?.my_amount(auth.user_id, iid, eid).await?;
    Ok(ApiResponse::success(row))
}

/// GET /api/:eid/amounts_item/:iid - total ordered for the item
pub async fn amounts_item_get(
    Extension(auth): Extension<AuthUser>,
    ApiPath((eid, iid)): ApiPath<(i64, i64)>,
) -> ApiResult<i64> {
    auth.require_exhibition(eid)?;
    let sum = FactService::new().await?.amount_total(iid, eid).await?;
    Ok(ApiResponse::success(sum))
}
