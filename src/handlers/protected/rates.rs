// handlers/protected/rates.rs - /api/:eid/rates*, rate_item, my_rates_items handlers

use axum::Extension;

use crate::database::models::{Rate, RateInput};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, AuthUser};
use crate::services::FactService;

/// PUT /api/:eid/rates - upsert the caller's rating for an item
pub async fn rates_put(
    Extension(auth): Extension<AuthUser>,
    ApiPath(eid): ApiPath<i64>,
    ApiJson(input): ApiJson<RateInput>,
) -> ApiResult<Rate> {
    auth.require_exhibition(eid)?;
    let row = FactService::new().await?.upsert_rate(auth.user_id, eid, input).await?;
    Ok(ApiResponse::success(row))
}

/// GET /api/:eid/rates/:id
pub async fn rate_get(Extension(auth): Extension<AuthUser>, ApiPath((eid, id)): ApiPath<(i64, i64)>) -> ApiResult<Rate> {
    auth.require_exhibition(eid)?;
    let row = FactService::new().await?.rate(id, eid).await?;
    Ok(ApiResponse::success(row))
}

/// GET /api/:eid/rate_item/:iid - the caller's rating
pub async fn rate_item_get(
    Extension(auth): Extension<AuthUser>,
    ApiPath((eid, iid)): ApiPath<(i64, i64)>,
) -> ApiResult<Rate> {
    auth.require_exhibition(eid)?;
    let row = FactService::new().await?.my_rate(auth.user_id, iid, eid).await?;
    Ok(ApiResponse::success(row))
}

/// GET /api/:eid/rates_item/:iid - sum of every rating on the item
pub async fn rates_item_get(
    Extension(auth): Extension<AuthUser>,
    ApiPath((eid, iid)): ApiPath<(i64, i64)>,
) -> ApiResult<f64> {
    auth.require_exhibition(eid)?;
    let sum = FactService::new().await?.rate_total(iid, eid).await?;
    Ok(ApiResponse::success(sum))
}

/// POST /api/:eid/my_rates_items - body is a list of item ids
pub async fn my_rates_items_post(
    Extension(auth): Extension<AuthUser>,
    ApiPath(eid): ApiPath<i64>,
    ApiJson(iids): ApiJson<Vec<i64>>,
) -> ApiResult<Vec<Rate>> {
    auth.require_exhibition(eid)?;
    let rows = FactService::new().await?.my_rates(auth.user_id, eid, &iids).await?;
    Ok(ApiResponse::success(rows))
}
