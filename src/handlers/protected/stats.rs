// handlers/protected/stats.rs - /api/:eid/stats/* handlers

use axum::Extension;
use serde_json::{json, Value};

use crate::middleware::{ApiPath, ApiResponse, ApiResult, AuthUser};
use crate::services::stats_service::{AmountRank, CatalogTrend, RateBucket, RateRank, UserOrders};
use crate::services::StatsService;

async fn service(auth: &AuthUser, eid: i64) -> Result<StatsService, crate::error::ApiError> {
    auth.require_exhibition(eid)?;
    Ok(StatsService::new().await?)
}

pub async fn topn_rate_items_get(
    Extension(auth): Extension<AuthUser>,
    ApiPath((eid, n)): ApiPath<(i64, i64)>,
) -> ApiResult<Vec<RateRank>> {
    let rows = service(&auth, eid).await?.top_rated_items(eid, n).await?;
    Ok(ApiResponse::success(rows))
}

pub async fn topn_amount_items_get(
    Extension(auth): Extension<AuthUser>,
    ApiPath((eid, n)): ApiPath<(i64, i64)>,
) -> ApiResult<Vec<AmountRank>> {
    let rows = service(&auth, eid).await?.top_ordered_items(eid, n).await?;
    Ok(ApiResponse::success(rows))
}

pub async fn topn_orders_items_get(
    Extension(auth): Extension<AuthUser>,
    ApiPath((eid, n)): ApiPath<(i64, i64)>,
) -> ApiResult<Vec<UserOrders>> {
    let rows = service(&auth, eid).await?.top_ordering_users(eid, n).await?;
    Ok(ApiResponse::success(rows))
}

pub async fn items_rate_distribution_get(
    Extension(auth): Extension<AuthUser>,
    ApiPath(eid): ApiPath<i64>,
) -> ApiResult<Vec<RateBucket>> {
    let rows = service(&auth, eid).await?.rate_distribution(eid).await?;
    Ok(ApiResponse::success(rows))
}

pub async fn num_amount_total_get(Extension(auth): Extension<AuthUser>, ApiPath(eid): ApiPath<i64>) -> ApiResult<i64> {
    let total = service(&auth, eid).await?.amount_total(eid).await?;
    Ok(ApiResponse::success(total))
}

pub async fn num_items_total_get(Extension(auth): Extension<AuthUser>, ApiPath(eid): ApiPath<i64>) -> ApiResult<i64> {
    let total = service(&auth, eid).await?.items_total(eid).await?;
    Ok(ApiResponse::success(total))
}

pub async fn num_users_total_get(Extension(auth): Extension<AuthUser>, ApiPath(eid): ApiPath<i64>) -> ApiResult<i64> {
    let total = service(&auth, eid).await?.users_total(eid).await?;
    Ok(ApiResponse::success(total))
}

/// Items whose average rating is above `rate`
pub async fn excellent_items_get(
    Extension(auth): Extension<AuthUser>,
    ApiPath((eid, rate)): ApiPath<(i64, f64)>,
) -> ApiResult<i64> {
    let count = service(&auth, eid).await?.items_rated_above(eid, rate).await?;
    Ok(ApiResponse::success(count))
}

pub async fn catalog_trending_get(
    Extension(auth): Extension<AuthUser>,
    ApiPath(eid): ApiPath<i64>,
) -> ApiResult<Vec<CatalogTrend>> {
    let rows = service(&auth, eid).await?.catalog_trending(eid).await?;
    Ok(ApiResponse::success(rows))
}

pub async fn orders_users_rate_get(Extension(auth): Extension<AuthUser>, ApiPath(eid): ApiPath<i64>) -> ApiResult<Value> {
    let rate = service(&auth, eid).await?.orders_per_user(eid).await?;
    Ok(ApiResponse::success(json!({ "rate": rate })))
}
