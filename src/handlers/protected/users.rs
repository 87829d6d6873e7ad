// handlers/protected/users.rs - /api/:eid/users* and /api/:eid/active_users handlers

use axum::{extract::Multipart, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{upload::read_file_field, SearchQuery};
use crate::database::models::{NewUser, User, UserPatch};
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser};
use crate::services::{user_service::BatchUserInput, UserService};

/// Path id meaning "the caller"
const SELF_ID: i64 = 0;

#[derive(Debug, Deserialize)]
pub struct ActiveQuery {
    pub active: bool,
}

/// GET /api/:eid/users?q=
pub async fn users_get(
    Extension(auth): Extension<AuthUser>,
    ApiPath(eid): ApiPath<i64>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Vec<User>> {
    auth.require_admin()?;
    let rows = UserService::new().await?.list(eid, query.q.as_deref()).await?;
    Ok(ApiResponse::success(rows))
}

/// POST /api/:eid/users
pub async fn users_post(
    Extension(auth): Extension<AuthUser>,
    ApiPath(eid): ApiPath<i64>,
    ApiJson(input): ApiJson<NewUser>,
) -> ApiResult<User> {
    auth.require_admin()?;
    let row = UserService::new().await?.create(eid, input).await?;
    Ok(ApiResponse::success(row))
}

/// PUT /api/:eid/users - batch create `prefix{i}` accounts
pub async fn users_put(
    Extension(auth): Extension<AuthUser>,
    ApiPath(eid): ApiPath<i64>,
    ApiJson(input): ApiJson<BatchUserInput>,
) -> ApiResult<Vec<User>> {
    auth.require_admin()?;
    let rows = UserService::new().await?.create_batch(eid, input).await?;
    Ok(ApiResponse::success(rows))
}

/// PUT /api/:eid/users_tmpl - multipart `file` (xlsx)
pub async fn users_tmpl_put(
    Extension(auth): Extension<AuthUser>,
    ApiPath(eid): ApiPath<i64>,
    mut multipart: Multipart,
) -> ApiResult<Vec<User>> {
    auth.require_admin()?;
    let (_, data) = read_file_field(&mut multipart).await?;
    let rows = UserService::new().await?.create_from_template(eid, data.to_vec()).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/:eid/users/:id - admins, or anyone with id 0 for themselves
pub async fn user_get(Extension(auth): Extension<AuthUser>, ApiPath((eid, id)): ApiPath<(i64, i64)>) -> ApiResult<User> {
    let id = if id == SELF_ID {
        auth.require_exhibition(eid)?;
        auth.user_id
    } else {
        auth.require_admin()?;
        id
    };
    let row = UserService::new().await?.get(id, eid).await?;
    Ok(ApiResponse::success(row))
}

/// PATCH /api/:eid/users/:id
pub async fn user_patch(
    Extension(auth): Extension<AuthUser>,
    ApiPath((eid, id)): ApiPath<(i64, i64)>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> ApiResult<User> {
    auth.require_admin()?;
    let row = UserService::new().await?.update(id, eid, patch).await?;
    Ok(ApiResponse::success(row))
}

/// DELETE /api/:eid/users/:id
pub async fn user_delete(
    Extension(auth): Extension<AuthUser>,
    ApiPath((eid, id)): ApiPath<(i64, i64)>,
) -> ApiResult<Value> {
    auth.require_admin()?;
    UserService::new().await?.delete(id, eid).await?;
    Ok(ApiResponse::success(json!({ "message": "user deleted successfully" })))
}

/// POST /api/:eid/active_users?active=bool - body is a list of user ids
pub async fn active_users_post(
    Extension(auth): Extension<AuthUser>,
    ApiPath(eid): ApiPath<i64>,
    ApiQuery(query): ApiQuery<ActiveQuery>,
    ApiJson(ids): ApiJson<Vec<i64>>,
) -> ApiResult<Value> {
    auth.require_admin()?;
    let updated = UserService::new().await?.set_active(eid, &ids, query.active).await?;
    Ok(ApiResponse::success(json!({ "updated": updated })))
}
