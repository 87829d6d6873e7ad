// handlers/protected/comments.rs - /api/:eid/comments* handlers

use axum::Extension;

use crate::database::models::{Comment, CommentInput};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, AuthUser};
use crate::services::FactService;

/// PUT /api/:eid/comments - upsert the caller's comment on an item
pub async fn comments_put(
    Extension(auth): Extension<AuthUser>,
    ApiPath(eid): ApiPath<i64>,
    ApiJson(input): ApiJson<CommentInput>,
) -> ApiResult<Comment> {
    auth.require_exhibition(eid)?;
    let row = FactService::new().await?.upsert_comment(auth.user_id, eid, input).await?;
    Ok(ApiResponse::success(row))
}

/// GET /api/:eid/comments/:iid - newest first
pub async fn comments_get(
    Extension(auth): Extension<AuthUser>,
    ApiPath((eid, iid)): ApiPath<(i64, i64)>,
) -> ApiResult<Vec<Comment>> {
    auth.require_exhibition(eid)?;
    let rows = FactService::new().await?.comments(iid, eid).await?;
    Ok(ApiResponse::success(rows))
}
