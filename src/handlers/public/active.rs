// handlers/public/active.rs - GET /ex_active handler

use crate::database::models::Exhibition;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ExhibitionService;

/// Most recently updated active exhibition
pub async fn ex_active_get() -> ApiResult<Exhibition> {
    let exhibition = ExhibitionService::new().await?.current().await?;
    Ok(ApiResponse::success(exhibition))
}
