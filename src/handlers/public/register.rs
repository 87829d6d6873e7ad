// handlers/public/register.rs - POST /register?sec=<secret> handler

use serde::Deserialize;

use crate::auth::STAFF_EID;
use crate::config;
use crate::database::models::{NewUser, User};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiQuery, ApiResponse, ApiResult};
use crate::services::UserService;

#[derive(Debug, Deserialize)]
pub struct RegisterQuery {
    pub sec: Option<String>,
}

/// Registration is open only to callers presenting the configured secret.
fn check_secret(presented: Option<&str>) -> Result<(), ApiError> {
    let expected = config::config().security.registration_secret.as_str();
    match presented {
        Some(sec) if !expected.is_empty() && sec == expected => Ok(()),
        _ => {
            tracing::warn!("Registration refused: bad or missing secret");
            Err(ApiError::unauthorized("access denied"))
        }
    }
}

/// Create an account; `eid` in the body defaults to 0 (staff).
pub async fn register_post(
    ApiQuery(query): ApiQuery<RegisterQuery>,
    ApiJson(input): ApiJson<NewUser>,
) -> ApiResult<User> {
    check_secret(query.sec.as_deref())?;

    let eid = input.eid.unwrap_or(STAFF_EID);
    let user = UserService::new().await?.create(eid, input).await?;
    Ok(ApiResponse::success(user))
}
