// handlers/public/login.rs - POST /login handler

use serde::{Deserialize, Serialize};

use crate::auth::{generate_jwt, Claims};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::UserService;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login name (`uname`)
    pub name: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Exchange credentials for a signed token.
///
/// Unknown names, wrong passwords and disabled accounts are all 401.
pub async fn login_post(ApiJson(input): ApiJson<LoginRequest>) -> ApiResult<LoginResponse> {
    let users = UserService::new().await?;
    let user = users
        .authenticate(&input.name, &input.password)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Failed login for {}", input.name);
            ApiError::unauthorized("Invalid credentials")
        })?;

    if !user.is_active {
        tracing::warn!("Login refused for disabled user {}", user.uname);
        return Err(ApiError::unauthorized("user disabled"));
    }

    let token = generate_jwt(&Claims::new(user.uname.clone(), user.id, user.eid)).map_err(|e| {
        tracing::error!("Token generation failed: {}", e);
        ApiError::internal_server_error("Failed to generate token")
    })?;

    tracing::info!("User {} logged in (exhibition {})", user.uname, user.eid);
    Ok(ApiResponse::success(LoginResponse { token }))
}
