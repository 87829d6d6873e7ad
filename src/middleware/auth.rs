use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Serialize;

use crate::auth::{validate_jwt, Claims, Role};
use crate::error::ApiError;

/// Authenticated caller, injected into request extensions by `jwt_auth_middleware`.
#[derive(Clone, Debug, Serialize)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub perms: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            role: claims.role(),
            user_id: claims.user_id,
            username: claims.username,
            perms: claims.perms,
        }
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role.is_admin() {
            return Ok(());
        }
        tracing::warn!("User {} denied admin route", self.username);
        Err(ApiError::unauthorized("Administrator privileges required"))
    }

    /// Reject callers scoped to a different exhibition than `eid`.
    pub fn require_exhibition(&self, eid: i64) -> Result<(), ApiError> {
        if self.role.can_access(eid) {
            return Ok(());
        }
        tracing::warn!("User {} denied exhibition {}", self.username, eid);
        Err(ApiError::unauthorized(format!("Token is not valid for exhibition {}", eid)))
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(headers: HeaderMap, mut request: Request, next: Next) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(|msg| {
        tracing::warn!("Rejected request to {}: {}", request.uri().path(), msg);
        ApiError::unauthorized(msg)
    })?;

    let claims = validate_jwt(token).map_err(|e| {
        tracing::warn!("Rejected request to {}: {}", request.uri().path(), e);
        ApiError::unauthorized(e.to_string())
    })?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Token from the Authorization header, bare or `Bearer <token>`.
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_str = headers
        .get(AUTHORIZATION)
        .ok_or("Missing Authorization header")?
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str).trim();
    if token.is_empty() {
        return Err("Empty JWT token");
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn accepts_bare_and_bearer_tokens() {
        assert_eq!(extract_jwt_from_headers(&headers("abc.def")).unwrap(), "abc.def");
        assert_eq!(extract_jwt_from_headers(&headers("Bearer abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn rejects_missing_or_empty() {
        assert!(extract_jwt_from_headers(&HeaderMap::new()).is_err());
        assert!(extract_jwt_from_headers(&headers("Bearer  ")).is_err());
    }

    #[test]
    fn member_cannot_cross_exhibitions() {
        let user = AuthUser::from(Claims::new("bob".to_string(), 3, 5));
        assert!(user.require_exhibition(5).is_ok());
        assert_eq!(user.require_exhibition(6).unwrap_err().status_code(), 401);
        assert_eq!(user.require_admin().unwrap_err().status_code(), 401);
    }
}
