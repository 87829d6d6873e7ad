use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config;

/// Exhibition id carried by platform staff tokens.
pub const STAFF_EID: i64 = 0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub user_id: i64,
    pub eid: i64,
    pub perms: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(username: String, user_id: i64, eid: i64) -> Self {
        let now = Utc::now();
        let exp = (now + expiry(config::config().security.jwt_expiry_hours)).timestamp();

        Self {
            username,
            user_id,
            eid,
            perms: Role::from_eid(eid).perms().to_string(),
            iat: now.timestamp(),
            exp,
        }
    }

    pub fn role(&self) -> Role {
        Role::from_eid(self.eid)
    }
}

/// Token lifetime, capped so the timestamp arithmetic cannot overflow.
fn expiry(hours: u64) -> Duration {
    Duration::hours(hours.min(config::MAX_JWT_EXPIRY_HOURS) as i64)
}

/// Authority carried by a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    ExhibitionMember { eid: i64 },
}

impl Role {
    pub fn from_eid(eid: i64) -> Self {
        if eid == STAFF_EID {
            Role::SuperAdmin
        } else {
            Role::ExhibitionMember { eid }
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }

    /// Staff reach every exhibition; members only their own.
    pub fn can_access(&self, eid: i64) -> bool {
        match self {
            Role::SuperAdmin => true,
            Role::ExhibitionMember { eid: own } => *own == eid,
        }
    }

    fn perms(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "admin",
            Role::ExhibitionMember { .. } => "member",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("JWT secret not configured")]
    InvalidSecret,
}

fn secret() -> Result<&'static str, JwtError> {
    let secret = config::config().security.jwt_secret.as_str();
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }
    Ok(secret)
}

pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    let encoding_key = EncodingKey::from_secret(secret()?.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str) -> Result<Claims, JwtError> {
    let decoding_key = DecodingKey::from_secret(secret()?.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

/// Argon2 PHC string for `password`
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

/// False on mismatch or when `stored` is not a PHC hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_role_reaches_every_exhibition() {
        let role = Role::from_eid(0);
        assert!(role.is_admin());
        assert!(role.can_access(5));
        assert!(role.can_access(0));
    }

    #[test]
    fn member_role_is_scoped() {
        let role = Role::from_eid(5);
        assert_eq!(role, Role::ExhibitionMember { eid: 5 });
        assert!(!role.is_admin());
        assert!(role.can_access(5));
        assert!(!role.can_access(6));
    }

    #[test]
    fn token_round_trip() {
        let claims = Claims::new("ada".to_string(), 42, 5);
        let token = generate_jwt(&claims).unwrap();
        let decoded = validate_jwt(&token).unwrap();
        assert_eq!(decoded.username, "ada");
        assert_eq!(decoded.user_id, 42);
        assert_eq!(decoded.role(), Role::ExhibitionMember { eid: 5 });
        assert_eq!(decoded.perms, "member");
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = generate_jwt(&Claims::new("ada".to_string(), 42, 0)).unwrap();
        let tampered = format!("{}x", token);
        assert!(matches!(validate_jwt(&tampered), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn huge_expiry_does_not_overflow() {
        assert_eq!(expiry(672), Duration::hours(672));
        assert_eq!(expiry(u64::MAX), Duration::hours(config::MAX_JWT_EXPIRY_HOURS as i64));
        let claims = Claims::new("ada".to_string(), 1, 0);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("0000").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("0000", &hash));
        assert!(!verify_password("1111", &hash));
        assert!(!verify_password("0000", "0000"));
    }
}
