// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind `jwt_auth_middleware`. Routes under `/api/:eid/`
// check the caller's exhibition; admin-only routes check for staff tokens.
// Both checks run before any store access.

use serde::Deserialize;

pub mod amounts;
pub mod catalogs;
pub mod comments;
pub mod exhibitions;
pub mod items;
pub mod rates;
pub mod stats;
pub mod upload;
pub mod users;

/// `?q=` substring search
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}
