use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::update::{Patch, UpdateSet};

/// Account row. `eid = 0` marks platform staff.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub eid: i64,
    pub name: String,
    pub uname: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub title: String,
    pub mobile: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account to insert; `password` holds the plaintext until the service hashes it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    pub eid: Option<i64>,
    #[serde(default)]
    pub name: String,
    pub uname: String,
    pub password: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub mobile: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub uname: Option<String>,
    pub password: Option<String>,
    pub title: Option<String>,
    pub mobile: Option<String>,
    pub is_active: Option<bool>,
}

impl Patch for UserPatch {
    fn apply(self, set: &mut UpdateSet<'_>) {
        set.set("name", self.name)
            .set("uname", self.uname)
            .set("password", self.password)
            .set("title", self.title)
            .set("mobile", self.mobile)
            .set("is_active", self.is_active);
    }
}
