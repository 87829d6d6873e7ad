//! Per-user facts about one item: a rating, an order amount, a comment.
//! Each table holds at most one row per `(uid, iid, eid)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Rate {
    pub id: i64,
    pub eid: i64,
    pub uid: i64,
    pub iid: i64,
    pub rate: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Amount {
    pub id: i64,
    pub eid: i64,
    pub uid: i64,
    pub iid: i64,
    pub amount: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub eid: i64,
    pub uid: i64,
    pub iid: i64,
    pub content: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateInput {
    pub iid: i64,
    pub rate: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AmountInput {
    pub iid: i64,
    pub amount: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentInput {
    pub iid: i64,
    pub content: String,
}
