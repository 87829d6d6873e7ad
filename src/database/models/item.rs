use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::database::update::{Patch, UpdateSet};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: i64,
    pub eid: i64,
    pub cid: i64,
    pub name: String,
    pub description: String,
    pub thumbnails: Option<Value>,
    pub images: Option<Value>,
    pub videos: Option<Value>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Item listing row joined with its catalog name and fact aggregates.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ItemSummary {
    pub id: i64,
    pub eid: i64,
    pub cid: i64,
    pub name: String,
    pub description: String,
    pub thumbnails: Option<Value>,
    pub images: Option<Value>,
    pub videos: Option<Value>,
    pub is_active: bool,
    pub cname: Option<String>,
    pub avg_rate: Option<f64>,
    pub sum_amount: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewItem {
    #[serde(default)]
    pub cid: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub thumbnails: Option<Value>,
    pub images: Option<Value>,
    pub videos: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemPatch {
    pub cid: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub thumbnails: Option<Value>,
    pub images: Option<Value>,
    pub videos: Option<Value>,
    pub is_active: Option<bool>,
}

impl Patch for ItemPatch {
    fn apply(self, set: &mut UpdateSet<'_>) {
        set.set("cid", self.cid)
            .set("name", self.name)
            .set("description", self.description)
            .set("thumbnails", self.thumbnails)
            .set("images", self.images)
            .set("videos", self.videos)
            .set("is_active", self.is_active);
    }
}
