use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::database::update::{Patch, UpdateSet};

/// Catalog node. `pid = 0` marks a root; `root_id` is the topmost ancestor (0 on roots).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Catalog {
    pub id: i64,
    pub pid: i64,
    pub eid: i64,
    pub name: String,
    pub name_en: String,
    pub title: String,
    pub description: String,
    pub images: Option<Value>,
    pub videos: Option<Value>,
    pub banner: Option<Value>,
    pub root_id: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A catalog reached by a subtree walk, with its distance from the start node.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CatalogNode {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub catalog: Catalog,
    pub depth: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCatalog {
    #[serde(default)]
    pub pid: i64,
    pub name: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub images: Option<Value>,
    pub videos: Option<Value>,
    pub banner: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogPatch {
    pub pid: Option<i64>,
    pub name: Option<String>,
    pub name_en: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Option<Value>,
    pub videos: Option<Value>,
    pub banner: Option<Value>,
    pub is_active: Option<bool>,
}

// pid and root_id are written by the service, which owns the hierarchy rules.
impl Patch for CatalogPatch {
    fn apply(self, set: &mut UpdateSet<'_>) {
        set.set("name", self.name)
            .set("name_en", self.name_en)
            .set("title", self.title)
            .set("description", self.description)
            .set("images", self.images)
            .set("videos", self.videos)
            .set("banner", self.banner)
            .set("is_active", self.is_active);
    }
}
