use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::database::update::{Patch, UpdateSet};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Exhibition {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub creator: Option<Value>,
    pub sponsors: Option<Value>,
    pub videos: Option<Value>,
    pub images: Option<Value>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewExhibition {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub creator: Option<Value>,
    pub sponsors: Option<Value>,
    pub videos: Option<Value>,
    pub images: Option<Value>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExhibitionPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub creator: Option<Value>,
    pub sponsors: Option<Value>,
    pub videos: Option<Value>,
    pub images: Option<Value>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

impl Patch for ExhibitionPatch {
    fn apply(self, set: &mut UpdateSet<'_>) {
        set.set("title", self.title)
            .set("description", self.description)
            .set("location", self.location)
            .set("creator", self.creator)
            .set("sponsors", self.sponsors)
            .set("videos", self.videos)
            .set("images", self.images)
            .set("start_time", self.start_time)
            .set("end_time", self.end_time)
            .set("is_active", self.is_active);
    }
}
