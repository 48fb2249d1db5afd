use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Owner display fields attached to every item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRef {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar: Option<String>,
}

/// Channel header returned alongside the content page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherSummary {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub subscribers_count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawVideo {
    pub id: Uuid,
    pub owner: OwnerRef,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub video_file: Option<String>,
    pub duration: f64,
    pub views: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawPost {
    pub id: Uuid,
    pub owner: OwnerRef,
    pub title: String,
    pub content: String,
    pub likes: i64,
    pub created_at: DateTime<Utc>,
}

/// A row as it comes out of one of the per-kind collections.
#[derive(Debug, Clone, PartialEq)]
pub enum RawItem {
    Video(RawVideo),
    Post(RawPost),
}

/// Skip/limit pushed down to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub skip: u64,
    pub limit: u64,
}
