use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::feed::types::{ContentKind, SortMode};

use super::ContentStore;
use super::types::{OwnerRef, PublisherSummary, RawItem, RawPost, RawVideo, Window};

const DEFAULT_QUERY_TIMEOUT_MS: u64 = 5_000;

/// Postgres adapter over the `media` schema.
#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgContentStore {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self { pool, query_timeout }
    }

    /// Per-query timeout from `CHANFEED_STORE_TIMEOUT_MS`.
    pub fn from_env(pool: PgPool) -> Self {
        let ms = std::env::var("CHANFEED_STORE_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_QUERY_TIMEOUT_MS);
        Self::new(pool, Duration::from_millis(ms))
    }

    async fn timed<T, F>(&self, what: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(res) => res.with_context(|| format!("{what} query failed")),
            Err(_) => Err(anyhow!("{what} query timed out after {}ms", self.query_timeout.as_millis())),
        }
    }
}

fn video_order(sort: SortMode) -> &'static str {
    match sort {
        SortMode::Latest => "v.created_at DESC, v.video_id DESC",
        SortMode::Popular => "v.views DESC, v.created_at DESC, v.video_id DESC",
    }
}

fn post_order(sort: SortMode) -> &'static str {
    match sort {
        SortMode::Latest => "c.created_at DESC, c.post_id DESC",
        SortMode::Popular => "like_count DESC, c.created_at DESC, c.post_id DESC",
    }
}

/// OFFSET/LIMIT binds; a NULL limit reads the whole set.
fn window_binds(window: Option<Window>) -> (i64, Option<i64>) {
    match window {
        Some(w) => (
            i64::try_from(w.skip).unwrap_or(i64::MAX),
            Some(i64::try_from(w.limit).unwrap_or(i64::MAX)),
        ),
        None => (0, None),
    }
}

fn owner_from_row(row: &PgRow) -> Result<OwnerRef, sqlx::Error> {
    Ok(OwnerRef {
        id: row.try_get("owner_id")?,
        username: row.try_get("username")?,
        full_name: row.try_get("full_name")?,
        avatar: row.try_get("avatar_url")?,
    })
}

fn video_from_row(row: &PgRow) -> Result<RawItem, sqlx::Error> {
    Ok(RawItem::Video(RawVideo {
        id: row.try_get("video_id")?,
        owner: owner_from_row(row)?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        thumbnail: row.try_get("thumbnail_url")?,
        video_file: row.try_get("video_url")?,
        duration: row.try_get("duration_secs")?,
        views: row.try_get("views")?,
        created_at: row.try_get("created_at")?,
    }))
}

fn post_from_row(row: &PgRow) -> Result<RawItem, sqlx::Error> {
    Ok(RawItem::Post(RawPost {
        id: row.try_get("post_id")?,
        owner: owner_from_row(row)?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        likes: row.try_get("like_count")?,
        created_at: row.try_get("created_at")?,
    }))
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn publisher_exists(&self, publisher_id: Uuid) -> Result<bool> {
        let q = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM media.publisher WHERE publisher_id = $1)",
        )
        .bind(publisher_id)
        .fetch_one(&self.pool);
        self.timed("publisher_exists", q).await
    }

    async fn count_published(&self, kind: ContentKind, publisher_id: Uuid) -> Result<u64> {
        let sql = match kind {
            ContentKind::Video => {
                "SELECT COUNT(*)::bigint FROM media.video WHERE owner_id = $1 AND is_published"
            }
            ContentKind::Post => {
                "SELECT COUNT(*)::bigint FROM media.community_post WHERE owner_id = $1 AND is_published"
            }
        };
        let q = sqlx::query_scalar::<_, i64>(sql).bind(publisher_id).fetch_one(&self.pool);
        let n = self.timed("count_published", q).await?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    async fn list_published(
        &self,
        kind: ContentKind,
        publisher_id: Uuid,
        sort: SortMode,
        window: Option<Window>,
    ) -> Result<Vec<RawItem>> {
        let (offset, limit) = window_binds(window);
        match kind {
            ContentKind::Video => {
                let sql = format!(
                    r#"
                    SELECT v.video_id, v.title, v.description, v.thumbnail_url, v.video_url,
                           v.duration_secs, v.views, v.created_at,
                           p.publisher_id AS owner_id, p.username, p.full_name, p.avatar_url
                    FROM media.video v
                    JOIN media.publisher p ON p.publisher_id = v.owner_id
                    WHERE v.owner_id = $1 AND v.is_published
                    ORDER BY {}
                    OFFSET $2
                    LIMIT $3
                    "#,
                    video_order(sort)
                );
                let q = sqlx::query(&sql)
                    .bind(publisher_id)
                    .bind(offset)
                    .bind(limit)
                    .fetch_all(&self.pool);
                let rows = self.timed("list_videos", q).await?;
                let items = rows.iter().map(video_from_row).collect::<Result<Vec<_>, _>>()?;
                Ok(items)
            }
            ContentKind::Post => {
                let sql = format!(
                    r#"
                    SELECT c.post_id, c.title, c.content, c.created_at,
                           COALESCE(l.likes, 0)::bigint AS like_count,
                           p.publisher_id AS owner_id, p.username, p.full_name, p.avatar_url
                    FROM media.community_post c
                    JOIN media.publisher p ON p.publisher_id = c.owner_id
                    LEFT JOIN (
                        SELECT post_id, COUNT(*)::bigint AS likes
                        FROM media.post_like
                        GROUP BY post_id
                    ) l ON l.post_id = c.post_id
                    WHERE c.owner_id = $1 AND c.is_published
                    ORDER BY {}
                    OFFSET $2
                    LIMIT $3
                    "#,
                    post_order(sort)
                );
                let q = sqlx::query(&sql)
                    .bind(publisher_id)
                    .bind(offset)
                    .bind(limit)
                    .fetch_all(&self.pool);
                let rows = self.timed("list_posts", q).await?;
                let items = rows.iter().map(post_from_row).collect::<Result<Vec<_>, _>>()?;
                Ok(items)
            }
        }
    }

    async fn publisher_summary(&self, publisher_id: Uuid) -> Result<Option<PublisherSummary>> {
        let q = sqlx::query(
            r#"
            SELECT p.publisher_id, p.username, p.full_name, p.avatar_url, p.bio,
                   (SELECT COUNT(*)::bigint
                    FROM media.subscription s
                    WHERE s.channel_id = p.publisher_id) AS subscribers
            FROM media.publisher p
            WHERE p.publisher_id = $1
            "#,
        )
        .bind(publisher_id)
        .fetch_optional(&self.pool);
        let Some(row) = self.timed("publisher_summary", q).await? else { return Ok(None) };
        Ok(Some(PublisherSummary {
            id: row.try_get("publisher_id")?,
            username: row.try_get("username")?,
            full_name: row.try_get("full_name")?,
            avatar: row.try_get("avatar_url")?,
            bio: row.try_get("bio")?,
            subscribers_count: row.try_get("subscribers")?,
        }))
    }
}
