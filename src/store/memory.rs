//! In-memory `ContentStore` with call counters and failure injection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Result, bail};
use async_trait::async_trait;
use uuid::Uuid;

use crate::feed::types::{ContentKind, SortMode};

use super::ContentStore;
use super::types::{PublisherSummary, RawItem, RawPost, RawVideo, Window};

#[derive(Default)]
pub struct CallCounts {
    pub exists: AtomicUsize,
    pub summary: AtomicUsize,
    pub count: AtomicUsize,
    pub list: AtomicUsize,
}

impl CallCounts {
    /// Count and list calls, i.e. reads against the content collections.
    pub fn content_reads(&self) -> usize {
        self.count.load(Ordering::SeqCst) + self.list.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    publishers: Vec<PublisherSummary>,
    videos: Vec<(bool, RawVideo)>,
    posts: Vec<(bool, RawPost)>,
    failing: Option<ContentKind>,
    video_delay: Option<Duration>,
    post_delay: Option<Duration>,
    pub calls: CallCounts,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_publisher(mut self, summary: PublisherSummary) -> Self {
        self.publishers.push(summary);
        self
    }

    pub fn with_video(mut self, video: RawVideo) -> Self {
        self.videos.push((true, video));
        self
    }

    pub fn with_unpublished_video(mut self, video: RawVideo) -> Self {
        self.videos.push((false, video));
        self
    }

    pub fn with_post(mut self, post: RawPost) -> Self {
        self.posts.push((true, post));
        self
    }

    /// Every count/list against `kind` fails.
    pub fn failing(mut self, kind: ContentKind) -> Self {
        self.failing = Some(kind);
        self
    }

    /// List calls of both kinds sleep before answering.
    pub fn slow(self, delay: Duration) -> Self {
        self.slow_kind(ContentKind::Video, delay).slow_kind(ContentKind::Post, delay)
    }

    /// List calls against `kind` sleep before answering.
    pub fn slow_kind(mut self, kind: ContentKind, delay: Duration) -> Self {
        match kind {
            ContentKind::Video => self.video_delay = Some(delay),
            ContentKind::Post => self.post_delay = Some(delay),
        }
        self
    }

    fn check(&self, kind: ContentKind) -> Result<()> {
        if self.failing == Some(kind) {
            bail!("{} collection offline", kind.as_str());
        }
        Ok(())
    }

    fn videos_of(&self, publisher_id: Uuid) -> Vec<RawVideo> {
        self.videos
            .iter()
            .filter(|(published, v)| *published && v.owner.id == publisher_id)
            .map(|(_, v)| v.clone())
            .collect()
    }

    fn posts_of(&self, publisher_id: Uuid) -> Vec<RawPost> {
        self.posts
            .iter()
            .filter(|(published, p)| *published && p.owner.id == publisher_id)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

fn apply_window<T>(items: Vec<T>, window: Option<Window>) -> Vec<T> {
    match window {
        Some(w) => items
            .into_iter()
            .skip(usize::try_from(w.skip).unwrap_or(usize::MAX))
            .take(usize::try_from(w.limit).unwrap_or(usize::MAX))
            .collect(),
        None => items,
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn publisher_exists(&self, publisher_id: Uuid) -> Result<bool> {
        self.calls.exists.fetch_add(1, Ordering::SeqCst);
        Ok(self.publishers.iter().any(|p| p.id == publisher_id))
    }

    async fn count_published(&self, kind: ContentKind, publisher_id: Uuid) -> Result<u64> {
        self.calls.count.fetch_add(1, Ordering::SeqCst);
        self.check(kind)?;
        let n = match kind {
            ContentKind::Video => self.videos_of(publisher_id).len(),
            ContentKind::Post => self.posts_of(publisher_id).len(),
        };
        Ok(n as u64)
    }

    async fn list_published(
        &self,
        kind: ContentKind,
        publisher_id: Uuid,
        sort: SortMode,
        window: Option<Window>,
    ) -> Result<Vec<RawItem>> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        let delay = match kind {
            ContentKind::Video => self.video_delay,
            ContentKind::Post => self.post_delay,
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check(kind)?;
        // same ordering contract as the Postgres adapter
        let items = match kind {
            ContentKind::Video => {
                let mut v = self.videos_of(publisher_id);
                match sort {
                    SortMode::Latest => v.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id))),
                    SortMode::Popular => v.sort_by(|a, b| (b.views, b.created_at, b.id).cmp(&(a.views, a.created_at, a.id))),
                }
                apply_window(v, window).into_iter().map(RawItem::Video).collect()
            }
            ContentKind::Post => {
                let mut p = self.posts_of(publisher_id);
                match sort {
                    SortMode::Latest => p.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id))),
                    SortMode::Popular => p.sort_by(|a, b| (b.likes, b.created_at, b.id).cmp(&(a.likes, a.created_at, a.id))),
                }
                apply_window(p, window).into_iter().map(RawItem::Post).collect()
            }
        };
        Ok(items)
    }

    async fn publisher_summary(&self, publisher_id: Uuid) -> Result<Option<PublisherSummary>> {
        self.calls.summary.fetch_add(1, Ordering::SeqCst);
        Ok(self.publishers.iter().find(|p| p.id == publisher_id).cloned())
    }
}

pub mod fixtures {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use uuid::Uuid;

    use crate::store::types::{OwnerRef, PublisherSummary, RawPost, RawVideo};

    pub fn owner() -> OwnerRef {
        OwnerRef {
            id: Uuid::from_u128(1),
            username: "chan".into(),
            full_name: "Channel Owner".into(),
            avatar: Some("https://cdn.example/avatar.png".into()),
        }
    }

    pub fn summary() -> PublisherSummary {
        let o = owner();
        PublisherSummary {
            id: o.id,
            username: o.username,
            full_name: o.full_name,
            avatar: o.avatar,
            bio: Some("videos and notes".into()),
            subscribers_count: 42,
        }
    }

    /// Minutes after a fixed epoch, so ordering is readable in tests.
    pub fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    pub fn raw_video(n: u128, views: i64, minutes: i64) -> RawVideo {
        RawVideo {
            id: Uuid::from_u128(0x1000 + n),
            owner: owner(),
            title: format!("video {n}"),
            description: None,
            thumbnail: Some(format!("https://cdn.example/thumb/{n}.jpg")),
            video_file: None,
            duration: 61.5,
            views,
            created_at: at(minutes),
        }
    }

    pub fn raw_post(n: u128, likes: i64, minutes: i64) -> RawPost {
        RawPost {
            id: Uuid::from_u128(0x2000 + n),
            owner: owner(),
            title: format!("post {n}"),
            content: format!("body of post {n}"),
            likes,
            created_at: at(minutes),
        }
    }
}
