use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::types::{OwnerRef, PublisherSummary};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Video,
    Post,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Video => "video",
            ContentKind::Post => "post",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Latest,
    Popular,
}

impl SortMode {
    /// Anything other than `popular` sorts by recency.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("popular") => SortMode::Popular,
            _ => SortMode::Latest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    All,
    #[value(name = "videos")]
    #[serde(rename = "videos")]
    VideosOnly,
    #[value(name = "posts")]
    #[serde(rename = "posts")]
    PostsOnly,
}

impl FilterMode {
    /// Unknown values fall back to the mixed feed.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("videos") => FilterMode::VideosOnly,
            Some(s) if s.eq_ignore_ascii_case("posts") => FilterMode::PostsOnly,
            _ => FilterMode::All,
        }
    }
}

/// Query parameters exactly as they arrive on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRequest {
    pub publisher_id: Uuid,
    pub page: u64,
    pub page_size: u64,
    pub sort: SortMode,
    pub filter: FilterMode,
}

impl FeedParams {
    /// Folds raw query pairs; the first occurrence of a repeated key wins and unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = FeedParams::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page" => &mut params.page,
                "limit" => &mut params.limit,
                "sortBy" => &mut params.sort_by,
                "contentType" => &mut params.content_type,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }
}

impl FeedRequest {
    /// Non-positive or missing paging values are replaced by the defaults.
    pub fn new(
        publisher_id: Uuid,
        page: Option<i64>,
        page_size: Option<i64>,
        sort: SortMode,
        filter: FilterMode,
    ) -> Self {
        Self {
            publisher_id,
            page: positive_or(page, DEFAULT_PAGE),
            page_size: positive_or(page_size, DEFAULT_PAGE_SIZE),
            sort,
            filter,
        }
    }

    pub fn from_params(publisher_id: Uuid, params: &FeedParams) -> Self {
        Self::new(
            publisher_id,
            parse_int(params.page.as_deref()),
            parse_int(params.limit.as_deref()),
            SortMode::parse_lenient(params.sort_by.as_deref()),
            FilterMode::parse_lenient(params.content_type.as_deref()),
        )
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

fn parse_int(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
}

fn positive_or(v: Option<i64>, default: u64) -> u64 {
    match v {
        Some(n) if n > 0 => n as u64,
        _ => default,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPayload {
    pub title: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub video_file: Option<String>,
    pub duration: f64,
    pub views: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPayload {
    pub title: String,
    pub content: String,
    pub likes: i64,
}

/// Kind-specific fields; the variant is the envelope's kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "contentType", rename_all = "lowercase")]
pub enum Payload {
    Video(VideoPayload),
    Post(PostPayload),
}

/// One feed item, whatever collection it came from.
///
/// Only the normalizer builds envelopes, so `kind` never drifts from the payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEnvelope {
    pub(in crate::feed) id: Uuid,
    pub(in crate::feed) created_at: DateTime<Utc>,
    pub(in crate::feed) popularity_score: i64,
    pub(in crate::feed) owner: OwnerRef,
    #[serde(flatten)]
    pub(in crate::feed) payload: Payload,
}

impl ContentEnvelope {
    #[cfg(test)]
    pub fn id(&self) -> Uuid { self.id }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn popularity_score(&self) -> i64 { self.popularity_score }
    #[cfg(test)]
    pub fn owner(&self) -> &OwnerRef { &self.owner }
    pub fn payload(&self) -> &Payload { &self.payload }

    pub fn kind(&self) -> ContentKind {
        match self.payload {
            Payload::Video(_) => ContentKind::Video,
            Payload::Post(_) => ContentKind::Post,
        }
    }

    pub fn title(&self) -> &str {
        match &self.payload {
            Payload::Video(v) => &v.title,
            Payload::Post(p) => &p.title,
        }
    }
}

/// Pagination block; wire names match the public API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    #[serde(rename = "total")]
    pub total_items: u64,
    #[serde(rename = "totalVideos")]
    pub total_video_items: u64,
    #[serde(rename = "totalPosts")]
    pub total_post_items: u64,
    pub page: u64,
    #[serde(rename = "limit")]
    pub page_size: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
    #[serde(rename = "hasPrevPage")]
    pub has_prev_page: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedPage {
    pub items: Vec<ContentEnvelope>,
    pub meta: PageMeta,
}

/// Response body shared by the HTTP endpoint and `chanfeed content --json`.
#[derive(Debug, Serialize)]
pub struct ChannelContent<'a> {
    pub channel: &'a PublisherSummary,
    pub content: &'a [ContentEnvelope],
    pub pagination: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<&str>, limit: Option<&str>) -> FeedParams {
        FeedParams {
            page: page.map(str::to_string),
            limit: limit.map(str::to_string),
            ..FeedParams::default()
        }
    }

    #[test]
    fn missing_paging_uses_defaults() {
        let req = FeedRequest::from_params(Uuid::nil(), &FeedParams::default());
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, 20);
        assert_eq!(req.sort, SortMode::Latest);
        assert_eq!(req.filter, FilterMode::All);
    }

    #[test]
    fn garbage_and_non_positive_paging_is_normalized() {
        let req = FeedRequest::from_params(Uuid::nil(), &params(Some("abc"), Some("-5")));
        assert_eq!((req.page, req.page_size), (1, 20));

        let req = FeedRequest::from_params(Uuid::nil(), &params(Some("0"), Some("0")));
        assert_eq!((req.page, req.page_size), (1, 20));

        let req = FeedRequest::from_params(Uuid::nil(), &params(Some(" 3 "), Some("7")));
        assert_eq!((req.page, req.page_size), (3, 7));
    }

    #[test]
    fn repeated_query_keys_keep_the_first_value() {
        let pairs = [("limit", "2"), ("limit", "3"), ("sortBy", "popular"), ("utm", "x"), ("sortBy", "latest")]
            .map(|(k, v)| (k.to_string(), v.to_string()));
        let params = FeedParams::from_pairs(pairs);
        assert_eq!(params.limit.as_deref(), Some("2"));
        assert_eq!(params.sort_by.as_deref(), Some("popular"));
        assert_eq!(params.page, None);
        assert_eq!(params.content_type, None);
    }

    #[test]
    fn unknown_modes_fall_back() {
        assert_eq!(SortMode::parse_lenient(Some("trending")), SortMode::Latest);
        assert_eq!(SortMode::parse_lenient(Some("POPULAR")), SortMode::Popular);
        assert_eq!(FilterMode::parse_lenient(Some("shorts")), FilterMode::All);
        assert_eq!(FilterMode::parse_lenient(Some("videos")), FilterMode::VideosOnly);
        assert_eq!(FilterMode::parse_lenient(Some("posts")), FilterMode::PostsOnly);
    }

    #[test]
    fn skip_is_zero_based_offset() {
        let req = FeedRequest::new(Uuid::nil(), Some(3), Some(10), SortMode::Latest, FilterMode::All);
        assert_eq!(req.skip(), 20);
        let huge = FeedRequest::new(Uuid::nil(), Some(i64::MAX), Some(i64::MAX), SortMode::Latest, FilterMode::All);
        assert_eq!(huge.skip(), u64::MAX);
    }
}
