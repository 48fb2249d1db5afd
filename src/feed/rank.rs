use std::cmp::Ordering;

use super::types::{ContentEnvelope, ContentKind, SortMode};

/// Multiplier applied to a post's likes when it is ranked against a video's views.
pub const CROSS_KIND_POST_WEIGHT: i64 = 5;

/// Popularity on the shared axis: views for videos, weighted likes for posts.
///
/// Widened to `i128` so the product never clamps.
pub fn weighted_score(env: &ContentEnvelope) -> i128 {
    let score = i128::from(env.popularity_score());
    match env.kind() {
        ContentKind::Video => score,
        ContentKind::Post => score * i128::from(CROSS_KIND_POST_WEIGHT),
    }
}

/// `Less` means `a` is shown before `b`. Equal items keep their input order under a stable sort.
pub fn compare(a: &ContentEnvelope, b: &ContentEnvelope, sort: SortMode) -> Ordering {
    match sort {
        SortMode::Latest => b.created_at().cmp(&a.created_at()),
        SortMode::Popular => match (a.kind(), b.kind()) {
            (ContentKind::Video, ContentKind::Video) | (ContentKind::Post, ContentKind::Post) => {
                b.popularity_score().cmp(&a.popularity_score())
            }
            _ => weighted_score(b).cmp(&weighted_score(a)),
        },
    }
}

/// Stable in-place ordering of a merged candidate set.
pub fn rank(items: &mut [ContentEnvelope], sort: SortMode) {
    items.sort_by(|a, b| compare(a, b, sort));
}
