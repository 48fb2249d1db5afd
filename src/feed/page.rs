use super::plan::FeedPlan;
use super::types::{ContentEnvelope, FeedPage, FeedRequest, FilterMode, PageMeta};

/// Counts reported by the stores; a kind that was not read counts as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub videos: u64,
    pub posts: u64,
}

/// Slices the ordered items into the requested page and computes the metadata block.
///
/// With push-down paging `items` is already the page; otherwise it is the full merged order.
pub fn assemble(plan: &FeedPlan, req: &FeedRequest, items: Vec<ContentEnvelope>, totals: Totals) -> FeedPage {
    let total_items = match req.filter {
        FilterMode::VideosOnly => totals.videos,
        FilterMode::PostsOnly => totals.posts,
        FilterMode::All => totals.videos.saturating_add(totals.posts),
    };

    let page_size = usize::try_from(req.page_size).unwrap_or(usize::MAX);
    let items: Vec<ContentEnvelope> = if plan.push_down_pagination {
        items.into_iter().take(page_size).collect()
    } else {
        let skip = usize::try_from(req.skip()).unwrap_or(usize::MAX);
        items.into_iter().skip(skip).take(page_size).collect()
    };

    FeedPage { items, meta: page_meta(req.page, req.page_size, total_items, totals) }
}

pub fn page_meta(page: u64, page_size: u64, total_items: u64, totals: Totals) -> PageMeta {
    let total_pages = total_items.div_ceil(page_size);
    PageMeta {
        total_items,
        total_video_items: totals.videos,
        total_post_items: totals.posts,
        page,
        page_size,
        total_pages,
        has_next_page: page < total_pages,
        has_prev_page: page > 1,
    }
}
