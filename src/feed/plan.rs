use serde::Serialize;

use crate::store::types::Window;

use super::types::{ContentKind, FeedRequest, FilterMode};

/// Which collections a request reads, and where paging happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedPlan {
    pub fetch_videos: bool,
    pub fetch_posts: bool,
    /// Skip/limit applied by the store. Only valid when a single kind is read.
    pub push_down_pagination: bool,
}

impl FeedPlan {
    pub fn for_request(req: &FeedRequest) -> Self {
        match req.filter {
            FilterMode::VideosOnly => FeedPlan { fetch_videos: true, fetch_posts: false, push_down_pagination: true },
            FilterMode::PostsOnly => FeedPlan { fetch_videos: false, fetch_posts: true, push_down_pagination: true },
            // the merged order spans both kinds, so every candidate is needed before slicing
            FilterMode::All => FeedPlan { fetch_videos: true, fetch_posts: true, push_down_pagination: false },
        }
    }

    pub fn fetches(&self, kind: ContentKind) -> bool {
        match kind {
            ContentKind::Video => self.fetch_videos,
            ContentKind::Post => self.fetch_posts,
        }
    }

    /// The store-side window, or `None` when full candidate sets are required.
    pub fn window(&self, req: &FeedRequest) -> Option<Window> {
        self.push_down_pagination.then(|| Window { skip: req.skip(), limit: req.page_size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::types::SortMode;
    use uuid::Uuid;

    fn req(filter: FilterMode) -> FeedRequest {
        FeedRequest::new(Uuid::nil(), Some(2), Some(10), SortMode::Latest, filter)
    }

    #[test]
    fn homogeneous_filters_push_paging_down() {
        let plan = FeedPlan::for_request(&req(FilterMode::VideosOnly));
        assert!(plan.fetches(ContentKind::Video));
        assert!(!plan.fetches(ContentKind::Post));
        assert_eq!(plan.window(&req(FilterMode::VideosOnly)), Some(Window { skip: 10, limit: 10 }));

        let plan = FeedPlan::for_request(&req(FilterMode::PostsOnly));
        assert!(!plan.fetches(ContentKind::Video));
        assert!(plan.fetches(ContentKind::Post));
        assert!(plan.push_down_pagination);
    }

    #[test]
    fn mixed_filter_reads_everything() {
        let r = req(FilterMode::All);
        let plan = FeedPlan::for_request(&r);
        assert!(plan.fetch_videos && plan.fetch_posts);
        assert!(!plan.push_down_pagination);
        assert_eq!(plan.window(&r), None);
    }
}
