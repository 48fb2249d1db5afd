use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::store::ContentStore;
use crate::store::types::{PublisherSummary, Window};
use crate::telemetry::ctx::LogCtx;
use crate::telemetry::ops::content::{Content as ContentOp, Phase as ContentPhase};

use super::error::FeedError;
use super::normalize;
use super::page::{self, Totals};
use super::plan::FeedPlan;
use super::rank;
use super::types::{ChannelContent, ContentEnvelope, ContentKind, FeedPage, FeedRequest};

pub struct FeedOutcome {
    pub channel: PublisherSummary,
    pub plan: FeedPlan,
    pub page: FeedPage,
}

impl FeedOutcome {
    pub fn body(&self) -> ChannelContent<'_> {
        ChannelContent { channel: &self.channel, content: &self.page.items, pagination: self.page.meta }
    }
}

#[derive(Default)]
struct KindBatch {
    total: u64,
    items: Vec<ContentEnvelope>,
}

/// Builds one page of a publisher's feed.
///
/// Reads for the channel header and both collections run concurrently; the first failure
/// (or `ct` firing) drops the others and fails the whole request.
pub async fn execute(
    store: &dyn ContentStore,
    req: &FeedRequest,
    ct: &CancellationToken,
    log: &LogCtx<ContentOp>,
) -> Result<FeedOutcome, FeedError> {
    let publisher_id = req.publisher_id;

    let exists = until_cancelled(ct, store.publisher_exists(publisher_id))
        .instrument(log.span(&ContentPhase::ResolvePublisher))
        .await?
        .map_err(FeedError::store)?;
    if !exists {
        log.info_kv("publisher not found", [("publisher", publisher_id.to_string())]);
        return Err(FeedError::NotFound { publisher_id });
    }

    let plan = {
        let _s = log.span(&ContentPhase::Plan).entered();
        let plan = FeedPlan::for_request(req);
        log.debug_kv(
            "feed plan",
            [
                ("videos", plan.fetch_videos.to_string()),
                ("posts", plan.fetch_posts.to_string()),
                ("push_down", plan.push_down_pagination.to_string()),
            ],
        );
        plan
    };
    let window = plan.window(req);

    let channel = async {
        store
            .publisher_summary(publisher_id)
            .await
            .map_err(FeedError::store)?
            .ok_or(FeedError::NotFound { publisher_id })
    }
    .instrument(log.span(&ContentPhase::FetchChannel));
    let videos = fetch_kind(store, req, ContentKind::Video, plan.fetches(ContentKind::Video), window)
        .instrument(log.span_kv(&ContentPhase::FetchVideos, [("window", format!("{window:?}"))]));
    let posts = fetch_kind(store, req, ContentKind::Post, plan.fetches(ContentKind::Post), window)
        .instrument(log.span_kv(&ContentPhase::FetchPosts, [("window", format!("{window:?}"))]));

    let (channel, videos, posts) =
        until_cancelled(ct, async { tokio::try_join!(channel, videos, posts) }).await??;

    let totals = Totals { videos: videos.total, posts: posts.total };
    let mut items = videos.items;
    items.extend(posts.items);

    // single-kind pages arrive in store order already
    if !plan.push_down_pagination {
        let _s = log.span(&ContentPhase::Rank).entered();
        rank::rank(&mut items, req.sort);
    }

    let page = {
        let _s = log.span(&ContentPhase::Paginate).entered();
        page::assemble(&plan, req, items, totals)
    };
    log.page_summary(page.items.len(), page.meta.total_items, page.meta.page, page.meta.total_pages);

    Ok(FeedOutcome { channel, plan, page })
}

async fn fetch_kind(
    store: &dyn ContentStore,
    req: &FeedRequest,
    kind: ContentKind,
    wanted: bool,
    window: Option<Window>,
) -> Result<KindBatch, FeedError> {
    if !wanted {
        return Ok(KindBatch::default());
    }
    let (total, rows) = tokio::try_join!(
        store.count_published(kind, req.publisher_id),
        store.list_published(kind, req.publisher_id, req.sort, window),
    )
    .map_err(FeedError::store)?;
    let items = rows.into_iter().map(normalize::normalize).collect();
    Ok(KindBatch { total, items })
}

async fn until_cancelled<F: Future>(ct: &CancellationToken, fut: F) -> Result<F::Output, FeedError> {
    tokio::select! {
        biased;
        _ = ct.cancelled() => Err(FeedError::Cancelled),
        out = fut => Ok(out),
    }
}
