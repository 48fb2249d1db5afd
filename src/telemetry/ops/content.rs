use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Content;

#[derive(Copy, Clone, Debug)]
pub enum Phase { ResolvePublisher, Plan, FetchChannel, FetchVideos, FetchPosts, Rank, Paginate, Output }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::ResolvePublisher => "resolve_publisher",
        Phase::Plan => "plan",
        Phase::FetchChannel => "fetch_channel",
        Phase::FetchVideos => "fetch_videos",
        Phase::FetchPosts => "fetch_posts",
        Phase::Rank => "rank",
        Phase::Paginate => "paginate",
        Phase::Output => "output",
    }}
    fn span(&self) -> Span { match self {
        Phase::ResolvePublisher => info_span!("resolve_publisher"),
        Phase::Plan => info_span!("plan"),
        Phase::FetchChannel => info_span!("fetch_channel"),
        Phase::FetchVideos => info_span!("fetch_videos"),
        Phase::FetchPosts => info_span!("fetch_posts"),
        Phase::Rank => info_span!("rank"),
        Phase::Paginate => info_span!("paginate"),
        Phase::Output => info_span!("output"),
    }}
}

impl OpMarker for Content {
    const NAME: &'static str = "content";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("content") }
}
