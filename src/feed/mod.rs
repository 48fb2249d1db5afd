use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::store::PgContentStore;
use crate::telemetry::{self};
use crate::telemetry::ops::content::Phase as ContentPhase;

pub mod error;
pub mod normalize;
pub mod page;
pub mod plan;
pub mod rank;
pub mod service;
pub mod types;

pub use error::FeedError;
use types::{FeedRequest, FilterMode, Payload, SortMode};

/// Print one page of a channel's feed
#[derive(Args, Debug)]
pub struct ContentCmd {
    /// Publisher (channel owner) id
    publisher: String,
    #[arg(long)] page: Option<i64>,
    #[arg(long)] limit: Option<i64>,
    #[arg(long, value_enum, default_value_t = SortMode::Latest)] sort: SortMode,
    #[arg(long, value_enum, default_value_t = FilterMode::All)] kind: FilterMode,
}

pub async fn run(pool: &PgPool, args: ContentCmd) -> Result<()> {
    let started = Instant::now();
    let log = telemetry::content();
    let _g = log
        .root_span_kv([
            ("publisher", args.publisher.clone()),
            ("page", format!("{:?}", args.page)),
            ("limit", format!("{:?}", args.limit)),
            ("sort", format!("{:?}", args.sort)),
            ("kind", format!("{:?}", args.kind)),
            ("json", telemetry::config::json_mode().to_string()),
        ])
        .entered();

    let publisher_id = Uuid::parse_str(args.publisher.trim())
        .map_err(|_| FeedError::InvalidRequest(format!("not a channel id: {}", args.publisher)))?;
    let req = FeedRequest::new(publisher_id, args.page, args.limit, args.sort, args.kind);

    let ct = CancellationToken::new();
    let on_interrupt = {
        let ct = ct.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ct.cancel();
            }
        })
    };

    let store = PgContentStore::from_env(pool.clone());
    let outcome = service::execute(&store, &req, &ct, &log).await;
    on_interrupt.abort();
    let outcome = outcome
        .inspect_err(|e| {
            if let FeedError::StoreUnavailable(cause) = e {
                log.error(format!("store failure: {cause:#}"));
            }
        })
        .context("fetch channel content")?;

    let _out = log.span(&ContentPhase::Output).entered();
    if telemetry::config::json_mode() {
        log.result_timed(&outcome.body(), started)?;
        return Ok(());
    }

    let ch = &outcome.channel;
    log.info(format!("📺 {} (@{}) subscribers={}", ch.full_name, ch.username, ch.subscribers_count));
    let plan = &outcome.plan;
    log.debug_kv(
        "plan",
        [
            ("videos", plan.fetch_videos.to_string()),
            ("posts", plan.fetch_posts.to_string()),
            ("paged_in_store", plan.push_down_pagination.to_string()),
        ],
    );
    if outcome.page.items.is_empty() {
        log.info("ℹ️  No content on this page");
    }
    let first = req.skip() + 1;
    for (i, item) in outcome.page.items.iter().enumerate() {
        let detail = match item.payload() {
            Payload::Video(v) => format!("views={} duration={:.0}s", v.views, v.duration),
            Payload::Post(p) => format!("likes={}", p.likes),
        };
        log.info(format!(
            "#{}  {:<5}  {}  {}  {:?}",
            first + i as u64,
            item.kind().as_str(),
            item.created_at().format("%Y-%m-%d %H:%M"),
            detail,
            item.title()
        ));
    }
    let meta = &outcome.page.meta;
    log.info(format!(
        "   total={} videos={} posts={} next={} prev={}",
        meta.total_items, meta.total_video_items, meta.total_post_items, meta.has_next_page, meta.has_prev_page
    ));
    Ok(())
}
