use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::get;
use clap::Args;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::store::{ContentStore, PgContentStore};
use crate::telemetry::{self};
use crate::telemetry::ops::serve::Phase as ServePhase;

mod handlers;
mod response;

const DEFAULT_BIND: &str = "0.0.0.0:3000";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Serve channel feeds over HTTP
#[derive(Args, Debug, Default)]
pub struct ServeCmd {
    #[arg(long, help = "Listen address (overrides CHANFEED_BIND and PORT)")]
    pub bind: Option<String>,
    #[arg(long, help = "Allowed browser origin (overrides CORS_ORIGIN)")]
    pub cors_origin: Option<String>,
    #[arg(long, help = "Per-request deadline in milliseconds (overrides CHANFEED_REQUEST_TIMEOUT_MS)")]
    pub request_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServeConfig {
    pub bind: SocketAddr,
    pub cors_origin: String,
    pub request_timeout: Duration,
}

impl ServeConfig {
    pub fn from_env_and_args(args: &ServeCmd) -> Result<Self> {
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    /// Flags win over the environment, which wins over defaults.
    fn resolve(args: &ServeCmd, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind = args
            .bind
            .clone()
            .or_else(|| env("CHANFEED_BIND"))
            .or_else(|| env("PORT").map(|port| format!("0.0.0.0:{}", port.trim())))
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind.parse().with_context(|| format!("invalid bind address: {bind}"))?;

        let cors_origin = args
            .cors_origin
            .clone()
            .or_else(|| env("CORS_ORIGIN"))
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());

        let timeout_ms = match args.request_timeout_ms {
            Some(ms) => ms,
            None => match env("CHANFEED_REQUEST_TIMEOUT_MS") {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("CHANFEED_REQUEST_TIMEOUT_MS is not a number: {raw}"))?,
                None => DEFAULT_REQUEST_TIMEOUT_MS,
            },
        };

        Ok(ServeConfig { bind, cors_origin, request_timeout: Duration::from_millis(timeout_ms.max(1)) })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub request_timeout: Duration,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/channels/{channel_id}/content", get(handlers::channel_content))
        .with_state(state)
}

fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin).with_context(|| format!("invalid CORS origin: {origin}"))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

pub async fn run(pool: &PgPool, args: ServeCmd) -> Result<()> {
    let log = telemetry::serve();
    let cfg = ServeConfig::from_env_and_args(&args)?;
    let _g = log
        .root_span_kv([
            ("bind", cfg.bind.to_string()),
            ("cors_origin", cfg.cors_origin.clone()),
            ("request_timeout_ms", cfg.request_timeout.as_millis().to_string()),
        ])
        .entered();

    let state = AppState {
        store: Arc::new(PgContentStore::from_env(pool.clone())),
        request_timeout: cfg.request_timeout,
    };
    let app = router(state)
        .layer(cors_layer(&cfg.cors_origin)?)
        .layer(TraceLayer::new_for_http());

    let listener = {
        let _s = log.span(&ServePhase::Bind).entered();
        tokio::net::TcpListener::bind(cfg.bind)
            .await
            .with_context(|| format!("bind {}", cfg.bind))?
    };
    log.info(format!("🚀 Serving channel feeds on http://{}", listener.local_addr()?));

    {
        let _s = log.span(&ServePhase::Listen).entered();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("http server")?;
    }

    let _s = log.span(&ServePhase::Shutdown).entered();
    log.info("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // no signal handler: run until the process is killed
        std::future::pending::<()>().await;
    }
}
