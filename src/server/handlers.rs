use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::feed::service;
use crate::feed::types::{FeedParams, FeedRequest};
use crate::feed::FeedError;
use crate::telemetry;

use super::AppState;
use super::response::{ApiError, ApiResponse, CONTENT_FETCHED};

/// `GET /api/v1/channels/{channel_id}/content`
pub async fn channel_content(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let params = FeedParams::from_pairs(pairs);
    let publisher_id = Uuid::parse_str(channel_id.trim())
        .map_err(|_| FeedError::InvalidRequest("malformed channel id".into()))?;
    let req = FeedRequest::from_params(publisher_id, &params);

    let log = telemetry::content();
    let span = log.root_span_kv([
        ("publisher", publisher_id.to_string()),
        ("page", req.page.to_string()),
        ("limit", req.page_size.to_string()),
        ("sort", format!("{:?}", req.sort)),
        ("kind", format!("{:?}", req.filter)),
    ]);

    // a dropped request (client gone) cancels whatever is still in flight
    let ct = CancellationToken::new();
    let _cancel_on_drop = ct.clone().drop_guard();

    let run = service::execute(state.store.as_ref(), &req, &ct, &log).instrument(span);
    let outcome = match tokio::time::timeout(state.request_timeout, run).await {
        Ok(res) => res?,
        Err(_) => {
            log.warn_kv("request deadline exceeded", [("ms", state.request_timeout.as_millis().to_string())]);
            return Err(FeedError::DeadlineExceeded.into());
        }
    };

    Ok(ApiResponse::ok(CONTENT_FETCHED, outcome.body()).into_response())
}
