use uuid::Uuid;

/// Failures a feed request can surface to its caller.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("Channel not found")]
    NotFound { publisher_id: Uuid },

    // the store error stays out of Display; callers log it separately
    #[error("content store unavailable")]
    StoreUnavailable(anyhow::Error),

    #[error("request cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

impl FeedError {
    pub fn store(err: anyhow::Error) -> Self {
        FeedError::StoreUnavailable(err)
    }
}
