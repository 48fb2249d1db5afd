use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::feed::types::{ContentKind, SortMode};

mod db;
#[cfg(test)]
pub mod memory;
pub mod types;

pub use db::PgContentStore;
use types::{PublisherSummary, RawItem, Window};

/// Read-only access to a publisher's published content, one collection per kind.
///
/// Implementations own their timeouts and retries; callers only see success or failure.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn publisher_exists(&self, publisher_id: Uuid) -> Result<bool>;

    async fn count_published(&self, kind: ContentKind, publisher_id: Uuid) -> Result<u64>;

    /// Items of `kind` in store order for `sort`; `window` is only set for single-kind reads.
    async fn list_published(
        &self,
        kind: ContentKind,
        publisher_id: Uuid,
        sort: SortMode,
        window: Option<Window>,
    ) -> Result<Vec<RawItem>>;

    async fn publisher_summary(&self, publisher_id: Uuid) -> Result<Option<PublisherSummary>>;
}
