//! Port for external draw data sources.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::Draw;

/// One external source of official draw results.
///
/// Implementations must return a structurally valid draw or an error; the
/// acquisition poller never trusts a source past `Draw::validate`.
#[async_trait]
pub trait DrawSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetch the most recent official draw this source knows about.
    async fn fetch_latest(&self) -> DomainResult<Draw>;
}

/// A source that can return the full published draw history, used for the
/// pre-sync refresh that backfills gaps before a run.
#[async_trait]
pub trait BulkDrawSource: Send + Sync {
    async fn fetch_all(&self) -> DomainResult<Vec<Draw>>;
}
