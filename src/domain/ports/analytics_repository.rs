//! Port for derived analytics persistence.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::errors::DomainResult;

/// A white-ball pair and how often it appeared together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PairCount {
    /// Smaller number of the pair.
    pub a: u8,
    /// Larger number of the pair.
    pub b: u8,
    pub count: u64,
}

#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Atomically replace the co-occurrence table with `pairs`.
    async fn replace_cooccurrence(&self, pairs: &[PairCount]) -> DomainResult<()>;

    /// Number of stored pairs.
    async fn cooccurrence_size(&self) -> DomainResult<u64>;

    /// The `limit` most frequent pairs, most frequent first.
    async fn top_pairs(&self, limit: i64) -> DomainResult<Vec<PairCount>>;
}
