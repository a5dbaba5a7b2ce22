//! Port for strategy performance persistence.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{StrategyKind, StrategyPerformance};

#[async_trait]
pub trait PerformanceRepository: Send + Sync {
    async fn all(&self) -> DomainResult<Vec<StrategyPerformance>>;

    async fn upsert(&self, perf: &StrategyPerformance) -> DomainResult<()>;

    /// Record one evaluated ticket for a strategy, bumping plays (and wins
    /// when the ticket took a prize).
    async fn record_result(&self, strategy: StrategyKind, won: bool) -> DomainResult<()>;
}
