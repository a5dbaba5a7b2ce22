//! Port for the append-only draw store.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::errors::DomainResult;
use crate::domain::models::Draw;

#[async_trait]
pub trait DrawRepository: Send + Sync {
    /// Insert one draw. Fails on a date collision.
    async fn insert(&self, draw: &Draw) -> DomainResult<()>;

    /// Insert many draws, ignoring dates already present.
    /// Returns the number actually inserted.
    async fn bulk_insert(&self, draws: &[Draw]) -> DomainResult<u64>;

    /// Point lookup by draw date.
    async fn get(&self, date: NaiveDate) -> DomainResult<Option<Draw>>;

    /// Date of the most recent stored draw.
    async fn latest_date(&self) -> DomainResult<Option<NaiveDate>>;

    /// The most recent `limit` draws, ordered oldest to newest.
    async fn recent(&self, limit: usize) -> DomainResult<Vec<Draw>>;

    async fn count(&self) -> DomainResult<u64>;
}
