//! Port for generated-ticket persistence.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::Ticket;

#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn insert_batch(&self, tickets: &[Ticket]) -> DomainResult<u64>;

    /// Remove tickets already queued for a draw date (stale from prior runs).
    async fn delete_for_draw(&self, date: NaiveDate) -> DomainResult<u64>;

    /// Draw dates that have unevaluated tickets and an official result,
    /// most recent first, bounded by `limit`.
    async fn unevaluated_draw_dates(&self, limit: usize) -> DomainResult<Vec<NaiveDate>>;

    async fn unevaluated_for_draw(&self, date: NaiveDate) -> DomainResult<Vec<Ticket>>;

    /// One-shot evaluation commit for a single ticket.
    async fn mark_evaluated(
        &self,
        id: Uuid,
        matches_main: u8,
        matches_special: bool,
        prize_amount: f64,
    ) -> DomainResult<()>;

    async fn count_for_draw(&self, date: NaiveDate) -> DomainResult<u64>;

    async fn for_draw(&self, date: NaiveDate, limit: usize) -> DomainResult<Vec<Ticket>>;
}
