//! SQLite implementation of the TicketRepository.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{StrategyKind, Ticket};
use crate::domain::ports::TicketRepository;

#[derive(Clone)]
pub struct SqliteTicketRepository {
    pool: SqlitePool,
}

impl SqliteTicketRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for SqliteTicketRepository {
    async fn insert_batch(&self, tickets: &[Ticket]) -> DomainResult<u64> {
        let mut inserted = 0u64;
        for ticket in tickets {
            ticket.validate()?;
            let result = sqlx::query(
                r#"INSERT INTO tickets (id, draw_date, strategy, n1, n2, n3, n4, n5, special,
                   confidence, evaluated, matches_main, matches_special, prize_amount, created_at)
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(ticket.id.to_string())
            .bind(ticket.draw_date.to_string())
            .bind(ticket.strategy.as_str())
            .bind(ticket.white[0] as i32)
            .bind(ticket.white[1] as i32)
            .bind(ticket.white[2] as i32)
            .bind(ticket.white[3] as i32)
            .bind(ticket.white[4] as i32)
            .bind(ticket.special as i32)
            .bind(ticket.confidence)
            .bind(ticket.evaluated as i32)
            .bind(ticket.matches_main.map(|m| m as i32))
            .bind(ticket.matches_special.map(|m| m as i32))
            .bind(ticket.prize_amount)
            .bind(ticket.created_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }

    async fn delete_for_draw(&self, date: NaiveDate) -> DomainResult<u64> {
        let result = sqlx::query("DELETE FROM tickets WHERE draw_date = ? AND evaluated = 0")
            .bind(date.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn unevaluated_draw_dates(&self, limit: usize) -> DomainResult<Vec<NaiveDate>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"SELECT DISTINCT t.draw_date FROM tickets t
               INNER JOIN draws d ON d.date = t.draw_date
               WHERE t.evaluated = 0
               ORDER BY t.draw_date DESC
               LIMIT ?"#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(s,)| {
                s.parse::<NaiveDate>()
                    .map_err(|e| DomainError::SerializationError(e.to_string()))
            })
            .collect()
    }

    async fn unevaluated_for_draw(&self, date: NaiveDate) -> DomainResult<Vec<Ticket>> {
        let rows: Vec<TicketRow> =
            sqlx::query_as("SELECT * FROM tickets WHERE draw_date = ? AND evaluated = 0")
                .bind(date.to_string())
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn mark_evaluated(
        &self,
        id: Uuid,
        matches_main: u8,
        matches_special: bool,
        prize_amount: f64,
    ) -> DomainResult<()> {
        let result = sqlx::query(
            r#"UPDATE tickets SET evaluated = 1, matches_main = ?, matches_special = ?,
               prize_amount = ? WHERE id = ? AND evaluated = 0"#,
        )
        .bind(matches_main as i32)
        .bind(matches_special as i32)
        .bind(prize_amount)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ValidationFailed(format!(
                "ticket {} missing or already evaluated",
                id
            )));
        }
        Ok(())
    }

    async fn count_for_draw(&self, date: NaiveDate) -> DomainResult<u64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tickets WHERE draw_date = ?")
            .bind(date.to_string())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 as u64)
    }

    async fn for_draw(&self, date: NaiveDate, limit: usize) -> DomainResult<Vec<Ticket>> {
        let rows: Vec<TicketRow> = sqlx::query_as(
            "SELECT * FROM tickets WHERE draw_date = ? ORDER BY confidence DESC LIMIT ?",
        )
        .bind(date.to_string())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: String,
    draw_date: String,
    strategy: String,
    n1: i32,
    n2: i32,
    n3: i32,
    n4: i32,
    n5: i32,
    special: i32,
    confidence: f64,
    evaluated: i32,
    matches_main: Option<i32>,
    matches_special: Option<i32>,
    prize_amount: Option<f64>,
    created_at: String,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = DomainError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| DomainError::SerializationError(e.to_string()))?;
        let draw_date = row
            .draw_date
            .parse::<NaiveDate>()
            .map_err(|e| DomainError::SerializationError(e.to_string()))?;
        let strategy = StrategyKind::from_str(&row.strategy).ok_or_else(|| {
            DomainError::SerializationError(format!("Unknown strategy: {}", row.strategy))
        })?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| DomainError::SerializationError(e.to_string()))?
            .with_timezone(&chrono::Utc);

        Ok(Ticket {
            id,
            draw_date,
            strategy,
            white: [
                row.n1 as u8,
                row.n2 as u8,
                row.n3 as u8,
                row.n4 as u8,
                row.n5 as u8,
            ],
            special: row.special as u8,
            confidence: row.confidence,
            evaluated: row.evaluated != 0,
            matches_main: row.matches_main.map(|m| m as u8),
            matches_special: row.matches_special.map(|m| m != 0),
            prize_amount: row.prize_amount,
            created_at,
        })
    }
}
