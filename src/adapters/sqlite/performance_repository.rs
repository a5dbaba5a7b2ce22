//! SQLite implementation of the PerformanceRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{StrategyKind, StrategyPerformance};
use crate::domain::ports::PerformanceRepository;

#[derive(Clone)]
pub struct SqlitePerformanceRepository {
    pool: SqlitePool,
}

impl SqlitePerformanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PerformanceRepository for SqlitePerformanceRepository {
    async fn all(&self) -> DomainResult<Vec<StrategyPerformance>> {
        let rows: Vec<PerformanceRow> =
            sqlx::query_as("SELECT * FROM strategy_performance ORDER BY strategy")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn upsert(&self, perf: &StrategyPerformance) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO strategy_performance (strategy, plays, wins, weight, confidence, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)
               ON CONFLICT(strategy) DO UPDATE SET
                   plays = excluded.plays,
                   wins = excluded.wins,
                   weight = excluded.weight,
                   confidence = excluded.confidence,
                   updated_at = excluded.updated_at"#,
        )
        .bind(perf.strategy.as_str())
        .bind(perf.plays as i64)
        .bind(perf.wins as i64)
        .bind(perf.weight)
        .bind(perf.confidence)
        .bind(perf.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_result(&self, strategy: StrategyKind, won: bool) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO strategy_performance (strategy, plays, wins, weight, confidence, updated_at)
               VALUES (?, 1, ?, 0.2, 0.1, ?)
               ON CONFLICT(strategy) DO UPDATE SET
                   plays = plays + 1,
                   wins = wins + excluded.wins,
                   updated_at = excluded.updated_at"#,
        )
        .bind(strategy.as_str())
        .bind(won as i64)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct PerformanceRow {
    strategy: String,
    plays: i64,
    wins: i64,
    weight: f64,
    confidence: f64,
    updated_at: String,
}

impl TryFrom<PerformanceRow> for StrategyPerformance {
    type Error = DomainError;

    fn try_from(row: PerformanceRow) -> Result<Self, Self::Error> {
        let strategy = StrategyKind::from_str(&row.strategy).ok_or_else(|| {
            DomainError::SerializationError(format!("Unknown strategy: {}", row.strategy))
        })?;
        let updated_at = chrono::DateTime::parse_from_rfc3339(&row.updated_at)
            .map_err(|e| DomainError::SerializationError(e.to_string()))?
            .with_timezone(&chrono::Utc);

        Ok(StrategyPerformance {
            strategy,
            plays: row.plays as u64,
            wins: row.wins as u64,
            weight: row.weight,
            confidence: row.confidence,
            updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{all_embedded_migrations, create_test_pool, Migrator};

    async fn setup() -> SqlitePerformanceRepository {
        let pool = create_test_pool().await.unwrap();
        Migrator::new(pool.clone())
            .run_embedded_migrations(all_embedded_migrations())
            .await
            .unwrap();
        SqlitePerformanceRepository::new(pool)
    }

    #[tokio::test]
    async fn test_upsert_and_all() {
        let repo = setup().await;
        let mut perf = StrategyPerformance::new(StrategyKind::GapTheory);
        perf.plays = 5;
        perf.wins = 2;
        repo.upsert(&perf).await.unwrap();

        perf.plays = 6;
        repo.upsert(&perf).await.unwrap();

        let all = repo.all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].plays, 6);
        assert_eq!(all[0].wins, 2);
    }

    #[tokio::test]
    async fn test_record_result_bumps_counters() {
        let repo = setup().await;
        repo.record_result(StrategyKind::Hybrid, false).await.unwrap();
        repo.record_result(StrategyKind::Hybrid, true).await.unwrap();
        repo.record_result(StrategyKind::Hybrid, true).await.unwrap();

        let all = repo.all().await.unwrap();
        assert_eq!(all[0].plays, 3);
        assert_eq!(all[0].wins, 2);
    }
}
