//! SQLite implementation of the AnalyticsRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::errors::DomainResult;
use crate::domain::ports::{AnalyticsRepository, PairCount};

#[derive(Clone)]
pub struct SqliteAnalyticsRepository {
    pool: SqlitePool,
}

impl SqliteAnalyticsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsRepository for SqliteAnalyticsRepository {
    async fn replace_cooccurrence(&self, pairs: &[PairCount]) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM number_cooccurrence")
            .execute(&mut *tx)
            .await?;
        for pair in pairs {
            sqlx::query("INSERT INTO number_cooccurrence (a, b, count) VALUES (?, ?, ?)")
                .bind(pair.a as i64)
                .bind(pair.b as i64)
                .bind(pair.count as i64)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn cooccurrence_size(&self) -> DomainResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM number_cooccurrence")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn top_pairs(&self, limit: i64) -> DomainResult<Vec<PairCount>> {
        let rows: Vec<(i64, i64, i64)> = sqlx::query_as(
            "SELECT a, b, count FROM number_cooccurrence ORDER BY count DESC, a, b LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(a, b, count)| PairCount {
                a: a as u8,
                b: b as u8,
                count: count as u64,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{all_embedded_migrations, create_test_pool, Migrator};

    async fn setup() -> SqliteAnalyticsRepository {
        let pool = create_test_pool().await.unwrap();
        Migrator::new(pool.clone())
            .run_embedded_migrations(all_embedded_migrations())
            .await
            .unwrap();
        SqliteAnalyticsRepository::new(pool)
    }

    #[tokio::test]
    async fn test_replace_is_atomic_overwrite() {
        let repo = setup().await;
        repo.replace_cooccurrence(&[
            PairCount { a: 1, b: 2, count: 3 },
            PairCount { a: 1, b: 3, count: 7 },
        ])
        .await
        .unwrap();
        assert_eq!(repo.cooccurrence_size().await.unwrap(), 2);

        // A second refresh fully replaces the previous contents.
        repo.replace_cooccurrence(&[PairCount { a: 5, b: 9, count: 1 }])
            .await
            .unwrap();
        assert_eq!(repo.cooccurrence_size().await.unwrap(), 1);

        let top = repo.top_pairs(10).await.unwrap();
        assert_eq!(top, vec![PairCount { a: 5, b: 9, count: 1 }]);
    }

    #[tokio::test]
    async fn test_top_pairs_ordering() {
        let repo = setup().await;
        repo.replace_cooccurrence(&[
            PairCount { a: 1, b: 2, count: 3 },
            PairCount { a: 4, b: 7, count: 9 },
            PairCount { a: 2, b: 6, count: 9 },
        ])
        .await
        .unwrap();

        let top = repo.top_pairs(2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0], PairCount { a: 2, b: 6, count: 9 });
        assert_eq!(top[1], PairCount { a: 4, b: 7, count: 9 });
    }
}
