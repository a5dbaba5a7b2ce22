//! SQLite implementation of the DrawRepository.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Draw;
use crate::domain::ports::DrawRepository;

#[derive(Clone)]
pub struct SqliteDrawRepository {
    pool: SqlitePool,
}

impl SqliteDrawRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DrawRepository for SqliteDrawRepository {
    async fn insert(&self, draw: &Draw) -> DomainResult<()> {
        draw.validate()?;
        sqlx::query(
            "INSERT INTO draws (date, n1, n2, n3, n4, n5, special) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(draw.date.to_string())
        .bind(draw.white[0] as i32)
        .bind(draw.white[1] as i32)
        .bind(draw.white[2] as i32)
        .bind(draw.white[3] as i32)
        .bind(draw.white[4] as i32)
        .bind(draw.special as i32)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn bulk_insert(&self, draws: &[Draw]) -> DomainResult<u64> {
        let mut inserted = 0u64;
        for draw in draws {
            if draw.validate().is_err() {
                continue;
            }
            let result = sqlx::query(
                "INSERT OR IGNORE INTO draws (date, n1, n2, n3, n4, n5, special)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(draw.date.to_string())
            .bind(draw.white[0] as i32)
            .bind(draw.white[1] as i32)
            .bind(draw.white[2] as i32)
            .bind(draw.white[3] as i32)
            .bind(draw.white[4] as i32)
            .bind(draw.special as i32)
            .execute(&self.pool)
            .await?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }

    async fn get(&self, date: NaiveDate) -> DomainResult<Option<Draw>> {
        let row: Option<DrawRow> = sqlx::query_as("SELECT * FROM draws WHERE date = ?")
            .bind(date.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn latest_date(&self) -> DomainResult<Option<NaiveDate>> {
        let row: (Option<String>,) = sqlx::query_as("SELECT MAX(date) FROM draws")
            .fetch_one(&self.pool)
            .await?;
        match row.0 {
            Some(date) => {
                let parsed = date
                    .parse::<NaiveDate>()
                    .map_err(|e| DomainError::SerializationError(e.to_string()))?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    async fn recent(&self, limit: usize) -> DomainResult<Vec<Draw>> {
        let rows: Vec<DrawRow> = sqlx::query_as(
            "SELECT * FROM (SELECT * FROM draws ORDER BY date DESC LIMIT ?) ORDER BY date ASC",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count(&self) -> DomainResult<u64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM draws")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 as u64)
    }
}

#[derive(sqlx::FromRow)]
struct DrawRow {
    date: String,
    n1: i32,
    n2: i32,
    n3: i32,
    n4: i32,
    n5: i32,
    special: i32,
}

impl TryFrom<DrawRow> for Draw {
    type Error = DomainError;

    fn try_from(row: DrawRow) -> Result<Self, Self::Error> {
        let date = row
            .date
            .parse::<NaiveDate>()
            .map_err(|e| DomainError::SerializationError(e.to_string()))?;
        Ok(Draw {
            date,
            white: [
                row.n1 as u8,
                row.n2 as u8,
                row.n3 as u8,
                row.n4 as u8,
                row.n5 as u8,
            ],
            special: row.special as u8,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{all_embedded_migrations, create_test_pool, Migrator};

    async fn setup() -> SqliteDrawRepository {
        let pool = create_test_pool().await.unwrap();
        Migrator::new(pool.clone())
            .run_embedded_migrations(all_embedded_migrations())
            .await
            .unwrap();
        SqliteDrawRepository::new(pool)
    }

    fn draw(date: &str, white: [u8; 5], special: u8) -> Draw {
        Draw::new(date.parse().unwrap(), white, special).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = setup().await;
        let d = draw("2025-01-04", [10, 20, 30, 40, 50], 7);
        repo.insert(&d).await.unwrap();

        let back = repo.get(d.date).await.unwrap().unwrap();
        assert_eq!(back, d);
        assert!(repo.get("2025-01-06".parse().unwrap()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bulk_insert_ignores_existing() {
        let repo = setup().await;
        let d1 = draw("2025-01-01", [1, 2, 3, 4, 5], 6);
        let d2 = draw("2025-01-04", [10, 20, 30, 40, 50], 7);
        repo.insert(&d1).await.unwrap();

        let inserted = repo.bulk_insert(&[d1.clone(), d2.clone()]).await.unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_latest_date_and_recent_order() {
        let repo = setup().await;
        assert!(repo.latest_date().await.unwrap().is_none());

        repo.insert(&draw("2025-01-01", [1, 2, 3, 4, 5], 6)).await.unwrap();
        repo.insert(&draw("2025-01-04", [10, 20, 30, 40, 50], 7)).await.unwrap();
        repo.insert(&draw("2025-01-06", [11, 21, 31, 41, 51], 8)).await.unwrap();

        assert_eq!(
            repo.latest_date().await.unwrap(),
            Some("2025-01-06".parse().unwrap())
        );

        let recent = repo.recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        // Oldest to newest within the window.
        assert_eq!(recent[0].date, "2025-01-04".parse::<NaiveDate>().unwrap());
        assert_eq!(recent[1].date, "2025-01-06".parse::<NaiveDate>().unwrap());
    }
}
