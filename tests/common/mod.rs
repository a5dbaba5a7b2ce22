//! Shared fixtures for integration tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;

use drawforge::adapters::sqlite::{all_embedded_migrations, create_test_pool, Migrator};
use drawforge::domain::errors::{DomainError, DomainResult};
use drawforge::domain::models::Draw;
use drawforge::domain::ports::{BulkDrawSource, DrawSource};

pub async fn setup_test_db() -> SqlitePool {
    let pool = create_test_pool().await.expect("failed to create test pool");
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .expect("failed to run migrations");
    pool
}

/// Deterministic valid draw history, oldest first, ending before 2025-01-04.
pub fn draw_history(n: usize) -> Vec<Draw> {
    let mut state = 0x9e3779b97f4a7c15u64;
    let mut next = move |bound: u8| -> u8 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state % bound as u64) as u8 + 1
    };

    let mut date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut draws = Vec::with_capacity(n);
    for _ in 0..n {
        let mut white = Vec::with_capacity(5);
        while white.len() < 5 {
            let candidate = next(69);
            if !white.contains(&candidate) {
                white.push(candidate);
            }
        }
        draws.push(
            Draw::new(
                date,
                [white[0], white[1], white[2], white[3], white[4]],
                next(26),
            )
            .unwrap(),
        );
        date = date.succ_opt().unwrap();
    }
    draws
}

/// Test source returning a fixed draw (or always failing) and counting calls.
pub struct FixedSource {
    name: &'static str,
    draw: Option<Draw>,
    pub calls: AtomicU32,
}

impl FixedSource {
    pub fn ok(name: &'static str, draw: Draw) -> Arc<Self> {
        Arc::new(Self {
            name,
            draw: Some(draw),
            calls: AtomicU32::new(0),
        })
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            draw: None,
            calls: AtomicU32::new(0),
        })
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Bulk source serving a canned history slice.
pub struct FixedBulkSource {
    draws: Vec<Draw>,
}

impl FixedBulkSource {
    pub fn new(draws: Vec<Draw>) -> Arc<Self> {
        Arc::new(Self { draws })
    }
}

#[async_trait]
impl BulkDrawSource for FixedBulkSource {
    async fn fetch_all(&self) -> DomainResult<Vec<Draw>> {
        Ok(self.draws.clone())
    }
}

#[async_trait]
impl DrawSource for FixedSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch_latest(&self) -> DomainResult<Draw> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.draw.clone().ok_or_else(|| DomainError::AcquisitionFailed {
            origin: self.name.to_string(),
            reason: "test source configured to fail".to_string(),
        })
    }
}
