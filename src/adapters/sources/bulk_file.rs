//! Tertiary acquisition source: bulk CSV download.
//!
//! The open-data export carries the complete draw history as
//! `Draw Date,Winning Numbers,Multiplier` rows. Doubles as the pre-sync
//! bulk refresh feed.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Draw;
use crate::domain::ports::{BulkDrawSource, DrawSource};

#[derive(Debug, Clone)]
pub struct BulkFileSource {
    http: Client,
    url: String,
}

impl BulkFileSource {
    pub fn new(url: String, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { http, url }
    }

    /// Download and parse the complete history.
    pub async fn fetch_all(&self) -> DomainResult<Vec<Draw>> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| DomainError::AcquisitionFailed {
                origin: "bulk_file".to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DomainError::AcquisitionFailed {
                origin: "bulk_file".to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| DomainError::AcquisitionFailed {
                origin: "bulk_file".to_string(),
                reason: e.to_string(),
            })?;

        Ok(parse_bulk_csv(&body))
    }
}

#[async_trait]
impl BulkDrawSource for BulkFileSource {
    async fn fetch_all(&self) -> DomainResult<Vec<Draw>> {
        BulkFileSource::fetch_all(self).await
    }
}

#[async_trait]
impl DrawSource for BulkFileSource {
    fn name(&self) -> &'static str {
        "bulk_file"
    }

    async fn fetch_latest(&self) -> DomainResult<Draw> {
        let mut draws = self.fetch_all().await?;
        draws.sort_by_key(|d| d.date);
        draws.pop().ok_or_else(|| DomainError::AcquisitionFailed {
            origin: "bulk_file".to_string(),
            reason: "bulk file contained no valid draws".to_string(),
        })
    }
}

/// Parse the CSV export. Malformed rows and draws outside the current
/// numbering era are skipped rather than failing the whole file.
pub fn parse_bulk_csv(body: &str) -> Vec<Draw> {
    body.lines()
        .skip(1) // header
        .filter_map(parse_bulk_row)
        .collect()
}

fn parse_bulk_row(line: &str) -> Option<Draw> {
    let mut fields = line.split(',');
    let date_raw = fields.next()?.trim();
    let numbers_raw = fields.next()?.trim();

    let date = NaiveDate::parse_from_str(date_raw, "%m/%d/%Y")
        .or_else(|_| date_raw.parse::<NaiveDate>())
        .ok()?;

    let numbers: Vec<u8> = numbers_raw
        .split_whitespace()
        .filter_map(|t| t.parse::<u8>().ok())
        .collect();
    if numbers.len() != 6 {
        return None;
    }

    Draw::new(
        date,
        [numbers[0], numbers[1], numbers[2], numbers[3], numbers[4]],
        numbers[5],
    )
    .ok()
}
