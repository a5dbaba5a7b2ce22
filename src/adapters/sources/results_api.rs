//! Secondary acquisition source: authenticated results API.
//!
//! Socrata-style JSON endpoint. Requires an app token; the poller only
//! constructs this source when a key is configured.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Draw;
use crate::domain::ports::DrawSource;

#[derive(Debug, Clone)]
pub struct ResultsApiSource {
    http: Client,
    url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ApiDrawRecord {
    draw_date: String,
    winning_numbers: String,
}

impl ResultsApiSource {
    pub fn new(url: String, api_key: String, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { http, url, api_key }
    }
}

#[async_trait]
impl DrawSource for ResultsApiSource {
    fn name(&self) -> &'static str {
        "results_api"
    }

    async fn fetch_latest(&self) -> DomainResult<Draw> {
        let response = self
            .http
            .get(&self.url)
            .header("X-App-Token", &self.api_key)
            .query(&[("$order", "draw_date DESC"), ("$limit", "1")])
            .send()
            .await
            .map_err(|e| DomainError::AcquisitionFailed {
                origin: "results_api".to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DomainError::AcquisitionFailed {
                origin: "results_api".to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let records: Vec<ApiDrawRecord> =
            response
                .json()
                .await
                .map_err(|e| DomainError::AcquisitionFailed {
                    origin: "results_api".to_string(),
                    reason: e.to_string(),
                })?;

        let record = records.into_iter().next().ok_or_else(|| {
            DomainError::AcquisitionFailed {
                origin: "results_api".to_string(),
                reason: "empty result set".to_string(),
            }
        })?;

        parse_api_record(&record.draw_date, &record.winning_numbers)
    }
}

/// Parse an API record: ISO-ish timestamp and a space-separated number
/// string whose last value is the special number.
pub fn parse_api_record(draw_date: &str, winning_numbers: &str) -> DomainResult<Draw> {
    let date_part = draw_date.split('T').next().unwrap_or(draw_date);
    let date = date_part
        .parse::<NaiveDate>()
        .map_err(|e| DomainError::AcquisitionFailed {
            origin: "results_api".to_string(),
            reason: format!("bad draw_date '{}': {}", draw_date, e),
        })?;

    let numbers: Vec<u8> = winning_numbers
        .split_whitespace()
        .filter_map(|t| t.parse::<u8>().ok())
        .collect();
    if numbers.len() != 6 {
        return Err(DomainError::AcquisitionFailed {
            origin: "results_api".to_string(),
            reason: format!("expected 6 numbers, got '{}'", winning_numbers),
        });
    }

    Draw::new(
        date,
        [numbers[0], numbers[1], numbers[2], numbers[3], numbers[4]],
        numbers[5],
    )
}
