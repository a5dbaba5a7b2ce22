//! Primary acquisition source: live scrape of the official results page.
//!
//! The page renders the latest drawing as a date heading followed by the
//! five white balls and the special ball in dedicated elements. The parser
//! is deliberately tolerant: it walks the markup for the known CSS markers
//! and takes the first complete result block.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Draw;
use crate::domain::ports::DrawSource;

const WHITE_BALL_CLASS: &str = "white-balls";
const SPECIAL_BALL_CLASS: &str = "powerball";
const DATE_MARKER: &str = "card-title";

#[derive(Debug, Clone)]
pub struct WebScrapeSource {
    http: Client,
    url: String,
}

impl WebScrapeSource {
    pub fn new(url: String, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("drawforge/0.1")
            .build()
            .unwrap_or_default();
        Self { http, url }
    }
}

#[async_trait]
impl DrawSource for WebScrapeSource {
    fn name(&self) -> &'static str {
        "web_scrape"
    }

    async fn fetch_latest(&self) -> DomainResult<Draw> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| DomainError::AcquisitionFailed {
                origin: "web_scrape".to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DomainError::AcquisitionFailed {
                origin: "web_scrape".to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| DomainError::AcquisitionFailed {
                origin: "web_scrape".to_string(),
                reason: e.to_string(),
            })?;

        parse_results_page(&html)
    }
}

/// Extract the latest draw from the results page markup.
pub fn parse_results_page(html: &str) -> DomainResult<Draw> {
    let date = extract_date(html).ok_or_else(|| DomainError::AcquisitionFailed {
        origin: "web_scrape".to_string(),
        reason: "no draw date found in page".to_string(),
    })?;

    let (whites, specials) = extract_balls(html);
    if whites.len() < 5 {
        return Err(DomainError::AcquisitionFailed {
            origin: "web_scrape".to_string(),
            reason: format!("expected 5 white balls, found {}", whites.len()),
        });
    }

    let special = *specials.first().ok_or_else(|| DomainError::AcquisitionFailed {
        origin: "web_scrape".to_string(),
        reason: "no special ball found in page".to_string(),
    })?;

    let draw = Draw::new(date, [whites[0], whites[1], whites[2], whites[3], whites[4]], special)?;
    Ok(draw)
}

/// Walk every `class="..."` attribute and bucket the leading integer of the
/// element body by class token. White-ball elements also carry the
/// `item-powerball` token, so tokens are matched exactly, not by substring.
fn extract_balls(html: &str) -> (Vec<u8>, Vec<u8>) {
    let mut whites = Vec::new();
    let mut specials = Vec::new();
    let mut rest = html;

    while let Some(pos) = rest.find("class=\"") {
        rest = &rest[pos + 7..];
        let Some(quote) = rest.find('"') else { break };
        let classes = &rest[..quote];
        rest = &rest[quote..];

        let is_white = classes.split_whitespace().any(|t| t == WHITE_BALL_CLASS);
        let is_special =
            !is_white && classes.split_whitespace().any(|t| t == SPECIAL_BALL_CLASS);
        if !is_white && !is_special {
            continue;
        }

        let Some(close) = rest.find('>') else { break };
        let body = &rest[close + 1..];
        let digits: String = body
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if let Ok(n) = digits.parse::<u8>() {
            if is_white {
                whites.push(n);
            } else {
                specials.push(n);
            }
        }
    }
    (whites, specials)
}

/// The drawing date rendered near the result block, e.g. "Sat, Jan 4, 2025".
fn extract_date(html: &str) -> Option<NaiveDate> {
    let pos = html.find(DATE_MARKER)?;
    let rest = &html[pos..];
    let close = rest.find('>')?;
    let body = &rest[close + 1..];
    let end = body.find('<')?;
    let text = body[..end].trim();

    // "Sat, Jan 4, 2025" -> drop the weekday.
    let without_day = text.split_once(", ").map(|(_, r)| r).unwrap_or(text);
    NaiveDate::parse_from_str(without_day, "%b %d, %Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div class="card">
          <h5 class="card-title mx-auto mb-3 lh-1 text-center">Sat, Jan 4, 2025</h5>
          <div class="white-balls item-powerball">10</div>
          <div class="white-balls item-powerball">20</div>
          <div class="white-balls item-powerball">30</div>
          <div class="white-balls item-powerball">40</div>
          <div class="white-balls item-powerball">50</div>
          <div class="powerball item-powerball">7</div>
        </div>"#;

    #[test]
    fn test_parse_results_page() {
        let draw = parse_results_page(PAGE).unwrap();
        assert_eq!(draw.date, "2025-01-04".parse::<NaiveDate>().unwrap());
        assert_eq!(draw.white, [10, 20, 30, 40, 50]);
        assert_eq!(draw.special, 7);
    }

    #[test]
    fn test_parse_rejects_incomplete_page() {
        assert!(parse_results_page("<html><body>maintenance</body></html>").is_err());
        // Date present but numbers missing.
        let partial = r#"<h5 class="card-title">Sat, Jan 4, 2025</h5>"#;
        assert!(parse_results_page(partial).is_err());
    }

    #[test]
    fn test_parse_rejects_invalid_numbers() {
        let bad = PAGE.replace(">50<", ">99<");
        assert!(parse_results_page(&bad).is_err());
    }
}
