use super::CurrencyRecord;
use crate::error::BotError;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

/// Anything that can produce a currency overview for a league.
#[async_trait]
pub trait CurrencySource: Send + Sync {
    async fn fetch_overview(&self, league: &str) -> Result<Vec<CurrencyRecord>, BotError>;
}

/// poe.ninja currency overview client.
pub struct NinjaClient {
    http: reqwest::Client,
    base_url: String,
}

impl NinjaClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CurrencySource for NinjaClient {
    async fn fetch_overview(&self, league: &str) -> Result<Vec<CurrencyRecord>, BotError> {
        debug!("Fetching currency overview for league '{}'", league);
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("league", league), ("type", "Currency")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Currency overview for '{}' returned {}", league, status);
            return Err(BotError::FetchFailed(format!(
                "status {} for league {}",
                status, league
            )));
        }

        let body = response.text().await?;
        parse_overview(&body)
    }
}

#[derive(Deserialize)]
struct OverviewResponse {
    #[serde(default)]
    lines: Vec<OverviewLine>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OverviewLine {
    currency_type_name: String,
    chaos_equivalent: Option<f64>,
    receive_spark_line: Option<SparkLine>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SparkLine {
    total_change: Option<f64>,
}

/// Decodes an overview body, keeping upstream order.
pub fn parse_overview(body: &str) -> Result<Vec<CurrencyRecord>, BotError> {
    let response: OverviewResponse = serde_json::from_str(body)
        .map_err(|e| BotError::FetchFailed(format!("invalid overview body: {}", e)))?;

    Ok(response
        .lines
        .into_iter()
        .map(|line| CurrencyRecord {
            name: line.currency_type_name,
            chaos_equivalent: line.chaos_equivalent.unwrap_or(0.0),
            seven_day_change: line.receive_spark_line.and_then(|s| s.total_change),
        })
        .collect())
}
