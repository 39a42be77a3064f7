pub mod calc;
pub mod client;

pub use client::{CurrencySource, NinjaClient};

use crate::error::BotError;
use std::sync::Arc;
use tracing::info;

/// One line of a currency overview. Fetched per request, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyRecord {
    pub name: String,
    pub chaos_equivalent: f64,
    /// Seven day change in percent, when upstream reports one.
    pub seven_day_change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub amount: f64,
    pub from_name: String,
    pub to_name: String,
    pub chaos_value: f64,
    pub result: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Worth {
    pub amount: f64,
    pub name: String,
    pub chaos_worth: f64,
    pub reference_worth: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ratio {
    pub first_name: String,
    pub second_name: String,
    pub first_rate: f64,
    pub second_rate: f64,
    /// Units of the second currency per one of the first.
    pub first_in_second: f64,
    /// Units of the first currency per one of the second.
    pub second_in_first: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulkLine {
    pub amount: f64,
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulkReport {
    pub lines: Vec<BulkLine>,
    /// Queries that matched nothing; reported, not fatal.
    pub missing: Vec<String>,
    pub total_chaos: f64,
    pub total_reference: f64,
}

/// Currency operations. Each call performs exactly one upstream fetch.
#[derive(Clone)]
pub struct CurrencyService {
    source: Arc<dyn CurrencySource>,
    reference: String,
}

impl CurrencyService {
    pub fn new(source: Arc<dyn CurrencySource>, reference: impl Into<String>) -> Self {
        Self {
            source,
            reference: reference.into(),
        }
    }

    pub fn reference_name(&self) -> &str {
        &self.reference
    }

    pub async fn price(&self, league: &str, query: &str) -> Result<CurrencyRecord, BotError> {
        let records = self.source.fetch_overview(league).await?;
        let record = calc::resolve(&records, query)?.clone();
        info!("Price lookup '{}' in {} -> {}", query, league, record.name);
        Ok(record)
    }

    pub async fn top_rates(&self, league: &str, n: usize) -> Result<Vec<CurrencyRecord>, BotError> {
        let records = self.source.fetch_overview(league).await?;
        Ok(calc::top_by_value(&records, n))
    }

    pub async fn convert(
        &self,
        league: &str,
        amount: f64,
        from_query: &str,
        to_query: &str,
    ) -> Result<Conversion, BotError> {
        let amount = calc::validate_amount(amount)?;
        let records = self.source.fetch_overview(league).await?;
        let from = calc::resolve(&records, from_query)?;
        let to = calc::resolve(&records, to_query)?;

        Ok(Conversion {
            amount,
            from_name: from.name.clone(),
            to_name: to.name.clone(),
            chaos_value: amount * from.chaos_equivalent,
            result: calc::convert_amount(amount, from.chaos_equivalent, to.chaos_equivalent),
        })
    }

    pub async fn worth(&self, league: &str, amount: f64, query: &str) -> Result<Worth, BotError> {
        let amount = calc::validate_amount(amount)?;
        let records = self.source.fetch_overview(league).await?;
        let record = calc::resolve(&records, query)?;
        let reference_rate = calc::reference_rate(&records, &self.reference);
        let chaos_worth = amount * record.chaos_equivalent;

        Ok(Worth {
            amount,
            name: record.name.clone(),
            chaos_worth,
            reference_worth: calc::convert_amount(chaos_worth, 1.0, reference_rate),
        })
    }

    pub async fn ratio(&self, league: &str, first: &str, second: &str) -> Result<Ratio, BotError> {
        let records = self.source.fetch_overview(league).await?;
        let a = calc::resolve(&records, first)?;
        let b = calc::resolve(&records, second)?;

        Ok(Ratio {
            first_name: a.name.clone(),
            second_name: b.name.clone(),
            first_rate: a.chaos_equivalent,
            second_rate: b.chaos_equivalent,
            first_in_second: calc::ratio(a.chaos_equivalent, b.chaos_equivalent),
            second_in_first: calc::ratio(b.chaos_equivalent, a.chaos_equivalent),
        })
    }

    /// Values every `(amount, query)` pair against one overview.
    /// Fails with `NotFound` only when no pair matched at all.
    pub async fn bulk(&self, league: &str, pairs: &[(f64, String)]) -> Result<BulkReport, BotError> {
        let records = self.source.fetch_overview(league).await?;
        let reference_rate = calc::reference_rate(&records, &self.reference);

        let mut lines = Vec::new();
        let mut missing = Vec::new();
        for (amount, query) in pairs {
            match calc::find_record(&records, query) {
                Some(record) => lines.push(BulkLine {
                    amount: *amount,
                    name: record.name.clone(),
                    value: amount * record.chaos_equivalent,
                }),
                None => missing.push(query.clone()),
            }
        }

        if lines.is_empty() {
            return Err(BotError::NotFound("any of the listed currencies".to_string()));
        }

        let total_chaos: f64 = lines.iter().map(|line| line.value).sum();
        Ok(BulkReport {
            lines,
            missing,
            total_chaos,
            total_reference: calc::convert_amount(total_chaos, 1.0, reference_rate),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves a fixed overview and counts fetches.
    struct StubSource {
        records: Option<Vec<CurrencyRecord>>,
        fetches: AtomicUsize,
    }

    impl StubSource {
        fn with(records: &[(&str, f64)]) -> Self {
            Self {
                records: Some(
                    records
                        .iter()
                        .map(|(name, rate)| CurrencyRecord {
                            name: name.to_string(),
                            chaos_equivalent: *rate,
                            seven_day_change: None,
                        })
                        .collect(),
                ),
                fetches: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                records: None,
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CurrencySource for StubSource {
        async fn fetch_overview(&self, _league: &str) -> Result<Vec<CurrencyRecord>, BotError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.records
                .clone()
                .ok_or_else(|| BotError::FetchFailed("status 503".to_string()))
        }
    }

    fn service(source: &Arc<StubSource>) -> CurrencyService {
        CurrencyService::new(source.clone(), "Divine Orb")
    }

    #[tokio::test]
    async fn test_price_from_overview() {
        let body = r#"{"lines":[{"currencyTypeName":"Divine Orb","chaosEquivalent":180}]}"#;
        let source = Arc::new(StubSource {
            records: Some(client::parse_overview(body).unwrap()),
            fetches: AtomicUsize::new(0),
        });
        let record = service(&source).price("Standard", "Divine Orb").await.unwrap();
        assert_eq!(record.chaos_equivalent, 180.0);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_price_not_found_and_fetch_failure() {
        let source = Arc::new(StubSource::with(&[("Chaos Orb", 1.0)]));
        let err = service(&source).price("Standard", "Mirror").await.unwrap_err();
        assert!(matches!(err, BotError::NotFound(_)));

        let source = Arc::new(StubSource::failing());
        let err = service(&source).price("Standard", "Mirror").await.unwrap_err();
        assert!(matches!(err, BotError::FetchFailed(_)));
    }

    #[tokio::test]
    async fn test_convert_uses_one_fetch() {
        let source = Arc::new(StubSource::with(&[("Divine Orb", 180.0), ("Chaos Orb", 1.0)]));
        let conversion = service(&source)
            .convert("Standard", 2.0, "divine", "chaos")
            .await
            .unwrap();
        assert_eq!(conversion.from_name, "Divine Orb");
        assert_eq!(conversion.to_name, "Chaos Orb");
        assert_eq!(conversion.chaos_value, 360.0);
        assert_eq!(conversion.result, 360.0);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_convert_to_worthless_currency_is_zero() {
        let source = Arc::new(StubSource::with(&[("Divine Orb", 180.0), ("Scrap", 0.0)]));
        let conversion = service(&source)
            .convert("Standard", 1.0, "divine", "scrap")
            .await
            .unwrap();
        assert_eq!(conversion.result, 0.0);
    }

    #[tokio::test]
    async fn test_convert_rejects_bad_amount_before_fetching() {
        let source = Arc::new(StubSource::with(&[("Divine Orb", 180.0)]));
        let err = service(&source)
            .convert("Standard", -1.0, "divine", "divine")
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::Validation(_)));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_worth_divides_by_reference() {
        let source = Arc::new(StubSource::with(&[("Divine Orb", 200.0), ("Exalted Orb", 10.0)]));
        let worth = service(&source).worth("Standard", 50.0, "exalted").await.unwrap();
        assert_eq!(worth.chaos_worth, 500.0);
        assert_relative_eq!(worth.reference_worth, worth.chaos_worth / 200.0);

        // No reference in the overview: rate defaults to 1
        let source = Arc::new(StubSource::with(&[("Exalted Orb", 10.0)]));
        let worth = service(&source).worth("Standard", 50.0, "exalted").await.unwrap();
        assert_eq!(worth.reference_worth, 500.0);
    }

    #[tokio::test]
    async fn test_ratio_both_directions() {
        let source = Arc::new(StubSource::with(&[("Divine Orb", 180.0), ("Chaos Orb", 1.0)]));
        let ratio = service(&source).ratio("Standard", "divine", "chaos").await.unwrap();
        assert_eq!(ratio.first_in_second, 180.0);
        assert_relative_eq!(ratio.second_in_first, 1.0 / 180.0);

        let source = Arc::new(StubSource::with(&[("Divine Orb", 180.0), ("Scrap", 0.0)]));
        let ratio = service(&source).ratio("Standard", "divine", "scrap").await.unwrap();
        assert_eq!(ratio.first_in_second, 0.0);
        assert_eq!(ratio.second_in_first, 0.0);
    }

    #[tokio::test]
    async fn test_bulk_totals_and_warnings() {
        let source = Arc::new(StubSource::with(&[("Divine Orb", 180.0), ("Chaos Orb", 1.0)]));
        let pairs = vec![
            (10.0, "Divine".to_string()),
            (3.0, "Mirror".to_string()),
            (500.0, "Chaos".to_string()),
        ];
        let report = service(&source).bulk("Standard", &pairs).await.unwrap();
        assert_eq!(report.lines.len(), 2);
        assert_eq!(report.missing, vec!["Mirror".to_string()]);
        assert_eq!(report.total_chaos, 2300.0);
        assert_relative_eq!(report.total_reference, 12.78, epsilon = 0.01);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_bulk_with_nothing_matched() {
        let source = Arc::new(StubSource::with(&[("Chaos Orb", 1.0)]));
        let pairs = vec![(1.0, "Mirror".to_string())];
        let err = service(&source).bulk("Standard", &pairs).await.unwrap_err();
        assert!(matches!(err, BotError::NotFound(_)));
    }
}
