//! Matching and arithmetic over one fetched currency overview.
//!
//! Every function here works on a slice returned by a single fetch; nothing
//! caches or refetches.

use super::CurrencyRecord;
use crate::error::BotError;

/// First record whose name contains `query`, ignoring case, in upstream order.
pub fn find_record<'a>(records: &'a [CurrencyRecord], query: &str) -> Option<&'a CurrencyRecord> {
    let needle = query.to_lowercase();
    records
        .iter()
        .find(|record| record.name.to_lowercase().contains(&needle))
}

pub fn resolve<'a>(records: &'a [CurrencyRecord], query: &str) -> Result<&'a CurrencyRecord, BotError> {
    find_record(records, query).ok_or_else(|| BotError::NotFound(format!("currency `{}`", query)))
}

/// Chaos rate of the reference currency, or 1 if the overview lacks it.
pub fn reference_rate(records: &[CurrencyRecord], reference: &str) -> f64 {
    find_record(records, reference)
        .map(|record| record.chaos_equivalent)
        .unwrap_or(1.0)
}

/// `amount * from_rate / to_rate`; a zero target rate yields zero.
pub fn convert_amount(amount: f64, from_rate: f64, to_rate: f64) -> f64 {
    if to_rate > 0.0 {
        amount * from_rate / to_rate
    } else {
        0.0
    }
}

/// How many units of the second currency one unit of the first buys.
pub fn ratio(rate: f64, other_rate: f64) -> f64 {
    if other_rate > 0.0 {
        rate / other_rate
    } else {
        0.0
    }
}

pub fn validate_amount(amount: f64) -> Result<f64, BotError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(BotError::Validation(format!(
            "Amount must be a positive number (got `{}`).",
            amount
        )))
    }
}

/// Parses `amount currency amount currency ...` tokens into pairs.
/// A malformed amount rejects the whole list.
pub fn parse_bulk_pairs(tokens: &[String]) -> Result<Vec<(f64, String)>, BotError> {
    if tokens.is_empty() {
        return Err(BotError::Validation(
            "Please provide at least one amount and currency, e.g. `10 divine 500 chaos`."
                .to_string(),
        ));
    }
    if tokens.len() % 2 != 0 {
        return Err(BotError::Validation(
            "Please provide pairs of amount and currency name!".to_string(),
        ));
    }

    tokens
        .chunks(2)
        .map(|pair| {
            let amount: f64 = pair[0]
                .parse()
                .map_err(|_| BotError::Validation(format!("Invalid amount: `{}`", pair[0])))?;
            Ok((validate_amount(amount)?, pair[1].clone()))
        })
        .collect()
}

/// The `n` most valuable currencies, highest chaos value first.
pub fn top_by_value(records: &[CurrencyRecord], n: usize) -> Vec<CurrencyRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.chaos_equivalent.total_cmp(&a.chaos_equivalent));
    sorted.truncate(n);
    sorted
}
