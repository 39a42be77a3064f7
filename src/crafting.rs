use crate::error::BotError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CraftCost {
    pub attempts: u64,
    pub unit_cost: f64,
    pub total: f64,
    /// `total` expressed in the secondary unit.
    pub secondary_total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CraftOdds {
    pub probability: f64,
    pub attempts: u64,
    pub at_least_one: f64,
    pub expected_attempts: f64,
}

/// Total cost of `attempts` crafts at `unit_cost` chaos each, plus the same
/// total converted at `secondary_rate` chaos per secondary unit.
pub fn craft_cost(attempts: i64, unit_cost: f64, secondary_rate: f64) -> Result<CraftCost, BotError> {
    if attempts <= 0 || !unit_cost.is_finite() || unit_cost <= 0.0 {
        return Err(BotError::Validation(
            "Please provide positive numbers!".to_string(),
        ));
    }
    if !secondary_rate.is_finite() || secondary_rate <= 0.0 {
        return Err(BotError::Validation(format!(
            "Conversion rate must be positive (got `{}`).",
            secondary_rate
        )));
    }

    let total = attempts as f64 * unit_cost;
    Ok(CraftCost {
        attempts: attempts as u64,
        unit_cost,
        total,
        secondary_total: total / secondary_rate,
    })
}

/// Odds of at least one success in `attempts` tries at per-try probability
/// `probability` (0 < p <= 1), and the expected tries to the first success.
pub fn craft_odds(probability: f64, attempts: i64) -> Result<CraftOdds, BotError> {
    if !(probability > 0.0 && probability <= 1.0) {
        return Err(BotError::Validation(
            "Success chance must be between 0 and 100!".to_string(),
        ));
    }
    if attempts <= 0 {
        return Err(BotError::Validation("Attempts must be positive!".to_string()));
    }

    let failures = (1.0 - probability).powf(attempts as f64);
    Ok(CraftOdds {
        probability,
        attempts: attempts as u64,
        at_least_one: 1.0 - failures,
        expected_attempts: 1.0 / probability,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_relative_eq, relative_eq};
    use proptest::prelude::*;

    #[test]
    fn cost_totals_and_converts() {
        let cost = craft_cost(100, 5.5, 180.0).unwrap();
        assert_eq!(cost.total, 550.0);
        assert_relative_eq!(cost.secondary_total, 550.0 / 180.0);
    }

    #[test]
    fn cost_rejects_non_positive_input() {
        assert!(matches!(craft_cost(0, 5.0, 180.0), Err(BotError::Validation(_))));
        assert!(matches!(craft_cost(10, -1.0, 180.0), Err(BotError::Validation(_))));
        assert!(matches!(craft_cost(10, 1.0, 0.0), Err(BotError::Validation(_))));
    }

    #[test]
    fn odds_for_five_percent_over_hundred_tries() {
        let odds = craft_odds(0.05, 100).unwrap();
        assert_relative_eq!(odds.at_least_one, 1.0 - 0.95f64.powi(100));
        assert_relative_eq!(odds.at_least_one, 0.9941, epsilon = 1e-4);
        assert_relative_eq!(odds.expected_attempts, 20.0);
    }

    #[test]
    fn certain_success_is_one() {
        let odds = craft_odds(1.0, 1).unwrap();
        assert_eq!(odds.at_least_one, 1.0);
        assert_eq!(odds.expected_attempts, 1.0);
    }

    #[test]
    fn odds_reject_out_of_range() {
        assert!(craft_odds(0.0, 10).is_err());
        assert!(craft_odds(1.01, 10).is_err());
        assert!(craft_odds(f64::NAN, 10).is_err());
        assert!(craft_odds(0.5, 0).is_err());
    }

    proptest! {
        #[test]
        fn at_least_one_matches_closed_form(p in 0.0001f64..=1.0, n in 1i64..500) {
            let odds = craft_odds(p, n).unwrap();
            let expected = 1.0 - (1.0 - p).powf(n as f64);
            prop_assert!(relative_eq!(odds.at_least_one, expected, epsilon = 1e-12));
        }

        #[test]
        fn at_least_one_grows_with_attempts(p in 0.0001f64..=1.0, n in 1i64..500) {
            let fewer = craft_odds(p, n).unwrap().at_least_one;
            let more = craft_odds(p, n + 1).unwrap().at_least_one;
            prop_assert!(more >= fewer);
        }
    }
}
