use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{FactorDefinition, FactorExposure, StressScenario, StressTestResult};

/// §4.E.6: a loss under any scenario is capped at 99% of the portfolio's
/// baseline value — a scenario can never imply the portfolio going past
/// fully wiped out plus interest.
pub const LOSS_CAP_FRACTION: f64 = 0.99;

/// Sixth engine (§4.E.6). Applies one scenario's factor shocks to a
/// portfolio's factor-exposure dollars. Returns `None` when the portfolio has
/// no factor exposures at all — the caller turns that into the
/// `no_factor_exposures` skip payload rather than a zero-PnL result.
pub fn calculate(
    portfolio_id: Uuid,
    calculation_date: NaiveDate,
    scenario: &StressScenario,
    factor_exposures: &[FactorExposure],
    factor_defs: &[FactorDefinition],
    baseline_value: f64,
) -> Option<StressTestResult> {
    if factor_exposures.is_empty() {
        return None;
    }

    let name_by_id: HashMap<Uuid, &str> = factor_defs.iter().map(|f| (f.id, f.name.as_str())).collect();
    let shock_by_name: HashMap<&str, f64> = scenario
        .shocks
        .iter()
        .map(|s| (s.factor_name.as_str(), s.shock))
        .collect();

    let mut direct_pnl = 0.0;
    let mut unshocked_exposure = 0.0;

    for exposure in factor_exposures {
        let dollar: f64 = exposure.exposure_dollar.to_string().parse().unwrap_or(0.0);
        let Some(&name) = name_by_id.get(&exposure.factor_id) else {
            continue;
        };
        match shock_by_name.get(name) {
            Some(&shock) => direct_pnl += dollar * shock,
            None => unshocked_exposure += dollar,
        }
    }

    // Spread factors (not explicitly shocked) inherit a damped, averaged
    // shock when the scenario says they move with the named factors; left
    // orthogonal otherwise.
    let correlated_pnl = if scenario.spread_factors_respond_to_shocks && !scenario.shocks.is_empty() {
        let average_shock: f64 = scenario.shocks.iter().map(|s| s.shock).sum::<f64>() / scenario.shocks.len() as f64;
        direct_pnl + unshocked_exposure * average_shock * 0.3
    } else {
        direct_pnl
    };

    let loss_cap = -baseline_value.abs() * LOSS_CAP_FRACTION;
    let capped = correlated_pnl < loss_cap;
    let correlated_pnl = if capped { loss_cap } else { correlated_pnl };

    Some(StressTestResult {
        portfolio_id,
        scenario_id: scenario.id,
        calculation_date,
        scenario_name: scenario.name.clone(),
        direct_pnl,
        correlated_pnl,
        baseline_value,
        capped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FactorShock;

    fn market_factor() -> FactorDefinition {
        FactorDefinition {
            id: Uuid::new_v4(),
            name: "Market".to_string(),
            etf_symbol: "SPY".to_string(),
            is_active: true,
        }
    }

    #[test]
    fn no_factor_exposures_yields_none() {
        let scenario = StressScenario {
            id: Uuid::new_v4(),
            name: "Market -20%".to_string(),
            category: crate::models::ScenarioCategory::Hypothetical,
            shocks: vec![FactorShock { factor_name: "Market".to_string(), shock: -0.2 }],
            is_active: true,
            spread_factors_respond_to_shocks: false,
        };
        let result = calculate(Uuid::new_v4(), NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(), &scenario, &[], &[], 100_000.0);
        assert!(result.is_none());
    }

    #[test]
    fn direct_pnl_scales_linearly_with_shock() {
        let factor = market_factor();
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let exposure = FactorExposure {
            portfolio_id: Uuid::new_v4(),
            calculation_date: date,
            factor_id: factor.id,
            exposure_value: 1.0,
            exposure_dollar: bigdecimal::BigDecimal::from(100_000),
        };
        let scenario = StressScenario {
            id: Uuid::new_v4(),
            name: "Market -20%".to_string(),
            category: crate::models::ScenarioCategory::Hypothetical,
            shocks: vec![FactorShock { factor_name: "Market".to_string(), shock: -0.2 }],
            is_active: true,
            spread_factors_respond_to_shocks: false,
        };
        let result = calculate(exposure.portfolio_id, date, &scenario, &[exposure], &[factor], 100_000.0).unwrap();
        assert!((result.direct_pnl + 20_000.0).abs() < 1e-6);
        assert!(!result.capped);
    }

    #[test]
    fn loss_beyond_cap_is_clamped_and_flagged() {
        let factor = market_factor();
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let exposure = FactorExposure {
            portfolio_id: Uuid::new_v4(),
            calculation_date: date,
            factor_id: factor.id,
            exposure_value: 1.0,
            exposure_dollar: bigdecimal::BigDecimal::from(500_000),
        };
        let scenario = StressScenario {
            id: Uuid::new_v4(),
            name: "2008 Financial Crisis".to_string(),
            category: crate::models::ScenarioCategory::Historical,
            shocks: vec![FactorShock { factor_name: "Market".to_string(), shock: -0.45 }],
            is_active: true,
            spread_factors_respond_to_shocks: false,
        };
        let result = calculate(exposure.portfolio_id, date, &scenario, &[exposure], &[factor], 100_000.0).unwrap();
        assert!(result.capped);
        assert_eq!(result.correlated_pnl, -99_000.0);
    }
}
