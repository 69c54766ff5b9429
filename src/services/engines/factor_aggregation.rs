use std::collections::HashMap;

use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{
    DataQuality, FactorAggregationResult, FactorDefinition, FactorExposure, Position,
    PositionFactorExposure, PositionMarketValue, InvestmentClass, SymbolFactorExposure,
};

/// Fourth engine (§4.E.4). Rolls position-level symbol betas up to a
/// portfolio-level exposure per factor, weighted by each position's signed
/// dollar exposure. PRIVATE positions never contribute — they have no market
/// data and therefore no beta.
pub fn calculate(
    portfolio_id: Uuid,
    calculation_date: NaiveDate,
    positions: &[Position],
    market_values: &HashMap<Uuid, PositionMarketValue>,
    symbol_exposures: &[SymbolFactorExposure],
    factors: &[FactorDefinition],
) -> FactorAggregationResult {
    let public_positions: Vec<&Position> = positions
        .iter()
        .filter(|p| p.investment_class != InvestmentClass::Private)
        .collect();

    if public_positions.is_empty() {
        return FactorAggregationResult {
            portfolio_id,
            calculation_date,
            exposures: Vec::new(),
            position_exposures: Vec::new(),
            data_quality: DataQuality::no_public_positions(positions.len() as i32),
        };
    }

    let betas_by_symbol_factor: HashMap<(&str, Uuid), &SymbolFactorExposure> = symbol_exposures
        .iter()
        .map(|e| ((e.symbol.as_str(), e.factor_id), e))
        .collect();

    let mut position_exposures = Vec::new();
    let mut exposures = Vec::new();
    let mut any_insufficient = false;
    let mut any_contribution = false;

    for factor in factors {
        let mut weighted_sum = 0.0;
        let mut weight_total = BigDecimal::zero();

        for position in &public_positions {
            let Some(market_value) = market_values.get(&position.id) else {
                continue;
            };
            let Some(exposure) = betas_by_symbol_factor.get(&(position.symbol.as_str(), factor.id)) else {
                continue;
            };

            any_contribution = true;
            if exposure.insufficient_history {
                any_insufficient = true;
            }

            position_exposures.push(PositionFactorExposure {
                position_id: position.id,
                calculation_date,
                factor_id: factor.id,
                beta: exposure.beta,
            });

            let dollar_weight = &market_value.delta_adjusted_exposure;
            let weight_f64: f64 = dollar_weight.to_string().parse().unwrap_or(0.0);
            weighted_sum += exposure.beta * weight_f64;
            weight_total += dollar_weight;
        }

        let weight_total_f64: f64 = weight_total.to_string().parse().unwrap_or(0.0);
        let exposure_value = if weight_total_f64 != 0.0 {
            weighted_sum / weight_total_f64
        } else {
            0.0
        };

        exposures.push(FactorExposure {
            portfolio_id,
            calculation_date,
            factor_id: factor.id,
            exposure_value,
            exposure_dollar: BigDecimal::try_from(weighted_sum).unwrap_or_else(|_| BigDecimal::zero()),
        });
    }

    let data_quality = if !any_contribution {
        DataQuality::insufficient_data(0)
    } else if any_insufficient {
        DataQuality {
            flag: crate::models::DataQualityFlag::LimitedHistory,
            message: "One or more positions have fewer than the minimum lookback days of history".to_string(),
            positions_analyzed: Some(public_positions.len() as i32),
            positions_total: Some(positions.len() as i32),
            positions_skipped: Some(positions.len() as i32 - public_positions.len() as i32),
            data_days: None,
        }
    } else {
        DataQuality::full_history(
            public_positions.len() as i32,
            positions.len() as i32,
            super::symbol_factors::DEFAULT_LOOKBACK_DAYS as i32,
        )
    };

    FactorAggregationResult {
        portfolio_id,
        calculation_date,
        exposures,
        position_exposures,
        data_quality,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn public_position(id: Uuid) -> Position {
        Position {
            id,
            portfolio_id: Uuid::new_v4(),
            symbol: "AAPL".to_string(),
            quantity: BigDecimal::from(100),
            entry_price: BigDecimal::from(150),
            entry_date: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
            investment_class: InvestmentClass::Public,
            investment_subtype: None,
            underlying_symbol: None,
            strike_price: None,
            expiration_date: None,
            option_type: None,
            exit_date: None,
            exit_price: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn no_public_positions_short_circuits_with_skip_payload() {
        let mut position = public_position(Uuid::new_v4());
        position.investment_class = InvestmentClass::Private;
        let result = calculate(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            &[position],
            &HashMap::new(),
            &[],
            &[],
        );
        assert_eq!(result.data_quality.flag, crate::models::DataQualityFlag::NoPublicPositions);
        assert!(result.exposures.is_empty());
    }

    #[test]
    fn single_position_beta_passes_through_as_portfolio_exposure() {
        let position_id = Uuid::new_v4();
        let position = public_position(position_id);
        let portfolio_id = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let factor = FactorDefinition {
            id: Uuid::new_v4(),
            name: "Market".to_string(),
            etf_symbol: "SPY".to_string(),
            is_active: true,
        };
        let mut market_values = HashMap::new();
        market_values.insert(
            position_id,
            PositionMarketValue {
                position_id,
                calculation_date: date,
                price: BigDecimal::from(150),
                market_value: BigDecimal::from(15000),
                delta_adjusted_exposure: BigDecimal::from(15000),
                unrealized_pnl: BigDecimal::zero(),
            },
        );
        let symbol_exposures = vec![SymbolFactorExposure {
            symbol: "AAPL".to_string(),
            calculation_date: date,
            factor_id: factor.id,
            beta: 1.2,
            data_days: 252,
            insufficient_history: false,
        }];

        let result = calculate(portfolio_id, date, &[position], &market_values, &symbol_exposures, &[factor]);
        assert_eq!(result.exposures.len(), 1);
        assert!((result.exposures[0].exposure_value - 1.2).abs() < 1e-9);
        assert_eq!(result.data_quality.flag, crate::models::DataQualityFlag::FullHistory);
    }
}
