use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{CorrelationCalculation, CorrelationResult, DataQuality, PairwiseCorrelation, Position, PositionMarketValue};
use crate::services::stats;

#[cfg(test)]
use bigdecimal::BigDecimal;
#[cfg(test)]
use crate::models::{DataQualityFlag, InvestmentClass};

pub const DECAY: f64 = 0.94;
pub const MIN_CORRELATION: f64 = -0.95;
pub const MAX_CORRELATION: f64 = 0.95;
/// Minimum aligned (date-overlapping) observations a pair must have before a
/// correlation is computed at all (§4.E.5, TESTABLE PROPERTIES). Below this,
/// the pair is skipped rather than stored with a statistically meaningless
/// correlation.
pub const MIN_OVERLAP: usize = 30;
/// Cap on basket size (§4.E.5): pairwise count grows quadratically, so only
/// the top symbols by gross market value enter the matrix.
pub const MAX_SYMBOLS: usize = 25;

/// Fifth engine (§4.E.5). Builds the pairwise correlation matrix for a
/// portfolio's largest positions (by gross market value) over `duration_days`
/// of daily returns, using exponential-decay-weighted Pearson correlation.
pub fn calculate(
    portfolio_id: Uuid,
    calculation_date: NaiveDate,
    duration_days: i32,
    positions: &[Position],
    market_values: &HashMap<Uuid, PositionMarketValue>,
    return_series: &HashMap<String, Vec<(NaiveDate, f64)>>,
) -> CorrelationResult {
    let mut symbols = select_top_symbols(positions, market_values);
    symbols.sort();
    symbols.dedup();

    if symbols.len() < 2 {
        let calculation = CorrelationCalculation {
            id: Uuid::new_v4(),
            portfolio_id,
            calculation_date,
            duration_days,
            average_correlation: None,
        };
        return CorrelationResult {
            calculation,
            pairwise: Vec::new(),
            data_quality: Some(DataQuality::insufficient_data(0)),
        };
    }

    let mut pairwise = Vec::new();
    let mut sum = 0.0;
    let mut count = 0;
    let mut best_overlap = 0usize;

    for i in 0..symbols.len() {
        for j in (i + 1)..symbols.len() {
            let (symbol_a, symbol_b) = order_pair(&symbols[i], &symbols[j]);
            let empty = Vec::new();
            let series_a = return_series.get(symbol_a).unwrap_or(&empty);
            let series_b = return_series.get(symbol_b).unwrap_or(&empty);
            let aligned = align_by_date(series_a, series_b);
            best_overlap = best_overlap.max(aligned.len());

            if aligned.len() < MIN_OVERLAP {
                continue;
            }

            let (xs, ys): (Vec<f64>, Vec<f64>) = aligned.into_iter().unzip();

            if let Some(correlation) = stats::weighted_correlation(&xs, &ys, DECAY) {
                let capped = stats::cap_correlation(correlation, MIN_CORRELATION, MAX_CORRELATION);
                sum += capped;
                count += 1;
                pairwise.push(PairwiseCorrelation {
                    correlation_id: Uuid::new_v4(),
                    symbol_a: symbol_a.to_string(),
                    symbol_b: symbol_b.to_string(),
                    correlation: capped,
                });
            }
        }
    }

    let average_correlation = if count > 0 { Some(sum / count as f64) } else { None };

    let data_quality = if pairwise.is_empty() {
        Some(DataQuality::insufficient_data(best_overlap as i32))
    } else {
        None
    };

    CorrelationResult {
        calculation: CorrelationCalculation {
            id: Uuid::new_v4(),
            portfolio_id,
            calculation_date,
            duration_days,
            average_correlation,
        },
        pairwise,
        data_quality,
    }
}

fn order_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a < b { (a, b) } else { (b, a) }
}

/// Inner-join two (date, return) series on date so a pairwise correlation
/// never compares two symbols' returns from different trading days.
fn align_by_date(a: &[(NaiveDate, f64)], b: &[(NaiveDate, f64)]) -> Vec<(f64, f64)> {
    let b_by_date: HashMap<NaiveDate, f64> = b.iter().cloned().collect();
    a.iter()
        .filter_map(|(date, value)| b_by_date.get(date).map(|other| (*value, *other)))
        .collect()
}

fn select_top_symbols(positions: &[Position], market_values: &HashMap<Uuid, PositionMarketValue>) -> Vec<String> {
    let mut by_symbol: HashMap<String, f64> = HashMap::new();
    for position in positions {
        if let Some(market_value) = market_values.get(&position.id) {
            let gross: f64 = market_value.market_value.to_string().parse::<f64>().unwrap_or(0.0).abs();
            *by_symbol.entry(position.symbol.clone()).or_insert(0.0) += gross;
        }
    }
    let mut ranked: Vec<(String, f64)> = by_symbol.into_iter().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.into_iter().take(MAX_SYMBOLS).map(|(symbol, _)| symbol).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_pair_is_lexicographically_stable() {
        assert_eq!(order_pair("MSFT", "AAPL"), ("AAPL", "MSFT"));
        assert_eq!(order_pair("AAPL", "MSFT"), ("AAPL", "MSFT"));
    }

    #[test]
    fn fewer_than_two_symbols_yields_insufficient_data() {
        let result = calculate(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            90,
            &[],
            &HashMap::new(),
            &HashMap::new(),
        );
        assert!(result.pairwise.is_empty());
        assert!(result.data_quality.is_some());
    }

    fn sample_position(symbol: &str) -> Position {
        Position {
            id: Uuid::new_v4(),
            portfolio_id: Uuid::new_v4(),
            symbol: symbol.to_string(),
            quantity: BigDecimal::from(10),
            entry_price: BigDecimal::from(100),
            entry_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
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

    fn sample_market_value() -> PositionMarketValue {
        PositionMarketValue {
            position_id: Uuid::new_v4(),
            calculation_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            price: BigDecimal::from(100),
            market_value: BigDecimal::from(1000),
            delta_adjusted_exposure: BigDecimal::from(1000),
            unrealized_pnl: BigDecimal::from(0),
        }
    }

    #[test]
    fn a_pair_below_min_overlap_is_skipped_and_flagged_insufficient_data() {
        let position_a = sample_position("AAA");
        let position_b = sample_position("BBB");

        let mut market_values = HashMap::new();
        market_values.insert(position_a.id, PositionMarketValue { position_id: position_a.id, ..sample_market_value() });
        market_values.insert(position_b.id, PositionMarketValue { position_id: position_b.id, ..sample_market_value() });

        // Only 5 overlapping trading days, well under MIN_OVERLAP.
        let mut return_series = HashMap::new();
        let series: Vec<(NaiveDate, f64)> = (0..5)
            .map(|i| (NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + chrono::Duration::days(i), 0.01 * i as f64))
            .collect();
        return_series.insert("AAA".to_string(), series.clone());
        return_series.insert("BBB".to_string(), series);

        let result = calculate(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            90,
            &[position_a, position_b],
            &market_values,
            &return_series,
        );

        assert!(result.pairwise.is_empty());
        assert_eq!(result.calculation.average_correlation, None);
        let data_quality = result.data_quality.expect("short-overlap pair must be flagged insufficient_data");
        assert_eq!(data_quality.flag, DataQualityFlag::InsufficientData);
    }
}
