use bigdecimal::{BigDecimal, Zero};

use crate::models::{ExposureTotals, Position, PositionGreeks, PositionMarketValue};

/// Second engine in the ordering invariant (§4.E.2). Reads Greeks output only
/// to pick the delta-adjusted exposure for OPTIONS positions; never
/// recomputes or overwrites it.
pub fn calculate(
    position: &Position,
    calculation_date: chrono::NaiveDate,
    current_price: Option<&BigDecimal>,
    greeks: Option<&PositionGreeks>,
) -> (PositionMarketValue, bool) {
    let (price, used_fallback) = match current_price {
        Some(p) => (p.clone(), false),
        None => (position.entry_price.clone(), true),
    };

    let market_value = &position.quantity * &price;
    let cost_basis = &position.quantity * &position.entry_price;
    let unrealized_pnl = &market_value - &cost_basis;

    let delta_adjusted_exposure = match greeks.and_then(|g| g.delta) {
        Some(delta) => {
            let delta_bd = BigDecimal::try_from(delta).unwrap_or_else(|_| BigDecimal::zero());
            &market_value * &delta_bd
        }
        None => market_value.clone(),
    };

    (
        PositionMarketValue {
            position_id: position.id,
            calculation_date,
            price,
            market_value,
            delta_adjusted_exposure,
            unrealized_pnl,
        },
        used_fallback,
    )
}

/// Portfolio-level exposure roll-up (§4.E.2): long/short/gross/net, using
/// delta-adjusted exposure so options positions contribute their effective
/// notional rather than raw market value.
pub fn aggregate_exposures(values: &[PositionMarketValue]) -> ExposureTotals {
    let mut totals = ExposureTotals::zero();
    for value in values {
        if value.delta_adjusted_exposure > BigDecimal::zero() {
            totals.long_exposure += &value.delta_adjusted_exposure;
        } else {
            totals.short_exposure += -&value.delta_adjusted_exposure;
        }
    }
    totals.gross_exposure = &totals.long_exposure + &totals.short_exposure;
    totals.net_exposure = &totals.long_exposure - &totals.short_exposure;
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;
    use crate::models::InvestmentClass;

    fn sample_position(quantity: i64, entry_price: i64) -> Position {
        Position {
            id: Uuid::new_v4(),
            portfolio_id: Uuid::new_v4(),
            symbol: "AAPL".to_string(),
            quantity: BigDecimal::from(quantity),
            entry_price: BigDecimal::from(entry_price),
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
    fn falls_back_to_entry_price_when_cache_has_no_quote() {
        let position = sample_position(100, 150);
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let (value, used_fallback) = calculate(&position, date, None, None);
        assert!(used_fallback);
        assert_eq!(value.price, BigDecimal::from(150));
        assert_eq!(value.unrealized_pnl, BigDecimal::from(0));
    }

    #[test]
    fn uses_cache_price_when_present() {
        let position = sample_position(100, 150);
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let price = BigDecimal::from(160);
        let (value, used_fallback) = calculate(&position, date, Some(&price), None);
        assert!(!used_fallback);
        assert_eq!(value.unrealized_pnl, BigDecimal::from(1000));
    }

    #[test]
    fn exposure_totals_separate_long_and_short() {
        let long = PositionMarketValue {
            position_id: Uuid::new_v4(),
            calculation_date: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
            price: BigDecimal::from(100),
            market_value: BigDecimal::from(1000),
            delta_adjusted_exposure: BigDecimal::from(1000),
            unrealized_pnl: BigDecimal::from(0),
        };
        let short = PositionMarketValue {
            position_id: Uuid::new_v4(),
            calculation_date: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
            price: BigDecimal::from(50),
            market_value: BigDecimal::from(-500),
            delta_adjusted_exposure: BigDecimal::from(-500),
            unrealized_pnl: BigDecimal::from(0),
        };
        let totals = aggregate_exposures(&[long, short]);
        assert_eq!(totals.long_exposure, BigDecimal::from(1000));
        assert_eq!(totals.short_exposure, BigDecimal::from(500));
        assert_eq!(totals.gross_exposure, BigDecimal::from(1500));
        assert_eq!(totals.net_exposure, BigDecimal::from(500));
    }
}
