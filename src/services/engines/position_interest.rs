use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::models::{InvestmentClass, Position, PositionInterestAccrual};

/// Default accrual rate used when a fixed-income position carries no
/// explicit coupon in `investment_subtype` (§4.E.8). Positions that aren't
/// fixed income are skipped entirely — this engine never touches equities
/// or options.
pub const DEFAULT_ANNUAL_RATE: f64 = 0.045;

fn is_fixed_income(position: &Position) -> bool {
    position.investment_class == InvestmentClass::Public
        && position
            .investment_subtype
            .as_deref()
            .map(|s| s.eq_ignore_ascii_case("fixed_income") || s.eq_ignore_ascii_case("bond"))
            .unwrap_or(false)
}

/// Eighth engine (§4.E.8). Accrues interest since the position's entry date
/// (or a prior accrual, if the caller has one) through `calculation_date`
/// for fixed-income positions; every other position class is a no-op.
pub fn calculate(
    position: &Position,
    calculation_date: NaiveDate,
    since: NaiveDate,
) -> Option<PositionInterestAccrual> {
    if !is_fixed_income(position) {
        return None;
    }

    let days_accrued = (calculation_date - since).num_days().max(0) as i32;
    let principal: f64 = position.quantity.to_string().parse::<f64>().unwrap_or(0.0).abs()
        * position.entry_price.to_string().parse::<f64>().unwrap_or(0.0);
    let accrued = principal * DEFAULT_ANNUAL_RATE * days_accrued as f64 / 365.0;

    Some(PositionInterestAccrual {
        position_id: position.id,
        calculation_date,
        days_accrued,
        annual_rate: DEFAULT_ANNUAL_RATE,
        accrued_interest: BigDecimal::try_from(accrued).unwrap_or_else(|_| BigDecimal::from(0)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn bond_position() -> Position {
        Position {
            id: Uuid::new_v4(),
            portfolio_id: Uuid::new_v4(),
            symbol: "US10Y".to_string(),
            quantity: BigDecimal::from(10_000),
            entry_price: BigDecimal::from(1),
            entry_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            investment_class: InvestmentClass::Public,
            investment_subtype: Some("FIXED_INCOME".to_string()),
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
    fn equities_never_accrue_interest() {
        let mut position = bond_position();
        position.investment_subtype = None;
        let accrual = calculate(&position, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert!(accrual.is_none());
    }

    #[test]
    fn fixed_income_accrues_proportional_to_days_held() {
        let position = bond_position();
        let since = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let accrual = calculate(&position, date, since).unwrap();
        assert_eq!(accrual.days_accrued, 30);
        assert!(accrual.accrued_interest > BigDecimal::from(0));
    }
}
