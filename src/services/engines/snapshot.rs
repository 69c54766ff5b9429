use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;

use crate::models::{ExposureTotals, Portfolio, PortfolioSnapshot, PositionMarketValue};

/// Seventh engine (§4.E.7): the durable "date D is done" marker. The
/// orchestrator only calls this once every prior engine for (portfolio, D)
/// has returned successfully — a snapshot existing for D is itself the
/// system's proof that D was fully processed.
pub fn calculate(
    portfolio: &Portfolio,
    calculation_date: NaiveDate,
    market_values: &[PositionMarketValue],
    totals: &ExposureTotals,
    prior_snapshot: Option<&PortfolioSnapshot>,
) -> PortfolioSnapshot {
    let position_value: BigDecimal = market_values.iter().map(|v| v.market_value.clone()).sum();
    let total_value = &portfolio.equity_balance + &position_value;

    let daily_return = prior_snapshot.and_then(|prior| {
        let prior_total: f64 = prior.total_value.to_string().parse().ok()?;
        if prior_total == 0.0 {
            return None;
        }
        let current_total: f64 = total_value.to_string().parse().ok()?;
        Some(current_total / prior_total - 1.0)
    });

    PortfolioSnapshot {
        portfolio_id: portfolio.id,
        snapshot_date: calculation_date,
        total_value,
        cash_balance: portfolio.equity_balance.clone(),
        long_exposure: totals.long_exposure.clone(),
        short_exposure: totals.short_exposure.clone(),
        gross_exposure: totals.gross_exposure.clone(),
        net_exposure: totals.net_exposure.clone(),
        daily_return,
        position_count: market_values.len() as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample_portfolio() -> Portfolio {
        Portfolio {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            account_name: "Main".to_string(),
            account_type: crate::models::AccountType::Taxable,
            equity_balance: BigDecimal::from(10_000),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn total_value_is_cash_plus_market_values() {
        let portfolio = sample_portfolio();
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let market_value = PositionMarketValue {
            position_id: Uuid::new_v4(),
            calculation_date: date,
            price: BigDecimal::from(150),
            market_value: BigDecimal::from(15_000),
            delta_adjusted_exposure: BigDecimal::from(15_000),
            unrealized_pnl: BigDecimal::zero(),
        };
        let totals = ExposureTotals {
            long_exposure: BigDecimal::from(15_000),
            short_exposure: BigDecimal::zero(),
            gross_exposure: BigDecimal::from(15_000),
            net_exposure: BigDecimal::from(15_000),
        };
        let snapshot = calculate(&portfolio, date, &[market_value], &totals, None);
        assert_eq!(snapshot.total_value, BigDecimal::from(25_000));
        assert!(snapshot.daily_return.is_none());
    }

    #[test]
    fn daily_return_is_computed_against_prior_snapshot() {
        let portfolio = sample_portfolio();
        let date = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();
        let prior = PortfolioSnapshot {
            portfolio_id: portfolio.id,
            snapshot_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            total_value: BigDecimal::from(20_000),
            cash_balance: BigDecimal::from(10_000),
            long_exposure: BigDecimal::from(10_000),
            short_exposure: BigDecimal::zero(),
            gross_exposure: BigDecimal::from(10_000),
            net_exposure: BigDecimal::from(10_000),
            daily_return: None,
            position_count: 1,
        };
        let totals = ExposureTotals::zero();
        let snapshot = calculate(&portfolio, date, &[], &totals, Some(&prior));
        assert!((snapshot.daily_return.unwrap() - (-0.5)).abs() < 1e-9);
    }
}
