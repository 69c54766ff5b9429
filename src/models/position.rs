use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum InvestmentClass {
    Public,
    Options,
    Private,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionType {
    Call,
    Put,
}

/// A single position held in a Portfolio.
///
/// Header fields are immutable once created. `investment_class = Options`
/// requires the four option fields atomically (all or none) — see
/// [`Position::validate`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Position {
    pub id: Uuid,
    pub portfolio_id: Uuid,
    pub symbol: String,
    pub quantity: BigDecimal,
    pub entry_price: BigDecimal,
    pub entry_date: NaiveDate,
    pub investment_class: InvestmentClass,
    pub investment_subtype: Option<String>,
    pub underlying_symbol: Option<String>,
    pub strike_price: Option<BigDecimal>,
    pub expiration_date: Option<NaiveDate>,
    pub option_type: Option<OptionType>,
    pub exit_date: Option<NaiveDate>,
    pub exit_price: Option<BigDecimal>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePosition {
    pub symbol: String,
    pub quantity: BigDecimal,
    pub entry_price: BigDecimal,
    pub entry_date: NaiveDate,
    pub investment_class: InvestmentClass,
    pub investment_subtype: Option<String>,
    pub underlying_symbol: Option<String>,
    pub strike_price: Option<BigDecimal>,
    pub expiration_date: Option<NaiveDate>,
    pub option_type: Option<OptionType>,
    pub exit_date: Option<NaiveDate>,
    pub exit_price: Option<BigDecimal>,
}

impl Position {
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        date >= self.entry_date && self.exit_date.map_or(true, |exit| date < exit)
    }

    pub fn is_long(&self) -> bool {
        self.quantity > BigDecimal::from(0)
    }
}

/// Validate the invariants in spec §3 that span more than one field.
pub fn validate_create(input: &CreatePosition) -> Result<(), AppError> {
    use bigdecimal::Zero;

    if input.symbol.is_empty() || input.symbol.len() > 100 {
        return Err(AppError::Validation(
            "symbol must be 1-100 characters".to_string(),
        ));
    }
    if input.quantity.is_zero() {
        return Err(AppError::Validation("quantity must be non-zero".to_string()));
    }
    if input.entry_price <= BigDecimal::from(0) {
        return Err(AppError::Validation("entry_price must be positive".to_string()));
    }
    let today = chrono::Utc::now().date_naive();
    if input.entry_date >= today {
        return Err(AppError::Validation("entry_date must be in the past".to_string()));
    }
    if today.years_since(input.entry_date).unwrap_or(0) > 100 {
        return Err(AppError::Validation(
            "entry_date must be within the last 100 years".to_string(),
        ));
    }
    if let (Some(exit_date), _) = (input.exit_date, input.exit_price) {
        if exit_date <= input.entry_date {
            return Err(AppError::Validation(
                "exit_date must be after entry_date".to_string(),
            ));
        }
    }

    let option_fields_present = [
        input.underlying_symbol.is_some(),
        input.strike_price.is_some(),
        input.expiration_date.is_some(),
        input.option_type.is_some(),
    ];
    let any_present = option_fields_present.iter().any(|p| *p);
    let all_present = option_fields_present.iter().all(|p| *p);

    match input.investment_class {
        InvestmentClass::Options => {
            if !all_present {
                return Err(AppError::Validation(
                    "OPTIONS positions require underlying_symbol, strike_price, expiration_date and option_type together".to_string(),
                ));
            }
        }
        _ => {
            if any_present {
                return Err(AppError::Validation(
                    "option fields are only valid on OPTIONS positions".to_string(),
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> CreatePosition {
        CreatePosition {
            symbol: "AAPL".to_string(),
            quantity: BigDecimal::from(100),
            entry_price: BigDecimal::from(158),
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            investment_class: InvestmentClass::Public,
            investment_subtype: None,
            underlying_symbol: None,
            strike_price: None,
            expiration_date: None,
            option_type: None,
            exit_date: None,
            exit_price: None,
        }
    }

    #[test]
    fn public_position_without_option_fields_is_valid() {
        assert!(validate_create(&base_input()).is_ok());
    }

    #[test]
    fn public_position_with_option_fields_is_rejected() {
        let mut input = base_input();
        input.strike_price = Some(BigDecimal::from(150));
        assert!(validate_create(&input).is_err());
    }

    #[test]
    fn options_position_requires_all_four_fields() {
        let mut input = base_input();
        input.investment_class = InvestmentClass::Options;
        input.strike_price = Some(BigDecimal::from(150));
        // underlying_symbol, expiration_date, option_type missing
        assert!(validate_create(&input).is_err());
    }

    #[test]
    fn options_position_with_all_four_fields_is_valid() {
        let mut input = base_input();
        input.investment_class = InvestmentClass::Options;
        input.underlying_symbol = Some("AAPL".to_string());
        input.strike_price = Some(BigDecimal::from(150));
        input.expiration_date = Some(NaiveDate::from_ymd_opt(2024, 6, 21).unwrap());
        input.option_type = Some(OptionType::Call);
        assert!(validate_create(&input).is_ok());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut input = base_input();
        input.quantity = BigDecimal::from(0);
        assert!(validate_create(&input).is_err());
    }

    #[test]
    fn exit_date_before_entry_date_is_rejected() {
        let mut input = base_input();
        input.exit_date = Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        input.exit_price = Some(BigDecimal::from(160));
        assert!(validate_create(&input).is_err());
    }

    #[test]
    fn is_active_on_respects_exit_date() {
        let mut position = Position {
            id: Uuid::new_v4(),
            portfolio_id: Uuid::new_v4(),
            symbol: "AAPL".to_string(),
            quantity: BigDecimal::from(100),
            entry_price: BigDecimal::from(158),
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            investment_class: InvestmentClass::Public,
            investment_subtype: None,
            underlying_symbol: None,
            strike_price: None,
            expiration_date: None,
            option_type: None,
            exit_date: None,
            exit_price: None,
            created_at: chrono::Utc::now(),
        };
        assert!(position.is_active_on(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
        position.exit_date = Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!(!position.is_active_on(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
        assert!(position.is_active_on(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
    }
}
