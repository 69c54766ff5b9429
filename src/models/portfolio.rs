use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account type a Portfolio is held under.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Taxable,
    Ira,
    RothIra,
    #[sqlx(rename = "401k")]
    #[serde(rename = "401k")]
    FourOhOneK,
    #[sqlx(rename = "403b")]
    #[serde(rename = "403b")]
    FourOhThreeB,
    #[sqlx(rename = "529")]
    #[serde(rename = "529")]
    FiveTwoNine,
    Hsa,
    Trust,
    Other,
}

/// A logical grouping of Positions, owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Portfolio {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_name: String,
    pub account_type: AccountType,
    pub equity_balance: BigDecimal,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePortfolio {
    pub account_name: String,
    pub account_type: AccountType,
    pub equity_balance: BigDecimal,
}

impl Portfolio {
    pub fn new(user_id: Uuid, input: CreatePortfolio) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            account_name: input.account_name,
            account_type: input.account_type,
            equity_balance: input.equity_balance,
            created_at: chrono::Utc::now(),
        }
    }
}
