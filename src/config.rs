use crate::errors::AppError;

/// Centralized environment configuration for the batch core.
///
/// The teacher reads environment variables ad hoc at each call site
/// (`main.rs`, `logging.rs`, individual jobs). This crate collects every
/// environment input named in spec §6 into one struct, validated once at
/// startup the way `LoggingConfig::validate` fails fast on an inconsistent
/// config.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub provider_api_keys: ProviderApiKeys,
    pub beta_invite_code: Option<String>,
    pub risk_free_rate: f64,
    pub factor_etfs: Vec<String>,
    pub stress_scenarios_path: Option<String>,
    pub max_db_connections: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ProviderApiKeys {
    pub fmp: Option<String>,
    pub polygon: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| AppError::Config("DATABASE_URL is not set".to_string()))?;

        let risk_free_rate = std::env::var("RISK_FREE_RATE")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(0.045);

        let factor_etfs = std::env::var("FACTOR_ETFS")
            .unwrap_or_else(|_| "SPY,IWM,MTUM,VLUE,QUAL,USMV,IWF".to_string())
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();

        let max_db_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let config = Self {
            database_url,
            provider_api_keys: ProviderApiKeys {
                fmp: std::env::var("FMP_API_KEY").ok(),
                polygon: std::env::var("POLYGON_API_KEY").ok(),
            },
            beta_invite_code: std::env::var("BETA_INVITE_CODE").ok(),
            risk_free_rate,
            factor_etfs,
            stress_scenarios_path: std::env::var("STRESS_SCENARIOS_PATH").ok(),
            max_db_connections,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.risk_free_rate < 0.0 || self.risk_free_rate > 1.0 {
            return Err(AppError::Config(format!(
                "RISK_FREE_RATE must be between 0 and 1, got {}",
                self.risk_free_rate
            )));
        }
        if self.factor_etfs.is_empty() {
            return Err(AppError::Config("FACTOR_ETFS resolved to an empty list".to_string()));
        }
        Ok(())
    }

    /// Compare a submitted invite code against the configured one.
    ///
    /// Equality after trimming and upper-casing both sides, per §6.
    pub fn invite_code_matches(&self, submitted: &str) -> bool {
        match &self.beta_invite_code {
            Some(expected) => {
                expected.trim().to_uppercase() == submitted.trim().to_uppercase()
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config(code: Option<&str>) -> Config {
        Config {
            database_url: "postgres://localhost/test".to_string(),
            provider_api_keys: ProviderApiKeys::default(),
            beta_invite_code: code.map(|s| s.to_string()),
            risk_free_rate: 0.045,
            factor_etfs: vec!["SPY".to_string()],
            stress_scenarios_path: None,
            max_db_connections: 10,
        }
    }

    #[test]
    fn invite_code_matches_ignores_case_and_whitespace() {
        let config = sample_config(Some("Sigma-2026"));
        assert!(config.invite_code_matches("  sigma-2026 "));
        assert!(config.invite_code_matches("SIGMA-2026"));
    }

    #[test]
    fn invite_code_mismatch_is_rejected() {
        let config = sample_config(Some("sigma-2026"));
        assert!(!config.invite_code_matches("other-code"));
    }

    #[test]
    fn missing_invite_code_never_matches() {
        let config = sample_config(None);
        assert!(!config.invite_code_matches(""));
    }
}
