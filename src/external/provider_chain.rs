use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::external::price_provider::{ExternalOhlcvRow, MarketDataProvider, MarketDataProviderError};
use crate::services::failure_cache::{FailureCache, FailureType};
use crate::services::rate_limiter::RateLimiter;

/// Per-attempt ceiling on a single provider call (§4.B, §5).
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);
/// Backoff before each retry, up to 2 retries total (§4.B, §5).
const RETRY_BACKOFF: [Duration; 2] = [Duration::from_secs(1), Duration::from_secs(2)];

/// Calls `fetch_ohlcv` with a per-attempt timeout, retrying up to
/// `RETRY_BACKOFF.len()` times with exponential backoff before giving up.
async fn fetch_ohlcv_with_retry(
    provider: &dyn MarketDataProvider,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<ExternalOhlcvRow>, MarketDataProviderError> {
    let mut attempt = 0;
    loop {
        let outcome = tokio::time::timeout(PROVIDER_TIMEOUT, provider.fetch_ohlcv(symbol, start, end)).await;
        let result = match outcome {
            Ok(result) => result,
            Err(_) => Err(MarketDataProviderError::Timeout),
        };

        match &result {
            Err(MarketDataProviderError::Timeout) | Err(MarketDataProviderError::Network(_)) if attempt < RETRY_BACKOFF.len() => {
                warn!(
                    symbol = %symbol,
                    provider = provider.name(),
                    attempt,
                    error = %result.as_ref().unwrap_err(),
                    "provider attempt failed, retrying"
                );
                tokio::time::sleep(RETRY_BACKOFF[attempt]).await;
                attempt += 1;
            }
            _ => return result,
        }
    }
}

/// Result of running the Provider Chain over a symbol set (§4.B). The chain
/// always returns `Ok` — per-symbol unavailability is reported here, never
/// raised, so one bad symbol can't fail an entire ingestion batch.
pub struct OhlcvFetchResult {
    pub rows_by_symbol: HashMap<String, Vec<ExternalOhlcvRow>>,
    pub provider_counts: HashMap<&'static str, usize>,
    pub unavailable_symbols: Vec<String>,
}

struct RankedProvider {
    provider: Arc<dyn MarketDataProvider>,
    limiter: Arc<RateLimiter>,
}

/// Tries providers in priority order (YahooQuery → YFinance → FMP → Polygon
/// by default) for the subset of symbols earlier providers couldn't satisfy
/// (§4.B). Each provider is wrapped in its own [`RateLimiter`] so a quota-bound
/// provider never starves the others.
pub struct ProviderChain {
    providers: Vec<RankedProvider>,
    failure_cache: FailureCache,
}

impl ProviderChain {
    pub fn new(providers: Vec<(Arc<dyn MarketDataProvider>, Arc<RateLimiter>)>, failure_cache: FailureCache) -> Self {
        Self {
            providers: providers
                .into_iter()
                .map(|(provider, limiter)| RankedProvider { provider, limiter })
                .collect(),
            failure_cache,
        }
    }

    /// Fetch OHLCV for every symbol over [start, end], falling back across
    /// the chain per-symbol. Never returns an error: total failure for a
    /// symbol surfaces as membership in `unavailable_symbols`.
    pub async fn fetch_ohlcv(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> OhlcvFetchResult {
        let mut remaining: Vec<String> = symbols.to_vec();
        let mut rows_by_symbol = HashMap::new();
        let mut provider_counts = HashMap::new();

        for ranked in &self.providers {
            if remaining.is_empty() {
                break;
            }
            let mut still_remaining = Vec::new();
            for symbol in remaining {
                if let Some(failure) = self.failure_cache.is_failed(&symbol) {
                    warn!(symbol = %symbol, provider = ranked.provider.name(), ?failure, "skipping symbol, recent failure on file");
                    still_remaining.push(symbol);
                    continue;
                }

                let _permit = ranked.limiter.acquire().await;
                match fetch_ohlcv_with_retry(ranked.provider.as_ref(), &symbol, start, end).await {
                    Ok(fetched) if !fetched.is_empty() => {
                        self.failure_cache.clear(&symbol);
                        *provider_counts.entry(ranked.provider.name()).or_insert(0) += 1;
                        rows_by_symbol.insert(symbol, fetched);
                    }
                    Ok(_) => {
                        still_remaining.push(symbol);
                    }
                    Err(MarketDataProviderError::RateLimited) => {
                        self.failure_cache.record_failure(&symbol, FailureType::RateLimited);
                        still_remaining.push(symbol);
                    }
                    Err(MarketDataProviderError::NotFound) => {
                        still_remaining.push(symbol);
                    }
                    Err(MarketDataProviderError::Timeout) => {
                        warn!(symbol = %symbol, provider = ranked.provider.name(), "provider call timed out after retries");
                        self.failure_cache.record_failure(&symbol, FailureType::ApiError);
                        still_remaining.push(symbol);
                    }
                    Err(e) => {
                        warn!(symbol = %symbol, provider = ranked.provider.name(), error = %e, "provider call failed");
                        self.failure_cache.record_failure(&symbol, FailureType::ApiError);
                        still_remaining.push(symbol);
                    }
                }
            }
            remaining = still_remaining;
        }

        if !remaining.is_empty() {
            let preview: Vec<&String> = remaining.iter().take(20).collect();
            info!(
                count = remaining.len(),
                symbols = ?preview,
                "symbols unavailable from every provider in the chain"
            );
            for symbol in &remaining {
                self.failure_cache.record_failure(symbol, FailureType::NotFound);
            }
        }

        OhlcvFetchResult {
            rows_by_symbol,
            provider_counts,
            unavailable_symbols: remaining,
        }
    }
}
