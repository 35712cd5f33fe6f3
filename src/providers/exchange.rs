use crate::core::cache::{KeyValueCollection, get_json, put_json};
use crate::core::config::ExchangeConfig;
use crate::core::currency::{CurrencyCode, ExchangeRateProvider, ExchangeRates};
use crate::providers::util::with_retry;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

const RETRIES: usize = 1;
const RETRY_DELAY: Duration = Duration::from_millis(300);

/// Fetches the USD/TRY pair from doviz.dev.
pub struct DovizProvider {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct DovizResponse {
    #[serde(rename = "TRYUSD")]
    try_usd: f64,
    #[serde(rename = "USDTRY")]
    usd_try: f64,
    #[serde(rename = "_meta")]
    meta: DovizMeta,
}

#[derive(Debug, Deserialize)]
struct DovizMeta {
    updated_at: DateTime<Utc>,
}

impl DovizProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("maglo/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build exchange rate client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ExchangeConfig) -> Result<Self> {
        Self::new(&config.base_url, config.timeout())
    }
}

#[async_trait]
impl ExchangeRateProvider for DovizProvider {
    #[instrument(name = "DovizRateFetch", skip(self))]
    async fn fetch_rates(&self) -> Result<ExchangeRates> {
        let url = format!("{}/v1/usd.json", self.base_url);
        debug!("Requesting exchange rates from {}", url);

        let response = with_retry(
            || async { self.client.get(&url).send().await?.error_for_status() },
            RETRIES,
            RETRY_DELAY,
        )
        .await
        .with_context(|| format!("Failed to fetch exchange rates from {url}"))?;

        let data: DovizResponse = response
            .json()
            .await
            .context("Failed to parse exchange rate response")?;

        Ok(ExchangeRates {
            foreign: CurrencyCode::Try,
            foreign_to_usd: data.try_usd,
            usd_to_foreign: data.usd_try,
            updated_at: data.meta.updated_at,
        })
    }
}

pub const RATES_KEY: &str = "usd-rates";
/// Snapshots younger than this are served without asking the provider.
pub const STALE_AFTER: TimeDelta = TimeDelta::hours(1);
/// Snapshots are kept this long as a fallback for failed refreshes.
pub const RETAIN_FOR: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedRates {
    rates: ExchangeRates,
    fetched_at: DateTime<Utc>,
}

/// Read-through cache in front of an [`ExchangeRateProvider`].
///
/// Concurrent readers that find the snapshot stale wait for a single refresh
/// instead of each hitting the provider.
pub struct RateCache {
    provider: Arc<dyn ExchangeRateProvider>,
    storage: Arc<dyn KeyValueCollection>,
    refresh: Mutex<()>,
    stale_after: TimeDelta,
    retain_for: Duration,
}

impl RateCache {
    pub fn new(
        provider: Arc<dyn ExchangeRateProvider>,
        storage: Arc<dyn KeyValueCollection>,
    ) -> Self {
        Self::with_windows(provider, storage, STALE_AFTER, RETAIN_FOR)
    }

    pub fn with_windows(
        provider: Arc<dyn ExchangeRateProvider>,
        storage: Arc<dyn KeyValueCollection>,
        stale_after: TimeDelta,
        retain_for: Duration,
    ) -> Self {
        Self {
            provider,
            storage,
            refresh: Mutex::new(()),
            stale_after,
            retain_for,
        }
    }

    /// The current snapshot, refreshed when stale. `None` only when the
    /// provider fails and nothing is retained.
    pub async fn get(&self) -> Option<ExchangeRates> {
        if let Some(cached) = self.fresh().await {
            return Some(cached.rates);
        }

        let _guard = self.refresh.lock().await;
        // Whoever held the lock before us may have refreshed already
        let retained: Option<CachedRates> = get_json(self.storage.as_ref(), RATES_KEY).await;
        if let Some(cached) = retained.as_ref().filter(|c| self.is_fresh(c)) {
            debug!("Exchange rates refreshed by a concurrent reader");
            return Some(cached.rates.clone());
        }

        match self.provider.fetch_rates().await {
            Ok(rates) => {
                let cached = CachedRates {
                    rates: rates.clone(),
                    fetched_at: Utc::now(),
                };
                put_json(
                    self.storage.as_ref(),
                    RATES_KEY,
                    &cached,
                    Some(self.retain_for),
                )
                .await;
                Some(rates)
            }
            Err(e) => {
                warn!(error = ?e, "Exchange rate refresh failed");
                retained.map(|c| c.rates)
            }
        }
    }

    async fn fresh(&self) -> Option<CachedRates> {
        let cached: CachedRates = get_json(self.storage.as_ref(), RATES_KEY).await?;
        if self.is_fresh(&cached) {
            debug!("Exchange rate cache HIT");
            Some(cached)
        } else {
            debug!("Exchange rate cache STALE");
            None
        }
    }

    fn is_fresh(&self, cached: &CachedRates) -> bool {
        Utc::now().signed_duration_since(cached.fetched_at) < self.stale_after
    }
}
