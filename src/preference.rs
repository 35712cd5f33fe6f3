use crate::core::cache::{KeyValueCollection, get_json, put_json};
use crate::core::currency::CurrencyCode;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

pub const CURRENCY_STORAGE_KEY: &str = "maglo-currency";

/// The display currency chosen by the user.
///
/// Reads are synchronous so that formatting never waits; changes are
/// written through to storage.
pub struct CurrencyPreference {
    current: RwLock<CurrencyCode>,
    storage: Arc<dyn KeyValueCollection>,
}

impl CurrencyPreference {
    pub async fn load(storage: Arc<dyn KeyValueCollection>, default: CurrencyCode) -> Self {
        let current = get_json::<CurrencyCode>(storage.as_ref(), CURRENCY_STORAGE_KEY)
            .await
            .unwrap_or(default);
        debug!(currency = %current, "Loaded display currency");
        Self {
            current: RwLock::new(current),
            storage,
        }
    }

    pub fn get(&self) -> CurrencyCode {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn set(&self, code: CurrencyCode) {
        {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            *current = code;
        }
        put_json(self.storage.as_ref(), CURRENCY_STORAGE_KEY, &code, None).await;
        info!(currency = %code, "Display currency changed");
    }
}
