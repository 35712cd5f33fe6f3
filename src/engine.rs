use crate::core::currency::{CurrencyCode, ExchangeRates, normalize_currency};
use crate::format::{FormatOptions, fallback_money, format_money};
use crate::preference::CurrencyPreference;
use std::sync::Arc;
use tracing::debug;

/// Presents amounts in the user's display currency.
///
/// Conversion pivots through USD: only USD to the snapshot's foreign currency
/// and back are converted. Every other pair, or a missing snapshot, leaves
/// the amount as it is. Nothing here fails.
pub struct CurrencyEngine {
    preference: Arc<CurrencyPreference>,
    rates: Option<ExchangeRates>,
    locale: String,
}

impl CurrencyEngine {
    pub fn new(
        preference: Arc<CurrencyPreference>,
        rates: Option<ExchangeRates>,
        locale: impl Into<String>,
    ) -> Self {
        Self {
            preference,
            rates,
            locale: locale.into(),
        }
    }

    pub fn display_currency(&self) -> CurrencyCode {
        self.preference.get()
    }

    pub fn rates(&self) -> Option<&ExchangeRates> {
        self.rates.as_ref()
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn normalize_currency(&self, input: &str) -> CurrencyCode {
        normalize_currency(input)
    }

    pub fn convert(&self, amount: f64, from: &str) -> f64 {
        let from = normalize_currency(from);
        let to = self.display_currency();
        if from == to {
            return amount;
        }
        let Some(rates) = &self.rates else {
            debug!("No exchange rates, showing {} {} unconverted", amount, from);
            return amount;
        };

        if from == CurrencyCode::Usd && to == rates.foreign {
            amount * rates.usd_to_foreign
        } else if from == rates.foreign && to == CurrencyCode::Usd {
            amount * rates.foreign_to_usd
        } else {
            debug!("No USD leg between {} and {}, leaving amount as is", from, to);
            amount
        }
    }

    pub fn convert_and_format(&self, amount: f64, from: &str, options: &FormatOptions) -> String {
        let converted = self.convert(amount, from);
        let to = self.display_currency();
        let symbol = options.symbol.as_deref().unwrap_or(to.symbol());
        format_money(converted, symbol, options.precision, &options.locale)
            .unwrap_or_else(|| fallback_money(converted, to))
    }

    /// Formats without converting, in `code` or the display currency.
    pub fn format_only(&self, amount: f64, code: Option<CurrencyCode>) -> String {
        let code = code.unwrap_or_else(|| self.display_currency());
        let options = FormatOptions::for_locale(&self.locale);
        format_money(amount, code.symbol(), options.precision, &options.locale)
            .unwrap_or_else(|| fallback_money(amount, code))
    }
}
