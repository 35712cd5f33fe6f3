//! Currency codes and exchange-rate abstractions

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    Try,
    Usd,
    Eur,
    Gbp,
    Jpy,
    Inr,
    Rub,
    Cny,
    Chf,
    Cad,
    Aud,
}

impl CurrencyCode {
    pub const ALL: [CurrencyCode; 11] = [
        CurrencyCode::Try,
        CurrencyCode::Usd,
        CurrencyCode::Eur,
        CurrencyCode::Gbp,
        CurrencyCode::Jpy,
        CurrencyCode::Inr,
        CurrencyCode::Rub,
        CurrencyCode::Cny,
        CurrencyCode::Chf,
        CurrencyCode::Cad,
        CurrencyCode::Aud,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyCode::Try => "TRY",
            CurrencyCode::Usd => "USD",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Gbp => "GBP",
            CurrencyCode::Jpy => "JPY",
            CurrencyCode::Inr => "INR",
            CurrencyCode::Rub => "RUB",
            CurrencyCode::Cny => "CNY",
            CurrencyCode::Chf => "CHF",
            CurrencyCode::Cad => "CAD",
            CurrencyCode::Aud => "AUD",
        }
    }

    /// Display symbol. Codes without a distinct sign use their ISO code.
    pub fn symbol(&self) -> &'static str {
        match self {
            CurrencyCode::Try => "₺",
            CurrencyCode::Usd => "$",
            CurrencyCode::Eur => "€",
            CurrencyCode::Gbp => "£",
            CurrencyCode::Jpy => "¥",
            CurrencyCode::Inr => "₹",
            CurrencyCode::Rub => "₽",
            CurrencyCode::Cny => "CN¥",
            CurrencyCode::Chf => "CHF",
            CurrencyCode::Cad => "CA$",
            CurrencyCode::Aud => "A$",
        }
    }

    /// Number of fraction digits conventionally shown.
    pub fn minor_units(&self) -> u32 {
        match self {
            CurrencyCode::Jpy => 0,
            _ => 2,
        }
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        CurrencyCode::ALL
            .into_iter()
            .find(|code| code.as_str() == upper)
            .ok_or_else(|| anyhow::anyhow!("Unsupported currency: {}", s))
    }
}

/// Maps a currency symbol or ISO code to its canonical code.
///
/// Anything unrecognised resolves to USD so that formatting never fails.
pub fn normalize_currency(input: &str) -> CurrencyCode {
    let trimmed = input.trim();
    let by_symbol = match trimmed {
        "$" => Some(CurrencyCode::Usd),
        "€" => Some(CurrencyCode::Eur),
        "£" => Some(CurrencyCode::Gbp),
        "¥" => Some(CurrencyCode::Jpy),
        "₺" => Some(CurrencyCode::Try),
        "₹" => Some(CurrencyCode::Inr),
        "₽" => Some(CurrencyCode::Rub),
        "元" => Some(CurrencyCode::Cny),
        _ => None,
    };
    by_symbol
        .or_else(|| trimmed.parse().ok())
        .unwrap_or(CurrencyCode::Usd)
}

/// The last fetched USD pair for a single foreign currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRates {
    pub foreign: CurrencyCode,
    pub foreign_to_usd: f64,
    pub usd_to_foreign: f64,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    async fn fetch_rates(&self) -> Result<ExchangeRates>;
}
