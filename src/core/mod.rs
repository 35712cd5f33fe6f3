//! Core domain types and abstractions

pub mod cache;
pub mod config;
pub mod currency;
pub mod error;
pub mod finance;
pub mod log;
pub mod session;

// Re-export main types for cleaner imports
pub use currency::{CurrencyCode, ExchangeRateProvider, ExchangeRates, normalize_currency};
pub use error::{ApiError, ErrorDetails, FieldErrors};
pub use session::{Role, Session, User};
