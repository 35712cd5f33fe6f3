//! Locale-aware money and date formatting.
//!
//! Every function here is total: bad input degrades to a readable fallback
//! instead of an error.

use crate::core::currency::{CurrencyCode, normalize_currency};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

/// The locales with dedicated formatting rules. Anything else is formatted
/// as US English.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    En,
    Tr,
    De,
}

impl Locale {
    /// Resolves a BCP 47 style tag (`tr`, `tr-TR`, `de_DE`) by its language.
    pub fn from_tag(tag: &str) -> Self {
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "tr" => Locale::Tr,
            "de" => Locale::De,
            _ => Locale::En,
        }
    }

    fn group_separator(self) -> char {
        match self {
            Locale::En => ',',
            Locale::Tr | Locale::De => '.',
        }
    }

    fn decimal_separator(self) -> char {
        match self {
            Locale::En => '.',
            Locale::Tr | Locale::De => ',',
        }
    }

    fn symbol_after_amount(self) -> bool {
        matches!(self, Locale::De)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    pub locale: String,
    /// Overrides the display currency's symbol.
    pub symbol: Option<String>,
    pub precision: u32,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            locale: "en-US".to_string(),
            symbol: None,
            precision: 2,
        }
    }
}

impl FormatOptions {
    pub fn for_locale(locale: &str) -> Self {
        FormatOptions {
            locale: locale.to_string(),
            ..Self::default()
        }
    }
}

/// Formats `value` as an amount of `currency`, which may be an ISO code or
/// a symbol. Unknown currencies are formatted as USD.
pub fn format_currency(value: f64, currency: &str, locale: &str) -> String {
    let code = normalize_currency(currency);
    format_money(value, code.symbol(), code.minor_units(), locale)
        .unwrap_or_else(|| fallback_money(value, code))
}

/// Formats an amount with an explicit symbol and precision.
///
/// Returns `None` when the value cannot be represented as a decimal with
/// `precision` fraction digits (NaN, infinities and very large magnitudes).
pub fn format_money(value: f64, symbol: &str, precision: u32, locale: &str) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    let locale = Locale::from_tag(locale);
    // f64 display gives the shortest round-tripping form, so 1.005 stays 1.005
    let mut rounded = value
        .to_string()
        .parse::<Decimal>()
        .ok()?
        .round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(precision);
    // rescale keeps fewer digits when the 96-bit mantissa has no room left
    if rounded.scale() != precision {
        return None;
    }

    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().to_string();
    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut number = group_digits(integer, locale.group_separator());
    if let Some(fraction) = fraction {
        number.push(locale.decimal_separator());
        number.push_str(fraction);
    }

    let sign = if negative { "-" } else { "" };
    Some(if locale.symbol_after_amount() {
        format!("{sign}{number} {symbol}")
    } else {
        format!("{sign}{symbol}{number}")
    })
}

pub(crate) fn fallback_money(value: f64, code: CurrencyCode) -> String {
    warn!(
        "Cannot format {} as {}, falling back to plain output",
        value, code
    );
    format!("{code} {value}")
}

fn group_digits(integer: &str, separator: char) -> String {
    let len = integer.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(digit);
    }
    grouped
}

const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
const EN_MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const TR_MONTHS: [&str; 12] = [
    "Ocak", "Şubat", "Mart", "Nisan", "Mayıs", "Haziran", "Temmuz", "Ağustos", "Eylül", "Ekim",
    "Kasım", "Aralık",
];
const TR_MONTHS_SHORT: [&str; 12] = [
    "Oca", "Şub", "Mar", "Nis", "May", "Haz", "Tem", "Ağu", "Eyl", "Eki", "Kas", "Ara",
];
const DE_MONTHS: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];
const DE_MONTHS_SHORT: [&str; 12] = [
    "Jan.", "Feb.", "März", "Apr.", "Mai", "Juni", "Juli", "Aug.", "Sept.", "Okt.", "Nov.",
    "Dez.",
];

// Monday first, matching `Weekday::num_days_from_monday`
const EN_WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];
const TR_WEEKDAYS: [&str; 7] = [
    "Pazartesi",
    "Salı",
    "Çarşamba",
    "Perşembe",
    "Cuma",
    "Cumartesi",
    "Pazar",
];
const DE_WEEKDAYS: [&str; 7] = [
    "Montag",
    "Dienstag",
    "Mittwoch",
    "Donnerstag",
    "Freitag",
    "Samstag",
    "Sonntag",
];

fn month_name(locale: Locale, date: &DateTime<Utc>) -> &'static str {
    let index = date.month0() as usize;
    match locale {
        Locale::En => EN_MONTHS[index],
        Locale::Tr => TR_MONTHS[index],
        Locale::De => DE_MONTHS[index],
    }
}

fn short_month_name(locale: Locale, date: &DateTime<Utc>) -> &'static str {
    let index = date.month0() as usize;
    match locale {
        Locale::En => EN_MONTHS_SHORT[index],
        Locale::Tr => TR_MONTHS_SHORT[index],
        Locale::De => DE_MONTHS_SHORT[index],
    }
}

fn weekday_name(locale: Locale, date: &DateTime<Utc>) -> &'static str {
    let index = date.weekday().num_days_from_monday() as usize;
    match locale {
        Locale::En => EN_WEEKDAYS[index],
        Locale::Tr => TR_WEEKDAYS[index],
        Locale::De => DE_WEEKDAYS[index],
    }
}

/// Parses RFC 3339 timestamps, `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` (read as
/// UTC) and unix timestamps in milliseconds.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(date.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|d| d.and_utc());
    }
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        return value
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis);
    }
    None
}

fn with_parsed_date(value: &str, render: impl FnOnce(&DateTime<Utc>) -> String) -> String {
    match parse_date(value) {
        Some(date) => render(&date),
        None => value.to_string(),
    }
}

/// `Jan 15, 2024` / `15 Oca 2024` / `15. Jan. 2024`
pub fn format_date(value: &str, locale: &str) -> String {
    let locale = Locale::from_tag(locale);
    with_parsed_date(value, |date| {
        let month = short_month_name(locale, date);
        match locale {
            Locale::En => format!("{month} {:02}, {}", date.day(), date.year()),
            Locale::Tr => format!("{:02} {month} {}", date.day(), date.year()),
            Locale::De => format!("{:02}. {month} {}", date.day(), date.year()),
        }
    })
}

/// Month and day only.
pub fn format_date_short(value: &str, locale: &str) -> String {
    let locale = Locale::from_tag(locale);
    with_parsed_date(value, |date| {
        let month = short_month_name(locale, date);
        match locale {
            Locale::En => format!("{month} {:02}", date.day()),
            Locale::Tr => format!("{:02} {month}", date.day()),
            Locale::De => format!("{:02}. {month}", date.day()),
        }
    })
}

/// Full date with the weekday spelled out.
pub fn format_date_long(value: &str, locale: &str) -> String {
    let locale = Locale::from_tag(locale);
    with_parsed_date(value, |date| {
        let month = month_name(locale, date);
        let weekday = weekday_name(locale, date);
        match locale {
            Locale::En => format!("{weekday}, {month} {}, {}", date.day(), date.year()),
            Locale::Tr => format!("{} {month} {} {weekday}", date.day(), date.year()),
            Locale::De => format!("{weekday}, {}. {month} {}", date.day(), date.year()),
        }
    })
}

pub fn format_date_time(value: &str, locale: &str) -> String {
    let tag = locale;
    let locale = Locale::from_tag(tag);
    with_parsed_date(value, |date| {
        let day = format_date(&date.to_rfc3339(), tag);
        match locale {
            Locale::En => {
                let (pm, hour) = date.hour12();
                let meridiem = if pm { "PM" } else { "AM" };
                format!("{day}, {hour:02}:{:02} {meridiem}", date.minute())
            }
            Locale::Tr => format!("{day} {:02}:{:02}", date.hour(), date.minute()),
            Locale::De => format!("{day}, {:02}:{:02}", date.hour(), date.minute()),
        }
    })
}

/// Describes how long ago `value` was, relative to now.
pub fn format_relative_date(value: &str, locale: &str) -> String {
    format_relative_date_at(value, locale, Utc::now())
}

/// Describes how long before `now` the date in `value` was, in whole days,
/// weeks (under 30 days), months of 30 days and years of 365 days.
pub fn format_relative_date_at(value: &str, locale: &str, now: DateTime<Utc>) -> String {
    let locale = Locale::from_tag(locale);
    with_parsed_date(value, |date| {
        let days = (now - *date).num_milliseconds().div_euclid(86_400_000);
        let (amount, unit) = if days < 7 {
            (days, RelativeUnit::Day)
        } else if days < 30 {
            (days / 7, RelativeUnit::Week)
        } else if days < 365 {
            (days / 30, RelativeUnit::Month)
        } else {
            (days / 365, RelativeUnit::Year)
        };
        relative_phrase(locale, amount, unit)
    })
}

#[derive(Clone, Copy)]
enum RelativeUnit {
    Day,
    Week,
    Month,
    Year,
}

/// `ago` counts backwards from now; negative values lie in the future.
fn relative_phrase(locale: Locale, ago: i64, unit: RelativeUnit) -> String {
    let count = ago.abs();
    match locale {
        Locale::En => {
            let name = match unit {
                RelativeUnit::Day => "day",
                RelativeUnit::Week => "week",
                RelativeUnit::Month => "month",
                RelativeUnit::Year => "year",
            };
            match (ago, unit) {
                (0, _) => "today".to_string(),
                (1, RelativeUnit::Day) => "yesterday".to_string(),
                (-1, RelativeUnit::Day) => "tomorrow".to_string(),
                (1, _) => format!("last {name}"),
                (-1, _) => format!("next {name}"),
                (a, _) if a > 0 => format!("{count} {name}s ago"),
                _ => format!("in {count} {name}s"),
            }
        }
        Locale::Tr => {
            let name = match unit {
                RelativeUnit::Day => "gün",
                RelativeUnit::Week => "hafta",
                RelativeUnit::Month => "ay",
                RelativeUnit::Year => "yıl",
            };
            match (ago, unit) {
                (0, _) => "bugün".to_string(),
                (1, RelativeUnit::Day) => "dün".to_string(),
                (-1, RelativeUnit::Day) => "yarın".to_string(),
                (1, _) => format!("geçen {name}"),
                (-1, _) => format!("gelecek {name}"),
                (a, _) if a > 0 => format!("{count} {name} önce"),
                _ => format!("{count} {name} sonra"),
            }
        }
        Locale::De => {
            // Dative plural, as in "vor 3 Tagen" and "in 3 Tagen"
            let (plural, last, next) = match unit {
                RelativeUnit::Day => ("Tagen", "", ""),
                RelativeUnit::Week => ("Wochen", "letzte Woche", "nächste Woche"),
                RelativeUnit::Month => ("Monaten", "letzten Monat", "nächsten Monat"),
                RelativeUnit::Year => ("Jahren", "letztes Jahr", "nächstes Jahr"),
            };
            match (ago, unit) {
                (0, _) => "heute".to_string(),
                (1, RelativeUnit::Day) => "gestern".to_string(),
                (-1, RelativeUnit::Day) => "morgen".to_string(),
                (1, _) => last.to_string(),
                (-1, _) => next.to_string(),
                (a, _) if a > 0 => format!("vor {count} {plural}"),
                _ => format!("in {count} {plural}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_format_usd() {
        assert_eq!(format_currency(1234.56, "USD", "en-US"), "$1,234.56");
        assert_eq!(format_currency(1_000_000.0, "USD", "en-US"), "$1,000,000.00");
        assert_eq!(format_currency(999.0, "$", "en"), "$999.00");
    }

    #[test]
    fn test_format_zero_and_negative() {
        assert_eq!(format_currency(0.0, "USD", "en-US"), "$0.00");
        assert_eq!(format_currency(-1234.56, "USD", "en-US"), "-$1,234.56");
        // Rounds to zero, so no sign
        assert_eq!(format_currency(-0.001, "USD", "en-US"), "$0.00");
    }

    #[test]
    fn test_format_try_in_turkish() {
        assert_eq!(format_currency(1234.56, "TRY", "tr-TR"), "₺1.234,56");
        assert_eq!(format_currency(100.0, "₺", "tr-TR"), "₺100,00");
    }

    #[test]
    fn test_format_other_locales_and_currencies() {
        assert_eq!(format_currency(1234.56, "EUR", "en-US"), "€1,234.56");
        assert_eq!(format_currency(1234.56, "EUR", "de-DE"), "1.234,56 €");
        assert_eq!(format_currency(1234.56, "JPY", "en-US"), "¥1,235");
        // Unknown locales fall back to US English
        assert_eq!(format_currency(1234.56, "USD", "xx-YY"), "$1,234.56");
    }

    #[test]
    fn test_unknown_currency_uses_usd_conventions() {
        assert_eq!(format_currency(100.0, "INVALID", "en-US"), "$100.00");
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        assert_eq!(format_currency(1.005, "USD", "en"), "$1.01");
        assert_eq!(format_currency(-2.675, "USD", "en"), "-$2.68");
        assert_eq!(format_currency(0.125, "USD", "en"), "$0.13");
    }

    #[test]
    fn test_non_finite_values_fall_back() {
        assert_eq!(format_currency(f64::NAN, "USD", "en"), "USD NaN");
        assert_eq!(format_currency(f64::INFINITY, "TRY", "tr"), "TRY inf");
        assert!(format_money(f64::NEG_INFINITY, "$", 2, "en").is_none());
    }

    #[test]
    fn test_huge_values_fall_back_instead_of_dropping_decimals() {
        assert!(format_money(1e28, "$", 2, "en").is_none());
        assert_eq!(
            format_currency(1e28, "USD", "en"),
            "USD 10000000000000000000000000000"
        );
        assert_eq!(
            format_money(1e20, "$", 2, "en").as_deref(),
            Some("$100,000,000,000,000,000,000.00")
        );
    }

    #[test]
    fn test_format_money_custom_precision() {
        assert_eq!(
            format_money(1234.5678, "$", 3, "en-US").as_deref(),
            Some("$1,234.568")
        );
        assert_eq!(format_money(42.4, "TL ", 0, "en").as_deref(), Some("TL 42"));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2024-01-15"), Some(expected));
        assert_eq!(parse_date("2024-01-15T00:00:00Z"), Some(expected));
        assert_eq!(parse_date("2024-01-15T00:00:00"), Some(expected));
        assert_eq!(
            parse_date(&expected.timestamp_millis().to_string()),
            Some(expected)
        );
        assert_eq!(parse_date("invalid date"), None);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-01-15", "en-US"), "Jan 15, 2024");
        assert_eq!(format_date("2024-01-15", "tr-TR"), "15 Oca 2024");
        assert_eq!(format_date_short("2024-01-15", "en-US"), "Jan 15");
        assert_eq!(
            format_date_long("2024-01-15", "en-US"),
            "Monday, January 15, 2024"
        );
        assert_eq!(
            format_date_long("2024-01-15", "tr"),
            "15 Ocak 2024 Pazartesi"
        );
        assert_eq!(
            format_date_time("2024-01-15T14:30:00", "en-US"),
            "Jan 15, 2024, 02:30 PM"
        );
        assert_eq!(
            format_date_time("2024-01-15T14:30:00", "tr-TR"),
            "15 Oca 2024 14:30"
        );
    }

    #[test]
    fn test_invalid_dates_are_returned_unchanged() {
        assert_eq!(format_date("invalid date", "en-US"), "invalid date");
        assert_eq!(format_date_short("invalid", "en-US"), "invalid");
        assert_eq!(format_date_long("invalid", "tr"), "invalid");
        assert_eq!(format_date_time("invalid", "en"), "invalid");
        assert_eq!(format_relative_date("invalid", "en"), "invalid");
    }

    #[test]
    fn test_relative_dates() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let ago = |d: i64| (now - Duration::days(d)).to_rfc3339();

        assert_eq!(format_relative_date_at(&ago(0), "en", now), "today");
        assert_eq!(format_relative_date_at(&ago(1), "en", now), "yesterday");
        assert_eq!(format_relative_date_at(&ago(3), "en", now), "3 days ago");
        assert_eq!(format_relative_date_at(&ago(14), "en", now), "2 weeks ago");
        assert_eq!(format_relative_date_at(&ago(7), "en", now), "last week");
        assert_eq!(format_relative_date_at(&ago(61), "en", now), "2 months ago");
        assert_eq!(format_relative_date_at(&ago(730), "en", now), "2 years ago");
        assert_eq!(format_relative_date_at(&ago(-1), "en", now), "tomorrow");
        assert_eq!(format_relative_date_at(&ago(3), "tr", now), "3 gün önce");
        assert_eq!(format_relative_date_at(&ago(1), "tr", now), "dün");
        assert_eq!(format_relative_date_at(&ago(0), "de-DE", now), "heute");
        assert_eq!(format_relative_date_at(&ago(1), "de-DE", now), "gestern");
        assert_eq!(format_relative_date_at(&ago(3), "de-DE", now), "vor 3 Tagen");
        assert_eq!(format_relative_date_at(&ago(7), "de-DE", now), "letzte Woche");
        assert_eq!(format_relative_date_at(&ago(61), "de-DE", now), "vor 2 Monaten");
        assert_eq!(format_relative_date_at(&ago(-3), "de-DE", now), "in 3 Tagen");
    }
}
