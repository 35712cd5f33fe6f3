use super::ui;
use crate::AppContext;
use crate::core::currency::{CurrencyCode, ExchangeRates, normalize_currency};
use crate::engine::CurrencyEngine;
use crate::format::{FormatOptions, format_date_time};
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};

pub fn render_currencies(current: CurrencyCode) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Symbol"),
        ui::header_cell(""),
    ]);
    for code in CurrencyCode::ALL {
        let marker = if code == current { "current" } else { "" };
        table.add_row(vec![
            Cell::new(code.as_str()),
            Cell::new(code.symbol()),
            ui::subtle_cell(marker),
        ]);
    }
    format!(
        "Display currency: {}\n\n{}",
        ui::style_text(current.as_str(), ui::StyleType::TotalValue),
        table
    )
}

/// Shows the display currency, or changes it when a code is given.
pub async fn currency(context: &AppContext, code: Option<CurrencyCode>) -> Result<()> {
    match code {
        Some(code) => {
            context.preference.set(code).await;
            println!(
                "Display currency set to {} ({})",
                ui::style_text(code.as_str(), ui::StyleType::TotalValue),
                code.symbol()
            );
        }
        None => println!("{}", render_currencies(context.preference.get())),
    }
    Ok(())
}

pub fn describe_conversion(engine: &CurrencyEngine, amount: f64, from: &str) -> String {
    let source = normalize_currency(from);
    let target = engine.display_currency();
    let options = FormatOptions::for_locale(engine.locale());
    let original = engine.format_only(amount, Some(source));
    let converted = engine.convert_and_format(amount, from, &options);

    let mut lines = vec![format!(
        "{} = {}",
        original,
        ui::style_text(&converted, ui::StyleType::TotalValue)
    )];
    if source != target && engine.convert(amount, from) == amount && amount != 0.0 {
        lines.push(ui::style_text(
            &format!("No rate between {source} and {target}, the amount was not converted."),
            ui::StyleType::Subtle,
        ));
    }
    lines.join("\n")
}

pub async fn convert(context: &AppContext, amount: f64, from: &str) -> Result<()> {
    let engine = context.currency_engine().await;
    println!("{}", describe_conversion(&engine, amount, from));
    Ok(())
}

pub fn render_rates(rates: &ExchangeRates, locale: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Pair"), ui::header_cell("Rate")]);
    table.add_row(vec![
        Cell::new(format!("USD → {}", rates.foreign)),
        Cell::new(format!("{:.4}", rates.usd_to_foreign)).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new(format!("{} → USD", rates.foreign)),
        Cell::new(format!("{:.4}", rates.foreign_to_usd)).set_alignment(CellAlignment::Right),
    ]);
    format!(
        "{}\n\n{}\n{}",
        ui::style_text("Exchange Rates", ui::StyleType::Title),
        table,
        ui::style_text(
            &format!(
                "Updated {}",
                format_date_time(&rates.updated_at.to_rfc3339(), locale)
            ),
            ui::StyleType::Subtle
        )
    )
}

pub async fn rates(context: &AppContext) -> Result<()> {
    let spinner = ui::new_spinner("Fetching exchange rates...");
    let rates = context.rates.get().await;
    spinner.finish_and_clear();

    match rates {
        Some(rates) => println!("{}", render_rates(&rates, &context.config.locale)),
        None => println!(
            "{}",
            ui::style_text(
                "Exchange rates are unavailable, amounts are shown unconverted.",
                ui::StyleType::Error
            )
        ),
    }
    Ok(())
}
