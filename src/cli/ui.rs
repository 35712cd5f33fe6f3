use crate::core::error::FieldErrors;
use crate::core::finance::Trend;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// A right aligned money cell, red for outgoing amounts.
pub fn amount_cell(formatted: String, amount: f64) -> Cell {
    let cell = Cell::new(formatted).set_alignment(CellAlignment::Right);
    if amount < 0.0 {
        cell.fg(Color::Red)
    } else {
        cell
    }
}

/// Percentage change colored by its trend.
pub fn change_cell(percentage: f64, trend: Trend) -> Cell {
    let (arrow, color) = match trend {
        Trend::Up => ("▲", Color::Green),
        Trend::Down => ("▼", Color::Red),
        Trend::Stable => ("■", Color::DarkGrey),
    };
    Cell::new(format!("{arrow} {percentage:.1}%"))
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

pub fn subtle_cell(text: &str) -> Cell {
    Cell::new(text).fg(Color::DarkGrey)
}

/// Creates a spinner shown while requests are in flight.
pub fn new_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Prints a separator line matching the terminal width.
pub fn print_separator() {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    println!("\n{}", "─".repeat(term_width));
}

pub fn render_field_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .flat_map(|(field, messages)| {
            let label = style_text(&format!("{field}:"), StyleType::TotalLabel);
            messages.iter().map(move |m| format!("  {label} {m}"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_field_errors() {
        console::set_colors_enabled(false);
        let mut errors = FieldErrors::new();
        errors.insert(
            "password".to_string(),
            vec!["Too short".to_string(), "Needs a number".to_string()],
        );
        errors.insert("email".to_string(), vec!["Invalid".to_string()]);

        assert_eq!(
            render_field_errors(&errors),
            "  email: Invalid\n  password: Too short\n  password: Needs a number"
        );
    }
}
