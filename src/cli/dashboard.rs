use super::{require_session, ui};
use crate::AppContext;
use crate::api::finance;
use crate::engine::CurrencyEngine;
use crate::core::finance::{
    CardType, FinancialSummary, MetricWithChange, RecentTransactions, ScheduledTransfers,
    TransactionStatus, TransferStatus, Wallet, WorkingCapital,
};
use crate::format::{FormatOptions, format_date, format_date_time};
use anyhow::Result;
use comfy_table::{Cell, Color};

const DASHBOARD_TRANSACTIONS: u32 = 3;

fn money(engine: &CurrencyEngine, amount: f64, currency: &str) -> Cell {
    let options = FormatOptions::for_locale(engine.locale());
    ui::amount_cell(
        engine.convert_and_format(amount, currency, &options),
        amount,
    )
}

fn metric_row(label: &str, metric: &MetricWithChange, engine: &CurrencyEngine) -> Vec<Cell> {
    vec![
        Cell::new(label),
        money(engine, metric.amount, &metric.currency),
        ui::change_cell(metric.change.percentage, metric.change.trend),
    ]
}

pub fn render_summary(summary: &FinancialSummary, engine: &CurrencyEngine) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Metric"),
        ui::header_cell(&format!("Amount ({})", engine.display_currency())),
        ui::header_cell("Change"),
    ]);
    table.add_row(metric_row("Total balance", &summary.total_balance, engine));
    table.add_row(metric_row("Total spending", &summary.total_expense, engine));
    table.add_row(metric_row("Total saved", &summary.total_savings, engine));

    format!(
        "{}\n\n{}\n{}",
        ui::style_text("Dashboard", ui::StyleType::Title),
        table,
        ui::style_text(
            &format!(
                "Last updated {}",
                format_date_time(&summary.last_updated, engine.locale())
            ),
            ui::StyleType::Subtle
        )
    )
}

fn transaction_status_cell(status: TransactionStatus) -> Cell {
    match status {
        TransactionStatus::Completed => Cell::new("completed").fg(Color::Green),
        TransactionStatus::Pending => Cell::new("pending").fg(Color::Yellow),
        TransactionStatus::Failed => Cell::new("failed").fg(Color::Red),
    }
}

pub fn render_transactions(recent: &RecentTransactions, engine: &CurrencyEngine) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Name/Business"),
        ui::header_cell("Type"),
        ui::header_cell("Amount"),
        ui::header_cell("Date"),
        ui::header_cell("Status"),
    ]);
    for transaction in &recent.transactions {
        table.add_row(vec![
            Cell::new(format!("{}\n{}", transaction.name, transaction.business)),
            ui::subtle_cell(&transaction.kind),
            money(engine, transaction.amount, &transaction.currency),
            Cell::new(format_date(&transaction.date, engine.locale())),
            transaction_status_cell(transaction.status),
        ]);
    }

    let summary = &recent.summary;
    format!(
        "{}\n\n{}\n{} transactions, income {}, expense {}",
        ui::style_text("Recent Transactions", ui::StyleType::Title),
        table,
        summary.count,
        engine.format_only(summary.total_income, None),
        engine.format_only(summary.total_expense, None),
    )
}

fn transfer_status_cell(status: TransferStatus) -> Cell {
    match status {
        TransferStatus::Scheduled => Cell::new("scheduled").fg(Color::Cyan),
        TransferStatus::Processing => Cell::new("processing").fg(Color::Yellow),
        TransferStatus::Completed => Cell::new("completed").fg(Color::Green),
        TransferStatus::Cancelled => Cell::new("cancelled").fg(Color::DarkGrey),
    }
}

pub fn render_transfers(scheduled: &ScheduledTransfers, engine: &CurrencyEngine) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Recipient"),
        ui::header_cell("Date"),
        ui::header_cell("Amount"),
        ui::header_cell("Status"),
    ]);
    for transfer in &scheduled.transfers {
        table.add_row(vec![
            Cell::new(&transfer.name),
            Cell::new(format_date_time(&transfer.date, engine.locale())),
            money(engine, transfer.amount, &transfer.currency),
            transfer_status_cell(transfer.status),
        ]);
    }

    format!(
        "{}\n\n{}\n\n{}: {}",
        ui::style_text("Scheduled Transfers", ui::StyleType::Title),
        table,
        ui::style_text(
            &format!("Total scheduled ({})", scheduled.summary.count),
            ui::StyleType::TotalLabel
        ),
        ui::style_text(
            &engine.format_only(scheduled.summary.total_scheduled_amount, None),
            ui::StyleType::TotalValue
        ),
    )
}

fn masked_card_number(number: &str) -> String {
    let digits: Vec<char> = number.chars().filter(char::is_ascii_digit).collect();
    let last_four: String = digits[digits.len().saturating_sub(4)..].iter().collect();
    format!("•••• •••• •••• {last_four}")
}

pub fn render_wallet(wallet: &Wallet) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Card"),
        ui::header_cell("Bank"),
        ui::header_cell("Number"),
        ui::header_cell("Expires"),
        ui::header_cell("Type"),
    ]);
    for card in &wallet.cards {
        let name = if card.is_default {
            format!("{} (default)", card.name)
        } else {
            card.name.clone()
        };
        let kind = match card.card_type {
            CardType::Credit => "credit",
            CardType::Debit => "debit",
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{} | {}", card.bank, card.network)),
            Cell::new(masked_card_number(&card.card_number)),
            Cell::new(format!(
                "{:02}/{:02}",
                card.expiry_month,
                card.expiry_year % 100
            )),
            ui::subtle_cell(kind),
        ]);
    }
    format!(
        "{}\n\n{}",
        ui::style_text("Wallet", ui::StyleType::Title),
        table
    )
}

pub fn render_capital(capital: &WorkingCapital, engine: &CurrencyEngine) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Month"),
        ui::header_cell("Income"),
        ui::header_cell("Expense"),
        ui::header_cell("Net"),
    ]);
    for month in &capital.data {
        table.add_row(vec![
            Cell::new(&month.month),
            money(engine, month.income, &capital.currency),
            money(engine, -month.expense.abs(), &capital.currency),
            money(engine, month.net, &capital.currency),
        ]);
    }

    let summary = &capital.summary;
    let options = FormatOptions::for_locale(engine.locale());
    let net = engine.convert_and_format(summary.net_balance, &capital.currency, &options);
    let net_style = if summary.net_balance < 0.0 {
        ui::StyleType::Error
    } else {
        ui::StyleType::TotalValue
    };
    format!(
        "{} ({})\n\n{}\n\n{}: {}",
        ui::style_text("Working Capital", ui::StyleType::Title),
        capital.period,
        table,
        ui::style_text("Net balance", ui::StyleType::TotalLabel),
        ui::style_text(&net, net_style),
    )
}

/// The dashboard home screen. All requests go out together.
pub async fn summary(context: &AppContext) -> Result<()> {
    require_session(context).await?;

    let spinner = ui::new_spinner("Loading dashboard...");
    let (summary, transactions, transfers, engine) = futures::join!(
        finance::financial_summary(&context.client),
        finance::recent_transactions(&context.client, Some(DASHBOARD_TRANSACTIONS)),
        finance::scheduled_transfers(&context.client),
        context.currency_engine(),
    );
    spinner.finish_and_clear();

    println!("{}", render_summary(&summary?.data, &engine));
    // The list panels are optional, their failures were already reported
    if let Ok(transactions) = transactions {
        ui::print_separator();
        println!("{}", render_transactions(&transactions.data, &engine));
    }
    if let Ok(transfers) = transfers {
        ui::print_separator();
        println!("{}", render_transfers(&transfers.data, &engine));
    }
    Ok(())
}

pub async fn wallet(context: &AppContext) -> Result<()> {
    require_session(context).await?;
    let spinner = ui::new_spinner("Loading wallet...");
    let wallet = finance::wallet(&context.client).await;
    spinner.finish_and_clear();

    println!("{}", render_wallet(&wallet?.data));
    Ok(())
}

pub async fn transactions(context: &AppContext, limit: Option<u32>) -> Result<()> {
    require_session(context).await?;
    let spinner = ui::new_spinner("Loading transactions...");
    let (recent, engine) = futures::join!(
        finance::recent_transactions(&context.client, limit),
        context.currency_engine(),
    );
    spinner.finish_and_clear();

    println!("{}", render_transactions(&recent?.data, &engine));
    Ok(())
}

pub async fn transfers(context: &AppContext) -> Result<()> {
    require_session(context).await?;
    let spinner = ui::new_spinner("Loading transfers...");
    let (scheduled, engine) = futures::join!(
        finance::scheduled_transfers(&context.client),
        context.currency_engine(),
    );
    spinner.finish_and_clear();

    println!("{}", render_transfers(&scheduled?.data, &engine));
    Ok(())
}

pub async fn capital(context: &AppContext, period: Option<&str>) -> Result<()> {
    require_session(context).await?;
    let spinner = ui::new_spinner("Loading working capital...");
    let (capital, engine) = futures::join!(
        finance::working_capital(&context.client, period),
        context.currency_engine(),
    );
    spinner.finish_and_clear();

    println!("{}", render_capital(&capital?.data, &engine));
    Ok(())
}
