//! Payloads returned by the dashboard API.

use crate::core::session::User;
use serde::{Deserialize, Serialize};

/// The envelope every successful response is wrapped in.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: T,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub data: AuthData,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChangeMetric {
    pub percentage: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricWithChange {
    pub amount: f64,
    pub currency: String,
    pub change: ChangeMetric,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub total_balance: MetricWithChange,
    pub total_expense: MetricWithChange,
    pub total_savings: MetricWithChange,
    pub last_updated: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonthlyData {
    pub month: String,
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalSummary {
    pub total_income: f64,
    pub total_expense: f64,
    pub net_balance: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkingCapital {
    pub period: String,
    pub currency: String,
    pub data: Vec<MonthlyData>,
    pub summary: CapitalSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Credit,
    Debit,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
    pub card_number: String,
    pub bank: String,
    pub network: String,
    pub expiry_month: u32,
    pub expiry_year: u32,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Wallet {
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
    Pending,
    Failed,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Transaction {
    pub id: String,
    pub name: String,
    pub business: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
    pub currency: String,
    pub date: String,
    pub status: TransactionStatus,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub total_income: f64,
    pub total_expense: f64,
    pub count: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecentTransactions {
    pub transactions: Vec<Transaction>,
    pub summary: TransactionSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Scheduled,
    Processing,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduledTransfer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub date: String,
    pub amount: f64,
    pub currency: String,
    pub status: TransferStatus,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferSummary {
    pub total_scheduled_amount: f64,
    pub count: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduledTransfers {
    pub transfers: Vec<ScheduledTransfer>,
    pub summary: TransferSummary,
}
