use super::endpoints;
use crate::core::error::ApiError;
use crate::core::finance::{
    ApiResponse, FinancialSummary, RecentTransactions, ScheduledTransfers, Wallet, WorkingCapital,
};
use crate::http::ApiClient;

pub async fn financial_summary(
    client: &ApiClient,
) -> Result<ApiResponse<FinancialSummary>, ApiError> {
    client.get(endpoints::SUMMARY).await
}

/// Monthly income and expenses. The server picks the period when none is given.
pub async fn working_capital(
    client: &ApiClient,
    period: Option<&str>,
) -> Result<ApiResponse<WorkingCapital>, ApiError> {
    let query: Vec<(&str, String)> = period
        .map(|p| vec![("period", p.to_string())])
        .unwrap_or_default();
    client
        .get_with_query(endpoints::WORKING_CAPITAL, &query)
        .await
}

pub async fn wallet(client: &ApiClient) -> Result<ApiResponse<Wallet>, ApiError> {
    client.get(endpoints::WALLET).await
}

pub async fn recent_transactions(
    client: &ApiClient,
    limit: Option<u32>,
) -> Result<ApiResponse<RecentTransactions>, ApiError> {
    let query: Vec<(&str, String)> = limit
        .map(|l| vec![("limit", l.to_string())])
        .unwrap_or_default();
    client
        .get_with_query(endpoints::TRANSACTIONS_RECENT, &query)
        .await
}

pub async fn scheduled_transfers(
    client: &ApiClient,
) -> Result<ApiResponse<ScheduledTransfers>, ApiError> {
    client.get(endpoints::TRANSFERS_SCHEDULED).await
}
