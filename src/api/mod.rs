//! Typed wrappers over the dashboard REST endpoints.

pub mod auth;
pub mod finance;

pub mod endpoints {
    pub const LOGIN: &str = "/users/login";
    pub const REGISTER: &str = "/users/register";
    pub const LOGOUT: &str = "/users/logout";
    pub const PROFILE: &str = "/users/profile";
    pub const REFRESH_TOKEN: &str = "/users/refresh-token";
    pub const GOOGLE_AUTH: &str = "/users/auth/google";

    pub const SUMMARY: &str = "/financial/summary";
    pub const WORKING_CAPITAL: &str = "/financial/working-capital";
    pub const WALLET: &str = "/financial/wallet";
    pub const TRANSACTIONS_RECENT: &str = "/financial/transactions/recent";
    pub const TRANSFERS_SCHEDULED: &str = "/financial/transfers/scheduled";
}
