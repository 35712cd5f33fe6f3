use super::endpoints;
use crate::core::error::ApiError;
use crate::core::finance::{ApiResponse, AuthResponse, TokenResponse};
use crate::core::session::User;
use crate::http::ApiClient;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct LoginInput<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterInput<'a> {
    full_name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct GoogleAuthInput<'a> {
    credential: &'a str,
}

pub async fn sign_in(
    client: &ApiClient,
    email: &str,
    password: &str,
) -> Result<AuthResponse, ApiError> {
    client
        .post(endpoints::LOGIN, &LoginInput { email, password })
        .await
}

pub async fn sign_up(
    client: &ApiClient,
    full_name: &str,
    email: &str,
    password: &str,
) -> Result<AuthResponse, ApiError> {
    let input = RegisterInput {
        full_name,
        email,
        password,
    };
    client.post(endpoints::REGISTER, &input).await
}

pub async fn sign_in_with_google(
    client: &ApiClient,
    credential: &str,
) -> Result<AuthResponse, ApiError> {
    client
        .post(endpoints::GOOGLE_AUTH, &GoogleAuthInput { credential })
        .await
}

pub async fn me(client: &ApiClient) -> Result<ApiResponse<User>, ApiError> {
    client.get(endpoints::PROFILE).await
}

pub async fn logout(client: &ApiClient) -> Result<(), ApiError> {
    client.post_discarding(endpoints::LOGOUT).await
}

pub async fn refresh_token(client: &ApiClient) -> Result<TokenResponse, ApiError> {
    client.post_empty(endpoints::REFRESH_TOKEN).await
}

/// Stores the credentials from a successful sign in or sign up.
pub async fn establish_session(client: &ApiClient, response: AuthResponse) -> User {
    let user = response.data.user;
    client
        .session()
        .set_credentials(response.data.access_token, user.clone())
        .await;
    info!(user = %user.email, "Signed in");
    user
}

/// Swaps the stored token for a fresh one, keeping the signed-in user.
pub async fn refresh_session(client: &ApiClient) -> Result<(), ApiError> {
    let refreshed = refresh_token(client).await?;
    if let Some(user) = client.session().current_user().await {
        client
            .session()
            .set_credentials(refreshed.access_token, user)
            .await;
    }
    Ok(())
}

/// Tells the server the session is over and clears it locally whatever the
/// server answered.
pub async fn end_session(client: &ApiClient) -> Result<(), ApiError> {
    let result = logout(client).await;
    if let Err(e) = &result {
        warn!(error = %e, "Logout request failed, clearing the session anyway");
    }
    client.session().clear().await;
    result
}
