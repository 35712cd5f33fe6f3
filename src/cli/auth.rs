use super::ui;
use crate::AppContext;
use crate::api::auth as auth_api;
use crate::core::error::FieldErrors;
use crate::core::session::{Role, User};
use crate::format::format_date_time;
use crate::validation::{validate_sign_in, validate_sign_up};
use anyhow::{Context, Result, anyhow, bail};
use comfy_table::Cell;
use console::Term;
use tracing::debug;

fn read_password(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    let term = Term::stderr();
    term.write_str("Password: ")
        .context("Failed to write password prompt")?;
    term.read_secure_line()
        .context("Failed to read password")
}

const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

fn reject_invalid(errors: &FieldErrors) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    eprintln!("{}", ui::render_field_errors(errors));
    bail!("Please correct the fields above");
}

pub async fn sign_in(context: &AppContext, email: &str, password: Option<String>) -> Result<()> {
    let password = read_password(password)?;
    reject_invalid(&validate_sign_in(email, &password))?;

    let response = auth_api::sign_in(&context.client, email.trim(), &password)
        .await
        .map_err(|e| {
            if e.is_auth_error() {
                anyhow!(INVALID_CREDENTIALS_MESSAGE)
            } else {
                e.into()
            }
        })?;
    let user = auth_api::establish_session(&context.client, response).await;
    println!(
        "Welcome back, {}",
        ui::style_text(&user.full_name, ui::StyleType::TotalLabel)
    );
    Ok(())
}

pub async fn sign_up(
    context: &AppContext,
    full_name: &str,
    email: &str,
    password: Option<String>,
) -> Result<()> {
    let password = read_password(password)?;
    reject_invalid(&validate_sign_up(full_name, email, &password))?;

    let response =
        auth_api::sign_up(&context.client, full_name.trim(), email.trim(), &password).await?;
    let user = auth_api::establish_session(&context.client, response).await;
    println!(
        "Account created. Welcome, {}",
        ui::style_text(&user.full_name, ui::StyleType::TotalLabel)
    );
    Ok(())
}

pub async fn sign_in_with_google(context: &AppContext, credential: &str) -> Result<()> {
    let response = auth_api::sign_in_with_google(&context.client, credential).await?;
    let user = auth_api::establish_session(&context.client, response).await;
    println!(
        "Welcome, {}",
        ui::style_text(&user.full_name, ui::StyleType::TotalLabel)
    );
    Ok(())
}

pub async fn logout(context: &AppContext) -> Result<()> {
    if !context.session().is_authenticated().await {
        println!("You are not signed in.");
        return Ok(());
    }
    // The session is gone locally even if the server did not hear about it
    if let Err(e) = auth_api::end_session(&context.client).await {
        debug!(error = %e, "Server side logout failed");
    }
    println!("Signed out.");
    Ok(())
}

pub async fn whoami(context: &AppContext) -> Result<()> {
    super::require_session(context).await?;
    let profile = auth_api::me(&context.client).await?;
    println!("{}", render_user(&profile.data, &context.config.locale));
    Ok(())
}

pub fn render_user(user: &User, locale: &str) -> String {
    let mut table = ui::new_styled_table();
    let role = match user.role {
        Role::User => "user",
        Role::Admin => "admin",
    };
    let last_login = match (&user.last_login_at, &user.last_login_ip) {
        (Some(at), Some(ip)) => format!("{} from {}", format_date_time(at, locale), ip),
        (Some(at), None) => format_date_time(at, locale),
        _ => "never".to_string(),
    };
    let rows = [
        ("Name", user.full_name.clone()),
        ("Email", user.email.clone()),
        ("Role", role.to_string()),
        (
            "Status",
            if user.is_active { "active" } else { "inactive" }.to_string(),
        ),
        ("Last login", last_login),
        ("Member since", format_date_time(&user.created_at, locale)),
    ];
    for (label, value) in rows {
        table.add_row(vec![ui::header_cell(label), Cell::new(value)]);
    }
    table.to_string()
}
