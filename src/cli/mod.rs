pub mod auth;
pub mod currency;
pub mod dashboard;
pub mod setup;
pub mod ui;

use crate::AppContext;
use crate::http::{PipelineListener, SIGN_IN_ROUTE};
use anyhow::{Result, bail};
use console::style;
use tracing::debug;

/// Prints pipeline notifications to stderr.
pub struct TerminalListener;

impl PipelineListener for TerminalListener {
    fn notify(&self, message: &str) {
        eprintln!("{} {}", style("✖").red().bold(), message);
    }

    fn navigate(&self, route: &str) {
        if route == SIGN_IN_ROUTE {
            eprintln!(
                "{}",
                ui::style_text("Run `maglo signin` to sign in again.", ui::StyleType::Subtle)
            );
        } else {
            debug!("Ignoring navigation to {}", route);
        }
    }
}

pub(crate) async fn require_session(context: &AppContext) -> Result<()> {
    if !context.session().is_authenticated().await {
        bail!("You are not signed in. Run `maglo signin` first.");
    }
    Ok(())
}
