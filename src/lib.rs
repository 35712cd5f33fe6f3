pub mod api;
pub mod cli;
pub mod core;
pub mod engine;
pub mod format;
pub mod http;
pub mod preference;
pub mod providers;
pub mod session;
pub mod store;
pub mod validation;

use crate::core::cache::{KeyValueCollection, Store};
use crate::core::config::AppConfig;
use crate::core::currency::CurrencyCode;
use crate::engine::CurrencyEngine;
use crate::http::{ApiClient, PipelineListener};
use crate::preference::CurrencyPreference;
use crate::providers::exchange::{DovizProvider, RateCache};
use crate::session::SessionManager;
use crate::store::KeyValueStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    SignIn {
        email: String,
        password: Option<String>,
    },
    SignUp {
        full_name: String,
        email: String,
        password: Option<String>,
    },
    SignInWithGoogle {
        credential: String,
    },
    Logout,
    WhoAmI,
    Summary,
    Wallet,
    Transactions {
        limit: Option<u32>,
    },
    Transfers,
    Capital {
        period: Option<String>,
    },
    Currency {
        code: Option<CurrencyCode>,
    },
    Convert {
        amount: f64,
        from: String,
    },
    Rates,
}

/// Everything a command needs, built once per process.
pub struct AppContext {
    pub config: AppConfig,
    pub client: ApiClient,
    pub preference: Arc<CurrencyPreference>,
    pub rates: RateCache,
}

fn collection(store: &KeyValueStore, name: &str) -> Result<Arc<dyn KeyValueCollection>> {
    store
        .get_collection(name, true, true)
        .with_context(|| format!("Failed to open the {name} collection"))
}

impl AppContext {
    pub async fn build(config: AppConfig, listener: Arc<dyn PipelineListener>) -> Result<Self> {
        let data_path = config.default_data_path()?;
        debug!("Using data path {}", data_path.display());
        let store = KeyValueStore::open(&data_path);

        let session = Arc::new(SessionManager::load(collection(&store, "session")?).await);
        let preference = Arc::new(
            CurrencyPreference::load(collection(&store, "preferences")?, config.currency).await,
        );
        let provider = Arc::new(DovizProvider::from_config(&config.exchange)?);
        let rates = RateCache::new(provider, collection(&store, "rates")?);
        let client = ApiClient::from_config(&config.api, session, listener)?;

        Ok(Self {
            config,
            client,
            preference,
            rates,
        })
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        self.client.session()
    }

    /// An engine over the current rate snapshot, fetching it if needed.
    pub async fn currency_engine(&self) -> CurrencyEngine {
        CurrencyEngine::new(
            Arc::clone(&self.preference),
            self.rates.get().await,
            self.config.locale.clone(),
        )
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Maglo starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let context = AppContext::build(config, Arc::new(cli::TerminalListener)).await?;
    execute(&context, command).await
}

pub async fn execute(context: &AppContext, command: AppCommand) -> Result<()> {
    match command {
        AppCommand::SignIn { email, password } => {
            cli::auth::sign_in(context, &email, password).await
        }
        AppCommand::SignUp {
            full_name,
            email,
            password,
        } => cli::auth::sign_up(context, &full_name, &email, password).await,
        AppCommand::SignInWithGoogle { credential } => {
            cli::auth::sign_in_with_google(context, &credential).await
        }
        AppCommand::Logout => cli::auth::logout(context).await,
        AppCommand::WhoAmI => cli::auth::whoami(context).await,
        AppCommand::Summary => cli::dashboard::summary(context).await,
        AppCommand::Wallet => cli::dashboard::wallet(context).await,
        AppCommand::Transactions { limit } => cli::dashboard::transactions(context, limit).await,
        AppCommand::Transfers => cli::dashboard::transfers(context).await,
        AppCommand::Capital { period } => {
            cli::dashboard::capital(context, period.as_deref()).await
        }
        AppCommand::Currency { code } => cli::currency::currency(context, code).await,
        AppCommand::Convert { amount, from } => {
            cli::currency::convert(context, amount, &from).await
        }
        AppCommand::Rates => cli::currency::rates(context).await,
    }
}
