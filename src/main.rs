use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use maglo::core::currency::CurrencyCode;
use maglo::core::error::{ApiError, handle_error};
use maglo::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for maglo::AppCommand {
    fn from(cmd: Commands) -> maglo::AppCommand {
        match cmd {
            Commands::Signin { email, password } => maglo::AppCommand::SignIn { email, password },
            Commands::Signup {
                full_name,
                email,
                password,
            } => maglo::AppCommand::SignUp {
                full_name,
                email,
                password,
            },
            Commands::Google { credential } => maglo::AppCommand::SignInWithGoogle { credential },
            Commands::Logout => maglo::AppCommand::Logout,
            Commands::Whoami => maglo::AppCommand::WhoAmI,
            Commands::Summary => maglo::AppCommand::Summary,
            Commands::Wallet => maglo::AppCommand::Wallet,
            Commands::Transactions { limit } => maglo::AppCommand::Transactions { limit },
            Commands::Transfers => maglo::AppCommand::Transfers,
            Commands::Capital { period } => maglo::AppCommand::Capital { period },
            Commands::Currency { code } => maglo::AppCommand::Currency { code },
            Commands::Convert { amount, from } => maglo::AppCommand::Convert { amount, from },
            Commands::Rates => maglo::AppCommand::Rates,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Sign in with email and password
    Signin {
        email: String,
        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account
    Signup {
        full_name: String,
        email: String,
        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Sign in with a Google ID token
    Google { credential: String },
    /// Sign out and forget the session
    Logout,
    /// Show the signed in user
    Whoami,
    /// Display the dashboard summary
    Summary,
    /// List wallet cards
    Wallet,
    /// List recent transactions
    Transactions {
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// List scheduled transfers
    Transfers,
    /// Display monthly income and expenses
    Capital {
        /// e.g. last6Months
        #[arg(short, long)]
        period: Option<String>,
    },
    /// Show or change the display currency
    Currency { code: Option<CurrencyCode> },
    /// Convert an amount into the display currency
    Convert {
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        #[arg(default_value = "USD")]
        from: String,
    },
    /// Show the current USD exchange rates
    Rates,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => maglo::cli::setup::setup(),
        Some(cmd) => maglo::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        let message = handle_error(e);
        // API failures have already been reported by the client
        if e.downcast_ref::<ApiError>().is_none() {
            eprintln!("{} {}", console::style("✖").red().bold(), message);
        }
        std::process::exit(1);
    }
    Ok(())
}
