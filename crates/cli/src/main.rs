//! Till CLI - a command-line register.
//!
//! # Usage
//!
//! ```bash
//! # Companies the operator may sell for
//! till companies
//!
//! # Locations of one company
//! till locations --company 1
//!
//! # Products at a location, optionally filtered
//! till catalog --company 1 --location 10 --category "Summer sale" --search tee
//!
//! # Ring up a sale (two tees, one cap) and complete it
//! till sale --company 1 --location 10 --item tee=2 --item cap --checkout
//! ```
//!
//! # Environment Variables
//!
//! - `TILL_OPERATOR` / `TILL_PASSWORD` - operator credentials (required)
//! - `TILL_API_BASE_URL`, `TILL_REQUEST_TIMEOUT_SECS`, `TILL_TAX_RATE` - see
//!   `till_client::config`
//! - `RUST_LOG` - log filter (default: `warn`)
//! - `TILL_LOG_FORMAT` - `json` for structured logs

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use till_core::{CategoryFilter, CompanyId, LocationId};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::ItemSpec;

#[derive(Parser)]
#[command(name = "till")]
#[command(author, version, about = "Till point-of-sale register")]
struct Cli {
    /// Operator username
    #[arg(long, global = true, env = "TILL_OPERATOR")]
    operator: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List companies
    Companies,
    /// List a company's locations
    Locations {
        /// Company ID
        #[arg(short, long)]
        company: CompanyId,
    },
    /// Show the products sellable at a location
    Catalog {
        /// Company ID
        #[arg(short, long)]
        company: CompanyId,

        /// Location ID
        #[arg(short, long)]
        location: LocationId,

        /// Category tab ("All" for every product)
        #[arg(long, default_value = "All")]
        category: CategoryFilter,

        /// Case-insensitive name search
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Build a sale and print its totals
    Sale {
        /// Company ID
        #[arg(short, long)]
        company: CompanyId,

        /// Location ID
        #[arg(short, long)]
        location: LocationId,

        /// Product to add, as `ID` or `ID=QTY` (repeatable)
        #[arg(short, long = "item", required = true)]
        items: Vec<ItemSpec>,

        /// Complete the sale and print the receipt as JSON
        #[arg(long)]
        checkout: bool,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so command output stays pipeable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if std::env::var("TILL_LOG_FORMAT").is_ok_and(|format| format == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let operator = cli.operator.as_deref();
    match cli.command {
        Commands::Companies => commands::browse::companies(operator).await,
        Commands::Locations { company } => commands::browse::locations(operator, &company).await,
        Commands::Catalog {
            company,
            location,
            category,
            search,
        } => commands::browse::catalog(operator, &company, &location, &category, &search).await,
        Commands::Sale {
            company,
            location,
            items,
            checkout,
        } => commands::sale::run(operator, &company, &location, &items, checkout).await,
    }
}
