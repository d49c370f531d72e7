//! Spread backtest runner.
//!
//! # Usage
//!
//! ```bash
//! spread-backtest --config config/treasury.toml \
//!     --treasury 0x... --start 2022-01-01 --end 2022-03-31 \
//!     --spread-symbol USDR --spread-address 0x... --spread-name "Real USD" \
//!     --spread-pct 20
//! ```
//!
//! Prints the reconciled treasury, balances, total and risk as JSON.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use treasury_analytics::{RiskAttribution, SpreadToken};
use treasury_core::types::{BalanceTable, Date, DateRange, TotalBalance, Treasury};
use treasury_engine::{create_file_engine, EngineConfig, SpreadEngine, SpreadRequest};
use treasury_traits::ChainId;

/// Backtest a spread into a reserve token over a treasury's history
#[derive(Parser, Debug)]
#[command(name = "spread-backtest")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Engine configuration (TOML); defaults apply when the file is missing
    #[arg(short, long, env = "TREASURY_CONFIG", default_value = "config/treasury.toml")]
    config: PathBuf,

    /// Treasury wallet address
    #[arg(short, long)]
    treasury: String,

    /// First day of the window (YYYY-MM-DD)
    #[arg(short, long, value_parser = Date::parse)]
    start: Date,

    /// Last day of the window, inclusive (YYYY-MM-DD)
    #[arg(short, long, value_parser = Date::parse)]
    end: Date,

    /// Reserve token symbol
    #[arg(long)]
    spread_symbol: String,

    /// Reserve token contract address
    #[arg(long)]
    spread_address: String,

    /// Reserve token name. Defaults to the symbol.
    #[arg(long)]
    spread_name: Option<String>,

    /// Percentage of every balance diverted into the reserve (0-100).
    /// Defaults to the configured percentage.
    #[arg(short = 'p', long)]
    spread_pct: Option<f64>,

    /// Chain ID. Defaults to the configured chain.
    #[arg(long)]
    chain: Option<u64>,
}

impl Cli {
    fn spread_token(&self) -> SpreadToken {
        let name = self.spread_name.as_deref().unwrap_or(&self.spread_symbol);
        SpreadToken::new(name, self.spread_symbol.as_str(), self.spread_address.as_str())
    }

    fn request(&self, engine: &SpreadEngine) -> anyhow::Result<SpreadRequest> {
        let range = DateRange::new(self.start, self.end)?;
        let mut request = engine.new_request(self.treasury.as_str(), range, &self.spread_token());
        if let Some(pct) = self.spread_pct {
            request = request.with_spread_percentage(pct);
        }
        if let Some(chain) = self.chain {
            request = request.with_chain_id(ChainId::new(chain));
        }
        Ok(request)
    }
}

/// JSON report of a backtest.
#[derive(Serialize)]
struct Report {
    request_id: String,
    treasury: Treasury,
    balances: BalanceTable,
    total_balance: TotalBalance,
    risk: RiskAttribution,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,treasury=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = if cli.config.exists() {
        info!("Loading configuration from {}", cli.config.display());
        EngineConfig::from_file(&cli.config).with_context(|| format!("reading {}", cli.config.display()))?
    } else {
        info!("Using default configuration");
        EngineConfig::default()
    };

    let engine = create_file_engine(config)?;
    let request = cli.request(&engine)?;

    let backtest = engine.backtest(&request).await?;
    let report = Report {
        request_id: backtest.request_id.to_string(),
        treasury: backtest.treasury,
        balances: backtest.balances,
        total_balance: backtest.total_balance,
        risk: backtest.risk,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
