// In app/src/main.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use core_types::{PriceLookup, Symbol};
use engine::Engine;
use engine::providers::{Capability, PortfolioProvider, PriceOracle, SharedPortfolio};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::prelude::*;

mod scenario;

use crate::scenario::Scenario;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "Position limit gate for a signal-driven trading loop.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replays a scenario's signals through one paper-trading cycle.
    Run {
        /// Path to a JSON scenario (cash, positions, prices, signals).
        #[arg(short, long)]
        scenario: PathBuf,
    },

    /// Evaluates a single BUY against a scenario's portfolio.
    Evaluate {
        /// Path to a JSON scenario providing the portfolio.
        #[arg(short, long)]
        scenario: PathBuf,

        /// The symbol to buy (e.g., "SBER").
        #[arg(long)]
        symbol: String,

        /// The current price. Omit to evaluate with no price available.
        #[arg(long)]
        price: Option<Decimal>,
    },
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = app_config::load_settings()?;

    let level = settings
        .app
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_filter(tracing_subscriber::filter::Targets::new().with_default(level));
    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::info!(environment = %settings.app.environment, "Settings loaded.");

    match cli.command {
        Commands::Run { scenario } => handle_run(&settings, scenario).await?,
        Commands::Evaluate {
            scenario,
            symbol,
            price,
        } => handle_evaluate(&settings, scenario, symbol, price)?,
    }

    Ok(())
}

/// Handles the logic for the `run` subcommand.
async fn handle_run(settings: &app_config::Settings, path: PathBuf) -> Result<()> {
    let scenario = Scenario::load(&path)?;
    let portfolio = SharedPortfolio::new(scenario.portfolio()?);
    let oracle: Arc<dyn PriceOracle> = Arc::new(scenario.oracle());

    let mut engine = Engine::paper(
        settings,
        Arc::new(portfolio.clone()),
        Capability::Available(oracle),
    )?;

    let report = engine.run_cycle(&scenario.signals).await;
    let final_portfolio = portfolio.snapshot().await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    println!("{}", serde_json::to_string_pretty(&final_portfolio)?);
    Ok(())
}

/// Handles the logic for the `evaluate` subcommand.
fn handle_evaluate(
    settings: &app_config::Settings,
    path: PathBuf,
    symbol: String,
    price: Option<Decimal>,
) -> Result<()> {
    let scenario = Scenario::load(&path)?;
    let portfolio = scenario.portfolio()?;
    let symbol = Symbol::new(symbol)?;

    let decision = risk::evaluate(
        &symbol,
        &portfolio,
        settings.risk_config()?,
        PriceLookup::from(price),
    );
    tracing::info!(symbol = %symbol, approved = decision.approved, reason = ?decision.reason, "Gate evaluated.");

    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}
