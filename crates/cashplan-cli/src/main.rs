mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::deploy::DeployArgs;
use commands::margin::MarginArgs;
use commands::payoff::PayoffArgs;
use commands::rates::{AnnualizeArgs, PeriodicRateArgs};

/// Margin, loan payoff and cash deployment projections
#[derive(Parser)]
#[command(
    name = "cashplan",
    version,
    about = "Margin, loan payoff and cash deployment projections",
    long_about = "A CLI for personal-finance projections with decimal precision: \
                  whether borrowing on margin pays, how a margin loan amortizes, \
                  and how to move a cash balance into the market in level installments."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Annualize a holding-period return by compounding
    Annualize(AnnualizeArgs),
    /// Convert an annual rate to an equivalent per-period rate
    PeriodicRate(PeriodicRateArgs),
    /// Evaluate whether borrowing on margin is expected to pay
    Margin(MarginArgs),
    /// Build a month-by-month margin loan payoff schedule
    Payoff(PayoffArgs),
    /// Plan level deployments of a cash balance into the market
    Deploy(DeployArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Annualize(args) => commands::rates::run_annualize(args),
        Commands::PeriodicRate(args) => commands::rates::run_periodic_rate(args),
        Commands::Margin(args) => commands::margin::run_margin(args),
        Commands::Payoff(args) => commands::payoff::run_payoff(args),
        Commands::Deploy(args) => commands::deploy::run_deploy(args),
        Commands::Version => {
            println!("cashplan {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
