use clap::Args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use cashplan_core::rates;

use crate::input::values::{format_percent, parse_percent};

/// Arguments for annualizing a holding-period return
#[derive(Args)]
pub struct AnnualizeArgs {
    /// Return over the holding period, in percent (e.g. 1.5 or 1.5%)
    #[arg(long = "return", value_parser = parse_percent, allow_hyphen_values = true)]
    pub period_return: Decimal,

    /// Length of the holding period in days
    #[arg(long)]
    pub days: u32,
}

/// Arguments for converting an annual rate to a per-period rate
#[derive(Args)]
pub struct PeriodicRateArgs {
    /// Effective annual rate, in percent
    #[arg(long, value_parser = parse_percent, allow_hyphen_values = true)]
    pub annual_rate: Decimal,

    /// Length of one period in days
    #[arg(long)]
    pub days: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnnualizeOutput {
    period_return: Decimal,
    period_days: u32,
    annualized_return: Decimal,
    annualized_pct: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct PeriodicRateOutput {
    annual_rate: Decimal,
    period_days: u32,
    periodic_rate: Decimal,
    periodic_pct: String,
}

pub fn run_annualize(args: AnnualizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let annualized = rates::annualize(args.period_return, args.days)?;
    log::info!(
        "annualized {} over {} days to {}",
        args.period_return,
        args.days,
        annualized
    );

    let output = AnnualizeOutput {
        period_return: args.period_return,
        period_days: args.days,
        annualized_return: annualized,
        annualized_pct: format!("{}%", format_percent(annualized.round_dp(4))),
    };
    Ok(serde_json::to_value(output)?)
}

pub fn run_periodic_rate(args: PeriodicRateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rate = rates::periodic_rate(args.annual_rate, args.days)?;

    let output = PeriodicRateOutput {
        annual_rate: args.annual_rate,
        period_days: args.days,
        periodic_rate: rate,
        periodic_pct: format!("{}%", format_percent(rate.round_dp(6))),
    };
    Ok(serde_json::to_value(output)?)
}
