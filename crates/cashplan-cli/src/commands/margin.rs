use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use cashplan_core::margin::{self, BlendWeights, MarginInput};

use crate::input;
use crate::input::prompt::require;
use crate::input::values::parse_percent;

/// Arguments for the margin-borrowing evaluation
#[derive(Args)]
pub struct MarginArgs {
    /// Path to a JSON file with the full margin input
    #[arg(long)]
    pub input: Option<String>,

    /// 1-day return, in percent
    #[arg(long = "r-1d", value_parser = parse_percent, allow_hyphen_values = true)]
    pub r_1d: Option<Decimal>,

    /// 1-week return, in percent
    #[arg(long = "r-1w", value_parser = parse_percent, allow_hyphen_values = true)]
    pub r_1w: Option<Decimal>,

    /// 1-month return, in percent
    #[arg(long = "r-1m", value_parser = parse_percent, allow_hyphen_values = true)]
    pub r_1m: Option<Decimal>,

    /// 3-month return, in percent
    #[arg(long = "r-3m", value_parser = parse_percent, allow_hyphen_values = true)]
    pub r_3m: Option<Decimal>,

    /// 1-year return, in percent
    #[arg(long = "r-1y", value_parser = parse_percent, allow_hyphen_values = true)]
    pub r_1y: Option<Decimal>,

    /// Annual dividend yield, in percent
    #[arg(long, value_parser = parse_percent, allow_hyphen_values = true)]
    pub dividend_yield: Option<Decimal>,

    /// Annual margin interest rate, in percent
    #[arg(long, value_parser = parse_percent, allow_hyphen_values = true)]
    pub margin_rate: Option<Decimal>,

    /// Path to a JSON object of blend weights keyed by window label
    #[arg(long)]
    pub weights: Option<String>,
}

pub fn run_margin(args: MarginArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut margin_input: MarginInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        from_flags(&args)?
    };

    if let Some(ref path) = args.weights {
        let weights: BlendWeights = input::file::read_json(path)?;
        margin_input.weights = Some(weights);
    }

    let result = margin::evaluate_margin(&margin_input)?;
    log::info!(
        "margin verdict {:?} at net {}",
        result.result.verdict,
        result.result.net_margin_return
    );
    Ok(serde_json::to_value(result)?)
}

fn from_flags(args: &MarginArgs) -> Result<MarginInput, Box<dyn std::error::Error>> {
    let returns = [
        require(args.r_1d, "--r-1d", "1-day return (%)", parse_percent)?,
        require(args.r_1w, "--r-1w", "1-week return (%)", parse_percent)?,
        require(args.r_1m, "--r-1m", "1-month return (%)", parse_percent)?,
        require(args.r_3m, "--r-3m", "3-month return (%)", parse_percent)?,
        require(args.r_1y, "--r-1y", "1-year return (%)", parse_percent)?,
    ];
    let dividend_yield = require(
        args.dividend_yield,
        "--dividend-yield",
        "Annual dividend yield (%)",
        parse_percent,
    )?;
    let margin_rate = require(
        args.margin_rate,
        "--margin-rate",
        "Margin interest rate (%)",
        parse_percent,
    )?;

    Ok(MarginInput::standard(returns, dividend_yield, margin_rate))
}
