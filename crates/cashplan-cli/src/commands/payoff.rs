use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use cashplan_core::payoff::{self, PayoffInput, PayoffMode};

use crate::commands::with_reproduce;
use crate::input;
use crate::input::prompt::{self, require};
use crate::input::values::{format_percent, parse_amount, parse_count, parse_percent};

/// Arguments for a margin-loan payoff plan
#[derive(Args)]
pub struct PayoffArgs {
    /// Path to a JSON file with the full payoff input
    #[arg(long)]
    pub input: Option<String>,

    /// Annual margin interest rate (APR), in percent
    #[arg(long, value_parser = parse_percent, allow_hyphen_values = true)]
    pub rate: Option<Decimal>,

    /// Amount borrowed
    #[arg(long, value_parser = parse_amount)]
    pub borrowed: Option<Decimal>,

    /// Fixed monthly payment
    #[arg(long, value_parser = parse_amount, conflicts_with = "months")]
    pub payment: Option<Decimal>,

    /// Number of months to clear the loan
    #[arg(long, value_parser = parse_count)]
    pub months: Option<u32>,
}

pub fn run_payoff(args: PayoffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payoff_input: PayoffInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        from_flags(&args)?
    };

    let result = payoff::plan_payoff(&payoff_input)?;
    log::info!(
        "payoff settles in {} months, total interest {}",
        result.result.months_to_payoff,
        result.result.total_interest
    );
    with_reproduce(&result, reproduce_command(&payoff_input))
}

fn from_flags(args: &PayoffArgs) -> Result<PayoffInput, Box<dyn std::error::Error>> {
    let annual_rate = require(args.rate, "--rate", "Margin interest rate (%)", parse_percent)?;
    let borrowed = require(args.borrowed, "--borrowed", "Amount borrowed", parse_amount)?;

    let mode = match (args.payment, args.months) {
        (Some(payment), _) => PayoffMode::FixedPayment { payment },
        (None, Some(months)) => PayoffMode::FixedTerm { months },
        (None, None) if prompt::interactive() => {
            let choice = prompt::choose(
                "How should the loan be paid off?",
                &["Specify monthly payment amount", "Specify number of months"],
            )?;
            if choice == 0 {
                PayoffMode::FixedPayment {
                    payment: prompt::ask("Monthly payment", parse_amount)?,
                }
            } else {
                PayoffMode::FixedTerm {
                    months: prompt::ask("Number of months", parse_count)?,
                }
            }
        }
        (None, None) => return Err("missing --payment or --months (or provide --input)".into()),
    };

    Ok(PayoffInput {
        annual_rate,
        borrowed,
        mode,
    })
}

/// Command line that reruns this plan without prompting.
pub fn reproduce_command(input: &PayoffInput) -> String {
    let mut cmd = format!(
        "cashplan payoff --rate {} --borrowed {}",
        format_percent(input.annual_rate),
        input.borrowed.normalize()
    );
    match input.mode {
        PayoffMode::FixedPayment { payment } => {
            cmd.push_str(&format!(" --payment {}", payment.normalize()))
        }
        PayoffMode::FixedTerm { months } => cmd.push_str(&format!(" --months {}", months)),
    }
    cmd
}
