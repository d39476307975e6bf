use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use cashplan_core::deployment::{self, DeploymentInput, Frequency};
use cashplan_core::rates::DAYS_PER_YEAR;

use crate::commands::with_reproduce;
use crate::input;
use crate::input::prompt::{self, require};
use crate::input::values::{format_percent, parse_amount, parse_count, parse_date, parse_percent};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrequencyArg {
    Weekly,
    Biweekly,
    Monthly,
    Custom,
}

/// Arguments for a cash deployment plan
#[derive(Args)]
pub struct DeployArgs {
    /// Path to a JSON file with the full deployment input
    #[arg(long)]
    pub input: Option<String>,

    /// Cash balance to deploy
    #[arg(long, value_parser = parse_amount)]
    pub balance: Option<Decimal>,

    /// Deployment frequency
    #[arg(long, value_enum)]
    pub frequency: Option<FrequencyArg>,

    /// Days between deployments when --frequency custom
    #[arg(long, value_parser = parse_count)]
    pub custom_days: Option<u32>,

    /// Annual yield on undeployed cash, in percent
    #[arg(long, value_parser = parse_percent, allow_hyphen_values = true)]
    pub cash_apy: Option<Decimal>,

    /// Expected annual market return, in percent
    #[arg(long, value_parser = parse_percent, allow_hyphen_values = true)]
    pub market_apy: Option<Decimal>,

    /// Deployment window in days
    #[arg(long, value_parser = parse_count, default_value_t = DAYS_PER_YEAR)]
    pub duration: u32,

    /// First deployment date (YYYY-MM-DD), defaults to today
    #[arg(long, value_parser = parse_date)]
    pub start_date: Option<NaiveDate>,
}

pub fn run_deploy(args: DeployArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let deploy_input: DeploymentInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        from_flags(&args)?
    };

    let result = deployment::plan_deployment(&deploy_input)?;
    log::info!(
        "deployment of {} in {} cycles of {} days",
        deploy_input.balance,
        result.result.planned_deployments,
        result.result.frequency_days
    );
    with_reproduce(&result, reproduce_command(&deploy_input))
}

fn from_flags(args: &DeployArgs) -> Result<DeploymentInput, Box<dyn std::error::Error>> {
    let balance = require(args.balance, "--balance", "Cash balance to deploy", parse_amount)?;
    let frequency = resolve_frequency(args)?;
    let cash_apy = require(args.cash_apy, "--cash-apy", "Cash yield APY (%)", parse_percent)?;
    let market_apy = require(
        args.market_apy,
        "--market-apy",
        "Expected market return (%)",
        parse_percent,
    )?;

    Ok(DeploymentInput {
        balance,
        frequency,
        cash_apy,
        market_apy,
        duration_days: args.duration,
        start_date: args.start_date.unwrap_or_else(|| Local::now().date_naive()),
    })
}

fn resolve_frequency(args: &DeployArgs) -> Result<Frequency, Box<dyn std::error::Error>> {
    let choice = match args.frequency {
        Some(choice) => choice,
        None if prompt::interactive() => {
            let options = [
                FrequencyArg::Weekly,
                FrequencyArg::Biweekly,
                FrequencyArg::Monthly,
                FrequencyArg::Custom,
            ];
            let index = prompt::choose(
                "Deployment frequency",
                &["Weekly", "Biweekly", "Monthly", "Custom"],
            )?;
            options[index]
        }
        None => return Err("missing required flag --frequency (or provide --input)".into()),
    };

    Ok(match choice {
        FrequencyArg::Weekly => Frequency::Weekly,
        FrequencyArg::Biweekly => Frequency::Biweekly,
        FrequencyArg::Monthly => Frequency::Monthly,
        FrequencyArg::Custom => Frequency::Custom(require(
            args.custom_days,
            "--custom-days",
            "Days between deployments",
            parse_count,
        )?),
    })
}

/// Command line that reruns this plan without prompting.
pub fn reproduce_command(input: &DeploymentInput) -> String {
    let mut cmd = format!(
        "cashplan deploy --balance {} --frequency {}",
        input.balance.normalize(),
        input.frequency.name()
    );
    if let Frequency::Custom(days) = input.frequency {
        cmd.push_str(&format!(" --custom-days {}", days));
    }
    if !input.cash_apy.is_zero() {
        cmd.push_str(&format!(" --cash-apy {}", format_percent(input.cash_apy)));
    }
    cmd.push_str(&format!(" --market-apy {}", format_percent(input.market_apy)));
    if input.duration_days != DAYS_PER_YEAR {
        cmd.push_str(&format!(" --duration {}", input.duration_days));
    }
    cmd.push_str(&format!(" --start-date {}", input.start_date));
    cmd
}
