use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use super::simulator::{deploy, total_deployed, DeploymentScheduleEntry};
use crate::error::CashPlanError;
use crate::rates::DAYS_PER_YEAR;
use crate::types::{to_display, with_metadata, ComputationOutput, Money, Rate};
use crate::CashPlanResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How often cash is moved into the market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    /// Every `n` days.
    Custom(u32),
}

impl Frequency {
    pub fn days(&self) -> u32 {
        match self {
            Frequency::Weekly => 7,
            Frequency::Biweekly => 14,
            Frequency::Monthly => 30,
            Frequency::Custom(days) => *days,
        }
    }

    /// Preset name, or `custom` for an arbitrary day count.
    pub fn name(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
            Frequency::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Custom(days) => write!(f, "every {days} days"),
            other => f.write_str(other.name()),
        }
    }
}

fn default_duration() -> u32 {
    DAYS_PER_YEAR
}

/// Input parameters for a cash deployment plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentInput {
    pub balance: Money,
    pub frequency: Frequency,
    /// Annual yield on undeployed cash.
    pub cash_apy: Rate,
    /// Expected annual market return on deployed money.
    pub market_apy: Rate,
    /// Length of the deployment window in days.
    #[serde(default = "default_duration")]
    pub duration_days: u32,
    pub start_date: NaiveDate,
}

/// Output of `plan_deployment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentOutput {
    pub frequency_days: u32,
    pub planned_deployments: u32,
    pub cash_rate_per_cycle: Rate,
    pub market_rate_per_cycle: Rate,
    pub level_withdrawal: Money,
    pub total_deployed: Money,
    pub total_cash_interest: Money,
    pub total_market_growth: Money,
    pub final_destination_balance: Money,
    pub exhausted_early: bool,
    pub schedule: Vec<DeploymentScheduleEntry>,
}

/// Number of deployments that fit in the window, counting a partial cycle.
pub fn deployment_count(duration_days: u32, frequency_days: u32) -> CashPlanResult<u32> {
    if frequency_days == 0 {
        return Err(CashPlanError::invalid(
            "frequency_days",
            "Deployment frequency must be at least one day",
        ));
    }
    if duration_days == 0 {
        return Err(CashPlanError::invalid(
            "duration_days",
            "Deployment window must be at least one day",
        ));
    }
    Ok(duration_days.div_ceil(frequency_days))
}

/// Build a full deployment plan: cycle count from the window, per-cycle
/// rates, level withdrawal and the dated schedule.
pub fn plan_deployment(input: &DeploymentInput) -> CashPlanResult<ComputationOutput<DeploymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let frequency_days = input.frequency.days();
    let planned = deployment_count(input.duration_days, frequency_days)?;

    let mut run = deploy(
        input.balance,
        frequency_days,
        planned,
        input.cash_apy,
        input.market_apy,
        input.start_date,
    )?;
    let cash_rate = run.cash_rate();
    let market_rate = run.market_rate();
    let payment = run.payment();

    let schedule: Vec<DeploymentScheduleEntry> = run.by_ref().collect();
    let exhausted_early = (schedule.len() as u32) < planned;
    if exhausted_early {
        warn!(
            "cash exhausted after {} of {} deployments",
            schedule.len(),
            planned
        );
        warnings.push(format!(
            "Cash balance exhausted after {} of {} planned deployments",
            schedule.len(),
            planned
        ));
    }
    if input.market_apy < input.cash_apy {
        warnings.push(format!(
            "Expected market return {} is below the cash yield {}; deploying lowers expected value",
            input.market_apy, input.cash_apy
        ));
    }

    let total_cash_interest: Money = schedule.iter().map(|e| e.source_interest_accrued).sum();
    let total_market_growth: Money = schedule.iter().map(|e| e.destination_growth).sum();

    let output = DeploymentOutput {
        frequency_days,
        planned_deployments: planned,
        cash_rate_per_cycle: cash_rate,
        market_rate_per_cycle: market_rate,
        level_withdrawal: to_display(payment),
        total_deployed: total_deployed(&schedule),
        total_cash_interest,
        total_market_growth,
        final_destination_balance: to_display(run.destination_balance().max(Decimal::ZERO)),
        exhausted_early,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-withdrawal cash deployment (interest accrues before each withdrawal)",
        &serde_json::json!({
            "balance": input.balance.to_string(),
            "frequency": input.frequency.to_string(),
            "cash_apy": input.cash_apy.to_string(),
            "market_apy": input.market_apy.to_string(),
            "duration_days": input.duration_days,
            "start_date": input.start_date.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn monthly_input() -> DeploymentInput {
        DeploymentInput {
            balance: dec!(10000),
            frequency: Frequency::Monthly,
            cash_apy: dec!(0.02),
            market_apy: dec!(0.08),
            duration_days: 365,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        }
    }

    #[test]
    fn test_deployment_count_rounds_up() {
        assert_eq!(deployment_count(365, 30).unwrap(), 13);
        assert_eq!(deployment_count(365, 7).unwrap(), 53);
        assert_eq!(deployment_count(28, 14).unwrap(), 2);
        assert!(deployment_count(365, 0).is_err());
    }

    #[test]
    fn test_presets() {
        assert_eq!(Frequency::Weekly.days(), 7);
        assert_eq!(Frequency::Biweekly.days(), 14);
        assert_eq!(Frequency::Monthly.days(), 30);
        assert_eq!(Frequency::Custom(45).days(), 45);
        assert_eq!(Frequency::Custom(45).name(), "custom");
    }

    #[test]
    fn test_plan_year_monthly() {
        let result = plan_deployment(&monthly_input()).unwrap();
        let plan = &result.result;
        assert_eq!(plan.planned_deployments, 13);
        assert_eq!(plan.schedule.len(), 13);
        assert!(!plan.exhausted_early);
        assert!((plan.total_deployed - dec!(10000)).abs() < dec!(150));
        assert!(plan.final_destination_balance > dec!(10000));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_market_below_cash_warns() {
        let mut input = monthly_input();
        input.market_apy = dec!(0.01);
        let result = plan_deployment(&input).unwrap();
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_frequency_serde() {
        let json = serde_json::to_string(&Frequency::Custom(10)).unwrap();
        assert_eq!(json, r#"{"custom":10}"#);
        let parsed: Frequency = serde_json::from_str(r#""biweekly""#).unwrap();
        assert_eq!(parsed, Frequency::Biweekly);
    }
}
