//! Compounding conversions between period returns and annual rates.
//!
//! Every tool in the workspace converts rates through this module, so a
//! weekly cash yield, a 90-day portfolio return and a 30-day deployment cycle
//! are all compounded with the same 365-day year.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::CashPlanError;
use crate::types::{Rate, RatePeriod};
use crate::CashPlanResult;

pub const DAYS_PER_YEAR: u32 = 365;
pub const MONTHS_PER_YEAR: u32 = 12;

/// Compound a return earned over `period_days` forward to one year:
/// `(1 + r)^(365 / d) - 1`.
pub fn annualize(period_return: Rate, period_days: u32) -> CashPlanResult<Rate> {
    check_days(period_days)?;
    if period_days == DAYS_PER_YEAR {
        check_growth_factor("period_return", period_return)?;
        return Ok(period_return);
    }
    let exponent = Decimal::from(DAYS_PER_YEAR) / Decimal::from(period_days);
    compound("period_return", period_return, exponent)
}

/// Effective rate for a cycle of `period_days` days implied by an annual
/// rate: `(1 + a)^(d / 365) - 1`.
pub fn periodic_rate(annual_rate: Rate, period_days: u32) -> CashPlanResult<Rate> {
    check_days(period_days)?;
    if period_days == DAYS_PER_YEAR {
        check_growth_factor("annual_rate", annual_rate)?;
        return Ok(annual_rate);
    }
    let exponent = Decimal::from(period_days) / Decimal::from(DAYS_PER_YEAR);
    compound("annual_rate", annual_rate, exponent)
}

/// Simple monthly rate (APR / 12), the convention brokers use to quote
/// margin-loan interest.
pub fn nominal_monthly_rate(annual_rate: Rate) -> Rate {
    annual_rate / Decimal::from(MONTHS_PER_YEAR)
}

impl RatePeriod {
    pub fn new(rate: Rate, period_days: u32) -> Self {
        Self { rate, period_days }
    }

    pub fn annualized(&self) -> CashPlanResult<Rate> {
        annualize(self.rate, self.period_days)
    }
}

fn check_days(period_days: u32) -> CashPlanResult<()> {
    if period_days == 0 {
        return Err(CashPlanError::invalid(
            "period_days",
            "Period length must be at least one day",
        ));
    }
    Ok(())
}

fn check_growth_factor(field: &str, rate: Rate) -> CashPlanResult<()> {
    if rate <= dec!(-1) {
        return Err(CashPlanError::domain(
            field,
            format!("Rate {rate} must be greater than -100%"),
        ));
    }
    Ok(())
}

fn compound(field: &str, rate: Rate, exponent: Decimal) -> CashPlanResult<Rate> {
    check_growth_factor(field, rate)?;
    match (Decimal::ONE + rate).checked_powd(exponent) {
        Some(growth) => Ok(growth - Decimal::ONE),
        // A growth factor below one raised to a positive power only shrinks,
        // so a failed power is underflow towards a total loss.
        None if rate < Decimal::ZERO && exponent > Decimal::ZERO => Ok(dec!(-1)),
        None => Err(CashPlanError::domain(
            field,
            format!("(1 + {rate})^{exponent} is outside the representable range"),
        )),
    }
}
