use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{amortize, AmortizationRecord};
use crate::annuity::solve_payment;
use crate::error::CashPlanError;
use crate::rates::nominal_monthly_rate;
use crate::types::{to_display, with_metadata, ComputationOutput, Money, Rate};
use crate::CashPlanResult;

/// How the monthly payment is determined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoffMode {
    /// Pay a fixed amount every month until the loan is cleared.
    FixedPayment { payment: Money },
    /// Clear the loan in a fixed number of months.
    FixedTerm { months: u32 },
}

/// Input parameters for a margin-loan payoff plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffInput {
    /// Annual margin interest rate (APR).
    pub annual_rate: Rate,
    pub borrowed: Money,
    pub mode: PayoffMode,
}

/// Output of `plan_payoff`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffOutput {
    pub monthly_rate: Rate,
    pub level_payment: Money,
    pub months_to_payoff: u32,
    pub total_interest: Money,
    pub total_paid: Money,
    pub schedule: Vec<AmortizationRecord>,
}

/// Month-by-month payoff table for a margin loan.
pub fn plan_payoff(input: &PayoffInput) -> CashPlanResult<ComputationOutput<PayoffOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.borrowed <= Decimal::ZERO {
        return Err(CashPlanError::invalid("borrowed", "Amount borrowed must be positive"));
    }
    if input.annual_rate < Decimal::ZERO {
        warnings.push("Negative margin rate: interest is credited rather than charged".into());
    }

    let monthly_rate = nominal_monthly_rate(input.annual_rate);
    let payment = match input.mode {
        PayoffMode::FixedPayment { payment } => payment,
        PayoffMode::FixedTerm { months } => solve_payment(input.borrowed, monthly_rate, months)?,
    };

    let schedule = amortize(input.borrowed, monthly_rate, payment).inspect_err(|e| {
        match e {
            CashPlanError::NonConvergence { .. } => {
                warn!("payment {payment} never pays off {} at {monthly_rate}/month", input.borrowed)
            }
            CashPlanError::PeriodLimit { limit } => {
                warn!("payment {payment} takes more than {limit} months to pay off {}", input.borrowed)
            }
            _ => {}
        }
    })?;

    let mut total_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let mut rows = Vec::new();
    for record in schedule {
        total_interest += record.interest_portion;
        total_paid += record.payment;
        rows.push(record.rounded());
    }

    if let PayoffMode::FixedTerm { months } = input.mode {
        if rows.len() as u32 != months {
            warnings.push(format!(
                "Schedule settled in {} months instead of the requested {}",
                rows.len(),
                months
            ));
        }
    }

    let output = PayoffOutput {
        monthly_rate,
        level_payment: to_display(payment),
        months_to_payoff: rows.len() as u32,
        total_interest: to_display(total_interest),
        total_paid: to_display(total_paid),
        schedule: rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-payment amortization at a nominal monthly rate (APR / 12)",
        &serde_json::json!({
            "annual_rate": input.annual_rate.to_string(),
            "borrowed": input.borrowed.to_string(),
            "mode": input.mode,
        }),
        warnings,
        elapsed,
        output,
    ))
}
