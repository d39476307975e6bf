use log::debug;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CashPlanError;
use crate::types::{to_display, Money, Rate};
use crate::CashPlanResult;

/// Remaining balance below which the next payment settles the loan.
const SETTLEMENT_DUST: Decimal = dec!(0.000000000001);

/// Longest schedule `amortize` will start: 10,000 periods, over 800 years
/// of monthly payments.
pub const MAX_PERIODS: u32 = 10_000;

/// A single period in the amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRecord {
    pub period_index: u32,
    pub payment: Money,
    pub interest_portion: Money,
    pub principal_portion: Money,
    pub remaining_balance: Money,
}

impl AmortizationRecord {
    /// Copy of the record rounded to display precision.
    pub fn rounded(&self) -> Self {
        Self {
            period_index: self.period_index,
            payment: to_display(self.payment),
            interest_portion: to_display(self.interest_portion),
            principal_portion: to_display(self.principal_portion),
            remaining_balance: to_display(self.remaining_balance),
        }
    }
}

/// Lazily generated payoff schedule. Yields one record per period until the
/// balance reaches exactly zero, then stops for good.
#[derive(Debug, Clone)]
pub struct AmortizationSchedule {
    balance: Money,
    per_period_rate: Rate,
    payment: Money,
    period: u32,
}

impl AmortizationSchedule {
    pub fn payment(&self) -> Money {
        self.payment
    }

    pub fn per_period_rate(&self) -> Rate {
        self.per_period_rate
    }

    pub fn remaining_balance(&self) -> Money {
        self.balance
    }
}

/// Start an amortization run for a fixed per-period payment.
///
/// A payment that cannot cover the first period's interest is reported as
/// [`CashPlanError::NonConvergence`] before any record is produced.
pub fn amortize(principal: Money, per_period_rate: Rate, payment: Money) -> CashPlanResult<AmortizationSchedule> {
    if principal <= Decimal::ZERO {
        return Err(CashPlanError::invalid("principal", "Principal must be positive"));
    }
    if per_period_rate <= dec!(-1) {
        return Err(CashPlanError::domain(
            "per_period_rate",
            "Periodic rate must be greater than -100%",
        ));
    }

    let first_interest = principal * per_period_rate;
    if payment <= first_interest {
        return Err(CashPlanError::NonConvergence {
            payment,
            interest: first_interest,
        });
    }
    if payment <= Decimal::ZERO {
        return Err(CashPlanError::invalid("payment", "Payment must be positive"));
    }

    let periods = estimated_periods(principal, per_period_rate, payment);
    if periods.map_or(true, |n| n > Decimal::from(MAX_PERIODS)) {
        return Err(CashPlanError::PeriodLimit { limit: MAX_PERIODS });
    }

    Ok(AmortizationSchedule {
        balance: principal,
        per_period_rate,
        payment,
        period: 0,
    })
}

/// Number of periods needed to clear the balance, ignoring the final clamp:
/// `ln(pmt / (pmt - P*i)) / ln(1 + i)` for a positive rate, `P / pmt`
/// otherwise. A negative rate only shortens the schedule, so the latter is an
/// upper bound there.
fn estimated_periods(principal: Money, per_period_rate: Rate, payment: Money) -> Option<Decimal> {
    if per_period_rate <= Decimal::ZERO {
        return principal.checked_div(payment);
    }
    let first_principal = payment - principal * per_period_rate;
    let exact = payment
        .checked_div(first_principal)
        .and_then(|ratio| ratio.checked_ln())
        .zip((Decimal::ONE + per_period_rate).checked_ln())
        .and_then(|(num, den)| num.checked_div(den));
    // Straight-line bound when the logarithms lose precision
    exact.or_else(|| principal.checked_div(first_principal))
}

impl Iterator for AmortizationSchedule {
    type Item = AmortizationRecord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.balance <= Decimal::ZERO {
            return None;
        }
        self.period = self.period.checked_add(1)?;

        let interest = self.balance * self.per_period_rate;
        let mut principal = self.payment - interest;
        let mut payment = self.payment;

        if principal >= self.balance || self.balance - principal < SETTLEMENT_DUST {
            principal = self.balance;
            payment = interest + principal;
        }
        self.balance -= principal;

        debug!(
            "period {}: payment={} interest={} principal={} balance={}",
            self.period, payment, interest, principal, self.balance
        );

        Some(AmortizationRecord {
            period_index: self.period,
            payment,
            interest_portion: interest,
            principal_portion: principal,
            remaining_balance: self.balance,
        })
    }
}

impl std::iter::FusedIterator for AmortizationSchedule {}
