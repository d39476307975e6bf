use chrono::{Days, NaiveDate};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::annuity::level_withdrawal;
use crate::error::CashPlanError;
use crate::rates::periodic_rate;
use crate::types::{to_display, Money, Rate};
use crate::CashPlanResult;

/// One deployment cycle. Amounts are rounded to display precision; the
/// simulation itself carries full precision between cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentScheduleEntry {
    pub period_index: u32,
    pub date: NaiveDate,
    pub withdrawal_amount: Money,
    pub source_interest_accrued: Money,
    pub source_balance_after: Money,
    pub destination_deposit: Money,
    pub destination_growth: Money,
    pub destination_balance_after: Money,
}

/// Lazily simulated deployment of a cash balance into the market.
#[derive(Debug, Clone)]
pub struct DeploymentSchedule {
    source_balance: Money,
    destination_balance: Money,
    cash_rate: Rate,
    market_rate: Rate,
    payment: Money,
    frequency_days: u32,
    deployment_count: u32,
    start_date: NaiveDate,
    cycle: u32,
    exhausted: bool,
}

impl DeploymentSchedule {
    /// Per-cycle rate earned by undeployed cash.
    pub fn cash_rate(&self) -> Rate {
        self.cash_rate
    }

    /// Per-cycle rate earned by deployed money.
    pub fn market_rate(&self) -> Rate {
        self.market_rate
    }

    /// Level withdrawal sized up front for the whole run.
    pub fn payment(&self) -> Money {
        self.payment
    }

    pub fn deployment_count(&self) -> u32 {
        self.deployment_count
    }

    /// Full-precision source balance after the cycles produced so far.
    pub fn source_balance(&self) -> Money {
        self.source_balance
    }

    /// Full-precision destination balance after the cycles produced so far.
    pub fn destination_balance(&self) -> Money {
        self.destination_balance
    }
}

/// Set up a deployment run: `deployment_count` level withdrawals every
/// `frequency_days` days, starting on `start_date`.
pub fn deploy(
    initial_balance: Money,
    frequency_days: u32,
    deployment_count: u32,
    cash_annual_rate: Rate,
    market_annual_rate: Rate,
    start_date: NaiveDate,
) -> CashPlanResult<DeploymentSchedule> {
    if initial_balance <= Decimal::ZERO {
        return Err(CashPlanError::invalid("balance", "Balance to deploy must be positive"));
    }
    if frequency_days == 0 {
        return Err(CashPlanError::invalid(
            "frequency_days",
            "Deployment frequency must be at least one day",
        ));
    }
    if deployment_count == 0 {
        return Err(CashPlanError::invalid(
            "deployment_count",
            "At least one deployment is required",
        ));
    }

    let last_offset = u64::from(frequency_days) * u64::from(deployment_count - 1);
    if start_date.checked_add_days(Days::new(last_offset)).is_none() {
        return Err(CashPlanError::invalid(
            "start_date",
            format!("Deployment {deployment_count} falls past the last representable date"),
        ));
    }

    let cash_rate = periodic_rate(cash_annual_rate, frequency_days)?;
    let market_rate = periodic_rate(market_annual_rate, frequency_days)?;
    let payment = level_withdrawal(initial_balance, cash_rate, deployment_count)?;

    debug!(
        "deployment sized: payment={} cash_rate={} market_rate={} cycles={}",
        payment, cash_rate, market_rate, deployment_count
    );

    Ok(DeploymentSchedule {
        source_balance: initial_balance,
        destination_balance: Decimal::ZERO,
        cash_rate,
        market_rate,
        payment,
        frequency_days,
        deployment_count,
        start_date,
        cycle: 0,
        exhausted: false,
    })
}

impl Iterator for DeploymentSchedule {
    type Item = DeploymentScheduleEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted || self.cycle >= self.deployment_count {
            return None;
        }

        // Checked against the last cycle in `deploy`
        let offset = u64::from(self.frequency_days) * u64::from(self.cycle);
        let date = self.start_date.checked_add_days(Days::new(offset))?;
        self.cycle += 1;

        let cash_interest = self.source_balance * self.cash_rate;
        self.source_balance += cash_interest;

        let withdrawal = self.payment.min(self.source_balance).max(Decimal::ZERO);
        self.source_balance -= withdrawal;
        self.destination_balance += withdrawal;

        let growth = self.destination_balance * self.market_rate;
        self.destination_balance += growth;

        if self.source_balance <= Decimal::ZERO {
            self.exhausted = true;
        }

        debug!(
            "cycle {} ({}): withdraw={} cash={} market={}",
            self.cycle, date, withdrawal, self.source_balance, self.destination_balance
        );

        Some(DeploymentScheduleEntry {
            period_index: self.cycle,
            date,
            withdrawal_amount: to_display(withdrawal),
            source_interest_accrued: to_display(cash_interest),
            source_balance_after: to_display(self.source_balance.max(Decimal::ZERO)),
            destination_deposit: to_display(withdrawal),
            destination_growth: to_display(growth),
            destination_balance_after: to_display(self.destination_balance),
        })
    }
}

impl std::iter::FusedIterator for DeploymentSchedule {}

/// Total money moved into the destination over a set of entries.
pub fn total_deployed(entries: &[DeploymentScheduleEntry]) -> Money {
    entries.iter().map(|e| e.destination_deposit).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn test_monthly_year_of_deployments() {
        let entries: Vec<_> = deploy(dec!(10000), 30, 12, dec!(0.02), dec!(0.08), start())
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 12);

        let first = &entries[0];
        assert_eq!(first.withdrawal_amount, dec!(842.18));
        assert_eq!(first.source_interest_accrued, dec!(16.29));
        assert_eq!(first.source_balance_after, dec!(9174.11));
        assert_eq!(first.destination_growth, dec!(5.34));
        assert_eq!(first.date, start());

        let last = entries.last().unwrap();
        assert_eq!(last.source_balance_after, Decimal::ZERO);
        assert_eq!(last.date, NaiveDate::from_ymd_opt(2025, 11, 27).unwrap());
        assert!((last.destination_balance_after - dec!(10532.90)).abs() <= dec!(0.01));
    }

    #[test]
    fn test_source_shrinks_destination_grows() {
        let entries: Vec<_> = deploy(dec!(5000), 7, 10, dec!(0.04), dec!(0.07), start())
            .unwrap()
            .collect();
        for pair in entries.windows(2) {
            assert!(pair[1].source_balance_after <= pair[0].source_balance_after);
            assert!(pair[1].destination_balance_after >= pair[0].destination_balance_after);
        }
    }

    #[test]
    fn test_zero_cash_rate_splits_evenly() {
        let entries: Vec<_> = deploy(dec!(1000), 14, 4, Decimal::ZERO, Decimal::ZERO, start())
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|e| e.withdrawal_amount == dec!(250)));
        assert_eq!(total_deployed(&entries), dec!(1000));
    }

    #[test]
    fn test_negative_cash_rate_exhausts_early() {
        // Even split while cash loses value runs dry before the last cycle
        let entries: Vec<_> = deploy(dec!(1000), 30, 4, dec!(-0.9), dec!(0.05), start())
            .unwrap()
            .collect();
        assert!(entries.len() < 4);
        assert_eq!(entries.last().unwrap().source_balance_after, Decimal::ZERO);
    }

    #[test]
    fn test_schedule_past_last_date_rejected() {
        let late = NaiveDate::MAX - Days::new(40);
        let err = deploy(dec!(1000), 30, 3, dec!(0.02), dec!(0.08), late).unwrap_err();
        assert!(matches!(err, CashPlanError::InvalidParameter { ref field, .. } if field == "start_date"));
        // Two cycles still fit
        assert_eq!(
            deploy(dec!(1000), 30, 2, dec!(0.02), dec!(0.08), late).unwrap().count(),
            2
        );
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(deploy(Decimal::ZERO, 30, 12, dec!(0.02), dec!(0.08), start()).is_err());
        assert!(deploy(dec!(100), 0, 12, dec!(0.02), dec!(0.08), start()).is_err());
        assert!(deploy(dec!(100), 30, 0, dec!(0.02), dec!(0.08), start()).is_err());
        assert!(matches!(
            deploy(dec!(100), 30, 12, dec!(-1), dec!(0.08), start()).unwrap_err(),
            CashPlanError::DomainError { .. }
        ));
    }
}
