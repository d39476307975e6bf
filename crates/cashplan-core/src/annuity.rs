use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::CashPlanError;
use crate::types::{Money, Rate};
use crate::CashPlanResult;

/// Level payment that fully amortizes `principal` over `n_periods`:
/// `P * i * (1+i)^n / ((1+i)^n - 1)`, or `P / n` when the rate is zero.
pub fn solve_payment(principal: Money, per_period_rate: Rate, n_periods: u32) -> CashPlanResult<Money> {
    if principal <= Decimal::ZERO {
        return Err(CashPlanError::invalid("principal", "Principal must be positive"));
    }
    if n_periods == 0 {
        return Err(CashPlanError::invalid(
            "n_periods",
            "Number of periods must be > 0",
        ));
    }
    if per_period_rate <= dec!(-1) {
        return Err(CashPlanError::domain(
            "per_period_rate",
            "Periodic rate must be greater than -100%",
        ));
    }

    if per_period_rate.is_zero() {
        return Ok(principal / Decimal::from(n_periods));
    }

    let factor = growth_factor(per_period_rate, n_periods)?;
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Err(CashPlanError::domain(
            "per_period_rate",
            "Rate too small to distinguish from zero over the term",
        ));
    }

    Ok(principal * per_period_rate * factor / denominator)
}

/// Level withdrawal that draws `balance` down to zero in `n_periods` equal
/// withdrawals while the remainder keeps earning `per_period_rate`, with
/// interest credited before each withdrawal.
///
/// This is the present value of an ordinary annuity solved for the payment,
/// `B / ((1 - (1+i)^-n) / i)`. Only strictly positive rates take the
/// annuity branch; anything else splits the balance evenly.
pub fn level_withdrawal(balance: Money, per_period_rate: Rate, n_periods: u32) -> CashPlanResult<Money> {
    if balance <= Decimal::ZERO {
        return Err(CashPlanError::invalid("balance", "Balance must be positive"));
    }
    if n_periods == 0 {
        return Err(CashPlanError::invalid(
            "n_periods",
            "Number of withdrawals must be > 0",
        ));
    }

    if per_period_rate <= Decimal::ZERO {
        return Ok(balance / Decimal::from(n_periods));
    }

    let discount = Decimal::ONE / growth_factor(per_period_rate, n_periods)?;
    let annuity_factor = (Decimal::ONE - discount) / per_period_rate;
    if annuity_factor.is_zero() {
        return Err(CashPlanError::domain(
            "per_period_rate",
            "Annuity factor collapsed to zero",
        ));
    }

    Ok(balance / annuity_factor)
}

/// `(1 + i)^n` for an integer period count.
fn growth_factor(rate: Rate, n_periods: u32) -> CashPlanResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powu(u64::from(n_periods))
        .ok_or_else(|| {
            CashPlanError::domain(
                "per_period_rate",
                format!("(1 + {rate})^{n_periods} is outside the representable range"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rate_splits_evenly() {
        assert_eq!(solve_payment(dec!(1200), Decimal::ZERO, 12).unwrap(), dec!(100));
        assert_eq!(level_withdrawal(dec!(1200), Decimal::ZERO, 12).unwrap(), dec!(100));
    }

    #[test]
    fn test_solve_payment_textbook() {
        // 10,000 at 1% per month over 12 months ≈ 888.49
        let pmt = solve_payment(dec!(10000), dec!(0.01), 12).unwrap();
        assert!((pmt - dec!(888.49)).abs() < dec!(0.01), "got {pmt}");
    }

    #[test]
    fn test_single_period_repays_with_interest() {
        let pmt = solve_payment(dec!(1000), dec!(0.05), 1).unwrap();
        assert_eq!(pmt.round_dp(10), dec!(1050));
    }

    #[test]
    fn test_level_withdrawal_differs_from_loan_payment_only_in_sizing() {
        // For the same rate and term both formulas describe an ordinary annuity
        let i = dec!(0.004);
        let loan = solve_payment(dec!(5000), i, 24).unwrap();
        let draw = level_withdrawal(dec!(5000), i, 24).unwrap();
        assert!((loan - draw).abs() < dec!(0.000001));
    }

    #[test]
    fn test_negative_rate_withdrawal_splits_evenly() {
        let draw = level_withdrawal(dec!(900), dec!(-0.01), 3).unwrap();
        assert_eq!(draw, dec!(300));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            solve_payment(dec!(1000), dec!(0.01), 0).unwrap_err(),
            CashPlanError::InvalidParameter { .. }
        ));
        assert!(matches!(
            solve_payment(Decimal::ZERO, dec!(0.01), 12).unwrap_err(),
            CashPlanError::InvalidParameter { .. }
        ));
        assert!(matches!(
            solve_payment(dec!(1000), dec!(-1), 12).unwrap_err(),
            CashPlanError::DomainError { .. }
        ));
        assert!(level_withdrawal(dec!(-5), dec!(0.01), 12).is_err());
    }
}
