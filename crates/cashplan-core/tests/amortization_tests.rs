use cashplan_core::amortization::amortize;
use cashplan_core::annuity::solve_payment;
use cashplan_core::payoff::{plan_payoff, PayoffInput, PayoffMode};
use cashplan_core::CashPlanError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Annuity payment tests
// ===========================================================================

#[test]
fn test_zero_rate_payment_is_exact_split() {
    for n in [1u32, 3, 7, 12, 360] {
        let principal = dec!(1234.56);
        assert_eq!(
            solve_payment(principal, Decimal::ZERO, n).unwrap(),
            principal / Decimal::from(n)
        );
    }
}

#[test]
fn test_payment_clears_loan_in_requested_periods() {
    for (principal, rate, n) in [
        (dec!(1000), dec!(0.01), 6u32),
        (dec!(50000), dec!(0.005), 120),
        (dec!(750), dec!(0.02), 1),
    ] {
        let payment = solve_payment(principal, rate, n).unwrap();
        let records: Vec<_> = amortize(principal, rate, payment).unwrap().collect();
        assert_eq!(records.len() as u32, n, "{principal} at {rate} over {n}");
    }
}

// ===========================================================================
// Amortization invariants
// ===========================================================================

#[test]
fn test_schedule_reaches_zero_and_balances() {
    for (principal, rate, payment) in [
        (dec!(1000), dec!(0.01), dec!(200)),
        (dec!(20000), dec!(0.0075), dec!(450)),
        (dec!(999.99), Decimal::ZERO, dec!(100)),
        (dec!(5000), dec!(0.015), dec!(75.01)),
    ] {
        let records: Vec<_> = amortize(principal, rate, payment).unwrap().collect();
        let last = records.last().expect("at least one period");
        assert_eq!(last.remaining_balance, Decimal::ZERO);

        let total_interest: Decimal = records.iter().map(|r| r.interest_portion).sum();
        let total_paid: Decimal = records.iter().map(|r| r.payment).sum();
        assert!(
            (total_interest + principal - total_paid).abs() < dec!(0.0000001),
            "interest {total_interest} + principal {principal} != paid {total_paid}"
        );

        for pair in records.windows(2) {
            assert_eq!(pair[1].period_index, pair[0].period_index + 1);
            assert!(pair[1].remaining_balance <= pair[0].remaining_balance);
        }
        for r in &records {
            assert_eq!(r.interest_portion + r.principal_portion, r.payment);
            assert!(r.remaining_balance >= Decimal::ZERO);
        }
    }
}

#[test]
fn test_known_schedule_1000_at_one_percent() {
    let records: Vec<_> = amortize(dec!(1000), dec!(0.01), dec!(200))
        .unwrap()
        .map(|r| r.rounded())
        .collect();
    let balances: Vec<Decimal> = records.iter().map(|r| r.remaining_balance).collect();
    assert_eq!(
        balances,
        vec![dec!(810.00), dec!(618.10), dec!(424.28), dec!(228.52), dec!(30.81), dec!(0.00)]
    );
    assert_eq!(records[5].payment, dec!(31.12));
}

#[test]
fn test_non_convergence_boundary_and_below() {
    for payment in [dec!(10), dec!(9.99), dec!(1), Decimal::ZERO] {
        let err = amortize(dec!(1000), dec!(0.01), payment).unwrap_err();
        assert!(
            matches!(err, CashPlanError::NonConvergence { .. }),
            "payment {payment} gave {err:?}"
        );
    }
    assert!(amortize(dec!(1000), dec!(0.01), dec!(10.01)).is_ok());
}

#[test]
fn test_non_convergence_message_names_condition() {
    let err = amortize(dec!(1000), dec!(0.01), dec!(10)).unwrap_err();
    assert!(err.to_string().contains("never paid off"));
}

// ===========================================================================
// Payoff planner
// ===========================================================================

#[test]
fn test_payoff_modes_agree() {
    // Paying the solved level payment reproduces the fixed-term plan
    let term = plan_payoff(&PayoffInput {
        annual_rate: dec!(0.09),
        borrowed: dec!(8000),
        mode: PayoffMode::FixedTerm { months: 24 },
    })
    .unwrap()
    .result;

    let payment = solve_payment(dec!(8000), dec!(0.0075), 24).unwrap();
    let fixed = plan_payoff(&PayoffInput {
        annual_rate: dec!(0.09),
        borrowed: dec!(8000),
        mode: PayoffMode::FixedPayment { payment },
    })
    .unwrap()
    .result;

    assert_eq!(term.months_to_payoff, fixed.months_to_payoff);
    assert_eq!(term.total_interest, fixed.total_interest);
}

#[test]
fn test_payoff_rejects_zero_term() {
    let err = plan_payoff(&PayoffInput {
        annual_rate: dec!(0.09),
        borrowed: dec!(8000),
        mode: PayoffMode::FixedTerm { months: 0 },
    })
    .unwrap_err();
    assert!(matches!(err, CashPlanError::InvalidParameter { .. }));
}

#[test]
fn test_payoff_input_from_json() {
    let input: PayoffInput = serde_json::from_str(
        r#"{"annual_rate": "0.12", "borrowed": "1000", "mode": {"fixed_payment": {"payment": "200"}}}"#,
    )
    .unwrap();
    let plan = plan_payoff(&input).unwrap().result;
    assert_eq!(plan.months_to_payoff, 6);
}

#[test]
fn test_payoff_with_tiny_payment_hits_period_limit() {
    let err = plan_payoff(&PayoffInput {
        annual_rate: Decimal::ZERO,
        borrowed: dec!(1000000000),
        mode: PayoffMode::FixedPayment { payment: dec!(0.01) },
    })
    .unwrap_err();
    assert!(matches!(err, CashPlanError::PeriodLimit { .. }));
    assert!(err.to_string().contains("raise the payment"));
}
