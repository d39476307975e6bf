use cashplan_core::margin::{evaluate_margin, BlendWeights, MarginInput, MarginVerdict, PeriodReturn};
use cashplan_core::rates::annualize;
use cashplan_core::CashPlanError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Margin evaluator tests
// ===========================================================================

fn sample_input() -> MarginInput {
    // 0.1% day, 0.5% week, 1.5% month, 4% quarter, 12% year
    MarginInput::standard(
        [dec!(0.001), dec!(0.005), dec!(0.015), dec!(0.04), dec!(0.12)],
        dec!(0.015),
        dec!(0.07),
    )
}

#[test]
fn test_blend_is_weighted_sum_of_annualized_windows() {
    let input = sample_input();
    let result = evaluate_margin(&input).unwrap().result;

    let expected: Decimal = [
        (dec!(0.001), 1u32, dec!(0.10)),
        (dec!(0.005), 7, dec!(0.20)),
        (dec!(0.015), 30, dec!(0.30)),
        (dec!(0.04), 90, dec!(0.25)),
        (dec!(0.12), 365, dec!(0.15)),
    ]
    .iter()
    .map(|(r, d, w)| annualize(*r, *d).unwrap() * w)
    .sum();

    assert_eq!(result.weighted_annual_return, expected);
    assert_eq!(result.total_expected_return, expected + dec!(0.015));
    assert_eq!(result.net_margin_return, expected + dec!(0.015) - dec!(0.07));
    assert_eq!(result.periods.len(), 5);
}

#[test]
fn test_sample_is_favorable() {
    // Blend ≈ 22.4%, plus 1.5% dividend, minus 7% margin ≈ 16.9% > 7%
    let result = evaluate_margin(&sample_input()).unwrap().result;
    assert_eq!(result.verdict, MarginVerdict::Favorable);
    assert!(result.guidance.contains("2x+"));
}

#[test]
fn test_deep_weekly_loss_still_evaluates() {
    let input = MarginInput::standard(
        [dec!(-0.05), dec!(-0.8), dec!(-0.1), dec!(-0.2), dec!(-0.3)],
        dec!(0.01),
        dec!(0.07),
    );
    let result = evaluate_margin(&input).unwrap();
    let week = result.result.periods.iter().find(|p| p.label == "1w").unwrap();
    assert!((week.annualized_return - dec!(-1)).abs() < dec!(0.000000001));
    assert_eq!(result.result.verdict, MarginVerdict::Unfavorable);
}

#[test]
fn test_losing_portfolio_is_unfavorable() {
    let input = MarginInput::standard(
        [dec!(-0.002), dec!(-0.01), dec!(-0.02), dec!(-0.05), dec!(-0.08)],
        dec!(0.01),
        dec!(0.065),
    );
    let result = evaluate_margin(&input).unwrap().result;
    assert!(result.net_margin_return < Decimal::ZERO);
    assert_eq!(result.verdict, MarginVerdict::Unfavorable);
}

#[test]
fn test_injected_weights_replace_defaults() {
    let mut input = sample_input();
    let only_year: BlendWeights = [
        ("1d".to_string(), dec!(0)),
        ("1w".to_string(), dec!(0)),
        ("1m".to_string(), dec!(0)),
        ("3m".to_string(), dec!(0)),
        ("1y".to_string(), dec!(1)),
    ]
    .into_iter()
    .collect();
    input.weights = Some(only_year);

    let result = evaluate_margin(&input).unwrap().result;
    assert_eq!(result.weighted_annual_return, dec!(0.12));
}

#[test]
fn test_weights_from_json() {
    let input: MarginInput = serde_json::from_str(
        r#"{
            "period_returns": [
                {"label": "1m", "period_days": 30, "period_return": "0.01"},
                {"label": "1y", "period_days": 365, "period_return": "0.09"}
            ],
            "weights": {"1m": "0.4", "1y": "0.6"},
            "dividend_yield": "0",
            "margin_rate": "0.05"
        }"#,
    )
    .unwrap();
    let result = evaluate_margin(&input).unwrap();
    assert_eq!(result.result.periods[1].contribution, dec!(0.054));
}

#[test]
fn test_weight_out_of_range_rejected() {
    let mut input = sample_input();
    input.weights = Some(
        [
            ("1d".to_string(), dec!(-0.1)),
            ("1w".to_string(), dec!(0.2)),
            ("1m".to_string(), dec!(0.3)),
            ("3m".to_string(), dec!(0.3)),
            ("1y".to_string(), dec!(0.3)),
        ]
        .into_iter()
        .collect(),
    );
    assert!(matches!(
        evaluate_margin(&input).unwrap_err(),
        CashPlanError::InvalidParameter { .. }
    ));
}

#[test]
fn test_duplicate_label_rejected() {
    let mut input = sample_input();
    input.period_returns.push(PeriodReturn {
        label: "1d".into(),
        period_days: 1,
        period_return: dec!(0.002),
    });
    let err = evaluate_margin(&input).unwrap_err();
    assert!(err.to_string().contains("Duplicate"));
}

#[test]
fn test_unused_weight_rejected() {
    let mut input = sample_input();
    input.period_returns.retain(|p| p.label != "3m");
    let err = evaluate_margin(&input).unwrap_err();
    assert!(err.to_string().contains("3m"));
}
