use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use crate::error::CashPlanError;
use crate::types::{with_metadata, ComputationOutput, Rate, RatePeriod};
use crate::CashPlanResult;

const WEIGHT_SUM_TOLERANCE: Decimal = dec!(0.000001);

/// Look-back windows and weights used when none are supplied.
pub const STANDARD_WINDOWS: [(&str, u32, Decimal); 5] = [
    ("1d", 1, dec!(0.10)),
    ("1w", 7, dec!(0.20)),
    ("1m", 30, dec!(0.30)),
    ("3m", 90, dec!(0.25)),
    ("1y", 365, dec!(0.15)),
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Portfolio return observed over a labelled look-back window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodReturn {
    pub label: String,
    pub period_days: u32,
    pub period_return: Rate,
}

/// Weight per window label. Weights must be non-negative and sum to one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlendWeights(BTreeMap<String, Rate>);

impl BlendWeights {
    pub fn standard() -> Self {
        STANDARD_WINDOWS
            .iter()
            .map(|(label, _, weight)| (label.to_string(), *weight))
            .collect()
    }

    pub fn get(&self, label: &str) -> Option<Rate> {
        self.0.get(label).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Rate)> {
        self.0.iter()
    }

    pub fn total(&self) -> Rate {
        self.0.values().sum()
    }

    /// Check every weight is in `[0, 1]` and that they sum to one.
    pub fn validate(&self) -> CashPlanResult<()> {
        if self.0.is_empty() {
            return Err(CashPlanError::invalid("weights", "At least one weight is required"));
        }
        for (label, weight) in &self.0 {
            if *weight < Decimal::ZERO || *weight > Decimal::ONE {
                return Err(CashPlanError::invalid(
                    "weights",
                    format!("Weight for '{label}' must be between 0 and 1, got {weight}"),
                ));
            }
        }
        let total = self.total();
        if (total - Decimal::ONE).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(CashPlanError::invalid(
                "weights",
                format!("Weights must sum to 1, got {total}"),
            ));
        }
        Ok(())
    }
}

impl FromIterator<(String, Rate)> for BlendWeights {
    fn from_iter<I: IntoIterator<Item = (String, Rate)>>(iter: I) -> Self {
        BlendWeights(iter.into_iter().collect())
    }
}

/// Input parameters for the margin evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarginInput {
    pub period_returns: Vec<PeriodReturn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<BlendWeights>,
    pub dividend_yield: Rate,
    pub margin_rate: Rate,
}

impl MarginInput {
    /// Input over the standard 1d / 1w / 1m / 3m / 1y windows.
    pub fn standard(returns: [Rate; 5], dividend_yield: Rate, margin_rate: Rate) -> Self {
        let period_returns = STANDARD_WINDOWS
            .iter()
            .zip(returns)
            .map(|((label, days, _), period_return)| PeriodReturn {
                label: label.to_string(),
                period_days: *days,
                period_return,
            })
            .collect();
        Self {
            period_returns,
            weights: None,
            dividend_yield,
            margin_rate,
        }
    }
}

/// How the expected return compares with the cost of borrowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginVerdict {
    /// Net return exceeds the margin rate itself (2x+ return vs. cost).
    Favorable,
    /// Positive but thin spread over the cost.
    Marginal,
    /// Borrowing costs at least as much as the position earns.
    Unfavorable,
}

impl MarginVerdict {
    pub fn classify(net_margin_return: Rate, margin_rate: Rate) -> Self {
        if net_margin_return > margin_rate {
            MarginVerdict::Favorable
        } else if net_margin_return > Decimal::ZERO {
            MarginVerdict::Marginal
        } else {
            MarginVerdict::Unfavorable
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            MarginVerdict::Favorable => "This position may justify using margin (2x+ return vs. cost).",
            MarginVerdict::Marginal => {
                "Marginal benefit. Keep monitoring: you are earning slightly more than the cost."
            }
            MarginVerdict::Unfavorable => {
                "Not currently worth margin use. Consider reducing exposure."
            }
        }
    }
}

/// One window after annualization and weighting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnualizedPeriod {
    pub label: String,
    pub period_days: u32,
    pub period_return: Rate,
    pub annualized_return: Rate,
    pub weight: Rate,
    pub contribution: Rate,
}

/// Output of `evaluate_margin`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarginOutput {
    pub weighted_annual_return: Rate,
    pub dividend_yield: Rate,
    pub total_expected_return: Rate,
    pub margin_rate: Rate,
    pub net_margin_return: Rate,
    pub verdict: MarginVerdict,
    pub guidance: String,
    pub periods: Vec<AnnualizedPeriod>,
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Weighted blend of annualized window returns, compared with the margin
/// interest rate.
pub fn evaluate_margin(input: &MarginInput) -> CashPlanResult<ComputationOutput<MarginOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.period_returns.is_empty() {
        return Err(CashPlanError::invalid(
            "period_returns",
            "At least one period return is required",
        ));
    }

    let weights = input.weights.clone().unwrap_or_else(BlendWeights::standard);
    weights.validate()?;
    check_labels(&input.period_returns, &weights)?;

    let mut periods = Vec::with_capacity(input.period_returns.len());
    let mut weighted_annual_return = Decimal::ZERO;

    for pr in &input.period_returns {
        let annualized_return = RatePeriod::new(pr.period_return, pr.period_days)
            .annualized()
            .map_err(|e| match e {
                CashPlanError::DomainError { reason, .. } => CashPlanError::DomainError {
                    field: format!("period_returns.{}", pr.label),
                    reason,
                },
                other => other,
            })?;
        // Labels were checked against the weights above
        let weight = weights.get(&pr.label).unwrap_or(Decimal::ZERO);
        let contribution = annualized_return * weight;
        weighted_annual_return += contribution;

        debug!(
            "{}: {} over {}d annualizes to {} (weight {})",
            pr.label, pr.period_return, pr.period_days, annualized_return, weight
        );
        if pr.period_days < 30 && annualized_return.abs() > Decimal::ONE {
            warnings.push(format!(
                "'{}' annualizes a {}-day return to {}; short windows extrapolate noisily",
                pr.label, pr.period_days, annualized_return
            ));
        }

        periods.push(AnnualizedPeriod {
            label: pr.label.clone(),
            period_days: pr.period_days,
            period_return: pr.period_return,
            annualized_return,
            weight,
            contribution,
        });
    }

    let total_expected_return = weighted_annual_return + input.dividend_yield;
    let net_margin_return = total_expected_return - input.margin_rate;
    let verdict = MarginVerdict::classify(net_margin_return, input.margin_rate);

    let output = MarginOutput {
        weighted_annual_return,
        dividend_yield: input.dividend_yield,
        total_expected_return,
        margin_rate: input.margin_rate,
        net_margin_return,
        verdict,
        guidance: verdict.guidance().to_string(),
        periods,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Weighted annualized blended return vs. margin cost",
        &serde_json::json!({
            "weights": weights,
            "dividend_yield": input.dividend_yield.to_string(),
            "margin_rate": input.margin_rate.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn check_labels(returns: &[PeriodReturn], weights: &BlendWeights) -> CashPlanResult<()> {
    let mut seen = BTreeSet::new();
    for pr in returns {
        if !seen.insert(pr.label.as_str()) {
            return Err(CashPlanError::invalid(
                "period_returns",
                format!("Duplicate period label '{}'", pr.label),
            ));
        }
        if weights.get(&pr.label).is_none() {
            return Err(CashPlanError::invalid(
                "weights",
                format!("No weight configured for period '{}'", pr.label),
            ));
        }
    }
    if let Some((label, _)) = weights.iter().find(|(label, _)| !seen.contains(label.as_str())) {
        return Err(CashPlanError::invalid(
            "period_returns",
            format!("Weight configured for '{label}' but no return supplied"),
        ));
    }
    Ok(())
}
