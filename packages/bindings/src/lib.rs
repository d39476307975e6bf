use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Serialize;

use cashplan_core::RatePeriod;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[derive(Serialize)]
struct ConvertedRate {
    rate: Decimal,
    period_days: u32,
}

// ---------------------------------------------------------------------------
// Rates
// ---------------------------------------------------------------------------

/// `{"rate": "0.01", "period_days": 1}` -> effective annual rate.
#[napi]
pub fn annualize(input_json: String) -> NapiResult<String> {
    let input: RatePeriod = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let annual = input.annualized().map_err(to_napi_error)?;
    let output = ConvertedRate {
        rate: annual,
        period_days: cashplan_core::rates::DAYS_PER_YEAR,
    };
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// `{"rate": "0.05", "period_days": 30}` -> equivalent rate per period.
#[napi]
pub fn periodic_rate(input_json: String) -> NapiResult<String> {
    let input: RatePeriod = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rate =
        cashplan_core::rates::periodic_rate(input.rate, input.period_days).map_err(to_napi_error)?;
    let output = ConvertedRate {
        rate,
        period_days: input.period_days,
    };
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Planners
// ---------------------------------------------------------------------------

#[napi]
pub fn evaluate_margin(input_json: String) -> NapiResult<String> {
    let input: cashplan_core::margin::MarginInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = cashplan_core::margin::evaluate_margin(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn plan_payoff(input_json: String) -> NapiResult<String> {
    let input: cashplan_core::payoff::PayoffInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = cashplan_core::payoff::plan_payoff(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn plan_deployment(input_json: String) -> NapiResult<String> {
    let input: cashplan_core::deployment::DeploymentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = cashplan_core::deployment::plan_deployment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
