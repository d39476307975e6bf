use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CashPlanError {
    #[error("Invalid parameter: {field}: {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("Domain error: {field}: {reason}")]
    DomainError { field: String, reason: String },

    #[error(
        "Non-convergence: payment of {payment} does not exceed the {interest} of interest \
         accrued per period; the loan is never paid off"
    )]
    NonConvergence { payment: Decimal, interest: Decimal },

    #[error("Period limit: the schedule would run past {limit} periods; raise the payment")]
    PeriodLimit { limit: u32 },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CashPlanError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        CashPlanError::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn domain(field: &str, reason: impl Into<String>) -> Self {
        CashPlanError::DomainError {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for CashPlanError {
    fn from(e: serde_json::Error) -> Self {
        CashPlanError::SerializationError(e.to_string())
    }
}
