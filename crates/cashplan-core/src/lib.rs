pub mod annuity;
pub mod error;
pub mod rates;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "deployment")]
pub mod deployment;

#[cfg(feature = "margin")]
pub mod margin;

#[cfg(feature = "payoff")]
pub mod payoff;

pub use error::CashPlanError;
pub use types::*;

/// Standard result type for all cashplan operations
pub type CashPlanResult<T> = Result<T, CashPlanError>;
