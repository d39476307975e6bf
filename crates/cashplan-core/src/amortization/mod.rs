pub mod schedule;

pub use schedule::{amortize, AmortizationRecord, AmortizationSchedule};
