//! Exchange-rate provider port
//!
//! The institution prices currency exchange asymmetrically: the buy rate is
//! used when it acquires foreign currency from the customer (deposits), the
//! sell rate when it disburses foreign currency (withdrawals, inquiries).

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::result::Result;

/// A buy/sell rate pair as published by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateQuote {
    /// Colones paid per foreign unit bought from the customer
    pub buy: Decimal,
    /// Colones charged per foreign unit sold to the customer
    pub sell: Decimal,
    pub as_of: NaiveDate,
}

/// Exchange-rate provider abstraction
///
/// Refresh cadence is the implementation's concern (at most once per
/// process run in production). Failure must surface as an explicit error;
/// implementations never hand back a zero or placeholder rate for a
/// committed operation.
pub trait RateProvider: Send + Sync {
    /// The latest successfully fetched quote
    fn quote(&self) -> Result<RateQuote>;
}
