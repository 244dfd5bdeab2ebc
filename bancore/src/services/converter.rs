//! Currency converter - colones/foreign currency conversion
//!
//! Deposits convert at the buy rate, withdrawals and balance inquiries at
//! the sell rate. Foreign-currency operation amounts must be whole units.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::ensure_whole_positive;
use crate::domain::result::{Error, Result};
use crate::ports::RateProvider;

/// Result of one conversion, carrying the rate that was used
#[derive(Debug, Clone, Copy)]
pub struct Conversion {
    pub amount: Decimal,
    pub rate: Decimal,
    pub as_of: NaiveDate,
}

/// Converts between colones and foreign currency using provider rates
pub struct CurrencyConverter {
    rates: Arc<dyn RateProvider>,
}

impl CurrencyConverter {
    pub fn new(rates: Arc<dyn RateProvider>) -> Self {
        Self { rates }
    }

    /// Colones credited for a foreign-currency deposit (buy rate)
    pub fn to_local(&self, amount_foreign: Decimal) -> Result<Conversion> {
        ensure_whole_positive(amount_foreign, "foreign-currency amount")?;
        let quote = self.rates.quote()?;
        Ok(Conversion {
            amount: (amount_foreign * quote.buy).round_dp(2),
            rate: quote.buy,
            as_of: quote.as_of,
        })
    }

    /// Colones debited for a foreign-currency withdrawal (sell rate)
    pub fn local_value_at_sell(&self, amount_foreign: Decimal) -> Result<Conversion> {
        ensure_whole_positive(amount_foreign, "foreign-currency amount")?;
        let quote = self.rates.quote()?;
        Ok(Conversion {
            amount: (amount_foreign * quote.sell).round_dp(2),
            rate: quote.sell,
            as_of: quote.as_of,
        })
    }

    /// Foreign-currency view of a colones balance (sell rate)
    pub fn to_foreign(&self, amount_local: Decimal) -> Result<Conversion> {
        let quote = self.rates.quote()?;
        if quote.sell <= Decimal::ZERO {
            return Err(Error::RateUnavailable(
                "provider returned a non-positive sell rate".to_string(),
            ));
        }
        Ok(Conversion {
            amount: (amount_local / quote.sell).round_dp(2),
            rate: quote.sell,
            as_of: quote.as_of,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{FixedRateProvider, UnavailableRateProvider};

    fn converter() -> CurrencyConverter {
        // buy 520.00, sell 528.50
        CurrencyConverter::new(Arc::new(FixedRateProvider::new(
            Decimal::new(52000, 2),
            Decimal::new(52850, 2),
        )))
    }

    #[test]
    fn test_deposit_converts_at_buy_rate() {
        let conversion = converter().to_local(Decimal::new(100, 0)).unwrap();
        assert_eq!(conversion.amount, Decimal::new(5200000, 2)); // 52000.00
        assert_eq!(conversion.rate, Decimal::new(52000, 2));
    }

    #[test]
    fn test_withdrawal_converts_at_sell_rate() {
        let conversion = converter().local_value_at_sell(Decimal::new(10, 0)).unwrap();
        assert_eq!(conversion.amount, Decimal::new(528500, 2)); // 5285.00
    }

    #[test]
    fn test_balance_inquiry_uses_sell_rate() {
        let conversion = converter().to_foreign(Decimal::new(105700, 0)).unwrap();
        // 105700 / 528.50 = 200.00
        assert_eq!(conversion.amount, Decimal::new(20000, 2));
    }

    #[test]
    fn test_fractional_foreign_amount_rejected() {
        let err = converter().to_local(Decimal::new(1005, 1)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        let err = converter().local_value_at_sell(Decimal::new(-3, 0)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_provider_failure_propagates() {
        let converter = CurrencyConverter::new(Arc::new(UnavailableRateProvider));
        let err = converter.to_local(Decimal::new(100, 0)).unwrap_err();
        assert!(matches!(err, Error::RateUnavailable(_)));
    }
}
