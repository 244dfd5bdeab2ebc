//! Commission fee policy
//!
//! The first 5 transactions on an account are free; the 6th and every
//! subsequent one pays 2% of the gross amount. Both constants are part of
//! the external contract.

use rust_decimal::Decimal;

/// Number of fee-free transactions at the start of an account's life
pub const FREE_TRANSACTIONS: u32 = 5;

/// Commission rate applied from the sixth transaction onward (2%)
pub fn commission_rate() -> Decimal {
    Decimal::new(2, 2)
}

/// Computes the commission owed on a money-movement operation
#[derive(Debug, Clone, Copy, Default)]
pub struct FeePolicy;

impl FeePolicy {
    /// Fee for a transaction of `amount` given how many journal entries the
    /// account already has
    ///
    /// Fee applies when `prior_transaction_count >= 5`, i.e. this would be
    /// the account's 6th or later transaction.
    pub fn fee(&self, amount: Decimal, prior_transaction_count: u32) -> Decimal {
        if prior_transaction_count >= FREE_TRANSACTIONS {
            (amount * commission_rate()).round_dp(2)
        } else {
            Decimal::ZERO
        }
    }
}
