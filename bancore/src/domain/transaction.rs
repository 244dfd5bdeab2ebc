//! Transaction domain model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::result::{Error, Result};

/// Kind of money-movement event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    DepositLocal,
    DepositForeign,
    WithdrawLocal,
    WithdrawForeign,
    TransferOut,
    TransferIn,
}

impl TransactionKind {
    /// Human-readable label for statements
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::DepositLocal => "deposit (colones)",
            TransactionKind::DepositForeign => "deposit (foreign currency)",
            TransactionKind::WithdrawLocal => "withdrawal (colones)",
            TransactionKind::WithdrawForeign => "withdrawal (foreign currency)",
            TransactionKind::TransferOut => "transfer out",
            TransactionKind::TransferIn => "transfer in",
        }
    }
}

/// A single journal entry, immutable once created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub account_code: String,
    pub kind: TransactionKind,
    /// Gross amount before fee, in colones
    pub amount: Decimal,
    pub fee_applied: bool,
    pub fee_amount: Decimal,
    /// The other account involved in a transfer
    pub counterpart: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl TransactionRecord {
    /// Create a record stamped with the current time
    pub fn new(
        account_code: impl Into<String>,
        kind: TransactionKind,
        amount: Decimal,
        fee_amount: Decimal,
    ) -> Self {
        Self::at(Utc::now(), account_code, kind, amount, fee_amount)
    }

    /// Create a record with an explicit timestamp
    ///
    /// The two legs of a transfer are stamped with the same instant.
    pub fn at(
        timestamp: DateTime<Utc>,
        account_code: impl Into<String>,
        kind: TransactionKind,
        amount: Decimal,
        fee_amount: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_code: account_code.into(),
            kind,
            amount,
            fee_applied: fee_amount > Decimal::ZERO,
            fee_amount,
            counterpart: None,
            timestamp,
        }
    }

    /// Tag the record with the counterpart account of a transfer
    pub fn with_counterpart(mut self, code: impl Into<String>) -> Self {
        self.counterpart = Some(code.into());
        self
    }
}

/// Validate that a money-movement amount is a positive whole number of
/// currency units
pub fn ensure_whole_positive(amount: Decimal, what: &str) -> Result<()> {
    if amount <= Decimal::ZERO || !amount.fract().is_zero() {
        return Err(Error::validation(format!(
            "{what} must be a whole number greater than zero"
        )));
    }
    Ok(())
}
