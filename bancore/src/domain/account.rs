//! Account domain model

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

/// Prefix for sequentially assigned account codes ("CTA-1", "CTA-2", ...)
const CODE_PREFIX: &str = "CTA-";

/// Lifecycle status of an account
///
/// Deleted accounts stay in the registry; the status flag is the only
/// tombstone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    Active,
    Deleted,
}

/// A bank account holding a balance in colones
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique sequential code, immutable once assigned
    pub code: String,
    /// Identification of the owning customer (non-owning reference)
    pub owner_id: i64,
    /// Non-negative balance in colones, 2dp at rest
    pub balance: Decimal,
    /// Argon2 PHC string; the clear PIN is never stored
    pub pin_hash: String,
    pub status: AccountStatus,
    /// Number of journal entries ever appended; never decreases
    pub transaction_count: u32,
    pub created_at: NaiveDate,
}

impl Account {
    /// Create a new active account
    pub fn new(
        code: impl Into<String>,
        owner_id: i64,
        balance: Decimal,
        pin_hash: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            owner_id,
            balance,
            pin_hash: pin_hash.into(),
            status: AccountStatus::Active,
            transaction_count: 0,
            created_at: Utc::now().date_naive(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Fail with `AccountClosed` unless the account is active
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(Error::AccountClosed(format!(
                "account {} has been deleted",
                self.code
            )))
        }
    }

    /// Validate account data
    pub fn validate(&self) -> Result<()> {
        if self.code.trim().is_empty() {
            return Err(Error::validation("account code cannot be empty"));
        }
        if self.balance < Decimal::ZERO {
            return Err(Error::validation("account balance cannot be negative"));
        }
        Ok(())
    }

    /// Format the code for a given sequence number
    pub fn format_code(sequence: u64) -> String {
        format!("{CODE_PREFIX}{sequence}")
    }

    /// Parse the sequence number out of an account code, if well-formed
    pub fn parse_code_sequence(code: &str) -> Option<u64> {
        code.strip_prefix(CODE_PREFIX)?.parse().ok()
    }
}
