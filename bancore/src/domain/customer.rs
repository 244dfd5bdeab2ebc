//! Customer domain model and account-limit policy
//!
//! Customers are owned by an external registry; the core only consumes the
//! fields that matter for money movement: identity, kind, and phone number.

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

/// Customer kind, carrying any kind-specific policy value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerKind {
    /// Natural person, capped at `account_limit` accounts
    Individual { account_limit: u32 },
    /// Business customer, no account cap
    Organization,
}

/// A bank customer (consumed, not owned, by the core)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identification number
    pub identification: i64,
    pub name: String,
    /// Phone number for one-time code delivery, in international format
    pub phone: String,
    pub email: String,
    pub kind: CustomerKind,
}

impl Customer {
    pub fn individual(
        identification: i64,
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
        account_limit: u32,
    ) -> Self {
        Self {
            identification,
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
            kind: CustomerKind::Individual { account_limit },
        }
    }

    pub fn organization(
        identification: i64,
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            identification,
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
            kind: CustomerKind::Organization,
        }
    }
}

/// Per customer-kind rule capping how many accounts a customer may hold
pub struct AccountLimitPolicy;

impl AccountLimitPolicy {
    /// Check whether the customer may open one more account
    ///
    /// `current_account_count` is the number of accounts the customer holds
    /// right now. Only individuals are capped.
    pub fn check_can_open(customer: &Customer, current_account_count: usize) -> Result<()> {
        match customer.kind {
            CustomerKind::Individual { account_limit }
                if current_account_count >= account_limit as usize =>
            {
                Err(Error::LimitExceeded(format!(
                    "customer {} already holds {} of {} allowed accounts",
                    customer.identification, current_account_count, account_limit
                )))
            }
            _ => Ok(()),
        }
    }
}
