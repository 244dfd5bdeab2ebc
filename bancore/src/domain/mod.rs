//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod account;
mod customer;
pub mod fee;
pub mod result;
mod transaction;

pub use account::{Account, AccountStatus};
pub use customer::{AccountLimitPolicy, Customer, CustomerKind};
pub use fee::{FeePolicy, FREE_TRANSACTIONS};
pub use transaction::{ensure_whole_positive, TransactionKind, TransactionRecord};
