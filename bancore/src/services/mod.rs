//! Service layer: the business operations exposed by the crate

pub mod converter;
pub mod journal;
pub mod ledger;
pub mod registry;
pub mod stepup;
pub mod store;
pub mod transfer;

pub use converter::{Conversion, CurrencyConverter};
pub use journal::TransactionJournal;
pub use ledger::{Ledger, Receipt};
pub use registry::AccountRegistry;
pub use stepup::StepUpVerifier;
pub use store::{AccountHandle, AccountStore};
pub use transfer::{TransferCoordinator, TransferReceipt};
