//! Trait definitions for external collaborators
//!
//! The core never talks to storage, the rate provider, or the SMS transport
//! directly; adapters implement these ports.

mod rates;
mod repository;
mod sms;

pub use rates::{RateProvider, RateQuote};
pub use repository::{LoadedData, Repository};
pub use sms::SmsGateway;
