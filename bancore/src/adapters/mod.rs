//! Adapters: concrete implementations of the crate's ports

pub mod bccr;
pub mod gatewayapi;
pub mod json_store;
pub mod memory;

pub use bccr::{BccrRateClient, CachedRateProvider};
pub use gatewayapi::GatewayApiSms;
pub use json_store::JsonFileRepository;
