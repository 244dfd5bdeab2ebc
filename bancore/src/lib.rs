//! Bancore - Account ledger and transaction-processing engine
//!
//! This crate implements the core banking logic following hexagonal
//! architecture:
//!
//! - **domain**: Core business entities (Account, Customer, TransactionRecord)
//! - **ports**: Trait definitions for external dependencies (Repository, RateProvider, SmsGateway)
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (JSON file store, BCCR rates, GatewayAPI SMS)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use adapters::{BccrRateClient, CachedRateProvider, GatewayApiSms, JsonFileRepository};
use config::Config;
use ports::{RateProvider, Repository, SmsGateway};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, Result};
pub use domain::{
    Account, AccountStatus, Customer, CustomerKind, TransactionKind, TransactionRecord,
};
pub use services::{Conversion, Receipt, TransferReceipt};

/// Main context for banking operations
///
/// This is the primary entry point for all business logic. It holds the
/// configuration, the persistence adapter, and all services, with state
/// loaded from the repository at construction.
pub struct BankContext {
    pub config: Config,
    pub repository: Arc<dyn Repository>,
    pub registry: Arc<AccountRegistry>,
    pub ledger: Ledger,
    pub transfers: TransferCoordinator,
    pub verifier: Arc<StepUpVerifier>,
    pub converter: Arc<CurrencyConverter>,
}

impl BankContext {
    /// Create a context with the production adapters
    ///
    /// Fails with `Error::Config` if no SMS token is configured, since
    /// withdrawals cannot be authorized without code delivery.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;

        let repository: Arc<dyn Repository> = Arc::new(JsonFileRepository::open(data_dir)?);
        let rates: Arc<dyn RateProvider> = Arc::new(CachedRateProvider::new(BccrRateClient::new(
            config.rate_url(),
        )?));

        let token = config
            .sms_api_token
            .as_deref()
            .ok_or_else(|| Error::Config("no SMS API token configured".to_string()))?;
        let sms: Arc<dyn SmsGateway> = Arc::new(GatewayApiSms::new(token, &config.sms_sender)?);

        Self::with_collaborators(config, repository, rates, sms)
    }

    /// Create a context over explicit collaborators
    ///
    /// Loads the persisted data set and rebuilds the in-memory state from
    /// it. This is also the wiring point for tests, which pass in-memory
    /// adapters.
    pub fn with_collaborators(
        config: Config,
        repository: Arc<dyn Repository>,
        rates: Arc<dyn RateProvider>,
        sms: Arc<dyn SmsGateway>,
    ) -> Result<Self> {
        let loaded = repository.load_all()?;

        let store = Arc::new(AccountStore::new());
        for account in loaded.accounts {
            store.insert(account)?;
        }
        let journal = Arc::new(TransactionJournal::with_records(loaded.transactions));

        let registry = Arc::new(AccountRegistry::new(
            store.clone(),
            journal.clone(),
            repository.clone(),
            loaded.customers,
        )?);
        let converter = Arc::new(CurrencyConverter::new(rates));
        let verifier = Arc::new(StepUpVerifier::new(sms, config.challenge_ttl()));

        let ledger = Ledger::new(
            registry.clone(),
            journal.clone(),
            repository.clone(),
            converter.clone(),
            verifier.clone(),
        );
        let transfers = TransferCoordinator::new(registry.clone(), journal, repository.clone());

        Ok(Self {
            config,
            repository,
            registry,
            ledger,
            transfers,
            verifier,
            converter,
        })
    }
}
