//! Integration tests for the full banking flow
//!
//! These tests wire a complete context over the in-memory adapters and
//! exercise the end-to-end paths: account lifecycle, deposits and
//! withdrawals with fee tiers, transfers, currency conversion, and the
//! rejection paths that must leave state untouched.
//!
//! Run with: cargo test --test ledger_flow_test -- --nocapture

use std::sync::Arc;

use rust_decimal::Decimal;

use bancore::adapters::memory::{
    FixedRateProvider, MemoryRepository, RecordingSmsGateway, UnavailableRateProvider,
};
use bancore::config::Config;
use bancore::domain::{Customer, FREE_TRANSACTIONS};
use bancore::ports::{RateProvider, Repository, SmsGateway};
use bancore::{AccountStatus, BankContext, Error};

// ============================================================================
// Test Helpers
// ============================================================================

struct TestBank {
    context: BankContext,
    gateway: Arc<RecordingSmsGateway>,
}

/// Wire a full context over in-memory adapters (buy 500.00, sell 510.00)
fn test_bank() -> TestBank {
    test_bank_with_rates(Arc::new(FixedRateProvider::new(
        Decimal::new(50000, 2),
        Decimal::new(51000, 2),
    )))
}

fn test_bank_with_rates(rates: Arc<dyn RateProvider>) -> TestBank {
    let gateway = Arc::new(RecordingSmsGateway::new());
    let sms: Arc<dyn SmsGateway> = gateway.clone();
    let repository: Arc<dyn Repository> = Arc::new(MemoryRepository::new());
    let context = BankContext::with_collaborators(Config::default(), repository, rates, sms)
        .expect("failed to build context");
    TestBank { context, gateway }
}

fn ana() -> Customer {
    Customer::individual(101, "Ana", "+50688880000", "ana@example.com", 3)
}

fn luis() -> Customer {
    Customer::individual(202, "Luis", "+50688880001", "luis@example.com", 3)
}

/// Issue a withdrawal challenge and read the delivered code back out of
/// the recording gateway
fn challenge_for(bank: &TestBank, code: &str) -> String {
    bank.context.ledger.issue_withdrawal_challenge(code).unwrap();
    let sent = bank.gateway.messages();
    let body = &sent.last().expect("no SMS delivered").1;
    body.rsplit(' ').next().unwrap().to_string()
}

fn decimal(value: i64) -> Decimal {
    Decimal::new(value, 0)
}

// ============================================================================
// Account Lifecycle
// ============================================================================

#[test]
fn test_account_lifecycle() {
    let bank = test_bank();
    bank.context.registry.register_customer(ana()).unwrap();

    let code = bank
        .context
        .registry
        .create_account(101, decimal(1000), "1234")
        .unwrap();
    assert_eq!(code, "CTA-1");
    assert_eq!(
        bank.context.registry.status_of(&code).unwrap(),
        AccountStatus::Active
    );

    bank.context.registry.delete_account(&code).unwrap();
    assert_eq!(
        bank.context.registry.status_of(&code).unwrap(),
        AccountStatus::Deleted
    );

    // Deleted accounts reject every money movement
    assert!(matches!(
        bank.context.ledger.deposit_local(&code, decimal(100)),
        Err(Error::AccountClosed(_))
    ));
}

#[test]
fn test_state_survives_reload() {
    let repository: Arc<dyn Repository> = Arc::new(MemoryRepository::new());
    let rates: Arc<dyn RateProvider> = Arc::new(FixedRateProvider::new(
        Decimal::new(50000, 2),
        Decimal::new(51000, 2),
    ));
    let gateway = Arc::new(RecordingSmsGateway::new());

    let code = {
        let context = BankContext::with_collaborators(
            Config::default(),
            repository.clone(),
            rates.clone(),
            gateway.clone(),
        )
        .unwrap();
        context.registry.register_customer(ana()).unwrap();
        let code = context
            .registry
            .create_account(101, decimal(1000), "1234")
            .unwrap();
        context.ledger.deposit_local(&code, decimal(500)).unwrap();
        code
    };

    // A fresh context over the same repository sees the committed state
    let context =
        BankContext::with_collaborators(Config::default(), repository, rates, gateway).unwrap();
    assert_eq!(
        context.ledger.balance(&code, "1234").unwrap(),
        decimal(1500)
    );
    assert_eq!(context.ledger.statement(&code, "1234").unwrap().len(), 1);
    // The code sequence continues instead of restarting
    let next = context.registry.create_account(101, decimal(0), "1234").unwrap();
    assert_eq!(next, "CTA-2");
}

// ============================================================================
// Deposits, Withdrawals, Fees
// ============================================================================

#[test]
fn test_deposit_then_authorized_withdrawal() {
    let bank = test_bank();
    bank.context.registry.register_customer(ana()).unwrap();
    let code = bank
        .context
        .registry
        .create_account(101, decimal(0), "1234")
        .unwrap();

    bank.context.ledger.deposit_local(&code, decimal(5000)).unwrap();

    let challenge = challenge_for(&bank, &code);
    let receipt = bank
        .context
        .ledger
        .withdraw_local(&code, "1234", &challenge, decimal(2000))
        .unwrap();
    assert_eq!(receipt.fee, Decimal::ZERO);
    assert_eq!(receipt.balance_after, decimal(3000));
}

#[test]
fn test_fee_tier_kicks_in_on_sixth_transaction() {
    let bank = test_bank();
    bank.context.registry.register_customer(ana()).unwrap();
    let code = bank
        .context
        .registry
        .create_account(101, decimal(0), "1234")
        .unwrap();

    for _ in 0..FREE_TRANSACTIONS {
        let receipt = bank.context.ledger.deposit_local(&code, decimal(1000)).unwrap();
        assert_eq!(receipt.fee, Decimal::ZERO);
    }

    let receipt = bank.context.ledger.deposit_local(&code, decimal(1000)).unwrap();
    assert_eq!(receipt.fee, decimal(20));

    let history = bank.context.ledger.statement(&code, "1234").unwrap();
    assert_eq!(history.len(), 6);
    assert!(!history[4].fee_applied);
    assert!(history[5].fee_applied);
    assert_eq!(history[5].fee_amount, decimal(20));
}

#[test]
fn test_withdrawal_without_challenge_rejected() {
    let bank = test_bank();
    bank.context.registry.register_customer(ana()).unwrap();
    let code = bank
        .context
        .registry
        .create_account(101, decimal(1000), "1234")
        .unwrap();

    // No challenge was ever issued
    let err = bank
        .context
        .ledger
        .withdraw_local(&code, "1234", "ABCD1234", decimal(100))
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));
    assert_eq!(bank.context.ledger.balance(&code, "1234").unwrap(), decimal(1000));
}

#[test]
fn test_challenge_for_one_account_rejected_on_another() {
    let bank = test_bank();
    bank.context.registry.register_customer(ana()).unwrap();
    let first = bank
        .context
        .registry
        .create_account(101, decimal(1000), "1234")
        .unwrap();
    let second = bank
        .context
        .registry
        .create_account(101, decimal(1000), "1234")
        .unwrap();

    let challenge = challenge_for(&bank, &first);
    let err = bank
        .context
        .ledger
        .withdraw_local(&second, "1234", &challenge, decimal(100))
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));

    // The challenge still works on the account it was issued for
    bank.context
        .ledger
        .withdraw_local(&first, "1234", &challenge, decimal(100))
        .unwrap();
}

#[test]
fn test_rejected_operations_leave_no_trace() {
    let bank = test_bank();
    bank.context.registry.register_customer(ana()).unwrap();
    let code = bank
        .context
        .registry
        .create_account(101, decimal(500), "1234")
        .unwrap();

    let challenge = challenge_for(&bank, &code);
    assert!(bank
        .context
        .ledger
        .withdraw_local(&code, "1234", &challenge, decimal(9999))
        .is_err());
    assert!(bank
        .context
        .ledger
        .deposit_local(&code, Decimal::new(105, 1))
        .is_err());

    assert_eq!(bank.context.ledger.balance(&code, "1234").unwrap(), decimal(500));
    assert!(bank.context.ledger.statement(&code, "1234").unwrap().is_empty());
}

// ============================================================================
// Currency Conversion
// ============================================================================

#[test]
fn test_foreign_flows_use_asymmetric_rates() {
    let bank = test_bank();
    bank.context.registry.register_customer(ana()).unwrap();
    let code = bank
        .context
        .registry
        .create_account(101, decimal(0), "1234")
        .unwrap();

    // Deposit 100 units at buy 500.00
    let receipt = bank
        .context
        .ledger
        .deposit_foreign(&code, decimal(100))
        .unwrap();
    assert_eq!(receipt.gross, Decimal::new(5000000, 2));

    // Withdraw 50 units at sell 510.00 = 25500.00
    let challenge = challenge_for(&bank, &code);
    let receipt = bank
        .context
        .ledger
        .withdraw_foreign(&code, "1234", &challenge, decimal(50))
        .unwrap();
    assert_eq!(receipt.gross, Decimal::new(2550000, 2));
    assert_eq!(receipt.balance_after, Decimal::new(2450000, 2));

    // Inquiry converts the colones balance at the sell rate
    let conversion = bank.context.ledger.balance_in_foreign(&code, "1234").unwrap();
    assert_eq!(conversion.amount, Decimal::new(4804, 2)); // 24500 / 510 = 48.04
}

#[test]
fn test_rate_outage_blocks_foreign_flows_only() {
    let bank = test_bank_with_rates(Arc::new(UnavailableRateProvider));
    bank.context.registry.register_customer(ana()).unwrap();
    let code = bank
        .context
        .registry
        .create_account(101, decimal(1000), "1234")
        .unwrap();

    assert!(matches!(
        bank.context.ledger.deposit_foreign(&code, decimal(10)),
        Err(Error::RateUnavailable(_))
    ));
    assert!(matches!(
        bank.context.ledger.balance_in_foreign(&code, "1234"),
        Err(Error::RateUnavailable(_))
    ));

    // Local-currency operations are unaffected
    bank.context.ledger.deposit_local(&code, decimal(100)).unwrap();
    assert_eq!(bank.context.ledger.balance(&code, "1234").unwrap(), decimal(1100));
}

// ============================================================================
// Transfers
// ============================================================================

#[test]
fn test_transfer_between_own_accounts_end_to_end() {
    let bank = test_bank();
    bank.context.registry.register_customer(ana()).unwrap();
    let origin = bank
        .context
        .registry
        .create_account(101, decimal(5000), "1234")
        .unwrap();
    let destination = bank
        .context
        .registry
        .create_account(101, decimal(0), "5678")
        .unwrap();

    let receipt = bank
        .context
        .transfers
        .transfer(&origin, "1234", &destination, decimal(3000))
        .unwrap();
    assert_eq!(receipt.origin_balance_after, decimal(2000));
    assert_eq!(receipt.destination_balance_after, decimal(3000));

    // Both legs are journaled, tagged with each other
    let out = bank.context.ledger.statement(&origin, "1234").unwrap();
    let inc = bank.context.ledger.statement(&destination, "5678").unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(inc.len(), 1);
    assert_eq!(out[0].counterpart.as_deref(), Some(destination.as_str()));
    assert_eq!(inc[0].counterpart.as_deref(), Some(origin.as_str()));
    assert_eq!(out[0].timestamp, inc[0].timestamp);
}

#[test]
fn test_cross_owner_transfer_rejected_atomically() {
    let bank = test_bank();
    bank.context.registry.register_customer(ana()).unwrap();
    bank.context.registry.register_customer(luis()).unwrap();
    let origin = bank
        .context
        .registry
        .create_account(101, decimal(5000), "1234")
        .unwrap();
    let other = bank
        .context
        .registry
        .create_account(202, decimal(100), "5678")
        .unwrap();

    let err = bank
        .context
        .transfers
        .transfer(&origin, "1234", &other, decimal(1000))
        .unwrap_err();
    assert!(matches!(err, Error::OwnershipMismatch(_)));

    assert_eq!(bank.context.ledger.balance(&origin, "1234").unwrap(), decimal(5000));
    assert_eq!(bank.context.ledger.balance(&other, "5678").unwrap(), decimal(100));
    assert!(bank.context.ledger.statement(&origin, "1234").unwrap().is_empty());
}

#[test]
fn test_transfer_to_unknown_account_rejected() {
    let bank = test_bank();
    bank.context.registry.register_customer(ana()).unwrap();
    let origin = bank
        .context
        .registry
        .create_account(101, decimal(5000), "1234")
        .unwrap();

    assert!(matches!(
        bank.context
            .transfers
            .transfer(&origin, "1234", "CTA-99", decimal(100)),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        bank.context.transfers.validate_destination(&origin, "CTA-99"),
        Err(Error::NotFound(_))
    ));
}

// ============================================================================
// Deletion Semantics
// ============================================================================

#[test]
fn test_delete_purges_history_and_frees_limit_slot() {
    let bank = test_bank();
    bank.context.registry.register_customer(ana()).unwrap();
    let code = bank
        .context
        .registry
        .create_account(101, decimal(0), "1234")
        .unwrap();
    for _ in 0..6 {
        bank.context.ledger.deposit_local(&code, decimal(1000)).unwrap();
    }

    bank.context.registry.delete_account(&code).unwrap();
    let loaded = bank.context.repository.load_all().unwrap();
    assert!(loaded.transactions.iter().all(|tx| tx.account_code != code));

    // The deleted slot no longer counts against the customer's limit
    bank.context.registry.create_account(101, decimal(0), "1234").unwrap();
    bank.context.registry.create_account(101, decimal(0), "1234").unwrap();
    bank.context.registry.create_account(101, decimal(0), "1234").unwrap();
}
