//! Account service tests: persistence round-trip, per-user isolation,
//! guest sessions, and trade serialization under concurrency.

use std::sync::Arc;

use aegis_trader::account::{AccountError, Accounts};
use aegis_trader::ledger::{LedgerState, STARTING_CASH};
use aegis_trader::persistence::{LedgerStore, MemoryLedgerStore};
use aegis_trader::types::order::{OrderSide, TradeRequest};

fn buy(symbol: &str, shares: f64, price: f64) -> TradeRequest {
    TradeRequest {
        symbol: symbol.to_string(),
        side: OrderSide::Buy,
        shares,
        current_price: price,
    }
}

fn sell(symbol: &str, shares: f64, price: f64) -> TradeRequest {
    TradeRequest {
        symbol: symbol.to_string(),
        side: OrderSide::Sell,
        shares,
        current_price: price,
    }
}

#[tokio::test]
async fn trade_persists_and_reloads_for_named_user() {
    let store = Arc::new(MemoryLedgerStore::new());
    let accounts = Accounts::new(store.clone());

    let outcome = accounts
        .execute_trade(Some("alice"), &buy("AAPL", 10.0, 150.0))
        .await
        .unwrap();
    assert_eq!(outcome.message, "Bought 10 shares of AAPL");

    // A second service over the same store sees the saved state.
    let accounts2 = Accounts::new(store.clone());
    let ledger = accounts2.portfolio(Some("alice")).await.unwrap();
    assert_eq!(ledger.cash_balance, 8_500.0);
    assert_eq!(ledger.positions[0].shares, 10);
    assert_eq!(ledger.orders.len(), 1);

    let saved = store.load("alice").await.unwrap().unwrap();
    assert_eq!(saved, ledger);
}

#[tokio::test]
async fn users_are_isolated() {
    let store = Arc::new(MemoryLedgerStore::new());
    let accounts = Accounts::new(store);

    accounts
        .execute_trade(Some("alice"), &buy("AAPL", 10.0, 150.0))
        .await
        .unwrap();

    let bob = accounts.portfolio(Some("bob")).await.unwrap();
    assert_eq!(bob, LedgerState::default());
}

#[tokio::test]
async fn guest_trades_are_not_persisted() {
    let store = Arc::new(MemoryLedgerStore::new());
    let accounts = Accounts::new(store.clone());

    let outcome = accounts
        .execute_trade(None, &buy("AAPL", 10.0, 150.0))
        .await
        .unwrap();
    assert_eq!(outcome.state.cash_balance, 8_500.0);

    // The trade hit a fresh ledger and vanished with it.
    let guest = accounts.portfolio(None).await.unwrap();
    assert_eq!(guest, LedgerState::default());
}

#[tokio::test]
async fn rejection_does_not_touch_store() {
    let store = Arc::new(MemoryLedgerStore::new());
    let accounts = Accounts::new(store.clone());

    let err = accounts
        .execute_trade(Some("alice"), &sell("TSLA", 1.0, 200.0))
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::Rejected(_)));
    assert!(store.load("alice").await.unwrap().is_none());
}

#[tokio::test]
async fn reset_restores_defaults_and_persists() {
    let store = Arc::new(MemoryLedgerStore::new());
    let accounts = Accounts::new(store.clone());

    accounts
        .execute_trade(Some("alice"), &buy("AAPL", 10.0, 150.0))
        .await
        .unwrap();
    let state = accounts.reset(Some("alice")).await;
    assert_eq!(state, LedgerState::default());

    let reloaded = accounts.portfolio(Some("alice")).await.unwrap();
    assert_eq!(reloaded.cash_balance, STARTING_CASH);
    assert!(reloaded.positions.is_empty());
    assert!(reloaded.orders.is_empty());
}

#[tokio::test]
async fn portfolio_reads_are_idempotent() {
    let store = Arc::new(MemoryLedgerStore::new());
    let accounts = Accounts::new(store);

    accounts
        .execute_trade(Some("alice"), &buy("AAPL", 3.0, 100.0))
        .await
        .unwrap();
    let first = accounts.portfolio(Some("alice")).await.unwrap();
    let second = accounts.portfolio(Some("alice")).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_trades_on_one_account_all_apply() {
    let store = Arc::new(MemoryLedgerStore::new());
    let accounts = Arc::new(Accounts::new(store));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let accounts = accounts.clone();
        handles.push(tokio::spawn(async move {
            accounts
                .execute_trade(Some("alice"), &buy("AAPL", 1.0, 1.0))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // The per-account lock serializes load-apply-save: no lost updates.
    let ledger = accounts.portfolio(Some("alice")).await.unwrap();
    assert_eq!(ledger.positions[0].shares, 10);
    assert_eq!(ledger.orders.len(), 10);
    assert_eq!(ledger.cash_balance, STARTING_CASH - 10.0);
}
