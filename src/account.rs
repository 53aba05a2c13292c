//! Per-user account service: serializes trades per username, loads the
//! stored ledger, applies the pure trade transition, and persists the result.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

use crate::ledger::{self, LedgerState, TradeError};
use crate::persistence::{LedgerStore, StoreError};
use crate::types::order::{Order, TradeRequest};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Rejected(#[from] TradeError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of an accepted trade.
#[derive(Debug)]
pub struct TradeOutcome {
    pub message: String,
    pub order: Order,
    pub state: LedgerState,
}

pub struct Accounts {
    store: Arc<dyn LedgerStore>,
    // One async mutex per username: the load-validate-apply-save sequence
    // must not interleave for the same account.
    locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl Accounts {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            store,
            locks: RwLock::new(HashMap::new()),
        }
    }

    async fn account_lock(&self, username: &str) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().await.get(username) {
            return lock.clone();
        }
        let mut guard = self.locks.write().await;
        guard.entry(username.to_string()).or_default().clone()
    }

    /// Current ledger snapshot. A username that was never saved gets a fresh
    /// account; a guest session (no identity) always sees one.
    pub async fn portfolio(&self, username: Option<&str>) -> Result<LedgerState, StoreError> {
        match username {
            Some(name) => Ok(self.store.load(name).await?.unwrap_or_default()),
            None => Ok(LedgerState::default()),
        }
    }

    /// Execute one trade. The in-memory transition is authoritative: a failed
    /// save is logged and the trade still reports success.
    pub async fn execute_trade(
        &self,
        username: Option<&str>,
        req: &TradeRequest,
    ) -> Result<TradeOutcome, AccountError> {
        match username {
            Some(name) => {
                let lock = self.account_lock(name).await;
                let _guard = lock.lock().await;
                let state = self.store.load(name).await?.unwrap_or_default();
                let (next, order) = ledger::execute_trade(&state, req)?;
                self.save_best_effort(name, &next).await;
                Ok(TradeOutcome {
                    message: order.confirmation(),
                    order,
                    state: next,
                })
            }
            None => {
                // Guest session: trade against a fresh account, persist nothing.
                let state = LedgerState::default();
                let (next, order) = ledger::execute_trade(&state, req)?;
                Ok(TradeOutcome {
                    message: order.confirmation(),
                    order,
                    state: next,
                })
            }
        }
    }

    /// Reset to the starting balance with no positions or orders.
    pub async fn reset(&self, username: Option<&str>) -> LedgerState {
        let state = LedgerState::default();
        if let Some(name) = username {
            let lock = self.account_lock(name).await;
            let _guard = lock.lock().await;
            self.save_best_effort(name, &state).await;
        }
        state
    }

    async fn save_best_effort(&self, username: &str, state: &LedgerState) {
        if let Err(err) = self.store.save(username, state).await {
            warn!(
                username,
                error = %err,
                "ledger state changed in memory but could not be saved"
            );
        }
    }
}
