//! `LedgerStore` contract plus the in-memory store used when no database
//! is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::ledger::LedgerState;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt ledger record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Load/save boundary for per-user ledger state, keyed by lowercase
/// username. A missing record means a fresh account, so `load` keeps
/// "never saved" distinct from a real failure.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn load(&self, username: &str) -> Result<Option<LedgerState>, StoreError>;
    async fn save(&self, username: &str, state: &LedgerState) -> Result<(), StoreError>;
}

/// Keeps ledgers in process memory. Backs database-less runs and tests.
#[derive(Default)]
pub struct MemoryLedgerStore {
    ledgers: RwLock<HashMap<String, LedgerState>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn load(&self, username: &str) -> Result<Option<LedgerState>, StoreError> {
        Ok(self.ledgers.read().await.get(username).cloned())
    }

    async fn save(&self, username: &str, state: &LedgerState) -> Result<(), StoreError> {
        self.ledgers
            .write()
            .await
            .insert(username.to_string(), state.clone());
        Ok(())
    }
}
