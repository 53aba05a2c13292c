//! Postgres-backed ledger store: one row per username holding the JSON
//! state record, upserted on every save.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::ledger::LedgerState;
use crate::persistence::store::{LedgerStore, StoreError};

#[derive(Debug, sqlx::FromRow)]
struct LedgerRow {
    state: String,
}

pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn load(&self, username: &str) -> Result<Option<LedgerState>, StoreError> {
        let row = sqlx::query_as::<_, LedgerRow>(
            "SELECT state FROM ledger_states WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(serde_json::from_str(&row.state)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, username: &str, state: &LedgerState) -> Result<(), StoreError> {
        let json = serde_json::to_string(state)?;
        sqlx::query(
            "INSERT INTO ledger_states (username, state, updated_at) VALUES ($1, $2, now()) \
             ON CONFLICT (username) DO UPDATE SET state = $2, updated_at = now()",
        )
        .bind(username)
        .bind(json)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
