//! Persistence layer: pool, migrations, and the per-user ledger stores.

mod ledgers;
mod pool;
mod store;

pub use ledgers::PgLedgerStore;
pub use pool::create_pool_and_migrate;
pub use sqlx::PgPool;
pub use store::{LedgerStore, MemoryLedgerStore, StoreError};
