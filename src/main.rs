use std::sync::Arc;

use aegis_trader::account::Accounts;
use aegis_trader::api::routes::{AppState, app_router};
use aegis_trader::persistence::{
    LedgerStore, MemoryLedgerStore, PgLedgerStore, create_pool_and_migrate,
};
use aegis_trader::quotes::FinnhubGateway;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let store: Arc<dyn LedgerStore> = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = create_pool_and_migrate(&url).await.unwrap();
            tracing::info!("ledger store: postgres");
            Arc::new(PgLedgerStore::new(pool))
        }
        Err(_) => {
            tracing::info!("DATABASE_URL not set, ledger store: in-memory");
            Arc::new(MemoryLedgerStore::new())
        }
    };

    let jwt_secret = std::env::var("JWT_SECRET")
        .unwrap_or_else(|_| "dev-secret-change-me".to_string())
        .into_bytes();

    let app_state = AppState {
        accounts: Arc::new(Accounts::new(store)),
        quotes: Arc::new(FinnhubGateway::from_env()),
        jwt_secret,
    };

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let app = app_router(app_state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await.unwrap();
    tracing::info!(port, "listening");
    axum::serve(listener, app).await.unwrap();
}
