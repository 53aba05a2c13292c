//! HTTP surface: mock login, quote/candle proxy, portfolio reads, trades,
//! and reset. Trade rejections are regular responses, not server errors.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::account::{AccountError, Accounts};
use crate::api::auth::{MaybeUser, create_token};
use crate::quotes::{CandlePeriod, QuoteGateway};
use crate::types::order::TradeRequest;
use crate::types::position::Position;

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<Accounts>,
    pub quotes: Arc<dyn QuoteGateway>,
    pub jwt_secret: Vec<u8>,
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/quotes/{symbol}", get(get_quote))
        .route("/quotes/{symbol}/candles", get(get_candles))
        .route("/portfolio", get(get_portfolio))
        .route("/portfolio/positions", get(get_positions))
        .route("/portfolio/orders", get(get_orders))
        .route("/portfolio/reset", post(reset_portfolio))
        .route("/trades", post(execute_trade))
        .with_state(state)
}

async fn health() -> &'static str {
    "healthy"
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    username: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

fn bad_gateway(message: &str) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

fn internal_error(err: impl std::fmt::Display) -> Response {
    error!(error = %err, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "internal error".to_string(),
        }),
    )
        .into_response()
}

/// Demo identity: any non-empty credentials are accepted and the username
/// becomes the account key. Usernames are case-insensitive.
async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return bad_request("username and password are required");
    }
    let username = req.username.trim().to_lowercase();
    match create_token(&state.jwt_secret, &username) {
        Ok(token) => Json(LoginResponse { token, username }).into_response(),
        Err(err) => internal_error(err),
    }
}

async fn get_quote(State(state): State<AppState>, Path(symbol): Path<String>) -> Response {
    match state.quotes.quote(&symbol).await {
        Ok(quote) => Json(quote).into_response(),
        Err(err) => {
            error!(%symbol, error = %err, "quote lookup failed");
            bad_gateway("quote source unavailable")
        }
    }
}

#[derive(Debug, Deserialize)]
struct CandleQuery {
    period: Option<String>,
}

async fn get_candles(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<CandleQuery>,
) -> Response {
    let period = match query.period.as_deref() {
        None => CandlePeriod::Month,
        Some(raw) => match CandlePeriod::parse(raw) {
            Some(period) => period,
            None => return bad_request("period must be one of 1D, 1W, 1M, 1Y"),
        },
    };
    match state.quotes.candles(&symbol, period).await {
        Ok(candles) => Json(candles).into_response(),
        Err(err) => {
            error!(%symbol, error = %err, "candle lookup failed");
            bad_gateway("quote source unavailable")
        }
    }
}

async fn get_portfolio(State(state): State<AppState>, MaybeUser(user): MaybeUser) -> Response {
    match state.accounts.portfolio(user.as_deref()).await {
        Ok(ledger) => Json(ledger).into_response(),
        Err(err) => internal_error(err),
    }
}

#[derive(Debug, Deserialize)]
struct PositionQuery {
    symbol: Option<String>,
}

async fn get_positions(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<PositionQuery>,
) -> Response {
    match state.accounts.portfolio(user.as_deref()).await {
        Ok(ledger) => {
            let filter = query.symbol.map(|s| s.to_uppercase());
            let positions: Vec<Position> = ledger
                .positions
                .into_iter()
                .filter(|p| filter.as_deref().is_none_or(|s| p.symbol == s))
                .collect();
            Json(positions).into_response()
        }
        Err(err) => internal_error(err),
    }
}

async fn get_orders(State(state): State<AppState>, MaybeUser(user): MaybeUser) -> Response {
    match state.accounts.portfolio(user.as_deref()).await {
        Ok(ledger) => Json(ledger.orders).into_response(),
        Err(err) => internal_error(err),
    }
}

#[derive(Debug, Serialize)]
struct TradeAccepted {
    success: bool,
    message: String,
}

#[derive(Debug, Serialize)]
struct TradeRejected {
    success: bool,
    reason: String,
}

async fn execute_trade(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Json(req): Json<TradeRequest>,
) -> Response {
    match state.accounts.execute_trade(user.as_deref(), &req).await {
        Ok(outcome) => Json(TradeAccepted {
            success: true,
            message: outcome.message,
        })
        .into_response(),
        Err(AccountError::Rejected(err)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(TradeRejected {
                success: false,
                reason: err.to_string(),
            }),
        )
            .into_response(),
        Err(AccountError::Store(err)) => internal_error(err),
    }
}

async fn reset_portfolio(State(state): State<AppState>, MaybeUser(user): MaybeUser) -> Response {
    Json(state.accounts.reset(user.as_deref()).await).into_response()
}
