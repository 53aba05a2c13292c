//! Paper-trading ledger: one user's account state and the trade transition
//! applied to it. Pure and synchronous, testable without HTTP or a database.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::types::order::{Order, OrderSide, Qty, TradeRequest};
use crate::types::position::Position;

/// Cash every fresh account starts with.
pub const STARTING_CASH: f64 = 10_000.0;

/// One user's account: cash balance, open positions, and order history
/// (newest first). Serialized as-is into the per-user persisted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerState {
    pub cash_balance: f64,
    pub positions: Vec<Position>,
    pub orders: Vec<Order>,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            cash_balance: STARTING_CASH,
            positions: Vec::new(),
            orders: Vec::new(),
        }
    }
}

impl LedgerState {
    /// Position held for `symbol` (already uppercased), if any.
    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.symbol == symbol)
    }
}

/// Why a trade was rejected. All three are expected, user-facing outcomes
/// the caller can display and retry from, not fatal errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TradeError {
    #[error("shares must be a positive whole number, got {shares}")]
    InvalidQuantity { shares: f64 },
    #[error("insufficient funds: cost {cost:.2} exceeds cash balance {available:.2}")]
    InsufficientFunds { cost: f64, available: f64 },
    #[error("insufficient shares: tried to sell {requested} of {symbol}, holding {held}")]
    InsufficientShares {
        symbol: String,
        requested: Qty,
        held: Qty,
    },
}

/// Apply one trade to `state`, returning the next state and the recorded
/// order. Validation runs to completion before the next state is built, and
/// `state` itself is never touched, so a rejection leaves the caller's value
/// exactly as it was.
pub fn execute_trade(
    state: &LedgerState,
    req: &TradeRequest,
) -> Result<(LedgerState, Order), TradeError> {
    if req.shares <= 0.0 || req.shares.fract() != 0.0 {
        return Err(TradeError::InvalidQuantity { shares: req.shares });
    }
    let shares = req.shares as Qty;
    let symbol = req.symbol.trim().to_uppercase();
    let total = shares as f64 * req.current_price;

    match req.side {
        OrderSide::Buy => {
            if total > state.cash_balance {
                return Err(TradeError::InsufficientFunds {
                    cost: total,
                    available: state.cash_balance,
                });
            }
        }
        OrderSide::Sell => {
            let held = state.position(&symbol).map(|p| p.shares).unwrap_or(0);
            if held < shares {
                return Err(TradeError::InsufficientShares {
                    symbol,
                    requested: shares,
                    held,
                });
            }
        }
    }

    let mut next = state.clone();
    match req.side {
        OrderSide::Buy => {
            next.cash_balance -= total;
            match next.positions.iter_mut().find(|p| p.symbol == symbol) {
                Some(pos) => {
                    // Volume-weighted average over the old lot plus this fill,
                    // at the trade price.
                    let combined = pos.shares + shares;
                    pos.average_cost =
                        (pos.shares as f64 * pos.average_cost + total) / combined as f64;
                    pos.shares = combined;
                }
                None => next.positions.push(Position {
                    symbol: symbol.clone(),
                    shares,
                    average_cost: req.current_price,
                }),
            }
        }
        OrderSide::Sell => {
            next.cash_balance += total;
            // Availability was checked above, so the position is present.
            if let Some(idx) = next.positions.iter().position(|p| p.symbol == symbol) {
                if next.positions[idx].shares <= shares {
                    next.positions.remove(idx);
                } else {
                    next.positions[idx].shares -= shares;
                }
            }
        }
    }

    let order = Order {
        id: Uuid::new_v4(),
        symbol,
        side: req.side,
        shares,
        price: req.current_price,
        timestamp: Utc::now(),
        total,
    };
    next.orders.insert(0, order.clone());

    Ok((next, order))
}
