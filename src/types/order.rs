use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type Price = f64;
pub type Qty = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

/// One trade as the caller submits it, priced by the caller from a quote
/// taken immediately beforehand. Shares arrive as a float so that
/// fractional quantities can be rejected with a proper reason instead of
/// failing to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub shares: f64,
    pub current_price: Price,
}

/// Immutable record of one executed trade. The ledger keeps these newest
/// first and only ever appends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub symbol: String,
    #[serde(rename = "type")]
    pub side: OrderSide,
    pub shares: Qty,
    pub price: Price,
    pub timestamp: DateTime<Utc>,
    pub total: f64,
}

impl Order {
    /// Human-readable confirmation, e.g. "Bought 10 shares of AAPL".
    pub fn confirmation(&self) -> String {
        let verb = match self.side {
            OrderSide::Buy => "Bought",
            OrderSide::Sell => "Sold",
        };
        format!("{} {} shares of {}", verb, self.shares, self.symbol)
    }
}
