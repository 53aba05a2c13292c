use serde::{Deserialize, Serialize};

use crate::types::order::{Price, Qty};

/// Holding in one symbol, at most one per symbol in a ledger. Shares stay
/// strictly positive; a fully sold position is removed rather than kept at
/// zero. `average_cost` is the volume-weighted price paid per held share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    pub shares: Qty,
    pub average_cost: Price,
}
