//! Watched products and the stock events the monitor emits for them.

use serde::{Deserialize, Serialize};

/// A catalog item to watch and purchase.
///
/// `dpci` and `tcin` are the retailer's two catalog identifiers; `store_id`
/// scopes availability to one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetProduct {
    pub dpci: String,
    pub tcin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub store_id: String,
}

/// A confirmed-in-stock signal for one product at one location.
///
/// Emitted by the stock monitor when availability is confirmed. Ephemeral:
/// each event is consumed by exactly one worker, exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEvent {
    pub product: TargetProduct,
    pub offer_id: String,
    pub location_id: String,
}
