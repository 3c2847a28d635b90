//! Shared fixtures for unit tests.

use redcart_core::{Profile, StockEvent, TargetProduct};

pub(crate) const PROFILE_JSON: &str = r#"{
    "name": "Test User",
    "email": "test@example.com",
    "password": "hunter2",
    "phone": "5555550100",
    "billing": {
        "line1": "1 Main St",
        "city": "Minneapolis",
        "state": "MN",
        "zip_code": "55401",
        "country": "US"
    },
    "shipping": {
        "line1": "1 Main St",
        "city": "Minneapolis",
        "state": "MN",
        "zip_code": "55401",
        "country": "US"
    },
    "payment": {
        "card_number": "4111111111111111",
        "exp_month": "01",
        "exp_year": "2030",
        "cvv": "123"
    }
}"#;

#[allow(clippy::unwrap_used)]
pub(crate) fn profile() -> Profile {
    serde_json::from_str(PROFILE_JSON).unwrap()
}

pub(crate) fn stock_event() -> StockEvent {
    StockEvent {
        product: TargetProduct {
            dpci: "057-01-1234".to_string(),
            tcin: "12345678".to_string(),
            name: Some("Trading Card Box".to_string()),
            store_id: "1234".to_string(),
        },
        offer_id: "offer-1".to_string(),
        location_id: "1234".to_string(),
    }
}
