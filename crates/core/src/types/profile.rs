//! Buyer profiles: account credentials, addresses, and payment details.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// A buyer's account credentials, billing and shipping information.
///
/// The account password is required - the remote service does not allow
/// guest checkout. Immutable once constructed; shared read-only across all
/// workers using this identity.
///
/// `SecretString` fields redact themselves in `Debug` output and never
/// serialize back out.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    #[serde(default)]
    pub phone: String,
    pub billing: Address,
    pub shipping: Address,
    pub payment: Payment,
}

/// A street address used for billing or shipping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// Credit card details for checkout submission.
#[derive(Debug, Clone, Deserialize)]
pub struct Payment {
    pub card_number: SecretString,
    pub exp_month: String,
    pub exp_year: String,
    pub cvv: SecretString,
}
