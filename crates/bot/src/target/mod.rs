//! Target.com implementations of the session and checkout capabilities.
//!
//! Endpoint constants, wire payloads, and the two concrete state machines
//! live here; everything above this module speaks only in terms of the
//! [`Session`](crate::session::Session) and
//! [`CheckoutClient`](crate::client::CheckoutClient) traits.

mod checkout;
mod session;
mod wire;

pub use checkout::TargetCheckout;
pub use session::TargetSession;

/// Storefront root, hit first during warm-up to collect defense cookies.
pub(crate) const BASE_URL: &str = "https://www.target.com";

/// Login page, hit second during warm-up; its body embeds the visitor id.
pub(crate) const LOGIN_PAGE_URL: &str = "https://www.target.com/login";

/// Credential validation endpoint. Accepts on 202 with a one-time code.
pub(crate) const CRED_VALIDATIONS_URL: &str =
    "https://gsp.target.com/gsp/authentications/v1/credential_validations?client_id=ecom-web-1.0.0";

/// Best-effort phone verification skip. Failure here is non-fatal.
pub(crate) const SKIP_PHONE_URL: &str =
    "https://gsp.target.com/gsp/authentications/v1/skip_phone_verifications";

/// Exchanges the one-time code for session tokens. Accepts on 201.
pub(crate) const CLIENT_TOKENS_URL: &str =
    "https://gsp.target.com/gsp/oauth_tokens/v2/client_tokens";

/// Confirms the freshly issued tokens. Accepts on 200.
pub(crate) const TOKEN_VALIDATIONS_URL: &str =
    "https://gsp.target.com/gsp/oauth_validations/v3/token_validations";

/// Static API key the web storefront sends on cart and checkout calls.
pub(crate) const API_KEY: &str = "9f36aeafbe60771e321a7cc95a78140772ab3e96";

/// Adds an item to the cart, creating the cart as a side effect.
pub(crate) const CART_ITEMS_URL: &str = "https://carts.target.com/web_checkouts/v1/cart_items?field_groups=CART%2CCART_ITEMS%2CSUMMARY&key=9f36aeafbe60771e321a7cc95a78140772ab3e96";

/// Submits the order against an existing cart.
pub(crate) const CHECKOUT_URL: &str =
    "https://carts.target.com/web_checkouts/v1/checkout?key=9f36aeafbe60771e321a7cc95a78140772ab3e96";

/// OAuth client id of the web storefront.
pub(crate) const CLIENT_ID: &str = "ecom-web-1.0.0";

/// Hosts that must all carry the authenticated cookies after an interactive
/// login handoff.
pub(crate) const COOKIE_DOMAINS: [&str; 3] = [
    "https://www.target.com",
    "https://gsp.target.com",
    "https://carts.target.com",
];

/// Anti-automation defense cookies worth surfacing for diagnostics.
pub(crate) const PX_COOKIE_NAMES: [&str; 3] = ["_px3", "_pxvid", "_pxhd"];
