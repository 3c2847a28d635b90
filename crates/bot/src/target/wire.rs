//! Headers and JSON payloads for the Target.com endpoints.
//!
//! Shapes follow what the web storefront actually sends; fields the service
//! ignores are omitted. Responses are deserialized permissively - only the
//! fields the flow reads are declared.

use redcart_core::{Address, Payment, Profile};
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::CLIENT_ID;

const UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                  (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36";

fn header(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// Baseline browser fingerprint headers sent on every call.
pub(crate) fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(UA));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(
        "sec-ch-ua",
        HeaderValue::from_static(
            "\"Chromium\";v=\"144\", \"Google Chrome\";v=\"144\", \"Not;A=Brand\";v=\"99\"",
        ),
    );
    headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
    headers.insert("sec-ch-ua-platform", HeaderValue::from_static("\"Windows\""));
    headers
}

/// Headers for top-level page navigation during warm-up.
pub(crate) fn navigate_headers() -> HeaderMap {
    let mut headers = browser_headers();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));
    headers
}

/// Headers for the authentication service (`gsp.target.com`).
pub(crate) fn gsp_headers() -> HeaderMap {
    let mut headers = browser_headers();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://www.target.com"));
    headers.insert(
        REFERER,
        HeaderValue::from_static("https://www.target.com/cart"),
    );
    headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-site"));
    headers
}

/// Headers for the cart service (`carts.target.com`).
pub(crate) fn cart_headers(visitor_id: Option<&str>) -> HeaderMap {
    let mut headers = browser_headers();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://www.target.com"));
    headers.insert(
        REFERER,
        HeaderValue::from_static("https://www.target.com/cart"),
    );
    headers.insert("x-application-name", HeaderValue::from_static("web"));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-site"));
    if let Some(visitor_id) = visitor_id {
        headers.insert("x-visitor-id", header(visitor_id));
    }
    headers
}

/// Cart headers plus the API key, required for order submission.
pub(crate) fn checkout_headers(visitor_id: Option<&str>) -> HeaderMap {
    let mut headers = cart_headers(visitor_id);
    headers.insert("x-api-key", HeaderValue::from_static(super::API_KEY));
    headers
}

/// Device fingerprint sent with credential validation and token exchange.
#[derive(Debug, Serialize)]
pub(crate) struct DeviceInfo {
    pub user_agent: &'static str,
    pub platform: &'static str,
    pub browser_name: &'static str,
    pub browser_version: &'static str,
    pub language: &'static str,
    pub color_depth: u8,
    pub pixel_depth: u8,
    pub screen_width: u16,
    pub screen_height: u16,
    pub timezone_offset: i16,
    pub touch_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visitor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tealeaf_id: Option<String>,
}

impl DeviceInfo {
    pub(crate) fn for_session(visitor_id: Option<&str>, tealeaf_id: Option<&str>) -> Self {
        Self {
            user_agent: UA,
            platform: "Win32",
            browser_name: "Chrome",
            browser_version: "144",
            language: "en-US",
            color_depth: 24,
            pixel_depth: 24,
            screen_width: 1920,
            screen_height: 1080,
            timezone_offset: 300,
            touch_enabled: false,
            visitor_id: visitor_id.map(str::to_owned),
            tealeaf_id: tealeaf_id.map(str::to_owned),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CredentialValidationRequest {
    pub username: String,
    pub password: String,
    pub device_info: DeviceInfo,
    pub keep_me_signed_in: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CredentialValidationResponse {
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ClientCredential {
    pub client_id: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ClientTokensRequest {
    pub grant_type: &'static str,
    pub client_credential: ClientCredential,
    pub merge: &'static str,
    pub device_info: DeviceInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ClientTokensRequest {
    pub(crate) fn authorization_code(code: String, device_info: DeviceInfo) -> Self {
        Self {
            grant_type: "authorization_code",
            client_credential: ClientCredential {
                client_id: CLIENT_ID,
            },
            merge: "cart",
            device_info,
            code: Some(code),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CartItem {
    pub tcin: String,
    pub quantity: u32,
    pub item_channel_id: &'static str,
}

/// Body for the cart-add call. One item, quantity one.
#[derive(Debug, Serialize)]
pub(crate) struct CartAddRequest {
    pub cart_item: CartItem,
    pub cart_type: &'static str,
    pub channel_id: &'static str,
    pub shopping_context: &'static str,
}

impl CartAddRequest {
    pub(crate) fn single(tcin: &str) -> Self {
        Self {
            cart_item: CartItem {
                tcin: tcin.to_owned(),
                quantity: 1,
                item_channel_id: "10",
            },
            cart_type: "REGULAR",
            channel_id: "10",
            shopping_context: "DIGITAL",
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CartAddResponse {
    pub cart_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PaymentInfo {
    pub card_number: String,
    pub exp_month: String,
    pub exp_year: String,
    pub cvv: String,
    pub card_type: &'static str,
}

impl PaymentInfo {
    fn from_payment(payment: &Payment) -> Self {
        Self {
            card_number: payment.card_number.expose_secret().to_owned(),
            exp_month: payment.exp_month.clone(),
            exp_year: payment.exp_year.clone(),
            cvv: payment.cvv.expose_secret().to_owned(),
            card_type: "VISA",
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ContactInfo {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Body for the order-submit call.
#[derive(Debug, Serialize)]
pub(crate) struct OrderSubmitRequest {
    pub cart_id: String,
    pub channel_id: &'static str,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub payment_info: PaymentInfo,
    pub contact_info: ContactInfo,
}

impl OrderSubmitRequest {
    pub(crate) fn new(cart_id: &str, profile: &Profile) -> Self {
        Self {
            cart_id: cart_id.to_owned(),
            channel_id: "10",
            shipping_address: profile.shipping.clone(),
            billing_address: profile.billing.clone(),
            payment_info: PaymentInfo::from_payment(&profile.payment),
            contact_info: ContactInfo {
                name: profile.name.clone(),
                email: profile.email.clone(),
                phone: if profile.phone.is_empty() {
                    None
                } else {
                    Some(profile.phone.clone())
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderSubmitResponse {
    pub order_id: Option<String>,
}
