//! The raw HTTP seam behind a session.
//!
//! The purchase flow needs exactly one thing from the network layer: a
//! request/response primitive plus access to the cookie jar it maintains.
//! Everything else (connection pooling, TLS, the client fingerprint the
//! remote defense layer inspects) lives behind [`Transport`], so a
//! browser-impersonating client can be swapped in without touching session
//! or checkout logic. Tests inject a scripted in-memory fake.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redcart_core::Proxy;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use url::Url;

use crate::error::BotError;

/// Default per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw response from a transport call.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// The body decoded as UTF-8, lossily.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Request/response primitive with cookie persistence.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a request and return status code plus raw body.
    async fn execute(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, BotError>;

    /// The `Cookie` header value the jar would send to `url`, if any.
    fn cookie_header(&self, url: &Url) -> Option<String>;

    /// Store a cookie (in `Set-Cookie` string form) scoped to `url`.
    fn store_cookie(&self, url: &Url, cookie: &str);
}

/// Options for building an [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Optional egress proxy, bound for the life of the transport.
    pub proxy: Option<Proxy>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout: REQUEST_TIMEOUT,
        }
    }
}

/// Production transport: a `reqwest` client with an automatic cookie jar.
///
/// Redirects are not followed - the session logic inspects every response
/// as-is, the way the original flow expects.
pub struct HttpTransport {
    client: reqwest::Client,
    jar: Arc<Jar>,
}

impl HttpTransport {
    /// Build a transport, binding the proxy if one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy URL is invalid or the client cannot be
    /// constructed.
    pub fn new(options: &TransportOptions) -> Result<Self, BotError> {
        let jar = Arc::new(Jar::default());

        let mut builder = reqwest::Client::builder()
            .timeout(options.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .cookie_provider(Arc::clone(&jar));

        if let Some(proxy) = &options.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.url())?);
        }

        let client = builder.build()?;
        Ok(Self { client, jar })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, BotError> {
        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { status, body })
    }

    fn cookie_header(&self, url: &Url) -> Option<String> {
        self.jar
            .cookies(url)
            .and_then(|value| value.to_str().map(str::to_owned).ok())
    }

    fn store_cookie(&self, url: &Url, cookie: &str) {
        self.jar.add_cookie_str(cookie, url);
    }
}
