//! Session contracts: the authentication state machine surface and the
//! interactive-login capability.
//!
//! A session is one network identity - cookie state, derived identifiers,
//! and an authentication phase. Each worker exclusively owns its session for
//! the worker's entire lifetime; sessions are never shared or handed between
//! workers, which is what lets the state machines run lock-free.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use reqwest::header::HeaderMap;
use secrecy::SecretString;

use crate::error::BotError;
use crate::transport::HttpResponse;

/// Authentication phase of a session.
///
/// Advances forward only: `Unauthenticated -> Warmed -> LoggedIn`. A session
/// that reaches [`AuthPhase::AuthFailed`] is discarded and rebuilt from
/// scratch, never repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AuthPhase {
    Unauthenticated,
    Warmed,
    LoggedIn,
    AuthFailed,
}

impl fmt::Display for AuthPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Warmed => "warmed",
            Self::LoggedIn => "logged-in",
            Self::AuthFailed => "auth-failed",
        };
        write!(f, "{label}")
    }
}

/// One network identity's cookie and authentication state.
#[async_trait]
pub trait Session: Send + Sync {
    /// Current authentication phase.
    fn phase(&self) -> AuthPhase;

    /// Unauthenticated bootstrap: populate baseline defense cookies and
    /// harvest session identifiers. Idempotent - a warmed (or logged-in)
    /// session skips the calls entirely.
    async fn warm_up(&mut self) -> Result<(), BotError>;

    /// Authenticate the session. Requires [`AuthPhase::Warmed`].
    async fn login(&mut self, email: &str, password: &SecretString) -> Result<(), BotError>;

    /// Raw request primitive. Phase-agnostic: callers are responsible for
    /// only issuing purchase calls once the session is logged in.
    async fn execute(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, BotError>;

    /// Read-only snapshot of the anti-automation defense cookies.
    fn current_cookies(&self) -> HashMap<String, String>;

    /// Visitor identifier harvested during warm-up or login, if any.
    fn visitor_id(&self) -> Option<&str>;
}

/// A cookie record handed over by the interactive-login capability.
#[derive(Debug, Clone)]
pub struct BrowserCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub expires: Option<DateTime<Utc>>,
    pub secure: bool,
    pub http_only: bool,
}

impl BrowserCookie {
    /// Render as a `Set-Cookie` string suitable for jar injection.
    #[must_use]
    pub fn to_set_cookie_string(&self) -> String {
        let mut rendered = format!("{}={}", self.name, self.value);
        if !self.domain.is_empty() {
            rendered.push_str("; Domain=");
            rendered.push_str(&self.domain);
        }
        if !self.path.is_empty() {
            rendered.push_str("; Path=");
            rendered.push_str(&self.path);
        }
        if let Some(expires) = self.expires {
            rendered.push_str("; Expires=");
            rendered.push_str(&expires.format("%a, %d %b %Y %H:%M:%S GMT").to_string());
        }
        if self.secure {
            rendered.push_str("; Secure");
        }
        if self.http_only {
            rendered.push_str("; HttpOnly");
        }
        rendered
    }
}

/// Cookies plus optional visitor identifier returned by a successful
/// interactive login.
#[derive(Debug, Clone, Default)]
pub struct LoginHandoff {
    pub cookies: Vec<BrowserCookie>,
    pub visitor_id: Option<String>,
}

/// A capability that can complete credential entry and challenge
/// verification in a real browser context.
///
/// Invoked at most once per session lifetime, during bootstrap, and may
/// block for an extended, unbounded duration. Implementations live outside
/// this crate; tests use a scripted double.
#[async_trait]
pub trait InteractiveLogin: Send + Sync {
    /// Log in with the given identity and return the authenticated cookies.
    async fn login(&self, email: &str, password: &SecretString)
    -> Result<LoginHandoff, BotError>;
}
