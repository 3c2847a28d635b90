//! The Target.com session: authentication state machine over a [`Transport`].

use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use rand::RngCore;
use regex::Regex;
use reqwest::Method;
use reqwest::header::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{BotError, body_snippet};
use crate::session::{AuthPhase, InteractiveLogin, Session};
use crate::transport::{HttpResponse, HttpTransport, Transport, TransportOptions};

use super::wire::{
    self, ClientTokensRequest, CredentialValidationRequest, CredentialValidationResponse,
    DeviceInfo,
};
use super::{
    BASE_URL, CLIENT_TOKENS_URL, COOKIE_DOMAINS, CRED_VALIDATIONS_URL, LOGIN_PAGE_URL,
    PX_COOKIE_NAMES, SKIP_PHONE_URL, TOKEN_VALIDATIONS_URL,
};

/// Extracts the visitor id embedded in the login page's inline config blob.
static VISITOR_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""visitorId"\s*:\s*"([A-Za-z0-9-]+)""#).expect("visitor id pattern is valid")
});

/// One Target.com network identity.
///
/// Owns a cookie-keeping transport, a synthetic device id, and the
/// identifiers harvested during warm-up. Phase only moves forward; a session
/// that hits [`AuthPhase::AuthFailed`] must be dropped and rebuilt.
pub struct TargetSession {
    transport: Box<dyn Transport>,
    interactive: Option<Box<dyn InteractiveLogin>>,
    phase: AuthPhase,
    device_id: String,
    visitor_id: Option<String>,
    tealeaf_id: Option<String>,
}

impl TargetSession {
    /// Build a session over a fresh HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be constructed, for example
    /// when the configured proxy URL is invalid.
    pub fn new(options: &TransportOptions) -> Result<Self, BotError> {
        Ok(Self::with_transport(Box::new(HttpTransport::new(options)?)))
    }

    /// Build a session over an existing transport.
    #[must_use]
    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            interactive: None,
            phase: AuthPhase::Unauthenticated,
            device_id: generate_device_id(),
            visitor_id: None,
            tealeaf_id: None,
        }
    }

    /// Attach an interactive-login capability. When present, `login` defers
    /// credential entry to it instead of the direct token exchange.
    #[must_use]
    pub fn with_interactive(mut self, interactive: Box<dyn InteractiveLogin>) -> Self {
        self.interactive = Some(interactive);
        self
    }

    fn set_phase(&mut self, next: AuthPhase) {
        debug!(from = %self.phase, to = %next, "session phase transition");
        self.phase = next;
    }

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo::for_session(self.visitor_id.as_deref(), self.tealeaf_id.as_deref())
    }

    /// Scan a page body for the embedded visitor id. First hit wins; later
    /// pages never overwrite it.
    fn scan_visitor_id(&mut self, page_body: &[u8]) {
        if self.visitor_id.is_some() {
            return;
        }
        let body = String::from_utf8_lossy(page_body);
        if let Some(captures) = VISITOR_ID_RE.captures(&body) {
            self.visitor_id = captures.get(1).map(|m| m.as_str().to_owned());
            debug!(visitor_id = ?self.visitor_id, "harvested visitor id");
        }
    }

    /// Pick up the Tealeaf session cookie once the warm-up pages have set it.
    fn harvest_tealeaf_cookie(&mut self) {
        if let Ok(url) = Url::parse(BASE_URL) {
            if let Some(value) = cookie_value(self.transport.as_ref(), &url, "TealeafAkaSid") {
                self.tealeaf_id = Some(value);
            }
        }
    }

    /// Direct credential exchange, used when no interactive capability is
    /// attached: validate credentials, best-effort skip of phone
    /// verification, exchange the one-time code for tokens, confirm them.
    async fn login_direct(
        &mut self,
        email: &str,
        password: &SecretString,
    ) -> Result<(), BotError> {
        let code = self.validate_credentials(email, password).await?;
        self.skip_phone_verification().await;
        self.exchange_tokens(code).await?;
        self.validate_tokens().await?;
        Ok(())
    }

    async fn validate_credentials(
        &mut self,
        email: &str,
        password: &SecretString,
    ) -> Result<String, BotError> {
        let request = CredentialValidationRequest {
            username: email.to_owned(),
            password: password.expose_secret().to_owned(),
            device_info: self.device_info(),
            keep_me_signed_in: false,
        };
        let body = serde_json::to_vec(&request)?;

        let response = self
            .transport
            .execute(
                Method::POST,
                CRED_VALIDATIONS_URL,
                wire::gsp_headers(),
                Some(body),
            )
            .await?;

        if response.status.as_u16() != 202 {
            self.set_phase(AuthPhase::AuthFailed);
            return Err(BotError::Auth(format!(
                "credential validation rejected with status {}: {}",
                response.status,
                body_snippet(&response.body)
            )));
        }

        let parsed: CredentialValidationResponse = serde_json::from_slice(&response.body)?;
        match parsed.code {
            Some(code) => Ok(code),
            None => {
                self.set_phase(AuthPhase::AuthFailed);
                Err(BotError::MissingField {
                    field: "code",
                    body: body_snippet(&response.body),
                })
            }
        }
    }

    /// Best effort: a failure here does not block login.
    async fn skip_phone_verification(&mut self) {
        let result = self
            .transport
            .execute(
                Method::POST,
                SKIP_PHONE_URL,
                wire::gsp_headers(),
                Some(b"{}".to_vec()),
            )
            .await;

        match result {
            Ok(response) if response.status.is_success() => {}
            Ok(response) => {
                warn!(status = %response.status, "phone verification skip rejected, continuing");
            }
            Err(err) => {
                warn!(error = %err, "phone verification skip failed, continuing");
            }
        }
    }

    async fn exchange_tokens(&mut self, code: String) -> Result<(), BotError> {
        let request = ClientTokensRequest::authorization_code(code, self.device_info());
        let body = serde_json::to_vec(&request)?;

        let response = self
            .transport
            .execute(
                Method::POST,
                CLIENT_TOKENS_URL,
                wire::gsp_headers(),
                Some(body),
            )
            .await?;

        if response.status.as_u16() != 201 {
            self.set_phase(AuthPhase::AuthFailed);
            return Err(BotError::Auth(format!(
                "token exchange rejected with status {}: {}",
                response.status,
                body_snippet(&response.body)
            )));
        }
        Ok(())
    }

    async fn validate_tokens(&mut self) -> Result<(), BotError> {
        let response = self
            .transport
            .execute(
                Method::POST,
                TOKEN_VALIDATIONS_URL,
                wire::gsp_headers(),
                Some(b"{}".to_vec()),
            )
            .await?;

        if !response.status.is_success() {
            self.set_phase(AuthPhase::AuthFailed);
            return Err(BotError::Auth(format!(
                "token validation rejected with status {}: {}",
                response.status,
                body_snippet(&response.body)
            )));
        }
        Ok(())
    }

    /// Replay interactively obtained cookies across every service host.
    fn inject_handoff(&mut self, handoff: crate::session::LoginHandoff) {
        for domain in COOKIE_DOMAINS {
            let Ok(url) = Url::parse(domain) else {
                continue;
            };
            for cookie in &handoff.cookies {
                self.transport
                    .store_cookie(&url, &cookie.to_set_cookie_string());
            }
        }
        if handoff.visitor_id.is_some() {
            self.visitor_id = handoff.visitor_id;
        }
    }
}

#[async_trait]
impl Session for TargetSession {
    fn phase(&self) -> AuthPhase {
        self.phase
    }

    async fn warm_up(&mut self) -> Result<(), BotError> {
        match self.phase {
            AuthPhase::Warmed | AuthPhase::LoggedIn => {
                debug!(phase = %self.phase, "warm-up skipped");
                return Ok(());
            }
            AuthPhase::AuthFailed => {
                return Err(BotError::Phase(
                    "cannot warm up a failed session".to_owned(),
                ));
            }
            AuthPhase::Unauthenticated => {}
        }

        let root = self
            .transport
            .execute(Method::GET, BASE_URL, wire::navigate_headers(), None)
            .await?;
        if !root.status.is_success() {
            warn!(status = %root.status, "storefront root returned non-success during warm-up");
        }
        self.scan_visitor_id(&root.body);

        let login_page = self
            .transport
            .execute(Method::GET, LOGIN_PAGE_URL, wire::navigate_headers(), None)
            .await?;
        if !login_page.status.is_success() {
            warn!(status = %login_page.status, "login page returned non-success during warm-up");
        }
        self.scan_visitor_id(&login_page.body);

        self.harvest_tealeaf_cookie();
        if self.visitor_id.is_none() {
            warn!("no visitor id found during warm-up, continuing degraded");
        }

        self.set_phase(AuthPhase::Warmed);
        info!(device_id = %self.device_id, "session warmed");
        Ok(())
    }

    async fn login(&mut self, email: &str, password: &SecretString) -> Result<(), BotError> {
        if self.phase != AuthPhase::Warmed {
            return Err(BotError::Phase(format!(
                "login requires a warmed session, current phase is {}",
                self.phase
            )));
        }

        if let Some(interactive) = self.interactive.take() {
            match interactive.login(email, password).await {
                Ok(handoff) => {
                    let cookie_count = handoff.cookies.len();
                    self.inject_handoff(handoff);
                    self.set_phase(AuthPhase::LoggedIn);
                    info!(email, cookie_count, "logged in via interactive handoff");
                    Ok(())
                }
                Err(err) => {
                    self.set_phase(AuthPhase::AuthFailed);
                    Err(BotError::Auth(format!("interactive login failed: {err}")))
                }
            }
        } else {
            self.login_direct(email, password).await?;
            self.set_phase(AuthPhase::LoggedIn);
            info!(email, "logged in via direct credential exchange");
            Ok(())
        }
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, BotError> {
        self.transport.execute(method, url, headers, body).await
    }

    fn current_cookies(&self) -> HashMap<String, String> {
        let Ok(url) = Url::parse(BASE_URL) else {
            return HashMap::new();
        };
        let Some(header) = self.transport.cookie_header(&url) else {
            return HashMap::new();
        };

        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .filter(|(name, _)| PX_COOKIE_NAMES.contains(name))
            .map(|(name, value)| (name.to_owned(), value.to_owned()))
            .collect()
    }

    fn visitor_id(&self) -> Option<&str> {
        self.visitor_id.as_deref()
    }
}

/// A random 64-hex-character device identifier, generated once per session.
fn generate_device_id() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().fold(String::with_capacity(64), |mut out, b| {
        use std::fmt::Write;
        let _ = write!(out, "{b:02x}");
        out
    })
}

fn cookie_value(transport: &dyn Transport, url: &Url, name: &str) -> Option<String> {
    transport.cookie_header(url)?.split(';').find_map(|pair| {
        let (cookie_name, value) = pair.trim().split_once('=')?;
        (cookie_name == name).then(|| value.to_owned())
    })
}
