//! The Target.com checkout client: cart-add and order-submit over a
//! logged-in [`Session`].

use redcart_core::{CartId, OrderId, Profile, StockEvent};

use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, info, instrument};

use crate::client::CheckoutClient;
use crate::error::{BotError, body_snippet};
use crate::session::Session;

use super::wire::{self, CartAddRequest, CartAddResponse, OrderSubmitRequest, OrderSubmitResponse};
use super::{CART_ITEMS_URL, CHECKOUT_URL};

/// Live checkout client over an authenticated session.
///
/// [`TargetCheckout::connect`] drives the session bootstrap (warm-up then
/// login) before handing the client back, so a constructed value is always
/// ready to reserve.
pub struct TargetCheckout {
    session: Box<dyn Session>,
    visitor_id: Option<String>,
}

impl TargetCheckout {
    /// Bootstrap a session and wrap it as a checkout client.
    ///
    /// # Errors
    ///
    /// Returns an error if warm-up or login fails; the session is consumed
    /// either way, matching its discard-on-failure lifecycle.
    pub async fn connect(
        mut session: Box<dyn Session>,
        profile: &Profile,
    ) -> Result<Self, BotError> {
        session.warm_up().await?;
        session.login(&profile.email, &profile.password).await?;

        let visitor_id = session.visitor_id().map(str::to_owned);
        Ok(Self {
            session,
            visitor_id,
        })
    }
}

#[async_trait]
impl CheckoutClient for TargetCheckout {
    #[instrument(skip(self, event), fields(tcin = %event.product.tcin))]
    async fn reserve(&mut self, event: &StockEvent) -> Result<CartId, BotError> {
        let body = serde_json::to_vec(&CartAddRequest::single(&event.product.tcin))?;
        debug!("adding item to cart");

        let response = self
            .session
            .execute(
                Method::POST,
                CART_ITEMS_URL,
                wire::cart_headers(self.visitor_id.as_deref()),
                Some(body),
            )
            .await?;

        if !response.status.is_success() {
            return Err(BotError::UnexpectedStatus {
                status: response.status.as_u16(),
                body: body_snippet(&response.body),
            });
        }

        let parsed: CartAddResponse = serde_json::from_slice(&response.body)?;
        let cart_id = parsed.cart_id.ok_or_else(|| BotError::MissingField {
            field: "cart_id",
            body: body_snippet(&response.body),
        })?;

        info!(tcin = %event.product.tcin, cart_id = %cart_id, "item reserved");
        Ok(CartId::new(cart_id))
    }

    #[instrument(skip(self, cart_id, profile), fields(cart_id = %cart_id))]
    async fn submit_payment(
        &mut self,
        cart_id: &CartId,
        profile: &Profile,
    ) -> Result<OrderId, BotError> {
        let body = serde_json::to_vec(&OrderSubmitRequest::new(cart_id.as_str(), profile))?;
        debug!("submitting order");

        let response = self
            .session
            .execute(
                Method::POST,
                CHECKOUT_URL,
                wire::checkout_headers(self.visitor_id.as_deref()),
                Some(body),
            )
            .await?;

        if !response.status.is_success() {
            return Err(BotError::UnexpectedStatus {
                status: response.status.as_u16(),
                body: body_snippet(&response.body),
            });
        }

        let parsed: OrderSubmitResponse = serde_json::from_slice(&response.body)?;
        let order_id = parsed.order_id.ok_or_else(|| BotError::MissingField {
            field: "order_id",
            body: body_snippet(&response.body),
        })?;

        info!(cart_id = %cart_id, order_id = %order_id, "order submitted");
        Ok(OrderId::new(order_id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use reqwest::StatusCode;
    use reqwest::header::HeaderMap;
    use secrecy::SecretString;

    use crate::fixtures;
    use crate::session::AuthPhase;
    use crate::transport::HttpResponse;

    use super::*;

    /// Scripted [`Session`]: serves queued responses and records the calls
    /// made against it. Calls are shared so tests can inspect them after the
    /// session is boxed into the client.
    struct FakeSession {
        phase: AuthPhase,
        responses: Arc<Mutex<VecDeque<Result<HttpResponse, BotError>>>>,
        calls: Arc<Mutex<Vec<String>>>,
        fail_login: bool,
    }

    impl FakeSession {
        fn logged_in() -> Self {
            Self {
                phase: AuthPhase::Unauthenticated,
                responses: Arc::default(),
                calls: Arc::default(),
                fail_login: false,
            }
        }

        fn failing_login() -> Self {
            Self {
                fail_login: true,
                ..Self::logged_in()
            }
        }

        fn push_response(&self, status: u16, body: &str) {
            self.responses.lock().unwrap().push_back(Ok(HttpResponse {
                status: StatusCode::from_u16(status).unwrap(),
                body: body.as_bytes().to_vec(),
            }));
        }

        fn call_log(&self) -> Arc<Mutex<Vec<String>>> {
            Arc::clone(&self.calls)
        }
    }

    #[async_trait]
    impl Session for FakeSession {
        fn phase(&self) -> AuthPhase {
            self.phase
        }

        async fn warm_up(&mut self) -> Result<(), BotError> {
            self.phase = AuthPhase::Warmed;
            Ok(())
        }

        async fn login(&mut self, _email: &str, _password: &SecretString) -> Result<(), BotError> {
            if self.fail_login {
                self.phase = AuthPhase::AuthFailed;
                return Err(BotError::Auth("rejected".to_owned()));
            }
            self.phase = AuthPhase::LoggedIn;
            Ok(())
        }

        async fn execute(
            &self,
            _method: Method,
            url: &str,
            _headers: HeaderMap,
            _body: Option<Vec<u8>>,
        ) -> Result<HttpResponse, BotError> {
            self.calls.lock().unwrap().push(url.to_owned());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("unscripted call to {url}"))
        }

        fn current_cookies(&self) -> HashMap<String, String> {
            HashMap::new()
        }

        fn visitor_id(&self) -> Option<&str> {
            Some("0189ABCDEF-42")
        }
    }

    #[tokio::test]
    async fn test_connect_bootstraps_session() {
        let session = FakeSession::logged_in();
        let client = TargetCheckout::connect(Box::new(session), &fixtures::profile())
            .await
            .unwrap();
        assert_eq!(client.visitor_id.as_deref(), Some("0189ABCDEF-42"));
    }

    #[tokio::test]
    async fn test_connect_propagates_login_failure() {
        let session = FakeSession::failing_login();
        let result = TargetCheckout::connect(Box::new(session), &fixtures::profile()).await;
        match result {
            Err(err) => assert!(matches!(err, BotError::Auth(_))),
            Ok(_) => panic!("connect must fail when login fails"),
        }
    }

    #[tokio::test]
    async fn test_reserve_returns_cart_id() {
        let session = FakeSession::logged_in();
        session.push_response(201, r#"{"cart_id":"abc","summary":{}}"#);

        let mut client = TargetCheckout::connect(Box::new(session), &fixtures::profile())
            .await
            .unwrap();
        let cart_id = client.reserve(&fixtures::stock_event()).await.unwrap();

        assert_eq!(cart_id.as_str(), "abc");
    }

    #[tokio::test]
    async fn test_reserve_rejects_unexpected_status() {
        let session = FakeSession::logged_in();
        session.push_response(409, r#"{"error":"OUT_OF_STOCK"}"#);

        let mut client = TargetCheckout::connect(Box::new(session), &fixtures::profile())
            .await
            .unwrap();
        let err = client
            .reserve(&fixtures::stock_event())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BotError::UnexpectedStatus { status: 409, .. }
        ));
    }

    #[tokio::test]
    async fn test_reserve_requires_cart_id_in_body() {
        let session = FakeSession::logged_in();
        session.push_response(200, "{}");

        let mut client = TargetCheckout::connect(Box::new(session), &fixtures::profile())
            .await
            .unwrap();
        let err = client
            .reserve(&fixtures::stock_event())
            .await
            .unwrap_err();

        assert!(matches!(err, BotError::MissingField { field: "cart_id", .. }));
    }

    #[tokio::test]
    async fn test_submit_payment_returns_order_id() {
        let session = FakeSession::logged_in();
        session.push_response(200, r#"{"order_id":"ord-123"}"#);
        let calls = session.call_log();

        let mut client = TargetCheckout::connect(Box::new(session), &fixtures::profile())
            .await
            .unwrap();
        let order_id = client
            .submit_payment(&CartId::new("abc"), &fixtures::profile())
            .await
            .unwrap();

        assert_eq!(order_id.as_str(), "ord-123");
        let urls = calls.lock().unwrap().clone();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].starts_with("https://carts.target.com/web_checkouts/v1/checkout"));
    }

    #[tokio::test]
    async fn test_reserve_hits_cart_items_endpoint() {
        let session = FakeSession::logged_in();
        session.push_response(201, r#"{"cart_id":"abc"}"#);
        let calls = session.call_log();

        let mut client = TargetCheckout::connect(Box::new(session), &fixtures::profile())
            .await
            .unwrap();
        client.reserve(&fixtures::stock_event()).await.unwrap();

        let urls = calls.lock().unwrap().clone();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].starts_with("https://carts.target.com/web_checkouts/v1/cart_items"));
    }
}
