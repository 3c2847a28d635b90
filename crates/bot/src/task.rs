//! The per-event checkout state machine.
//!
//! One task exists per consumed stock event and runs exactly once:
//! `Idle -> Reserving -> Paying -> Succeeded`, or `-> Failed` from either
//! active phase. There are no retries at this level; a failed task is
//! terminal and the worker simply moves on to the next event.

use std::fmt;

use redcart_core::{CartId, OrderId, Profile, StockEvent};
use thiserror::Error;
use tracing::debug;

use crate::client::CheckoutClient;
use crate::error::BotError;

/// Lifecycle phase of a checkout task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPhase {
    Idle,
    Reserving,
    Paying,
    Succeeded,
    Failed,
}

impl fmt::Display for TaskPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Reserving => "reserving",
            Self::Paying => "paying",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        write!(f, "{label}")
    }
}

/// A task failure, tagged with the phase the flow was in when it failed.
#[derive(Debug, Error)]
#[error("checkout failed while {phase}: {source}")]
pub struct CheckoutError {
    pub phase: TaskPhase,
    #[source]
    pub source: BotError,
}

/// One checkout attempt for one stock event.
#[derive(Debug)]
pub struct Task {
    event: StockEvent,
    phase: TaskPhase,
    cart_id: Option<CartId>,
    order_id: Option<OrderId>,
}

impl Task {
    #[must_use]
    pub fn new(event: StockEvent) -> Self {
        Self {
            event,
            phase: TaskPhase::Idle,
            cart_id: None,
            order_id: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> TaskPhase {
        self.phase
    }

    #[must_use]
    pub fn event(&self) -> &StockEvent {
        &self.event
    }

    #[must_use]
    pub fn cart_id(&self) -> Option<&CartId> {
        self.cart_id.as_ref()
    }

    #[must_use]
    pub fn order_id(&self) -> Option<&OrderId> {
        self.order_id.as_ref()
    }

    fn transition(&mut self, next: TaskPhase) {
        debug!(tcin = %self.event.product.tcin, from = %self.phase, to = %next, "task phase");
        self.phase = next;
    }

    /// Drive the task to completion: reserve, then pay.
    ///
    /// Consumable once. A task not in `Idle` refuses to run again, whatever
    /// the earlier outcome was.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] carrying the phase that failed; the task
    /// lands in [`TaskPhase::Failed`] and stays there.
    pub async fn run(
        &mut self,
        client: &mut dyn CheckoutClient,
        profile: &Profile,
    ) -> Result<OrderId, CheckoutError> {
        if self.phase != TaskPhase::Idle {
            return Err(CheckoutError {
                phase: self.phase,
                source: BotError::Phase(format!(
                    "task already ran, current phase is {}",
                    self.phase
                )),
            });
        }

        self.transition(TaskPhase::Reserving);
        let cart_id = match client.reserve(&self.event).await {
            Ok(cart_id) => cart_id,
            Err(source) => {
                self.transition(TaskPhase::Failed);
                return Err(CheckoutError {
                    phase: TaskPhase::Reserving,
                    source,
                });
            }
        };
        self.cart_id = Some(cart_id.clone());

        self.transition(TaskPhase::Paying);
        let order_id = match client.submit_payment(&cart_id, profile).await {
            Ok(order_id) => order_id,
            Err(source) => {
                self.transition(TaskPhase::Failed);
                return Err(CheckoutError {
                    phase: TaskPhase::Paying,
                    source,
                });
            }
        };
        self.order_id = Some(order_id.clone());

        self.transition(TaskPhase::Succeeded);
        Ok(order_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;

    use crate::fixtures;

    use super::*;

    /// Scripted client: pops one result per call and counts invocations.
    #[derive(Default)]
    pub(crate) struct ScriptedClient {
        pub(crate) reserve_results: VecDeque<Result<CartId, BotError>>,
        pub(crate) payment_results: VecDeque<Result<OrderId, BotError>>,
        pub(crate) reserve_calls: usize,
        pub(crate) payment_calls: usize,
    }

    impl ScriptedClient {
        pub(crate) fn succeeding() -> Self {
            let mut client = Self::default();
            client.reserve_results.push_back(Ok(CartId::new("abc")));
            client
                .payment_results
                .push_back(Ok(OrderId::new("ord-123")));
            client
        }

        pub(crate) fn failing_reserve() -> Self {
            let mut client = Self::default();
            client.reserve_results.push_back(Err(BotError::UnexpectedStatus {
                status: 404,
                body: "PRODUCT_NOT_FOUND".to_string(),
            }));
            client
        }

        pub(crate) fn failing_payment() -> Self {
            let mut client = Self::default();
            client.reserve_results.push_back(Ok(CartId::new("abc")));
            client.payment_results.push_back(Err(BotError::UnexpectedStatus {
                status: 402,
                body: "PAYMENT_DECLINED".to_string(),
            }));
            client
        }
    }

    #[async_trait]
    impl CheckoutClient for ScriptedClient {
        async fn reserve(&mut self, _event: &StockEvent) -> Result<CartId, BotError> {
            self.reserve_calls += 1;
            self.reserve_results
                .pop_front()
                .unwrap_or_else(|| panic!("unscripted reserve call"))
        }

        async fn submit_payment(
            &mut self,
            _cart_id: &CartId,
            _profile: &Profile,
        ) -> Result<OrderId, BotError> {
            self.payment_calls += 1;
            self.payment_results
                .pop_front()
                .unwrap_or_else(|| panic!("unscripted payment call"))
        }
    }

    #[tokio::test]
    async fn test_task_success_path() {
        let mut client = ScriptedClient::succeeding();
        let mut task = Task::new(fixtures::stock_event());

        let order_id = task.run(&mut client, &fixtures::profile()).await.unwrap();

        assert_eq!(order_id.as_str(), "ord-123");
        assert_eq!(task.phase(), TaskPhase::Succeeded);
        assert_eq!(task.cart_id().unwrap().as_str(), "abc");
        assert_eq!(task.order_id().unwrap().as_str(), "ord-123");
    }

    #[tokio::test]
    async fn test_reserve_failure_never_attempts_payment() {
        let mut client = ScriptedClient::failing_reserve();
        let mut task = Task::new(fixtures::stock_event());

        let err = task
            .run(&mut client, &fixtures::profile())
            .await
            .unwrap_err();

        assert_eq!(err.phase, TaskPhase::Reserving);
        assert_eq!(task.phase(), TaskPhase::Failed);
        assert_eq!(client.payment_calls, 0);
        assert!(task.cart_id().is_none());
    }

    #[tokio::test]
    async fn test_payment_failure_keeps_cart_id() {
        let mut client = ScriptedClient::failing_payment();
        let mut task = Task::new(fixtures::stock_event());

        let err = task
            .run(&mut client, &fixtures::profile())
            .await
            .unwrap_err();

        assert_eq!(err.phase, TaskPhase::Paying);
        assert_eq!(task.phase(), TaskPhase::Failed);
        // The reservation happened even though payment was declined.
        assert_eq!(task.cart_id().unwrap().as_str(), "abc");
        assert!(task.order_id().is_none());
    }

    #[tokio::test]
    async fn test_task_refuses_to_run_twice() {
        let mut client = ScriptedClient::succeeding();
        let mut task = Task::new(fixtures::stock_event());
        task.run(&mut client, &fixtures::profile()).await.unwrap();

        let err = task
            .run(&mut client, &fixtures::profile())
            .await
            .unwrap_err();

        assert!(matches!(err.source, BotError::Phase(_)));
        assert_eq!(client.reserve_calls, 1);
        assert_eq!(client.payment_calls, 1);
    }

    #[test]
    fn test_checkout_error_display_names_phase() {
        let err = CheckoutError {
            phase: TaskPhase::Paying,
            source: BotError::UnexpectedStatus {
                status: 402,
                body: "declined".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "checkout failed while paying: unexpected status 402: declined"
        );
    }
}
