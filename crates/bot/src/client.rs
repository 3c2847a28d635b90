//! The checkout capability a worker drives its tasks through.

use async_trait::async_trait;
use redcart_core::{CartId, OrderId, Profile, StockEvent};
use tracing::info;

use crate::error::BotError;

/// The two purchase operations a task needs, in the order it needs them.
///
/// `&mut self` because a client fronts one exclusively owned session; a
/// worker never interleaves tasks, so no internal locking is needed.
#[async_trait]
pub trait CheckoutClient: Send {
    /// Claim one unit of the event's product and return the cart that holds
    /// the reservation.
    async fn reserve(&mut self, event: &StockEvent) -> Result<CartId, BotError>;

    /// Submit payment against a reserved cart and return the order
    /// confirmation.
    async fn submit_payment(
        &mut self,
        cart_id: &CartId,
        profile: &Profile,
    ) -> Result<OrderId, BotError>;
}

/// Dry-run client: succeeds instantly without touching the network.
///
/// Used when the bot runs without live mode so the pool, channel, and task
/// machinery can be exercised end to end.
#[derive(Debug, Default)]
pub struct NoopClient;

#[async_trait]
impl CheckoutClient for NoopClient {
    async fn reserve(&mut self, event: &StockEvent) -> Result<CartId, BotError> {
        info!(tcin = %event.product.tcin, "dry-run reserve");
        Ok(CartId::new("noop-cart-001"))
    }

    async fn submit_payment(
        &mut self,
        cart_id: &CartId,
        _profile: &Profile,
    ) -> Result<OrderId, BotError> {
        info!(cart_id = %cart_id, "dry-run payment");
        Ok(OrderId::new("noop-order-001"))
    }
}
