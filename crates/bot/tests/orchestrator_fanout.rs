//! Pool-level behavior: exactly-once event delivery across competing
//! workers, drain-to-shutdown, and all-or-nothing bootstrap.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redcart_bot::client::CheckoutClient;
use redcart_bot::config::BotConfig;
use redcart_bot::error::BotError;
use redcart_bot::orchestrator::Orchestrator;
use redcart_core::{CartId, OrderId, Profile, StockEvent, TargetProduct};
use tokio::sync::{Mutex, mpsc};

const PROFILE_JSON: &str = r#"{
    "name": "Test User",
    "email": "test@example.com",
    "password": "hunter2",
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

fn test_config(worker_count: usize) -> BotConfig {
    let profile: Profile = serde_json::from_str(PROFILE_JSON).expect("profile fixture parses");
    BotConfig {
        worker_count,
        live: false,
        task_timeout: Duration::from_secs(5),
        profile,
        products: vec![product("12345678")],
        proxies: Vec::new(),
    }
}

fn product(tcin: &str) -> TargetProduct {
    TargetProduct {
        dpci: "057-01-1234".to_string(),
        tcin: tcin.to_string(),
        name: None,
        store_id: "1234".to_string(),
    }
}

fn event(tcin: &str) -> StockEvent {
    StockEvent {
        product: product(tcin),
        offer_id: format!("offer-{tcin}"),
        location_id: "1234".to_string(),
    }
}

type SeenLog = Arc<Mutex<Vec<(usize, String)>>>;

/// Records which worker consumed which event; succeeds every task.
struct CountingClient {
    worker_id: usize,
    seen: SeenLog,
}

#[async_trait]
impl CheckoutClient for CountingClient {
    async fn reserve(&mut self, event: &StockEvent) -> Result<CartId, BotError> {
        self.seen
            .lock()
            .await
            .push((self.worker_id, event.product.tcin.clone()));
        // Yield so other workers get a turn at the channel lock.
        tokio::task::yield_now().await;
        Ok(CartId::new(format!("cart-{}", event.product.tcin)))
    }

    async fn submit_payment(
        &mut self,
        cart_id: &CartId,
        _profile: &Profile,
    ) -> Result<OrderId, BotError> {
        Ok(OrderId::new(format!("order-for-{}", cart_id.as_str())))
    }
}

/// Fails every reserve call.
struct AlwaysFailingClient;

#[async_trait]
impl CheckoutClient for AlwaysFailingClient {
    async fn reserve(&mut self, _event: &StockEvent) -> Result<CartId, BotError> {
        Err(BotError::UnexpectedStatus {
            status: 409,
            body: "OUT_OF_STOCK".to_string(),
        })
    }

    async fn submit_payment(
        &mut self,
        _cart_id: &CartId,
        _profile: &Profile,
    ) -> Result<OrderId, BotError> {
        unreachable!("reserve never succeeds")
    }
}

#[tokio::test]
async fn test_each_event_is_processed_exactly_once() {
    let config = test_config(3);
    let seen: SeenLog = Arc::default();

    let orchestrator = Orchestrator::new(&config, |worker_id| {
        let seen = Arc::clone(&seen);
        async move {
            Ok(Box::new(CountingClient { worker_id, seen }) as Box<dyn CheckoutClient>)
        }
    })
    .await
    .expect("bootstrap succeeds");
    assert_eq!(orchestrator.worker_count(), 3);

    let (tx, rx) = mpsc::channel(16);
    let tcins = ["11111111", "22222222", "33333333", "44444444", "55555555"];
    for tcin in tcins {
        tx.send(event(tcin)).await.expect("channel open");
    }
    drop(tx);

    orchestrator.run(rx).await;

    let mut processed: Vec<String> = seen
        .lock()
        .await
        .iter()
        .map(|(_, tcin)| tcin.clone())
        .collect();
    processed.sort();
    let mut expected: Vec<String> = tcins.iter().map(ToString::to_string).collect();
    expected.sort();
    assert_eq!(processed, expected);
}

#[tokio::test]
async fn test_failing_tasks_still_drain_the_pool() {
    let config = test_config(2);

    let orchestrator = Orchestrator::new(&config, |_worker_id| async {
        Ok(Box::new(AlwaysFailingClient) as Box<dyn CheckoutClient>)
    })
    .await
    .expect("bootstrap succeeds");

    let (tx, rx) = mpsc::channel(16);
    for tcin in ["11111111", "22222222", "33333333"] {
        tx.send(event(tcin)).await.expect("channel open");
    }
    drop(tx);

    // Must return despite every task failing.
    orchestrator.run(rx).await;
}

#[tokio::test]
async fn test_bootstrap_failure_aborts_construction() {
    let config = test_config(3);

    let result = Orchestrator::new(&config, |worker_id| async move {
        if worker_id == 1 {
            Err(BotError::Auth("credentials rejected".to_string()))
        } else {
            Ok(Box::new(AlwaysFailingClient) as Box<dyn CheckoutClient>)
        }
    })
    .await;

    assert!(matches!(result, Err(BotError::Auth(_))));
}
