//! Bot entrypoint: load configuration, bootstrap the pool, feed it events.
//!
//! Stock monitoring is out of scope for this binary; it synthesizes one
//! event per configured product and closes the channel, which drains the
//! pool to a clean shutdown. A real deployment replaces the synthetic sender
//! with a monitor publishing into the same channel.

use std::process::ExitCode;

use redcart_bot::client::{CheckoutClient, NoopClient};
use redcart_bot::config::BotConfig;
use redcart_bot::error::BotError;
use redcart_bot::orchestrator::Orchestrator;
use redcart_bot::session::Session;
use redcart_bot::target::{TargetCheckout, TargetSession};
use redcart_bot::transport::TransportOptions;
use redcart_core::StockEvent;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("redcart=info")))
        .with(fmt::layer())
        .init();

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    info!(
        workers = config.worker_count,
        live = config.live,
        products = config.products.len(),
        "starting"
    );

    let orchestrator = match build_pool(&config).await {
        Ok(orchestrator) => orchestrator,
        Err(err) => {
            error!(error = %err, "pool bootstrap failed");
            return ExitCode::FAILURE;
        }
    };

    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    for product in &config.products {
        let event = StockEvent {
            product: product.clone(),
            offer_id: String::new(),
            location_id: product.store_id.clone(),
        };
        if tx.send(event).await.is_err() {
            break;
        }
    }
    // Closing the sender is the pool's shutdown signal.
    drop(tx);

    orchestrator.run(rx).await;
    ExitCode::SUCCESS
}

async fn build_pool(config: &BotConfig) -> Result<Orchestrator, BotError> {
    let live = config.live;
    let profile = config.profile.clone();
    let proxies = config.proxies.clone();

    Orchestrator::new(config, move |worker_id| {
        let profile = profile.clone();
        let proxy = if proxies.is_empty() {
            None
        } else {
            proxies.get(worker_id % proxies.len()).cloned()
        };
        async move {
            if !live {
                return Ok(Box::new(NoopClient) as Box<dyn CheckoutClient>);
            }
            let options = TransportOptions {
                proxy,
                ..TransportOptions::default()
            };
            let session = Box::new(TargetSession::new(&options)?) as Box<dyn Session>;
            let client = TargetCheckout::connect(session, &profile).await?;
            Ok(Box::new(client) as Box<dyn CheckoutClient>)
        }
    })
    .await
}
