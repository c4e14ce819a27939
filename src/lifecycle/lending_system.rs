use crate::clients::LendingClient;
use crate::config::{ConfigError, LendingConfig};
use crate::contract::CarLedger;
use crate::lending::{Clock, SystemClock};
use ledger_framework::{
    BroadcastSink, EventSink, Fanout, LedgerActor, LedgerClient, LedgerEvent, LedgerHost,
    TracingSink,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Seeding failed ({status}): {message}")]
    Seed { status: u16, message: String },
    #[error("Ledger task failed: {0}")]
    Task(String),
}

/// The running car ledger.
///
/// Owns the ledger actor task. Events of committed transitions go to the tracing log
/// and to every receiver handed out by [`subscribe`](Self::subscribe).
///
/// # Example
///
/// ```ignore
/// let system = LendingSystem::start(LendingConfig::default()).await?;
/// let client = system.client();
/// let borrow = client.borrow_car(UserId(1), CarId(3)).await?;
/// let log = client.return_car(UserId(1), 1850, "commute").await?;
/// drop(client);
/// system.shutdown().await?;
/// ```
pub struct LendingSystem<K: Clock = SystemClock> {
    client: LendingClient<K>,
    events: Arc<BroadcastSink>,
    handle: JoinHandle<()>,
}

impl LendingSystem<SystemClock> {
    pub async fn start(config: LendingConfig) -> Result<Self, SystemError> {
        Self::start_with_clock(config, SystemClock).await
    }
}

impl<K: Clock> LendingSystem<K> {
    /// Spawns the ledger and seeds it when `seed_on_start` is set.
    pub async fn start_with_clock(config: LendingConfig, clock: K) -> Result<Self, SystemError> {
        config.validate()?;
        let (actor, ledger) = LedgerActor::new(config.channel_capacity);
        let handle = tokio::spawn(actor.run());

        let events = Arc::new(BroadcastSink::new(config.event_capacity));
        let sink: Arc<dyn EventSink> = Arc::new(
            Fanout::new()
                .with(Arc::new(TracingSink))
                .with(Arc::clone(&events) as Arc<dyn EventSink>),
        );
        let host = LedgerHost::new(CarLedger::with_clock(clock), ledger, sink)
            .with_max_retries(config.max_commit_retries);

        if config.seed_on_start {
            let response = host.init().await;
            if !response.is_success() {
                return Err(SystemError::Seed {
                    status: response.status,
                    message: response.message,
                });
            }
        }

        info!(
            channel_capacity = config.channel_capacity,
            max_commit_retries = config.max_commit_retries,
            seeded = config.seed_on_start,
            "Lending system started"
        );
        Ok(Self {
            client: LendingClient::new(host),
            events,
            handle,
        })
    }

    pub fn client(&self) -> LendingClient<K> {
        self.client.clone()
    }

    /// Direct access to the ledger records, bypassing the contract.
    pub fn ledger(&self) -> &LedgerClient {
        self.client.host().ledger()
    }

    /// Receives the events of every transaction committed from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    /// Stops the ledger once every outstanding [`LendingClient`] clone has been dropped.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down lending system...");
        drop(self.client);

        if let Err(e) = self.handle.await {
            error!("Ledger task failed: {:?}", e);
            return Err(SystemError::Task(e.to_string()));
        }

        info!("Lending system shutdown complete.");
        Ok(())
    }
}
