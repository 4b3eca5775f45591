//! Runtime orchestrator.
//!
//! The runtime owns the coordinator and the background workers, and exposes a
//! builder so embedders choose their store, clock, randomness and transport.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use raid_core::{PcgRng, RaidConfig, RngOracle};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::events::{EventBus, RaidEvent, Topic};
use crate::notification::{LogTransport, NotificationTransport};
use crate::repository::RaidStore;
use crate::services::{RaidCoordinator, SeedPolicy};
use crate::workers::{NotificationWorker, SchedulerWorker, TickReport, run_due_raids};

/// Runtime configuration read from the environment.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// TOML file with raid rules; bundled defaults when unset.
    pub config_path: Option<PathBuf>,
    pub scheduler_tick: Duration,
    /// Capacity of each event topic.
    pub event_buffer: usize,
    /// Base for deterministic per-attempt seeds.
    pub rng_seed: Option<u64>,
    pub enable_scheduler: bool,
    pub enable_notifications: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            scheduler_tick: Duration::from_secs(5),
            event_buffer: 100,
            rng_seed: None,
            enable_scheduler: true,
            enable_notifications: true,
        }
    }
}

impl RuntimeConfig {
    /// Construct runtime configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RAID_CONFIG_PATH` - raid rules TOML file
    /// - `RAID_SCHEDULER_TICK_MS` - scheduler poll interval (default: 5000)
    /// - `RAID_EVENT_BUFFER` - per-topic event capacity (default: 100)
    /// - `RAID_RNG_SEED` - fixed seed base for replayable raids
    /// - `RAID_ENABLE_SCHEDULER`, `RAID_ENABLE_NOTIFICATIONS` - worker toggles
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(path) = read_env::<PathBuf>("RAID_CONFIG_PATH") {
            config.config_path = Some(path);
        }
        if let Some(ms) = read_env::<u64>("RAID_SCHEDULER_TICK_MS") {
            config.scheduler_tick = Duration::from_millis(ms.max(10));
        }
        if let Some(buffer) = read_env::<usize>("RAID_EVENT_BUFFER") {
            config.event_buffer = buffer.max(1);
        }
        if let Some(seed) = read_env::<u64>("RAID_RNG_SEED") {
            config.rng_seed = Some(seed);
        }
        if let Some(enabled) = read_env_bool("RAID_ENABLE_SCHEDULER") {
            config.enable_scheduler = enabled;
        }
        if let Some(enabled) = read_env_bool("RAID_ENABLE_NOTIFICATIONS") {
            config.enable_notifications = enabled;
        }

        config
    }

    pub fn seed_policy(&self) -> SeedPolicy {
        self.rng_seed.map_or(SeedPolicy::Random, SeedPolicy::Fixed)
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Running raid engine.
///
/// Callers drive commands through [`RaidRuntime::coordinator`]; the workers
/// react to committed events in the background.
pub struct RaidRuntime<S: RaidStore> {
    coordinator: Arc<RaidCoordinator<S>>,
    shutdown_tx: watch::Sender<bool>,
    workers: Vec<JoinHandle<()>>,
}

impl<S: RaidStore> RaidRuntime<S> {
    pub fn builder(store: Arc<S>) -> RaidRuntimeBuilder<S> {
        RaidRuntimeBuilder::new(store)
    }

    pub fn coordinator(&self) -> Arc<RaidCoordinator<S>> {
        Arc::clone(&self.coordinator)
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<RaidEvent> {
        self.coordinator.events().subscribe(topic)
    }

    /// Runs one scheduler pass in the caller's task.
    pub fn tick(&self) -> TickReport {
        run_due_raids(&self.coordinator)
    }

    /// Signals every worker and waits for them to stop.
    pub async fn shutdown(self) {
        // Receivers may already be gone; the workers stop either way.
        let _ = self.shutdown_tx.send(true);

        for worker in self.workers {
            if let Err(error) = worker.await {
                warn!(%error, "worker did not stop cleanly");
            }
        }
        info!("Raid runtime stopped");
    }
}

/// Builder for [`RaidRuntime`].
pub struct RaidRuntimeBuilder<S: RaidStore> {
    store: Arc<S>,
    config: RuntimeConfig,
    raid_config: RaidConfig,
    clock: Option<Arc<dyn Clock>>,
    rng: Option<Arc<dyn RngOracle>>,
    transport: Option<Arc<dyn NotificationTransport>>,
}

impl<S: RaidStore> RaidRuntimeBuilder<S> {
    fn new(store: Arc<S>) -> Self {
        Self {
            store,
            config: RuntimeConfig::default(),
            raid_config: RaidConfig::default(),
            clock: None,
            rng: None,
            transport: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Raid rules; validated in [`Self::build`].
    pub fn raid_config(mut self, raid_config: RaidConfig) -> Self {
        self.raid_config = raid_config;
        self
    }

    /// Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Defaults to [`PcgRng`].
    pub fn rng(mut self, rng: Arc<dyn RngOracle>) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Defaults to [`LogTransport`].
    pub fn transport(mut self, transport: Arc<dyn NotificationTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn enable_scheduler(mut self, enable: bool) -> Self {
        self.config.enable_scheduler = enable;
        self
    }

    pub fn enable_notifications(mut self, enable: bool) -> Self {
        self.config.enable_notifications = enable;
        self
    }

    /// Validates the raid rules and spawns the enabled workers.
    pub async fn build(self) -> Result<RaidRuntime<S>> {
        self.raid_config.validate()?;

        let events = EventBus::with_capacity(self.config.event_buffer);
        let coordinator = Arc::new(RaidCoordinator::new(
            Arc::clone(&self.store),
            Arc::new(self.raid_config),
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            self.rng.unwrap_or_else(|| Arc::new(PcgRng)),
            self.config.seed_policy(),
            events.clone(),
        ));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut workers = Vec::new();

        if self.config.enable_notifications {
            let transport = self.transport.unwrap_or_else(|| Arc::new(LogTransport));
            let worker = NotificationWorker::new(
                Arc::clone(&self.store),
                transport,
                &events,
                shutdown_rx.clone(),
            );
            workers.push(tokio::spawn(worker.run()));
        }

        if self.config.enable_scheduler {
            let worker = SchedulerWorker::new(
                Arc::clone(&coordinator),
                self.config.scheduler_tick,
                shutdown_rx,
            );
            workers.push(tokio::spawn(worker.run()));
        }

        info!(
            scheduler = self.config.enable_scheduler,
            notifications = self.config.enable_notifications,
            seeds = ?self.config.seed_policy(),
            "Raid runtime started"
        );

        Ok(RaidRuntime {
            coordinator,
            shutdown_tx,
            workers,
        })
    }
}
