//! Raid engine simulator.
//!
//! Composition root that seeds an in-memory world, builds a [`RaidRuntime`]
//! driven by a manual clock, and plays a short campaign: one raid per target
//! kind, each planned, staffed, scheduled and resolved by a scheduler pass.
//! Every resolved attempt is printed as a JSON report.
//!
//! ```bash
//! RAID_RNG_SEED=7 RUST_LOG=raid_runtime=debug cargo run -p raid-sim
//! ```

mod world;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use raid_content::ConfigLoader;
use raid_core::{RaidConfig, Role, TargetRef};
use raid_runtime::{
    Clock, InMemoryRaidStore, ManualClock, PlanRaid, RaidReport, RaidRuntime, RuntimeConfig,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use world::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = RuntimeConfig::from_env();
    let _guard = setup_logging(std::env::var_os("RAID_LOG_DIR").as_deref().map(Path::new))?;

    let rules = load_rules(&config)?;
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let store = Arc::new(InMemoryRaidStore::new(world::seed(clock.now())));

    // Passes are driven below so every raid resolves against the manual clock.
    let runtime = RaidRuntime::builder(store)
        .config(config)
        .raid_config(rules)
        .clock(clock.clone())
        .enable_scheduler(false)
        .build()
        .await?;
    let coordinator = runtime.coordinator();

    let targets = [
        TargetRef::property(STASH_HOUSE),
        TargetRef::production(KITCHEN),
        TargetRef::treasury(SAINTS),
        TargetRef::territory(MARKET),
    ];

    for target in targets {
        let attempt = coordinator.plan_raid(PlanRaid {
            attacker: CROWS,
            planned_by: CROW_BOSS,
            leader: CROW_BOSS,
            target,
        });
        let attempt = match attempt {
            Ok(attempt) => attempt,
            Err(error) => {
                tracing::warn!(%error, "raid not planned");
                continue;
            }
        };

        coordinator.join_raid(attempt.id(), CROW_MUSCLE, Role::Attacker)?;
        coordinator.join_raid(attempt.id(), CROW_SCOUT, Role::Scout)?;
        let lead = coordinator.config().lifecycle.min_lead() + Duration::minutes(5);
        coordinator.schedule_raid(attempt.id(), CROW_BOSS, clock.now() + lead)?;

        clock.advance(lead);
        let report = runtime.tick();
        tracing::info!(?report, "scheduler pass");

        let resolved = coordinator.get_raid(attempt.id())?;
        println!("{}", RaidReport::new(&resolved).to_json_pretty()?);
    }

    let history = coordinator.raid_history_for_target(TargetRef::property(STASH_HOUSE))?;
    tracing::info!(raids = history.len(), "stash house history");

    runtime.shutdown().await;
    Ok(())
}

fn load_rules(config: &RuntimeConfig) -> Result<RaidConfig> {
    match &config.config_path {
        Some(path) => ConfigLoader::load(path),
        None => ConfigLoader::load_default(),
    }
    .context("loading raid rules")
}

/// Logs to stderr, and also to `raid-sim.log` under `log_dir` when given.
fn setup_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = tracing_appender::rolling::never(dir, "raid-sim.log");
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(dir) = log_dir {
        tracing::info!("Log file: {}/raid-sim.log", dir.display());
    }
    Ok(guard)
}
