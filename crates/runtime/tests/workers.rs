//! Background workers and the runtime builder.

mod common;

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Duration;
use common::*;
use raid_content::ConfigLoader;
use raid_core::{RaidConfig, RaidStatus, Role, TargetRef};
use raid_runtime::{
    Clock, InMemoryRaidStore, ManualClock, Notification, NotificationError, NotificationKind,
    NotificationTransport, NotificationWorker, PlanRaid, RaidError, RaidEvent, RaidRuntime,
    RuntimeConfig, SchedulerWorker, TickReport, Topic, run_due_raids,
};
use tokio::sync::watch;

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingTransport {
    fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    async fn wait_for(&self, count: usize) -> Vec<Notification> {
        for _ in 0..200 {
            let sent = self.sent();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(StdDuration::from_millis(5)).await;
        }
        panic!("expected {count} notifications, got {:?}", self.sent());
    }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    async fn notify(&self, notification: Notification) -> Result<(), NotificationError> {
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

/// Rejects every delivery.
struct BrokenTransport;

#[async_trait]
impl NotificationTransport for BrokenTransport {
    async fn notify(&self, notification: Notification) -> Result<(), NotificationError> {
        Err(NotificationError::Unreachable(notification.recipient))
    }
}

fn spawn_notifier(
    fx: &Fixture,
    transport: Arc<dyn NotificationTransport>,
) -> (watch::Sender<bool>, tokio::task::JoinHandle<()>) {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = NotificationWorker::new(Arc::clone(&fx.store), transport, &fx.events, shutdown_rx);
    (shutdown_tx, tokio::spawn(worker.run()))
}

#[tokio::test]
async fn defenders_hear_about_scheduled_raids() {
    let fx = Fixture::new();
    let transport = Arc::new(RecordingTransport::default());
    let (shutdown, handle) = spawn_notifier(&fx, transport.clone());

    let attempt = fx.schedule(TargetRef::property(WAREHOUSE));

    let sent = transport.wait_for(2).await;
    let mut recipients: Vec<_> = sent.iter().map(|n| n.recipient).collect();
    recipients.sort();
    assert_eq!(recipients, vec![VEX, WREN]);
    for notification in &sent {
        assert_eq!(notification.kind, NotificationKind::RaidIncoming);
        assert!(notification.message.starts_with("Raid incoming: Wolves"));
        assert!(notification.message.contains("Viper Warehouse"));
        assert_eq!(notification.link, format!("/raids/{}", attempt.id().0));
    }

    shutdown.send(true).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn both_sides_hear_the_result() {
    let fx = Fixture::with_rng(high_rolls());
    let attempt = fx.ready(TargetRef::property(WAREHOUSE));
    let transport = Arc::new(RecordingTransport::default());
    let (shutdown, handle) = spawn_notifier(&fx, transport.clone());

    fx.coordinator.execute_raid(attempt.id()).unwrap();

    // Every Wolf hears the result, not only ASH and BO on the roster.
    let sent = transport.wait_for(5).await;
    let attackers: Vec<_> = sent
        .iter()
        .filter(|n| [ASH, BO, CY].contains(&n.recipient))
        .collect();
    assert_eq!(attackers.len(), 3);
    assert!(attackers.iter().all(|n| n.kind == NotificationKind::RaidResult));
    assert!(attackers[0].message.contains("critical success"));

    let defenders: Vec<_> = sent
        .iter()
        .filter(|n| n.recipient == VEX || n.recipient == WREN)
        .collect();
    assert_eq!(defenders.len(), 2);
    assert!(defenders[0].message.contains("Wolves raided Viper Warehouse"));

    shutdown.send(true).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn failed_raids_notify_defenders_as_defended() {
    let fx = Fixture::with_rng(low_rolls());
    let attempt = fx.ready(TargetRef::property(WAREHOUSE));
    let transport = Arc::new(RecordingTransport::default());
    let (shutdown, handle) = spawn_notifier(&fx, transport.clone());

    fx.coordinator.execute_raid(attempt.id()).unwrap();

    let sent = transport.wait_for(5).await;
    let vex = sent.iter().find(|n| n.recipient == VEX).unwrap();
    assert_eq!(vex.kind, NotificationKind::RaidDefended);
    let ash = sent.iter().find(|n| n.recipient == ASH).unwrap();
    assert!(ash.message.contains("ambushed"));

    shutdown.send(true).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn transport_failures_do_not_stop_the_worker() {
    let fx = Fixture::new();
    let (shutdown, handle) = spawn_notifier(&fx, Arc::new(BrokenTransport));

    let attempt = fx.schedule(TargetRef::property(WAREHOUSE));
    fx.coordinator.cancel_raid(attempt.id(), ASH).unwrap();
    tokio::time::sleep(StdDuration::from_millis(20)).await;

    // The raid itself is unaffected by delivery.
    assert_eq!(
        fx.coordinator.get_raid(attempt.id()).unwrap().status(),
        RaidStatus::Cancelled
    );
    assert!(!handle.is_finished());

    shutdown.send(true).unwrap();
    handle.await.unwrap();
}

#[test]
fn scheduler_pass_executes_only_due_raids() {
    let fx = Fixture::with_rng(high_rolls());
    let due = fx.ready(TargetRef::property(WAREHOUSE));
    // Scheduled an hour from the advanced clock.
    let later = fx.schedule(TargetRef::treasury(VIPERS));

    let report = run_due_raids(&fx.coordinator);
    assert_eq!(
        report,
        TickReport {
            resolved: 1,
            skipped: 0,
            failed: 0,
        }
    );
    assert_eq!(
        fx.coordinator.get_raid(due.id()).unwrap().status(),
        RaidStatus::Completed
    );
    assert_eq!(
        fx.coordinator.get_raid(later.id()).unwrap().status(),
        RaidStatus::Scheduled
    );

    // Nothing left to do until the second raid comes due.
    assert_eq!(run_due_raids(&fx.coordinator), TickReport::default());
    fx.clock.advance(Duration::hours(1));
    assert_eq!(run_due_raids(&fx.coordinator).resolved, 1);
}

#[test]
fn scheduler_counts_failed_commits_and_retries() {
    let fx = Fixture::with_rng(high_rolls());
    let attempt = fx.ready(TargetRef::property(WAREHOUSE));
    let coordinator = Arc::new(fx.coordinator);
    let (_shutdown, shutdown_rx) = watch::channel(false);
    let worker = SchedulerWorker::new(
        Arc::clone(&coordinator),
        StdDuration::from_millis(10),
        shutdown_rx,
    );

    fx.store.fail_next_commit();
    assert_eq!(worker.run_once().failed, 1);
    assert_eq!(worker.run_once().resolved, 1);
    assert_eq!(
        coordinator.get_raid(attempt.id()).unwrap().status(),
        RaidStatus::Completed
    );
}

#[tokio::test]
async fn scheduler_worker_stops_on_shutdown() {
    let fx = Fixture::new();
    let (shutdown, shutdown_rx) = watch::channel(false);
    let worker = SchedulerWorker::new(
        Arc::new(fx.coordinator),
        StdDuration::from_millis(10),
        shutdown_rx,
    );
    let handle = tokio::spawn(worker.run());

    tokio::time::sleep(StdDuration::from_millis(30)).await;
    shutdown.send(true).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn runtime_rejects_invalid_rules() {
    let mut rules = RaidConfig::default();
    rules.lifecycle.max_roster = 0;

    let result = RaidRuntime::builder(Arc::new(InMemoryRaidStore::new(world())))
        .raid_config(rules)
        .build()
        .await;
    assert!(matches!(result, Err(RaidError::InvalidConfig(_))));
}

#[tokio::test]
async fn runtime_drives_a_raid_end_to_end() {
    let clock = Arc::new(ManualClock::new(start_time()));
    let transport = Arc::new(RecordingTransport::default());
    let config = RuntimeConfig {
        rng_seed: Some(7),
        ..RuntimeConfig::default()
    };
    let runtime = RaidRuntime::builder(Arc::new(InMemoryRaidStore::new(world())))
        .config(config)
        .raid_config(ConfigLoader::load_default().unwrap())
        .clock(clock.clone())
        .rng(high_rolls())
        .transport(transport.clone())
        .enable_scheduler(false)
        .build()
        .await
        .unwrap();
    let mut resolution = runtime.subscribe(Topic::Resolution);

    let coordinator = runtime.coordinator();
    let attempt = coordinator
        .plan_raid(PlanRaid {
            attacker: WOLVES,
            planned_by: ASH,
            leader: ASH,
            target: TargetRef::treasury(VIPERS),
        })
        .unwrap();
    coordinator.join_raid(attempt.id(), CY, Role::Scout).unwrap();
    coordinator
        .schedule_raid(attempt.id(), ASH, clock.now() + Duration::hours(1))
        .unwrap();

    assert_eq!(runtime.tick(), TickReport::default());
    clock.advance(Duration::hours(2));
    assert_eq!(runtime.tick().resolved, 1);

    match resolution.recv().await.unwrap() {
        RaidEvent::Resolved(summary) => assert_eq!(summary.raid, attempt.id()),
        other => panic!("unexpected event {other:?}"),
    }
    // Incoming warnings first, then the result for both factions.
    transport.wait_for(2 + 5).await;

    runtime.shutdown().await;
}

#[tokio::test]
async fn rules_file_overrides_reach_the_coordinator() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[lifecycle]\nplanning_cost = 1234").unwrap();
    let rules = ConfigLoader::load(file.path()).unwrap();

    let runtime = RaidRuntime::builder(Arc::new(InMemoryRaidStore::new(world())))
        .raid_config(rules)
        .enable_scheduler(false)
        .enable_notifications(false)
        .build()
        .await
        .unwrap();
    assert_eq!(runtime.coordinator().config().lifecycle.planning_cost, 1234);

    runtime.shutdown().await;
}
