//! Notification worker.
//!
//! Turns committed raid events into player notifications. Runs outside every
//! raid transaction: a transport failure is logged and the event is dropped.

use std::collections::BTreeSet;
use std::sync::Arc;

use raid_core::{CharacterId, FactionId, OutcomeTier, RaidStatus};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::events::{EventBus, RaidEvent, RaidSummary, Topic};
use crate::notification::{Notification, NotificationKind, NotificationTransport};
use crate::repository::{FactionStore, RaidStore};

pub struct NotificationWorker<S: RaidStore> {
    store: Arc<S>,
    transport: Arc<dyn NotificationTransport>,
    lifecycle_rx: broadcast::Receiver<RaidEvent>,
    resolution_rx: broadcast::Receiver<RaidEvent>,
    shutdown: watch::Receiver<bool>,
}

impl<S: RaidStore> NotificationWorker<S> {
    pub fn new(
        store: Arc<S>,
        transport: Arc<dyn NotificationTransport>,
        events: &EventBus,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            store,
            transport,
            lifecycle_rx: events.subscribe(Topic::Lifecycle),
            resolution_rx: events.subscribe(Topic::Resolution),
            shutdown,
        }
    }

    pub async fn run(mut self) {
        info!("NotificationWorker started");

        loop {
            let received = tokio::select! {
                event = self.lifecycle_rx.recv() => event,
                event = self.resolution_rx.recv() => event,
                _ = self.shutdown.changed() => {
                    info!("Shutdown requested, stopping NotificationWorker");
                    break;
                }
            };

            match received {
                Ok(event) => self.handle(&event).await,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "NotificationWorker lagged; notifications dropped");
                }
                Err(RecvError::Closed) => {
                    info!("Event bus closed, shutting down NotificationWorker");
                    break;
                }
            }
        }
    }

    async fn handle(&self, event: &RaidEvent) {
        let notifications = self.notifications_for(event);
        if notifications.is_empty() {
            return;
        }
        debug!(raid = %event.raid(), count = notifications.len(), "dispatching notifications");

        for notification in notifications {
            let recipient = notification.recipient;
            if let Err(error) = self.transport.notify(notification).await {
                warn!(raid = %event.raid(), %recipient, %error, "notification not delivered");
            }
        }
    }

    fn notifications_for(&self, event: &RaidEvent) -> Vec<Notification> {
        match event {
            RaidEvent::Scheduled {
                raid,
                attacker,
                defender: Some(defender),
                target,
                execute_at,
            } => {
                let message = format!(
                    "Raid incoming: {} will hit {} at {}",
                    attacker.name,
                    target.name,
                    execute_at.format("%Y-%m-%d %H:%M UTC")
                );
                self.members_of(defender.id)
                    .into_iter()
                    .map(|member| {
                        Notification::new(member, NotificationKind::RaidIncoming, &message, *raid)
                    })
                    .collect()
            }
            RaidEvent::Cancelled {
                raid,
                target,
                roster,
                ..
            } => {
                let message = format!("The raid on {} was called off", target.name);
                roster
                    .iter()
                    .map(|member| {
                        Notification::new(*member, NotificationKind::RaidCancelled, &message, *raid)
                    })
                    .collect()
            }
            RaidEvent::Resolved(summary) => {
                // Whole attacking faction, plus roster members who have since left it.
                let mut attackers: BTreeSet<CharacterId> =
                    self.members_of(summary.attacker.id).into_iter().collect();
                attackers.extend(summary.roster.iter().copied());

                let mut notifications: Vec<_> = attackers
                    .into_iter()
                    .map(|member| {
                        Notification::new(
                            member,
                            NotificationKind::RaidResult,
                            attacker_message(summary),
                            summary.raid,
                        )
                    })
                    .collect();
                notifications.extend(self.defender_notifications(summary));
                notifications
            }
            RaidEvent::Recorded(summary) => self.defender_notifications(summary),
            _ => Vec::new(),
        }
    }

    fn defender_notifications(&self, summary: &RaidSummary) -> Vec<Notification> {
        let Some(defender) = &summary.defender else {
            return Vec::new();
        };
        let kind = if summary.status == RaidStatus::Completed {
            NotificationKind::RaidResult
        } else {
            NotificationKind::RaidDefended
        };
        let message = defender_message(summary);
        self.members_of(defender.id)
            .into_iter()
            .map(|member| Notification::new(member, kind, &message, summary.raid))
            .collect()
    }

    fn members_of(&self, faction: FactionId) -> Vec<CharacterId> {
        match self.store.read(|view| view.faction(faction)) {
            Ok(Ok(Some(record))) => record.members.into_iter().collect(),
            Ok(Ok(None)) => Vec::new(),
            Ok(Err(error)) | Err(error) => {
                warn!(%faction, %error, "could not look up faction members");
                Vec::new()
            }
        }
    }
}

fn attacker_message(summary: &RaidSummary) -> String {
    let target = &summary.target.name;
    match summary.outcome() {
        OutcomeTier::CriticalSuccess => format!("Your raid on {target} was a critical success"),
        OutcomeTier::Success => format!("Your raid on {target} succeeded"),
        OutcomeTier::PartialSuccess => format!("Your raid on {target} partially succeeded"),
        OutcomeTier::Failure => format!("Your raid on {target} failed"),
        OutcomeTier::CriticalFailure => {
            format!("Your raid on {target} was a disaster and the crew got ambushed")
        }
    }
}

fn defender_message(summary: &RaidSummary) -> String {
    let target = &summary.target.name;
    let attacker = &summary.attacker.name;
    match summary.status {
        RaidStatus::Completed => format!(
            "{attacker} raided {target} ({} damage)",
            summary.result.total_damage
        ),
        RaidStatus::Defended => format!("Your crew fought off {attacker} at {target}"),
        _ => format!("{attacker} tried to raid {target} and failed"),
    }
}
