//! Planning, roster and cancellation flows through the coordinator.

mod common;

use chrono::Duration;
use common::*;
use raid_core::{RaidStatus, Rejection, Role, TargetRef};
use raid_runtime::{Clock, PlanRaid, RaidError, RaidEvent, RaidRepository, Topic};

fn rejection(err: RaidError) -> Rejection {
    match err {
        RaidError::Rejected(rejection) => rejection,
        other => panic!("expected a rejection, got {other:?}"),
    }
}

#[test]
fn planning_charges_the_attacking_treasury() {
    let fx = Fixture::new();
    let attempt = fx.plan(TargetRef::property(WAREHOUSE));

    assert_eq!(attempt.status(), RaidStatus::Planning);
    assert_eq!(attempt.roster().len(), 1);
    assert_eq!(attempt.roster()[0].role, Role::Leader);
    assert_eq!(attempt.defender().map(|d| d.id), Some(VIPERS));
    assert_eq!(attempt.target().name, "Viper Warehouse");
    assert_eq!(
        fx.treasury(WOLVES),
        WOLVES_TREASURY - fx.coordinator.config().lifecycle.planning_cost
    );
}

#[test]
fn planning_publishes_after_commit() {
    let fx = Fixture::new();
    let mut lifecycle = fx.events.subscribe(Topic::Lifecycle);

    let attempt = fx.plan(TargetRef::property(WAREHOUSE));

    match lifecycle.try_recv().expect("planned event") {
        RaidEvent::Planned { raid, leader, .. } => {
            assert_eq!(raid, attempt.id());
            assert_eq!(leader, ASH);
        }
        other => panic!("unexpected event {other:?}"),
    }
    let stored = fx.world(|world| world.raid(attempt.id()).unwrap());
    assert_eq!(stored, Some(attempt));
}

// Scenario B
#[test]
fn raiding_a_members_property_is_rejected_before_anything_is_written() {
    let fx = Fixture::new();
    let version = fx.store.version().unwrap();

    let err = fx
        .coordinator
        .validate_target(WOLVES, TargetRef::property(DEN))
        .unwrap_err();
    assert_eq!(rejection(err), Rejection::SelfOwnedTarget);

    let err = fx
        .coordinator
        .plan_raid(PlanRaid {
            attacker: WOLVES,
            planned_by: ASH,
            leader: ASH,
            target: TargetRef::property(DEN),
        })
        .unwrap_err();
    assert_eq!(rejection(err), Rejection::SelfOwnedTarget);

    assert_eq!(fx.store.version().unwrap(), version);
    assert_eq!(fx.treasury(WOLVES), WOLVES_TREASURY);
}

#[test]
fn own_treasury_and_territory_are_off_limits() {
    let fx = Fixture::new();
    let err = fx
        .coordinator
        .validate_target(WOLVES, TargetRef::treasury(WOLVES))
        .unwrap_err();
    assert_eq!(rejection(err), Rejection::OwnTreasury);

    let err = fx
        .coordinator
        .validate_target(VIPERS, TargetRef::territory(UPTOWN))
        .unwrap_err();
    assert_eq!(rejection(err), Rejection::OwnTreasury);
}

#[test]
fn uncontrolled_territory_has_no_defender() {
    let fx = Fixture::new();
    let err = fx
        .coordinator
        .validate_target(WOLVES, TargetRef::territory(BADLANDS))
        .unwrap_err();
    assert_eq!(rejection(err), Rejection::NoDefendingFaction);
}

#[test]
fn unknown_targets_are_not_found() {
    let fx = Fixture::new();
    let err = fx
        .coordinator
        .validate_target(WOLVES, TargetRef::property(raid_core::AssetId(999)))
        .unwrap_err();
    assert!(matches!(err, RaidError::NotFound(_)));

    // A plain property is not a production target.
    let err = fx
        .coordinator
        .validate_target(WOLVES, TargetRef::production(WAREHOUSE))
        .unwrap_err();
    assert!(matches!(err, RaidError::NotFound(_)));
}

#[test]
fn only_the_faction_leader_may_plan() {
    let fx = Fixture::new();
    let err = fx
        .coordinator
        .plan_raid(PlanRaid {
            attacker: WOLVES,
            planned_by: BO,
            leader: BO,
            target: TargetRef::property(WAREHOUSE),
        })
        .unwrap_err();
    assert_eq!(rejection(err), Rejection::Unauthorized { actor: BO });

    let err = fx
        .coordinator
        .plan_raid(PlanRaid {
            attacker: WOLVES,
            planned_by: ASH,
            leader: DRIFTER,
            target: TargetRef::property(WAREHOUSE),
        })
        .unwrap_err();
    assert_eq!(
        rejection(err),
        Rejection::NotFactionMember { character: DRIFTER }
    );
}

#[test]
fn planning_requires_funds() {
    let mut world = world();
    let mut wolves = world_faction(&world, WOLVES);
    wolves.treasury = 100;
    world.insert_faction(wolves);
    let fx = Fixture::with(world, high_rolls());

    let err = fx
        .coordinator
        .plan_raid(PlanRaid {
            attacker: WOLVES,
            planned_by: ASH,
            leader: ASH,
            target: TargetRef::property(WAREHOUSE),
        })
        .unwrap_err();
    assert!(matches!(
        rejection(err),
        Rejection::InsufficientFunds { available: 100, .. }
    ));
    assert_eq!(fx.treasury(WOLVES), 100);
}

fn world_faction(
    world: &raid_runtime::MemoryWorld,
    id: raid_core::FactionId,
) -> raid_runtime::FactionRecord {
    use raid_runtime::FactionStore;
    world.faction(id).unwrap().unwrap()
}

// Scenario D, first half: the open attempt blocks a second one.
#[test]
fn second_attempt_on_the_same_target_is_rejected() {
    let fx = Fixture::new();
    fx.plan(TargetRef::property(WAREHOUSE));

    let err = fx
        .coordinator
        .validate_target(WOLVES, TargetRef::property(WAREHOUSE))
        .unwrap_err();
    assert_eq!(rejection(err), Rejection::ActiveAttemptExists);
}

#[test]
fn scheduling_is_leader_only_and_windowed() {
    let fx = Fixture::new();
    let attempt = fx.plan(TargetRef::property(WAREHOUSE));
    let now = fx.clock.now();

    let err = fx
        .coordinator
        .schedule_raid(attempt.id(), BO, now + Duration::hours(1))
        .unwrap_err();
    assert_eq!(rejection(err), Rejection::Unauthorized { actor: BO });

    for at in [now + Duration::minutes(5), now + Duration::hours(30)] {
        let err = fx
            .coordinator
            .schedule_raid(attempt.id(), ASH, at)
            .unwrap_err();
        assert!(matches!(rejection(err), Rejection::SchedulingWindow { .. }));
    }

    let scheduled = fx
        .coordinator
        .schedule_raid(attempt.id(), ASH, now + Duration::hours(2))
        .unwrap();
    assert_eq!(scheduled.status(), RaidStatus::Scheduled);
    assert_eq!(
        scheduled.timeline().scheduled_for,
        Some(now + Duration::hours(2))
    );

    // Already scheduled.
    let err = fx
        .coordinator
        .schedule_raid(attempt.id(), ASH, now + Duration::hours(3))
        .unwrap_err();
    assert!(matches!(rejection(err), Rejection::InvalidStatus { .. }));
}

#[test]
fn roster_rules() {
    let mut config = raid_core::RaidConfig::default();
    config.lifecycle.max_roster = 2;
    let fx = Fixture::with_config(world(), high_rolls(), config);
    let attempt = fx.plan(TargetRef::property(WAREHOUSE));
    let id = attempt.id();

    let err = fx.coordinator.join_raid(id, DRIFTER, Role::Attacker).unwrap_err();
    assert_eq!(
        rejection(err),
        Rejection::NotFactionMember { character: DRIFTER }
    );

    let joined = fx.coordinator.join_raid(id, BO, Role::Leader).unwrap();
    assert_eq!(joined.roster()[1].role, Role::Attacker);

    let err = fx.coordinator.join_raid(id, BO, Role::Scout).unwrap_err();
    assert_eq!(rejection(err), Rejection::AlreadyOnRoster { character: BO });

    let err = fx.coordinator.join_raid(id, CY, Role::Scout).unwrap_err();
    assert_eq!(rejection(err), Rejection::RosterFull { max: 2 });

    let err = fx.coordinator.leave_raid(id, ASH).unwrap_err();
    assert_eq!(rejection(err), Rejection::Unauthorized { actor: ASH });

    let left = fx.coordinator.leave_raid(id, BO).unwrap();
    assert_eq!(left.roster().len(), 1);

    let rejoined = fx.coordinator.join_raid(id, CY, Role::Scout).unwrap();
    assert_eq!(rejoined.roster().len(), 2);
}

#[test]
fn joining_after_execution_fails() {
    let fx = Fixture::with_rng(high_rolls());
    let attempt = fx.ready(TargetRef::property(WAREHOUSE));
    fx.coordinator.execute_raid(attempt.id()).unwrap();

    let err = fx
        .coordinator
        .join_raid(attempt.id(), CY, Role::Scout)
        .unwrap_err();
    assert!(matches!(
        rejection(err),
        Rejection::InvalidStatus {
            status: RaidStatus::Completed
        }
    ));
}

// Scenario C
#[test]
fn outsiders_cannot_cancel() {
    let fx = Fixture::new();
    let attempt = fx.plan(TargetRef::property(WAREHOUSE));

    let err = fx.coordinator.cancel_raid(attempt.id(), VEX).unwrap_err();
    assert_eq!(rejection(err), Rejection::Unauthorized { actor: VEX });

    let err = fx.coordinator.cancel_raid(attempt.id(), CY).unwrap_err();
    assert_eq!(rejection(err), Rejection::Unauthorized { actor: CY });

    let stored = fx.coordinator.get_raid(attempt.id()).unwrap();
    assert_eq!(stored.status(), RaidStatus::Planning);
}

#[test]
fn raid_leader_cancels_a_scheduled_raid() {
    let fx = Fixture::new();
    let attempt = fx.schedule(TargetRef::property(WAREHOUSE));
    fx.coordinator
        .join_raid(attempt.id(), BO, Role::Attacker)
        .unwrap();
    let mut lifecycle = fx.events.subscribe(Topic::Lifecycle);

    let cancelled = fx.coordinator.cancel_raid(attempt.id(), ASH).unwrap();
    assert_eq!(cancelled.status(), RaidStatus::Cancelled);
    assert!(cancelled.timeline().completed_at.is_some());

    match lifecycle.try_recv().expect("cancelled event") {
        RaidEvent::Cancelled { by, roster, .. } => {
            assert_eq!(by, ASH);
            assert_eq!(roster, vec![ASH, BO]);
        }
        other => panic!("unexpected event {other:?}"),
    }

    // The target is free again and nothing is due.
    fx.coordinator
        .validate_target(WOLVES, TargetRef::property(WAREHOUSE))
        .unwrap();
    fx.clock.advance(Duration::hours(2));
    assert!(fx.coordinator.due_raids().unwrap().is_empty());
}

#[test]
fn active_raids_are_listed_for_both_sides() {
    let fx = Fixture::new();
    let first = fx.plan(TargetRef::property(WAREHOUSE));
    let second = fx.plan(TargetRef::treasury(VIPERS));
    fx.coordinator.cancel_raid(second.id(), ASH).unwrap();

    let attacking = fx.coordinator.active_raids_for_faction(WOLVES).unwrap();
    let defending = fx.coordinator.active_raids_for_faction(VIPERS).unwrap();
    assert_eq!(attacking.len(), 1);
    assert_eq!(attacking[0].id(), first.id());
    assert_eq!(defending, attacking);
}
