//! JSON views of raid attempts handed to clients.

use raid_core::{
    CombatRecord, FactionRef, Participant, RESULT_SCHEMA_VERSION, RaidAttempt, RaidId,
    RaidOrigin, RaidResult, RaidStatus, RaidTimeline, TargetDescriptor,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("malformed raid result: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported result schema version {found} (expected {RESULT_SCHEMA_VERSION})")]
    UnsupportedVersion { found: u16 },
}

/// Everything a client needs to render one attempt.
#[derive(Debug, Serialize)]
pub struct RaidReport<'a> {
    pub raid: RaidId,
    pub status: RaidStatus,
    pub attacker: &'a FactionRef,
    pub defender: Option<&'a FactionRef>,
    pub target: &'a TargetDescriptor,
    pub origin: &'a RaidOrigin,
    pub roster: &'a [Participant],
    pub timeline: &'a RaidTimeline,
    pub combat: Option<&'a CombatRecord>,
    pub result: Option<&'a RaidResult>,
}

impl<'a> RaidReport<'a> {
    pub fn new(attempt: &'a RaidAttempt) -> Self {
        Self {
            raid: attempt.id(),
            status: attempt.status(),
            attacker: attempt.attacker(),
            defender: attempt.defender(),
            target: attempt.target(),
            origin: attempt.origin(),
            roster: attempt.roster(),
            timeline: attempt.timeline(),
            combat: attempt.combat(),
            result: attempt.result(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Parses a stored result payload, refusing layouts from other schema versions.
pub fn parse_result(json: &str) -> Result<RaidResult, ReportError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let found = value
        .get("schema_version")
        .and_then(serde_json::Value::as_u64)
        .and_then(|version| u16::try_from(version).ok())
        .unwrap_or(0);
    if found != RESULT_SCHEMA_VERSION {
        return Err(ReportError::UnsupportedVersion { found });
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use raid_core::{DamageDetail, OutcomeTier, TargetKind, TreasuryDamage, ZoneId};

    use super::*;

    fn treasury_result() -> RaidResult {
        RaidResult::new(
            OutcomeTier::Success,
            DamageDetail::Treasury(TreasuryDamage {
                theft_fraction: 0.05,
                currency_stolen: 500,
            }),
            120,
            500,
        )
    }

    #[test]
    fn result_payload_is_tagged_by_target_type() {
        let json = serde_json::to_value(treasury_result()).unwrap();
        assert_eq!(json["schema_version"], 1);
        assert_eq!(json["outcome"], "success");
        assert_eq!(json["damage"]["target_type"], "treasury");
        assert_eq!(json["damage"]["currency_stolen"], 500);
    }

    #[test]
    fn stored_payload_parses_back() {
        let json = serde_json::to_string(&treasury_result()).unwrap();
        assert_eq!(parse_result(&json).unwrap(), treasury_result());
    }

    #[test]
    fn other_schema_versions_are_refused() {
        let mut json = serde_json::to_value(RaidResult::new(
            OutcomeTier::Failure,
            DamageDetail::none(TargetKind::Property, ZoneId(1)),
            20,
            0,
        ))
        .unwrap();
        json["schema_version"] = 7.into();

        let err = parse_result(&json.to_string()).unwrap_err();
        assert!(matches!(err, ReportError::UnsupportedVersion { found: 7 }));
    }
}
