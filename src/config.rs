//! Field-group configuration.
//!
//! A field group is a named, ordered list of field names to extract from a
//! given event structure. Both the header line and every data row of a
//! stream are generated from the same list, which is what guarantees
//! column/row alignment in the recorded files.
//!
//! Groups are loaded from a YAML mapping of group name to field-name list,
//! or taken from [`FieldGroups::builtin`], which mirrors the standard
//! deployment configuration. A group that the recorder needs but cannot
//! resolve is a fatal construction error, never a per-row one.

use crate::{RecorderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Well-known group names consumed by the recorder.
pub mod groups {
    pub const CAR_MOTION: &str = "car_motion_data";
    pub const SESSION: &str = "session_packet";
    pub const SESSION_EVOLUTION: &str = "session_evolution_packet";
    pub const LAP_DATA: &str = "lap_data";
    pub const PARTICIPANT: &str = "participant_data";
    pub const CAR_TELEMETRY: &str = "car_telemetry_data";
    pub const CAR_STATUS: &str = "car_status_data";
    pub const FINAL_CLASSIFICATION: &str = "final_classification_data";
}

/// Resolves a field-group name to its ordered field-name list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldGroups {
    groups: BTreeMap<String, Vec<String>>,
}

impl FieldGroups {
    /// Load a group table from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|source| RecorderError::file_error(path, source))?;
        serde_yaml_ng::from_str(&raw)
            .map_err(|source| RecorderError::Config { path: path.to_path_buf(), source })
    }

    /// The standard group table covering every stream the recorder writes.
    pub fn builtin() -> Self {
        let mut groups = BTreeMap::new();
        let insert = |groups: &mut BTreeMap<String, Vec<String>>, name: &str, fields: &[&str]| {
            groups.insert(name.to_string(), fields.iter().map(|f| f.to_string()).collect());
        };
        insert(
            &mut groups,
            groups::CAR_MOTION,
            &[
                "worldPositionX",
                "worldPositionY",
                "worldPositionZ",
                "gForceLateral",
                "gForceLongitudinal",
                "gForceVertical",
            ],
        );
        insert(
            &mut groups,
            groups::SESSION,
            &[
                "trackId",
                "totalLaps",
                "sessionType",
                "formula",
                "trackLength",
                "pitSpeedLimit",
                "networkGame",
            ],
        );
        insert(
            &mut groups,
            groups::SESSION_EVOLUTION,
            &["weather", "airTemperature", "trackTemperature", "safetyCarStatus"],
        );
        insert(
            &mut groups,
            groups::LAP_DATA,
            &[
                "lapDistance",
                "totalDistance",
                "currentLapTime",
                "currentLapNum",
                "carPosition",
                "pitStatus",
            ],
        );
        insert(
            &mut groups,
            groups::PARTICIPANT,
            &["driverId", "name", "raceNumber", "aiControlled", "yourTelemetry"],
        );
        insert(
            &mut groups,
            groups::CAR_TELEMETRY,
            &[
                "speed",
                "throttle",
                "steer",
                "brake",
                "clutch",
                "gear",
                "engineRPM",
                "drs",
                "brakesTemperature",
                "tyresSurfaceTemperature",
                "tyresInnerTemperature",
                "engineTemperature",
                "tyresPressure",
                "surfaceType",
            ],
        );
        insert(
            &mut groups,
            groups::CAR_STATUS,
            &[
                "fuelMix",
                "fuelInTank",
                "tyresWear",
                "actualTyreCompound",
                "visualTyreCompound",
                "tyresDamage",
                "frontLeftWingDamage",
                "frontRightWingDamage",
                "rearWingDamage",
                "drsFault",
                "engineDamage",
                "gearBoxDamage",
                "ersStoreEnergy",
                "ersDeployMode",
                "ersHarvestedThisLapMGUK",
                "ersHarvestedThisLapMGUH",
                "ersDeployedThisLap",
            ],
        );
        insert(
            &mut groups,
            groups::FINAL_CLASSIFICATION,
            &["position", "numLaps", "gridPosition", "points", "numPitStops", "resultStatus"],
        );
        Self { groups }
    }

    /// Resolve a group to its ordered field list.
    ///
    /// # Errors
    ///
    /// [`RecorderError::MissingFieldGroup`] if the group is not configured.
    pub fn resolve(&self, group: &str) -> Result<&[String]> {
        self.groups
            .get(group)
            .map(Vec::as_slice)
            .ok_or_else(|| RecorderError::MissingFieldGroup { group: group.to_string() })
    }

    /// Replace or add one group. Intended for tailored deployments and tests.
    pub fn set_group(
        &mut self,
        name: impl Into<String>,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) {
        self.groups.insert(name.into(), fields.into_iter().map(Into::into).collect());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_all_recorder_groups() {
        let cfg = FieldGroups::builtin();
        for group in [
            groups::CAR_MOTION,
            groups::SESSION,
            groups::SESSION_EVOLUTION,
            groups::LAP_DATA,
            groups::PARTICIPANT,
            groups::CAR_TELEMETRY,
            groups::CAR_STATUS,
            groups::FINAL_CLASSIFICATION,
        ] {
            assert!(!cfg.resolve(group).unwrap().is_empty(), "group {group} missing");
        }
    }

    #[test]
    fn missing_group_is_an_error() {
        let cfg = FieldGroups::builtin();
        let err = cfg.resolve("car_setups_data").unwrap_err();
        assert!(matches!(err, RecorderError::MissingFieldGroup { group } if group == "car_setups_data"));
        assert!(cfg.resolve("car_setups_data").unwrap_err().is_configuration());
    }

    #[test]
    fn yaml_round_trip() {
        let yaml = "lap_data: [lapDistance, currentLapNum]\nsession_packet: [trackId]\n";
        let cfg: FieldGroups = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(cfg.resolve("lap_data").unwrap(), ["lapDistance", "currentLapNum"]);
        assert_eq!(cfg.resolve("session_packet").unwrap(), ["trackId"]);
    }

    #[test]
    fn set_group_overrides() {
        let mut cfg = FieldGroups::builtin();
        cfg.set_group(groups::LAP_DATA, ["lapDistance"]);
        assert_eq!(cfg.resolve(groups::LAP_DATA).unwrap(), ["lapDistance"]);
    }
}
