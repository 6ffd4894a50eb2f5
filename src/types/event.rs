//! Decoded telemetry event union and per-kind payload structures.
//!
//! Events arrive from the upstream packet decoder as a tagged union: one
//! [`PacketHeader`] plus a kind-specific payload. Dispatching on the union
//! is an exhaustive `match`, so adding an event kind is a compile error at
//! every dispatch site until handled — there is no numeric id table that
//! can silently no-op.
//!
//! Each payload that reaches a recorded stream implements
//! [`FieldSource`], the explicit accessor table the row serializer
//! extracts through.

use super::{PacketHeader, SegmentKind};
use crate::fields::{FieldSource, FieldValue};
use serde::{Deserialize, Serialize};

/// One decoded telemetry event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub header: PacketHeader,
    pub payload: EventPayload,
}

impl TelemetryEvent {
    pub fn new(header: PacketHeader, payload: EventPayload) -> Self {
        Self { header, payload }
    }
}

/// Kind-specific payload of a decoded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventPayload {
    Motion(MotionPayload),
    Session(SessionPayload),
    LapData(LapDataPayload),
    /// Sporting events (fastest lap, retirement, …). No field taxonomy is
    /// defined upstream; accepted without persistence.
    Event,
    Participants(ParticipantsPayload),
    /// Car setup sheets. Accepted without persistence.
    CarSetups,
    CarTelemetry(CarTelemetryPayload),
    CarStatus(CarStatusPayload),
    FinalClassification(ClassificationPayload),
    /// Multiplayer lobby roster. Accepted without persistence.
    LobbyInfo,
}

impl EventPayload {
    /// Stable kind name for logging.
    pub fn kind_name(&self) -> &'static str {
        match self {
            EventPayload::Motion(_) => "motion",
            EventPayload::Session(_) => "session",
            EventPayload::LapData(_) => "lap_data",
            EventPayload::Event => "event",
            EventPayload::Participants(_) => "participants",
            EventPayload::CarSetups => "car_setups",
            EventPayload::CarTelemetry(_) => "car_telemetry",
            EventPayload::CarStatus(_) => "car_status",
            EventPayload::FinalClassification(_) => "final_classification",
            EventPayload::LobbyInfo => "lobby_info",
        }
    }
}

/// Per-car motion blocks for one tick.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionPayload {
    pub cars: Vec<CarMotion>,
}

/// World position and g-forces of one car.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarMotion {
    pub world_position_x: f32,
    pub world_position_y: f32,
    pub world_position_z: f32,
    pub g_force_lateral: f32,
    pub g_force_longitudinal: f32,
    pub g_force_vertical: f32,
}

impl FieldSource for CarMotion {
    const FIELDS: &'static [&'static str] = &[
        "worldPositionX",
        "worldPositionY",
        "worldPositionZ",
        "gForceLateral",
        "gForceLongitudinal",
        "gForceVertical",
    ];

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "worldPositionX" => Some(self.world_position_x.into()),
            "worldPositionY" => Some(self.world_position_y.into()),
            "worldPositionZ" => Some(self.world_position_z.into()),
            "gForceLateral" => Some(self.g_force_lateral.into()),
            "gForceLongitudinal" => Some(self.g_force_longitudinal.into()),
            "gForceVertical" => Some(self.g_force_vertical.into()),
            _ => None,
        }
    }
}

/// Session description: segment type, static circuit metadata, and the
/// evolving track state sampled on every session event.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionPayload {
    pub session_type: SegmentKind,
    pub track_id: i8,
    pub total_laps: u8,
    pub formula: u8,
    pub track_length: u16,
    pub pit_speed_limit: u8,
    pub network_game: u8,
    pub weather: u8,
    pub air_temperature: i8,
    pub track_temperature: i8,
    pub safety_car_status: u8,
}

impl FieldSource for SessionPayload {
    const FIELDS: &'static [&'static str] = &[
        "trackId",
        "totalLaps",
        "sessionType",
        "formula",
        "trackLength",
        "pitSpeedLimit",
        "networkGame",
        "weather",
        "airTemperature",
        "trackTemperature",
        "safetyCarStatus",
    ];

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "trackId" => Some(self.track_id.into()),
            "totalLaps" => Some(self.total_laps.into()),
            "sessionType" => Some(self.session_type.id().into()),
            "formula" => Some(self.formula.into()),
            "trackLength" => Some(self.track_length.into()),
            "pitSpeedLimit" => Some(self.pit_speed_limit.into()),
            "networkGame" => Some(self.network_game.into()),
            "weather" => Some(self.weather.into()),
            "airTemperature" => Some(self.air_temperature.into()),
            "trackTemperature" => Some(self.track_temperature.into()),
            "safetyCarStatus" => Some(self.safety_car_status.into()),
            _ => None,
        }
    }
}

/// Per-car lap progress blocks for one tick.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapDataPayload {
    pub cars: Vec<CarLapData>,
}

/// Lap progress of one car.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarLapData {
    pub lap_distance: f32,
    pub total_distance: f32,
    pub current_lap_time: f32,
    pub current_lap_num: u8,
    pub car_position: u8,
    pub pit_status: u8,
}

impl FieldSource for CarLapData {
    const FIELDS: &'static [&'static str] = &[
        "lapDistance",
        "totalDistance",
        "currentLapTime",
        "currentLapNum",
        "carPosition",
        "pitStatus",
    ];

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "lapDistance" => Some(self.lap_distance.into()),
            "totalDistance" => Some(self.total_distance.into()),
            "currentLapTime" => Some(self.current_lap_time.into()),
            "currentLapNum" => Some(self.current_lap_num.into()),
            "carPosition" => Some(self.car_position.into()),
            "pitStatus" => Some(self.pit_status.into()),
            _ => None,
        }
    }
}

/// Roster announcement: active-car count plus one entry per participant.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantsPayload {
    pub num_active_cars: u8,
    pub entries: Vec<ParticipantEntry>,
}

/// One driver roster entry.
///
/// `name` is the raw byte sequence from the wire; it is decoded to UTF-8
/// only at serialization time so a corrupt name fails the affected row
/// instead of poisoning the whole roster at decode time.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantEntry {
    pub driver_id: u8,
    pub name: Vec<u8>,
    pub race_number: u8,
    pub ai_controlled: u8,
    pub telemetry_visibility: u8,
}

impl ParticipantEntry {
    pub fn named(driver_id: u8, name: &str, race_number: u8) -> Self {
        Self {
            driver_id,
            name: name.as_bytes().to_vec(),
            race_number,
            ai_controlled: 0,
            telemetry_visibility: 1,
        }
    }
}

impl FieldSource for ParticipantEntry {
    const FIELDS: &'static [&'static str] =
        &["driverId", "name", "raceNumber", "aiControlled", "yourTelemetry"];

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "driverId" => Some(self.driver_id.into()),
            "name" => Some(FieldValue::bytes(&self.name)),
            "raceNumber" => Some(self.race_number.into()),
            "aiControlled" => Some(self.ai_controlled.into()),
            "yourTelemetry" => Some(self.telemetry_visibility.into()),
            _ => None,
        }
    }
}

/// Per-car telemetry blocks for one tick.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarTelemetryPayload {
    pub cars: Vec<CarTelemetry>,
}

/// Instrumentation block of one car.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarTelemetry {
    pub speed: u16,
    pub throttle: f32,
    pub steer: f32,
    pub brake: f32,
    pub clutch: u8,
    pub gear: i8,
    pub engine_rpm: u16,
    pub drs: u8,
    pub brakes_temperature: [u16; 4],
    pub tyres_surface_temperature: [u8; 4],
    pub tyres_inner_temperature: [u8; 4],
    pub engine_temperature: u16,
    pub tyres_pressure: [f32; 4],
    pub surface_type: [u8; 4],
}

impl FieldSource for CarTelemetry {
    const FIELDS: &'static [&'static str] = &[
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
    ];

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "speed" => Some(self.speed.into()),
            "throttle" => Some(self.throttle.into()),
            "steer" => Some(self.steer.into()),
            "brake" => Some(self.brake.into()),
            "clutch" => Some(self.clutch.into()),
            "gear" => Some(self.gear.into()),
            "engineRPM" => Some(self.engine_rpm.into()),
            "drs" => Some(self.drs.into()),
            "brakesTemperature" => Some(FieldValue::uint_array(&self.brakes_temperature)),
            "tyresSurfaceTemperature" => {
                Some(FieldValue::uint_array(&self.tyres_surface_temperature))
            }
            "tyresInnerTemperature" => Some(FieldValue::uint_array(&self.tyres_inner_temperature)),
            "engineTemperature" => Some(self.engine_temperature.into()),
            "tyresPressure" => Some(FieldValue::f32_array(&self.tyres_pressure)),
            "surfaceType" => Some(FieldValue::uint_array(&self.surface_type)),
            _ => None,
        }
    }
}

/// Per-car status blocks for one tick.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarStatusPayload {
    pub cars: Vec<CarStatus>,
}

/// Fuel, tyre, damage and ERS state of one car.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarStatus {
    pub fuel_mix: u8,
    pub fuel_in_tank: f32,
    pub tyres_wear: [u8; 4],
    pub actual_tyre_compound: u8,
    pub visual_tyre_compound: u8,
    pub tyres_damage: [u8; 4],
    pub front_left_wing_damage: u8,
    pub front_right_wing_damage: u8,
    pub rear_wing_damage: u8,
    pub drs_fault: u8,
    pub engine_damage: u8,
    pub gear_box_damage: u8,
    pub ers_store_energy: f32,
    pub ers_deploy_mode: u8,
    pub ers_harvested_this_lap_mguk: f32,
    pub ers_harvested_this_lap_mguh: f32,
    pub ers_deployed_this_lap: f32,
}

impl FieldSource for CarStatus {
    const FIELDS: &'static [&'static str] = &[
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
    ];

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "fuelMix" => Some(self.fuel_mix.into()),
            "fuelInTank" => Some(self.fuel_in_tank.into()),
            "tyresWear" => Some(FieldValue::uint_array(&self.tyres_wear)),
            "actualTyreCompound" => Some(self.actual_tyre_compound.into()),
            "visualTyreCompound" => Some(self.visual_tyre_compound.into()),
            "tyresDamage" => Some(FieldValue::uint_array(&self.tyres_damage)),
            "frontLeftWingDamage" => Some(self.front_left_wing_damage.into()),
            "frontRightWingDamage" => Some(self.front_right_wing_damage.into()),
            "rearWingDamage" => Some(self.rear_wing_damage.into()),
            "drsFault" => Some(self.drs_fault.into()),
            "engineDamage" => Some(self.engine_damage.into()),
            "gearBoxDamage" => Some(self.gear_box_damage.into()),
            "ersStoreEnergy" => Some(self.ers_store_energy.into()),
            "ersDeployMode" => Some(self.ers_deploy_mode.into()),
            "ersHarvestedThisLapMGUK" => Some(self.ers_harvested_this_lap_mguk.into()),
            "ersHarvestedThisLapMGUH" => Some(self.ers_harvested_this_lap_mguh.into()),
            "ersDeployedThisLap" => Some(self.ers_deployed_this_lap.into()),
            _ => None,
        }
    }
}

/// Per-car final classification, parallel to the driver roster.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationPayload {
    pub entries: Vec<ClassificationEntry>,
}

/// End-of-segment result of one car.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationEntry {
    pub position: u8,
    pub num_laps: u8,
    pub grid_position: u8,
    pub points: u8,
    pub num_pit_stops: u8,
    pub result_status: u8,
}

impl ClassificationEntry {
    /// Whether this slot carries classification data. The upstream array
    /// is fixed-size; inactive slots report result status 0.
    pub fn has_data(&self) -> bool {
        self.result_status != 0
    }
}

impl FieldSource for ClassificationEntry {
    const FIELDS: &'static [&'static str] =
        &["position", "numLaps", "gridPosition", "points", "numPitStops", "resultStatus"];

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "position" => Some(self.position.into()),
            "numLaps" => Some(self.num_laps.into()),
            "gridPosition" => Some(self.grid_position.into()),
            "points" => Some(self.points.into()),
            "numPitStops" => Some(self.num_pit_stops.into()),
            "resultStatus" => Some(self.result_status.into()),
            _ => None,
        }
    }
}
