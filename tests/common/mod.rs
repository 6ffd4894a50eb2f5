//! Shared event builders for integration tests.
#![allow(dead_code)]

use paddock::types::{
    CarLapData, CarMotion, CarStatus, CarStatusPayload, CarTelemetry, CarTelemetryPayload,
    ClassificationEntry, ClassificationPayload, LapDataPayload, MotionPayload, ParticipantEntry,
    ParticipantsPayload, SessionPayload,
};
use paddock::{EventPayload, PacketHeader, SegmentKind, TelemetryEvent};

pub const SESSION_UID: u64 = 8_261_554_001;

pub fn header(frame: u32) -> PacketHeader {
    PacketHeader::new(SESSION_UID, frame as f32, frame)
}

pub fn session_event(kind: SegmentKind, frame: u32) -> TelemetryEvent {
    TelemetryEvent::new(
        header(frame),
        EventPayload::Session(SessionPayload {
            session_type: kind,
            track_id: 4,
            total_laps: 52,
            formula: 0,
            track_length: 5891,
            pit_speed_limit: 80,
            network_game: 0,
            weather: 1,
            air_temperature: 24,
            track_temperature: 31,
            safety_car_status: 0,
        }),
    )
}

pub fn motion_event(frame: u32) -> TelemetryEvent {
    let car = CarMotion {
        world_position_x: frame as f32 * 10.0,
        world_position_y: 2.5,
        world_position_z: frame as f32 * -1.0,
        g_force_lateral: 1.2,
        g_force_longitudinal: -0.4,
        g_force_vertical: 1.0,
    };
    TelemetryEvent::new(header(frame), EventPayload::Motion(MotionPayload { cars: vec![car] }))
}

pub fn telemetry_event(frame: u32) -> TelemetryEvent {
    let car = CarTelemetry {
        speed: 100 + frame as u16,
        throttle: 0.75,
        steer: -0.05,
        brake: 0.0,
        clutch: 0,
        gear: 6,
        engine_rpm: 11_200,
        drs: 1,
        brakes_temperature: [401, 399, 400, 402],
        tyres_surface_temperature: [96, 95, 97, 96],
        tyres_inner_temperature: [101, 100, 102, 101],
        engine_temperature: 108,
        tyres_pressure: [21.5, 21.5, 19.75, 19.75],
        surface_type: [0, 0, 0, 0],
    };
    TelemetryEvent::new(
        header(frame),
        EventPayload::CarTelemetry(CarTelemetryPayload { cars: vec![car] }),
    )
}

pub fn status_event(frame: u32) -> TelemetryEvent {
    let car = CarStatus {
        fuel_mix: 1,
        fuel_in_tank: 44.5 - frame as f32 * 0.01,
        tyres_wear: [3, 3, 4, 4],
        actual_tyre_compound: 16,
        visual_tyre_compound: 16,
        tyres_damage: [0, 0, 0, 0],
        ers_store_energy: 3_800_000.0,
        ..Default::default()
    };
    TelemetryEvent::new(header(frame), EventPayload::CarStatus(CarStatusPayload { cars: vec![car] }))
}

pub fn lap_event(frame: u32, lap: u8) -> TelemetryEvent {
    let car = CarLapData {
        lap_distance: frame as f32 * 55.0,
        total_distance: frame as f32 * 55.0,
        current_lap_time: frame as f32,
        current_lap_num: lap,
        car_position: 3,
        pit_status: 0,
    };
    TelemetryEvent::new(header(frame), EventPayload::LapData(LapDataPayload { cars: vec![car] }))
}

pub fn participants_event(frame: u32, count: u8) -> TelemetryEvent {
    let entries = (0..count)
        .map(|i| ParticipantEntry::named(i, &format!("DRV{i:02}"), i + 1))
        .collect();
    TelemetryEvent::new(
        header(frame),
        EventPayload::Participants(ParticipantsPayload { num_active_cars: count, entries }),
    )
}

pub fn classification_event(frame: u32, count: u8) -> TelemetryEvent {
    let entries = (0..count)
        .map(|i| ClassificationEntry {
            position: count - i,
            num_laps: 52,
            grid_position: i + 1,
            points: if i == 0 { 25 } else { 0 },
            num_pit_stops: 2,
            result_status: 3,
        })
        .collect();
    TelemetryEvent::new(
        header(frame),
        EventPayload::FinalClassification(ClassificationPayload { entries }),
    )
}

/// Install the test tracing subscriber; safe to call from every test.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
