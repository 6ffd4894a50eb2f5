//! Core types for the decoded telemetry event stream.
//!
//! The upstream decoder hands the recorder fully decoded events: one
//! [`PacketHeader`] plus a kind-specific payload in the
//! [`TelemetryEvent`] tagged union. Per-car payloads keep the simulator's
//! array-of-blocks shape; the recorder selects the player's block through
//! `PacketHeader::player_car_index`.
//!
//! [`SegmentKind`] names the session-type phases a session moves through
//! and owns the directory names the on-disk layout is built from.

mod event;
mod header;
mod segment;

pub use event::{
    CarLapData, CarMotion, CarStatus, CarTelemetry, ClassificationEntry, ClassificationPayload,
    CarStatusPayload, CarTelemetryPayload, EventPayload, LapDataPayload, MotionPayload,
    ParticipantEntry, ParticipantsPayload, SessionPayload, TelemetryEvent,
};
pub use header::PacketHeader;
pub use segment::SegmentKind;
