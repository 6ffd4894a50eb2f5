//! Packet header shared by every event kind

use serde::{Deserialize, Serialize};

/// Header fields attached to every decoded telemetry event.
///
/// The upstream decoder produces one header per packet; the recorder uses
/// `session_uid` for session identity, `player_car_index` to select the
/// recording player's block out of per-car arrays, and the
/// (`session_time`, `frame_identifier`) pair as the join key written in
/// front of every per-lap row.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PacketHeader {
    /// 64-bit identifier of the recording session.
    pub session_uid: u64,
    /// Seconds since the session started.
    pub session_time: f32,
    /// Monotonically increasing per-tick counter.
    pub frame_identifier: u32,
    /// Array position of the recording player's car in per-car payloads.
    pub player_car_index: usize,
}

impl PacketHeader {
    pub fn new(session_uid: u64, session_time: f32, frame_identifier: u32) -> Self {
        Self { session_uid, session_time, frame_identifier, player_car_index: 0 }
    }

    pub fn with_player_index(mut self, player_car_index: usize) -> Self {
        self.player_car_index = player_car_index;
        self
    }
}
