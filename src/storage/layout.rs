//! On-disk layout of a recorded session.
//!
//! File identity is fully determined by (session uid, segment, lap number,
//! stream kind) and nothing else. Both the recorder and the reconstructor
//! resolve paths through this module, so the two sides can never disagree
//! about naming or nesting:
//!
//! ```text
//! <root>/
//!   sessions.csv
//!   <sessionUid>/
//!     <segment>/
//!       session.csv
//!       session_evolution.csv
//!       participants.csv
//!       final_classification.csv
//!       player/
//!         lap<N>_telemetry.csv
//!         lap<N>_motion.csv
//!         lap<N>_status.csv
//!         lap<N>_data.csv
//! ```

use crate::types::SegmentKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One-time segment metadata file.
pub const SESSION_FILE: &str = "session.csv";
/// Always-active segment evolution stream.
pub const SESSION_EVOLUTION_FILE: &str = "session_evolution.csv";
/// One-time roster file.
pub const PARTICIPANTS_FILE: &str = "participants.csv";
/// End-of-segment classification file.
pub const FINAL_CLASSIFICATION_FILE: &str = "final_classification.csv";
/// Reserved per-player subdirectory inside every segment.
pub const PLAYER_DIR: &str = "player";
/// Top-level session ledger file.
pub const LEDGER_FILE: &str = "sessions.csv";

/// The four per-lap stream kinds recorded for the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamKind {
    Telemetry,
    Motion,
    Status,
    LapData,
}

impl StreamKind {
    pub const ALL: [StreamKind; 4] =
        [StreamKind::Telemetry, StreamKind::Motion, StreamKind::Status, StreamKind::LapData];

    const fn suffix(self) -> &'static str {
        match self {
            StreamKind::Telemetry => "telemetry",
            StreamKind::Motion => "motion",
            StreamKind::Status => "status",
            StreamKind::LapData => "data",
        }
    }

    /// File name of this stream for one lap, e.g. `lap3_motion.csv`.
    pub fn file_name(self, lap: u32) -> String {
        format!("lap{lap}_{}.csv", self.suffix())
    }
}

/// Relative-path algebra for one session's directory tree.
///
/// All returned paths are relative to the recording root; the writer and
/// the reconstructor each resolve them against their own root handle.
#[derive(Debug, Clone)]
pub struct SessionLayout {
    session_uid: u64,
}

impl SessionLayout {
    pub fn new(session_uid: u64) -> Self {
        Self { session_uid }
    }

    pub fn session_uid(&self) -> u64 {
        self.session_uid
    }

    /// `<sessionUid>/`
    pub fn session_dir(&self) -> PathBuf {
        PathBuf::from(self.session_uid.to_string())
    }

    /// `<sessionUid>/<segment>/`
    pub fn segment_dir(&self, segment: SegmentKind) -> PathBuf {
        self.session_dir().join(segment.dir_name())
    }

    /// `<sessionUid>/<segment>/player/`
    pub fn player_dir(&self, segment: SegmentKind) -> PathBuf {
        self.segment_dir(segment).join(PLAYER_DIR)
    }

    /// A segment-level file such as [`SESSION_EVOLUTION_FILE`].
    pub fn segment_file(&self, segment: SegmentKind, name: &str) -> PathBuf {
        self.segment_dir(segment).join(name)
    }

    /// The per-lap player stream file for one (segment, lap, kind).
    pub fn stream_file(&self, segment: SegmentKind, lap: u32, kind: StreamKind) -> PathBuf {
        self.player_dir(segment).join(kind.file_name(lap))
    }
}
