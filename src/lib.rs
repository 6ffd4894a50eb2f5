//! Session-aware recorder for racing simulation telemetry.
//!
//! Paddock consumes a stream of already-decoded telemetry events,
//! organizes them by session, segment and lap, and persists them as
//! append-only CSV streams that can later be reconstructed into per-lap
//! analysis datasets.
//!
//! # Features
//!
//! - **Lifecycle tracking**: session registration, segment changes and
//!   lap boundaries drive the on-disk layout automatically
//! - **Validated extraction**: configured field groups are checked
//!   against compile-time accessor tables before any event is consumed
//! - **Append discipline**: one header per file, every write an append,
//!   file identity fixed by (session, segment, lap, stream)
//! - **Reconstruction**: inner+outer joins merge a lap's four streams
//!   back into one dataset keyed by (session time, frame identifier)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use paddock::{FieldGroups, Paddock, SegmentKind};
//!
//! fn main() -> paddock::Result<()> {
//!     let groups = FieldGroups::builtin();
//!     let mut recorder = Paddock::recorder(0xC0FFEE, "data", &groups)?;
//!
//!     // events arrive from the upstream decoder, one at a time
//!     # use paddock::{EventPayload, PacketHeader, TelemetryEvent};
//!     let event = TelemetryEvent::new(PacketHeader::new(0xC0FFEE, 0.2, 1), EventPayload::Event);
//!     recorder.dispatch(&event)?;
//!
//!     // later, independently: rebuild lap 3 of the race
//!     let laps = Paddock::reconstructor("data", 0xC0FFEE);
//!     let dataset = laps.load_lap(SegmentKind::Race, 3)?;
//!     println!("{} rows, {} columns", dataset.len(), dataset.columns.len());
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod config;
mod error;
pub mod fields;
pub mod types;

// Recording pipeline
pub mod ingest;
pub mod observer;
pub mod recorder;
pub mod storage;

// Offline reconstruction
pub mod reconstruct;

// Core exports
pub use config::FieldGroups;
pub use error::{RecorderError, Result};
pub use fields::{FieldPlan, FieldSource, FieldValue};
pub use types::{EventPayload, PacketHeader, SegmentKind, TelemetryEvent};

// Pipeline exports
pub use ingest::{ChannelSource, EventSource, Ingest, IngestHandle};
pub use recorder::SessionRecorder;
pub use storage::{SessionLedger, StreamKind};

// Reconstruction exports
pub use reconstruct::{LapDataset, LapReconstructor, decode_array_cell};

/// Unified entry point for recording and reconstruction.
///
/// Thin factory over the crate's main components, for callers that do
/// not need to name the underlying types.
pub struct Paddock;

impl Paddock {
    /// Build a recorder for one session writing under `root`.
    ///
    /// # Errors
    ///
    /// Fails when a required field group is missing or names a field the
    /// event payloads cannot produce.
    pub fn recorder(
        session_uid: u64,
        root: impl Into<std::path::PathBuf>,
        groups: &FieldGroups,
    ) -> Result<SessionRecorder> {
        SessionRecorder::new(session_uid, root, groups)
    }

    /// Build a reconstructor reading a recorded session under `root`.
    pub fn reconstructor(
        root: impl Into<std::path::PathBuf>,
        session_uid: u64,
    ) -> LapReconstructor {
        LapReconstructor::new(root, session_uid)
    }

    /// Spawn the ingest task over an event source, recording under
    /// `root`. See [`Ingest::spawn`].
    pub fn ingest<S: EventSource>(
        root: impl Into<std::path::PathBuf>,
        groups: FieldGroups,
        source: S,
    ) -> IngestHandle {
        Ingest::spawn(root, groups, source)
    }
}
