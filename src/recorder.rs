//! Session recorder: the event-driven state machine that persists a
//! session's telemetry stream.
//!
//! One recorder owns the state of one session: the active segment, the
//! player's lap counter, the driver roster, and the per-segment one-time
//! flags. Every decoded event passes through [`SessionRecorder::dispatch`],
//! an exhaustive match over the event union — each kind either routes to
//! a handler that extracts fields through a validated [`FieldPlan`] and
//! appends one row, or is an accepted no-op.
//!
//! ## Lifecycle
//!
//! UNINITIALIZED → REGISTERED (first write appends a ledger entry and
//! creates the session directory) → ACTIVE(segment) → ACTIVE(new segment)
//! → … There is no terminal state: a session is implicitly abandoned when
//! its uid stops appearing in the incoming stream.
//!
//! ## Known limitations
//!
//! - Lap boundaries are detected solely by a change in the reported lap
//!   number; under packet loss or reordering two laps' rows could
//!   interleave. No reordering or deduplication is attempted.
//! - No summary row is produced for a lap when the counter advances past
//!   it; only the four per-lap streams exist.
//! - A repeated final-classification event appends duplicate rows; firing
//!   it once per segment end is the caller's contract.

use crate::config::{FieldGroups, groups};
use crate::fields::{FieldPlan, FieldValue};
use crate::storage::{
    AppendWriter, FINAL_CLASSIFICATION_FILE, PARTICIPANTS_FILE, SESSION_EVOLUTION_FILE,
    SESSION_FILE, SessionLayout, SessionLedger, StreamKind,
};
use crate::types::{
    CarLapData, CarMotion, CarStatus, CarStatusPayload, CarTelemetry, CarTelemetryPayload,
    ClassificationEntry, ClassificationPayload, EventPayload, LapDataPayload, MotionPayload,
    PacketHeader, ParticipantEntry, ParticipantsPayload, SegmentKind, SessionPayload,
    TelemetryEvent,
};
use crate::{RecorderError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// Identity columns prefixed to every final-classification row, taken
/// from the roster by positional index.
const CLASSIFICATION_IDENTITY: &str = "driverId,name,raceNumber";

/// All extraction plans a recorder needs, validated in one pass at
/// construction so a bad field-group configuration fails before any
/// event is consumed.
#[derive(Debug, Clone)]
struct Plans {
    motion: FieldPlan<CarMotion>,
    session: FieldPlan<SessionPayload>,
    evolution: FieldPlan<SessionPayload>,
    lap: FieldPlan<CarLapData>,
    participant: FieldPlan<ParticipantEntry>,
    telemetry: FieldPlan<CarTelemetry>,
    status: FieldPlan<CarStatus>,
    classification: FieldPlan<ClassificationEntry>,
}

impl Plans {
    fn validate(groups_cfg: &FieldGroups) -> Result<Self> {
        Ok(Self {
            motion: FieldPlan::new(groups_cfg, groups::CAR_MOTION)?,
            session: FieldPlan::new(groups_cfg, groups::SESSION)?,
            evolution: FieldPlan::new(groups_cfg, groups::SESSION_EVOLUTION)?,
            lap: FieldPlan::new(groups_cfg, groups::LAP_DATA)?,
            participant: FieldPlan::new(groups_cfg, groups::PARTICIPANT)?,
            telemetry: FieldPlan::new(groups_cfg, groups::CAR_TELEMETRY)?,
            status: FieldPlan::new(groups_cfg, groups::CAR_STATUS)?,
            classification: FieldPlan::new(groups_cfg, groups::FINAL_CLASSIFICATION)?,
        })
    }
}

/// Records one session's event stream into the append-only file layout.
#[derive(Debug)]
pub struct SessionRecorder {
    layout: SessionLayout,
    writer: AppendWriter,
    ledger: SessionLedger,
    plans: Plans,
    registered: bool,
    segment: SegmentKind,
    lap_number: u32,
    roster: Vec<ParticipantEntry>,
    session_info_saved: bool,
    roster_saved: bool,
}

impl SessionRecorder {
    /// Build a recorder for `session_uid` writing under `root`.
    ///
    /// Validates every required field group against the event payloads'
    /// accessor tables.
    ///
    /// # Errors
    ///
    /// [`RecorderError::MissingFieldGroup`] or
    /// [`RecorderError::UnknownField`] when the configuration cannot
    /// produce correctly-shaped files.
    pub fn new(session_uid: u64, root: impl Into<PathBuf>, groups: &FieldGroups) -> Result<Self> {
        let root = root.into();
        let plans = Plans::validate(groups)?;
        Ok(Self {
            layout: SessionLayout::new(session_uid),
            ledger: SessionLedger::new(&root),
            writer: AppendWriter::new(root),
            plans,
            registered: false,
            segment: SegmentKind::Unknown,
            lap_number: 0,
            roster: Vec::new(),
            session_info_saved: false,
            roster_saved: false,
        })
    }

    pub fn session_uid(&self) -> u64 {
        self.layout.session_uid()
    }

    /// The currently active segment. Before the first session event this
    /// is [`SegmentKind::Unknown`].
    pub fn segment(&self) -> SegmentKind {
        self.segment
    }

    /// The player's current lap counter.
    pub fn lap_number(&self) -> u32 {
        self.lap_number
    }

    /// The stored driver roster.
    pub fn roster(&self) -> &[ParticipantEntry] {
        &self.roster
    }

    /// The ledger handle this recorder registers itself in.
    pub fn ledger(&self) -> &SessionLedger {
        &self.ledger
    }

    /// Route one event to its handler.
    pub fn dispatch(&mut self, event: &TelemetryEvent) -> Result<()> {
        let header = &event.header;
        trace!(
            kind = event.payload.kind_name(),
            session_time = header.session_time,
            frame = header.frame_identifier,
            "event received"
        );
        match &event.payload {
            EventPayload::Motion(payload) => self.on_motion(header, payload),
            EventPayload::Session(payload) => self.on_session(header, payload),
            EventPayload::LapData(payload) => self.on_lap_data(header, payload),
            EventPayload::Participants(payload) => self.on_participants(payload),
            EventPayload::CarTelemetry(payload) => self.on_car_telemetry(header, payload),
            EventPayload::CarStatus(payload) => self.on_car_status(header, payload),
            EventPayload::FinalClassification(payload) => self.on_final_classification(payload),
            EventPayload::Event | EventPayload::CarSetups | EventPayload::LobbyInfo => {
                trace!(kind = event.payload.kind_name(), "accepted without persistence");
                Ok(())
            }
        }
    }

    /// Registers the session on the first write: one ledger entry, one
    /// session directory. Idempotent per recorder instance.
    fn register(&mut self) -> Result<()> {
        if self.registered {
            return Ok(());
        }
        self.ledger.register(self.session_uid())?;
        let dir = self.writer.root().join(self.layout.session_dir());
        if dir.exists() {
            warn!(path = %dir.display(), "session directory already exists");
        } else {
            std::fs::create_dir_all(&dir)
                .map_err(|source| RecorderError::file_error(&dir, source))?;
            info!(path = %dir.display(), "created session directory");
        }
        self.registered = true;
        Ok(())
    }

    fn write(&mut self, relative: &Path, data: &str, header_if_new: Option<&str>) -> Result<()> {
        self.register()?;
        self.writer.write(relative, data, header_if_new)
    }

    fn player_car<'a, T>(header: &PacketHeader, cars: &'a [T]) -> Option<&'a T> {
        let car = cars.get(header.player_car_index);
        if car.is_none() {
            warn!(
                index = header.player_car_index,
                cars = cars.len(),
                "player car index outside payload, dropping event"
            );
        }
        car
    }

    fn on_motion(&mut self, header: &PacketHeader, payload: &MotionPayload) -> Result<()> {
        let Some(car) = Self::player_car(header, &payload.cars) else {
            return Ok(());
        };
        let header_line = self.plans.motion.keyed_header();
        let row = self.plans.motion.keyed_row(header, car)?;
        let path = self.layout.stream_file(self.segment, self.lap_number, StreamKind::Motion);
        self.write(&path, &row, Some(&header_line))
    }

    fn on_session(&mut self, header: &PacketHeader, payload: &SessionPayload) -> Result<()> {
        if payload.session_type != self.segment {
            info!(from = %self.segment, to = %payload.session_type, "segment changed");
            self.register()?;
            let player_dir = self.writer.root().join(self.layout.player_dir(payload.session_type));
            if player_dir.exists() {
                warn!(path = %player_dir.display(), "segment directory already exists");
            } else {
                std::fs::create_dir_all(&player_dir)
                    .map_err(|source| RecorderError::file_error(&player_dir, source))?;
                debug!(path = %player_dir.display(), "created segment directory");
            }
            self.segment = payload.session_type;
            self.session_info_saved = false;
            self.roster_saved = false;
        }

        let header_line = self.plans.evolution.keyed_header();
        let row = self.plans.evolution.keyed_row(header, payload)?;
        let path = self.layout.segment_file(self.segment, SESSION_EVOLUTION_FILE);
        self.write(&path, &row, Some(&header_line))?;

        if !self.session_info_saved {
            let header_line = self.plans.session.header();
            let row = self.plans.session.row(payload)?;
            let path = self.layout.segment_file(self.segment, SESSION_FILE);
            self.write(&path, &row, Some(&header_line))?;
            self.session_info_saved = true;
        }
        Ok(())
    }

    fn on_lap_data(&mut self, header: &PacketHeader, payload: &LapDataPayload) -> Result<()> {
        let Some(car) = Self::player_car(header, &payload.cars) else {
            return Ok(());
        };
        let header_line = self.plans.lap.keyed_header();
        let row = self.plans.lap.keyed_row(header, car)?;
        let path = self.layout.stream_file(self.segment, self.lap_number, StreamKind::LapData);
        self.write(&path, &row, Some(&header_line))?;

        // The triggering row above still belongs to the old lap's file;
        // only subsequent writes target the new lap.
        let reported = u32::from(car.current_lap_num);
        if reported != self.lap_number {
            debug!(from = self.lap_number, to = reported, "lap counter advanced");
            self.lap_number = reported;
            // TODO: fold the closed lap's sector times into a per-segment
            // laps.csv summary once the upstream decoder exposes them.
        }
        Ok(())
    }

    fn on_participants(&mut self, payload: &ParticipantsPayload) -> Result<()> {
        if usize::from(payload.num_active_cars) != self.roster.len() {
            warn!(
                stored = self.roster.len(),
                reported = payload.num_active_cars,
                "active car count changed, replacing driver roster"
            );
            self.roster = payload.entries.clone();
        }

        if !self.roster_saved {
            let header_line = self.plans.participant.header();
            let mut rows = String::new();
            for entry in &payload.entries {
                rows.push_str(&self.plans.participant.row(entry)?);
            }
            let path = self.layout.segment_file(self.segment, PARTICIPANTS_FILE);
            self.write(&path, &rows, Some(&header_line))?;
            self.roster_saved = true;
        }
        Ok(())
    }

    fn on_car_telemetry(&mut self, header: &PacketHeader, payload: &CarTelemetryPayload) -> Result<()> {
        let Some(car) = Self::player_car(header, &payload.cars) else {
            return Ok(());
        };
        let header_line = self.plans.telemetry.keyed_header();
        let row = self.plans.telemetry.keyed_row(header, car)?;
        let path = self.layout.stream_file(self.segment, self.lap_number, StreamKind::Telemetry);
        self.write(&path, &row, Some(&header_line))
    }

    fn on_car_status(&mut self, header: &PacketHeader, payload: &CarStatusPayload) -> Result<()> {
        let Some(car) = Self::player_car(header, &payload.cars) else {
            return Ok(());
        };
        let header_line = self.plans.status.keyed_header();
        let row = self.plans.status.keyed_row(header, car)?;
        let path = self.layout.stream_file(self.segment, self.lap_number, StreamKind::Status);
        self.write(&path, &row, Some(&header_line))
    }

    fn on_final_classification(&mut self, payload: &ClassificationPayload) -> Result<()> {
        let mut rows = String::new();
        for (index, entry) in payload.entries.iter().enumerate() {
            if !entry.has_data() {
                continue;
            }
            let Some(driver) = self.roster.get(index) else {
                warn!(index, "classified car has no roster entry, skipping row");
                continue;
            };
            FieldValue::from(driver.driver_id).render_into(&mut rows, "driverId")?;
            rows.push(',');
            FieldValue::bytes(&driver.name).render_into(&mut rows, "name")?;
            rows.push(',');
            FieldValue::from(driver.race_number).render_into(&mut rows, "raceNumber")?;
            rows.push(',');
            rows.push_str(&self.plans.classification.row(entry)?);
        }

        let header_line =
            format!("{CLASSIFICATION_IDENTITY},{}", self.plans.classification.header());
        let path = self.layout.segment_file(self.segment, FINAL_CLASSIFICATION_FILE);
        self.write(&path, &rows, Some(&header_line))
    }
}
