//! Offline reconstruction of a lap's recorded streams.
//!
//! A lap is recorded as four separate append-only streams (telemetry,
//! motion, status, lap-progress), each keyed by the
//! (`sessionTime`, `frameIdentifier`) pair written in front of every row.
//! [`LapReconstructor::load_lap`] merges them back into one dataset:
//!
//! 1. telemetry, motion and status are inner-joined on the exact key pair
//!    — the three per-frame instrumentation streams must agree, and rows
//!    lacking a match in any of them are silently dropped (documented
//!    data loss, not an error);
//! 2. the result is outer-joined with the lap-progress stream on the same
//!    key, sorted ascending, so lap-progress rows at unmatched frames are
//!    retained with null fill.
//!
//! The asymmetry is deliberate precedence: lap-progress is often emitted
//! at a different cadence and is allowed to be sparse relative to the
//! instrumentation streams.

use crate::fields::{FRAME_ID_COL, SESSION_TIME_COL};
use crate::storage::{PLAYER_DIR, SessionLayout, StreamKind};
use crate::types::SegmentKind;
use crate::{RecorderError, Result};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Write;
use std::path::PathBuf;
use tracing::debug;

/// Join key of one recorded row.
///
/// The session-time half keeps its recorded textual form: equality is
/// exact (both sides were written by the same serializer), while ordering
/// parses the numeric value so `9.5` sorts before `10.25`.
#[derive(Debug, Clone)]
pub struct FrameKey {
    session_time: String,
    time_value: f64,
    frame_identifier: u64,
}

impl FrameKey {
    pub fn session_time(&self) -> &str {
        &self.session_time
    }

    pub fn frame_identifier(&self) -> u64 {
        self.frame_identifier
    }
}

impl PartialEq for FrameKey {
    fn eq(&self, other: &Self) -> bool {
        self.session_time == other.session_time && self.frame_identifier == other.frame_identifier
    }
}

impl Eq for FrameKey {}

impl std::hash::Hash for FrameKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.session_time.hash(state);
        self.frame_identifier.hash(state);
    }
}

impl PartialOrd for FrameKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrameKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time_value
            .total_cmp(&other.time_value)
            .then_with(|| self.frame_identifier.cmp(&other.frame_identifier))
    }
}

/// One reconstructed row: join key plus one cell per dataset column,
/// `None` where the outer join had no matching instrumentation row.
#[derive(Debug, Clone, PartialEq)]
pub struct LapRow {
    pub key: FrameKey,
    pub cells: Vec<Option<String>>,
}

/// A lap's combined analysis dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct LapDataset {
    /// Data column names, in stream order (telemetry, motion, status,
    /// lap-progress). The join-key columns are carried on each row's
    /// [`FrameKey`], not here.
    pub columns: Vec<String>,
    /// Rows sorted ascending by join key.
    pub rows: Vec<LapRow>,
}

impl LapDataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a data column into each row's cells.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col == name)
    }

    /// Render the dataset back to CSV text, empty cells for null fill.
    ///
    /// Rendering is deterministic: identical input files reconstruct to
    /// byte-identical output.
    pub fn to_csv(&self) -> String {
        let mut out = format!("{SESSION_TIME_COL},{FRAME_ID_COL}");
        for column in &self.columns {
            out.push(',');
            out.push_str(column);
        }
        out.push('\n');
        for row in &self.rows {
            let _ = write!(out, "{},{}", row.key.session_time, row.key.frame_identifier);
            for cell in &row.cells {
                out.push(',');
                if let Some(value) = cell {
                    out.push_str(value);
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Split a whitespace-joined array cell back into its numeric values.
///
/// Inverse of the serializer's array-cell encoding: a fixed-length array
/// of N values yields exactly N tokens.
pub fn decode_array_cell(cell: &str) -> Result<Vec<f64>> {
    cell.split_whitespace()
        .map(|token| {
            token.parse().map_err(|_| {
                RecorderError::parse_error("array cell", format!("bad numeric token '{token}'"))
            })
        })
        .collect()
}

/// One loaded stream: data columns plus key-ordered rows as recorded.
struct StreamTable {
    columns: Vec<String>,
    rows: Vec<(FrameKey, Vec<String>)>,
}

/// Reads a recorded session back from disk and joins per-lap streams.
#[derive(Debug, Clone)]
pub struct LapReconstructor {
    root: PathBuf,
    layout: SessionLayout,
}

impl LapReconstructor {
    pub fn new(root: impl Into<PathBuf>, session_uid: u64) -> Self {
        Self { root: root.into(), layout: SessionLayout::new(session_uid) }
    }

    pub fn session_uid(&self) -> u64 {
        self.layout.session_uid()
    }

    /// Load and join the four streams of one lap.
    ///
    /// # Errors
    ///
    /// [`RecorderError::LapNotFound`] when any of the four stream files is
    /// absent — callers scanning a lap range may skip such laps.
    pub fn load_lap(&self, segment: SegmentKind, lap: u32) -> Result<LapDataset> {
        let telemetry = self.load_stream(segment, lap, StreamKind::Telemetry)?;
        let motion = self.load_stream(segment, lap, StreamKind::Motion)?;
        let status = self.load_stream(segment, lap, StreamKind::Status)?;
        let lap_progress = self.load_stream(segment, lap, StreamKind::LapData)?;

        let instrumentation = inner_join(inner_join(telemetry, motion), status);
        debug!(segment = %segment, lap, rows = instrumentation.rows.len(), "joined instrumentation streams");
        Ok(outer_join(instrumentation, lap_progress))
    }

    /// Segments recorded for this session, in simulator identifier order.
    /// A session directory that does not exist reads as no segments.
    pub fn segments(&self) -> Result<Vec<SegmentKind>> {
        let dir = self.root.join(self.layout.session_dir());
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(RecorderError::file_error(&dir, source)),
        };

        let mut segments = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| RecorderError::file_error(&dir, source))?;
            if let Some(kind) =
                entry.file_name().to_str().and_then(SegmentKind::from_dir_name)
            {
                segments.push(kind);
            }
        }
        segments.sort_by_key(|kind| kind.id());
        Ok(segments)
    }

    /// Lap numbers of one segment with a recorded telemetry stream,
    /// ascending. Laps missing other streams still fail individually in
    /// [`load_lap`](Self::load_lap).
    pub fn available_laps(&self, segment: SegmentKind) -> Result<Vec<u32>> {
        let dir = self.root.join(self.layout.segment_dir(segment)).join(PLAYER_DIR);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(RecorderError::file_error(&dir, source)),
        };

        let mut laps = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| RecorderError::file_error(&dir, source))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(lap) = name
                .strip_prefix("lap")
                .and_then(|rest| rest.strip_suffix("_telemetry.csv"))
                .and_then(|num| num.parse().ok())
            {
                laps.push(lap);
            }
        }
        laps.sort_unstable();
        Ok(laps)
    }

    fn load_stream(&self, segment: SegmentKind, lap: u32, kind: StreamKind) -> Result<StreamTable> {
        let path = self.root.join(self.layout.stream_file(segment, lap, kind));
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(RecorderError::LapNotFound { path });
            }
            Err(source) => return Err(RecorderError::file_error(&path, source)),
        };

        let context = || path.display().to_string();
        let mut lines = raw.lines();
        let header = lines
            .next()
            .ok_or_else(|| RecorderError::parse_error(context(), "empty stream file"))?;
        let columns: Vec<&str> = header.split(',').collect();
        if columns.len() < 2 || columns[0] != SESSION_TIME_COL || columns[1] != FRAME_ID_COL {
            return Err(RecorderError::parse_error(
                context(),
                format!("header must start with {SESSION_TIME_COL},{FRAME_ID_COL}"),
            ));
        }

        let mut rows = Vec::new();
        for line in lines {
            let cells: Vec<&str> = line.split(',').collect();
            if cells.len() != columns.len() {
                return Err(RecorderError::parse_error(
                    context(),
                    format!("row has {} cells, header has {}", cells.len(), columns.len()),
                ));
            }
            let time_value = cells[0].parse().map_err(|_| {
                RecorderError::parse_error(context(), format!("bad session time '{}'", cells[0]))
            })?;
            let frame_identifier = cells[1].parse().map_err(|_| {
                RecorderError::parse_error(context(), format!("bad frame id '{}'", cells[1]))
            })?;
            let key = FrameKey { session_time: cells[0].to_string(), time_value, frame_identifier };
            rows.push((key, cells[2..].iter().map(|cell| cell.to_string()).collect()));
        }

        Ok(StreamTable {
            columns: columns[2..].iter().map(|col| col.to_string()).collect(),
            rows,
        })
    }
}

/// Exact-key inner join; left rows without a right match are dropped.
fn inner_join(left: StreamTable, right: StreamTable) -> StreamTable {
    let mut index: HashMap<&FrameKey, &Vec<String>> = HashMap::with_capacity(right.rows.len());
    for (key, cells) in &right.rows {
        // first occurrence wins on a duplicated key
        index.entry(key).or_insert(cells);
    }

    let mut columns = left.columns;
    columns.extend(right.columns.iter().cloned());

    let mut rows = Vec::with_capacity(left.rows.len());
    for (key, cells) in left.rows {
        if let Some(right_cells) = index.get(&key) {
            let mut combined = cells;
            combined.extend(right_cells.iter().cloned());
            rows.push((key, combined));
        }
    }
    StreamTable { columns, rows }
}

/// Full outer join sorted ascending by key; either side null-fills the
/// other's columns at unmatched keys.
fn outer_join(left: StreamTable, right: StreamTable) -> LapDataset {
    let left_width = left.columns.len();
    let right_width = right.columns.len();

    let mut columns = left.columns;
    columns.extend(right.columns);

    let left_index: HashMap<FrameKey, Vec<String>> = left.rows.into_iter().collect();
    let right_index: HashMap<FrameKey, Vec<String>> = right.rows.into_iter().collect();

    let mut keys: Vec<FrameKey> = left_index.keys().cloned().collect();
    keys.extend(right_index.keys().filter(|key| !left_index.contains_key(key)).cloned());
    keys.sort_unstable();

    let mut rows = Vec::with_capacity(keys.len());
    for key in keys {
        let mut cells: Vec<Option<String>> = Vec::with_capacity(left_width + right_width);
        match left_index.get(&key) {
            Some(values) => cells.extend(values.iter().cloned().map(Some)),
            None => cells.extend(std::iter::repeat_n(None, left_width)),
        }
        match right_index.get(&key) {
            Some(values) => cells.extend(values.iter().cloned().map(Some)),
            None => cells.extend(std::iter::repeat_n(None, right_width)),
        }
        rows.push(LapRow { key, cells });
    }
    LapDataset { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn key(time: &str, frame: u64) -> FrameKey {
        FrameKey {
            session_time: time.to_string(),
            time_value: time.parse().unwrap(),
            frame_identifier: frame,
        }
    }

    #[test]
    fn keys_order_numerically_not_lexically() {
        let mut keys = vec![key("10.25", 100), key("9.5", 90), key("9.5", 89)];
        keys.sort();
        assert_eq!(keys[0], key("9.5", 89));
        assert_eq!(keys[1], key("9.5", 90));
        assert_eq!(keys[2], key("10.25", 100));
    }

    #[test]
    fn missing_stream_is_lap_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let reconstructor = LapReconstructor::new(dir.path(), 31);
        let err = reconstructor.load_lap(SegmentKind::Race, 4).unwrap_err();
        assert!(matches!(err, RecorderError::LapNotFound { .. }), "got {err}");
    }

    #[test]
    fn malformed_header_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let player = dir.path().join("31/race/player");
        std::fs::create_dir_all(&player).unwrap();
        for kind in StreamKind::ALL {
            std::fs::write(player.join(kind.file_name(1)), "speed,throttle\n1,2\n").unwrap();
        }
        let reconstructor = LapReconstructor::new(dir.path(), 31);
        let err = reconstructor.load_lap(SegmentKind::Race, 1).unwrap_err();
        assert!(matches!(err, RecorderError::Parse { .. }), "got {err}");
    }

    #[test]
    fn scanning_an_unrecorded_session_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let reconstructor = LapReconstructor::new(dir.path(), 404);
        assert!(reconstructor.segments().unwrap().is_empty());
        assert!(reconstructor.available_laps(SegmentKind::Race).unwrap().is_empty());
    }

    #[test]
    fn decode_array_cell_rejects_bad_tokens() {
        assert!(decode_array_cell("1.5 x 2.5").is_err());
        assert_eq!(decode_array_cell("").unwrap(), Vec::<f64>::new());
    }

    proptest! {
        #[test]
        fn decode_array_cell_inverts_space_joining(
            values in proptest::collection::vec(-1.0e9f64..1.0e9, 0..12)
        ) {
            let cell = values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            let decoded = decode_array_cell(&cell).unwrap();
            prop_assert_eq!(decoded.len(), values.len());
            for (parsed, original) in decoded.iter().zip(&values) {
                prop_assert!((parsed - original).abs() <= original.abs() * 1e-12 + 1e-12);
            }
        }
    }
}
