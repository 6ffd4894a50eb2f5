//! Reconstruction tests: join semantics over recorded and handwritten
//! stream files.

mod common;

use common::*;
use paddock::{FieldGroups, Paddock, RecorderError, SegmentKind, StreamKind};
use std::path::Path;

/// Write one per-lap stream file by hand, for exact control of the frame
/// sets each stream covers.
fn write_stream(player_dir: &Path, kind: StreamKind, lap: u32, column: &str, frames: &[u32]) {
    let mut content = format!("sessionTime,frameIdentifier,{column}\n");
    for frame in frames {
        content.push_str(&format!("{frame},{frame},{column}{frame}\n"));
    }
    std::fs::write(player_dir.join(kind.file_name(lap)), content).unwrap();
}

#[test]
fn inner_join_keeps_only_agreed_frames_outer_join_keeps_all() -> anyhow::Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let player = dir.path().join("55/race/player");
    std::fs::create_dir_all(&player)?;

    write_stream(&player, StreamKind::Telemetry, 1, "speed", &[1, 2, 3]);
    write_stream(&player, StreamKind::Motion, 1, "gLat", &[2, 3, 4]);
    write_stream(&player, StreamKind::Status, 1, "fuel", &[2, 3, 4]);
    write_stream(&player, StreamKind::LapData, 1, "lapDistance", &[1, 2, 3, 4, 5]);

    let dataset = Paddock::reconstructor(dir.path(), 55).load_lap(SegmentKind::Race, 1)?;

    assert_eq!(dataset.columns, vec!["speed", "gLat", "fuel", "lapDistance"]);
    let frames: Vec<u64> = dataset.rows.iter().map(|row| row.key.frame_identifier()).collect();
    assert_eq!(frames, vec![1, 2, 3, 4, 5], "outer join retains every lap-progress frame");

    let speed = dataset.column_index("speed").unwrap();
    let lap_distance = dataset.column_index("lapDistance").unwrap();
    for row in &dataset.rows {
        let frame = row.key.frame_identifier();
        let instrumented = frame == 2 || frame == 3;
        assert_eq!(
            row.cells[speed].is_some(),
            instrumented,
            "instrumentation at frame {frame} should be {}",
            if instrumented { "present" } else { "null-filled" }
        );
        assert!(row.cells[lap_distance].is_some());
    }
    Ok(())
}

#[test]
fn reconstruction_is_deterministic() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut recorder = Paddock::recorder(SESSION_UID, dir.path(), &FieldGroups::builtin())?;
    recorder.dispatch(&session_event(SegmentKind::Race, 0))?;
    for frame in 1..40 {
        recorder.dispatch(&telemetry_event(frame))?;
        recorder.dispatch(&motion_event(frame))?;
        recorder.dispatch(&status_event(frame))?;
        if frame % 3 == 0 {
            recorder.dispatch(&lap_event(frame, 0))?;
        }
    }

    let reconstructor = Paddock::reconstructor(dir.path(), SESSION_UID);
    let first = reconstructor.load_lap(SegmentKind::Race, 0)?;
    let second = reconstructor.load_lap(SegmentKind::Race, 0)?;
    assert_eq!(first.to_csv(), second.to_csv(), "identical inputs, byte-identical output");
    Ok(())
}

#[test]
fn recorded_laps_reconstruct_with_all_stream_columns() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut recorder = Paddock::recorder(SESSION_UID, dir.path(), &FieldGroups::builtin())?;
    recorder.dispatch(&session_event(SegmentKind::Qualifying2, 0))?;
    for frame in 1..10 {
        recorder.dispatch(&telemetry_event(frame))?;
        recorder.dispatch(&motion_event(frame))?;
        recorder.dispatch(&status_event(frame))?;
        recorder.dispatch(&lap_event(frame, 0))?;
    }

    let dataset =
        Paddock::reconstructor(dir.path(), SESSION_UID).load_lap(SegmentKind::Qualifying2, 0)?;

    assert_eq!(dataset.len(), 9);
    // stream order: telemetry, motion, status, lap-progress
    assert_eq!(dataset.columns.first().map(String::as_str), Some("speed"));
    assert!(dataset.column_index("worldPositionX").is_some());
    assert!(dataset.column_index("fuelInTank").is_some());
    assert!(dataset.column_index("lapDistance").is_some());

    // every frame was instrumented, so nothing is null-filled
    let speed = dataset.column_index("speed").unwrap();
    for (i, row) in dataset.rows.iter().enumerate() {
        let expected = 100 + i as u64 + 1;
        assert_eq!(row.cells[speed].as_deref(), Some(expected.to_string().as_str()));
    }
    Ok(())
}

#[test]
fn missing_lap_is_not_found_and_scans_can_skip_it() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut recorder = Paddock::recorder(SESSION_UID, dir.path(), &FieldGroups::builtin())?;
    recorder.dispatch(&session_event(SegmentKind::Race, 0))?;
    recorder.dispatch(&telemetry_event(1))?;
    recorder.dispatch(&motion_event(1))?;
    recorder.dispatch(&status_event(1))?;
    recorder.dispatch(&lap_event(1, 0))?;

    let reconstructor = Paddock::reconstructor(dir.path(), SESSION_UID);
    let err = reconstructor.load_lap(SegmentKind::Race, 7).unwrap_err();
    assert!(matches!(err, RecorderError::LapNotFound { .. }), "got {err}");

    // a range scan skips the missing laps instead of failing
    let recovered: Vec<u32> = (0..10)
        .filter(|lap| reconstructor.load_lap(SegmentKind::Race, *lap).is_ok())
        .collect();
    assert_eq!(recovered, vec![0]);
    assert_eq!(reconstructor.available_laps(SegmentKind::Race)?, vec![0]);
    Ok(())
}

#[test]
fn segments_scan_lists_recorded_segments_in_order() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut recorder = Paddock::recorder(SESSION_UID, dir.path(), &FieldGroups::builtin())?;
    recorder.dispatch(&session_event(SegmentKind::Race, 0))?;
    recorder.dispatch(&session_event(SegmentKind::Practice1, 1))?;
    recorder.dispatch(&session_event(SegmentKind::Qualifying3, 2))?;

    let reconstructor = Paddock::reconstructor(dir.path(), SESSION_UID);
    assert_eq!(
        reconstructor.segments()?,
        vec![SegmentKind::Practice1, SegmentKind::Qualifying3, SegmentKind::Race]
    );
    Ok(())
}
