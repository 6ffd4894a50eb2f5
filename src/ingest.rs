//! Ingest task: drives recorders from a decoded event source.
//!
//! The task is the single consumer of the incoming stream. It dispatches
//! every event synchronously, one at a time, so no two dispatches for the
//! same session ever execute concurrently; a new [`SessionRecorder`] is
//! constructed whenever the incoming session uid changes, exactly as the
//! previous session is implicitly abandoned. Each event is also mirrored
//! to a broadcast fan-out for read-only observers.
//!
//! ## Shutdown
//!
//! Every row is appended synchronously, so nothing is buffered in the
//! recorder itself. Still, the final lap of the final session is only
//! bounded by whatever the source last delivered: there is no end-of-lap
//! event, so rows that never reached the source before shutdown are not
//! recoverable. Cancel the task (or let the source end) rather than
//! aborting the process mid-stream.

use crate::Result;
use crate::config::FieldGroups;
use crate::observer::EventStream;
use crate::recorder::SessionRecorder;
use crate::types::TelemetryEvent;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::BroadcastStream;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Trait for decoded event sources.
///
/// Sources abstract over where decoded events come from (a UDP decoder
/// task, a capture replay, a test fixture) and handle their own timing
/// internally.
#[async_trait::async_trait]
pub trait EventSource: Send + 'static {
    /// Get the next decoded event.
    ///
    /// Returns:
    /// - `Ok(Some(event))` - new event available
    /// - `Ok(None)` - stream ended (normal termination)
    /// - `Err(e)` - source error; the ingest task tolerates a bounded run
    ///   of consecutive errors with backoff before giving up
    async fn next_event(&mut self) -> Result<Option<TelemetryEvent>>;
}

/// [`EventSource`] over a bounded mpsc channel, the bridge from an
/// upstream decoder task.
pub struct ChannelSource {
    receiver: mpsc::Receiver<TelemetryEvent>,
}

impl ChannelSource {
    pub fn new(receiver: mpsc::Receiver<TelemetryEvent>) -> Self {
        Self { receiver }
    }
}

#[async_trait::async_trait]
impl EventSource for ChannelSource {
    async fn next_event(&mut self) -> Result<Option<TelemetryEvent>> {
        Ok(self.receiver.recv().await)
    }
}

/// Handle to a spawned ingest task.
pub struct IngestHandle {
    fanout: broadcast::Sender<TelemetryEvent>,
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl IngestHandle {
    /// Subscribe a read-only observer to the event stream.
    pub fn observe(&self) -> EventStream {
        BroadcastStream::new(self.fanout.subscribe())
    }

    /// Request cancellation without waiting for the task to finish.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cancel and wait for the task to end.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }

    /// Wait for the task to end on its own (source exhausted).
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

/// Spawns and manages the recording task.
pub struct Ingest;

impl Ingest {
    /// Fan-out capacity per observer before it starts lagging.
    const OBSERVER_CAPACITY: usize = 256;
    /// Consecutive source errors tolerated before giving up.
    const MAX_ERRORS: u32 = 10;

    /// Spawn the ingest task over `source`, recording under `root`.
    ///
    /// Field groups are validated per session, when the first event of a
    /// new session uid constructs its recorder; a configuration that
    /// cannot validate stops the task.
    pub fn spawn<S: EventSource>(
        root: impl Into<PathBuf>,
        groups: FieldGroups,
        source: S,
    ) -> IngestHandle {
        let (fanout, _) = broadcast::channel(Self::OBSERVER_CAPACITY);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(Self::ingest_task(
            source,
            root.into(),
            groups,
            fanout.clone(),
            cancel.clone(),
        ));
        IngestHandle { fanout, cancel, task }
    }

    async fn ingest_task(
        mut source: impl EventSource,
        root: PathBuf,
        groups: FieldGroups,
        fanout: broadcast::Sender<TelemetryEvent>,
        cancel: CancellationToken,
    ) {
        info!(root = %root.display(), "telemetry ingest task started");
        let mut recorder: Option<SessionRecorder> = None;
        let mut event_count = 0u64;
        let mut error_count = 0u32;

        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("ingest cancelled");
                    break;
                }
                result = source.next_event() => result,
            };

            match result {
                Ok(Some(event)) => {
                    event_count += 1;
                    error_count = 0;

                    let uid = event.header.session_uid;
                    if recorder.as_ref().map(SessionRecorder::session_uid) != Some(uid) {
                        info!(session_uid = uid, "session changed, starting new recorder");
                        match SessionRecorder::new(uid, &root, &groups) {
                            Ok(next) => recorder = Some(next),
                            Err(err) => {
                                error!(error = %err, "recorder construction failed, stopping ingest");
                                break;
                            }
                        }
                    }

                    if let Some(rec) = recorder.as_mut() {
                        if let Err(err) = rec.dispatch(&event) {
                            warn!(
                                error = %err,
                                kind = event.payload.kind_name(),
                                "failed to persist event"
                            );
                        }
                    }

                    // Read-only mirror; having no observers is fine.
                    let _ = fanout.send(event);
                }
                Ok(None) => {
                    info!(events = event_count, "event source ended");
                    break;
                }
                Err(err) => {
                    error_count += 1;
                    error!(error = %err, attempt = error_count, "event source error");
                    if error_count >= Self::MAX_ERRORS {
                        error!("too many source errors, stopping ingest");
                        break;
                    }
                    let backoff = Duration::from_millis(50 * (1 << error_count.min(5)));
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        info!(events = event_count, "telemetry ingest task ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CarMotion, EventPayload, MotionPayload, PacketHeader};
    use futures::StreamExt;

    fn motion_event(uid: u64, frame: u32) -> TelemetryEvent {
        TelemetryEvent::new(
            PacketHeader::new(uid, frame as f32 * 0.1, frame),
            EventPayload::Motion(MotionPayload { cars: vec![CarMotion::default()] }),
        )
    }

    #[tokio::test]
    async fn records_until_source_ends() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel(16);
        let handle = Ingest::spawn(dir.path(), FieldGroups::builtin(), ChannelSource::new(rx));

        for frame in 0..5 {
            tx.send(motion_event(71, frame)).await.unwrap();
        }
        drop(tx);
        handle.join().await;

        let motion = dir.path().join("71/unknown/player/lap0_motion.csv");
        let content = std::fs::read_to_string(motion).unwrap();
        assert_eq!(content.lines().count(), 6, "header plus five rows");
    }

    #[tokio::test]
    async fn session_change_starts_a_new_recorder() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel(16);
        let handle = Ingest::spawn(dir.path(), FieldGroups::builtin(), ChannelSource::new(rx));

        tx.send(motion_event(1, 0)).await.unwrap();
        tx.send(motion_event(2, 1)).await.unwrap();
        drop(tx);
        handle.join().await;

        assert!(dir.path().join("1/unknown/player/lap0_motion.csv").exists());
        assert!(dir.path().join("2/unknown/player/lap0_motion.csv").exists());

        let ledger = crate::storage::SessionLedger::new(dir.path());
        let uids: Vec<u64> = ledger.entries().unwrap().iter().map(|e| e.session_uid).collect();
        assert_eq!(uids, vec![1, 2]);
    }

    #[tokio::test]
    async fn observers_receive_copies() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel(16);
        let handle = Ingest::spawn(dir.path(), FieldGroups::builtin(), ChannelSource::new(rx));
        let mut observed = handle.observe();

        tx.send(motion_event(5, 42)).await.unwrap();
        let seen = observed.next().await.unwrap().unwrap();
        assert_eq!(seen.header.frame_identifier, 42);

        drop(tx);
        handle.join().await;
    }

    #[tokio::test]
    async fn cancellation_stops_the_task() {
        let dir = tempfile::tempdir().unwrap();
        let (_tx, rx) = mpsc::channel::<TelemetryEvent>(1);
        let handle = Ingest::spawn(dir.path(), FieldGroups::builtin(), ChannelSource::new(rx));
        handle.shutdown().await;
    }
}
