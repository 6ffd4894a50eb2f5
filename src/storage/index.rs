//! Append-only session ledger.
//!
//! One growing `sessions.csv` at the recording root records every session
//! registration as a (timestamp, session uid) pair in arrival order. There
//! is no deduplication: restarting a recording of the same session uid
//! appends a second entry, and "most recent session" is the last entry in
//! arrival order, not a member of a deduplicated set.

use super::layout::LEDGER_FILE;
use crate::{RecorderError, Result};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

const LEDGER_HEADER: &str = "datetime,sessionUID\n";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One arrival-ordered ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub timestamp: String,
    pub session_uid: u64,
}

/// Explicit handle to the session ledger file.
///
/// The ledger is owned by whoever records — typically one
/// [`SessionRecorder`](crate::SessionRecorder) instance — and passed to
/// collaborators that need it. It is never reached through ambient
/// process-wide state.
#[derive(Debug, Clone)]
pub struct SessionLedger {
    path: PathBuf,
}

impl SessionLedger {
    /// Ledger handle for a recording root; the file itself is
    /// `<root>/sessions.csv`, created on first registration.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { path: root.as_ref().join(LEDGER_FILE) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one registration for `session_uid`, stamped with the
    /// current local time.
    pub fn register(&self, session_uid: u64) -> Result<()> {
        self.register_at(&Local::now().format(TIMESTAMP_FORMAT).to_string(), session_uid)
    }

    fn register_at(&self, timestamp: &str, session_uid: u64) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|source| RecorderError::file_error(parent, source))?;
            }
        }

        let existed = self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| RecorderError::file_error(&self.path, source))?;

        let mut entry = String::new();
        if !existed {
            entry.push_str(LEDGER_HEADER);
        }
        entry.push_str(&format!("{timestamp},{session_uid}\n"));
        file.write_all(entry.as_bytes())
            .map_err(|source| RecorderError::file_error(&self.path, source))?;

        info!(session_uid, timestamp, "registered session in ledger");
        Ok(())
    }

    /// All entries in arrival order. A ledger that does not exist yet
    /// reads as empty.
    pub fn entries(&self) -> Result<Vec<LedgerEntry>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(RecorderError::file_error(&self.path, source)),
        };

        let mut entries = Vec::new();
        for line in raw.lines().skip(1) {
            let (timestamp, uid) = line.split_once(',').ok_or_else(|| {
                RecorderError::parse_error("session ledger", format!("malformed line '{line}'"))
            })?;
            let session_uid = uid.parse().map_err(|_| {
                RecorderError::parse_error("session ledger", format!("bad session uid '{uid}'"))
            })?;
            entries.push(LedgerEntry { timestamp: timestamp.to_string(), session_uid });
        }
        Ok(entries)
    }

    /// The last-registered session uid, in arrival order — not a
    /// deduplicated set, so a re-recorded session wins over everything
    /// that came between its two registrations.
    pub fn most_recent(&self) -> Result<Option<u64>> {
        Ok(self.entries()?.last().map(|entry| entry.session_uid))
    }
}
