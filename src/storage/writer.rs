//! Create-or-append write primitive for recorded streams.

use crate::{RecorderError, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Append-only file writer rooted at the recording directory.
///
/// Every call is one synchronous open+append; nothing is buffered between
/// calls, so a row is durable as soon as `write` returns. Single writer
/// per session is assumed — there is no locking.
#[derive(Debug, Clone)]
pub struct AppendWriter {
    root: PathBuf,
}

impl AppendWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Append `data` to the file at `relative` (resolved against the
    /// root), creating it first if needed.
    ///
    /// On creation, `header_if_new` (when provided) is written before
    /// `data` — this is the only moment a header line can be emitted, so
    /// a stream's header appears exactly once no matter how many appends
    /// follow. Missing intermediate directories are created lazily;
    /// pre-existing ones are not errors.
    pub fn write(&self, relative: &Path, data: &str, header_if_new: Option<&str>) -> Result<()> {
        let path = self.root.join(relative);

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|source| RecorderError::file_error(parent, source))?;
                debug!(path = %parent.display(), "created stream directory");
            }
        }

        let existed = path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| RecorderError::file_error(&path, source))?;

        if !existed {
            debug!(path = %path.display(), "created stream file");
            if let Some(header) = header_if_new {
                file.write_all(header.as_bytes())
                    .map_err(|source| RecorderError::file_error(&path, source))?;
            }
        }
        file.write_all(data.as_bytes())
            .map_err(|source| RecorderError::file_error(&path, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_writes_header_then_data() {
        let dir = tempfile::tempdir().unwrap();
        let writer = AppendWriter::new(dir.path());
        writer.write(Path::new("a/b/rows.csv"), "1,2\n", Some("x,y\n")).unwrap();

        let content = std::fs::read_to_string(dir.path().join("a/b/rows.csv")).unwrap();
        assert_eq!(content, "x,y\n1,2\n");
    }

    #[test]
    fn append_never_repeats_the_header() {
        let dir = tempfile::tempdir().unwrap();
        let writer = AppendWriter::new(dir.path());
        let rel = Path::new("rows.csv");
        for i in 0..5 {
            writer.write(rel, &format!("{i}\n"), Some("v\n")).unwrap();
        }

        let content = std::fs::read_to_string(dir.path().join(rel)).unwrap();
        assert_eq!(content, "v\n0\n1\n2\n3\n4\n");
        assert_eq!(content.matches("v\n").count(), 1);
    }

    #[test]
    fn pre_existing_directories_are_not_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("seg/player")).unwrap();
        let writer = AppendWriter::new(dir.path());
        writer.write(Path::new("seg/player/lap1_motion.csv"), "r\n", None).unwrap();
        assert!(dir.path().join("seg/player/lap1_motion.csv").exists());
    }

    #[test]
    fn header_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let writer = AppendWriter::new(dir.path());
        writer.write(Path::new("bare.csv"), "only\n", None).unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("bare.csv")).unwrap(), "only\n");
    }
}
