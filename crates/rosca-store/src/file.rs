//! JSON file persistence.
//!
//! The whole ledger is one JSON record:
//! ```text
//! {"committees": [...], "members": [...], "payments": [...], "draws": [...]}
//! ```
//! Loading never fails hard: a missing file is a fresh ledger, and a file
//! that cannot be read or lacks any of the four collections falls back to an
//! empty snapshot.

use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use rosca_ledger::{LedgerConfig, LedgerResult, Snapshot, SnapshotSink, SnapshotValidator};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};

/// A snapshot stored as a single JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored snapshot. `Ok(None)` when no file exists yet.
    pub fn try_load(&self) -> StoreResult<Option<Snapshot>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        Ok(Some(snapshot))
    }

    /// Load the stored snapshot, falling back to an empty one on any failure.
    ///
    /// Loaded data is checked against the ledger invariants; violations are
    /// logged but the data is kept as-is.
    pub fn load(&self, config: &LedgerConfig) -> Snapshot {
        let snapshot = match self.try_load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                info!(path = %self.path.display(), "no ledger state found; starting empty");
                return Snapshot::empty();
            }
            Err(error) => {
                warn!(
                    path = %self.path.display(),
                    %error,
                    "unreadable ledger state; starting empty"
                );
                return Snapshot::empty();
            }
        };

        let report = SnapshotValidator::validate(&snapshot, config.due_day);
        for violation in &report.violations {
            warn!(
                kind = ?violation.kind,
                entity = %violation.entity,
                "{}",
                violation.description
            );
        }
        info!(
            path = %self.path.display(),
            committees = report.committees_checked,
            violations = report.violations.len(),
            "ledger state loaded"
        );
        snapshot
    }

    /// Write the snapshot atomically: stage in a temp file beside the target,
    /// then rename over it.
    pub fn save(&self, snapshot: &Snapshot) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            Some(_) => PathBuf::from("."),
            None => return Err(StoreError::InvalidPath(self.path.display().to_string())),
        };
        fs::create_dir_all(&dir)?;

        let staged = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(staged.as_file());
            serde_json::to_writer_pretty(&mut writer, snapshot)?;
            writer.flush()?;
        }
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|e| e.error)?;
        debug!(path = %self.path.display(), "ledger state saved");
        Ok(())
    }
}

impl SnapshotSink for JsonFileStore {
    fn persist(&self, snapshot: &Snapshot) -> LedgerResult<()> {
        self.save(snapshot).map_err(Into::into)
    }
}
