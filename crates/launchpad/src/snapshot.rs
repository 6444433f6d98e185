//! Durable state layout.
//!
//! Round configuration, runtime state and whitelist entries are the only
//! persisted state. Snapshots are written as pretty JSON and replaced
//! atomically, so a reader never observes a half-written file.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

use crate::{
    error::SnapshotError,
    types::{Round, RoundId},
};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to rebuild a launchpad after a restart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchpadSnapshot {
    /// Format version.
    pub version: u32,
    /// Id the next created round receives.
    pub next_round_id: RoundId,
    /// Every round with its state.
    pub rounds: BTreeMap<RoundId, Round>,
    /// Whitelist members per round.
    #[serde(default)]
    pub whitelist: BTreeMap<RoundId, BTreeSet<Address>>,
}

impl Default for LaunchpadSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            next_round_id: 0,
            rounds: BTreeMap::new(),
            whitelist: BTreeMap::new(),
        }
    }
}

impl LaunchpadSnapshot {
    /// Fails unless the snapshot is in the format this build reads.
    pub fn ensure_supported(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(())
    }
}

/// Reads and writes a snapshot at a fixed path.
#[derive(Clone, Debug)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the snapshot, or `None` if none has been written yet.
    pub fn load(&self) -> Result<Option<LaunchpadSnapshot>, SnapshotError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path)?;
        let snapshot: LaunchpadSnapshot = serde_json::from_str(&data)?;
        snapshot.ensure_supported()?;
        tracing::debug!(
            target: "launchpad",
            path = %self.path.display(),
            rounds = snapshot.rounds.len(),
            "snapshot loaded"
        );
        Ok(Some(snapshot))
    }

    /// Writes the snapshot through a temp file in the same directory.
    pub fn save(&self, snapshot: &LaunchpadSnapshot) -> Result<(), SnapshotError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut file = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut file, snapshot)?;
        file.flush()?;
        file.as_file().sync_all()?;
        file.persist(&self.path)?;

        tracing::debug!(
            target: "launchpad",
            path = %self.path.display(),
            rounds = snapshot.rounds.len(),
            "snapshot saved"
        );
        Ok(())
    }
}
