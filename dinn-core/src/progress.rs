//! Per-entry progress and its persistence.
//!
//! The store keeps one [`ProgressRecord`] per entry and writes the whole
//! collection to a single JSON document after every mutation. Loading is
//! forgiving: a missing or malformed file starts an empty store.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::catalog::{CauseId, CrewId, Offender};

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Tracks
// ============================================================================

/// One of the two independently progressed attributes of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Identity,
    Fate,
}

impl Track {
    pub fn all() -> [Track; 2] {
        [Track::Identity, Track::Fate]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Track::Identity => "identity",
            Track::Fate => "fate",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown track '{0}' (expected 'identity' or 'fate')")]
pub struct UnknownTrack(pub String);

impl FromStr for Track {
    type Err = UnknownTrack;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identity" | "id" | "name" => Ok(Track::Identity),
            "fate" => Ok(Track::Fate),
            _ => Err(UnknownTrack(s.to_string())),
        }
    }
}

/// Verification state of one track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackStatus {
    #[default]
    Pending,
    /// Terminal until a global reset.
    Verified,
}

// ============================================================================
// Records
// ============================================================================

/// The tentative fate guess for an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FateGuess {
    pub cause_id: Option<CauseId>,
    /// Only meaningful when the cause has a weapon.
    pub weapon: Option<String>,
    /// Only meaningful when the cause requires an offender.
    pub offender_id: Option<Offender>,
}

/// Progress for one entry.
///
/// Field names on disk match the files written by earlier versions of the
/// companion, and every field has a default so partial records still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressRecord {
    #[serde(rename = "identity")]
    pub identity_hints_revealed: usize,

    #[serde(rename = "status")]
    pub identity_status: TrackStatus,

    #[serde(rename = "guessed_id")]
    pub guessed_identity_id: Option<CrewId>,

    #[serde(rename = "fate")]
    pub fate_hints_revealed: usize,

    pub fate_status: TrackStatus,

    pub guessed_fate: FateGuess,
}

impl ProgressRecord {
    pub fn hints_revealed(&self, track: Track) -> usize {
        match track {
            Track::Identity => self.identity_hints_revealed,
            Track::Fate => self.fate_hints_revealed,
        }
    }

    pub(crate) fn set_hints_revealed(&mut self, track: Track, count: usize) {
        match track {
            Track::Identity => self.identity_hints_revealed = count,
            Track::Fate => self.fate_hints_revealed = count,
        }
    }

    pub fn status(&self, track: Track) -> TrackStatus {
        match track {
            Track::Identity => self.identity_status,
            Track::Fate => self.fate_status,
        }
    }

    pub(crate) fn set_status(&mut self, track: Track, status: TrackStatus) {
        match track {
            Track::Identity => self.identity_status = status,
            Track::Fate => self.fate_status = status,
        }
    }

    pub fn is_verified(&self, track: Track) -> bool {
        self.status(track) == TrackStatus::Verified
    }
}

// ============================================================================
// Store
// ============================================================================

/// All progress records, optionally backed by a JSON file.
#[derive(Debug, Clone, Default)]
pub struct ProgressStore {
    records: HashMap<String, ProgressRecord>,
    path: Option<PathBuf>,
}

impl ProgressStore {
    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store backed by `path`.
    ///
    /// A missing file gives an empty store. A malformed file is logged and
    /// also gives an empty store; it stays on disk until the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = if path.exists() {
            match Self::load_json(&path) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(
                        "Failed to load progress from {}: {e}; starting empty",
                        path.display()
                    );
                    HashMap::new()
                }
            }
        } else {
            tracing::warn!(
                "No progress file at {}; starting empty",
                path.display()
            );
            HashMap::new()
        };

        Self {
            records,
            path: Some(path),
        }
    }

    /// Read every record from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<HashMap<String, ProgressRecord>, PersistError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the whole collection.
    ///
    /// The document goes to a sibling temporary file first and is renamed
    /// over the target, so readers never observe a partial write.
    pub fn save_json(&self) -> Result<(), PersistError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.records)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)?;

        tracing::debug!(records = self.records.len(), "Saved progress to {}", path.display());
        Ok(())
    }

    /// Save, logging instead of failing. Used after every mutation.
    pub(crate) fn persist(&self) {
        if let Err(e) = self.save_json() {
            let path = self.path.as_deref().unwrap_or(Path::new("<memory>"));
            tracing::error!("Failed to save progress to {}: {e}", path.display());
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, entry: &str) -> Option<&ProgressRecord> {
        self.records.get(entry)
    }

    /// The record for `entry`, or a fresh one if it has never been touched.
    pub fn snapshot(&self, entry: &str) -> ProgressRecord {
        self.get(entry).cloned().unwrap_or_default()
    }

    /// The record for `entry`, created on first access.
    pub(crate) fn entry_mut(&mut self, entry: &str) -> &mut ProgressRecord {
        self.records.entry(entry.to_string()).or_default()
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, entry: &str, record: ProgressRecord) {
        self.records.insert(entry.to_string(), record);
    }

    /// Drop every record. Returns how many were discarded.
    pub(crate) fn clear(&mut self) -> usize {
        let discarded = self.records.len();
        self.records.clear();
        discarded
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProgressRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_track_from_str() {
        assert_eq!("identity".parse(), Ok(Track::Identity));
        assert_eq!(" Fate ".parse(), Ok(Track::Fate));
        assert!("weapon".parse::<Track>().is_err());
    }

    #[test]
    fn test_record_defaults_to_pending() {
        let record = ProgressRecord::default();
        for track in Track::all() {
            assert_eq!(record.hints_revealed(track), 0);
            assert_eq!(record.status(track), TrackStatus::Pending);
        }
        assert!(record.guessed_identity_id.is_none());
        assert_eq!(record.guessed_fate, FateGuess::default());
    }

    #[test]
    fn test_record_reads_legacy_layout() {
        let json = r#"{
            "identity": 2,
            "fate": 1,
            "guessed_id": 14,
            "status": "verified",
            "guessed_fate": {}
        }"#;

        let record: ProgressRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.identity_hints_revealed, 2);
        assert_eq!(record.fate_hints_revealed, 1);
        assert_eq!(record.guessed_identity_id, Some(CrewId(14)));
        assert_eq!(record.identity_status, TrackStatus::Verified);
        assert_eq!(record.fate_status, TrackStatus::Pending);
        assert_eq!(record.guessed_fate, FateGuess::default());
    }

    #[test]
    fn test_record_writes_established_keys() {
        let mut record = ProgressRecord::default();
        record.guessed_fate.offender_id = Some(Offender::HostileForce);

        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["identity"], 0);
        assert_eq!(value["status"], "pending");
        assert!(value["guessed_id"].is_null());
        assert_eq!(value["fate_status"], "pending");
        assert_eq!(value["guessed_fate"]["offender_id"], -1);
    }

    #[test]
    fn test_save_and_reopen() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("hints_used.json");

        let mut store = ProgressStore::open(&path);
        assert!(store.is_empty());

        store.entry_mut("face_1.png").identity_hints_revealed = 2;
        store.save_json().expect("Save should succeed");
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let reopened = ProgressStore::open(&path);
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.snapshot("face_1.png").identity_hints_revealed, 2);
    }

    #[test]
    fn test_malformed_file_starts_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("hints_used.json");
        fs::write(&path, "{ this is not json").unwrap();

        let store = ProgressStore::open(&path);

        assert!(store.is_empty());
        assert_eq!(store.path(), Some(path.as_path()));
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("nested").join("progress.json");

        let mut store = ProgressStore::open(&path);
        store.entry_mut("face_3.png");
        store.save_json().expect("Save should succeed");

        assert!(path.exists());
    }

    #[test]
    fn test_in_memory_save_is_noop() {
        let mut store = ProgressStore::in_memory();
        store.entry_mut("a");
        assert!(store.save_json().is_ok());
        assert!(store.path().is_none());
    }

    #[test]
    fn test_snapshot_does_not_create() {
        let store = ProgressStore::in_memory();
        let record = store.snapshot("never-seen");
        assert_eq!(record, ProgressRecord::default());
        assert!(store.get("never-seen").is_none());
    }

    #[test]
    fn test_clear_reports_discarded() {
        let mut store = ProgressStore::in_memory();
        store.entry_mut("a");
        store.entry_mut("b");
        assert_eq!(store.clear(), 2);
        assert!(store.is_empty());
    }
}
