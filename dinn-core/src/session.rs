//! Session - the primary public API for the companion.
//!
//! Wraps the reference catalog, the progress store and the rules engine
//! into a single interface. Every mutator persists before returning.

use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, CatalogFiles, CauseId, CrewId, Offender};
use crate::progress::{ProgressRecord, ProgressStore, Track};
use crate::rules::{Effect, Intent, Resolution, RuleError, RulesEngine};

/// Name of the progress file when no explicit path is configured.
pub const DEFAULT_PROGRESS_FILE: &str = "hints_used.json";

/// Configuration for opening a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory holding the reference files.
    pub data_dir: PathBuf,

    /// Where progress is saved. Defaults to `hints_used.json` in `data_dir`.
    pub progress_path: Option<PathBuf>,

    /// File names of the reference inputs.
    pub files: CatalogFiles,
}

impl SessionConfig {
    /// Create a config reading reference data from `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            progress_path: None,
            files: CatalogFiles::default(),
        }
    }

    /// Save progress somewhere other than the data directory.
    pub fn with_progress_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.progress_path = Some(path.into());
        self
    }

    /// Use different reference file names.
    pub fn with_file_names(mut self, files: CatalogFiles) -> Self {
        self.files = files;
        self
    }

    /// The resolved progress file location.
    pub fn progress_path(&self) -> PathBuf {
        self.progress_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DEFAULT_PROGRESS_FILE))
    }
}

/// Verification counts across every known entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub entries: usize,
    pub identities_verified: usize,
    pub fates_verified: usize,
}

/// A companion session.
///
/// Owns the read-only catalog and the progress store. All mutation goes
/// through the rules engine.
pub struct Session {
    catalog: Catalog,
    store: ProgressStore,
}

impl Session {
    /// Load the catalog and the progress file.
    ///
    /// Never fails: missing or malformed inputs degrade to empty defaults
    /// and are logged.
    pub fn load(config: &SessionConfig) -> Self {
        let catalog = Catalog::load(&config.data_dir, &config.files);
        let store = ProgressStore::open(config.progress_path());
        tracing::debug!(
            records = store.len(),
            "Opened session over {}",
            config.data_dir.display()
        );
        Self { catalog, store }
    }

    /// Create a session from an existing catalog and store.
    pub fn from_parts(catalog: Catalog, store: ProgressStore) -> Self {
        Self { catalog, store }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    /// Where progress is written, if anywhere.
    pub fn progress_path(&self) -> Option<&Path> {
        self.store.path()
    }

    // ------------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------------

    /// Apply an intent to one entry.
    pub fn apply(&mut self, entry: &str, intent: Intent) -> Result<Resolution, RuleError> {
        RulesEngine::new(&self.catalog).resolve(&mut self.store, entry, intent)
    }

    pub fn reveal_next_hint(&mut self, entry: &str, track: Track) -> Result<Resolution, RuleError> {
        RulesEngine::new(&self.catalog).reveal_next_hint(&mut self.store, entry, track)
    }

    pub fn set_identity_guess(
        &mut self,
        entry: &str,
        crew_id: CrewId,
    ) -> Result<Resolution, RuleError> {
        RulesEngine::new(&self.catalog).set_identity_guess(&mut self.store, entry, crew_id)
    }

    pub fn set_fate_cause(
        &mut self,
        entry: &str,
        cause_id: CauseId,
    ) -> Result<Resolution, RuleError> {
        RulesEngine::new(&self.catalog).set_fate_cause(&mut self.store, entry, cause_id)
    }

    pub fn set_fate_weapon(
        &mut self,
        entry: &str,
        weapon: impl Into<String>,
    ) -> Result<Resolution, RuleError> {
        RulesEngine::new(&self.catalog).set_fate_weapon(&mut self.store, entry, weapon)
    }

    pub fn set_fate_offender(
        &mut self,
        entry: &str,
        offender: Offender,
    ) -> Result<Resolution, RuleError> {
        RulesEngine::new(&self.catalog).set_fate_offender(&mut self.store, entry, offender)
    }

    pub fn verify_identity(&mut self, entry: &str) -> Result<Resolution, RuleError> {
        RulesEngine::new(&self.catalog).verify_identity(&mut self.store, entry)
    }

    pub fn verify_fate(&mut self, entry: &str) -> Result<Resolution, RuleError> {
        RulesEngine::new(&self.catalog).verify_fate(&mut self.store, entry)
    }

    /// Check the guess on either track.
    pub fn verify(&mut self, entry: &str, track: Track) -> Result<Resolution, RuleError> {
        self.apply(entry, Intent::Verify { track })
    }

    /// Discard all progress. Callers are expected to confirm with the user first.
    pub fn reset_all(&mut self) -> Effect {
        RulesEngine::new(&self.catalog).reset_all(&mut self.store)
    }

    /// Access an entry, creating and reconciling its record.
    pub fn open(&mut self, entry: &str) -> Resolution {
        RulesEngine::new(&self.catalog).open(&mut self.store, entry)
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// The entry's progress, or a fresh record. Never creates one.
    pub fn record(&self, entry: &str) -> ProgressRecord {
        self.store.snapshot(entry)
    }

    pub fn visible_hints(&self, entry: &str, track: Track) -> &[String] {
        RulesEngine::new(&self.catalog).visible_hints(&self.store, entry, track)
    }

    pub fn hint_total(&self, entry: &str, track: Track) -> usize {
        self.catalog.hint_total(entry, track)
    }

    pub fn is_fate_guess_complete(&self, entry: &str) -> bool {
        RulesEngine::new(&self.catalog).is_fate_guess_complete(&self.store, entry)
    }

    /// Every known entry key, in display order.
    pub fn entries(&self) -> Vec<&str> {
        self.catalog.entries()
    }

    /// Whether `entry` is known to the catalog.
    pub fn has_entry(&self, entry: &str) -> bool {
        self.catalog.contains(entry)
    }

    pub fn summary(&self) -> Summary {
        let entries = self.catalog.entries();
        let mut summary = Summary {
            entries: entries.len(),
            ..Summary::default()
        };
        for entry in entries {
            let Some(record) = self.store.get(entry) else {
                continue;
            };
            if record.is_verified(Track::Identity) {
                summary.identities_verified += 1;
            }
            if record.is_verified(Track::Fate) {
                summary.fates_verified += 1;
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixture_catalog;

    fn session() -> Session {
        Session::from_parts(fixture_catalog(), ProgressStore::in_memory())
    }

    #[test]
    fn test_session_config() {
        let config = SessionConfig::new("/data/dinn");
        assert_eq!(
            config.progress_path(),
            PathBuf::from("/data/dinn/hints_used.json")
        );

        let config = config.with_progress_path("/tmp/progress.json");
        assert_eq!(config.progress_path(), PathBuf::from("/tmp/progress.json"));
        assert_eq!(config.files, CatalogFiles::default());
    }

    #[test]
    fn test_summary_counts_verified_tracks() {
        let mut session = session();
        assert_eq!(
            session.summary(),
            Summary {
                entries: 4,
                identities_verified: 0,
                fates_verified: 0
            }
        );

        session.set_identity_guess("A", CrewId(7)).unwrap();
        session.verify_identity("A").unwrap();
        session.reveal_next_hint("orphan", Track::Fate).unwrap();
        session.set_fate_cause("B", CauseId(3)).unwrap();
        session.set_fate_offender("B", Offender::Beast).unwrap();
        session.verify_fate("B").unwrap();

        let summary = session.summary();
        assert_eq!(summary.identities_verified, 1);
        assert_eq!(summary.fates_verified, 1);
    }

    #[test]
    fn test_record_does_not_create() {
        let session = session();
        assert_eq!(session.record("A"), ProgressRecord::default());
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_has_entry() {
        let session = session();
        assert!(session.has_entry("B"));
        assert!(!session.has_entry("Z"));
    }

    #[test]
    fn test_load_with_missing_inputs_starts_empty() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let session = Session::load(&SessionConfig::new(dir.path()));

        assert!(session.entries().is_empty());
        assert!(session.store().is_empty());
        assert_eq!(
            session.progress_path(),
            Some(dir.path().join(DEFAULT_PROGRESS_FILE).as_path())
        );
    }
}
