//! Reference data for the companion.
//!
//! Holds the hint text for every entry, the crew roster, the fate-cause
//! taxonomy and both answer keys. The catalog is loaded once at startup and
//! never mutated afterwards. Every source file is optional: a missing or
//! unreadable file degrades to an empty default and a logged warning.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::progress::{FateGuess, Track};

/// Shown in place of identity hints when an entry has none recorded.
pub const UNRECORDED_IDENTITY: &str = "Identity unrecorded.";

/// Shown in place of fate hints when an entry has none recorded.
pub const UNRECORDED_FATE: &str = "Fate unrecorded.";

// ============================================================================
// ID Types
// ============================================================================

/// Identifier of a crew member in the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrewId(pub u32);

impl fmt::Display for CrewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a fate cause in the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CauseId(pub u32);

impl CauseId {
    /// Reserved "unknown cause". Never a satisfying guess.
    pub const UNKNOWN: CauseId = CauseId(1);

    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }
}

impl fmt::Display for CauseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who (or what) was responsible for a fate.
///
/// Stored as a bare integer: crew ids as themselves, and two reserved
/// negative sentinels for offenders that are not crew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Offender {
    Crew(CrewId),
    HostileForce,
    Beast,
}

impl Offender {
    pub const HOSTILE_FORCE_ID: i64 = -1;
    pub const BEAST_ID: i64 = -2;

    pub fn crew_id(&self) -> Option<CrewId> {
        match self {
            Offender::Crew(id) => Some(*id),
            _ => None,
        }
    }
}

/// Input that does not name a crew member or a known sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OffenderError {
    #[error("invalid offender id {0}")]
    InvalidId(i64),

    #[error("unrecognized offender '{0}' (expected a crew id, 'hostile' or 'beast')")]
    Unrecognized(String),
}

impl TryFrom<i64> for Offender {
    type Error = OffenderError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            Self::HOSTILE_FORCE_ID => Ok(Offender::HostileForce),
            Self::BEAST_ID => Ok(Offender::Beast),
            n => u32::try_from(n)
                .map(|id| Offender::Crew(CrewId(id)))
                .map_err(|_| OffenderError::InvalidId(n)),
        }
    }
}

impl From<Offender> for i64 {
    fn from(offender: Offender) -> Self {
        match offender {
            Offender::Crew(id) => i64::from(id.0),
            Offender::HostileForce => Offender::HOSTILE_FORCE_ID,
            Offender::Beast => Offender::BEAST_ID,
        }
    }
}

impl FromStr for Offender {
    type Err = OffenderError;

    /// Accepts `hostile`, `beast`, or an integer id (sentinels included).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hostile" | "enemy" => Ok(Offender::HostileForce),
            "beast" => Ok(Offender::Beast),
            other => other
                .parse::<i64>()
                .map_err(|_| OffenderError::Unrecognized(s.to_string()))
                .and_then(Offender::try_from),
        }
    }
}

// ============================================================================
// Reference Types
// ============================================================================

/// One member of the crew roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: CrewId,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub origin: String,
}

impl CrewMember {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        role: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            id: CrewId(id),
            name: name.into(),
            role: role.into(),
            origin: origin.into(),
        }
    }

    /// `"{name} ({role})"`, the way a guess is shown.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.role)
    }
}

/// A cause of death or disappearance in the fate taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FateCause {
    pub id: CauseId,
    pub label: String,
    /// A complete guess with this cause must also name a weapon.
    #[serde(default)]
    pub has_weapon: bool,
    /// A complete guess with this cause must also name an offender.
    #[serde(default)]
    pub requires_offender: bool,
    #[serde(default)]
    pub weapons: Vec<String>,
}

impl FateCause {
    pub fn new(id: u32, label: impl Into<String>) -> Self {
        Self {
            id: CauseId(id),
            label: label.into(),
            has_weapon: false,
            requires_offender: false,
            weapons: Vec::new(),
        }
    }

    pub fn with_weapons<I, S>(mut self, weapons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.has_weapon = true;
        self.weapons = weapons.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_offender(mut self) -> Self {
        self.requires_offender = true;
        self
    }
}

/// One acceptable answer for an entry's fate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FateSolution {
    #[serde(rename = "cause")]
    pub cause_label: String,
    #[serde(default)]
    pub weapon: Option<String>,
    #[serde(default, rename = "offender_id")]
    pub offender: Option<Offender>,
}

impl FateSolution {
    pub fn new(cause_label: impl Into<String>) -> Self {
        Self {
            cause_label: cause_label.into(),
            weapon: None,
            offender: None,
        }
    }

    pub fn with_weapon(mut self, weapon: impl Into<String>) -> Self {
        self.weapon = Some(weapon.into());
        self
    }

    pub fn with_offender(mut self, offender: Offender) -> Self {
        self.offender = Some(offender);
        self
    }
}

/// Ordered hint text for both tracks of one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryHints {
    pub identity: Vec<String>,
    pub fate: Vec<String>,
}

impl EntryHints {
    fn placeholder() -> Self {
        Self {
            identity: vec![UNRECORDED_IDENTITY.to_string()],
            fate: vec![UNRECORDED_FATE.to_string()],
        }
    }

    fn track(&self, track: Track) -> &[String] {
        match track {
            Track::Identity => &self.identity,
            Track::Fate => &self.fate,
        }
    }
}

// ============================================================================
// Source Files
// ============================================================================

/// File names of the reference inputs inside the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFiles {
    pub hints: String,
    pub crew: String,
    pub identity_answers: String,
    pub causes: String,
    pub fate_answers: String,
}

impl Default for CatalogFiles {
    fn default() -> Self {
        Self {
            hints: "faces_data.json".to_string(),
            crew: "name_lists.json".to_string(),
            identity_answers: "correct_name_list.json".to_string(),
            causes: "fates_structure.json".to_string(),
            fate_answers: "correct_fates_list.json".to_string(),
        }
    }
}

/// Why a reference file could not be used.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0} not found")]
    Missing(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Hint text as it appears on disk, including the legacy single-string form.
/// A list may be missing or `null`; both fall back to the legacy field.
#[derive(Debug, Default, Deserialize)]
struct RawEntry {
    #[serde(default)]
    identity_hints: Option<Vec<String>>,
    #[serde(default)]
    fate_hints: Option<Vec<String>>,
    #[serde(default)]
    identity: Option<String>,
    #[serde(default)]
    fate: Option<String>,
}

impl RawEntry {
    fn normalize(self) -> EntryHints {
        EntryHints {
            identity: normalize_hints(self.identity_hints, self.identity, UNRECORDED_IDENTITY),
            fate: normalize_hints(self.fate_hints, self.fate, UNRECORDED_FATE),
        }
    }
}

fn normalize_hints(
    list: Option<Vec<String>>,
    legacy: Option<String>,
    placeholder: &str,
) -> Vec<String> {
    if let Some(list) = list.filter(|list| !list.is_empty()) {
        return list;
    }
    match legacy {
        Some(text) => vec![text],
        None => vec![placeholder.to_string()],
    }
}

/// A fate answer is either a single solution or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawFateAnswer {
    One(FateSolution),
    Many(Vec<FateSolution>),
}

impl RawFateAnswer {
    fn into_vec(self) -> Vec<FateSolution> {
        match self {
            RawFateAnswer::One(solution) => vec![solution],
            RawFateAnswer::Many(solutions) => solutions,
        }
    }
}

/// Read and parse one JSON reference file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CatalogError::Missing(path.to_path_buf()));
        }
        Err(source) => {
            return Err(CatalogError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&content).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn read_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match read_json(path) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("{e}; using an empty default");
            T::default()
        }
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Read-only reference data.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: HashMap<String, EntryHints>,
    crew: BTreeMap<CrewId, CrewMember>,
    causes: Vec<FateCause>,
    identity_answers: HashMap<String, CrewId>,
    fate_answers: HashMap<String, Vec<FateSolution>>,
    placeholder: EntryHints,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::empty()
    }
}

impl Catalog {
    /// A catalog with no entries, crew, causes or answers.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            crew: BTreeMap::new(),
            causes: Vec::new(),
            identity_answers: HashMap::new(),
            fate_answers: HashMap::new(),
            placeholder: EntryHints::placeholder(),
        }
    }

    /// Load every reference file from `dir`.
    ///
    /// Never fails: each file independently falls back to an empty default.
    pub fn load(dir: impl AsRef<Path>, files: &CatalogFiles) -> Self {
        let dir = dir.as_ref();
        let mut catalog = Self::empty();

        let raw_entries: HashMap<String, RawEntry> = read_or_default(&dir.join(&files.hints));
        for (key, raw) in raw_entries {
            catalog.entries.insert(key, raw.normalize());
        }

        let roster: Vec<CrewMember> = read_or_default(&dir.join(&files.crew));
        for member in roster {
            catalog = catalog.with_crew(member);
        }

        catalog.identity_answers = read_or_default(&dir.join(&files.identity_answers));
        catalog.causes = read_or_default(&dir.join(&files.causes));

        let raw_fates: HashMap<String, RawFateAnswer> =
            read_or_default(&dir.join(&files.fate_answers));
        for (key, raw) in raw_fates {
            catalog = catalog.with_fate_answers(key, raw.into_vec());
        }

        tracing::debug!(
            entries = catalog.entries.len(),
            crew = catalog.crew.len(),
            causes = catalog.causes.len(),
            "Loaded reference catalog from {}",
            dir.display()
        );
        catalog
    }

    /// Add hint text for an entry.
    pub fn with_entry<I, J, S, T>(mut self, key: impl Into<String>, identity: I, fate: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        let raw = RawEntry {
            identity_hints: Some(identity.into_iter().map(Into::into).collect()),
            fate_hints: Some(fate.into_iter().map(Into::into).collect()),
            identity: None,
            fate: None,
        };
        self.entries.insert(key.into(), raw.normalize());
        self
    }

    /// Add a crew member. A repeated id replaces the earlier member.
    pub fn with_crew(mut self, member: CrewMember) -> Self {
        if let Some(previous) = self.crew.insert(member.id, member) {
            tracing::warn!(
                "Duplicate crew id {} ({}), keeping the later entry",
                previous.id,
                previous.name
            );
        }
        self
    }

    pub fn with_cause(mut self, cause: FateCause) -> Self {
        self.causes.push(cause);
        self
    }

    pub fn with_identity_answer(mut self, key: impl Into<String>, crew_id: u32) -> Self {
        self.identity_answers.insert(key.into(), CrewId(crew_id));
        self
    }

    /// Set the acceptable fate answers for an entry. An empty set is dropped.
    pub fn with_fate_answers(mut self, key: impl Into<String>, solutions: Vec<FateSolution>) -> Self {
        let key = key.into();
        if solutions.is_empty() {
            tracing::warn!("Fate answer for '{key}' lists no solutions, ignoring it");
            return self;
        }
        self.fate_answers.insert(key, solutions);
        self
    }

    /// Hints for one track, with the placeholder substituted when none exist.
    pub fn hints(&self, entry: &str, track: Track) -> &[String] {
        self.entries
            .get(entry)
            .unwrap_or(&self.placeholder)
            .track(track)
    }

    pub fn hint_total(&self, entry: &str, track: Track) -> usize {
        self.hints(entry, track).len()
    }

    /// Every known entry key, ordered by the number embedded in the key.
    ///
    /// Keys come from the hint text and both answer keys, so an entry with
    /// answers but no hints still shows up.
    pub fn entries(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .entries
            .keys()
            .chain(self.identity_answers.keys())
            .chain(self.fate_answers.keys())
            .map(String::as_str)
            .collect();
        keys.sort_by_cached_key(|key| entry_sort_key(key));
        keys.dedup();
        keys
    }

    /// Whether `entry` has hints or answers.
    pub fn contains(&self, entry: &str) -> bool {
        self.entries.contains_key(entry)
            || self.identity_answers.contains_key(entry)
            || self.fate_answers.contains_key(entry)
    }

    pub fn crew_member(&self, id: CrewId) -> Option<&CrewMember> {
        self.crew.get(&id)
    }

    /// The roster, ordered by id.
    pub fn crew(&self) -> impl Iterator<Item = &CrewMember> {
        self.crew.values()
    }

    pub fn cause(&self, id: CauseId) -> Option<&FateCause> {
        self.causes.iter().find(|c| c.id == id)
    }

    pub fn cause_by_label(&self, label: &str) -> Option<&FateCause> {
        self.causes.iter().find(|c| c.label == label)
    }

    /// The taxonomy in file order.
    pub fn causes(&self) -> &[FateCause] {
        &self.causes
    }

    pub fn identity_answer(&self, entry: &str) -> Option<CrewId> {
        self.identity_answers.get(entry).copied()
    }

    /// Acceptable fate answers, empty when the entry has none.
    pub fn fate_answers(&self, entry: &str) -> &[FateSolution] {
        self.fate_answers
            .get(entry)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------------
    // Labels
    // ------------------------------------------------------------------------

    /// Label for an identity guess; `"Unknown"` when absent or off-roster.
    pub fn crew_label(&self, id: Option<CrewId>) -> String {
        id.and_then(|id| self.crew_member(id))
            .map(CrewMember::label)
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn offender_label(&self, offender: Offender) -> String {
        match offender {
            Offender::Crew(id) => self.crew_label(Some(id)),
            Offender::HostileForce => "Hostile force".to_string(),
            Offender::Beast => "Beast".to_string(),
        }
    }

    /// Cause label plus weapon when the cause carries one.
    pub fn fate_label(&self, guess: &FateGuess) -> String {
        let cause = guess.cause_id.unwrap_or(CauseId::UNKNOWN);
        let Some(cause) = self.cause(cause) else {
            return "Unknown".to_string();
        };

        match (&guess.weapon, cause.has_weapon) {
            (Some(weapon), true) => format!("{}, {weapon}", cause.label),
            _ => cause.label.clone(),
        }
    }
}

/// Digits in the key as a number; keys without digits sort last.
fn entry_sort_key(key: &str) -> (bool, u64, String) {
    let digits: String = key.chars().filter(char::is_ascii_digit).collect();
    match digits.parse::<u64>() {
        Ok(n) => (false, n, key.to_string()),
        Err(_) => (true, 0, key.to_string()),
    }
}
