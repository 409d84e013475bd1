//! Progress rules with an Intent/Effect pipeline.
//!
//! A caller expresses what the player wants as an [`Intent`]. The
//! [`RulesEngine`] checks it against the catalog and the entry's current
//! progress, mutates the [`ProgressStore`], persists it, and reports what
//! happened as a list of [`Effect`]s alongside the updated record.
//!
//! The rules are split by concern:
//! - `hints`: revealing hints one at a time up to the cap
//! - `guess`: recording tentative identity and fate guesses
//! - `verify`: checking a guess against the answer key
//! - `resolve`: filling in the answer once a track's hints run out

mod guess;
mod hints;
mod resolve;
mod verify;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, CauseId, CrewId, Offender};
use crate::progress::{ProgressRecord, ProgressStore, Track};

/// Something the player wants to do to one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Show the next hint on a track
    RevealHint { track: Track },

    /// Pick the crew member this entry is believed to be
    GuessIdentity { crew_id: CrewId },

    /// Pick the cause of the entry's fate
    ChooseCause { cause_id: CauseId },

    /// Pick the weapon for a cause that has one
    ChooseWeapon { weapon: String },

    /// Pick who was responsible, for a cause that requires it
    ChooseOffender { offender: Offender },

    /// Check the current guess on a track against the answer key
    Verify { track: Track },
}

/// How a track became verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifiedBy {
    /// An explicit guess matched the answer key
    Guess,
    /// All hints were revealed and the answer was filled in
    AutoResolution,
}

/// Why auto-resolution could not fill in an answer.
///
/// These are gaps in the reference data, not faults in the rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum Unresolved {
    #[error("no identity answer is recorded for this entry")]
    MissingIdentityAnswer,

    #[error("no fate answer is recorded for this entry")]
    MissingFateAnswer,

    #[error("fate answer names cause '{0}', which is not in the taxonomy")]
    UnknownCauseLabel(String),
}

/// A state change produced by resolving an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    HintRevealed {
        track: Track,
        revealed: usize,
        total: usize,
    },

    /// Every hint was already showing; nothing changed
    HintsExhausted { track: Track },

    IdentityGuessed { crew_id: CrewId },

    CauseChosen {
        cause_id: CauseId,
        needs_weapon: bool,
        needs_offender: bool,
    },

    WeaponChosen { weapon: String },

    OffenderChosen { offender: Offender },

    Verified { track: Track, by: VerifiedBy },

    /// The guess did not match and has been cleared
    Mismatch { track: Track },

    /// There was no complete guess to check; nothing changed
    VerificationSkipped { track: Track },

    /// The answer key has nothing for this entry; the guess is kept
    NoAnswerKey { track: Track },

    /// Hints ran out but the answer key could not supply an answer
    AutoResolutionFailed { track: Track, reason: Unresolved },

    /// Reconciliation pulled a hint counter back within the hint total
    HintsClamped { track: Track, revealed: usize },

    ProgressCleared { discarded: usize },
}

/// The outcome of an intent: the entry's record afterwards and what changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub entry: String,
    pub record: ProgressRecord,
    pub effects: Vec<Effect>,
}

impl Resolution {
    fn new(entry: &str, record: ProgressRecord, effects: Vec<Effect>) -> Self {
        Self {
            entry: entry.to_string(),
            record,
            effects,
        }
    }

    /// Whether this resolution verified any track.
    pub fn is_verified(&self) -> bool {
        self.effects
            .iter()
            .any(|e| matches!(e, Effect::Verified { .. }))
    }

    /// Whether a checked guess turned out wrong.
    pub fn is_mismatch(&self) -> bool {
        self.effects
            .iter()
            .any(|e| matches!(e, Effect::Mismatch { .. }))
    }

    pub fn was_skipped(&self) -> bool {
        self.effects
            .iter()
            .any(|e| {
                matches!(
                    e,
                    Effect::VerificationSkipped { .. } | Effect::NoAnswerKey { .. }
                )
            })
    }
}

/// Contract violations. State is left untouched when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("the {track} of '{entry}' is already verified")]
    TrackVerified { entry: String, track: Track },

    #[error("cause {0} is not in the taxonomy")]
    UnknownCause(CauseId),

    #[error("crew member {0} is not on the roster")]
    UnknownCrew(CrewId),

    #[error("no cause has been chosen yet")]
    NoCauseChosen,

    #[error("cause '{cause}' does not take a weapon")]
    WeaponNotApplicable { cause: String },

    #[error("'{weapon}' is not a weapon for cause '{cause}'")]
    WeaponNotListed { cause: String, weapon: String },

    #[error("cause '{cause}' does not take an offender")]
    OffenderNotApplicable { cause: String },
}

/// Applies intents to progress using the reference catalog.
pub struct RulesEngine<'c> {
    catalog: &'c Catalog,
}

impl<'c> RulesEngine<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    /// Resolve an intent against one entry.
    pub fn resolve(
        &self,
        store: &mut ProgressStore,
        entry: &str,
        intent: Intent,
    ) -> Result<Resolution, RuleError> {
        match intent {
            Intent::RevealHint { track } => self.reveal_next_hint(store, entry, track),
            Intent::GuessIdentity { crew_id } => self.set_identity_guess(store, entry, crew_id),
            Intent::ChooseCause { cause_id } => self.set_fate_cause(store, entry, cause_id),
            Intent::ChooseWeapon { weapon } => self.set_fate_weapon(store, entry, weapon),
            Intent::ChooseOffender { offender } => self.set_fate_offender(store, entry, offender),
            Intent::Verify { track: Track::Identity } => self.verify_identity(store, entry),
            Intent::Verify { track: Track::Fate } => self.verify_fate(store, entry),
        }
    }

    /// Discard every record and persist the empty collection.
    pub fn reset_all(&self, store: &mut ProgressStore) -> Effect {
        let discarded = store.clear();
        store.persist();
        tracing::info!(discarded, "Cleared all progress");
        Effect::ProgressCleared { discarded }
    }

    /// Access an entry, creating its record and reconciling it with the catalog.
    ///
    /// Counters beyond the hint total are pulled back, a verified track is
    /// shown in full, and a pending track whose hints are all showing is
    /// auto-resolved. The store is persisted only if something changed.
    pub fn open(&self, store: &mut ProgressStore, entry: &str) -> Resolution {
        let created = store.get(entry).is_none();
        let record = store.entry_mut(entry);
        let before = record.clone();
        let mut effects = Vec::new();

        for track in Track::all() {
            let total = self.catalog.hint_total(entry, track);
            let revealed = record.hints_revealed(track);

            if revealed > total {
                record.set_hints_revealed(track, total);
                effects.push(Effect::HintsClamped {
                    track,
                    revealed: total,
                });
            }

            if record.is_verified(track) {
                record.set_hints_revealed(track, total);
            } else if record.hints_revealed(track) >= total {
                effects.push(self.auto_resolve(record, entry, track));
            }
        }

        let changed = *record != before;
        let record = record.clone();
        if changed {
            store.persist();
        } else if created {
            tracing::debug!("Created progress record for '{entry}'");
        }

        Resolution::new(entry, record, effects)
    }

    /// Reject any mutation of a track that is already verified.
    fn ensure_pending(
        &self,
        entry: &str,
        record: &ProgressRecord,
        track: Track,
    ) -> Result<(), RuleError> {
        if record.is_verified(track) {
            return Err(RuleError::TrackVerified {
                entry: entry.to_string(),
                track,
            });
        }
        Ok(())
    }

    /// Persist the store and snapshot the entry's record.
    fn commit(&self, store: &ProgressStore, entry: &str, effects: Vec<Effect>) -> Resolution {
        store.persist();
        Resolution::new(entry, store.snapshot(entry), effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::TrackStatus;
    use crate::testing::fixture_catalog;

    #[test]
    fn test_resolve_dispatches_intents() {
        let catalog = fixture_catalog();
        let rules = RulesEngine::new(&catalog);
        let mut store = ProgressStore::in_memory();

        let resolution = rules
            .resolve(&mut store, "A", Intent::GuessIdentity { crew_id: CrewId(7) })
            .unwrap();
        assert_eq!(resolution.record.guessed_identity_id, Some(CrewId(7)));

        let resolution = rules
            .resolve(&mut store, "A", Intent::Verify { track: Track::Identity })
            .unwrap();
        assert!(resolution.is_verified());
        assert_eq!(resolution.entry, "A");
    }

    #[test]
    fn test_reset_all_discards_everything() {
        let catalog = fixture_catalog();
        let rules = RulesEngine::new(&catalog);
        let mut store = ProgressStore::in_memory();

        rules.reveal_next_hint(&mut store, "A", Track::Identity).unwrap();
        rules.reveal_next_hint(&mut store, "B", Track::Fate).unwrap();

        let effect = rules.reset_all(&mut store);

        assert_eq!(effect, Effect::ProgressCleared { discarded: 2 });
        assert!(store.is_empty());
        assert_eq!(store.snapshot("A"), ProgressRecord::default());
    }

    #[test]
    fn test_open_creates_record() {
        let catalog = fixture_catalog();
        let rules = RulesEngine::new(&catalog);
        let mut store = ProgressStore::in_memory();

        let resolution = rules.open(&mut store, "A");

        assert!(resolution.effects.is_empty());
        assert_eq!(resolution.record, ProgressRecord::default());
        assert!(store.get("A").is_some());
    }

    #[test]
    fn test_open_clamps_and_auto_resolves_exhausted_track() {
        let catalog = fixture_catalog();
        let rules = RulesEngine::new(&catalog);
        let mut store = ProgressStore::in_memory();
        store.insert(
            "A",
            ProgressRecord {
                identity_hints_revealed: 9,
                ..ProgressRecord::default()
            },
        );

        let resolution = rules.open(&mut store, "A");

        assert_eq!(resolution.record.identity_hints_revealed, 3);
        assert_eq!(resolution.record.identity_status, TrackStatus::Verified);
        assert_eq!(resolution.record.guessed_identity_id, Some(CrewId(7)));
        assert!(resolution.effects.contains(&Effect::HintsClamped {
            track: Track::Identity,
            revealed: 3
        }));
        assert!(resolution.effects.contains(&Effect::Verified {
            track: Track::Identity,
            by: VerifiedBy::AutoResolution
        }));
    }

    #[test]
    fn test_open_fills_hints_of_verified_track() {
        let catalog = fixture_catalog();
        let rules = RulesEngine::new(&catalog);
        let mut store = ProgressStore::in_memory();
        store.insert(
            "B",
            ProgressRecord {
                fate_status: TrackStatus::Verified,
                fate_hints_revealed: 0,
                ..ProgressRecord::default()
            },
        );

        let resolution = rules.open(&mut store, "B");

        assert_eq!(
            resolution.record.fate_hints_revealed,
            catalog.hint_total("B", Track::Fate)
        );
    }
}
