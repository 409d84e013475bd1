//! Checking guesses against the answer key.

use super::{Effect, Resolution, RuleError, RulesEngine, VerifiedBy};
use crate::catalog::{FateCause, FateSolution};
use crate::progress::{FateGuess, ProgressStore, Track, TrackStatus};

impl RulesEngine<'_> {
    /// Check the identity guess.
    ///
    /// With no guess nothing happens. A match verifies the track and shows
    /// every hint; a miss clears the guess.
    pub fn verify_identity(
        &self,
        store: &mut ProgressStore,
        entry: &str,
    ) -> Result<Resolution, RuleError> {
        let current = store.snapshot(entry);
        self.ensure_pending(entry, &current, Track::Identity)?;

        let Some(guess) = current.guessed_identity_id else {
            return Ok(self.skip(store, entry, Track::Identity));
        };

        let total = self.catalog.hint_total(entry, Track::Identity);
        let record = store.entry_mut(entry);
        let effect = if self.catalog.identity_answer(entry) == Some(guess) {
            record.identity_status = TrackStatus::Verified;
            record.identity_hints_revealed = total;
            Effect::Verified {
                track: Track::Identity,
                by: VerifiedBy::Guess,
            }
        } else {
            record.guessed_identity_id = None;
            Effect::Mismatch {
                track: Track::Identity,
            }
        };

        Ok(self.commit(store, entry, vec![effect]))
    }

    /// Check the fate guess against every acceptable solution.
    ///
    /// An incomplete guess is not checked, nor is any guess for an entry
    /// the answer key does not cover. A miss clears the whole guess.
    pub fn verify_fate(
        &self,
        store: &mut ProgressStore,
        entry: &str,
    ) -> Result<Resolution, RuleError> {
        let current = store.snapshot(entry);
        self.ensure_pending(entry, &current, Track::Fate)?;

        if !self.fate_guess_complete(&current.guessed_fate) {
            return Ok(self.skip(store, entry, Track::Fate));
        }

        if self.catalog.fate_answers(entry).is_empty() {
            tracing::warn!("No fate answer recorded for '{entry}', guess left unchecked");
            return Ok(Resolution::new(
                entry,
                current,
                vec![Effect::NoAnswerKey { track: Track::Fate }],
            ));
        }

        let matched = current
            .guessed_fate
            .cause_id
            .and_then(|id| self.catalog.cause(id))
            .is_some_and(|cause| {
                self.catalog
                    .fate_answers(entry)
                    .iter()
                    .any(|solution| fate_matches(&current.guessed_fate, cause, solution))
            });

        let total = self.catalog.hint_total(entry, Track::Fate);
        let record = store.entry_mut(entry);
        let effect = if matched {
            record.fate_status = TrackStatus::Verified;
            record.fate_hints_revealed = total;
            Effect::Verified {
                track: Track::Fate,
                by: VerifiedBy::Guess,
            }
        } else {
            record.guessed_fate = FateGuess::default();
            Effect::Mismatch { track: Track::Fate }
        };

        Ok(self.commit(store, entry, vec![effect]))
    }

    /// Nothing to check. No mutation, no write.
    fn skip(&self, store: &ProgressStore, entry: &str, track: Track) -> Resolution {
        tracing::debug!("No complete {track} guess for '{entry}', skipping verification");
        Resolution::new(
            entry,
            store.snapshot(entry),
            vec![Effect::VerificationSkipped { track }],
        )
    }
}

/// Cause label and weapon must be equal, absent matching absent. The
/// offender only counts when the cause requires one.
fn fate_matches(guess: &FateGuess, cause: &FateCause, solution: &FateSolution) -> bool {
    cause.label == solution.cause_label
        && guess.weapon == solution.weapon
        && (!cause.requires_offender || guess.offender_id == solution.offender)
}
