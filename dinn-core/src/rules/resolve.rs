//! Auto-resolution: filling in the answer once every hint is showing.

use super::{Effect, RulesEngine, Unresolved, VerifiedBy};
use crate::progress::{FateGuess, ProgressRecord, Track, TrackStatus};

impl RulesEngine<'_> {
    /// Force a track to its answer after its last hint was revealed.
    ///
    /// The counter is always set to the cap. If the answer key cannot supply
    /// an answer the track stays pending with its guess untouched, and the
    /// gap is logged.
    pub(super) fn auto_resolve(
        &self,
        record: &mut ProgressRecord,
        entry: &str,
        track: Track,
    ) -> Effect {
        record.set_hints_revealed(track, self.catalog.hint_total(entry, track));

        let resolved = match track {
            Track::Identity => self.resolve_identity(record, entry),
            Track::Fate => self.resolve_fate(record, entry),
        };

        match resolved {
            Ok(()) => {
                record.set_status(track, TrackStatus::Verified);
                Effect::Verified {
                    track,
                    by: VerifiedBy::AutoResolution,
                }
            }
            Err(reason) => {
                tracing::warn!(
                    "All {track} hints for '{entry}' are revealed but it cannot be resolved: {reason}"
                );
                Effect::AutoResolutionFailed { track, reason }
            }
        }
    }

    fn resolve_identity(&self, record: &mut ProgressRecord, entry: &str) -> Result<(), Unresolved> {
        let answer = self
            .catalog
            .identity_answer(entry)
            .ok_or(Unresolved::MissingIdentityAnswer)?;
        record.guessed_identity_id = Some(answer);
        Ok(())
    }

    /// Fill in the first listed solution when several are acceptable.
    fn resolve_fate(&self, record: &mut ProgressRecord, entry: &str) -> Result<(), Unresolved> {
        let solution = self
            .catalog
            .fate_answers(entry)
            .first()
            .ok_or(Unresolved::MissingFateAnswer)?;
        let cause = self
            .catalog
            .cause_by_label(&solution.cause_label)
            .ok_or_else(|| Unresolved::UnknownCauseLabel(solution.cause_label.clone()))?;

        record.guessed_fate = FateGuess {
            cause_id: Some(cause.id),
            weapon: solution.weapon.clone(),
            offender_id: solution.offender,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CauseId, CrewId, FateCause, FateSolution, Offender};
    use crate::progress::ProgressStore;
    use crate::testing::fixture_catalog;

    #[test]
    fn test_fate_auto_resolution_uses_first_solution() {
        let catalog = fixture_catalog();
        let rules = RulesEngine::new(&catalog);
        let mut store = ProgressStore::in_memory();

        let total = catalog.hint_total("C", Track::Fate);
        let mut last = None;
        for _ in 0..total {
            last = Some(rules.reveal_next_hint(&mut store, "C", Track::Fate).unwrap());
        }
        let record = last.unwrap().record;

        assert_eq!(record.fate_status, TrackStatus::Verified);
        assert_eq!(record.fate_hints_revealed, total);
        let stabbed = catalog.cause_by_label("Stabbed").unwrap();
        assert_eq!(record.guessed_fate.cause_id, Some(stabbed.id));
        assert_eq!(record.guessed_fate.weapon.as_deref(), Some("Sword"));
    }

    #[test]
    fn test_fate_auto_resolution_keeps_offender() {
        let catalog = fixture_catalog();
        let rules = RulesEngine::new(&catalog);
        let mut record = ProgressRecord::default();

        let effect = rules.auto_resolve(&mut record, "B", Track::Fate);

        assert!(matches!(effect, Effect::Verified { .. }));
        assert_eq!(record.guessed_fate.offender_id, Some(Offender::Beast));
        assert!(record.guessed_fate.weapon.is_none());
    }

    #[test]
    fn test_unknown_cause_label_leaves_track_pending() {
        let catalog = Catalog::empty()
            .with_entry("face_1.png", ["who"], ["how"])
            .with_cause(FateCause::new(1, "Unknown"))
            .with_fate_answers("face_1.png", vec![FateSolution::new("Eaten by kraken")]);
        let rules = RulesEngine::new(&catalog);
        let mut record = ProgressRecord::default();
        record.guessed_fate.cause_id = Some(CauseId(1));

        let effect = rules.auto_resolve(&mut record, "face_1.png", Track::Fate);

        assert_eq!(
            effect,
            Effect::AutoResolutionFailed {
                track: Track::Fate,
                reason: Unresolved::UnknownCauseLabel("Eaten by kraken".to_string())
            }
        );
        assert_eq!(record.fate_status, TrackStatus::Pending);
        assert_eq!(record.fate_hints_revealed, 1);
        assert_eq!(record.guessed_fate.cause_id, Some(CauseId(1)));
    }

    #[test]
    fn test_missing_identity_answer_only_advances_counter() {
        let catalog = Catalog::empty().with_entry("face_1.png", ["one", "two"], ["how"]);
        let rules = RulesEngine::new(&catalog);
        let mut record = ProgressRecord {
            guessed_identity_id: Some(CrewId(4)),
            ..ProgressRecord::default()
        };

        let effect = rules.auto_resolve(&mut record, "face_1.png", Track::Identity);

        assert_eq!(
            effect,
            Effect::AutoResolutionFailed {
                track: Track::Identity,
                reason: Unresolved::MissingIdentityAnswer
            }
        );
        assert_eq!(record.identity_hints_revealed, 2);
        assert_eq!(record.identity_status, TrackStatus::Pending);
        assert_eq!(record.guessed_identity_id, Some(CrewId(4)));
    }
}
