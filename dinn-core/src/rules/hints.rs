//! Revealing hints.

use super::{Effect, Resolution, RuleError, RulesEngine};
use crate::progress::{ProgressStore, Track};

impl<'c> RulesEngine<'c> {
    /// Reveal the next hint on `track`.
    ///
    /// The counter only moves forward and stops at the hint total. Reaching
    /// the total on a pending track triggers auto-resolution. Once at the
    /// cap, further calls change nothing.
    pub fn reveal_next_hint(
        &self,
        store: &mut ProgressStore,
        entry: &str,
        track: Track,
    ) -> Result<Resolution, RuleError> {
        let current = store.snapshot(entry);
        self.ensure_pending(entry, &current, track)?;

        let total = self.catalog.hint_total(entry, track);
        let revealed = current.hints_revealed(track);

        if revealed >= total {
            store.entry_mut(entry);
            return Ok(self.commit(store, entry, vec![Effect::HintsExhausted { track }]));
        }

        let record = store.entry_mut(entry);
        let revealed = revealed + 1;
        record.set_hints_revealed(track, revealed);

        let mut effects = vec![Effect::HintRevealed {
            track,
            revealed,
            total,
        }];
        if revealed == total {
            effects.push(self.auto_resolve(record, entry, track));
        }

        Ok(self.commit(store, entry, effects))
    }

    /// The hints currently showing on `track`, in reveal order.
    pub fn visible_hints(&self, store: &ProgressStore, entry: &str, track: Track) -> &'c [String] {
        let hints = self.catalog.hints(entry, track);
        let revealed = store
            .get(entry)
            .map(|r| r.hints_revealed(track))
            .unwrap_or(0);
        &hints[..revealed.min(hints.len())]
    }
}
