//! Recording tentative guesses.

use super::{Effect, Resolution, RuleError, RulesEngine};
use crate::catalog::{CauseId, CrewId, FateCause, Offender};
use crate::progress::{FateGuess, ProgressStore, Track};

impl RulesEngine<'_> {
    /// Record which crew member the entry is believed to be.
    pub fn set_identity_guess(
        &self,
        store: &mut ProgressStore,
        entry: &str,
        crew_id: CrewId,
    ) -> Result<Resolution, RuleError> {
        self.ensure_pending(entry, &store.snapshot(entry), Track::Identity)?;
        self.ensure_on_roster(crew_id)?;

        store.entry_mut(entry).guessed_identity_id = Some(crew_id);
        Ok(self.commit(store, entry, vec![Effect::IdentityGuessed { crew_id }]))
    }

    /// Choose the cause of the entry's fate.
    ///
    /// Any previously chosen weapon is cleared since it belonged to the old
    /// cause. The offender is kept.
    pub fn set_fate_cause(
        &self,
        store: &mut ProgressStore,
        entry: &str,
        cause_id: CauseId,
    ) -> Result<Resolution, RuleError> {
        self.ensure_pending(entry, &store.snapshot(entry), Track::Fate)?;
        let cause = self
            .catalog
            .cause(cause_id)
            .ok_or(RuleError::UnknownCause(cause_id))?;

        let guess = &mut store.entry_mut(entry).guessed_fate;
        guess.cause_id = Some(cause_id);
        guess.weapon = None;

        let effect = Effect::CauseChosen {
            cause_id,
            needs_weapon: cause.has_weapon,
            needs_offender: cause.requires_offender && guess.offender_id.is_none(),
        };
        Ok(self.commit(store, entry, vec![effect]))
    }

    /// Choose the weapon for the current cause.
    pub fn set_fate_weapon(
        &self,
        store: &mut ProgressStore,
        entry: &str,
        weapon: impl Into<String>,
    ) -> Result<Resolution, RuleError> {
        let current = store.snapshot(entry);
        self.ensure_pending(entry, &current, Track::Fate)?;
        let cause = self.chosen_cause(&current.guessed_fate)?;
        let weapon = weapon.into();

        if !cause.has_weapon {
            return Err(RuleError::WeaponNotApplicable {
                cause: cause.label.clone(),
            });
        }
        if !cause.weapons.is_empty() && !cause.weapons.contains(&weapon) {
            return Err(RuleError::WeaponNotListed {
                cause: cause.label.clone(),
                weapon,
            });
        }

        store.entry_mut(entry).guessed_fate.weapon = Some(weapon.clone());
        Ok(self.commit(store, entry, vec![Effect::WeaponChosen { weapon }]))
    }

    /// Choose who was responsible, for a cause that requires an offender.
    pub fn set_fate_offender(
        &self,
        store: &mut ProgressStore,
        entry: &str,
        offender: Offender,
    ) -> Result<Resolution, RuleError> {
        let current = store.snapshot(entry);
        self.ensure_pending(entry, &current, Track::Fate)?;
        let cause = self.chosen_cause(&current.guessed_fate)?;

        if !cause.requires_offender {
            return Err(RuleError::OffenderNotApplicable {
                cause: cause.label.clone(),
            });
        }
        if let Some(crew_id) = offender.crew_id() {
            self.ensure_on_roster(crew_id)?;
        }

        store.entry_mut(entry).guessed_fate.offender_id = Some(offender);
        Ok(self.commit(store, entry, vec![Effect::OffenderChosen { offender }]))
    }

    /// Whether the entry's fate guess is complete enough to be checked.
    pub fn is_fate_guess_complete(&self, store: &ProgressStore, entry: &str) -> bool {
        store
            .get(entry)
            .is_some_and(|record| self.fate_guess_complete(&record.guessed_fate))
    }

    /// A guess is complete when it names a real cause other than the unknown
    /// sentinel, plus a weapon and an offender wherever the cause needs them.
    pub(super) fn fate_guess_complete(&self, guess: &FateGuess) -> bool {
        let Some(cause) = guess
            .cause_id
            .filter(|id| !id.is_unknown())
            .and_then(|id| self.catalog.cause(id))
        else {
            return false;
        };

        let weapon_ok = !cause.has_weapon || guess.weapon.is_some();
        let offender_ok = !cause.requires_offender || guess.offender_id.is_some();
        weapon_ok && offender_ok
    }

    fn chosen_cause(&self, guess: &FateGuess) -> Result<&FateCause, RuleError> {
        let cause_id = guess.cause_id.ok_or(RuleError::NoCauseChosen)?;
        self.catalog
            .cause(cause_id)
            .ok_or(RuleError::UnknownCause(cause_id))
    }

    fn ensure_on_roster(&self, crew_id: CrewId) -> Result<(), RuleError> {
        match self.catalog.crew_member(crew_id) {
            Some(_) => Ok(()),
            None => Err(RuleError::UnknownCrew(crew_id)),
        }
    }
}
