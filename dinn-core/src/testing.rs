//! Testing utilities for the companion.
//!
//! This module provides tools for integration testing:
//! - `fixture_catalog` with a small, fully known set of reference data
//! - `TestHarness` for scripted scenarios against an in-memory store
//! - Assertion helpers for verifying progress

use crate::catalog::{Catalog, CauseId, CrewId, CrewMember, FateCause, FateSolution, Offender};
use crate::progress::{ProgressRecord, ProgressStore, Track, TrackStatus};
use crate::rules::{Intent, Resolution, RuleError};
use crate::session::Session;

/// Reference data used throughout the tests.
///
/// - `"A"`: three identity hints, answer crew 7; fate "Drowned"
/// - `"B"`: fate "Fell" at the hands of a beast; identity crew 3
/// - `"C"`: fate "Stabbed" with either a sword or a knife; identity crew 5
/// - `"orphan"`: one hint per track and no answers at all
pub fn fixture_catalog() -> Catalog {
    Catalog::empty()
        .with_crew(CrewMember::new(1, "Robert Witterel", "Captain", "England"))
        .with_crew(CrewMember::new(2, "Edward Nichols", "1st Mate", "England"))
        .with_crew(CrewMember::new(3, "Martin Perrott", "2nd Mate", "England"))
        .with_crew(CrewMember::new(4, "John Davies", "3rd Mate", "Wales"))
        .with_crew(CrewMember::new(5, "Alexandre Boutin", "Seaman", "France"))
        .with_crew(CrewMember::new(6, "Thomas Sefton", "Seaman", "England"))
        .with_crew(CrewMember::new(7, "Henry Brennan", "Artist", "Ireland"))
        .with_crew(CrewMember::new(8, "Abigail Hoscut", "Passenger", "England"))
        .with_cause(FateCause::new(1, "Unknown"))
        .with_cause(FateCause::new(2, "Shot").with_weapons(["Gun", "Musket"]).with_offender())
        .with_cause(FateCause::new(3, "Fell").with_offender())
        .with_cause(FateCause::new(4, "Drowned"))
        .with_cause(FateCause::new(5, "Stabbed").with_weapons(["Sword", "Knife"]))
        .with_entry(
            "A",
            [
                "Sketches the deck at dawn.",
                "Keeps a book of ink studies.",
                "Travels with a portfolio case.",
            ],
            ["Found below the waterline.", "Lungs full of seawater."],
        )
        .with_identity_answer("A", 7)
        .with_fate_answers("A", vec![FateSolution::new("Drowned")])
        .with_entry(
            "B",
            ["Stands a watch on the quarterdeck.", "Wears a mate's coat."],
            ["Lies broken at the foot of the mast.", "Claw marks on the rigging."],
        )
        .with_identity_answer("B", 3)
        .with_fate_answers("B", vec![FateSolution::new("Fell").with_offender(Offender::Beast)])
        .with_entry(
            "C",
            ["Speaks French to the topmen."],
            ["A blade wound under the ribs.", "Blood on the forecastle."],
        )
        .with_identity_answer("C", 5)
        .with_fate_answers(
            "C",
            vec![
                FateSolution::new("Stabbed").with_weapon("Sword"),
                FateSolution::new("Stabbed").with_weapon("Knife"),
            ],
        )
        .with_entry("orphan", ["A face nobody recorded."], ["Lost overboard."])
}

/// Test harness for running companion scenarios.
pub struct TestHarness {
    pub session: Session,
}

impl TestHarness {
    /// A harness over the fixture catalog and an empty in-memory store.
    pub fn new() -> Self {
        Self::with_catalog(fixture_catalog())
    }

    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            session: Session::from_parts(catalog, ProgressStore::in_memory()),
        }
    }

    /// Apply an intent, returning the rule outcome.
    pub fn apply(&mut self, entry: &str, intent: Intent) -> Result<Resolution, RuleError> {
        self.session.apply(entry, intent)
    }

    /// Reveal hints on `track` until the cap is reached.
    pub fn exhaust_hints(&mut self, entry: &str, track: Track) -> Resolution {
        let total = self.total(entry, track);
        loop {
            let resolution = self
                .session
                .reveal_next_hint(entry, track)
                .unwrap_or_else(|e| panic!("Could not reveal {track} hint for '{entry}': {e}"));
            if resolution.record.hints_revealed(track) >= total {
                return resolution;
            }
        }
    }

    /// Choose a cause by its label.
    pub fn choose_cause(&mut self, entry: &str, label: &str) -> Result<Resolution, RuleError> {
        let cause_id = self.cause_id(label);
        self.session.set_fate_cause(entry, cause_id)
    }

    pub fn cause_id(&self, label: &str) -> CauseId {
        self.session
            .catalog()
            .cause_by_label(label)
            .map(|cause| cause.id)
            .unwrap_or_else(|| panic!("No cause labelled '{label}' in the catalog"))
    }

    pub fn record(&self, entry: &str) -> ProgressRecord {
        self.session.record(entry)
    }

    pub fn total(&self, entry: &str, track: Track) -> usize {
        self.session.hint_total(entry, track)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert a track is verified with every hint showing.
#[track_caller]
pub fn assert_verified(harness: &TestHarness, entry: &str, track: Track) {
    let record = harness.record(entry);
    assert_eq!(
        record.status(track),
        TrackStatus::Verified,
        "Expected the {track} of '{entry}' to be verified"
    );
    assert_eq!(
        record.hints_revealed(track),
        harness.total(entry, track),
        "Expected every {track} hint of '{entry}' to be showing once verified"
    );
}

/// Assert a track is still pending.
#[track_caller]
pub fn assert_pending(harness: &TestHarness, entry: &str, track: Track) {
    assert_eq!(
        harness.record(entry).status(track),
        TrackStatus::Pending,
        "Expected the {track} of '{entry}' to be pending"
    );
}

/// Assert how many hints are showing on a track.
#[track_caller]
pub fn assert_hints_revealed(harness: &TestHarness, entry: &str, track: Track, expected: usize) {
    let actual = harness.record(entry).hints_revealed(track);
    assert_eq!(
        actual, expected,
        "Expected {expected} {track} hints revealed for '{entry}', got {actual}"
    );
}

/// Assert the current identity guess.
#[track_caller]
pub fn assert_identity_guess(harness: &TestHarness, entry: &str, expected: Option<CrewId>) {
    let actual = harness.record(entry).guessed_identity_id;
    assert_eq!(
        actual, expected,
        "Expected identity guess {expected:?} for '{entry}', got {actual:?}"
    );
}
