//! QA tests for the hint, guess and verification flow.
//!
//! These tests drive the public API end to end against the fixture catalog:
//! - Exhausting hints and auto-resolution
//! - Identity and fate verification, including multiple acceptable answers
//! - Contract violations on verified tracks
//!
//! Run with: `cargo test -p dinn-core --test qa_scenarios`

use dinn_core::testing::{
    assert_hints_revealed, assert_identity_guess, assert_pending, assert_verified, TestHarness,
};
use dinn_core::{CrewId, Effect, FateGuess, Intent, Offender, RuleError, Track, VerifiedBy};

// =============================================================================
// HINTS AND AUTO-RESOLUTION
// =============================================================================

#[test]
fn test_three_hints_then_auto_resolution() {
    let mut harness = TestHarness::new();

    for expected in 1..=2 {
        harness.session.reveal_next_hint("A", Track::Identity).unwrap();
        assert_hints_revealed(&harness, "A", Track::Identity, expected);
        assert_pending(&harness, "A", Track::Identity);
    }

    let third = harness.session.reveal_next_hint("A", Track::Identity).unwrap();

    assert!(third.effects.contains(&Effect::Verified {
        track: Track::Identity,
        by: VerifiedBy::AutoResolution
    }));
    assert_verified(&harness, "A", Track::Identity);
    assert_identity_guess(&harness, "A", Some(CrewId(7)));
}

#[test]
fn test_counter_never_exceeds_total() {
    let mut harness = TestHarness::new();
    let total = harness.total("orphan", Track::Fate);

    let mut previous = 0;
    for _ in 0..5 {
        let resolution = harness.session.reveal_next_hint("orphan", Track::Fate).unwrap();
        let revealed = resolution.record.fate_hints_revealed;
        assert!(revealed >= previous, "Counter went backwards");
        assert!(revealed <= total, "Counter passed the total");
        previous = revealed;
    }

    // No answer key for "orphan": capped but never verified
    assert_hints_revealed(&harness, "orphan", Track::Fate, total);
    assert_pending(&harness, "orphan", Track::Fate);
}

#[test]
fn test_visible_hints_grow_with_reveals() {
    let mut harness = TestHarness::new();

    assert!(harness.session.visible_hints("B", Track::Fate).is_empty());
    harness.session.reveal_next_hint("B", Track::Fate).unwrap();

    assert_eq!(
        harness.session.visible_hints("B", Track::Fate),
        ["Lies broken at the foot of the mast."]
    );
}

// =============================================================================
// VERIFICATION
// =============================================================================

#[test]
fn test_wrong_then_right_identity() {
    let mut harness = TestHarness::new();

    harness.session.set_identity_guess("C", CrewId(4)).unwrap();
    let miss = harness.session.verify_identity("C").unwrap();
    assert!(miss.is_mismatch());
    assert_identity_guess(&harness, "C", None);
    assert_pending(&harness, "C", Track::Identity);

    harness.session.set_identity_guess("C", CrewId(5)).unwrap();
    let hit = harness.session.verify_identity("C").unwrap();
    assert!(hit.is_verified());
    assert_verified(&harness, "C", Track::Identity);
}

#[test]
fn test_fell_to_a_beast() {
    let mut harness = TestHarness::new();

    harness.choose_cause("B", "Fell").unwrap();
    assert!(!harness.session.is_fate_guess_complete("B"));
    let skipped = harness.session.verify_fate("B").unwrap();
    assert!(skipped.was_skipped());
    assert_pending(&harness, "B", Track::Fate);

    harness.session.set_fate_offender("B", Offender::Beast).unwrap();
    let resolution = harness.session.verify_fate("B").unwrap();

    assert!(resolution.is_verified());
    assert_verified(&harness, "B", Track::Fate);
}

#[test]
fn test_either_weapon_verifies_stabbing() {
    for weapon in ["Sword", "Knife"] {
        let mut harness = TestHarness::new();
        harness.choose_cause("C", "Stabbed").unwrap();
        harness.session.set_fate_weapon("C", weapon).unwrap();

        let resolution = harness.session.verify_fate("C").unwrap();

        assert!(resolution.is_verified(), "{weapon} should verify");
        assert_verified(&harness, "C", Track::Fate);
    }
}

#[test]
fn test_fate_mismatch_clears_whole_guess() {
    let mut harness = TestHarness::new();

    harness.choose_cause("A", "Shot").unwrap();
    harness.session.set_fate_weapon("A", "Gun").unwrap();
    harness
        .session
        .set_fate_offender("A", Offender::Crew(CrewId(1)))
        .unwrap();
    let resolution = harness.session.verify_fate("A").unwrap();

    assert!(resolution.is_mismatch());
    assert_eq!(harness.record("A").guessed_fate, FateGuess::default());
    assert_pending(&harness, "A", Track::Fate);
}

#[test]
fn test_stray_offender_does_not_block_match() {
    let mut harness = TestHarness::new();

    harness.choose_cause("A", "Fell").unwrap();
    harness
        .session
        .set_fate_offender("A", Offender::HostileForce)
        .unwrap();
    harness.choose_cause("A", "Drowned").unwrap();

    let resolution = harness.session.verify_fate("A").unwrap();

    assert!(resolution.is_verified());
    assert_eq!(
        harness.record("A").guessed_fate.offender_id,
        Some(Offender::HostileForce)
    );
}

// =============================================================================
// CONTRACT VIOLATIONS
// =============================================================================

#[test]
fn test_verified_track_rejects_mutation() {
    let mut harness = TestHarness::new();
    harness.exhaust_hints("A", Track::Identity);
    let before = harness.record("A");

    let reveal = harness.apply("A", Intent::RevealHint { track: Track::Identity });
    let guess = harness.apply("A", Intent::GuessIdentity { crew_id: CrewId(1) });

    assert!(matches!(reveal, Err(RuleError::TrackVerified { .. })));
    assert!(matches!(guess, Err(RuleError::TrackVerified { .. })));
    assert_eq!(harness.record("A"), before);

    // The other track is unaffected
    assert!(harness
        .apply("A", Intent::RevealHint { track: Track::Fate })
        .is_ok());
}

#[test]
fn test_reset_returns_everything_to_pending() {
    let mut harness = TestHarness::new();
    harness.exhaust_hints("A", Track::Identity);
    harness.exhaust_hints("C", Track::Fate);

    let effect = harness.session.reset_all();

    assert_eq!(effect, Effect::ProgressCleared { discarded: 2 });
    for entry in ["A", "B", "C"] {
        for track in Track::all() {
            assert_pending(&harness, entry, track);
            assert_hints_revealed(&harness, entry, track, 0);
        }
    }
    assert_eq!(harness.session.summary().identities_verified, 0);
}
