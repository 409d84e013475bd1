//! Plain-text views of the session.

use dinn_core::catalog::Catalog;
use dinn_core::{Effect, ProgressRecord, Session, Track, VerifiedBy};

/// One line per entry plus a verification summary.
pub fn entry_list(session: &Session) -> String {
    let entries = session.entries();
    if entries.is_empty() {
        return "No entries found. Check the data directory.".to_string();
    }

    let width = entries.iter().map(|e| e.len()).max().unwrap_or(0);
    let mut lines: Vec<String> = entries
        .iter()
        .map(|&entry| {
            let record = session.record(entry);
            format!(
                "{entry:<width$}  identity: {:<12}  fate: {}",
                track_state(session, entry, &record, Track::Identity),
                track_state(session, entry, &record, Track::Fate),
            )
        })
        .collect();

    let summary = session.summary();
    lines.push(String::new());
    lines.push(format!(
        "Verified: {}/{} identities, {}/{} fates",
        summary.identities_verified, summary.entries, summary.fates_verified, summary.entries
    ));
    lines.join("\n")
}

/// Hints showing on both tracks, with the current guesses.
pub fn entry_detail(session: &Session, entry: &str) -> String {
    let catalog = session.catalog();
    let record = session.record(entry);
    let mut lines = vec![format!("== {entry} ==")];

    for track in Track::all() {
        lines.push(format!(
            "{} [{}]",
            capitalized(track),
            track_state(session, entry, &record, track)
        ));
        for (i, hint) in session.visible_hints(entry, track).iter().enumerate() {
            lines.push(format!("  {}. {hint}", i + 1));
        }
        lines.push(format!("  Guess: {}", guess_label(catalog, &record, track)));
    }

    lines.join("\n")
}

fn track_state(session: &Session, entry: &str, record: &ProgressRecord, track: Track) -> String {
    if record.is_verified(track) {
        return "verified".to_string();
    }
    format!(
        "{}/{} hints",
        record.hints_revealed(track),
        session.hint_total(entry, track)
    )
}

fn guess_label(catalog: &Catalog, record: &ProgressRecord, track: Track) -> String {
    match track {
        Track::Identity => catalog.crew_label(record.guessed_identity_id),
        Track::Fate => {
            let guess = &record.guessed_fate;
            let label = catalog.fate_label(guess);
            let needs_offender = guess
                .cause_id
                .and_then(|id| catalog.cause(id))
                .is_some_and(|cause| cause.requires_offender);
            match guess.offender_id {
                Some(offender) if needs_offender => {
                    format!("{label} by {}", catalog.offender_label(offender))
                }
                _ => label,
            }
        }
    }
}

fn capitalized(track: Track) -> &'static str {
    match track {
        Track::Identity => "Identity",
        Track::Fate => "Fate",
    }
}

/// A sentence describing one effect.
pub fn effect(catalog: &Catalog, effect: &Effect) -> String {
    match effect {
        Effect::HintRevealed {
            track,
            revealed,
            total,
        } => format!("Revealed {track} hint {revealed}/{total}."),
        Effect::HintsExhausted { track } => format!("All {track} hints are already showing."),
        Effect::IdentityGuessed { crew_id } => {
            format!("Identity guess: {}.", catalog.crew_label(Some(*crew_id)))
        }
        Effect::CauseChosen {
            cause_id,
            needs_weapon,
            needs_offender,
        } => {
            let label = catalog
                .cause(*cause_id)
                .map(|c| c.label.as_str())
                .unwrap_or("Unknown");
            let mut line = format!("Cause: {label}.");
            if *needs_weapon {
                line.push_str(" Choose a weapon.");
            }
            if *needs_offender {
                line.push_str(" Choose an offender.");
            }
            line
        }
        Effect::WeaponChosen { weapon } => format!("Weapon: {weapon}."),
        Effect::OffenderChosen { offender } => {
            format!("Offender: {}.", catalog.offender_label(*offender))
        }
        Effect::Verified {
            track,
            by: VerifiedBy::Guess,
        } => format!("Correct! The {track} is verified."),
        Effect::Verified {
            track,
            by: VerifiedBy::AutoResolution,
        } => format!("Every {track} hint is showing. The answer has been filled in."),
        Effect::Mismatch { track } => format!("Incorrect. The {track} guess has been cleared."),
        Effect::VerificationSkipped {
            track: Track::Identity,
        } => "Nothing to check: make an identity guess first.".to_string(),
        Effect::VerificationSkipped { track: Track::Fate } => {
            "Nothing to check: the fate guess is incomplete.".to_string()
        }
        Effect::NoAnswerKey { track } => {
            format!("No {track} answer is recorded for this entry. The guess was not checked.")
        }
        Effect::AutoResolutionFailed { track, reason } => {
            format!("Every {track} hint is showing, but no answer could be filled in: {reason}.")
        }
        Effect::HintsClamped { track, revealed } => {
            format!("The {track} hint count was reduced to {revealed} to match the reference data.")
        }
        Effect::ProgressCleared { discarded } => {
            format!("All progress cleared ({discarded} entries discarded).")
        }
    }
}

/// The crew roster, one member per line.
pub fn crew_list(catalog: &Catalog) -> String {
    let lines: Vec<String> = catalog
        .crew()
        .map(|member| format!("{:>4}  {}, {}", member.id.0, member.label(), member.origin))
        .collect();
    if lines.is_empty() {
        return "The crew roster is empty.".to_string();
    }
    lines.join("\n")
}

/// The fate taxonomy with the extra choices each cause needs.
pub fn cause_list(catalog: &Catalog) -> String {
    let lines: Vec<String> = catalog
        .causes()
        .iter()
        .map(|cause| {
            let mut line = format!("{:>4}  {}", cause.id.0, cause.label);
            if cause.has_weapon {
                if cause.weapons.is_empty() {
                    line.push_str("  (weapon)");
                } else {
                    line.push_str(&format!("  (weapon: {})", cause.weapons.join(", ")));
                }
            }
            if cause.requires_offender {
                line.push_str("  (offender)");
            }
            line
        })
        .collect();
    if lines.is_empty() {
        return "The fate taxonomy is empty.".to_string();
    }
    lines.join("\n")
}
