//! Hint and deduction companion for identifying faces and their fates.
//!
//! This crate provides:
//! - A read-only reference catalog of hints, crew, causes and answers
//! - A persisted progress store with one record per entry
//! - An Intent/Effect rules engine for hints, guesses and verification
//! - Auto-resolution once a track's hints run out
//!
//! # Quick Start
//!
//! ```no_run
//! use dinn_core::{Session, SessionConfig, Track};
//!
//! let config = SessionConfig::new("data");
//! let mut session = Session::load(&config);
//!
//! let resolution = session.reveal_next_hint("face_1.png", Track::Identity)?;
//! for hint in session.visible_hints("face_1.png", Track::Identity) {
//!     println!("{hint}");
//! }
//! println!("{:?}", resolution.effects);
//! # Ok::<(), dinn_core::RuleError>(())
//! ```

pub mod catalog;
pub mod progress;
pub mod rules;
pub mod session;
pub mod testing;

// Primary public API
pub use catalog::{
    Catalog, CatalogError, CatalogFiles, CauseId, CrewId, CrewMember, FateCause, FateSolution,
    Offender, OffenderError,
};
pub use progress::{
    FateGuess, PersistError, ProgressRecord, ProgressStore, Track, TrackStatus, UnknownTrack,
};
pub use rules::{Effect, Intent, Resolution, RuleError, RulesEngine, Unresolved, VerifiedBy};
pub use session::{Session, SessionConfig, Summary};
pub use testing::TestHarness;
