//! Subcommands shared by the command line and the interactive mode.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use dinn_core::{CauseId, CrewId, Effect, Intent, Offender, Session, Track};
use std::io::{BufRead, Write};

use crate::{play, render};

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List every entry with its progress
    List,

    /// Show the hints and guesses for an entry
    Show { entry: String },

    /// List the crew roster
    Crew,

    /// List the fate causes
    Causes,

    /// Reveal the next hint on a track (identity or fate)
    Hint { entry: String, track: Track },

    /// Guess which crew member an entry is
    Guess { entry: String, crew_id: u32 },

    /// Choose the cause of an entry's fate
    Cause { entry: String, cause_id: u32 },

    /// Choose the weapon for the current cause
    Weapon {
        entry: String,
        #[arg(required = true)]
        weapon: Vec<String>,
    },

    /// Choose the offender: a crew id, "hostile" or "beast"
    Offender { entry: String, offender: Offender },

    /// Check the guess on a track against the answer key
    Check { entry: String, track: Track },

    /// Discard all progress
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Interactive mode with #-prefixed commands
    Play,
}

/// Run one command, writing its output to `out`.
///
/// `input` is only read for confirmations and by the interactive mode.
pub fn run<R: BufRead, W: Write>(
    session: &mut Session,
    command: Command,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::List => writeln!(out, "{}", render::entry_list(session))?,
        Command::Show { entry } => show(session, &entry, out)?,
        Command::Crew => writeln!(out, "{}", render::crew_list(session.catalog()))?,
        Command::Causes => writeln!(out, "{}", render::cause_list(session.catalog()))?,
        Command::Hint { entry, track } => {
            apply(session, &entry, Intent::RevealHint { track }, out)?
        }
        Command::Guess { entry, crew_id } => apply(
            session,
            &entry,
            Intent::GuessIdentity {
                crew_id: CrewId(crew_id),
            },
            out,
        )?,
        Command::Cause { entry, cause_id } => apply(
            session,
            &entry,
            Intent::ChooseCause {
                cause_id: CauseId(cause_id),
            },
            out,
        )?,
        Command::Weapon { entry, weapon } => apply(
            session,
            &entry,
            Intent::ChooseWeapon {
                weapon: weapon.join(" "),
            },
            out,
        )?,
        Command::Offender { entry, offender } => {
            apply(session, &entry, Intent::ChooseOffender { offender }, out)?
        }
        Command::Check { entry, track } => apply(session, &entry, Intent::Verify { track }, out)?,
        Command::Reset { yes } => reset(session, yes, input, out)?,
        Command::Play => play::run(session, input, out)?,
    }
    Ok(())
}

/// Open an entry and print it.
fn show<W: Write>(session: &mut Session, entry: &str, out: &mut W) -> Result<()> {
    ensure_known(session, entry)?;
    let opened = session.open(entry);
    write_effects(session, &opened.effects, out)?;
    writeln!(out, "{}", render::entry_detail(session, entry))?;
    Ok(())
}

/// Open an entry, apply an intent to it and print the outcome.
fn apply<W: Write>(session: &mut Session, entry: &str, intent: Intent, out: &mut W) -> Result<()> {
    ensure_known(session, entry)?;
    let opened = session.open(entry);
    write_effects(session, &opened.effects, out)?;

    let resolution = session.apply(entry, intent)?;
    write_effects(session, &resolution.effects, out)?;
    writeln!(out, "{}", render::entry_detail(session, entry))?;
    Ok(())
}

fn reset<R: BufRead, W: Write>(
    session: &mut Session,
    yes: bool,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    if !yes && !confirm(input, out, "Discard ALL progress? This cannot be undone. [y/N] ")? {
        writeln!(out, "Reset cancelled.")?;
        return Ok(());
    }

    let effect = session.reset_all();
    writeln!(out, "{}", render::effect(session.catalog(), &effect))?;
    Ok(())
}

/// Ask a yes/no question. Anything but an explicit yes is a no.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> Result<bool> {
    write!(out, "{prompt}")?;
    out.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn ensure_known(session: &Session, entry: &str) -> Result<()> {
    if !session.has_entry(entry) {
        bail!("Unknown entry '{entry}'. Use `list` to see every entry.");
    }
    Ok(())
}

fn write_effects<W: Write>(session: &Session, effects: &[Effect], out: &mut W) -> Result<()> {
    for effect in effects {
        writeln!(out, "{}", render::effect(session.catalog(), effect))?;
    }
    Ok(())
}
