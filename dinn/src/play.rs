//! Interactive mode.
//!
//! A simple line-oriented protocol:
//! - Lines starting with `#` are commands (`#hint A identity`, `#reset`, `#quit`)
//! - Any other line is an entry to open and show

use anyhow::{Context, Result};
use clap::Parser;
use dinn_core::Session;
use std::io::{BufRead, Write};

use crate::commands::{self, Command};

/// A `#` command line, parsed with the same grammar as the subcommands.
#[derive(Debug, Parser)]
#[command(
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct PlayLine {
    #[command(subcommand)]
    command: Command,
}

const HELP: &str = "\
Commands:
  #list                         - List every entry
  #show <entry>                 - Show an entry's hints and guesses
  #crew                         - List the crew roster
  #causes                       - List the fate causes
  #hint <entry> <track>         - Reveal the next identity or fate hint
  #guess <entry> <crew-id>      - Guess who the entry is
  #cause <entry> <cause-id>     - Choose the cause of the fate
  #weapon <entry> <weapon>      - Choose the weapon
  #offender <entry> <who>       - Choose the offender (crew id, hostile, beast)
  #check <entry> <track>        - Check a guess
  #reset                        - Discard all progress (asks first)
  #help                         - Show this help
  #quit                         - Exit
Any other line opens the entry with that name.";

/// Run the interactive loop until `#quit` or end of input.
pub fn run<R: BufRead, W: Write>(session: &mut Session, input: &mut R, out: &mut W) -> Result<()> {
    let summary = session.summary();
    writeln!(out, "=== dinn interactive mode ===")?;
    writeln!(
        out,
        "{} entries, {} identities and {} fates verified",
        summary.entries, summary.identities_verified, summary.fates_verified
    )?;
    if let Some(path) = session.progress_path() {
        writeln!(out, "Progress: {}", path.display())?;
    }
    writeln!(out)?;
    writeln!(out, "{HELP}")?;
    writeln!(out)?;

    let mut buf = String::new();
    loop {
        buf.clear();
        let read = input.read_line(&mut buf).context("Failed to read input")?;
        if read == 0 {
            break;
        }

        let line = buf.trim();
        if line.is_empty() {
            continue;
        }

        let Some(rest) = line.strip_prefix('#') else {
            let command = Command::Show {
                entry: line.to_string(),
            };
            report(commands::run(session, command, input, out), out)?;
            continue;
        };

        let words: Vec<&str> = rest.split_whitespace().collect();
        match words.first().copied() {
            Some("quit") | Some("exit") => {
                writeln!(out, "Goodbye!")?;
                break;
            }
            Some("help") => writeln!(out, "{HELP}")?,
            Some(_) => match PlayLine::try_parse_from(words.iter().copied()) {
                Ok(PlayLine {
                    command: Command::Play,
                }) => writeln!(out, "[ERROR] Already in interactive mode.")?,
                Ok(PlayLine { command }) => {
                    let command = match command {
                        // Confirmation is part of the interactive flow
                        Command::Reset { .. } => Command::Reset { yes: false },
                        other => other,
                    };
                    report(commands::run(session, command, input, out), out)?;
                }
                Err(e) => {
                    let message = e.to_string();
                    let first = message.lines().next().unwrap_or_default();
                    writeln!(out, "[ERROR] {first} Type #help for help.")?;
                }
            },
            None => writeln!(out, "[ERROR] Unknown command. Type #help for help.")?,
        }
    }

    Ok(())
}

/// Print a failed command instead of ending the session.
fn report<W: Write>(result: Result<()>, out: &mut W) -> Result<()> {
    if let Err(e) = result {
        writeln!(out, "[ERROR] {e:#}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dinn_core::testing::TestHarness;
    use dinn_core::{CrewId, Track, TrackStatus};
    use std::io::Cursor;

    fn play(harness: &mut TestHarness, script: &str) -> String {
        let mut input = Cursor::new(script.as_bytes());
        let mut out = Vec::new();
        run(&mut harness.session, &mut input, &mut out).expect("Session should not fail");
        String::from_utf8(out).expect("Output should be UTF-8")
    }

    #[test]
    fn scripted_identity_session() {
        let mut harness = TestHarness::new();

        let out = play(
            &mut harness,
            "#hint A identity\n#guess A 7\n#check A identity\n#quit\n",
        );

        assert!(out.contains("Revealed identity hint 1/3."));
        assert!(out.contains("Correct! The identity is verified."));
        assert!(out.contains("Goodbye!"));
        assert_eq!(harness.record("A").guessed_identity_id, Some(CrewId(7)));
        assert_eq!(harness.record("A").identity_status, TrackStatus::Verified);
    }

    #[test]
    fn plain_line_opens_entry() {
        let mut harness = TestHarness::new();

        let out = play(&mut harness, "B\n");

        assert!(out.contains("== B =="));
        assert!(harness.session.store().get("B").is_some());
    }

    #[test]
    fn errors_do_not_end_the_session() {
        let mut harness = TestHarness::new();

        let out = play(&mut harness, "#guess A 999\n#frobnicate\n#hint A fate\n");

        assert!(out.contains("[ERROR] crew member 999 is not on the roster"));
        assert!(out.contains("Type #help for help."));
        assert_eq!(harness.record("A").fate_hints_revealed, 1);
    }

    #[test]
    fn reset_always_asks() {
        let mut harness = TestHarness::new();
        harness.exhaust_hints("C", Track::Fate);

        let out = play(&mut harness, "#reset --yes\nno\n#reset\ny\n");

        assert!(out.contains("Reset cancelled."));
        assert!(out.contains("All progress cleared (1 entries discarded)."));
        assert!(harness.session.store().is_empty());
    }

    #[test]
    fn nested_play_is_rejected() {
        let mut harness = TestHarness::new();
        let out = play(&mut harness, "#play\n");
        assert!(out.contains("[ERROR] Already in interactive mode."));
    }
}
