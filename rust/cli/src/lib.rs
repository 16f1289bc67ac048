//! # Pitboss CLI
//!
//! The terminal front end for the pitboss blackjack engine. It owns
//! everything the engine deliberately does not: argument parsing, keystroke
//! decoding, prompts and re-prompts, and session control.
//!
//! ## Main Entry Point
//!
//! The primary entry point is the [`run`] function, which parses
//! command-line arguments and executes the appropriate subcommand.
//!
//! ## Available Subcommands
//!
//! - `play`: run an interactive multi-seat table on this terminal
//! - `preset`: print or save the resolved table-rule preset

use std::io::Write;

use clap::Parser;

pub mod cli;
mod commands;
mod config;
mod error;
pub mod io_utils;
pub mod keys;
pub mod stdin_input;
pub mod ui;

use cli::{Commands, PitbossCli};
use commands::{handle_play_command, handle_preset_command};
pub use error::CliError;

/// Main entry point for the CLI application.
///
/// Parses command-line arguments and dispatches to the appropriate
/// subcommand handler.
///
/// # Arguments
///
/// * `args` - Iterator over command-line arguments (typically `std::env::args()`)
/// * `out` - Output stream for normal output (typically `stdout`)
/// * `err` - Output stream for error messages (typically `stderr`)
///
/// # Returns
///
/// Exit code: `0` for success, `2` for errors.
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
    let parsed = PitbossCli::try_parse_from(&argv);
    match parsed {
        Err(e) => {
            use clap::error::ErrorKind;
            // Help and version print to stdout and exit 0
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    if write!(out, "{}", e).is_err() {
                        return 2;
                    }
                    0
                }
                _ => {
                    if writeln!(err, "{}", e).is_err() {
                        return 2;
                    }
                    2
                }
            }
        }
        Ok(cli) => match cli.cmd {
            Commands::Play {
                rules,
                seed,
                rounds,
                log,
            } => {
                let stdin = std::io::stdin();
                let mut stdin_lock = stdin.lock();
                match handle_play_command(
                    &rules,
                    seed,
                    rounds,
                    log.as_deref(),
                    out,
                    err,
                    &mut stdin_lock,
                ) {
                    Ok(()) => 0,
                    Err(e) => {
                        if writeln!(err, "Error: {}", e).is_err() {
                            return 2;
                        }
                        2
                    }
                }
            }
            Commands::Preset {
                rules,
                format,
                save,
            } => match handle_preset_command(&rules, format, save.as_deref(), out) {
                Ok(()) => 0,
                Err(e) => {
                    if writeln!(err, "Error: {}", e).is_err() {
                        return 2;
                    }
                    2
                }
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_prints_to_stdout_and_exits_zero() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(["pitboss", "--help"], &mut out, &mut err);
        assert_eq!(code, 0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("play"));
        assert!(text.contains("preset"));
    }

    #[test]
    fn test_unknown_commands_exit_two() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(["pitboss", "deal"], &mut out, &mut err);
        assert_eq!(code, 2);
        assert!(!err.is_empty());
    }

    #[test]
    fn test_preset_command_dispatch() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(["pitboss", "preset"], &mut out, &mut err);
        assert_eq!(code, 0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("num_decks"));
    }

    #[test]
    fn test_invalid_preset_flags_exit_two() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(["pitboss", "preset", "--decks", "3"], &mut out, &mut err);
        assert_eq!(code, 2);
        let text = String::from_utf8(err).unwrap();
        assert!(text.contains("invalid deck count"));
    }
}
