//! # Play Command
//!
//! Runs an interactive blackjack table on the current terminal. Players
//! join by name and table position, build bets chip by chip with the digit
//! keys, and play their hands with the s/h/d/p/u keys. The session runs
//! until the requested number of rounds has settled or the user quits.

use std::io::{BufRead, Write};

use pitboss_engine::logger::RoundLogger;
use pitboss_engine::table::BlackjackTable;

use crate::cli::RuleArgs;
use crate::config::build_rules;
use crate::error::CliError;
use crate::stdin_input::StdinInput;
use crate::ui;

/// Handle the play command: build and validate the rules, then drive the
/// table one step at a time so a quit takes effect between steps.
pub fn handle_play_command(
    args: &RuleArgs,
    seed: Option<u64>,
    rounds: u64,
    log: Option<&str>,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<(), CliError> {
    if rounds == 0 {
        ui::write_error(err, "rounds must be >= 1")?;
        return Err(CliError::InvalidInput("rounds must be >= 1".to_string()));
    }
    let rules = build_rules(args)?;
    rules.validate()?;
    let seed = seed.unwrap_or_else(rand::random);

    writeln!(
        out,
        "pitboss table: {} deck(s), limits {}-{}, blackjack pays {}, {} | seed={}",
        rules.num_decks,
        rules.min_bet(),
        rules.max_bet(),
        rules.blackjack_ratio.as_str(),
        rules.seventeen_rule.as_str(),
        seed
    )?;

    let mut provider = StdinInput::new(stdin);
    let quit = provider.quit_flag();
    let mut table = BlackjackTable::new(rules, Some(seed), &mut provider, out)?;
    if let Some(path) = log {
        table = table.with_logger(RoundLogger::create(path)?);
    }

    let played = loop {
        if quit.get() || table.rounds_completed() >= rounds {
            break table.rounds_completed();
        }
        if let Err(e) = table.step() {
            // a table that never got players is a clean exit, not a crash
            if matches!(e, pitboss_engine::errors::TableError::NoPlayers) {
                break table.rounds_completed();
            }
            return Err(e.into());
        }
    };
    writeln!(out, "Session over: {} round(s) settled.", played)?;
    Ok(())
}
