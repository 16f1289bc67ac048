//! Keystroke and keyword decoding. The engine only ever sees the decoded
//! semantic action; everything about keys lives here.
//!
//! Betting keys: digits `1`-`9` add one chip of the matching denomination
//! (1 = White through 9 = Brown), the shifted digits `!@#$%^&*(` remove
//! one, and the letters `v`/`r`/`f` view, reset, or finish the bet. Playing
//! keys: `s`/`h`/`d`/`p`/`u` for stand, hit, double down, split and
//! surrender; full words work everywhere.

use pitboss_engine::chips::ChipColor;
use pitboss_engine::input::{BetCommand, TurnAction};

/// Decoded betting input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BetKey {
    Command(BetCommand),
    Quit,
    Invalid(String),
}

/// Decoded playing input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKey {
    Action(TurnAction),
    Quit,
    Invalid(String),
}

fn removal_digit(symbol: char) -> Option<u8> {
    // shift row above the digits: ! is shift-1 through ( which is shift-9
    match symbol {
        '!' => Some(1),
        '@' => Some(2),
        '#' => Some(3),
        '$' => Some(4),
        '%' => Some(5),
        '^' => Some(6),
        '&' => Some(7),
        '*' => Some(8),
        '(' => Some(9),
        _ => None,
    }
}

pub fn decode_bet_key(token: &str) -> BetKey {
    let lowered = token.to_lowercase();
    if let Some(first) = token.chars().next() {
        if token.chars().count() == 1 {
            if let Some(digit) = first.to_digit(10) {
                if let Some(color) = ChipColor::from_digit(digit as u8) {
                    return BetKey::Command(BetCommand::AddChip(color));
                }
            }
            if let Some(digit) = removal_digit(first) {
                if let Some(color) = ChipColor::from_digit(digit) {
                    return BetKey::Command(BetCommand::RemoveChip(color));
                }
            }
        }
    }
    // chord keys: c3 colors the Red chips up, b4 breaks the Blues down
    if let Some(rest) = lowered.strip_prefix('c') {
        if let Some(color) = rest.parse::<u8>().ok().and_then(ChipColor::from_digit) {
            return BetKey::Command(BetCommand::ColorUp(color));
        }
    }
    if let Some(rest) = lowered.strip_prefix('b') {
        if let Some(color) = rest.parse::<u8>().ok().and_then(ChipColor::from_digit) {
            return BetKey::Command(BetCommand::BreakDown(color));
        }
    }
    match lowered.as_str() {
        "v" | "view" => BetKey::Command(BetCommand::View),
        "r" | "reset" => BetKey::Command(BetCommand::Reset),
        "f" | "finish" | "done" => BetKey::Command(BetCommand::Finish),
        "q" | "quit" => BetKey::Quit,
        _ => BetKey::Invalid(format!(
            "unknown bet key {:?} - use 1-9 to add a chip, shift-1..9 to remove, \
             c/b plus a digit to color up or break down, v/r/f",
            token
        )),
    }
}

pub fn decode_action_key(token: &str) -> ActionKey {
    match token.to_lowercase().as_str() {
        "s" | "stand" => ActionKey::Action(TurnAction::Stand),
        "h" | "hit" => ActionKey::Action(TurnAction::Hit),
        "d" | "double" | "double down" => ActionKey::Action(TurnAction::Double),
        "p" | "split" => ActionKey::Action(TurnAction::Split),
        "u" | "surrender" => ActionKey::Action(TurnAction::Surrender),
        "q" | "quit" => ActionKey::Quit,
        other => ActionKey::Invalid(format!(
            "unknown action {:?} - use s/h/d/p/u or the full word",
            other
        )),
    }
}

/// Yes/no answers for side-bet and surrender offers. `None` means the token
/// was not an answer at all.
pub fn decode_yes_no(token: &str) -> Option<bool> {
    match token.to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" | "" => Some(false),
        _ => None,
    }
}
