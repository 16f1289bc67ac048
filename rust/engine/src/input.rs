//! The boundary between the round engine and whatever is driving it. The
//! engine consumes only decoded semantic actions; raw keystrokes, prompts
//! and re-prompt rendering belong to the front end.

use std::collections::VecDeque;

use crate::cards::Card;
use crate::chips::{ChipColor, ChipStack};
use crate::player::SeatName;
use crate::sidebets::SideBetKind;

/// One step of building a bet, chip by chip.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BetCommand {
    AddChip(ChipColor),
    RemoveChip(ChipColor),
    /// Show the circle as it stands.
    View,
    /// Return every staged chip to the pool and start over.
    Reset,
    /// Lock the bet in (an empty circle sits the seat out this round).
    Finish,
    /// Trade every pool chip of this color up into larger denominations.
    ColorUp(ChipColor),
    /// Trade every pool chip of this color down into smaller denominations.
    BreakDown(ChipColor),
}

/// A playing decision for one hand.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TurnAction {
    Stand,
    Hit,
    Double,
    Split,
    Surrender,
}

impl TurnAction {
    pub fn as_str(self) -> &'static str {
        match self {
            TurnAction::Stand => "stand",
            TurnAction::Hit => "hit",
            TurnAction::Double => "double down",
            TurnAction::Split => "split",
            TurnAction::Surrender => "surrender",
        }
    }
}

impl std::fmt::Display for TurnAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to sit down: the Center position plus optional adjacent seats
/// (the block stays contiguous by construction).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct JoinRequest {
    pub name: String,
    pub center: u8,
    pub take_right: bool,
    pub take_left: bool,
}

impl JoinRequest {
    pub fn single(name: &str, center: u8) -> Self {
        JoinRequest {
            name: name.to_string(),
            center,
            take_right: false,
            take_left: false,
        }
    }
}

/// Supplies decoded player decisions to the state machine. The production
/// implementation reads a terminal; tests replay a script.
pub trait InputProvider {
    /// Next joiner during WAITING, or `None` to start the game.
    fn join_request(&mut self, open_positions: &[u8]) -> Option<JoinRequest>;

    /// Next step of the main-bet loop for `(player, seat)`.
    fn bet_command(&mut self, player: &str, seat: SeatName, circle: ChipStack) -> BetCommand;

    /// Whether the player wants the offered side bet on this seat.
    fn wants_side_bet(&mut self, player: &str, seat: SeatName, kind: SideBetKind) -> bool;

    /// Next step of a side-bet circle loop.
    fn side_bet_command(&mut self, player: &str, kind: SideBetKind, circle: ChipStack)
        -> BetCommand;

    /// One playing decision; `options` lists what the rules allow right now.
    fn turn_action(
        &mut self,
        player: &str,
        seat: SeatName,
        hand: &[Card],
        options: &[TurnAction],
    ) -> TurnAction;

    /// Early-surrender offer before the dealer checks for blackjack.
    fn accept_early_surrender(&mut self, player: &str, seat: SeatName, hand: &[Card]) -> bool;
}

/// Replays queued responses; every queue falls back to a safe default when
/// it runs dry (start the game, finish the bet, stand, decline). Mirrors
/// piping a script into the real front end.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    pub joins: VecDeque<JoinRequest>,
    pub bets: VecDeque<BetCommand>,
    pub side_offers: VecDeque<bool>,
    pub side_bets: VecDeque<BetCommand>,
    pub actions: VecDeque<TurnAction>,
    pub surrenders: VecDeque<bool>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        ScriptedInput::default()
    }

    pub fn join(mut self, request: JoinRequest) -> Self {
        self.joins.push_back(request);
        self
    }

    /// Queues a bet of `n` chips of one color followed by Finish.
    pub fn flat_bet(mut self, color: ChipColor, n: u32) -> Self {
        for _ in 0..n {
            self.bets.push_back(BetCommand::AddChip(color));
        }
        self.bets.push_back(BetCommand::Finish);
        self
    }

    pub fn bet_steps(mut self, steps: &[BetCommand]) -> Self {
        self.bets.extend(steps.iter().copied());
        self
    }

    pub fn decline_side_bet(mut self) -> Self {
        self.side_offers.push_back(false);
        self
    }

    pub fn side_bet(mut self, color: ChipColor, n: u32) -> Self {
        self.side_offers.push_back(true);
        for _ in 0..n {
            self.side_bets.push_back(BetCommand::AddChip(color));
        }
        self.side_bets.push_back(BetCommand::Finish);
        self
    }

    pub fn actions(mut self, actions: &[TurnAction]) -> Self {
        self.actions.extend(actions.iter().copied());
        self
    }

    pub fn surrender_answers(mut self, answers: &[bool]) -> Self {
        self.surrenders.extend(answers.iter().copied());
        self
    }
}

impl InputProvider for ScriptedInput {
    fn join_request(&mut self, _open_positions: &[u8]) -> Option<JoinRequest> {
        self.joins.pop_front()
    }

    fn bet_command(&mut self, _player: &str, _seat: SeatName, _circle: ChipStack) -> BetCommand {
        self.bets.pop_front().unwrap_or(BetCommand::Finish)
    }

    fn wants_side_bet(&mut self, _player: &str, _seat: SeatName, _kind: SideBetKind) -> bool {
        self.side_offers.pop_front().unwrap_or(false)
    }

    fn side_bet_command(
        &mut self,
        _player: &str,
        _kind: SideBetKind,
        _circle: ChipStack,
    ) -> BetCommand {
        self.side_bets.pop_front().unwrap_or(BetCommand::Finish)
    }

    fn turn_action(
        &mut self,
        _player: &str,
        _seat: SeatName,
        _hand: &[Card],
        _options: &[TurnAction],
    ) -> TurnAction {
        self.actions.pop_front().unwrap_or(TurnAction::Stand)
    }

    fn accept_early_surrender(&mut self, _player: &str, _seat: SeatName, _hand: &[Card]) -> bool {
        self.surrenders.pop_front().unwrap_or(false)
    }
}
