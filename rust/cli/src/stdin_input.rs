//! The production [`InputProvider`]: reads line-based commands from a
//! terminal (or anything `BufRead`), decodes them via [`crate::keys`], and
//! hands the engine nothing but semantic actions.

use std::cell::Cell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use pitboss_engine::cards::Card;
use pitboss_engine::chips::ChipStack;
use pitboss_engine::input::{BetCommand, InputProvider, JoinRequest, TurnAction};
use pitboss_engine::player::SeatName;
use pitboss_engine::sidebets::SideBetKind;

use crate::io_utils::read_line;
use crate::keys::{decode_action_key, decode_bet_key, decode_yes_no, ActionKey, BetKey};

pub struct StdinInput<'r> {
    reader: &'r mut dyn BufRead,
    quit: Rc<Cell<bool>>,
    /// Alternates Reset/Finish once input has dried up, so a half-built bet
    /// circle drains cleanly instead of wedging the betting loop.
    drain_toggle: bool,
}

impl<'r> StdinInput<'r> {
    pub fn new(reader: &'r mut dyn BufRead) -> Self {
        StdinInput {
            reader,
            quit: Rc::new(Cell::new(false)),
            drain_toggle: false,
        }
    }

    /// A shared handle the session loop polls between steps.
    pub fn quit_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.quit)
    }

    fn prompt(&self, text: &str) {
        print!("{}", text);
        let _ = io::stdout().flush();
    }

    fn next_token(&mut self) -> Option<String> {
        match read_line(self.reader) {
            Some(line) => Some(line),
            None => {
                self.quit.set(true);
                None
            }
        }
    }

    fn drain_step(&mut self) -> BetCommand {
        self.drain_toggle = !self.drain_toggle;
        if self.drain_toggle {
            BetCommand::Reset
        } else {
            BetCommand::Finish
        }
    }

    fn bet_loop(&mut self, prompt: &str) -> BetCommand {
        loop {
            if self.quit.get() {
                return self.drain_step();
            }
            self.prompt(prompt);
            let Some(token) = self.next_token() else {
                return self.drain_step();
            };
            match decode_bet_key(&token) {
                BetKey::Command(cmd) => return cmd,
                BetKey::Quit => {
                    self.quit.set(true);
                    return self.drain_step();
                }
                BetKey::Invalid(msg) => println!("{}", msg),
            }
        }
    }

    fn yes_no_loop(&mut self, prompt: &str) -> bool {
        loop {
            if self.quit.get() {
                return false;
            }
            self.prompt(prompt);
            let Some(token) = self.next_token() else {
                return false;
            };
            match decode_yes_no(&token) {
                Some(answer) => return answer,
                None => println!("please answer y or n"),
            }
        }
    }
}

impl InputProvider for StdinInput<'_> {
    fn join_request(&mut self, open_positions: &[u8]) -> Option<JoinRequest> {
        if self.quit.get() {
            return None;
        }
        self.prompt("Player name (blank to start the game): ");
        let name = self.next_token()?;
        if name.is_empty() {
            return None;
        }
        let open: Vec<String> = open_positions.iter().map(|p| p.to_string()).collect();
        loop {
            self.prompt(&format!("Table position for {} (open: {}): ", name, open.join(", ")));
            let Some(token) = self.next_token() else {
                return None;
            };
            match token.parse::<u8>() {
                Ok(position) => return Some(JoinRequest::single(&name, position)),
                Err(_) => println!("enter a table position number"),
            }
        }
    }

    fn bet_command(&mut self, player: &str, seat: SeatName, circle: ChipStack) -> BetCommand {
        let prompt = format!(
            "[{} | {} | circle {}] bet key (1-9 add, shift to remove, v/r/f): ",
            player, seat, circle
        );
        self.bet_loop(&prompt)
    }

    fn wants_side_bet(&mut self, player: &str, seat: SeatName, kind: SideBetKind) -> bool {
        self.yes_no_loop(&format!("{} ({}): play {}? [y/n]: ", player, seat, kind))
    }

    fn side_bet_command(
        &mut self,
        player: &str,
        kind: SideBetKind,
        circle: ChipStack,
    ) -> BetCommand {
        let prompt = format!("[{} | {} | circle {}] bet key: ", player, kind, circle);
        self.bet_loop(&prompt)
    }

    fn turn_action(
        &mut self,
        player: &str,
        seat: SeatName,
        hand: &[Card],
        options: &[TurnAction],
    ) -> TurnAction {
        let keys: Vec<&str> = options.iter().map(|o| o.as_str()).collect();
        let codes: Vec<String> = hand.iter().map(|c| c.code()).collect();
        let prompt = format!(
            "{} ({}) [{}] - action ({}): ",
            player,
            seat,
            codes.join(", "),
            keys.join("/")
        );
        loop {
            if self.quit.get() {
                return TurnAction::Stand;
            }
            self.prompt(&prompt);
            let Some(token) = self.next_token() else {
                return TurnAction::Stand;
            };
            match decode_action_key(&token) {
                ActionKey::Action(action) => return action,
                ActionKey::Quit => {
                    self.quit.set(true);
                    return TurnAction::Stand;
                }
                ActionKey::Invalid(msg) => println!("{}", msg),
            }
        }
    }

    fn accept_early_surrender(&mut self, player: &str, seat: SeatName, hand: &[Card]) -> bool {
        let codes: Vec<String> = hand.iter().map(|c| c.code()).collect();
        self.yes_no_loop(&format!(
            "{} ({}) [{}]: surrender early for half the bet? [y/n]: ",
            player,
            seat,
            codes.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_join_requests_read_name_then_position() {
        let mut reader = Cursor::new(b"Alex\n2\n".to_vec());
        let mut input = StdinInput::new(&mut reader);
        let req = input.join_request(&[1, 2, 3]).unwrap();
        assert_eq!(req.name, "Alex");
        assert_eq!(req.center, 2);
    }

    #[test]
    fn test_blank_name_starts_the_game() {
        let mut reader = Cursor::new(b"\n".to_vec());
        let mut input = StdinInput::new(&mut reader);
        assert!(input.join_request(&[1]).is_none());
    }

    #[test]
    fn test_eof_sets_the_quit_flag_and_drains_bets() {
        let mut reader = Cursor::new(b"".to_vec());
        let mut input = StdinInput::new(&mut reader);
        let quit = input.quit_flag();
        assert!(input.join_request(&[1]).is_none());
        assert!(quit.get());
        // the drain sequence empties and then closes the circle
        assert_eq!(
            input.bet_command("Alex", SeatName::Center, ChipStack::empty()),
            BetCommand::Reset
        );
        assert_eq!(
            input.bet_command("Alex", SeatName::Center, ChipStack::empty()),
            BetCommand::Finish
        );
    }

    #[test]
    fn test_bet_keys_decode_to_commands() {
        let mut reader = Cursor::new(b"3\nf\n".to_vec());
        let mut input = StdinInput::new(&mut reader);
        assert_eq!(
            input.bet_command("Alex", SeatName::Center, ChipStack::empty()),
            BetCommand::AddChip(pitboss_engine::chips::ChipColor::Red)
        );
        assert_eq!(
            input.bet_command("Alex", SeatName::Center, ChipStack::empty()),
            BetCommand::Finish
        );
    }

    #[test]
    fn test_invalid_action_tokens_reprompt_until_valid() {
        let mut reader = Cursor::new(b"x\nhit\n".to_vec());
        let mut input = StdinInput::new(&mut reader);
        let action = input.turn_action("Alex", SeatName::Center, &[], &[TurnAction::Hit]);
        assert_eq!(action, TurnAction::Hit);
    }

    #[test]
    fn test_quit_during_turn_defaults_to_stand() {
        let mut reader = Cursor::new(b"q\n".to_vec());
        let mut input = StdinInput::new(&mut reader);
        let quit = input.quit_flag();
        let action = input.turn_action("Alex", SeatName::Center, &[], &[TurnAction::Stand]);
        assert_eq!(action, TurnAction::Stand);
        assert!(quit.get());
    }
}
