//! The round state machine. One [`BlackjackTable`] owns the shoe, the
//! dealer, every seated player, and the injected input/output collaborators;
//! [`BlackjackTable::step`] runs exactly one state handler.

use std::io::Write;

use crate::cards::{Card, Rank};
use crate::chips::ChipStack;
use crate::errors::TableError;
use crate::hand::{score, HandScore};
use crate::input::{BetCommand, InputProvider, JoinRequest, TurnAction};
use crate::logger::{RoundLogger, RoundRecord, SeatOutcome};
use crate::player::{Player, SeatName};
use crate::rules::{
    AceResplitRule, DoubleAfterSplit, JoinRule, SurrenderRule, TableRules,
};
use crate::settle;
use crate::shoe::Shoe;
use crate::sidebets::{self, EarlyOutcome, SideBetKind};

/// The round phase. Internally constructed values can never be invalid:
/// every variant is matched exhaustively in [`BlackjackTable::step`], with
/// no catch-all arm for the compiler to hide a missing handler behind.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GameState {
    Waiting,
    Starting,
    Shuffling,
    Betting,
    Dealing,
    PreScoring,
    InitialScoring,
    PlayersPlaying,
    DealerPlaying,
    FinalScoring,
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GameState::Waiting => "WAITING",
            GameState::Starting => "STARTING",
            GameState::Shuffling => "SHUFFLING",
            GameState::Betting => "BETTING",
            GameState::Dealing => "DEALING",
            GameState::PreScoring => "PRE_SCORING",
            GameState::InitialScoring => "INITIAL_SCORING",
            GameState::PlayersPlaying => "PLAYERS_PLAYING",
            GameState::DealerPlaying => "DEALER_PLAYING",
            GameState::FinalScoring => "FINAL_SCORING",
        };
        f.write_str(name)
    }
}

fn fmt_cards(cards: &[Card]) -> String {
    let codes: Vec<String> = cards.iter().map(|c| c.code()).collect();
    format!("[{}]", codes.join(", "))
}

/// A multi-seat blackjack table working through shoes round by round.
pub struct BlackjackTable<'a> {
    rules: TableRules,
    shoe: Shoe,
    dealer: Player,
    players: Vec<Player>,
    /// Table positions 1..=7, mapping to an index into `players`.
    positions: [Option<usize>; 7],
    /// Everyone who has played at this table, now or earlier in the session.
    known_players: Vec<String>,
    /// Seats holding a naturally dealt two-card 21 this round.
    naturals: Vec<(usize, SeatName)>,
    state: GameState,
    round: u64,
    rounds_completed: u64,
    /// Seats staked this round, in acting order (position, player, seat).
    turn_order: Vec<(u8, usize, SeatName)>,
    cursor: usize,
    hand_cursor: usize,
    /// True between a reshuffle and the next deal; NMSE joins hinge on it.
    fresh_shoe: bool,
    outcomes: Vec<SeatOutcome>,
    logger: RoundLogger,
    input: &'a mut dyn InputProvider,
    out: &'a mut dyn Write,
}

impl<'a> BlackjackTable<'a> {
    pub fn new(
        rules: TableRules,
        seed: Option<u64>,
        input: &'a mut dyn InputProvider,
        out: &'a mut dyn Write,
    ) -> Result<Self, TableError> {
        rules.validate()?;
        let shoe = Shoe::new(rules.num_decks, seed)?;
        Ok(BlackjackTable {
            rules,
            shoe,
            dealer: Player::casino_dealer(),
            players: Vec::new(),
            positions: [None; 7],
            known_players: Vec::new(),
            naturals: Vec::new(),
            state: GameState::Waiting,
            round: 0,
            rounds_completed: 0,
            turn_order: Vec::new(),
            cursor: 0,
            hand_cursor: 0,
            fresh_shoe: true,
            outcomes: Vec::new(),
            logger: RoundLogger::disabled(),
            input,
            out,
        })
    }

    pub fn with_logger(mut self, logger: RoundLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn rules(&self) -> &TableRules {
        &self.rules
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    /// Mutable shoe access, used by scenario tests to stack the next deals.
    pub fn shoe_mut(&mut self) -> &mut Shoe {
        &mut self.shoe
    }

    pub fn dealer(&self) -> &Player {
        &self.dealer
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn known_players(&self) -> &[String] {
        &self.known_players
    }

    pub fn rounds_completed(&self) -> u64 {
        self.rounds_completed
    }

    /// Runs one state handler. "Waiting for a player" is a blocking call to
    /// the input provider, so every step runs to completion synchronously.
    pub fn step(&mut self) -> Result<(), TableError> {
        writeln!(self.out, "Current state: {}", self.state)?;
        match self.state {
            GameState::Waiting => self.wait_for_players(),
            GameState::Starting => self.start_game(),
            GameState::Shuffling => self.shuffle_cut_and_burn(),
            GameState::Betting => self.collect_bets(),
            GameState::Dealing => self.deal(),
            GameState::PreScoring => self.pre_scoring(),
            GameState::InitialScoring => self.initial_scoring(),
            GameState::PlayersPlaying => self.player_plays(),
            GameState::DealerPlaying => self.dealer_plays(),
            GameState::FinalScoring => self.final_scoring(),
        }
    }

    /// Steps until the current round has been fully settled.
    pub fn play_round(&mut self) -> Result<(), TableError> {
        let target = self.rounds_completed + 1;
        while self.rounds_completed < target {
            self.step()?;
        }
        Ok(())
    }

    fn transition(&mut self, next: GameState) {
        self.state = next;
    }

    // ------------------------------------------------------------------
    // WAITING / STARTING
    // ------------------------------------------------------------------

    fn open_positions(&self) -> Vec<u8> {
        (1..=7u8)
            .filter(|&p| self.positions[p as usize - 1].is_none())
            .collect()
    }

    /// Seats one joiner. The whole request is validated before anything is
    /// assigned, so a rejected request leaves the table unchanged.
    fn seat_join(&mut self, req: JoinRequest) -> Result<(), TableError> {
        let mut wanted = vec![(SeatName::Center, req.center)];
        if req.take_right {
            wanted.push((
                SeatName::Right,
                req.center
                    .checked_sub(1)
                    .ok_or(TableError::InvalidSeatPosition { position: 0 })?,
            ));
        }
        if req.take_left {
            wanted.push((SeatName::Left, req.center + 1));
        }
        for &(_, pos) in &wanted {
            if !(1..=7).contains(&pos) {
                return Err(TableError::InvalidSeatPosition { position: pos });
            }
            if self.positions[pos as usize - 1].is_some() {
                return Err(TableError::SeatTaken { position: pos });
            }
        }
        let mut player = Player::from_template(&req.name, req.center);
        for &(sn, pos) in &wanted {
            if sn != SeatName::Center {
                player.occupy(sn, pos);
            }
        }
        let idx = self.players.len();
        self.players.push(player);
        for &(sn, pos) in &wanted {
            self.positions[pos as usize - 1] = Some(idx);
            writeln!(
                self.out,
                "{} takes table position {} ({})",
                req.name, pos, sn
            )?;
        }
        Ok(())
    }

    /// Joining outside of WAITING. Between rounds only; under NMSE also only
    /// between shoes.
    pub fn try_join(&mut self, req: JoinRequest) -> Result<(), TableError> {
        match self.state {
            GameState::Waiting => self.seat_join(req),
            GameState::Betting => {
                if self.rules.join_rule == JoinRule::NoMidShoeEntry && !self.fresh_shoe {
                    return Err(TableError::JoinRestricted);
                }
                self.seat_join(req)
            }
            _ => Err(TableError::JoinRestricted),
        }
    }

    fn wait_for_players(&mut self) -> Result<(), TableError> {
        writeln!(self.out, "Waiting for players to join...")?;
        loop {
            let open = self.open_positions();
            if open.is_empty() {
                writeln!(self.out, "All table positions are taken.")?;
                break;
            }
            match self.input.join_request(&open) {
                Some(req) => {
                    if let Err(e) = self.seat_join(req) {
                        writeln!(self.out, "error: {}", e)?;
                    }
                }
                None => break,
            }
        }
        if self.players.is_empty() {
            return Err(TableError::NoPlayers);
        }
        self.transition(GameState::Starting);
        Ok(())
    }

    fn start_game(&mut self) -> Result<(), TableError> {
        writeln!(self.out, "STARTING GAME WITH THE FOLLOWING PLAYERS:")?;
        for pos in 1..=7u8 {
            if let Some(idx) = self.positions[pos as usize - 1] {
                writeln!(
                    self.out,
                    "{} at table position {}",
                    self.players[idx].name, pos
                )?;
            }
        }
        for player in &self.players {
            if !self.known_players.contains(&player.name) {
                self.known_players.push(player.name.clone());
            }
        }
        self.naturals.clear();
        self.transition(GameState::Shuffling);
        Ok(())
    }

    // ------------------------------------------------------------------
    // SHUFFLING
    // ------------------------------------------------------------------

    fn shuffle_cut_and_burn(&mut self) -> Result<(), TableError> {
        let pen = self.shoe.shuffle_cut_and_burn(self.rules.pen_override)?;
        writeln!(
            self.out,
            "Shuffled {} deck(s), cut at {}% penetration, top card burned.",
            self.rules.num_decks, pen
        )?;
        self.fresh_shoe = true;
        self.transition(GameState::Betting);
        Ok(())
    }

    // ------------------------------------------------------------------
    // BETTING
    // ------------------------------------------------------------------

    /// Every occupied seat in acting order: ascending table position, each
    /// player's Right seat before Center before Left.
    fn position_order(&self) -> Vec<(u8, usize, SeatName)> {
        let mut order = Vec::new();
        for pos in 1..=7u8 {
            if let Some(idx) = self.positions[pos as usize - 1] {
                for (sn, seat_pos) in self.players[idx].occupied_seats() {
                    if seat_pos == pos {
                        order.push((pos, idx, sn));
                    }
                }
            }
        }
        order
    }

    fn collect_bets(&mut self) -> Result<(), TableError> {
        let order = self.position_order();
        for (_, idx, sn) in order {
            self.run_main_bet_loop(idx, sn)?;
            let staked = self.players[idx]
                .seat(sn)
                .map(|s| s.hands[0].bet_cents > 0)
                .unwrap_or(false);
            if staked {
                self.run_side_bet_loops(idx, sn)?;
            }
        }
        let any_staked = self
            .position_order()
            .iter()
            .any(|&(_, idx, sn)| self.players[idx].seat(sn).is_some_and(|s| s.hands[0].bet_cents > 0));
        if !any_staked {
            writeln!(self.out, "No bets placed; the round is over before it starts.")?;
            self.rounds_completed += 1;
            return Ok(());
        }
        self.transition(GameState::Dealing);
        Ok(())
    }

    fn run_main_bet_loop(&mut self, idx: usize, sn: SeatName) -> Result<(), TableError> {
        let name = self.players[idx].name.clone();
        writeln!(
            self.out,
            "{}, place your {} bet ({} to {}).",
            name,
            sn,
            self.rules.min_bet(),
            self.rules.max_bet()
        )?;
        loop {
            let circle = self.players[idx]
                .seat(sn)
                .map(|s| s.hands[0].bet)
                .unwrap_or_else(ChipStack::empty);
            let cmd = self.input.bet_command(&name, sn, circle);
            match cmd {
                BetCommand::AddChip(color) => {
                    match self.players[idx].stage_main_chip(sn, 0, color) {
                        Ok(()) => writeln!(self.out, "{} adds a {} chip.", name, color)?,
                        Err(e) => writeln!(self.out, "error: {}", e)?,
                    }
                }
                BetCommand::RemoveChip(color) => {
                    match self.players[idx].unstage_main_chip(sn, 0, color) {
                        Ok(()) => writeln!(self.out, "{} takes back a {} chip.", name, color)?,
                        Err(e) => writeln!(self.out, "error: {}", e)?,
                    }
                }
                BetCommand::View => {
                    let circle = self.players[idx]
                        .seat(sn)
                        .map(|s| s.hands[0].bet)
                        .unwrap_or_else(ChipStack::empty);
                    writeln!(self.out, "{} circle: {}", sn, circle)?;
                }
                BetCommand::Reset => {
                    self.players[idx].reset_main_bet(sn, 0);
                    writeln!(self.out, "{} bet reset.", sn)?;
                }
                BetCommand::ColorUp(color) | BetCommand::BreakDown(color) => {
                    self.run_chip_exchange(idx, cmd, color)?;
                }
                BetCommand::Finish => {
                    let empty = self.players[idx]
                        .seat(sn)
                        .map(|s| s.hands[0].bet.is_empty())
                        .unwrap_or(true);
                    if empty {
                        writeln!(self.out, "{} sits out this round ({}).", name, sn)?;
                        break;
                    }
                    match settle::finish_main_bet(&mut self.players[idx], sn, 0, &self.rules) {
                        Ok(amount) => {
                            writeln!(self.out, "{} bets {} on the {}.", name, amount, sn)?;
                            break;
                        }
                        Err(e) => writeln!(self.out, "error: {}", e)?,
                    }
                }
            }
        }
        Ok(())
    }

    /// Color-up and break-down trade pool chips with the dealer's tray
    /// between bets; the pool value never changes.
    fn run_chip_exchange(
        &mut self,
        idx: usize,
        cmd: BetCommand,
        color: crate::chips::ChipColor,
    ) -> Result<(), TableError> {
        let n = self.players[idx].chips.count(color);
        let result = match cmd {
            BetCommand::ColorUp(_) => {
                settle::color_up(&mut self.dealer, &mut self.players[idx], color, n)
            }
            _ => settle::break_down(&mut self.dealer, &mut self.players[idx], color, n),
        };
        let name = self.players[idx].name.clone();
        match result {
            Ok(received) => writeln!(
                self.out,
                "{} trades {} {} chip(s) for {}.",
                name, n, color, received
            )?,
            Err(e) => writeln!(self.out, "error: {}", e)?,
        }
        Ok(())
    }

    fn run_side_bet_loops(&mut self, idx: usize, sn: SeatName) -> Result<(), TableError> {
        let offers = self.rules.side_bets.clone();
        for offer in offers {
            let name = self.players[idx].name.clone();
            if !self.input.wants_side_bet(&name, sn, offer.kind) {
                continue;
            }
            let slot = {
                let seat = self.players[idx]
                    .seat_mut(sn)
                    .expect("seat occupied by acting player");
                seat.side_bets.push(sidebets::SideBetSlot::new(offer.kind));
                seat.side_bets.len() - 1
            };
            loop {
                let circle = self.players[idx]
                    .seat(sn)
                    .map(|s| s.side_bets[slot].bet)
                    .unwrap_or_else(ChipStack::empty);
                let cmd = self.input.side_bet_command(&name, offer.kind, circle);
                match cmd {
                    BetCommand::AddChip(color) => {
                        match self.players[idx].stage_side_chip(sn, slot, color) {
                            Ok(()) => writeln!(self.out, "{} adds a {} chip.", name, color)?,
                            Err(e) => writeln!(self.out, "error: {}", e)?,
                        }
                    }
                    BetCommand::RemoveChip(color) => {
                        match self.players[idx].unstage_side_chip(sn, slot, color) {
                            Ok(()) => writeln!(self.out, "{} takes back a {} chip.", name, color)?,
                            Err(e) => writeln!(self.out, "error: {}", e)?,
                        }
                    }
                    BetCommand::View => {
                        let circle = self.players[idx]
                            .seat(sn)
                            .map(|s| s.side_bets[slot].bet)
                            .unwrap_or_else(ChipStack::empty);
                        writeln!(self.out, "{} circle: {}", offer.kind, circle)?;
                    }
                    BetCommand::Reset => {
                        self.players[idx].reset_side_bet(sn, slot);
                        writeln!(self.out, "{} bet reset.", offer.kind)?;
                    }
                    BetCommand::ColorUp(color) | BetCommand::BreakDown(color) => {
                        self.run_chip_exchange(idx, cmd, color)?;
                    }
                    BetCommand::Finish => {
                        let empty = self.players[idx]
                            .seat(sn)
                            .map(|s| s.side_bets[slot].bet.is_empty())
                            .unwrap_or(true);
                        if empty {
                            self.players[idx]
                                .seat_mut(sn)
                                .expect("seat occupied by acting player")
                                .side_bets
                                .remove(slot);
                            writeln!(self.out, "No {} bet for {}.", offer.kind, name)?;
                            break;
                        }
                        match settle::finish_side_bet(&mut self.players[idx], sn, slot, &offer) {
                            Ok(amount) => {
                                writeln!(
                                    self.out,
                                    "{} bets {} on {}.",
                                    name, amount, offer.kind
                                )?;
                                break;
                            }
                            Err(e) => writeln!(self.out, "error: {}", e)?,
                        }
                    }
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // DEALING
    // ------------------------------------------------------------------

    fn deal(&mut self) -> Result<(), TableError> {
        self.round += 1;
        self.turn_order = self
            .position_order()
            .into_iter()
            .filter(|&(_, idx, sn)| {
                self.players[idx]
                    .seat(sn)
                    .is_some_and(|s| s.hands[0].bet_cents > 0)
            })
            .collect();
        // Two interleaved passes: every staked seat, then the dealer.
        for _ in 0..2 {
            for i in 0..self.turn_order.len() {
                let (_, idx, sn) = self.turn_order[i];
                let card = self.shoe.draw()?;
                self.players[idx]
                    .seat_mut(sn)
                    .expect("staked seat exists")
                    .hands[0]
                    .cards
                    .push(card);
            }
            let card = self.shoe.draw()?;
            self.dealer
                .seat_mut(SeatName::Center)
                .expect("dealer seat")
                .hands[0]
                .cards
                .push(card);
        }
        for i in 0..self.turn_order.len() {
            let (_, idx, sn) = self.turn_order[i];
            let name = self.players[idx].name.clone();
            let cards = self.players[idx].seat(sn).expect("staked seat").hands[0]
                .cards
                .clone();
            writeln!(self.out, "{} ({}) has a hand of {}", name, sn, fmt_cards(&cards))?;
        }
        let up = self.dealer_cards()[0];
        writeln!(self.out, "Dealer shows [{}, ??]", up.code())?;
        writeln!(
            self.out,
            "{}% of the shoe dealt (reshuffling at round end past {}%)",
            self.shoe.percent_dealt(),
            self.shoe.pen().unwrap_or(0)
        )?;
        self.fresh_shoe = false;
        self.cursor = 0;
        self.hand_cursor = 0;
        self.transition(GameState::PreScoring);
        Ok(())
    }

    fn dealer_cards(&self) -> &[Card] {
        &self
            .dealer
            .seat(SeatName::Center)
            .expect("dealer seat")
            .hands[0]
            .cards
    }

    // ------------------------------------------------------------------
    // PRE_SCORING: side bets that need no hole card
    // ------------------------------------------------------------------

    fn pre_scoring(&mut self) -> Result<(), TableError> {
        let dealer_up = self.dealer_cards()[0];
        let order = self.turn_order.clone();
        for (pos, idx, sn) in order {
            let first_two: [Card; 2] = {
                let cards = &self.players[idx].seat(sn).expect("staked seat").hands[0].cards;
                [cards[0], cards[1]]
            };
            let mut slot = 0;
            while slot
                < self.players[idx]
                    .seat(sn)
                    .map(|s| s.side_bets.len())
                    .unwrap_or(0)
            {
                let kind = {
                    let side = &mut self.players[idx]
                        .seat_mut(sn)
                        .expect("staked seat")
                        .side_bets[slot];
                    side.dealt = Some(first_two);
                    side.kind
                };
                match sidebets::resolve_after_deal(kind, first_two, dealer_up) {
                    EarlyOutcome::Paid(tier) => {
                        self.settle_side_win(pos, idx, sn, slot, tier)?;
                    }
                    EarlyOutcome::Lost => {
                        self.settle_side_loss(pos, idx, sn, slot)?;
                    }
                    EarlyOutcome::Deferred => {
                        writeln!(
                            self.out,
                            "{} for {} is still pending.",
                            kind, self.players[idx].name
                        )?;
                        slot += 1;
                    }
                }
            }
        }
        self.transition(GameState::InitialScoring);
        Ok(())
    }

    fn settle_side_win(
        &mut self,
        pos: u8,
        idx: usize,
        sn: SeatName,
        slot: usize,
        tier: sidebets::TierHit,
    ) -> Result<(), TableError> {
        let (kind, amount, dealt) = {
            let side = &self.players[idx].seat(sn).expect("staked seat").side_bets[slot];
            (side.kind, side.amount_cents, side.dealt)
        };
        let payout = amount * tier.multiplier;
        settle::pay_side_win(&mut self.dealer, &mut self.players[idx], sn, slot, payout)?;
        let name = self.players[idx].name.clone();
        self.players[idx]
            .seat_mut(sn)
            .expect("staked seat")
            .side_bets
            .remove(slot);
        writeln!(
            self.out,
            "{} wins {} ({}) paying {}x on {}.",
            name,
            kind,
            tier.tier,
            tier.multiplier,
            crate::chips::Money(amount)
        )?;
        self.outcomes.push(SeatOutcome {
            player: name,
            seat: sn.as_str().to_string(),
            position: pos,
            cards: dealt
                .map(|cs| cs.iter().map(|c| c.code()).collect())
                .unwrap_or_default(),
            score: None,
            outcome: format!("{}: {}", kind, tier.tier),
            bet_cents: amount,
            net_cents: payout as i64,
        });
        Ok(())
    }

    fn settle_side_loss(
        &mut self,
        pos: u8,
        idx: usize,
        sn: SeatName,
        slot: usize,
    ) -> Result<(), TableError> {
        let (kind, amount, dealt) = {
            let side = &self.players[idx].seat(sn).expect("staked seat").side_bets[slot];
            (side.kind, side.amount_cents, side.dealt)
        };
        settle::collect_losing_side_bet(&mut self.dealer, &mut self.players[idx], sn, slot)?;
        let name = self.players[idx].name.clone();
        self.players[idx]
            .seat_mut(sn)
            .expect("staked seat")
            .side_bets
            .remove(slot);
        writeln!(self.out, "{} loses the {} bet.", name, kind)?;
        self.outcomes.push(SeatOutcome {
            player: name,
            seat: sn.as_str().to_string(),
            position: pos,
            cards: dealt
                .map(|cs| cs.iter().map(|c| c.code()).collect())
                .unwrap_or_default(),
            score: None,
            outcome: format!("{}: lost", kind),
            bet_cents: amount,
            net_cents: -(amount as i64),
        });
        Ok(())
    }

    /// Settles the Lucky Ladies / King's Bounty tiers that had to wait for
    /// the dealer-blackjack check.
    fn resolve_deferred_side_bets(&mut self, dealer_blackjack: bool) -> Result<(), TableError> {
        let order = self.turn_order.clone();
        for (pos, idx, sn) in order {
            let mut slot = 0;
            while slot
                < self.players[idx]
                    .seat(sn)
                    .map(|s| s.side_bets.len())
                    .unwrap_or(0)
            {
                let kind = self.players[idx].seat(sn).expect("staked seat").side_bets[slot].kind;
                match kind {
                    SideBetKind::LuckyLadies | SideBetKind::KingsBounty => {
                        let tier = sidebets::resolve_on_dealer_check(kind, dealer_blackjack);
                        self.settle_side_win(pos, idx, sn, slot, tier)?;
                    }
                    _ => slot += 1,
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // INITIAL_SCORING
    // ------------------------------------------------------------------

    fn initial_scoring(&mut self) -> Result<(), TableError> {
        // Score every hand in play and register naturals.
        let order = self.turn_order.clone();
        for &(_, idx, sn) in &order {
            let hand_score = {
                let spot = &mut self.players[idx].seat_mut(sn).expect("staked seat").hands[0];
                let s = score(&spot.cards);
                spot.score = Some(s);
                s
            };
            let name = self.players[idx].name.clone();
            let cards = spot_cards(&self.players[idx], sn);
            writeln!(
                self.out,
                "{} ({}) {} scores {}",
                name,
                sn,
                fmt_cards(&cards),
                hand_score
            )?;
            if hand_score.is_blackjack() {
                self.naturals.push((idx, sn));
            }
        }
        let dealer_score = {
            let spot = &mut self
                .dealer
                .seat_mut(SeatName::Center)
                .expect("dealer seat")
                .hands[0];
            let s = score(&spot.cards);
            spot.score = Some(s);
            s
        };

        // Early surrender, before the hole card is checked.
        let up = self.dealer_cards()[0];
        let es_active = match self.rules.surrender_rule {
            SurrenderRule::ES => true,
            SurrenderRule::ES10 => up.rank.is_ten_value(),
            _ => false,
        };
        if es_active {
            for &(pos, idx, sn) in &order {
                if self.naturals.contains(&(idx, sn)) {
                    continue;
                }
                let (name, cards, bet) = {
                    let spot = &self.players[idx].seat(sn).expect("staked seat").hands[0];
                    (
                        self.players[idx].name.clone(),
                        spot.cards.clone(),
                        spot.bet_cents,
                    )
                };
                if !settle::half_refund_payable(bet) {
                    continue;
                }
                if self.input.accept_early_surrender(&name, sn, &cards) {
                    let lost =
                        settle::surrender_half(&mut self.dealer, &mut self.players[idx], sn, 0)?;
                    writeln!(self.out, "{} surrenders {} early, forfeiting {}.", name, sn, lost)?;
                    let score_str = self.players[idx].seat(sn).expect("staked seat").hands[0]
                        .score
                        .map(|s| s.to_string());
                    self.discard_player_hand(idx, sn, 0);
                    self.outcomes.push(SeatOutcome {
                        player: name,
                        seat: sn.as_str().to_string(),
                        position: pos,
                        cards: cards.iter().map(|c| c.code()).collect(),
                        score: score_str,
                        outcome: "surrender".to_string(),
                        bet_cents: bet,
                        net_cents: -(lost.cents() as i64),
                    });
                }
            }
        }

        // Dealer blackjack check. The peek narration follows the physical
        // procedure: only an ace or ten-value up-card gets a look.
        let dealer_blackjack = dealer_score.is_blackjack();
        if up.rank == Rank::Ace {
            writeln!(self.out, "Dealer's face-up card is an Ace!")?;
        } else if up.rank.is_ten_value() {
            writeln!(self.out, "Dealer's face-up card is a ten!")?;
        }
        if dealer_blackjack {
            let dealer_hand = self.dealer_cards().to_vec();
            writeln!(self.out, "Dealer reveals {} - Blackjack!", fmt_cards(&dealer_hand))?;
            self.resolve_deferred_side_bets(true)?;
            self.settle_dealer_blackjack()?;
            self.end_round()?;
            return Ok(());
        }
        if up.rank == Rank::Ace || up.rank.is_ten_value() {
            writeln!(self.out, "Dealer checks the hole card - no Blackjack.")?;
        } else {
            writeln!(self.out, "Dealer can't have Blackjack.")?;
        }
        self.resolve_deferred_side_bets(false)?;
        self.pay_naturals()?;

        let any_live = self.any_live_hands();
        if !any_live {
            self.end_round()?;
        } else {
            self.cursor = 0;
            self.hand_cursor = 0;
            self.transition(GameState::PlayersPlaying);
        }
        Ok(())
    }

    /// Dealer has a natural: naturals push, every other staked hand loses.
    fn settle_dealer_blackjack(&mut self) -> Result<(), TableError> {
        let order = self.turn_order.clone();
        for (pos, idx, sn) in order {
            let is_natural = self.naturals.contains(&(idx, sn));
            let live = {
                let spot = &self.players[idx].seat(sn).expect("staked seat").hands[0];
                !spot.cards.is_empty() && spot.has_bet()
            };
            if !live {
                continue;
            }
            let (name, cards, score_str, bet) = self.snapshot_hand(idx, sn, 0);
            if is_natural {
                settle::return_bet(&mut self.players[idx], sn, 0)?;
                writeln!(
                    self.out,
                    "Dealer pushes against {} with natural blackjack of {}",
                    name,
                    fmt_cards(&cards)
                )?;
                self.push_outcome(pos, idx, sn, &cards, score_str, "push", bet, 0);
            } else {
                settle::collect_losing_bet(&mut self.dealer, &mut self.players[idx], sn, 0)?;
                writeln!(
                    self.out,
                    "{} loses {} to the Dealer's Blackjack.",
                    name,
                    fmt_cards(&cards)
                )?;
                self.push_outcome(pos, idx, sn, &cards, score_str, "lose", bet, -(bet as i64));
            }
            self.discard_player_hand(idx, sn, 0);
        }
        self.naturals.clear();
        Ok(())
    }

    /// No dealer natural: player blackjacks pay at the configured ratio and
    /// come off the felt immediately.
    fn pay_naturals(&mut self) -> Result<(), TableError> {
        let naturals = self.naturals.clone();
        for (idx, sn) in naturals {
            let pos = self.players[idx]
                .occupied_position(sn)
                .expect("seat occupied by acting player");
            let (name, cards, score_str, bet) = self.snapshot_hand(idx, sn, 0);
            let payout = self.rules.blackjack_ratio.payout_cents(bet);
            settle::pay_main_win(&mut self.dealer, &mut self.players[idx], sn, 0, payout)?;
            writeln!(
                self.out,
                "Paying Blackjack {} to {} with hand of {}",
                self.rules.blackjack_ratio.as_str(),
                name,
                fmt_cards(&cards)
            )?;
            self.push_outcome(
                pos,
                idx,
                sn,
                &cards,
                score_str,
                "blackjack",
                bet,
                payout as i64,
            );
            self.discard_player_hand(idx, sn, 0);
        }
        self.naturals.clear();
        Ok(())
    }

    // ------------------------------------------------------------------
    // PLAYERS_PLAYING: one action per step
    // ------------------------------------------------------------------

    fn advance_to_live_hand(&mut self) -> bool {
        loop {
            if self.cursor >= self.turn_order.len() {
                return false;
            }
            let (_, idx, sn) = self.turn_order[self.cursor];
            let hands_len = self.players[idx]
                .seat(sn)
                .map(|s| s.hands.len())
                .unwrap_or(0);
            if self.hand_cursor >= hands_len {
                self.cursor += 1;
                self.hand_cursor = 0;
                continue;
            }
            let live = {
                let spot = &self.players[idx].seat(sn).expect("staked seat").hands[self.hand_cursor];
                !spot.cards.is_empty() && !spot.stood && spot.has_bet()
            };
            if live {
                return true;
            }
            self.hand_cursor += 1;
        }
    }

    fn available_actions(&self, idx: usize, sn: SeatName, h: usize) -> Vec<TurnAction> {
        let player = &self.players[idx];
        let seat = player.seat(sn).expect("staked seat");
        let spot = &seat.hands[h];
        let mut options = vec![TurnAction::Stand, TurnAction::Hit];
        if spot.cards.len() != 2 || spot.doubled {
            return options;
        }
        let total = spot
            .score
            .and_then(|s| s.points())
            .unwrap_or_else(|| score(&spot.cards).points().unwrap_or(0));
        let can_match_stake = settle::decompose(&player.chips, spot.bet_cents).is_ok();
        let das_ok = !spot.from_split || self.rules.double_after_split == DoubleAfterSplit::DAS;
        if self.rules.doubling_rule.allows_total(total) && das_ok && can_match_stake {
            options.push(TurnAction::Double);
        }
        let pair = spot.cards[0].rank == spot.cards[1].rank;
        let under_cap = seat.hands.len() < self.rules.splitting_rule.max_hands();
        let ace_ok = spot.cards[0].rank != Rank::Ace
            || !(spot.from_split && self.rules.ace_resplit == AceResplitRule::NRSA);
        if pair && under_cap && ace_ok && can_match_stake {
            options.push(TurnAction::Split);
        }
        if self.rules.surrender_rule == SurrenderRule::LS
            && !spot.from_split
            && settle::half_refund_payable(spot.bet_cents)
        {
            options.push(TurnAction::Surrender);
        }
        options
    }

    fn player_plays(&mut self) -> Result<(), TableError> {
        if !self.advance_to_live_hand() {
            self.transition(GameState::DealerPlaying);
            return Ok(());
        }
        let (pos, idx, sn) = self.turn_order[self.cursor];
        let h = self.hand_cursor;
        let options = self.available_actions(idx, sn, h);
        let (name, cards) = {
            let spot = &self.players[idx].seat(sn).expect("staked seat").hands[h];
            (self.players[idx].name.clone(), spot.cards.clone())
        };
        let action = self.input.turn_action(&name, sn, &cards, &options);
        if !options.contains(&action) {
            let err = TableError::UnavailableAction { action };
            let names: Vec<&str> = options.iter().map(|o| o.as_str()).collect();
            writeln!(self.out, "error: {} (valid: {})", err, names.join(", "))?;
            return Ok(());
        }
        writeln!(self.out, "Executing {}'s action '{}'", name, action)?;
        match action {
            TurnAction::Stand => {
                self.players[idx].seat_mut(sn).expect("staked seat").hands[h].stood = true;
                self.hand_cursor += 1;
            }
            TurnAction::Hit => self.apply_hit(pos, idx, sn, h)?,
            TurnAction::Double => self.apply_double(pos, idx, sn, h)?,
            TurnAction::Split => self.apply_split(idx, sn, h)?,
            TurnAction::Surrender => self.apply_surrender(pos, idx, sn, h)?,
        }
        Ok(())
    }

    fn apply_hit(&mut self, pos: u8, idx: usize, sn: SeatName, h: usize) -> Result<(), TableError> {
        let card = self.shoe.draw()?;
        let new_score = {
            let spot = &mut self.players[idx].seat_mut(sn).expect("staked seat").hands[h];
            spot.cards.push(card);
            let s = score(&spot.cards);
            spot.score = Some(s);
            s
        };
        let name = self.players[idx].name.clone();
        let cards = spot_hand_cards(&self.players[idx], sn, h);
        writeln!(
            self.out,
            "{} draws {} - hand {} now scores {}",
            name,
            card.code(),
            fmt_cards(&cards),
            new_score
        )?;
        match new_score {
            HandScore::Bust => {
                let bet = self.players[idx].seat(sn).expect("staked seat").hands[h].bet_cents;
                settle::collect_losing_bet(&mut self.dealer, &mut self.players[idx], sn, h)?;
                writeln!(self.out, "{} busts and loses {}.", name, crate::chips::Money(bet))?;
                self.push_outcome(
                    pos,
                    idx,
                    sn,
                    &cards,
                    Some("Bust".to_string()),
                    "bust",
                    bet,
                    -(bet as i64),
                );
                self.discard_player_hand(idx, sn, h);
                self.hand_cursor += 1;
            }
            HandScore::Value(21) => {
                self.players[idx].seat_mut(sn).expect("staked seat").hands[h].stood = true;
                self.hand_cursor += 1;
            }
            _ => {}
        }
        Ok(())
    }

    fn apply_double(
        &mut self,
        pos: u8,
        idx: usize,
        sn: SeatName,
        h: usize,
    ) -> Result<(), TableError> {
        let doubled_from = settle::double_stake(&mut self.players[idx], sn, h)?;
        let card = self.shoe.draw()?;
        let new_score = {
            let spot = &mut self.players[idx].seat_mut(sn).expect("staked seat").hands[h];
            spot.cards.push(card);
            let s = score(&spot.cards);
            spot.score = Some(s);
            s
        };
        let name = self.players[idx].name.clone();
        let cards = spot_hand_cards(&self.players[idx], sn, h);
        writeln!(
            self.out,
            "{} doubles down for another {} and draws {} - {}",
            name,
            doubled_from,
            card.code(),
            new_score
        )?;
        if new_score.is_bust() {
            let bet = self.players[idx].seat(sn).expect("staked seat").hands[h].bet_cents;
            settle::collect_losing_bet(&mut self.dealer, &mut self.players[idx], sn, h)?;
            writeln!(self.out, "{} busts and loses {}.", name, crate::chips::Money(bet))?;
            self.push_outcome(
                pos,
                idx,
                sn,
                &cards,
                Some("Bust".to_string()),
                "bust",
                bet,
                -(bet as i64),
            );
            self.discard_player_hand(idx, sn, h);
        } else {
            self.players[idx].seat_mut(sn).expect("staked seat").hands[h].stood = true;
        }
        self.hand_cursor += 1;
        Ok(())
    }

    fn apply_split(&mut self, idx: usize, sn: SeatName, h: usize) -> Result<(), TableError> {
        let bet_cents = self.players[idx].seat(sn).expect("staked seat").hands[h].bet_cents;
        let matched = settle::stake_matching(&mut self.players[idx], bet_cents)?;
        let split_aces = {
            let spot = &self.players[idx].seat(sn).expect("staked seat").hands[h];
            spot.cards[0].rank == Rank::Ace
        };
        let card_a = self.shoe.draw()?;
        let card_b = self.shoe.draw()?;
        let name = self.players[idx].name.clone();
        {
            let seat = self.players[idx].seat_mut(sn).expect("staked seat");
            let moved = seat.hands[h].cards.pop().expect("pair has two cards");
            seat.hands[h].from_split = true;
            let mut new_spot = crate::player::HandSpot::new();
            new_spot.cards.push(moved);
            new_spot.bet = matched;
            new_spot.bet_cents = bet_cents;
            new_spot.from_split = true;
            seat.hands.insert(h + 1, new_spot);

            // a two-card 21 on a split hand is a plain 21, never a natural
            let rescore = |cards: &[Card]| match score(cards) {
                HandScore::Blackjack => HandScore::Value(21),
                s => s,
            };
            seat.hands[h].cards.push(card_a);
            let s_a = rescore(&seat.hands[h].cards);
            seat.hands[h].score = Some(s_a);
            seat.hands[h + 1].cards.push(card_b);
            let s_b = rescore(&seat.hands[h + 1].cards);
            seat.hands[h + 1].score = Some(s_b);
            if split_aces {
                // one card on each ace, then both stand
                seat.hands[h].stood = true;
                seat.hands[h + 1].stood = true;
            } else {
                // a split hand that lands on 21 has nothing left to do
                if s_a.points() == Some(21) {
                    seat.hands[h].stood = true;
                }
                if s_b.points() == Some(21) {
                    seat.hands[h + 1].stood = true;
                }
            }
        }
        let first = spot_hand_cards(&self.players[idx], sn, h);
        let second = spot_hand_cards(&self.players[idx], sn, h + 1);
        writeln!(
            self.out,
            "{} splits into {} and {}",
            name,
            fmt_cards(&first),
            fmt_cards(&second)
        )?;
        Ok(())
    }

    fn apply_surrender(
        &mut self,
        pos: u8,
        idx: usize,
        sn: SeatName,
        h: usize,
    ) -> Result<(), TableError> {
        let (name, cards, score_str, bet) = self.snapshot_hand(idx, sn, h);
        let lost = settle::surrender_half(&mut self.dealer, &mut self.players[idx], sn, h)?;
        writeln!(self.out, "{} surrenders, forfeiting {}.", name, lost)?;
        self.push_outcome(
            pos,
            idx,
            sn,
            &cards,
            score_str,
            "surrender",
            bet,
            -(lost.cents() as i64),
        );
        self.discard_player_hand(idx, sn, h);
        self.hand_cursor += 1;
        Ok(())
    }

    // ------------------------------------------------------------------
    // DEALER_PLAYING
    // ------------------------------------------------------------------

    fn dealer_plays(&mut self) -> Result<(), TableError> {
        let hand = self.dealer_cards().to_vec();
        writeln!(self.out, "Dealer reveals {}", fmt_cards(&hand))?;
        writeln!(self.out, "{} rule is in play", self.rules.seventeen_rule.as_str())?;
        loop {
            let current = {
                let spot = &mut self
                    .dealer
                    .seat_mut(SeatName::Center)
                    .expect("dealer seat")
                    .hands[0];
                let s = score(&spot.cards);
                spot.score = Some(s);
                s
            };
            match current.points() {
                None => {
                    writeln!(self.out, "Dealer busts!")?;
                    break;
                }
                Some(points) if self.rules.seventeen_rule.dealer_stands_on(points) => {
                    writeln!(self.out, "Dealer stands with a score of {}", points)?;
                    break;
                }
                Some(_) => {
                    let card = self.shoe.draw()?;
                    self.dealer
                        .seat_mut(SeatName::Center)
                        .expect("dealer seat")
                        .hands[0]
                        .cards
                        .push(card);
                    let hand = self.dealer_cards().to_vec();
                    writeln!(self.out, "Dealer hits and now shows {}", fmt_cards(&hand))?;
                }
            }
        }
        self.transition(GameState::FinalScoring);
        Ok(())
    }

    // ------------------------------------------------------------------
    // FINAL_SCORING
    // ------------------------------------------------------------------

    fn final_scoring(&mut self) -> Result<(), TableError> {
        let dealer_score = self
            .dealer
            .seat(SeatName::Center)
            .expect("dealer seat")
            .hands[0]
            .score
            .expect("dealer hand scored during play");
        let dealer_points = dealer_score.points();
        let order = self.turn_order.clone();
        for (pos, idx, sn) in order {
            let hands_len = self.players[idx]
                .seat(sn)
                .map(|s| s.hands.len())
                .unwrap_or(0);
            for h in 0..hands_len {
                let live = {
                    let spot = &self.players[idx].seat(sn).expect("staked seat").hands[h];
                    !spot.cards.is_empty() && spot.has_bet()
                };
                if !live {
                    continue;
                }
                let (name, cards, score_str, bet) = self.snapshot_hand(idx, sn, h);
                let points = self.players[idx].seat(sn).expect("staked seat").hands[h]
                    .score
                    .and_then(|s| s.points())
                    .unwrap_or(0);
                match dealer_points {
                    None => {
                        settle::pay_main_win(&mut self.dealer, &mut self.players[idx], sn, h, bet)?;
                        writeln!(self.out, "Dealer busted: {} wins {} on {}.", name, crate::chips::Money(bet), sn)?;
                        self.push_outcome(pos, idx, sn, &cards, score_str, "win", bet, bet as i64);
                    }
                    Some(d) if points > d => {
                        settle::pay_main_win(&mut self.dealer, &mut self.players[idx], sn, h, bet)?;
                        writeln!(
                            self.out,
                            "{} beats the dealer {} to {} and wins {}.",
                            name, points, d, crate::chips::Money(bet)
                        )?;
                        self.push_outcome(pos, idx, sn, &cards, score_str, "win", bet, bet as i64);
                    }
                    Some(d) if points == d => {
                        settle::return_bet(&mut self.players[idx], sn, h)?;
                        writeln!(self.out, "Dealer pushes against {} at {}.", name, points)?;
                        self.push_outcome(pos, idx, sn, &cards, score_str, "push", bet, 0);
                    }
                    Some(d) => {
                        settle::collect_losing_bet(&mut self.dealer, &mut self.players[idx], sn, h)?;
                        writeln!(
                            self.out,
                            "{} loses {} to the dealer's {}.",
                            name, points, d
                        )?;
                        self.push_outcome(pos, idx, sn, &cards, score_str, "lose", bet, -(bet as i64));
                    }
                }
                self.discard_player_hand(idx, sn, h);
            }
        }
        self.end_round()?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Round end & cleanup
    // ------------------------------------------------------------------

    /// Settles whatever still rides (Buster Blackjack), logs the round,
    /// returns every card to discard, and decides between another betting
    /// round and a reshuffle.
    fn end_round(&mut self) -> Result<(), TableError> {
        let dealer_hand = self.dealer_cards().to_vec();
        let dealer_score = self
            .dealer
            .seat(SeatName::Center)
            .expect("dealer seat")
            .hands[0]
            .score;
        let dealer_busted = dealer_score.map(|s| s.is_bust()).unwrap_or(false);

        // Buster Blackjack settles against the dealer's final hand; on
        // rounds the dealer never played out, the dealer has not busted.
        let order = self.turn_order.clone();
        for (pos, idx, sn) in order {
            while self.players[idx]
                .seat(sn)
                .map(|s| !s.side_bets.is_empty())
                .unwrap_or(false)
            {
                match sidebets::resolve_after_dealer_play(dealer_hand.len(), dealer_busted) {
                    Some(tier) => self.settle_side_win(pos, idx, sn, 0, tier)?,
                    None => self.settle_side_loss(pos, idx, sn, 0)?,
                }
            }
        }

        // Everything goes to discard and per-round state resets.
        for i in 0..self.players.len() {
            for sn in crate::player::SEAT_NAMES {
                if self.players[i].seat(sn).is_none() {
                    continue;
                }
                let hands_len = self.players[i].seat(sn).map(|s| s.hands.len()).unwrap_or(0);
                for h in 0..hands_len {
                    self.discard_player_hand(i, sn, h);
                }
                self.players[i]
                    .seat_mut(sn)
                    .expect("seat checked above")
                    .clear_round();
            }
        }
        let dealer_cards = {
            let spot = &mut self
                .dealer
                .seat_mut(SeatName::Center)
                .expect("dealer seat")
                .hands[0];
            spot.score = None;
            std::mem::take(&mut spot.cards)
        };
        self.shoe.discard_all(dealer_cards);
        self.naturals.clear();

        let reshuffle = self.shoe.reshuffle_due();
        let record = RoundRecord {
            round: self.round,
            pen: self.shoe.pen(),
            dealer_up: dealer_hand.first().map(|c| c.code()),
            dealer_hand: dealer_hand.iter().map(|c| c.code()).collect(),
            dealer_score: dealer_score.map(|s| s.to_string()),
            seats: std::mem::take(&mut self.outcomes),
            reshuffle,
            ts: None,
        };
        self.logger.write(&record)?;

        self.rounds_completed += 1;
        self.turn_order.clear();
        self.cursor = 0;
        self.hand_cursor = 0;
        writeln!(self.out, "ROUND END")?;
        if reshuffle {
            writeln!(self.out, "SHOE END, reshuffling!")?;
            self.transition(GameState::Shuffling);
        } else {
            self.transition(GameState::Betting);
        }
        Ok(())
    }

    fn any_live_hands(&self) -> bool {
        self.turn_order.iter().any(|&(_, idx, sn)| {
            self.players[idx].seat(sn).is_some_and(|s| {
                s.hands
                    .iter()
                    .any(|spot| !spot.cards.is_empty() && spot.has_bet())
            })
        })
    }

    fn discard_player_hand(&mut self, idx: usize, sn: SeatName, h: usize) {
        let cards = {
            match self.players[idx]
                .seat_mut(sn)
                .and_then(|s| s.hands.get_mut(h))
            {
                Some(spot) => {
                    spot.score = None;
                    std::mem::take(&mut spot.cards)
                }
                None => return,
            }
        };
        self.shoe.discard_all(cards);
    }

    fn snapshot_hand(
        &self,
        idx: usize,
        sn: SeatName,
        h: usize,
    ) -> (String, Vec<Card>, Option<String>, u64) {
        let spot = &self.players[idx].seat(sn).expect("staked seat").hands[h];
        (
            self.players[idx].name.clone(),
            spot.cards.clone(),
            spot.score.map(|s| s.to_string()),
            spot.bet_cents,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn push_outcome(
        &mut self,
        pos: u8,
        idx: usize,
        sn: SeatName,
        cards: &[Card],
        score: Option<String>,
        outcome: &str,
        bet_cents: u64,
        net_cents: i64,
    ) {
        self.outcomes.push(SeatOutcome {
            player: self.players[idx].name.clone(),
            seat: sn.as_str().to_string(),
            position: pos,
            cards: cards.iter().map(|c| c.code()).collect(),
            score,
            outcome: outcome.to_string(),
            bet_cents,
            net_cents,
        });
    }
}

fn spot_cards(player: &Player, sn: SeatName) -> Vec<Card> {
    player
        .seat(sn)
        .map(|s| s.hands[0].cards.clone())
        .unwrap_or_default()
}

fn spot_hand_cards(player: &Player, sn: SeatName, h: usize) -> Vec<Card> {
    player
        .seat(sn)
        .and_then(|s| s.hands.get(h))
        .map(|spot| spot.cards.clone())
        .unwrap_or_default()
}
