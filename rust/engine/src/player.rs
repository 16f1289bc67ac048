use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::chips::{ChipColor, ChipStack, Money};
use crate::errors::TableError;
use crate::hand::HandScore;
use crate::sidebets::SideBetSlot;

/// The up-to-three seats one participant can hold, named from the player's
/// own perspective. A multi-seat player forms a contiguous block of table
/// positions with the Center seat holding the body.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum SeatName {
    Right,
    Center,
    Left,
}

/// Acting order within one player's block: the Right seat sits at the lower
/// table position and acts first.
pub const SEAT_NAMES: [SeatName; 3] = [SeatName::Right, SeatName::Center, SeatName::Left];

impl SeatName {
    pub fn as_str(self) -> &'static str {
        match self {
            SeatName::Right => "right seat",
            SeatName::Center => "center seat",
            SeatName::Left => "left seat",
        }
    }

    fn index(self) -> usize {
        match self {
            SeatName::Right => 0,
            SeatName::Center => 1,
            SeatName::Left => 2,
        }
    }
}

impl std::fmt::Display for SeatName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One hand and the bet riding on it. A seat normally holds a single spot;
/// splitting inserts more.
#[derive(Debug, Clone, Default)]
pub struct HandSpot {
    pub cards: Vec<Card>,
    pub score: Option<HandScore>,
    pub bet: ChipStack,
    pub bet_cents: u64,
    pub doubled: bool,
    pub from_split: bool,
    pub stood: bool,
}

impl HandSpot {
    pub fn new() -> Self {
        HandSpot::default()
    }

    pub fn has_bet(&self) -> bool {
        self.bet_cents > 0 || !self.bet.is_empty()
    }
}

/// Everything riding on one occupied seat, co-located so the hand, its
/// score and its bets cannot drift apart.
#[derive(Debug, Clone)]
pub struct Seat {
    pub position: u8,
    pub hands: Vec<HandSpot>,
    pub side_bets: Vec<SideBetSlot>,
}

impl Seat {
    pub fn new(position: u8) -> Self {
        Seat {
            position,
            hands: vec![HandSpot::new()],
            side_bets: Vec::new(),
        }
    }

    /// Resets the seat to a single empty spot between rounds.
    pub fn clear_round(&mut self) {
        self.hands.clear();
        self.hands.push(HandSpot::new());
        self.side_bets.clear();
    }
}

/// A participant at the table: identity, chip pool, and per-seat state for
/// each seat they hold. The dealer is a `Player` restricted to the Center
/// seat whose hole card is hidden from display (never from scoring).
#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub is_dealer: bool,
    pub cash_cents: u64,
    pub chips: ChipStack,
    pub hole_card_face_down: bool,
    seats: [Option<Seat>; 3],
}

impl Player {
    /// The standard buy-in template: a $500 chip pool of small denominations
    /// plus $100 in cash, seated at `center_position`.
    pub fn from_template(name: &str, center_position: u8) -> Self {
        let chips = ChipStack::of(&[
            (ChipColor::White, 50),
            (ChipColor::Pink, 30),
            (ChipColor::Red, 20),
            (ChipColor::Blue, 15),
            (ChipColor::Green, 5),
        ]);
        let mut player = Player {
            name: name.to_string(),
            is_dealer: false,
            cash_cents: 10_000,
            chips,
            hole_card_face_down: false,
            seats: [None, None, None],
        };
        player.occupy(SeatName::Center, center_position);
        player
    }

    /// The house: a full tray of every denomination, always in the Center
    /// seat at position 8, hole card face down.
    pub fn casino_dealer() -> Self {
        let mut dealer = Player {
            name: "Dealer".to_string(),
            is_dealer: true,
            cash_cents: 1_000_000,
            chips: ChipStack::uniform(1000),
            hole_card_face_down: true,
            seats: [None, None, None],
        };
        dealer.occupy(SeatName::Center, 8);
        dealer
    }

    /// The derived chip-pool balance: the value of the pool itself, not of
    /// chips currently riding in bet circles.
    pub fn balance(&self) -> Money {
        self.chips.value()
    }

    pub fn occupy(&mut self, seat: SeatName, position: u8) {
        self.seats[seat.index()] = Some(Seat::new(position));
    }

    pub fn seat(&self, seat: SeatName) -> Option<&Seat> {
        self.seats[seat.index()].as_ref()
    }

    pub fn seat_mut(&mut self, seat: SeatName) -> Option<&mut Seat> {
        self.seats[seat.index()].as_mut()
    }

    pub fn occupied_position(&self, seat: SeatName) -> Option<u8> {
        self.seats[seat.index()].as_ref().map(|s| s.position)
    }

    /// The seats this player holds, in acting order.
    pub fn occupied_seats(&self) -> Vec<(SeatName, u8)> {
        SEAT_NAMES
            .iter()
            .filter_map(|&sn| self.occupied_position(sn).map(|p| (sn, p)))
            .collect()
    }

    pub fn has_cards_in_play(&self) -> bool {
        SEAT_NAMES.iter().any(|&sn| {
            self.seat(sn)
                .is_some_and(|s| s.hands.iter().any(|h| !h.cards.is_empty()))
        })
    }

    pub fn has_main_bets_in_play(&self) -> bool {
        SEAT_NAMES.iter().any(|&sn| {
            self.seat(sn)
                .is_some_and(|s| s.hands.iter().any(|h| h.has_bet()))
        })
    }

    pub fn has_side_bets_in_play(&self) -> bool {
        SEAT_NAMES
            .iter()
            .any(|&sn| self.seat(sn).is_some_and(|s| !s.side_bets.is_empty()))
    }

    /// Moves one chip from the pool into a main-bet circle. Refuses without
    /// touching anything when the pool has none of that color.
    pub fn stage_main_chip(
        &mut self,
        seat: SeatName,
        hand: usize,
        color: ChipColor,
    ) -> Result<(), TableError> {
        let name = self.name.clone();
        let spot = self.seats[seat.index()]
            .as_mut()
            .and_then(|s| s.hands.get_mut(hand))
            .ok_or(TableError::MissingBet { player: name, seat })?;
        self.chips.move_chip(color, &mut spot.bet)
    }

    /// Takes one chip back out of a main-bet circle.
    pub fn unstage_main_chip(
        &mut self,
        seat: SeatName,
        hand: usize,
        color: ChipColor,
    ) -> Result<(), TableError> {
        let name = self.name.clone();
        let spot = self.seats[seat.index()]
            .as_mut()
            .and_then(|s| s.hands.get_mut(hand))
            .ok_or(TableError::MissingBet { player: name, seat })?;
        spot.bet.move_chip(color, &mut self.chips)
    }

    /// Returns every staged main-bet chip to the pool.
    pub fn reset_main_bet(&mut self, seat: SeatName, hand: usize) {
        if let Some(spot) = self.seats[seat.index()]
            .as_mut()
            .and_then(|s| s.hands.get_mut(hand))
        {
            spot.bet.drain_into(&mut self.chips);
            spot.bet_cents = 0;
        }
    }

    pub fn stage_side_chip(
        &mut self,
        seat: SeatName,
        slot: usize,
        color: ChipColor,
    ) -> Result<(), TableError> {
        let name = self.name.clone();
        let side = self.seats[seat.index()]
            .as_mut()
            .and_then(|s| s.side_bets.get_mut(slot))
            .ok_or(TableError::MissingBet { player: name, seat })?;
        self.chips.move_chip(color, &mut side.bet)
    }

    pub fn unstage_side_chip(
        &mut self,
        seat: SeatName,
        slot: usize,
        color: ChipColor,
    ) -> Result<(), TableError> {
        let name = self.name.clone();
        let side = self.seats[seat.index()]
            .as_mut()
            .and_then(|s| s.side_bets.get_mut(slot))
            .ok_or(TableError::MissingBet { player: name, seat })?;
        side.bet.move_chip(color, &mut self.chips)
    }

    pub fn reset_side_bet(&mut self, seat: SeatName, slot: usize) {
        if let Some(side) = self.seats[seat.index()]
            .as_mut()
            .and_then(|s| s.side_bets.get_mut(slot))
        {
            side.bet.drain_into(&mut self.chips);
            side.amount_cents = 0;
        }
    }
}
