use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::cards::{shoe_of_decks, Card, ShoeCard};
use crate::errors::TableError;

/// Minimum number of cards kept on either side of the player's cut point.
pub const CUT_BUFFER: usize = 15;

/// Penetration-percentage bounds (min inclusive, max exclusive for random
/// draws) keyed by deck count.
pub fn pen_bounds(num_decks: u8) -> Option<(u8, u8)> {
    match num_decks {
        1 => Some((50, 70)),
        2 => Some((55, 75)),
        4 => Some((60, 80)),
        6 => Some((65, 85)),
        8 => Some((70, 90)),
        _ => None,
    }
}

/// The live card stack dealt from, plus its discard tray. The shoe owns the
/// RNG so every shuffle and cut is reproducible from a seed.
#[derive(Debug)]
pub struct Shoe {
    cards: Vec<ShoeCard>,
    discard: Vec<ShoeCard>,
    num_decks: u8,
    pen: Option<u8>,
    rng: ChaCha20Rng,
}

impl Shoe {
    /// Builds an unshuffled shoe of `num_decks` decks. The order stays
    /// sorted until [`Shoe::shuffle_cut_and_burn`] runs.
    pub fn new(num_decks: u8, seed: Option<u64>) -> Result<Self, TableError> {
        if pen_bounds(num_decks).is_none() {
            return Err(TableError::InvalidDeckCount { decks: num_decks });
        }
        let seed = seed.unwrap_or(0x5B1A_C7A2);
        Ok(Shoe {
            cards: shoe_of_decks(num_decks),
            discard: Vec::new(),
            num_decks,
            pen: None,
            rng: ChaCha20Rng::seed_from_u64(seed),
        })
    }

    pub fn num_decks(&self) -> u8 {
        self.num_decks
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The penetration percentage chosen by the most recent second cut.
    pub fn pen(&self) -> Option<u8> {
        self.pen
    }

    pub fn cards(&self) -> &[ShoeCard] {
        &self.cards
    }

    pub fn discard(&self) -> &[ShoeCard] {
        &self.discard
    }

    /// Full shuffle procedure: rebuild from the discard tray when the last
    /// shoe ran out, shuffle, perform both cuts, then burn the top card.
    /// Returns the penetration percentage in play for this shoe.
    pub fn shuffle_cut_and_burn(&mut self, pen_override: Option<u8>) -> Result<u8, TableError> {
        // A front cut card in discard means the previous shoe was exhausted:
        // strip both sentinels and return the discards to the stack.
        if self.discard.contains(&ShoeCard::FrontCut) {
            self.discard.retain(|c| *c != ShoeCard::FrontCut);
            self.cards.retain(|c| *c != ShoeCard::BackCut);
            self.cards.append(&mut self.discard);
        }
        self.cards.shuffle(&mut self.rng);
        self.first_cut();
        let pen = self.second_cut(pen_override);
        self.burn()?;
        Ok(pen)
    }

    /// Inserts the back cut card at a random point at least [`CUT_BUFFER`]
    /// cards from either edge, then rotates everything up to and including
    /// the marker to the back. The marker ends up as the last card.
    fn first_cut(&mut self) {
        let idx = self.rng.random_range(CUT_BUFFER..self.cards.len() - CUT_BUFFER);
        self.cards.insert(idx, ShoeCard::BackCut);
        self.cards.rotate_left(idx + 1);
    }

    /// Places the front cut card at the penetration point and records the
    /// percentage used. An explicit override wins; otherwise the percentage
    /// is drawn from the per-deck bounds.
    fn second_cut(&mut self, pen_override: Option<u8>) -> u8 {
        let pen = match pen_override {
            Some(p) => p,
            None => {
                let (lo, hi) =
                    pen_bounds(self.num_decks).expect("deck count validated at construction");
                self.rng.random_range(lo..hi)
            }
        };
        // round-half-up of len * pen / 100, kept in integers
        let idx = (self.cards.len() * pen as usize + 50) / 100;
        self.cards.insert(idx, ShoeCard::FrontCut);
        self.pen = Some(pen);
        pen
    }

    /// Removes the top card to discard unseen. This is a real playing card,
    /// never one of the sentinels.
    fn burn(&mut self) -> Result<(), TableError> {
        self.slide_front_cut();
        if self.cards.is_empty() {
            return Err(TableError::EmptyShoe);
        }
        let burned = self.cards.remove(0);
        self.discard.push(burned);
        Ok(())
    }

    fn slide_front_cut(&mut self) {
        if self.cards.first() == Some(&ShoeCard::FrontCut) {
            self.cards.remove(0);
            self.discard.push(ShoeCard::FrontCut);
        }
    }

    /// Deals the next card. A front cut card at the head slides to discard
    /// first; it is never dealt as a playing card.
    pub fn draw(&mut self) -> Result<Card, TableError> {
        self.slide_front_cut();
        match self.cards.first().copied() {
            Some(ShoeCard::Play(card)) => {
                self.cards.remove(0);
                Ok(card)
            }
            _ => Err(TableError::EmptyShoe),
        }
    }

    /// True once the front cut card has passed into discard; checked only at
    /// round end. Dealing past the marker mid-round has no other effect.
    pub fn reshuffle_due(&self) -> bool {
        self.discard.contains(&ShoeCard::FrontCut)
    }

    pub fn discard_card(&mut self, card: Card) {
        self.discard.push(ShoeCard::Play(card));
    }

    pub fn discard_all<I: IntoIterator<Item = Card>>(&mut self, cards: I) {
        for c in cards {
            self.discard_card(c);
        }
    }

    /// Copies of a card across shoe and discard together. Outside of a deal
    /// in progress this equals the deck count for every card.
    pub fn copies_in_play(&self, card: Card) -> usize {
        self.cards
            .iter()
            .chain(self.discard.iter())
            .filter(|c| **c == ShoeCard::Play(card))
            .count()
    }

    /// Percentage of the shoe dealt so far, for narration.
    pub fn percent_dealt(&self) -> u8 {
        let full = 2 + 52 * self.num_decks as usize;
        let dealt = full.saturating_sub(self.cards.len());
        ((dealt * 100 + full / 2) / full) as u8
    }

    /// Test support: lifts the named cards out of the shoe (or, for a card
    /// that happened to be burned, out of discard) and re-stacks them on top
    /// in draw order. The card multiset across shoe and discard is
    /// unchanged, so the conservation invariants keep holding on a rigged
    /// shoe.
    pub fn stack_top(&mut self, cards: &[Card]) -> Result<(), TableError> {
        for &card in cards.iter().rev() {
            if let Some(pos) = self.cards.iter().position(|c| *c == ShoeCard::Play(card)) {
                self.cards.remove(pos);
            } else if let Some(pos) = self.discard.iter().position(|c| *c == ShoeCard::Play(card))
            {
                self.discard.remove(pos);
            } else {
                return Err(TableError::CardNotInShoe { card });
            }
            self.cards.insert(0, ShoeCard::Play(card));
        }
        Ok(())
    }
}
