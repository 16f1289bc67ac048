use serde::{Deserialize, Serialize};

/// Represents one of the four suits in a standard 52-card deck.
/// Used as a component of [`Card`] to fully define a playing card.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Suit {
    /// Clubs suit (♣)
    Clubs,
    /// Diamonds suit (♦)
    Diamonds,
    /// Hearts suit (♥)
    Hearts,
    /// Spades suit (♠)
    Spades,
}

impl Suit {
    /// Single-letter suit code used in short card notation ("AH", "10C").
    pub fn letter(self) -> char {
        match self {
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
            Suit::Hearts => 'H',
            Suit::Spades => 'S',
        }
    }

    pub fn is_red(self) -> bool {
        matches!(self, Suit::Diamonds | Suit::Hearts)
    }
}

/// Represents the rank (face value) of a playing card from Two through Ace.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Rank {
    /// Rank 2
    Two = 2,
    /// Rank 3
    Three,
    /// Rank 4
    Four,
    /// Rank 5
    Five,
    /// Rank 6
    Six,
    /// Rank 7
    Seven,
    /// Rank 8
    Eight,
    /// Rank 9
    Nine,
    /// Rank 10
    Ten,
    /// Jack
    Jack,
    /// Queen
    Queen,
    /// King
    King,
    /// Ace
    Ace,
}

impl Rank {
    /// Low blackjack value: Ace counts 1, face cards count 10, pips count face value.
    pub fn low_value(self) -> u8 {
        match self {
            Rank::Ace => 1,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
            other => other as u8,
        }
    }

    /// High blackjack value: same as [`Rank::low_value`] except Ace counts 11.
    pub fn high_value(self) -> u8 {
        match self {
            Rank::Ace => 11,
            other => other.low_value(),
        }
    }

    pub fn is_ten_value(self) -> bool {
        self.low_value() == 10
    }

    /// Rank symbol used in short card notation.
    pub fn symbol(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

/// Represents a single playing card with a suit and rank.
/// Cards are the fundamental unit of the game, dealt from the shoe into
/// player and dealer hands.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Card {
    /// The suit of the card (Clubs, Diamonds, Hearts, or Spades)
    pub suit: Suit,
    /// The rank of the card (Two through Ace)
    pub rank: Rank,
}

impl Card {
    /// Short notation: rank symbol followed by suit letter, e.g. "AH" or "10C".
    pub fn code(self) -> String {
        format!("{}{}", self.rank.symbol(), self.suit.letter())
    }

    /// Parses short notation back into a card. Used by test fixtures and the
    /// front end; returns `None` for anything that is not a valid code.
    pub fn from_code(code: &str) -> Option<Card> {
        if !code.is_ascii() {
            return None;
        }
        let (rank_part, suit_part) = code.split_at(code.len().checked_sub(1)?);
        let suit = match suit_part {
            "C" => Suit::Clubs,
            "D" => Suit::Diamonds,
            "H" => Suit::Hearts,
            "S" => Suit::Spades,
            _ => return None,
        };
        let rank = match rank_part {
            "2" => Rank::Two,
            "3" => Rank::Three,
            "4" => Rank::Four,
            "5" => Rank::Five,
            "6" => Rank::Six,
            "7" => Rank::Seven,
            "8" => Rank::Eight,
            "9" => Rank::Nine,
            "10" => Rank::Ten,
            "J" => Rank::Jack,
            "Q" => Rank::Queen,
            "K" => Rank::King,
            "A" => Rank::Ace,
            _ => return None,
        };
        Some(Card { suit, rank })
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.rank.symbol(), self.suit.letter())
    }
}

/// One entry in the shoe's dealing sequence: either a playing card or one of
/// the two cut-card sentinels. The sentinels carry no rank or suit and are
/// never dealt as playing cards.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum ShoeCard {
    Play(Card),
    /// Marks the reshuffle point; slid to discard when it reaches the head.
    FrontCut,
    /// Rear cut marker; removed when the shoe is rebuilt for a reshuffle.
    BackCut,
}

impl ShoeCard {
    pub fn card(self) -> Option<Card> {
        match self {
            ShoeCard::Play(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_sentinel(self) -> bool {
        !matches!(self, ShoeCard::Play(_))
    }
}

pub fn all_suits() -> [Suit; 4] {
    [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades]
}

pub fn all_ranks() -> [Rank; 13] {
    [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ]
}

/// The 52-card reference deck, used both for shoe construction and for the
/// card-conservation checks.
pub fn reference_deck() -> Vec<Card> {
    let mut v = Vec::with_capacity(52);
    for &s in &all_suits() {
        for &r in &all_ranks() {
            v.push(Card { suit: s, rank: r });
        }
    }
    v
}

/// `num_decks` copies of the reference deck as a shoe sequence, in sorted
/// order. The caller shuffles.
pub fn shoe_of_decks(num_decks: u8) -> Vec<ShoeCard> {
    let mut v = Vec::with_capacity(52 * num_decks as usize);
    for card in reference_deck() {
        for _ in 0..num_decks {
            v.push(ShoeCard::Play(card));
        }
    }
    v
}
