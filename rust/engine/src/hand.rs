use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank};

/// Outcome of scoring a hand.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum HandScore {
    /// A live total. Complete hands land in 4..=21; a single dealt card can
    /// score lower while a hand is still being built.
    Value(u8),
    /// A two-card 21 dealt directly (Ace plus a ten-value card).
    Blackjack,
    /// Past 21 with every Ace already demoted.
    Bust,
}

impl HandScore {
    /// The point total, with a busted hand carrying none.
    pub fn points(self) -> Option<u8> {
        match self {
            HandScore::Value(v) => Some(v),
            HandScore::Blackjack => Some(21),
            HandScore::Bust => None,
        }
    }

    pub fn is_bust(self) -> bool {
        matches!(self, HandScore::Bust)
    }

    pub fn is_blackjack(self) -> bool {
        matches!(self, HandScore::Blackjack)
    }
}

impl std::fmt::Display for HandScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandScore::Value(v) => write!(f, "{}", v),
            HandScore::Blackjack => write!(f, "Blackjack"),
            HandScore::Bust => write!(f, "Bust"),
        }
    }
}

/// Scores a hand in a single left-to-right pass, tracking the running total
/// and how many Aces are currently counted as 11. Exactly one soft Ace is
/// demoted per overflow, which is what keeps hands like A,A,J,Q at 21
/// instead of busting. Reaching exactly 21 returns immediately; later cards
/// are not scored.
pub fn score(cards: &[Card]) -> HandScore {
    let mut total: u8 = 0;
    let mut soft_aces: u8 = 0;

    for card in cards {
        let low = card.rank.low_value();
        let high = card.rank.high_value();
        let is_ace = card.rank == Rank::Ace;

        if soft_aces == 0 {
            // Hard hand: no Ace currently counted as 11.
            if total + low > 21 {
                return HandScore::Bust;
            } else if is_ace && total + low == 21 {
                return twenty_one(cards);
            } else if total + high == 21 {
                return twenty_one(cards);
            } else if is_ace && total + high > 21 {
                total += low;
            } else if total + high < 21 {
                total += high;
                if is_ace {
                    soft_aces += 1;
                }
            }
        } else {
            // Soft hand: one Ace is riding at 11.
            if is_ace && total + low == 21 {
                return twenty_one(cards);
            } else if !is_ace && total + high == 21 {
                return twenty_one(cards);
            } else if is_ace && total + high > 21 {
                total += low;
            } else if !is_ace && total + high > 21 {
                // One demotion per overflow: the soft Ace drops to 1.
                total = total - 10 + high;
                soft_aces = 0;
            } else if !is_ace && total + high < 21 {
                total += high;
            }
        }
    }

    if total == 21 && cards.len() == 2 {
        HandScore::Blackjack
    } else {
        HandScore::Value(total)
    }
}

fn twenty_one(cards: &[Card]) -> HandScore {
    if cards.len() == 2 {
        HandScore::Blackjack
    } else {
        HandScore::Value(21)
    }
}
