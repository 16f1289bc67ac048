use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank, Suit};
use crate::chips::ChipStack;
use crate::hand::{score, HandScore};

/// The side bets a table can offer. At most two are active at once.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum SideBetKind {
    PerfectPairs,
    MatchTheDealer,
    LuckyLadies,
    KingsBounty,
    BusterBlackjack,
}

pub const SIDE_BET_KINDS: [SideBetKind; 5] = [
    SideBetKind::PerfectPairs,
    SideBetKind::MatchTheDealer,
    SideBetKind::LuckyLadies,
    SideBetKind::KingsBounty,
    SideBetKind::BusterBlackjack,
];

impl SideBetKind {
    pub fn name(self) -> &'static str {
        match self {
            SideBetKind::PerfectPairs => "Perfect Pairs",
            SideBetKind::MatchTheDealer => "Match the Dealer",
            SideBetKind::LuckyLadies => "Lucky Ladies",
            SideBetKind::KingsBounty => "King's Bounty",
            SideBetKind::BusterBlackjack => "Buster Blackjack",
        }
    }

    /// Parses the hyphenated form the front end uses ("perfect-pairs").
    pub fn from_flag(flag: &str) -> Option<SideBetKind> {
        match flag {
            "perfect-pairs" => Some(SideBetKind::PerfectPairs),
            "match-the-dealer" => Some(SideBetKind::MatchTheDealer),
            "lucky-ladies" => Some(SideBetKind::LuckyLadies),
            "kings-bounty" => Some(SideBetKind::KingsBounty),
            "buster-blackjack" => Some(SideBetKind::BusterBlackjack),
            _ => None,
        }
    }
}

impl std::fmt::Display for SideBetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A matched pay-table tier: its display name and its to-1 multiplier.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TierHit {
    pub tier: &'static str,
    pub multiplier: u64,
}

/// Result of the after-deal resolution pass.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EarlyOutcome {
    /// A tier matched and can pay right away.
    Paid(TierHit),
    /// No tier matched; the bet is collected.
    Lost,
    /// The outcome depends on information not yet revealed (dealer
    /// blackjack, or the dealer's final hand for Buster Blackjack).
    Deferred,
}

/// A side bet riding on one seat. The two dealt cards are captured at
/// resolution time so deferred tiers can settle even after the hand itself
/// has left the felt.
#[derive(Debug, Clone)]
pub struct SideBetSlot {
    pub kind: SideBetKind,
    pub bet: ChipStack,
    pub amount_cents: u64,
    pub dealt: Option<[Card; 2]>,
}

impl SideBetSlot {
    pub fn new(kind: SideBetKind) -> Self {
        SideBetSlot {
            kind,
            bet: ChipStack::empty(),
            amount_cents: 0,
            dealt: None,
        }
    }
}

/// Resolves a side bet against the dealt two-card hand (and the dealer's
/// up-card where the bet calls for it). Tiers are checked most specific
/// first; the first match wins.
pub fn resolve_after_deal(kind: SideBetKind, hand: [Card; 2], dealer_up: Card) -> EarlyOutcome {
    match kind {
        SideBetKind::PerfectPairs => perfect_pairs(hand),
        SideBetKind::MatchTheDealer => match_the_dealer(hand, dealer_up),
        SideBetKind::LuckyLadies => lucky_ladies(hand),
        SideBetKind::KingsBounty => kings_bounty(hand),
        // Pays on the dealer's final hand; nothing can settle at the deal.
        SideBetKind::BusterBlackjack => EarlyOutcome::Deferred,
    }
}

/// Settles the tiers that hinge on the dealer-blackjack check. Only the
/// hands deferred by [`resolve_after_deal`] for Lucky Ladies or King's
/// Bounty reach this; both always win at least their no-blackjack tier.
pub fn resolve_on_dealer_check(kind: SideBetKind, dealer_blackjack: bool) -> TierHit {
    match kind {
        SideBetKind::LuckyLadies => {
            if dealer_blackjack {
                TierHit {
                    tier: "Queens of Hearts with Dealer Blackjack",
                    multiplier: 200,
                }
            } else {
                TierHit {
                    tier: "Queens of Hearts",
                    multiplier: 25,
                }
            }
        }
        SideBetKind::KingsBounty => {
            if dealer_blackjack {
                TierHit {
                    tier: "Kings of Spades with Dealer Blackjack",
                    multiplier: 1000,
                }
            } else {
                TierHit {
                    tier: "Kings of Spades",
                    multiplier: 30,
                }
            }
        }
        _ => unreachable!("only Lucky Ladies and King's Bounty defer to the dealer check"),
    }
}

/// Buster Blackjack: settles once the dealer's hand is final. `None` means
/// the dealer did not bust and the bet is collected.
pub fn resolve_after_dealer_play(dealer_cards: usize, dealer_busted: bool) -> Option<TierHit> {
    if !dealer_busted {
        return None;
    }
    let hit = match dealer_cards {
        8.. => TierHit {
            tier: "Dealer Bust with 8+ Cards",
            multiplier: 250,
        },
        7 => TierHit {
            tier: "Dealer Bust with 7 Cards",
            multiplier: 50,
        },
        6 => TierHit {
            tier: "Dealer Bust with 6 Cards",
            multiplier: 12,
        },
        5 => TierHit {
            tier: "Dealer Bust with 5 Cards",
            multiplier: 4,
        },
        3 | 4 => TierHit {
            tier: "Dealer Bust",
            multiplier: 2,
        },
        _ => return None,
    };
    Some(hit)
}

fn perfect_pairs(hand: [Card; 2]) -> EarlyOutcome {
    let [a, b] = hand;
    if a.rank != b.rank {
        return EarlyOutcome::Lost;
    }
    let hit = if a.suit == b.suit {
        TierHit {
            tier: "Perfect Pair",
            multiplier: 25,
        }
    } else if a.suit.is_red() == b.suit.is_red() {
        TierHit {
            tier: "Colored Pair",
            multiplier: 10,
        }
    } else {
        TierHit {
            tier: "Mixed Pair",
            multiplier: 5,
        }
    };
    EarlyOutcome::Paid(hit)
}

fn match_the_dealer(hand: [Card; 2], dealer_up: Card) -> EarlyOutcome {
    let mut suited = 0u8;
    let mut unsuited = 0u8;
    for card in hand {
        if card.rank == dealer_up.rank {
            if card.suit == dealer_up.suit {
                suited += 1;
            } else {
                unsuited += 1;
            }
        }
    }
    let hit = match (suited, unsuited) {
        (2, _) => TierHit {
            tier: "Two Suited Matches",
            multiplier: 22,
        },
        (1, 1) => TierHit {
            tier: "Suited and Unsuited Match",
            multiplier: 15,
        },
        (0, 2) => TierHit {
            tier: "Two Unsuited Matches",
            multiplier: 8,
        },
        (1, 0) => TierHit {
            tier: "Suited Match",
            multiplier: 11,
        },
        (0, 1) => TierHit {
            tier: "Unsuited Match",
            multiplier: 4,
        },
        _ => return EarlyOutcome::Lost,
    };
    EarlyOutcome::Paid(hit)
}

fn lucky_ladies(hand: [Card; 2]) -> EarlyOutcome {
    if score(&hand) != HandScore::Value(20) {
        return EarlyOutcome::Lost;
    }
    let [a, b] = hand;
    let queen_of_hearts = |c: Card| c.rank == Rank::Queen && c.suit == Suit::Hearts;
    if queen_of_hearts(a) && queen_of_hearts(b) {
        // 25 or 200 depending on the dealer's hole card
        return EarlyOutcome::Deferred;
    }
    if a.rank == Rank::Queen && b.rank == Rank::Queen {
        return EarlyOutcome::Paid(TierHit {
            tier: "Queen Pair",
            multiplier: 10,
        });
    }
    EarlyOutcome::Paid(TierHit {
        tier: "Any 20",
        multiplier: 4,
    })
}

fn kings_bounty(hand: [Card; 2]) -> EarlyOutcome {
    if score(&hand) != HandScore::Value(20) {
        return EarlyOutcome::Lost;
    }
    let [a, b] = hand;
    let king_of_spades = |c: Card| c.rank == Rank::King && c.suit == Suit::Spades;
    if king_of_spades(a) && king_of_spades(b) {
        // 30 or 1000 depending on the dealer's hole card
        return EarlyOutcome::Deferred;
    }
    let hit = if a.rank == Rank::King && b.rank == Rank::King {
        if a.suit == b.suit {
            TierHit {
                tier: "Suited Kings",
                multiplier: 25,
            }
        } else {
            TierHit {
                tier: "King Pair",
                multiplier: 20,
            }
        }
    } else if a.suit == b.suit {
        TierHit {
            tier: "Suited 20",
            multiplier: 9,
        }
    } else {
        TierHit {
            tier: "Any 20",
            multiplier: 4,
        }
    };
    EarlyOutcome::Paid(hit)
}
