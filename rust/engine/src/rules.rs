use serde::{Deserialize, Serialize};

use crate::chips::Money;
use crate::errors::TableError;
use crate::shoe::pen_bounds;
use crate::sidebets::SideBetKind;

/// What a natural blackjack pays.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum BlackjackRatio {
    /// 3:2; the half dollar is paid with a Pink chip.
    ThreeToTwo,
    /// 6:5; the payout is rounded to the nearest dollar first.
    SixToFive,
}

impl BlackjackRatio {
    /// Blackjack winnings for a dollar-integral bet, in cents.
    pub fn payout_cents(self, bet_cents: u64) -> u64 {
        match self {
            BlackjackRatio::ThreeToTwo => bet_cents * 3 / 2,
            BlackjackRatio::SixToFive => {
                let raw = bet_cents * 6 / 5;
                // nearest dollar, half up
                (raw + 50) / 100 * 100
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlackjackRatio::ThreeToTwo => "3:2",
            BlackjackRatio::SixToFive => "6:5",
        }
    }
}

/// Dealer behavior on seventeen.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum SeventeenRule {
    /// Stand on any seventeen or better.
    S17,
    /// Stand only above seventeen.
    H17,
}

impl SeventeenRule {
    pub fn dealer_stands_on(self, total: u8) -> bool {
        match self {
            SeventeenRule::S17 => total >= 17,
            SeventeenRule::H17 => total > 17,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeventeenRule::S17 => "S17",
            SeventeenRule::H17 => "H17",
        }
    }
}

/// When (if ever) a seat may surrender.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum SurrenderRule {
    /// No surrender.
    NS,
    /// Early surrender, offered before the dealer checks for blackjack.
    ES,
    /// Early surrender, but only against a ten-value up-card.
    ES10,
    /// Late surrender, offered as a first action once the dealer has checked.
    LS,
}

impl SurrenderRule {
    pub fn as_str(self) -> &'static str {
        match self {
            SurrenderRule::NS => "NS",
            SurrenderRule::ES => "ES",
            SurrenderRule::ES10 => "ES10",
            SurrenderRule::LS => "LS",
        }
    }
}

/// Which first-two-card totals may double down.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum DoublingRule {
    /// Double on any two cards.
    DA2,
    /// Totals 9 through 11 only.
    D9,
    /// Totals 10 and 11 only.
    D10,
}

impl DoublingRule {
    pub fn allows_total(self, total: u8) -> bool {
        match self {
            DoublingRule::DA2 => true,
            DoublingRule::D9 => (9..=11).contains(&total),
            DoublingRule::D10 => (10..=11).contains(&total),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DoublingRule::DA2 => "DA2",
            DoublingRule::D9 => "D9",
            DoublingRule::D10 => "D10",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum DoubleAfterSplit {
    DAS,
    NDAS,
}

impl DoubleAfterSplit {
    pub fn as_str(self) -> &'static str {
        match self {
            DoubleAfterSplit::DAS => "DAS",
            DoubleAfterSplit::NDAS => "NDAS",
        }
    }
}

/// Cap on the number of hands a single seat can split to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum SplittingRule {
    SP2,
    SP4,
}

impl SplittingRule {
    pub fn max_hands(self) -> usize {
        match self {
            SplittingRule::SP2 => 2,
            SplittingRule::SP4 => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SplittingRule::SP2 => "SP2",
            SplittingRule::SP4 => "SP4",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum AceResplitRule {
    /// Re-splitting aces allowed.
    RSA,
    /// Split aces may not be split again.
    NRSA,
}

impl AceResplitRule {
    pub fn as_str(self) -> &'static str {
        match self {
            AceResplitRule::RSA => "RSA",
            AceResplitRule::NRSA => "NRSA",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum JoinRule {
    /// Join between any two rounds.
    Open,
    /// No mid-shoe entry: joins only between shoes.
    NoMidShoeEntry,
}

impl JoinRule {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinRule::Open => "None",
            JoinRule::NoMidShoeEntry => "NMSE",
        }
    }
}

/// One side bet offered at the table, with its own limits.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SideBetOffer {
    pub kind: SideBetKind,
    pub min_bet_cents: u64,
    pub max_bet_cents: u64,
}

impl SideBetOffer {
    pub fn standard(kind: SideBetKind) -> Self {
        SideBetOffer {
            kind,
            min_bet_cents: 100,
            max_bet_cents: 10_000,
        }
    }
}

/// The complete rule preset a table is constructed with. Plain data; the
/// front end assembles one from flags or a preset file and the table
/// validates it once at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRules {
    pub num_decks: u8,
    pub min_bet_cents: u64,
    pub max_bet_cents: u64,
    pub blackjack_ratio: BlackjackRatio,
    pub seventeen_rule: SeventeenRule,
    pub surrender_rule: SurrenderRule,
    pub doubling_rule: DoublingRule,
    pub double_after_split: DoubleAfterSplit,
    pub splitting_rule: SplittingRule,
    pub ace_resplit: AceResplitRule,
    /// At most two side bets may be active.
    pub side_bets: Vec<SideBetOffer>,
    pub join_rule: JoinRule,
    /// Fixed penetration percentage; `None` draws from the per-deck bounds
    /// on every shuffle.
    pub pen_override: Option<u8>,
}

impl Default for TableRules {
    /// The standard casino preset: six decks, $5-$100, 3:2 blackjack, stand
    /// on all seventeens, late surrender, full doubling and four-hand splits
    /// without ace re-splitting, no mid-shoe entry.
    fn default() -> Self {
        TableRules {
            num_decks: 6,
            min_bet_cents: 500,
            max_bet_cents: 10_000,
            blackjack_ratio: BlackjackRatio::ThreeToTwo,
            seventeen_rule: SeventeenRule::S17,
            surrender_rule: SurrenderRule::LS,
            doubling_rule: DoublingRule::DA2,
            double_after_split: DoubleAfterSplit::DAS,
            splitting_rule: SplittingRule::SP4,
            ace_resplit: AceResplitRule::NRSA,
            side_bets: Vec::new(),
            join_rule: JoinRule::NoMidShoeEntry,
            pen_override: None,
        }
    }
}

impl TableRules {
    pub fn validate(&self) -> Result<(), TableError> {
        if pen_bounds(self.num_decks).is_none() {
            return Err(TableError::InvalidDeckCount {
                decks: self.num_decks,
            });
        }
        if self.min_bet_cents % 100 != 0 || self.max_bet_cents % 100 != 0 {
            return Err(TableError::InvalidRules {
                reason: "bet limits must be whole dollars".to_string(),
            });
        }
        if !(100..=10_000).contains(&self.min_bet_cents) {
            return Err(TableError::InvalidRules {
                reason: format!(
                    "minimum bet {} must be between $1 and $100",
                    Money(self.min_bet_cents)
                ),
            });
        }
        if !(10_000..=1_000_000).contains(&self.max_bet_cents) {
            return Err(TableError::InvalidRules {
                reason: format!(
                    "maximum bet {} must be between $100 and $10000",
                    Money(self.max_bet_cents)
                ),
            });
        }
        if self.max_bet_cents < 10 * self.min_bet_cents {
            return Err(TableError::InvalidRules {
                reason: "maximum bet must be at least 10x the minimum".to_string(),
            });
        }
        if self.side_bets.len() > 2 {
            return Err(TableError::InvalidRules {
                reason: "at most two side bets may be active".to_string(),
            });
        }
        if let Some(pen) = self.pen_override {
            if !(1..=99).contains(&pen) {
                return Err(TableError::InvalidRules {
                    reason: format!("penetration override {}% must be between 1 and 99", pen),
                });
            }
        }
        for offer in &self.side_bets {
            if offer.min_bet_cents % 100 != 0
                || offer.max_bet_cents % 100 != 0
                || offer.min_bet_cents == 0
                || offer.max_bet_cents < offer.min_bet_cents
            {
                return Err(TableError::InvalidRules {
                    reason: format!("invalid limits for the {} side bet", offer.kind.name()),
                });
            }
        }
        Ok(())
    }

    pub fn min_bet(&self) -> Money {
        Money(self.min_bet_cents)
    }

    pub fn max_bet(&self) -> Money {
        Money(self.max_bet_cents)
    }
}
