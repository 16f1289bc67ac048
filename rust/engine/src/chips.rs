use serde::{Deserialize, Serialize};

use crate::errors::TableError;

/// One of the nine chip denominations a table trades in. The dollar values
/// are fixed; Pink is the only sub-dollar denomination and is what makes
/// 3:2 blackjack payouts settle exactly.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum ChipColor {
    /// $1
    White,
    /// $2.50
    Pink,
    /// $5
    Red,
    /// $10
    Blue,
    /// $25
    Green,
    /// $100
    Black,
    /// $500
    Purple,
    /// $1,000
    Yellow,
    /// $5,000
    Brown,
}

/// All denominations, smallest to largest. The index order doubles as the
/// front end's digit-key order (1 = White .. 9 = Brown).
pub const CHIP_COLORS: [ChipColor; 9] = [
    ChipColor::White,
    ChipColor::Pink,
    ChipColor::Red,
    ChipColor::Blue,
    ChipColor::Green,
    ChipColor::Black,
    ChipColor::Purple,
    ChipColor::Yellow,
    ChipColor::Brown,
];

impl ChipColor {
    pub fn value_cents(self) -> u64 {
        match self {
            ChipColor::White => 100,
            ChipColor::Pink => 250,
            ChipColor::Red => 500,
            ChipColor::Blue => 1_000,
            ChipColor::Green => 2_500,
            ChipColor::Black => 10_000,
            ChipColor::Purple => 50_000,
            ChipColor::Yellow => 100_000,
            ChipColor::Brown => 500_000,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ChipColor::White => "White",
            ChipColor::Pink => "Pink",
            ChipColor::Red => "Red",
            ChipColor::Blue => "Blue",
            ChipColor::Green => "Green",
            ChipColor::Black => "Black",
            ChipColor::Purple => "Purple",
            ChipColor::Yellow => "Yellow",
            ChipColor::Brown => "Brown",
        }
    }

    fn index(self) -> usize {
        match self {
            ChipColor::White => 0,
            ChipColor::Pink => 1,
            ChipColor::Red => 2,
            ChipColor::Blue => 3,
            ChipColor::Green => 4,
            ChipColor::Black => 5,
            ChipColor::Purple => 6,
            ChipColor::Yellow => 7,
            ChipColor::Brown => 8,
        }
    }

    /// Denomination for a 1-based index, the mapping the front end's digit
    /// keys use.
    pub fn from_digit(digit: u8) -> Option<ChipColor> {
        match digit {
            1..=9 => Some(CHIP_COLORS[digit as usize - 1]),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChipColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A dollar amount held in integer cents. Every monetary quantity in the
/// engine is one of these (or raw cents); floats never enter the accounting.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize,
)]
pub struct Money(pub u64);

impl Money {
    pub fn cents(self) -> u64 {
        self.0
    }

    pub fn is_whole_dollars(self) -> bool {
        self.0 % 100 == 0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "${}", self.0 / 100)
        } else {
            write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
        }
    }
}

/// A pile of chips: per-denomination counts. Used for player pools, the
/// dealer's tray, and every bet circle on the felt.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
pub struct ChipStack {
    counts: [u32; 9],
}

impl ChipStack {
    pub fn empty() -> Self {
        ChipStack::default()
    }

    /// A stack with `count` chips of every denomination (the dealer's tray
    /// template).
    pub fn uniform(count: u32) -> Self {
        ChipStack { counts: [count; 9] }
    }

    pub fn of(pairs: &[(ChipColor, u32)]) -> Self {
        let mut s = ChipStack::empty();
        for &(color, n) in pairs {
            s.add(color, n);
        }
        s
    }

    pub fn count(&self, color: ChipColor) -> u32 {
        self.counts[color.index()]
    }

    pub fn add(&mut self, color: ChipColor, n: u32) {
        self.counts[color.index()] += n;
    }

    /// Removes chips of one color; refuses (and changes nothing) when the
    /// stack holds fewer than requested.
    pub fn remove(&mut self, color: ChipColor, n: u32) -> Result<(), TableError> {
        let idx = color.index();
        if self.counts[idx] < n {
            return Err(TableError::OutOfChips { color });
        }
        self.counts[idx] -= n;
        Ok(())
    }

    pub fn value(&self) -> Money {
        let cents = CHIP_COLORS
            .iter()
            .map(|&c| c.value_cents() * u64::from(self.count(c)))
            .sum();
        Money(cents)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&n| n == 0)
    }

    pub fn total_chips(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// A bet is dollar-integral exactly when it holds an even number of Pink
    /// chips.
    pub fn is_dollar_integral(&self) -> bool {
        self.count(ChipColor::Pink) % 2 == 0
    }

    /// Moves a single chip into another stack; the transfer is indivisible.
    pub fn move_chip(&mut self, color: ChipColor, into: &mut ChipStack) -> Result<(), TableError> {
        self.remove(color, 1)?;
        into.add(color, 1);
        Ok(())
    }

    /// Drains every chip into another stack and reports the value moved.
    pub fn drain_into(&mut self, into: &mut ChipStack) -> Money {
        let moved = self.value();
        for &color in &CHIP_COLORS {
            let n = self.count(color);
            if n > 0 {
                into.add(color, n);
                self.counts[color.index()] = 0;
            }
        }
        moved
    }

    /// Merges a whole stack in (the other stack is consumed by value).
    pub fn absorb(&mut self, other: ChipStack) {
        for &color in &CHIP_COLORS {
            self.add(color, other.count(color));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChipColor, u32)> + '_ {
        CHIP_COLORS
            .iter()
            .map(move |&c| (c, self.count(c)))
            .filter(|&(_, n)| n > 0)
    }
}

impl std::fmt::Display for ChipStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "(no chips)");
        }
        let mut first = true;
        for (color, n) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", n, color.name())?;
            first = false;
        }
        write!(f, " = {}", self.value())
    }
}
