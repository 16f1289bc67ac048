use thiserror::Error;

use crate::cards::Card;
use crate::chips::{ChipColor, Money};
use crate::input::TurnAction;
use crate::player::SeatName;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("invalid deck count {decks} (expected 1, 2, 4, 6 or 8)")]
    InvalidDeckCount { decks: u8 },
    #[error("the shoe is out of cards")]
    EmptyShoe,
    #[error("card {card} is not in the shoe")]
    CardNotInShoe { card: Card },
    #[error("invalid (fractional) bet amount of {amount} - resubmit with an even number of Pink chips")]
    FractionalBet { amount: Money },
    #[error("bet of {amount} is outside the table limits of {min} to {max}")]
    BetOutOfBounds {
        amount: Money,
        min: Money,
        max: Money,
    },
    #[error("no {color} chips left to move")]
    OutOfChips { color: ChipColor },
    #[error("{player} has no bet in the {seat} circle")]
    MissingBet { player: String, seat: SeatName },
    #[error("cannot compose {amount} from the available chips")]
    CannotPay { amount: Money },
    #[error("table position {position} is already taken")]
    SeatTaken { position: u8 },
    #[error("table position {position} is not valid (expected 1-7)")]
    InvalidSeatPosition { position: u8 },
    #[error("table rules forbid joining mid-shoe")]
    JoinRestricted,
    #[error("no players are seated at the table")]
    NoPlayers,
    #[error("action '{action}' is not available for this hand")]
    UnavailableAction { action: TurnAction },
    #[error("invalid table rules: {reason}")]
    InvalidRules { reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
