//! The chip settlement engine: every movement of chips between a player's
//! pool, a bet circle, and the dealer's tray goes through here. Transfers
//! are indivisible: a settlement either moves every chip it names or
//! reports an error and moves none.

use crate::chips::{ChipColor, ChipStack, Money, CHIP_COLORS};
use crate::errors::TableError;
use crate::player::{Player, SeatName};
use crate::rules::{SideBetOffer, TableRules};

/// Validates the chips staged in a main-bet circle and locks the amount in.
/// The staged chips stay in the circle on rejection so the player can keep
/// adjusting.
pub fn finish_main_bet(
    player: &mut Player,
    seat: SeatName,
    hand: usize,
    rules: &TableRules,
) -> Result<Money, TableError> {
    let name = player.name.clone();
    let spot = player
        .seat_mut(seat)
        .and_then(|s| s.hands.get_mut(hand))
        .ok_or(TableError::MissingBet { player: name, seat })?;
    let amount = spot.bet.value();
    if !spot.bet.is_dollar_integral() {
        return Err(TableError::FractionalBet { amount });
    }
    if amount.cents() < rules.min_bet_cents || amount.cents() > rules.max_bet_cents {
        return Err(TableError::BetOutOfBounds {
            amount,
            min: rules.min_bet(),
            max: rules.max_bet(),
        });
    }
    spot.bet_cents = amount.cents();
    Ok(amount)
}

/// Side-bet variant of [`finish_main_bet`], checked against the offer's own
/// limits.
pub fn finish_side_bet(
    player: &mut Player,
    seat: SeatName,
    slot: usize,
    offer: &SideBetOffer,
) -> Result<Money, TableError> {
    let name = player.name.clone();
    let side = player
        .seat_mut(seat)
        .and_then(|s| s.side_bets.get_mut(slot))
        .ok_or(TableError::MissingBet { player: name, seat })?;
    let amount = side.bet.value();
    if !side.bet.is_dollar_integral() {
        return Err(TableError::FractionalBet { amount });
    }
    if amount.cents() < offer.min_bet_cents || amount.cents() > offer.max_bet_cents {
        return Err(TableError::BetOutOfBounds {
            amount,
            min: Money(offer.min_bet_cents),
            max: Money(offer.max_bet_cents),
        });
    }
    side.amount_cents = amount.cents();
    Ok(amount)
}

/// Moves a lost main bet from the circle into the dealer's tray and clears
/// the bet fields. Reports `MissingBet` (and moves nothing) when the circle
/// is empty.
pub fn collect_losing_bet(
    dealer: &mut Player,
    player: &mut Player,
    seat: SeatName,
    hand: usize,
) -> Result<Money, TableError> {
    let name = player.name.clone();
    let spot = player
        .seat_mut(seat)
        .and_then(|s| s.hands.get_mut(hand))
        .filter(|s| s.has_bet())
        .ok_or(TableError::MissingBet { player: name, seat })?;
    let moved = spot.bet.drain_into(&mut dealer.chips);
    spot.bet_cents = 0;
    Ok(moved)
}

/// Moves a lost side bet into the dealer's tray.
pub fn collect_losing_side_bet(
    dealer: &mut Player,
    player: &mut Player,
    seat: SeatName,
    slot: usize,
) -> Result<Money, TableError> {
    let name = player.name.clone();
    let side = player
        .seat_mut(seat)
        .and_then(|s| s.side_bets.get_mut(slot))
        .ok_or(TableError::MissingBet { player: name, seat })?;
    let moved = side.bet.drain_into(&mut dealer.chips);
    side.amount_cents = 0;
    Ok(moved)
}

/// Returns a pushed bet from the circle to the player's own pool. No money
/// changes hands.
pub fn return_bet(player: &mut Player, seat: SeatName, hand: usize) -> Result<Money, TableError> {
    let name = player.name.clone();
    let mut circle;
    {
        let spot = player
            .seat_mut(seat)
            .and_then(|s| s.hands.get_mut(hand))
            .ok_or(TableError::MissingBet { player: name, seat })?;
        circle = std::mem::take(&mut spot.bet);
        spot.bet_cents = 0;
    }
    let moved = circle.drain_into(&mut player.chips);
    Ok(moved)
}

/// Greedy decomposition of `cents` against the chips available in `source`.
/// A 50¢ remainder takes exactly one Pink chip; the whole dollars then come
/// largest-first from the non-Pink denominations. The denomination set is
/// chosen so this is exact whenever the source can cover the amount at all;
/// a source that cannot make exact change yields `CannotPay`.
pub fn decompose(source: &ChipStack, cents: u64) -> Result<ChipStack, TableError> {
    let mut remaining = cents;
    let mut picked = ChipStack::empty();
    if remaining % 100 == 50 {
        if remaining < 250 || source.count(ChipColor::Pink) == 0 {
            return Err(TableError::CannotPay {
                amount: Money(cents),
            });
        }
        picked.add(ChipColor::Pink, 1);
        remaining -= 250;
    }
    for &color in CHIP_COLORS.iter().rev() {
        if color == ChipColor::Pink {
            continue;
        }
        let denom = color.value_cents();
        let want = (remaining / denom) as u32;
        let take = want.min(source.count(color));
        if take > 0 {
            picked.add(color, take);
            remaining -= u64::from(take) * denom;
        }
    }
    if remaining > 0 {
        return Err(TableError::CannotPay {
            amount: Money(cents),
        });
    }
    Ok(picked)
}

/// Pays `cents` from the dealer's tray into the player's pool as one
/// indivisible transfer.
pub fn pay_from_tray(
    dealer: &mut Player,
    player: &mut Player,
    cents: u64,
) -> Result<ChipStack, TableError> {
    let paid = decompose(&dealer.chips, cents)?;
    for (color, n) in paid.iter() {
        dealer
            .chips
            .remove(color, n)
            .expect("decomposition picked from available chips");
        player.chips.add(color, n);
    }
    Ok(paid)
}

/// Pays a winning main bet: the payout moves dealer→player and the original
/// bet returns to the player's pool. The canonical 3:2 single-unit case, a
/// $1.50 payout on a $1 White-chip bet, is settled by swapping the White in
/// the circle for one Pink straight from the tray.
pub fn pay_main_win(
    dealer: &mut Player,
    player: &mut Player,
    seat: SeatName,
    hand: usize,
    payout_cents: u64,
) -> Result<Money, TableError> {
    let name = player.name.clone();
    let mut swapped_circle: Option<ChipStack> = None;
    {
        let spot = player
            .seat_mut(seat)
            .and_then(|s| s.hands.get_mut(hand))
            .filter(|s| s.has_bet())
            .ok_or(TableError::MissingBet { player: name, seat })?;
        if payout_cents == 150
            && spot.bet_cents == 100
            && spot.bet.count(ChipColor::White) == 1
            && dealer.chips.count(ChipColor::Pink) > 0
        {
            spot.bet.move_chip(ChipColor::White, &mut dealer.chips)?;
            dealer.chips.move_chip(ChipColor::Pink, &mut spot.bet)?;
            spot.bet_cents = 0;
            swapped_circle = Some(std::mem::take(&mut spot.bet));
        }
    }
    if let Some(mut circle) = swapped_circle {
        circle.drain_into(&mut player.chips);
        return Ok(Money(150));
    }
    pay_from_tray(dealer, player, payout_cents)?;
    return_bet(player, seat, hand)?;
    Ok(Money(payout_cents))
}

/// Pays a winning side bet: winnings from the tray plus the stake back.
pub fn pay_side_win(
    dealer: &mut Player,
    player: &mut Player,
    seat: SeatName,
    slot: usize,
    payout_cents: u64,
) -> Result<Money, TableError> {
    pay_from_tray(dealer, player, payout_cents)?;
    let name = player.name.clone();
    let mut circle;
    {
        let side = player
            .seat_mut(seat)
            .and_then(|s| s.side_bets.get_mut(slot))
            .ok_or(TableError::MissingBet { player: name, seat })?;
        circle = std::mem::take(&mut side.bet);
        side.amount_cents = 0;
    }
    circle.drain_into(&mut player.chips);
    Ok(Money(payout_cents))
}

/// Matches the current bet out of the player's pool for a double down. The
/// circle ends up holding twice the original amount.
pub fn double_stake(player: &mut Player, seat: SeatName, hand: usize) -> Result<Money, TableError> {
    let amount = player
        .seat(seat)
        .and_then(|s| s.hands.get(hand))
        .map(|s| s.bet_cents)
        .unwrap_or(0);
    if amount == 0 {
        return Err(TableError::MissingBet {
            player: player.name.clone(),
            seat,
        });
    }
    let matched = stake_matching(player, amount)?;
    let spot = player
        .seat_mut(seat)
        .and_then(|s| s.hands.get_mut(hand))
        .expect("spot existed above");
    spot.bet.absorb(matched);
    spot.bet_cents = amount * 2;
    spot.doubled = true;
    Ok(Money(amount))
}

/// Pulls a stack equal to `cents` out of the player's pool, e.g. to stake a
/// split hand. All-or-nothing: a pool that cannot make exact change loses
/// nothing.
pub fn stake_matching(player: &mut Player, cents: u64) -> Result<ChipStack, TableError> {
    let matched = decompose(&player.chips, cents)?;
    for (color, n) in matched.iter() {
        player
            .chips
            .remove(color, n)
            .expect("decomposition picked from available chips");
    }
    Ok(matched)
}

fn exchange(
    dealer: &mut Player,
    player: &mut Player,
    color: ChipColor,
    n: u32,
    want_larger: bool,
) -> Result<ChipStack, TableError> {
    if n == 0 || player.chips.count(color) < n {
        return Err(TableError::OutOfChips { color });
    }
    let value = u64::from(n) * color.value_cents();
    let mut picked = ChipStack::empty();
    let mut remaining = value;
    for &c in CHIP_COLORS.iter().rev() {
        let eligible = if want_larger {
            c.value_cents() > color.value_cents()
        } else {
            c.value_cents() < color.value_cents()
        };
        if !eligible {
            continue;
        }
        let denom = c.value_cents();
        let take = ((remaining / denom) as u32).min(dealer.chips.count(c));
        if take > 0 {
            picked.add(c, take);
            remaining -= u64::from(take) * denom;
        }
    }
    if remaining > 0 {
        return Err(TableError::CannotPay {
            amount: Money(value),
        });
    }
    player
        .chips
        .remove(color, n)
        .expect("count checked above");
    dealer.chips.add(color, n);
    for (c, count) in picked.iter() {
        dealer
            .chips
            .remove(c, count)
            .expect("exchange picked from available chips");
        player.chips.add(c, count);
    }
    Ok(picked)
}

/// Trades `n` chips of one color for the tray's equivalent in larger
/// denominations. All-or-nothing: a total that has no exact larger-chip
/// representation (an odd run of Pinks, say) is refused untouched.
pub fn color_up(
    dealer: &mut Player,
    player: &mut Player,
    color: ChipColor,
    n: u32,
) -> Result<ChipStack, TableError> {
    exchange(dealer, player, color, n, true)
}

/// The opposite trade: break chips down into smaller denominations.
pub fn break_down(
    dealer: &mut Player,
    player: &mut Player,
    color: ChipColor,
    n: u32,
) -> Result<ChipStack, TableError> {
    exchange(dealer, player, color, n, false)
}

/// Whether half of a bet can be settled exactly with the denominations in
/// play: the half must be whole dollars, or at least $2.50 so the Pink chip
/// can carry the fraction. Surrender is only offered when this holds.
pub fn half_refund_payable(bet_cents: u64) -> bool {
    let half = bet_cents / 2;
    half % 100 == 0 || half >= 250
}

/// Surrenders a hand: the whole bet goes to the tray, then half comes back.
/// Returns the amount forfeited.
pub fn surrender_half(
    dealer: &mut Player,
    player: &mut Player,
    seat: SeatName,
    hand: usize,
) -> Result<Money, TableError> {
    let name = player.name.clone();
    let amount;
    {
        let spot = player
            .seat_mut(seat)
            .and_then(|s| s.hands.get_mut(hand))
            .filter(|s| s.has_bet())
            .ok_or(TableError::MissingBet { player: name, seat })?;
        amount = spot.bet_cents;
        spot.bet.drain_into(&mut dealer.chips);
        spot.bet_cents = 0;
    }
    let half = amount / 2;
    pay_from_tray(dealer, player, half)?;
    Ok(Money(amount - half))
}
