use pitboss_engine::cards::Card;
use pitboss_engine::chips::{ChipColor, Money};
use pitboss_engine::errors::TableError;
use pitboss_engine::hand::HandScore;
use pitboss_engine::input::{JoinRequest, ScriptedInput, TurnAction};
use pitboss_engine::player::SeatName;
use pitboss_engine::rules::{JoinRule, SideBetOffer, TableRules};
use pitboss_engine::sidebets::SideBetKind;
use pitboss_engine::table::{BlackjackTable, GameState};

fn one_deck_rules() -> TableRules {
    TableRules {
        num_decks: 1,
        min_bet_cents: 100,
        max_bet_cents: 10_000,
        ..TableRules::default()
    }
}

fn rig(table: &mut BlackjackTable<'_>, codes: &[&str]) {
    let cards: Vec<Card> = codes
        .iter()
        .map(|c| Card::from_code(c).expect("valid card code"))
        .collect();
    table
        .shoe_mut()
        .stack_top(&cards)
        .expect("rig cards available");
}

/// Steps WAITING → STARTING → SHUFFLING, leaving the table at BETTING with
/// a freshly cut shoe ready to be rigged.
fn step_to_betting(table: &mut BlackjackTable<'_>) {
    table.step().unwrap(); // WAITING
    table.step().unwrap(); // STARTING
    table.step().unwrap(); // SHUFFLING
    assert_eq!(table.state(), GameState::Betting);
}

#[test]
fn dealer_nineteen_vs_player_twenty_reaches_players_playing() {
    let mut input = ScriptedInput::new()
        .join(JoinRequest::single("Alex", 2))
        .flat_bet(ChipColor::Red, 1)
        .actions(&[TurnAction::Stand]);
    let mut out: Vec<u8> = Vec::new();
    let mut table = BlackjackTable::new(one_deck_rules(), Some(42), &mut input, &mut out).unwrap();

    step_to_betting(&mut table);
    rig(&mut table, &["KD", "JH", "QH", "9C"]);
    table.step().unwrap(); // BETTING
    table.step().unwrap(); // DEALING
    table.step().unwrap(); // PRE_SCORING
    table.step().unwrap(); // INITIAL_SCORING
    assert_eq!(table.state(), GameState::PlayersPlaying);

    let player = table.player("Alex").unwrap();
    assert_eq!(
        player.seat(SeatName::Center).unwrap().hands[0].score,
        Some(HandScore::Value(20))
    );
    assert_eq!(
        table.dealer().seat(SeatName::Center).unwrap().hands[0].score,
        Some(HandScore::Value(19))
    );

    table.play_round().unwrap();
    assert_eq!(table.rounds_completed(), 1);
    // $5 stake returned plus $5 winnings
    assert_eq!(table.player("Alex").unwrap().balance(), Money(50_500));
    assert_eq!(table.dealer().balance(), Money(664_350_000 - 500));
    assert_eq!(table.state(), GameState::Betting);
}

#[test]
fn dealer_blackjack_collects_losing_mains_and_ends_the_round() {
    let mut input = ScriptedInput::new()
        .join(JoinRequest::single("Alex", 2))
        .flat_bet(ChipColor::Red, 1);
    let mut out: Vec<u8> = Vec::new();
    let mut table = BlackjackTable::new(one_deck_rules(), Some(42), &mut input, &mut out).unwrap();

    step_to_betting(&mut table);
    rig(&mut table, &["KD", "JH", "QH", "AC"]);
    table.step().unwrap(); // BETTING
    table.step().unwrap(); // DEALING
    table.step().unwrap(); // PRE_SCORING
    table.step().unwrap(); // INITIAL_SCORING ends the round at once

    assert_eq!(table.rounds_completed(), 1);
    assert_eq!(table.state(), GameState::Betting);
    assert_eq!(table.player("Alex").unwrap().balance(), Money(49_500));
    assert_eq!(table.dealer().balance(), Money(664_350_000 + 500));
    assert!(!table.player("Alex").unwrap().has_cards_in_play());
}

#[test]
fn player_natural_pays_three_to_two_and_round_ends_without_dealer_play() {
    let mut input = ScriptedInput::new()
        .join(JoinRequest::single("Alex", 2))
        .flat_bet(ChipColor::Red, 1);
    let mut out: Vec<u8> = Vec::new();
    let mut table = BlackjackTable::new(one_deck_rules(), Some(5), &mut input, &mut out).unwrap();

    step_to_betting(&mut table);
    rig(&mut table, &["AH", "9C", "JC", "7D"]);
    table.play_round().unwrap();

    // $5 bet pays $7.50; the dealer's 16 never plays out
    assert_eq!(table.player("Alex").unwrap().balance(), Money(50_750));
    assert_eq!(table.dealer().balance(), Money(664_350_000 - 750));
    assert_eq!(
        table.dealer().seat(SeatName::Center).unwrap().hands[0]
            .cards
            .len(),
        0
    );
    assert_eq!(table.rounds_completed(), 1);
}

#[test]
fn player_natural_pushes_against_dealer_blackjack() {
    let mut input = ScriptedInput::new()
        .join(JoinRequest::single("Alex", 2))
        .flat_bet(ChipColor::Red, 1);
    let mut out: Vec<u8> = Vec::new();
    let mut table = BlackjackTable::new(one_deck_rules(), Some(5), &mut input, &mut out).unwrap();

    step_to_betting(&mut table);
    rig(&mut table, &["AH", "KD", "JC", "AC"]);
    table.play_round().unwrap();

    assert_eq!(table.player("Alex").unwrap().balance(), Money(50_000));
    assert_eq!(table.dealer().balance(), Money(664_350_000));
    assert_eq!(table.rounds_completed(), 1);
}

#[test]
fn hitting_into_a_bust_loses_the_bet_immediately() {
    let mut input = ScriptedInput::new()
        .join(JoinRequest::single("Alex", 2))
        .flat_bet(ChipColor::Red, 1)
        .actions(&[TurnAction::Hit]);
    let mut out: Vec<u8> = Vec::new();
    let mut table = BlackjackTable::new(one_deck_rules(), Some(8), &mut input, &mut out).unwrap();

    step_to_betting(&mut table);
    rig(&mut table, &["KD", "5H", "QH", "9C", "7S"]);
    table.play_round().unwrap();

    assert_eq!(table.player("Alex").unwrap().balance(), Money(49_500));
    assert_eq!(table.dealer().balance(), Money(664_350_000 + 500));
    assert_eq!(table.rounds_completed(), 1);
}

#[test]
fn doubling_down_wins_double_the_stake() {
    let mut input = ScriptedInput::new()
        .join(JoinRequest::single("Alex", 2))
        .flat_bet(ChipColor::Blue, 1)
        .actions(&[TurnAction::Double]);
    let mut out: Vec<u8> = Vec::new();
    let mut table = BlackjackTable::new(one_deck_rules(), Some(8), &mut input, &mut out).unwrap();

    step_to_betting(&mut table);
    // 6+5 doubles into an 8 for 19 against the dealer's 17
    rig(&mut table, &["6H", "KH", "5C", "7C", "8D"]);
    table.play_round().unwrap();

    assert_eq!(table.player("Alex").unwrap().balance(), Money(52_000));
    assert_eq!(table.dealer().balance(), Money(664_350_000 - 2_000));
}

#[test]
fn splitting_a_pair_plays_two_separately_staked_hands() {
    let mut input = ScriptedInput::new()
        .join(JoinRequest::single("Alex", 2))
        .flat_bet(ChipColor::Blue, 1)
        .actions(&[TurnAction::Split, TurnAction::Stand, TurnAction::Stand]);
    let mut out: Vec<u8> = Vec::new();
    let mut table = BlackjackTable::new(one_deck_rules(), Some(13), &mut input, &mut out).unwrap();

    step_to_betting(&mut table);
    // split eights draw 5 and 6; both hands then lose to the dealer's 17
    rig(&mut table, &["8H", "KH", "8C", "7C", "5D", "6D"]);
    table.play_round().unwrap();

    assert_eq!(table.player("Alex").unwrap().balance(), Money(48_000));
    assert_eq!(table.dealer().balance(), Money(664_350_000 + 2_000));
    assert_eq!(table.rounds_completed(), 1);
}

#[test]
fn unavailable_actions_are_rejected_and_reprompted() {
    let mut input = ScriptedInput::new()
        .join(JoinRequest::single("Alex", 2))
        .flat_bet(ChipColor::Red, 1)
        .actions(&[TurnAction::Split, TurnAction::Stand]);
    let mut out: Vec<u8> = Vec::new();
    let mut table = BlackjackTable::new(one_deck_rules(), Some(42), &mut input, &mut out).unwrap();

    step_to_betting(&mut table);
    rig(&mut table, &["KD", "JH", "QH", "9C"]);
    table.step().unwrap(); // BETTING
    table.step().unwrap(); // DEALING
    table.step().unwrap(); // PRE_SCORING
    table.step().unwrap(); // INITIAL_SCORING
    assert_eq!(table.state(), GameState::PlayersPlaying);

    // K-Q is not a pair: the split is refused and the state re-entered
    table.step().unwrap();
    assert_eq!(table.state(), GameState::PlayersPlaying);

    table.play_round().unwrap();
    assert_eq!(table.rounds_completed(), 1);
    let narration = String::from_utf8(out.clone()).unwrap();
    assert!(narration.contains("not available"));
}

#[test]
fn reshuffle_triggers_only_at_round_end_with_the_sentinel_in_discard() {
    let rules = TableRules {
        pen_override: Some(1),
        ..one_deck_rules()
    };
    let mut input = ScriptedInput::new()
        .join(JoinRequest::single("Alex", 2))
        .flat_bet(ChipColor::Red, 1)
        .actions(&[TurnAction::Stand]);
    let mut out: Vec<u8> = Vec::new();
    let mut table = BlackjackTable::new(rules, Some(42), &mut input, &mut out).unwrap();

    // with 1% penetration the front cut card passes during the first deal
    table.play_round().unwrap();
    assert_eq!(table.rounds_completed(), 1);
    assert_eq!(table.state(), GameState::Shuffling);
    assert!(table.shoe().reshuffle_due());
}

#[test]
fn a_round_with_no_stakes_ends_trivially() {
    let mut input = ScriptedInput::new().join(JoinRequest::single("Alex", 2));
    let mut out: Vec<u8> = Vec::new();
    let mut table = BlackjackTable::new(one_deck_rules(), Some(42), &mut input, &mut out).unwrap();

    step_to_betting(&mut table);
    table.step().unwrap(); // BETTING with an empty circle sits the seat out
    assert_eq!(table.rounds_completed(), 1);
    assert_eq!(table.state(), GameState::Betting);
    assert_eq!(table.player("Alex").unwrap().balance(), Money(50_000));
}

#[test]
fn taken_positions_are_rejected_and_the_joiner_reprompted() {
    let mut input = ScriptedInput::new()
        .join(JoinRequest::single("Alex", 2))
        .join(JoinRequest::single("Jim", 2))
        .join(JoinRequest::single("Jim", 3));
    let mut out: Vec<u8> = Vec::new();
    let mut table = BlackjackTable::new(one_deck_rules(), Some(42), &mut input, &mut out).unwrap();

    table.step().unwrap(); // WAITING
    table.step().unwrap(); // STARTING
    assert_eq!(
        table.player("Alex").unwrap().occupied_position(SeatName::Center),
        Some(2)
    );
    assert_eq!(
        table.player("Jim").unwrap().occupied_position(SeatName::Center),
        Some(3)
    );
    assert_eq!(table.known_players(), &["Alex".to_string(), "Jim".to_string()]);
    let narration = String::from_utf8(out.clone()).unwrap();
    assert!(narration.contains("already taken"));
}

#[test]
fn a_three_seat_player_plays_each_seat_independently() {
    let mut input = ScriptedInput::new()
        .join(JoinRequest {
            name: "Ada".to_string(),
            center: 4,
            take_right: true,
            take_left: true,
        })
        .flat_bet(ChipColor::Red, 1)
        .flat_bet(ChipColor::Red, 1)
        .flat_bet(ChipColor::Red, 1)
        .actions(&[TurnAction::Stand, TurnAction::Stand, TurnAction::Stand]);
    let mut out: Vec<u8> = Vec::new();
    let mut table = BlackjackTable::new(one_deck_rules(), Some(17), &mut input, &mut out).unwrap();

    step_to_betting(&mut table);
    let ada = table.player("Ada").unwrap();
    assert_eq!(ada.occupied_position(SeatName::Right), Some(3));
    assert_eq!(ada.occupied_position(SeatName::Center), Some(4));
    assert_eq!(ada.occupied_position(SeatName::Left), Some(5));

    // deal order: right, center, left, dealer, then again
    rig(
        &mut table,
        &["2H", "3H", "4H", "KH", "7D", "8D", "9D", "7C"],
    );
    table.play_round().unwrap();

    // 9, 11 and 13 all lose to the dealer's 17
    assert_eq!(table.player("Ada").unwrap().balance(), Money(48_500));
    assert_eq!(table.dealer().balance(), Money(664_350_000 + 1_500));
}

#[test]
fn no_mid_shoe_entry_refuses_joins_once_the_shoe_is_running() {
    let mut input = ScriptedInput::new()
        .join(JoinRequest::single("Alex", 2))
        .flat_bet(ChipColor::Red, 1)
        .actions(&[TurnAction::Stand]);
    let mut out: Vec<u8> = Vec::new();
    let mut table = BlackjackTable::new(one_deck_rules(), Some(42), &mut input, &mut out).unwrap();
    table.play_round().unwrap();
    assert_eq!(table.state(), GameState::Betting);

    let result = table.try_join(JoinRequest::single("Jim", 5));
    assert!(matches!(result, Err(TableError::JoinRestricted)));
    assert!(table.player("Jim").is_none());
}

#[test]
fn open_tables_accept_joins_between_rounds() {
    let rules = TableRules {
        join_rule: JoinRule::Open,
        ..one_deck_rules()
    };
    let mut input = ScriptedInput::new()
        .join(JoinRequest::single("Alex", 2))
        .flat_bet(ChipColor::Red, 1)
        .actions(&[TurnAction::Stand]);
    let mut out: Vec<u8> = Vec::new();
    let mut table = BlackjackTable::new(rules, Some(42), &mut input, &mut out).unwrap();
    table.play_round().unwrap();
    assert_eq!(table.state(), GameState::Betting);

    table.try_join(JoinRequest::single("Jim", 5)).unwrap();
    assert_eq!(
        table.player("Jim").unwrap().occupied_position(SeatName::Center),
        Some(5)
    );
}

#[test]
fn perfect_pairs_settles_before_the_hole_card_matters() {
    let rules = TableRules {
        side_bets: vec![SideBetOffer::standard(SideBetKind::PerfectPairs)],
        ..one_deck_rules()
    };
    let mut input = ScriptedInput::new()
        .join(JoinRequest::single("Alex", 2))
        .flat_bet(ChipColor::Blue, 1)
        .side_bet(ChipColor::White, 1)
        .actions(&[TurnAction::Stand]);
    let mut out: Vec<u8> = Vec::new();
    let mut table = BlackjackTable::new(rules, Some(23), &mut input, &mut out).unwrap();

    step_to_betting(&mut table);
    // 8H/8D is a colored pair (10x); the 16 then loses to the dealer's 17
    rig(&mut table, &["8H", "KH", "8D", "7C"]);
    table.play_round().unwrap();

    // -$10 main, +$10 side: dead even
    assert_eq!(table.player("Alex").unwrap().balance(), Money(50_000));
    assert_eq!(table.dealer().balance(), Money(664_350_000));
}

#[test]
fn lucky_ladies_deferred_tier_resolves_without_dealer_blackjack() {
    let rules = TableRules {
        num_decks: 2,
        min_bet_cents: 100,
        max_bet_cents: 10_000,
        side_bets: vec![SideBetOffer::standard(SideBetKind::LuckyLadies)],
        ..TableRules::default()
    };
    let mut input = ScriptedInput::new()
        .join(JoinRequest::single("Alex", 2))
        .flat_bet(ChipColor::Red, 1)
        .side_bet(ChipColor::White, 1)
        .actions(&[TurnAction::Stand]);
    let mut out: Vec<u8> = Vec::new();
    let mut table = BlackjackTable::new(rules, Some(31), &mut input, &mut out).unwrap();

    step_to_betting(&mut table);
    // paired Queens of Hearts needs a two-deck shoe
    rig(&mut table, &["QH", "KD", "QH", "9C"]);
    table.play_round().unwrap();

    // 25x on $1 Lucky Ladies, plus the 20-beats-19 main win
    assert_eq!(table.player("Alex").unwrap().balance(), Money(53_000));
    assert_eq!(table.dealer().balance(), Money(664_350_000 - 3_000));
}

#[test]
fn lucky_ladies_top_tier_pays_through_a_dealer_blackjack() {
    let rules = TableRules {
        num_decks: 2,
        min_bet_cents: 100,
        max_bet_cents: 10_000,
        side_bets: vec![SideBetOffer::standard(SideBetKind::LuckyLadies)],
        ..TableRules::default()
    };
    let mut input = ScriptedInput::new()
        .join(JoinRequest::single("Alex", 2))
        .flat_bet(ChipColor::Red, 1)
        .side_bet(ChipColor::White, 1);
    let mut out: Vec<u8> = Vec::new();
    let mut table = BlackjackTable::new(rules, Some(31), &mut input, &mut out).unwrap();

    step_to_betting(&mut table);
    rig(&mut table, &["QH", "KD", "QH", "AC"]);
    table.play_round().unwrap();

    // -$5 main to the blackjack, +$200 on the deferred top tier
    assert_eq!(table.player("Alex").unwrap().balance(), Money(69_500));
    assert_eq!(table.rounds_completed(), 1);
}

/// Chips only ever move between the player's pool, the circles, and the
/// dealer's tray, so at round boundaries (all circles empty) the two
/// balances sum to a constant no matter how the rounds went.
#[test]
fn chip_totals_are_conserved_across_whole_rounds() {
    let mut input = ScriptedInput::new()
        .join(JoinRequest::single("Alex", 2))
        .flat_bet(ChipColor::Red, 2)
        .actions(&[TurnAction::Stand])
        .flat_bet(ChipColor::Blue, 1)
        .actions(&[TurnAction::Stand]);
    let mut out: Vec<u8> = Vec::new();
    let mut table = BlackjackTable::new(one_deck_rules(), Some(99), &mut input, &mut out).unwrap();

    const TOTAL: u64 = 50_000 + 664_350_000;
    table.play_round().unwrap();
    assert_eq!(
        table.player("Alex").unwrap().balance().cents() + table.dealer().balance().cents(),
        TOTAL
    );
    table.play_round().unwrap();
    assert_eq!(
        table.player("Alex").unwrap().balance().cents() + table.dealer().balance().cents(),
        TOTAL
    );
    assert_eq!(table.rounds_completed(), 2);
}
