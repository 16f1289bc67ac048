use pitboss_engine::errors::TableError;
use pitboss_engine::logger::{RoundLogger, RoundRecord, SeatOutcome};
use pitboss_engine::rules::{
    BlackjackRatio, DoublingRule, SeventeenRule, SideBetOffer, SplittingRule, TableRules,
};
use pitboss_engine::sidebets::SideBetKind;

#[test]
fn the_default_preset_is_the_standard_casino_table() {
    let rules = TableRules::default();
    rules.validate().unwrap();
    assert_eq!(rules.num_decks, 6);
    assert_eq!(rules.min_bet_cents, 500);
    assert_eq!(rules.max_bet_cents, 10_000);
    assert_eq!(rules.blackjack_ratio, BlackjackRatio::ThreeToTwo);
    assert_eq!(rules.seventeen_rule, SeventeenRule::S17);
    assert!(rules.side_bets.is_empty());
}

#[test]
fn rule_validation_rejects_bad_presets() {
    let bad_decks = TableRules {
        num_decks: 5,
        ..TableRules::default()
    };
    assert!(matches!(
        bad_decks.validate(),
        Err(TableError::InvalidDeckCount { .. })
    ));

    let narrow_spread = TableRules {
        min_bet_cents: 5_000,
        max_bet_cents: 10_000,
        ..TableRules::default()
    };
    assert!(matches!(
        narrow_spread.validate(),
        Err(TableError::InvalidRules { .. })
    ));

    let too_many_side_bets = TableRules {
        side_bets: vec![
            SideBetOffer::standard(SideBetKind::PerfectPairs),
            SideBetOffer::standard(SideBetKind::LuckyLadies),
            SideBetOffer::standard(SideBetKind::BusterBlackjack),
        ],
        ..TableRules::default()
    };
    assert!(matches!(
        too_many_side_bets.validate(),
        Err(TableError::InvalidRules { .. })
    ));

    let fractional_min = TableRules {
        min_bet_cents: 150,
        ..TableRules::default()
    };
    assert!(fractional_min.validate().is_err());
}

#[test]
fn seventeen_rules_differ_exactly_at_seventeen() {
    assert!(SeventeenRule::S17.dealer_stands_on(17));
    assert!(SeventeenRule::S17.dealer_stands_on(20));
    assert!(!SeventeenRule::S17.dealer_stands_on(16));
    assert!(!SeventeenRule::H17.dealer_stands_on(17));
    assert!(SeventeenRule::H17.dealer_stands_on(18));
}

#[test]
fn doubling_and_splitting_rule_tables() {
    assert!(DoublingRule::DA2.allows_total(5));
    assert!(DoublingRule::D9.allows_total(9));
    assert!(DoublingRule::D9.allows_total(11));
    assert!(!DoublingRule::D9.allows_total(8));
    assert!(!DoublingRule::D10.allows_total(9));
    assert!(DoublingRule::D10.allows_total(10));
    assert_eq!(SplittingRule::SP2.max_hands(), 2);
    assert_eq!(SplittingRule::SP4.max_hands(), 4);
}

fn sample_record() -> RoundRecord {
    RoundRecord {
        round: 3,
        pen: Some(65),
        dealer_up: Some("KD".to_string()),
        dealer_hand: vec!["KD".to_string(), "9C".to_string()],
        dealer_score: Some("19".to_string()),
        seats: vec![SeatOutcome {
            player: "Alex".to_string(),
            seat: "center seat".to_string(),
            position: 2,
            cards: vec!["KD".to_string(), "QH".to_string()],
            score: Some("20".to_string()),
            outcome: "win".to_string(),
            bet_cents: 500,
            net_cents: 500,
        }],
        reshuffle: false,
        ts: None,
    }
}

#[test]
fn round_records_round_trip_through_json() {
    let record = sample_record();
    let line = serde_json::to_string(&record).unwrap();
    let back: RoundRecord = serde_json::from_str(&line).unwrap();
    assert_eq!(back, record);
}

#[test]
fn the_logger_writes_one_timestamped_line_per_round() {
    let path = std::env::temp_dir().join(format!(
        "pitboss_round_log_{}.jsonl",
        std::process::id()
    ));
    let mut logger = RoundLogger::create(&path).unwrap();
    logger.write(&sample_record()).unwrap();
    logger.write(&sample_record()).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        let rec: RoundRecord = serde_json::from_str(line).unwrap();
        assert!(rec.ts.is_some(), "timestamp injected at write time");
        assert_eq!(rec.round, 3);
    }
    let _ = std::fs::remove_file(&path);
}

#[test]
fn a_disabled_logger_swallows_records() {
    let mut logger = RoundLogger::disabled();
    logger.write(&sample_record()).unwrap();
}
