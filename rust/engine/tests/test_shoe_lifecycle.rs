use pitboss_engine::cards::{reference_deck, Card, ShoeCard};
use pitboss_engine::errors::TableError;
use pitboss_engine::shoe::{pen_bounds, Shoe};

fn assert_conserved(shoe: &Shoe, num_decks: usize) {
    for card in reference_deck() {
        assert_eq!(
            shoe.copies_in_play(card),
            num_decks,
            "card {} should have exactly {} copies across shoe and discard",
            card,
            num_decks
        );
    }
}

#[test]
fn invalid_deck_counts_are_rejected() {
    for decks in [0u8, 3, 5, 7, 9, 52] {
        assert!(matches!(
            Shoe::new(decks, None),
            Err(TableError::InvalidDeckCount { .. })
        ));
    }
    for decks in [1u8, 2, 4, 6, 8] {
        assert!(Shoe::new(decks, None).is_ok());
    }
}

#[test]
fn single_deck_shoe_is_shuffled_cut_and_burned_at_random_pen() {
    let mut shoe = Shoe::new(1, Some(7)).unwrap();
    let pen = shoe.shuffle_cut_and_burn(None).unwrap();
    // one sentinel consumed by nothing yet: 52 cards + 2 sentinels - 1 burn
    assert_eq!(shoe.len(), 1 + 52);
    assert!((50..70).contains(&pen), "pen {} out of bounds", pen);
    assert_eq!(shoe.cards().last(), Some(&ShoeCard::BackCut));
    assert!(shoe.cards().contains(&ShoeCard::FrontCut));
    assert_eq!(shoe.discard().len(), 1);
    assert_conserved(&shoe, 1);
}

#[test]
fn eight_deck_shoe_is_shuffled_cut_and_burned_at_random_pen() {
    let mut shoe = Shoe::new(8, Some(11)).unwrap();
    let pen = shoe.shuffle_cut_and_burn(None).unwrap();
    assert_eq!(shoe.len(), 1 + 52 * 8);
    assert!((70..90).contains(&pen), "pen {} out of bounds", pen);
    assert_eq!(shoe.cards().last(), Some(&ShoeCard::BackCut));
    assert_conserved(&shoe, 8);
}

/// Front-cut placement at the exact bound percentages, per deck count. The
/// index is measured after the burn card has come off the top.
#[test]
fn front_cut_card_lands_at_exact_penetration_indices() {
    let cases: [(u8, u8, usize); 10] = [
        (1, 50, 26),
        (1, 70, 36),
        (2, 55, 57),
        (2, 75, 78),
        (4, 60, 124),
        (4, 80, 166),
        (6, 65, 202),
        (6, 85, 265),
        (8, 70, 291),
        (8, 90, 374),
    ];
    for (decks, pen, expected_index) in cases {
        let mut shoe = Shoe::new(decks, Some(3)).unwrap();
        let chosen = shoe.shuffle_cut_and_burn(Some(pen)).unwrap();
        assert_eq!(chosen, pen);
        assert_eq!(shoe.pen(), Some(pen));
        assert_eq!(shoe.len(), 1 + 52 * decks as usize);
        assert_eq!(
            shoe.cards()[expected_index],
            ShoeCard::FrontCut,
            "{} decks at {}% should put the front cut card at index {}",
            decks,
            pen,
            expected_index
        );
        assert_eq!(shoe.cards().last(), Some(&ShoeCard::BackCut));
        assert_conserved(&shoe, decks as usize);
    }
}

#[test]
fn same_seed_produces_the_same_shoe() {
    let mut a = Shoe::new(6, Some(12345)).unwrap();
    let mut b = Shoe::new(6, Some(12345)).unwrap();
    a.shuffle_cut_and_burn(None).unwrap();
    b.shuffle_cut_and_burn(None).unwrap();
    assert_eq!(a.cards(), b.cards());
    assert_eq!(a.pen(), b.pen());
}

#[test]
fn different_seeds_produce_different_shoes() {
    let mut a = Shoe::new(6, Some(1)).unwrap();
    let mut b = Shoe::new(6, Some(2)).unwrap();
    a.shuffle_cut_and_burn(None).unwrap();
    b.shuffle_cut_and_burn(None).unwrap();
    assert_ne!(a.cards(), b.cards());
}

#[test]
fn drawing_slides_the_front_cut_card_to_discard() {
    let mut shoe = Shoe::new(1, Some(9)).unwrap();
    shoe.shuffle_cut_and_burn(Some(50)).unwrap();
    // 26 cards sit ahead of the marker after the burn
    for _ in 0..26 {
        shoe.draw().unwrap();
    }
    assert!(!shoe.reshuffle_due());
    // the next draw finds the marker at the head, slides it, and still
    // returns a real card
    let card = shoe.draw().unwrap();
    assert!(Card::from_code(&card.code()).is_some());
    assert!(shoe.reshuffle_due());
    assert!(shoe.discard().contains(&ShoeCard::FrontCut));
}

#[test]
fn reshuffle_merges_discard_back_and_conserves_cards() {
    let mut shoe = Shoe::new(1, Some(21)).unwrap();
    shoe.shuffle_cut_and_burn(Some(50)).unwrap();
    let mut drawn = Vec::new();
    for _ in 0..30 {
        drawn.push(shoe.draw().unwrap());
    }
    assert!(shoe.reshuffle_due());
    shoe.discard_all(drawn);
    shoe.shuffle_cut_and_burn(None).unwrap();
    assert_eq!(shoe.len(), 1 + 52);
    assert_eq!(shoe.discard().len(), 1);
    assert_conserved(&shoe, 1);
    assert!(!shoe.reshuffle_due());
}

#[test]
fn stack_top_rigs_draw_order_without_breaking_conservation() {
    let mut shoe = Shoe::new(1, Some(4)).unwrap();
    shoe.shuffle_cut_and_burn(Some(60)).unwrap();
    let want = [
        Card::from_code("KD").unwrap(),
        Card::from_code("JH").unwrap(),
        Card::from_code("QH").unwrap(),
        Card::from_code("9C").unwrap(),
    ];
    shoe.stack_top(&want).unwrap();
    for &expected in &want {
        assert_eq!(shoe.draw().unwrap(), expected);
    }
    assert_conserved(&shoe, 1);
}

#[test]
fn stack_top_rejects_cards_not_in_the_shoe() {
    let mut shoe = Shoe::new(1, Some(4)).unwrap();
    shoe.shuffle_cut_and_burn(Some(60)).unwrap();
    // a drawn card sits in a hand: it is in neither the shoe nor discard
    let in_hand = shoe.draw().unwrap();
    assert!(matches!(
        shoe.stack_top(&[in_hand]),
        Err(TableError::CardNotInShoe { .. })
    ));
}

#[test]
fn pen_bounds_match_the_deck_count_table() {
    assert_eq!(pen_bounds(1), Some((50, 70)));
    assert_eq!(pen_bounds(2), Some((55, 75)));
    assert_eq!(pen_bounds(4), Some((60, 80)));
    assert_eq!(pen_bounds(6), Some((65, 85)));
    assert_eq!(pen_bounds(8), Some((70, 90)));
    assert_eq!(pen_bounds(3), None);
}
