/// Integration tests for match flow scenarios
///
/// These tests drive the synchronous match state machine directly: dealing,
/// target and card auto-correction, termination and the equivalence of the
/// timeout path with an explicit empty action.
use old_maid::{
    Match, MatchOutcome, Phase, Rejection, TurnOutcome,
    entities::{Card, ConnectionId, Deck, DeckConfig, Nickname, RoomId, Suit},
    messages::{GameOver, OutcomeKind, Outbound, Recipient, ServerEvent},
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::time::Duration;

const NAMES: [&str; 4] = ["alice", "bob", "carol", "dave"];

fn players() -> Vec<(ConnectionId, Nickname)> {
    NAMES
        .iter()
        .map(|name| (ConnectionId::new(), Nickname::new(name)))
        .collect()
}

fn start(cards: Vec<Card>, seed: u64) -> (Match, Vec<ConnectionId>) {
    let players = players();
    let ids = players.iter().map(|(id, _)| *id).collect();
    let game = Match::start(
        RoomId::from("room_flow"),
        players,
        Deck::from_cards(cards),
        StdRng::seed_from_u64(seed),
        Duration::from_secs(15),
    )
    .unwrap();
    (game, ids)
}

fn shuffled(config: &DeckConfig, seed: u64) -> Vec<Card> {
    let mut deck = Deck::new(config);
    deck.shuffle(&mut StdRng::seed_from_u64(seed));
    deck.into_cards()
}

fn s(value: u8) -> Card {
    Card(value, Suit::Spade)
}

fn h(value: u8) -> Card {
    Card(value, Suit::Heart)
}

fn total_cards(game: &Match) -> usize {
    game.counts().iter().sum()
}

#[test]
fn test_lone_joker_holder_loses_on_first_action() {
    // Seat 3 is dealt only the joker; everything else pairs off during the deal.
    let cards = vec![s(1), s(2), s(3), Card::JOKER, h(1), h(2), h(3)];
    let (mut game, ids) = start(cards, 0);

    assert_eq!(game.counts(), vec![0, 0, 0, 1]);
    assert_eq!(game.hand(3).unwrap(), &[Card::JOKER]);
    assert_eq!(game.turn(), 3);

    let outcome = game.take_turn(&ids[3], None, None).unwrap();
    assert_eq!(outcome, TurnOutcome::Finished(MatchOutcome::Loser(3)));
    assert_eq!(game.phase(), Phase::Terminal(MatchOutcome::Loser(3)));

    game.drain_events().for_each(drop);
    game.announce_outcome();
    let events: Vec<Outbound> = game.drain_events().collect();
    assert_eq!(
        events[0].event,
        ServerEvent::GameOver(GameOver {
            loser: Some(Nickname::new("dave")),
            outcome: OutcomeKind::Loser,
        })
    );
}

#[test]
fn test_empty_target_is_replaced_with_next_clockwise() {
    // Seat 0: 1, 5. Seat 1: 2 pairs off. Seat 2: 3, 6. Seat 3: joker, 4.
    let cards = vec![s(1), s(2), s(3), Card::JOKER, s(5), h(2), s(6), s(4)];
    let (mut game, ids) = start(cards, 0);
    assert_eq!(game.counts(), vec![2, 0, 2, 2]);

    let outcome = game.take_turn(&ids[0], Some(1), Some(0)).unwrap();
    assert_eq!(outcome, TurnOutcome::Continued { next_turn: 2 });
    assert_eq!(game.hand(0).unwrap(), &[s(1), s(5), s(3)]);
    assert_eq!(game.hand(2).unwrap(), &[s(6)]);
    assert_eq!(game.counts()[1], 0);
}

#[test]
fn test_out_of_range_target_is_replaced() {
    let (mut game, ids) = start(shuffled(&DeckConfig::standard(), 11), 11);
    let actor = game.turn();
    let before = game.counts();

    game.take_turn(&ids[actor], Some(99), None).unwrap();

    let after = game.counts();
    let donor = (1..4).map(|offset| (actor + offset) % 4).find(|&s| before[s] > 0).unwrap();
    assert_eq!(after[donor], before[donor] - 1);
}

#[test]
fn test_out_of_range_card_index_draws_random_valid_card() {
    for seed in 0..50 {
        let (mut game, ids) = start(shuffled(&DeckConfig::standard(), seed), seed);
        let actor = game.turn();
        let before = game.counts();
        let outcome = game.take_turn(&ids[actor], None, Some(usize::MAX)).unwrap();
        assert!(!matches!(outcome, TurnOutcome::Rejected(_)));

        let after = game.counts();
        let donor = (1..4)
            .map(|offset| (actor + offset) % 4)
            .find(|&s| before[s] > 0)
            .unwrap();
        assert_eq!(after[donor], before[donor] - 1);
        // The drawn card either paired (actor -1) or was kept (actor +1).
        assert!(after[actor] == before[actor] + 1 || after[actor] + 1 == before[actor]);
    }
}

#[test]
fn test_action_out_of_turn_is_ignored() {
    let (mut game, ids) = start(shuffled(&DeckConfig::standard(), 3), 3);
    game.drain_events().for_each(drop);
    let other = (game.turn() + 1) % 4;
    let before = game.snapshot();

    assert_eq!(
        game.take_turn(&ids[other], None, None).unwrap(),
        TurnOutcome::Rejected(Rejection::NotYourTurn)
    );
    assert_eq!(
        game.take_turn(&ConnectionId::new(), None, None).unwrap(),
        TurnOutcome::Rejected(Rejection::NotYourTurn)
    );
    assert_eq!(game.snapshot(), before);
    assert_eq!(game.drain_events().count(), 0);
}

#[test]
fn test_timeout_matches_explicit_empty_action() {
    for seed in 0..25 {
        let cards = shuffled(&DeckConfig::standard(), seed);
        let (mut timed_out, _) = start(cards.clone(), seed);
        let (mut explicit, _) = start(cards, seed);

        // Connection ids differ between the two; everything else must not.
        while !timed_out.is_over() {
            let a = timed_out.take_timeout_turn().unwrap();
            let actor = explicit.current_connection();
            let b = explicit.take_turn(&actor, None, None).unwrap();
            assert_eq!(a, b);

            let events_a: Vec<_> = timed_out.drain_events().collect();
            let events_b: Vec<_> = explicit.drain_events().collect();
            assert_eq!(events_a, events_b);
            assert_eq!(timed_out.counts(), explicit.counts());
            assert_eq!(timed_out.turn(), explicit.turn());
            for seat in 0..4 {
                assert_eq!(timed_out.hand(seat), explicit.hand(seat));
            }
        }
        assert!(explicit.is_over());
    }
}

#[test]
fn test_random_play_keeps_turn_on_a_non_empty_hand() {
    for seed in 0..200 {
        let config = if seed % 2 == 0 {
            DeckConfig::standard()
        } else {
            DeckConfig::quick()
        };
        let (mut game, ids) = start(shuffled(&config, seed), seed);
        let mut chooser = StdRng::seed_from_u64(seed ^ 0xdead_beef);
        let mut steps = 0;

        loop {
            assert!(
                game.hand(game.turn()).is_some_and(|hand| !hand.is_empty()),
                "seed {seed}: turn on empty seat {}",
                game.turn()
            );
            let actor = game.turn();
            let before_total = total_cards(&game);
            let target = chooser.random_bool(0.7).then(|| chooser.random_range(0..6));
            let card = chooser.random_bool(0.7).then(|| chooser.random_range(0..20));

            match game.take_turn(&ids[actor], target, card).unwrap() {
                TurnOutcome::Continued { next_turn } => {
                    assert_ne!(next_turn, actor, "seed {seed}: actor went twice");
                    assert_eq!(game.turn_seq(), steps + 1);
                }
                TurnOutcome::Finished(outcome) => {
                    let MatchOutcome::Loser(loser) = outcome else {
                        panic!("seed {seed}: unexpected outcome {outcome:?}");
                    };
                    assert_eq!(game.hand(loser).unwrap(), &[Card::JOKER]);
                    break;
                }
                TurnOutcome::Rejected(reason) => panic!("seed {seed}: rejected {reason:?}"),
            }

            // A draw moves one card and may remove one pair.
            let after_total = total_cards(&game);
            assert!(after_total == before_total || after_total + 2 == before_total);
            steps += 1;
            assert!(steps < 10_000, "seed {seed}: match never ended");
        }
    }
}

#[test]
fn test_state_update_never_leaks_other_hands() {
    let (mut game, ids) = start(shuffled(&DeckConfig::standard(), 8), 8);
    let actor = game.turn();
    game.drain_events().for_each(drop);
    game.take_turn(&ids[actor], None, None).unwrap();

    let events: Vec<_> = game.drain_events().collect();
    for outbound in events {
        match (&outbound.to, &outbound.event) {
            (Recipient::Seat(seat), ServerEvent::StateUpdate(update)) => {
                assert_eq!(update.my_hand, game.hand(*seat).unwrap());
                assert_eq!(update.player_counts, game.counts());
            }
            (Recipient::Seat(seat), ServerEvent::CardDrawnAnimate(_)) => {
                assert_eq!(*seat, actor);
            }
            (Recipient::Room, ServerEvent::ActionLog(_) | ServerEvent::TimerReset(_)) => {}
            (to, event) => panic!("unexpected {} to {to:?}", event.name()),
        }
    }
}

#[test]
fn test_terminal_transition_sends_final_state_without_timer() {
    let cards = vec![s(1), s(2), s(3), Card::JOKER, h(1), h(2), h(3)];
    let (mut game, ids) = start(cards, 0);
    game.drain_events().for_each(drop);

    game.take_turn(&ids[3], None, None).unwrap();
    let names: Vec<_> = game.drain_events().map(|o| o.event.name()).collect();
    assert_eq!(
        names,
        vec![
            "action_log",
            "state_update",
            "state_update",
            "state_update",
            "state_update"
        ]
    );
}
