use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use old_maid::{
    Match,
    entities::{Card, ConnectionId, Deck, DeckConfig, Nickname, RoomId},
    functional::remove_pairs,
};
use rand::{SeedableRng, rngs::StdRng};
use std::{hint::black_box, time::Duration};

fn shuffled_cards(config: &DeckConfig, seed: u64) -> Vec<Card> {
    let mut deck = Deck::new(config);
    deck.shuffle(&mut StdRng::seed_from_u64(seed));
    deck.into_cards()
}

/// Deal a fresh match with four seats
fn setup_match(config: &DeckConfig, seed: u64) -> Match {
    let players = ["a", "b", "c", "d"]
        .iter()
        .map(|name| (ConnectionId::new(), Nickname::new(name)))
        .collect();
    Match::start(
        RoomId::from("room_bench"),
        players,
        Deck::from_cards(shuffled_cards(config, seed)),
        StdRng::seed_from_u64(seed),
        Duration::from_secs(15),
    )
    .unwrap()
}

/// Benchmark pair removal on a dealt hand and on a whole deck
fn bench_remove_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove_pairs");

    for n_cards in [14, 53] {
        let cards: Vec<Card> = shuffled_cards(&DeckConfig::standard(), 7)
            .into_iter()
            .take(n_cards)
            .collect();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{n_cards}_cards")),
            &cards,
            |b, cards| b.iter(|| remove_pairs(black_box(cards))),
        );
    }

    group.finish();
}

/// Benchmark shuffling a standard deck
fn bench_deck_shuffle(c: &mut Criterion) {
    let config = DeckConfig::standard();
    let mut rng = StdRng::seed_from_u64(1);
    c.bench_function("deck_shuffle", |b| {
        b.iter(|| {
            let mut deck = Deck::new(&config);
            deck.shuffle(&mut rng);
            deck
        });
    });
}

/// Benchmark a complete match played out by timeouts
fn bench_full_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_match");

    for (name, config) in [
        ("quick", DeckConfig::quick()),
        ("standard", DeckConfig::standard()),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &config, |b, config| {
            b.iter_batched(
                || setup_match(config, 42),
                |mut game| {
                    while !game.is_over() {
                        game.take_timeout_turn().unwrap();
                        game.drain_events().for_each(drop);
                    }
                    game
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(hand_reduction, bench_remove_pairs, bench_deck_shuffle);

criterion_group!(match_operations, bench_full_match);

criterion_main!(hand_reduction, match_operations);
