//! Pure helpers shared by the match state machine.

use std::collections::HashMap;

use super::entities::{Card, SeatIndex, Value};

/// Collapse a hand so that every value held an even number of times is
/// gone and every value held an odd number of times appears once.
///
/// The card kept for an odd value is its first occurrence, and kept cards
/// stay in input order. The joker is never matched, so it always survives.
#[must_use]
pub fn remove_pairs(cards: &[Card]) -> Vec<Card> {
    let mut counts: HashMap<Value, usize> = HashMap::new();
    for card in cards {
        *counts.entry(card.rank()).or_insert(0) += 1;
    }

    let mut kept: HashMap<Value, bool> = HashMap::with_capacity(counts.len());
    cards
        .iter()
        .filter(|card| {
            let rank = card.rank();
            if counts[&rank] % 2 == 0 {
                return false;
            }
            let seen = kept.entry(rank).or_insert(false);
            !std::mem::replace(seen, true)
        })
        .copied()
        .collect()
}

/// Scan clockwise from `from` for the first seat holding cards.
///
/// With `skip_from` set the scan starts at the seat after `from` and
/// never returns `from` itself; otherwise `from` is checked first.
#[must_use]
pub fn next_occupied_seat(counts: &[usize], from: SeatIndex, skip_from: bool) -> Option<SeatIndex> {
    let n = counts.len();
    if n == 0 {
        return None;
    }
    let start = usize::from(skip_from);
    (start..n)
        .map(|offset| (from + offset) % n)
        .find(|&seat| counts[seat] > 0)
}

/// Seats that still hold at least one card.
#[must_use]
pub fn survivors(counts: &[usize]) -> Vec<SeatIndex> {
    counts
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .map(|(seat, _)| seat)
        .collect()
}
