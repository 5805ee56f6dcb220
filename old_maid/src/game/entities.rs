use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use super::{constants, functional};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
    // The joker's suit. Nothing else is dealt with it.
    Wild,
}

impl Suit {
    /// Suits used when a deck holds `n` copies of every value. Two-copy
    /// decks use one red and one black suit.
    fn first(n: usize) -> &'static [Suit] {
        static ALL: [Suit; 4] = [Suit::Spade, Suit::Heart, Suit::Club, Suit::Diamond];
        &ALL[..n.min(ALL.len())]
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
            Self::Wild => "",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values.
pub type Value = u8;

/// A card is a value (ace=1u8 ... king=13u8) and a suit. The joker is
/// depicted as `0u8` with the wild suit.
///
/// Only the value matters for pairing; the suit is cosmetic.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Card(pub Value, pub Suit);

impl Card {
    pub const JOKER: Card = Card(constants::JOKER_VALUE, Suit::Wild);

    /// The pairing key.
    #[must_use]
    pub fn rank(&self) -> Value {
        self.0
    }

    #[must_use]
    pub fn is_joker(&self) -> bool {
        self.0 == constants::JOKER_VALUE
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_joker() {
            return write!(f, "JOKER");
        }
        let value = match self.0 {
            1 => "A",
            11 => "J",
            12 => "Q",
            13 => "K",
            v => &v.to_string(),
        };
        write!(f, "{}{value}", self.1)
    }
}

// Clients render cards straight from their labels, so cards go over the
// wire as display strings rather than tuples.
impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for Card {
    type Err = String;

    /// Parse a display label such as `♠A`, `♥10` or `JOKER`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "JOKER" {
            return Ok(Self::JOKER);
        }
        let mut chars = s.chars();
        let suit = match chars.next() {
            Some('♣') => Suit::Club,
            Some('♠') => Suit::Spade,
            Some('♦') => Suit::Diamond,
            Some('♥') => Suit::Heart,
            _ => return Err(format!("unknown suit in card '{s}'")),
        };
        let value = match chars.as_str() {
            "A" => 1,
            "J" => 11,
            "Q" => 12,
            "K" => 13,
            label => match label.parse::<Value>() {
                Ok(v @ 2..=10) => v,
                _ => return Err(format!("unknown value in card '{s}'")),
            },
        };
        Ok(Self(value, suit))
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Shape of the deck generated for each match.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DeckConfig {
    /// Values `1..=max_value` are dealt.
    pub max_value: Value,
    /// Copies of every value. Must be even so every value can pair off.
    pub suits_per_value: usize,
}

impl DeckConfig {
    /// 13 values in four suits plus the joker: 53 cards.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            max_value: 13,
            suits_per_value: 4,
        }
    }

    /// Values 1 through 5 in two suits plus the joker: 11 cards.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            max_value: 5,
            suits_per_value: 2,
        }
    }

    /// Total number of cards, joker included.
    #[must_use]
    pub fn size(&self) -> usize {
        self.max_value as usize * self.suits_per_value + 1
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_value == 0 || self.max_value > 13 {
            return Err("Deck values must span 1 to at most 13".to_string());
        }

        if !matches!(self.suits_per_value, 2 | 4) {
            return Err(format!(
                "Each value needs 2 or 4 copies, got {}",
                self.suits_per_value
            ));
        }

        Ok(())
    }

    /// Parse a preset name (`standard` or `quick`).
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "standard" => Some(Self::standard()),
            "quick" => Some(Self::quick()),
            _ => None,
        }
    }
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Build the unshuffled deck: the joker followed by every value in
    /// every configured suit.
    #[must_use]
    pub fn new(config: &DeckConfig) -> Self {
        let mut cards = Vec::with_capacity(config.size());
        cards.push(Card::JOKER);
        for value in 1..=config.max_value {
            for &suit in Suit::first(config.suits_per_value) {
                cards.push(Card(value, suit));
            }
        }
        Self { cards }
    }

    /// A deck dealt in exactly the given order.
    #[must_use]
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// Fisher-Yates shuffle.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }
}

/// The ordered cards held by one seat.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Hand(Vec<Card>);

impl Hand {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, card: Card) {
        self.0.push(card);
    }

    /// Remove and return the card at `index`, if there is one.
    pub fn take(&mut self, index: usize) -> Option<Card> {
        (index < self.0.len()).then(|| self.0.remove(index))
    }

    #[must_use]
    pub fn contains_rank(&self, rank: Value) -> bool {
        self.0.iter().any(|card| card.rank() == rank)
    }

    /// Drop every pair, keeping the relative order of what's left.
    pub fn reduce_pairs(&mut self) {
        self.0 = functional::remove_pairs(&self.0);
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Card>> for Hand {
    fn from(cards: Vec<Card>) -> Self {
        Self(cards)
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Nickname(String);

impl Nickname {
    pub fn new(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Self(constants::DEFAULT_NICKNAME.to_string());
        }
        let nickname: String = trimmed
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .take(constants::MAX_NICKNAME_LEN)
            .collect();
        Self(nickname)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Nickname {
    fn default() -> Self {
        Self(constants::DEFAULT_NICKNAME.to_string())
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for Nickname {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<String> for Nickname {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<Option<String>> for Nickname {
    fn from(value: Option<String>) -> Self {
        value.map(Self::from).unwrap_or_default()
    }
}

/// Type alias for seat positions within a room.
pub type SeatIndex = usize;

/// Identity of one client connection, assigned by the transport.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Fresh `room_<uuid>` identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("room_{}", Uuid::new_v4().simple()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RoomId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
