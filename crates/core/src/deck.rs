//! Card deck construction for a single lesson.

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::catalog::LessonDefinition;

/// Which side of an entry a card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    /// Shows the term.
    Term,
    /// Shows the definition.
    Definition,
}

/// A face-up card on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Stable identifier: `term-<term>` or `def-<term>`.
    pub id: String,
    /// Text displayed on the card.
    pub content: String,
    /// Term or definition side.
    pub kind: CardKind,
    /// The entry's term; two cards match iff their pair keys are equal.
    pub pair_key: String,
}

impl Card {
    /// Card showing the term of an entry.
    pub fn term(term: &str) -> Self {
        Self {
            id: term_card_id(term),
            content: term.to_string(),
            kind: CardKind::Term,
            pair_key: term.to_string(),
        }
    }

    /// Card showing the definition of an entry.
    pub fn definition(term: &str, definition: &str) -> Self {
        Self {
            id: definition_card_id(term),
            content: definition.to_string(),
            kind: CardKind::Definition,
            pair_key: term.to_string(),
        }
    }

    /// True when both cards belong to the same entry.
    pub fn pairs_with(&self, other: &Card) -> bool {
        self.pair_key == other.pair_key
    }
}

/// Identifier of the term card for `term`.
pub fn term_card_id(term: &str) -> String {
    format!("term-{term}")
}

/// Identifier of the definition card for `term`.
pub fn definition_card_id(term: &str) -> String {
    format!("def-{term}")
}

/// Shuffled cards of the active lesson.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Cards in board order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Find a card by id.
    pub fn get(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    /// Whether a card with this id is on the board.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Total number of cards.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// True for a deck with no cards.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate cards in board order.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}

/// Build a freshly shuffled deck for `lesson` using the thread-local RNG.
pub fn build_deck(lesson: &LessonDefinition) -> Deck {
    build_deck_with(lesson, &mut rand::rng())
}

/// Build a deck for `lesson`, shuffling with the supplied RNG.
pub fn build_deck_with<R: Rng + ?Sized>(lesson: &LessonDefinition, rng: &mut R) -> Deck {
    let mut cards = Vec::with_capacity(lesson.entries.len() * 2);
    cards.extend(lesson.entries.iter().map(|entry| Card::term(&entry.term)));
    cards.extend(
        lesson
            .entries
            .iter()
            .map(|entry| Card::definition(&entry.term, &entry.definition)),
    );
    cards.shuffle(rng);
    Deck { cards }
}
