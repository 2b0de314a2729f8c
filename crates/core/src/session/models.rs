use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{clock::SessionClock, deck::Deck};

/// Mutable state of one attempt at a lesson.
///
/// A new value is created whenever the lesson changes or the player resets,
/// so nothing here outlives an attempt except through [`crate::ProgressTracker`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub(crate) lesson_index: usize,
    pub(crate) deck: Deck,
    pub(crate) selected: Vec<String>,
    pub(crate) matched: HashSet<String>,
    pub(crate) mismatched: Vec<String>,
    pub(crate) checking: bool,
    pub(crate) move_count: u32,
    pub(crate) clock: SessionClock,
    pub(crate) generation: u64,
}

impl GameSession {
    pub(crate) fn new(lesson_index: usize, deck: Deck, generation: u64) -> Self {
        Self {
            lesson_index,
            deck,
            selected: Vec::with_capacity(2),
            matched: HashSet::new(),
            mismatched: Vec::with_capacity(2),
            checking: false,
            move_count: 0,
            clock: SessionClock::default(),
            generation,
        }
    }

    /// Index of the active lesson in the catalog.
    pub fn lesson_index(&self) -> usize {
        self.lesson_index
    }

    /// Cards of the active lesson in board order.
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Card ids picked this turn, in click order.
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// Whether a card id has already been matched.
    pub fn is_matched(&self, card_id: &str) -> bool {
        self.matched.contains(card_id)
    }

    /// Number of matched cards (always even).
    pub fn matched_count(&self) -> usize {
        self.matched.len()
    }

    /// Matched card ids, in board order.
    pub fn matched(&self) -> Vec<&str> {
        self.deck
            .iter()
            .filter(|card| self.matched.contains(&card.id))
            .map(|card| card.id.as_str())
            .collect()
    }

    /// The two ids of the last failed attempt, or empty.
    pub fn mismatched(&self) -> &[String] {
        &self.mismatched
    }

    /// True while a judged pair is on display and input is blocked.
    pub fn is_checking(&self) -> bool {
        self.checking
    }

    /// Completed two-card attempts.
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Whether the first click of the session has happened.
    pub fn is_started(&self) -> bool {
        self.clock.is_started()
    }

    /// Seconds since the first click.
    pub fn elapsed_seconds(&self) -> u64 {
        self.clock.elapsed_seconds()
    }

    /// Elapsed time as `m:ss`.
    pub fn formatted_elapsed(&self) -> String {
        self.clock.formatted()
    }

    /// Counter identifying this attempt; timer events carry it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Every card is matched.
    pub fn is_complete(&self) -> bool {
        self.matched.len() == self.deck.len()
    }

    /// Whether the clock should be ticking.
    pub fn clock_running(&self) -> bool {
        self.clock.is_running(self.is_complete())
    }
}
