//! Turn-based selection and matching rules.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    catalog::{LessonCatalog, LessonDefinition},
    deck::build_deck,
    error::GameError,
    progress::{LessonResult, ProgressTracker},
};

use super::models::GameSession;

/// Coarse state of the active lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LessonPhase {
    /// No card clicked yet.
    Idle,
    /// Started and not every pair found.
    Playing,
    /// Every card matched.
    Complete,
}

/// Result of judging a two-card attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOutcome {
    /// Both cards belong to the same entry.
    Match,
    /// The cards belong to different entries.
    Mismatch,
}

/// Handle for the deferred end of a reveal window.
///
/// Redeemed through [`TurnEngine::finish_reveal`]; a ticket issued before a
/// reset or lesson switch no longer applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTicket {
    generation: u64,
    move_index: u32,
}

impl RevealTicket {
    /// Session generation the ticket belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What a card click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing changed apart from possibly starting the clock.
    Ignored,
    /// First card of the turn picked.
    Selected,
    /// Second card picked and the pair judged. The caller must redeem the
    /// ticket after the reveal delay.
    Evaluated {
        /// Match or mismatch.
        outcome: PairOutcome,
        /// Whether this pair finished the lesson.
        completed_lesson: bool,
        /// Deferred reveal reset.
        reveal: RevealTicket,
    },
}

/// Owns the lesson catalog, the current [`GameSession`] and lesson progress.
#[derive(Debug, Clone)]
pub struct TurnEngine {
    catalog: LessonCatalog,
    session: GameSession,
    progress: ProgressTracker,
    generation: u64,
}

impl TurnEngine {
    /// Start on the first lesson of `catalog`.
    pub fn new(catalog: LessonCatalog) -> Result<Self, GameError> {
        let deck = build_deck(catalog.lesson_at(0)?);
        let progress = ProgressTracker::new(catalog.len());
        Ok(Self {
            session: GameSession::new(0, deck, 0),
            catalog,
            progress,
            generation: 0,
        })
    }

    /// Lessons available to play.
    pub fn catalog(&self) -> &LessonCatalog {
        &self.catalog
    }

    /// The current attempt.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Completed lessons.
    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// The lesson being played.
    pub fn active_lesson(&self) -> &LessonDefinition {
        // The session index is only ever set from a validated lookup.
        &self.catalog.lessons()[self.session.lesson_index]
    }

    /// Idle, playing or complete.
    pub fn phase(&self) -> LessonPhase {
        if self.session.is_complete() {
            LessonPhase::Complete
        } else if self.session.is_started() {
            LessonPhase::Playing
        } else {
            LessonPhase::Idle
        }
    }

    /// Every card of the active lesson is matched.
    pub fn is_lesson_complete(&self) -> bool {
        self.session.is_complete()
    }

    /// Handle a click on the card with `card_id`.
    pub fn on_card_click(&mut self, card_id: &str) -> ClickOutcome {
        if !self.session.deck.contains(card_id) {
            return ClickOutcome::Ignored;
        }

        if self.session.clock.start() {
            debug!(lesson = self.session.lesson_index, "Session clock started");
        }

        let session = &mut self.session;
        if session.checking
            || session.matched.contains(card_id)
            || session.selected.iter().any(|id| id == card_id)
        {
            return ClickOutcome::Ignored;
        }

        session.selected.push(card_id.to_string());
        if session.selected.len() < 2 {
            return ClickOutcome::Selected;
        }

        session.checking = true;
        session.move_count += 1;
        self.evaluate_pair()
    }

    fn evaluate_pair(&mut self) -> ClickOutcome {
        let session = &mut self.session;
        let (first, second) = (session.selected[0].clone(), session.selected[1].clone());
        let is_match = match (session.deck.get(&first), session.deck.get(&second)) {
            (Some(a), Some(b)) => a.pairs_with(b),
            _ => false,
        };

        let reveal = RevealTicket {
            generation: session.generation,
            move_index: session.move_count,
        };

        if !is_match {
            debug!(first = %first, second = %second, moves = session.move_count, "Pair mismatched");
            session.mismatched = vec![first, second];
            return ClickOutcome::Evaluated {
                outcome: PairOutcome::Mismatch,
                completed_lesson: false,
                reveal,
            };
        }

        debug!(first = %first, second = %second, moves = session.move_count, "Pair matched");
        session.matched.insert(first);
        session.matched.insert(second);
        session.mismatched.clear();

        let completed_lesson = session.is_complete();
        if completed_lesson {
            let lesson_index = session.lesson_index;
            let result = LessonResult {
                moves: session.move_count,
                elapsed_seconds: session.clock.elapsed_seconds(),
                completed_at: Utc::now(),
            };
            info!(
                lesson = lesson_index,
                moves = result.moves,
                elapsed = %session.clock.formatted(),
                "Lesson completed"
            );
            self.progress.record_completion(lesson_index, result);
        }

        ClickOutcome::Evaluated {
            outcome: PairOutcome::Match,
            completed_lesson,
            reveal,
        }
    }

    /// End the reveal window for `ticket`: clear the selection and the
    /// mismatch marker and accept input again.
    ///
    /// Returns false, leaving state untouched, for a ticket that belongs to an
    /// earlier session or turn.
    pub fn finish_reveal(&mut self, ticket: RevealTicket) -> bool {
        let session = &mut self.session;
        if ticket.generation != session.generation
            || ticket.move_index != session.move_count
            || !session.checking
        {
            debug!(
                ticket_generation = ticket.generation,
                generation = session.generation,
                "Ignoring stale reveal"
            );
            return false;
        }

        session.selected.clear();
        session.mismatched.clear();
        session.checking = false;
        true
    }

    /// Count one clock second for the session identified by `generation`.
    pub fn tick(&mut self, generation: u64) -> bool {
        if generation != self.session.generation {
            return false;
        }
        let complete = self.session.is_complete();
        self.session.clock.tick(complete)
    }

    /// Whether the clock should currently be ticking.
    pub fn clock_running(&self) -> bool {
        self.session.clock_running()
    }

    /// Start the active lesson over with a fresh shuffle.
    pub fn reset(&mut self) {
        self.restart(self.session.lesson_index);
        info!(lesson = self.session.lesson_index, "Lesson reset");
    }

    /// Switch to the lesson at `index` and start it fresh.
    pub fn select_lesson(&mut self, index: usize) -> Result<(), GameError> {
        self.catalog.lesson_at(index)?;
        self.restart(index);
        info!(lesson = index, title = %self.active_lesson().title, "Lesson selected");
        Ok(())
    }

    /// Move on to the lesson after the active one.
    pub fn advance(&mut self) -> Result<usize, GameError> {
        let next = self.progress.advance(self.session.lesson_index)?;
        self.select_lesson(next)?;
        Ok(next)
    }

    fn restart(&mut self, index: usize) {
        self.generation += 1;
        let deck = build_deck(&self.catalog.lessons()[index]);
        self.session = GameSession::new(index, deck, self.generation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{definition_card_id, term_card_id};

    fn engine() -> TurnEngine {
        TurnEngine::new(LessonCatalog::builtin()).expect("builtin catalog")
    }

    fn redeem(engine: &mut TurnEngine, outcome: ClickOutcome) {
        match outcome {
            ClickOutcome::Evaluated { reveal, .. } => assert!(engine.finish_reveal(reveal)),
            other => panic!("expected evaluation, got {other:?}"),
        }
    }

    fn match_pair(engine: &mut TurnEngine, term: &str) -> ClickOutcome {
        assert_eq!(
            engine.on_card_click(&term_card_id(term)),
            ClickOutcome::Selected
        );
        engine.on_card_click(&definition_card_id(term))
    }

    #[test]
    fn first_lesson_scenario_completes() {
        let mut engine = engine();
        assert_eq!(engine.session().deck().len(), 8);
        assert_eq!(engine.phase(), LessonPhase::Idle);

        let outcome = match_pair(&mut engine, "Computer");
        assert!(matches!(
            outcome,
            ClickOutcome::Evaluated {
                outcome: PairOutcome::Match,
                completed_lesson: false,
                ..
            }
        ));
        assert_eq!(engine.session().matched_count(), 2);
        assert_eq!(engine.session().move_count(), 1);
        assert!(engine.session().mismatched().is_empty());
        assert_eq!(engine.phase(), LessonPhase::Playing);
        redeem(&mut engine, outcome);

        for term in ["Mouse", "Keyboard"] {
            let outcome = match_pair(&mut engine, term);
            redeem(&mut engine, outcome);
        }
        assert!(!engine.is_lesson_complete());

        let outcome = match_pair(&mut engine, "Monitor");
        assert!(matches!(
            outcome,
            ClickOutcome::Evaluated {
                completed_lesson: true,
                ..
            }
        ));
        assert_eq!(engine.session().matched_count(), 8);
        assert!(engine.is_lesson_complete());
        assert_eq!(engine.phase(), LessonPhase::Complete);
        assert_eq!(engine.progress().completed_indices(), vec![0]);
        assert_eq!(engine.progress().result(0).map(|r| r.moves), Some(4));
        redeem(&mut engine, outcome);
    }

    #[test]
    fn wrong_pair_is_revealed_then_cleared() {
        let mut engine = engine();
        engine.on_card_click("term-Computer");
        let outcome = engine.on_card_click("def-Monitor");
        assert!(matches!(
            outcome,
            ClickOutcome::Evaluated {
                outcome: PairOutcome::Mismatch,
                ..
            }
        ));
        assert_eq!(
            engine.session().mismatched(),
            ["term-Computer".to_string(), "def-Monitor".to_string()]
        );
        assert_eq!(engine.session().move_count(), 1);
        assert_eq!(engine.session().matched_count(), 0);
        assert!(engine.session().is_checking());

        redeem(&mut engine, outcome);
        assert!(engine.session().selected().is_empty());
        assert!(engine.session().mismatched().is_empty());
        assert!(!engine.session().is_checking());

        let retry = match_pair(&mut engine, "Computer");
        assert!(matches!(
            retry,
            ClickOutcome::Evaluated {
                outcome: PairOutcome::Match,
                ..
            }
        ));
        assert_eq!(engine.session().move_count(), 2);
    }

    #[test]
    fn clicks_during_reveal_are_ignored() {
        let mut engine = engine();
        engine.on_card_click("term-Computer");
        engine.on_card_click("def-Monitor");

        assert_eq!(engine.on_card_click("term-Mouse"), ClickOutcome::Ignored);
        assert_eq!(engine.session().selected().len(), 2);
        assert_eq!(engine.session().move_count(), 1);
    }

    #[test]
    fn repeated_and_matched_clicks_change_nothing() {
        let mut engine = engine();
        assert_eq!(engine.on_card_click("term-Keyboard"), ClickOutcome::Selected);
        assert_eq!(engine.on_card_click("term-Keyboard"), ClickOutcome::Ignored);
        assert_eq!(engine.session().selected(), ["term-Keyboard".to_string()]);
        assert_eq!(engine.session().move_count(), 0);

        let outcome = engine.on_card_click("def-Keyboard");
        redeem(&mut engine, outcome);

        let before = engine.session().clone();
        assert_eq!(engine.on_card_click("def-Keyboard"), ClickOutcome::Ignored);
        let after = engine.session();
        assert_eq!(after.selected(), before.selected());
        assert_eq!(after.matched(), before.matched());
        assert_eq!(after.mismatched(), before.mismatched());
        assert_eq!(after.move_count(), 1);
    }

    #[test]
    fn unknown_cards_are_ignored() {
        let mut engine = engine();
        assert_eq!(engine.on_card_click("term-Printer"), ClickOutcome::Ignored);
        assert!(!engine.session().is_started());
    }

    #[test]
    fn single_click_starts_clock_without_counting_a_move() {
        let mut engine = engine();
        let generation = engine.session().generation();
        assert!(!engine.tick(generation));

        engine.on_card_click("term-Mouse");
        assert!(engine.session().is_started());
        assert_eq!(engine.session().move_count(), 0);
        assert!(engine.clock_running());

        assert!(engine.tick(generation));
        assert!(engine.tick(generation));
        assert_eq!(engine.session().elapsed_seconds(), 2);
        assert_eq!(engine.session().formatted_elapsed(), "0:02");
    }

    #[test]
    fn clock_stops_when_lesson_completes() {
        let mut engine = engine();
        let generation = engine.session().generation();
        for term in ["Computer", "Monitor", "Keyboard", "Mouse"] {
            let outcome = match_pair(&mut engine, term);
            if !engine.is_lesson_complete() {
                assert!(engine.tick(generation));
            }
            redeem(&mut engine, outcome);
        }
        assert_eq!(engine.session().elapsed_seconds(), 3);
        let elapsed = engine.session().elapsed_seconds();
        assert!(!engine.clock_running());
        assert!(!engine.tick(generation));
        assert_eq!(engine.session().elapsed_seconds(), elapsed);
    }

    #[test]
    fn reset_discards_attempt_and_stale_timers() {
        let mut engine = engine();
        let old_generation = engine.session().generation();
        engine.on_card_click("term-Computer");
        engine.tick(old_generation);
        let outcome = engine.on_card_click("def-Mouse");
        let ClickOutcome::Evaluated { reveal, .. } = outcome else {
            panic!("expected evaluation");
        };

        engine.reset();
        let session = engine.session();
        assert_eq!(session.move_count(), 0);
        assert_eq!(session.elapsed_seconds(), 0);
        assert!(!session.is_started());
        assert!(!session.is_checking());
        assert!(session.selected().is_empty());
        assert!(session.mismatched().is_empty());
        assert_eq!(session.matched_count(), 0);
        assert_eq!(session.deck().len(), 8);
        assert_ne!(session.generation(), old_generation);

        engine.on_card_click("term-Keyboard");
        assert!(!engine.finish_reveal(reveal));
        assert_eq!(engine.session().selected(), ["term-Keyboard".to_string()]);
        assert!(!engine.tick(old_generation));
        assert_eq!(engine.session().elapsed_seconds(), 0);
    }

    #[test]
    fn select_lesson_switches_and_validates() {
        let mut engine = engine();
        engine.on_card_click("term-Computer");

        assert_eq!(
            engine.select_lesson(5),
            Err(GameError::Index { index: 5, len: 4 })
        );
        assert_eq!(engine.session().lesson_index(), 0);
        assert_eq!(engine.session().selected(), ["term-Computer".to_string()]);

        let old_generation = engine.session().generation();
        assert!(engine.tick(old_generation));
        assert!(engine.tick(old_generation));
        assert_eq!(engine.session().elapsed_seconds(), 2);

        engine.select_lesson(2).expect("valid lesson");
        assert_eq!(engine.session().elapsed_seconds(), 0);
        assert!(!engine.session().is_started());
        assert!(!engine.tick(old_generation));
        assert_eq!(engine.session().elapsed_seconds(), 0);
        assert_eq!(engine.session().lesson_index(), 2);
        assert_eq!(engine.active_lesson().title, "Essential Shortcuts");
        assert_eq!(engine.session().deck().len(), 12);
        assert!(engine.session().selected().is_empty());
        assert_eq!(engine.phase(), LessonPhase::Idle);
    }

    #[test]
    fn completing_twice_keeps_single_progress_entry() {
        let mut engine = engine();
        for _ in 0..2 {
            for term in ["Computer", "Monitor", "Keyboard", "Mouse"] {
                let outcome = match_pair(&mut engine, term);
                redeem(&mut engine, outcome);
            }
            assert!(engine.is_lesson_complete());
            engine.reset();
        }
        assert_eq!(engine.progress().completed_indices(), vec![0]);
    }

    #[test]
    fn advance_moves_to_next_lesson_until_last() {
        let mut engine = engine();
        assert_eq!(engine.advance(), Ok(1));
        assert_eq!(engine.session().lesson_index(), 1);
        engine.select_lesson(3).expect("last lesson");
        assert_eq!(engine.advance(), Err(GameError::Index { index: 4, len: 4 }));
        assert_eq!(engine.session().lesson_index(), 3);
    }
}
