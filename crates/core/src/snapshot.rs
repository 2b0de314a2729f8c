#![allow(missing_docs)]

//! Read-only view of the game handed to renderers.

use serde::{Deserialize, Serialize};

use crate::{
    deck::CardKind,
    progress::LessonResult,
    session::{LessonPhase, TurnEngine},
};

/// Display status of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardStatus {
    /// Part of a found pair.
    Matched,
    /// Part of the last wrong pair, still on display.
    Mismatched,
    /// Picked this turn.
    Selected,
    /// Anything else.
    Neutral,
}

/// One card as the renderer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub id: String,
    pub content: String,
    pub kind: CardKind,
    pub status: CardStatus,
}

/// Lesson selector entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonTab {
    pub index: usize,
    pub id: u32,
    pub title: String,
    pub completed: bool,
    pub active: bool,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub lesson_index: usize,
    pub lesson_title: String,
    pub lessons: Vec<LessonTab>,
    pub cards: Vec<CardView>,
    pub phase: LessonPhase,
    pub move_count: u32,
    pub elapsed_seconds: u64,
    pub formatted_elapsed: String,
    pub matched_pairs: usize,
    pub total_pairs: usize,
    pub completed_lessons: Vec<usize>,
    pub is_lesson_complete: bool,
    pub has_next_lesson: bool,
    pub checking: bool,
    /// First-completion score of the active lesson, if it has one.
    pub lesson_result: Option<LessonResult>,
}

impl GameSnapshot {
    /// Capture the current state of `engine`.
    pub fn capture(engine: &TurnEngine) -> Self {
        let session = engine.session();
        let progress = engine.progress();
        let lesson = engine.active_lesson();
        let lesson_index = session.lesson_index();

        let cards = session
            .deck()
            .iter()
            .map(|card| {
                let status = if session.is_matched(&card.id) {
                    CardStatus::Matched
                } else if session.mismatched().contains(&card.id) {
                    CardStatus::Mismatched
                } else if session.selected().contains(&card.id) {
                    CardStatus::Selected
                } else {
                    CardStatus::Neutral
                };
                CardView {
                    id: card.id.clone(),
                    content: card.content.clone(),
                    kind: card.kind,
                    status,
                }
            })
            .collect();

        let lessons = engine
            .catalog()
            .iter()
            .enumerate()
            .map(|(index, lesson)| LessonTab {
                index,
                id: lesson.id,
                title: lesson.title.clone(),
                completed: progress.is_completed(index),
                active: index == lesson_index,
            })
            .collect();

        Self {
            lesson_index,
            lesson_title: lesson.title.clone(),
            lessons,
            cards,
            phase: engine.phase(),
            move_count: session.move_count(),
            elapsed_seconds: session.elapsed_seconds(),
            formatted_elapsed: session.formatted_elapsed(),
            matched_pairs: session.matched_count() / 2,
            total_pairs: lesson.pair_count(),
            completed_lessons: progress.completed_indices(),
            is_lesson_complete: session.is_complete(),
            has_next_lesson: progress.has_next(lesson_index),
            checking: session.is_checking(),
            lesson_result: progress.result(lesson_index).cloned(),
        }
    }

    /// Status of the card with `id`, if it is on the board.
    pub fn status_of(&self, id: &str) -> Option<CardStatus> {
        self.cards
            .iter()
            .find(|card| card.id == id)
            .map(|card| card.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::LessonCatalog, session::ClickOutcome};

    #[test]
    fn statuses_follow_turn_state() {
        let mut engine = TurnEngine::new(LessonCatalog::builtin()).expect("engine");
        let snapshot = GameSnapshot::capture(&engine);
        assert_eq!(snapshot.cards.len(), 8);
        assert!(snapshot
            .cards
            .iter()
            .all(|card| card.status == CardStatus::Neutral));
        assert_eq!(snapshot.lesson_title, "Basic Components");
        assert_eq!(snapshot.formatted_elapsed, "0:00");
        assert_eq!(snapshot.phase, LessonPhase::Idle);

        engine.on_card_click("term-Computer");
        let snapshot = GameSnapshot::capture(&engine);
        assert_eq!(snapshot.status_of("term-Computer"), Some(CardStatus::Selected));

        let outcome = engine.on_card_click("def-Monitor");
        let snapshot = GameSnapshot::capture(&engine);
        assert_eq!(
            snapshot.status_of("term-Computer"),
            Some(CardStatus::Mismatched)
        );
        assert_eq!(snapshot.status_of("def-Monitor"), Some(CardStatus::Mismatched));
        assert!(snapshot.checking);
        assert_eq!(snapshot.move_count, 1);

        if let ClickOutcome::Evaluated { reveal, .. } = outcome {
            engine.finish_reveal(reveal);
        }
        engine.on_card_click("term-Monitor");
        engine.on_card_click("def-Monitor");
        let snapshot = GameSnapshot::capture(&engine);
        assert_eq!(snapshot.status_of("term-Monitor"), Some(CardStatus::Matched));
        assert_eq!(snapshot.status_of("def-Monitor"), Some(CardStatus::Matched));
        assert_eq!(snapshot.status_of("term-Computer"), Some(CardStatus::Neutral));
        assert_eq!(snapshot.matched_pairs, 1);
        assert_eq!(snapshot.total_pairs, 4);
    }

    #[test]
    fn lesson_tabs_mark_active_and_completed() {
        let mut engine = TurnEngine::new(LessonCatalog::builtin()).expect("engine");
        for term in ["Computer", "Monitor", "Keyboard", "Mouse"] {
            engine.on_card_click(&format!("term-{term}"));
            if let ClickOutcome::Evaluated { reveal, .. } =
                engine.on_card_click(&format!("def-{term}"))
            {
                engine.finish_reveal(reveal);
            }
        }

        let snapshot = GameSnapshot::capture(&engine);
        assert!(snapshot.is_lesson_complete);
        assert!(snapshot.has_next_lesson);
        assert_eq!(snapshot.completed_lessons, vec![0]);
        assert_eq!(snapshot.lesson_result.as_ref().map(|r| r.moves), Some(4));
        assert!(snapshot.lessons[0].completed && snapshot.lessons[0].active);
        assert!(!snapshot.lessons[1].completed && !snapshot.lessons[1].active);

        engine.select_lesson(3).expect("lesson");
        let snapshot = GameSnapshot::capture(&engine);
        assert!(!snapshot.has_next_lesson);
        assert_eq!(snapshot.completed_lessons, vec![0]);
        assert!(snapshot.lessons[3].active);
    }
}
