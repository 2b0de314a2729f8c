//! Lesson completion tracking.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Score of the first successful run through a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonResult {
    /// Two-card attempts used.
    pub moves: u32,
    /// Clock value when the last pair matched.
    pub elapsed_seconds: u64,
    /// Wall-clock time of completion.
    pub completed_at: DateTime<Utc>,
}

/// Append-only record of completed lessons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressTracker {
    lesson_count: usize,
    completed: BTreeSet<usize>,
    results: BTreeMap<usize, LessonResult>,
}

impl ProgressTracker {
    /// Tracker for a catalog holding `lesson_count` lessons.
    pub fn new(lesson_count: usize) -> Self {
        Self {
            lesson_count,
            completed: BTreeSet::new(),
            results: BTreeMap::new(),
        }
    }

    /// Mark a lesson as completed. Returns false if it already was.
    pub fn record_completion(&mut self, lesson_index: usize, result: LessonResult) -> bool {
        if !self.completed.insert(lesson_index) {
            return false;
        }
        self.results.insert(lesson_index, result);
        true
    }

    /// Whether the lesson has been completed at least once.
    pub fn is_completed(&self, lesson_index: usize) -> bool {
        self.completed.contains(&lesson_index)
    }

    /// Whether a lesson follows `lesson_index` in the catalog.
    pub fn has_next(&self, lesson_index: usize) -> bool {
        lesson_index + 1 < self.lesson_count
    }

    /// Index of the lesson after `lesson_index`.
    pub fn advance(&self, lesson_index: usize) -> Result<usize, GameError> {
        if !self.has_next(lesson_index) {
            return Err(GameError::Index {
                index: lesson_index + 1,
                len: self.lesson_count,
            });
        }
        Ok(lesson_index + 1)
    }

    /// Completed lesson indices in ascending order.
    pub fn completed_indices(&self) -> Vec<usize> {
        self.completed.iter().copied().collect()
    }

    /// Result stored on first completion, if any.
    pub fn result(&self, lesson_index: usize) -> Option<&LessonResult> {
        self.results.get(&lesson_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(moves: u32) -> LessonResult {
        LessonResult {
            moves,
            elapsed_seconds: 30,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn recording_is_idempotent() {
        let mut tracker = ProgressTracker::new(4);
        assert!(tracker.record_completion(0, result(4)));
        assert!(!tracker.record_completion(0, result(9)));
        assert_eq!(tracker.completed_indices(), vec![0]);
        assert_eq!(tracker.result(0).map(|r| r.moves), Some(4));
        assert!(tracker.is_completed(0));
        assert!(!tracker.is_completed(1));
    }

    #[test]
    fn advance_stops_at_last_lesson() {
        let tracker = ProgressTracker::new(4);
        assert!(tracker.has_next(0));
        assert_eq!(tracker.advance(2), Ok(3));
        assert!(!tracker.has_next(3));
        assert_eq!(tracker.advance(3), Err(GameError::Index { index: 4, len: 4 }));
    }
}
