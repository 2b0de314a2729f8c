//! Error types for the matching game core.

use thiserror::Error;

/// Failures surfaced by the game state machine.
///
/// Invalid player interactions (clicking a matched card, clicking while a pair
/// is being revealed, ...) are not errors; they are ignored without touching
/// state. Only programmatic misuse ends up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// A lesson index outside the catalog bounds.
    #[error("lesson index {index} out of range (catalog has {len} lessons)")]
    Index {
        /// Requested lesson index.
        index: usize,
        /// Number of lessons in the catalog.
        len: usize,
    },
}

/// Problems found while validating a lesson catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The catalog has no lessons at all.
    #[error("lesson catalog is empty")]
    Empty,

    /// A lesson without any term/definition entries.
    #[error("lesson {id} has no entries")]
    EmptyLesson {
        /// Identifier of the offending lesson.
        id: u32,
    },

    /// Two entries in the same lesson share a term.
    #[error("lesson {id} contains duplicate term '{term}'")]
    DuplicateTerm {
        /// Identifier of the offending lesson.
        id: u32,
        /// The repeated term.
        term: String,
    },

    /// Two lessons share an identifier.
    #[error("duplicate lesson id {id}")]
    DuplicateLessonId {
        /// The repeated identifier.
        id: u32,
    },
}
