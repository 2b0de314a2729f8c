#![warn(clippy::all, missing_docs)]

//! Core logic for the pairmatch lesson game.
//!
//! This crate hosts the lesson catalog, deck building, the turn engine with
//! its clock and progress tracking, the timer plumbing that drives deferred
//! transitions, and configuration. Frontends read [`GameSnapshot`]s and feed
//! [`GameEvent`]s back in.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod deck;
pub mod error;
pub mod progress;
pub mod runtime;
pub mod session;
pub mod snapshot;
pub mod timer;

pub use catalog::{LessonCatalog, LessonDefinition, LessonEntry};
pub use clock::{format_elapsed, SessionClock};
pub use config::AppConfig;
pub use deck::{build_deck, build_deck_with, Card, CardKind, Deck};
pub use error::{CatalogError, GameError};
pub use progress::{LessonResult, ProgressTracker};
pub use runtime::{GameEvent, MatchGame};
pub use session::{ClickOutcome, GameSession, LessonPhase, PairOutcome, RevealTicket, TurnEngine};
pub use snapshot::{CardStatus, CardView, GameSnapshot, LessonTab};
pub use timer::{TimerEvent, Timers};
