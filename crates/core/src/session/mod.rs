//! Game session state and the turn engine driving it.

pub mod engine;
mod models;

pub use engine::{ClickOutcome, LessonPhase, PairOutcome, RevealTicket, TurnEngine};
pub use models::GameSession;
