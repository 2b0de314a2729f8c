//! Serialized event handling on top of [`TurnEngine`] and [`Timers`].

use tracing::debug;

use crate::{
    error::GameError,
    session::{ClickOutcome, TurnEngine},
    snapshot::GameSnapshot,
    timer::{TimerEvent, Timers},
};

/// Inbound events from a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// The player clicked the card with this id.
    CardClicked(String),
    /// The player picked a lesson from the lesson list.
    LessonSelected(usize),
    /// The player asked to start the lesson over.
    ResetRequested,
    /// The player asked to continue with the next lesson.
    NextLesson,
}

/// Single owner of the game state.
///
/// Every state change, whether caused by input or by a timer, goes through
/// `&mut self` on this type, so transitions never overlap.
pub struct MatchGame {
    engine: TurnEngine,
    timers: Timers,
}

impl MatchGame {
    /// Wrap an engine and the timers that drive it.
    pub fn new(engine: TurnEngine, timers: Timers) -> Self {
        Self { engine, timers }
    }

    /// The underlying engine.
    pub fn engine(&self) -> &TurnEngine {
        &self.engine
    }

    /// Current render state.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(&self.engine)
    }

    /// Apply an inbound event.
    pub fn handle(&mut self, event: GameEvent) -> Result<(), GameError> {
        match event {
            GameEvent::CardClicked(card_id) => {
                if let ClickOutcome::Evaluated { reveal, .. } = self.engine.on_card_click(&card_id)
                {
                    self.timers.schedule_reveal(reveal);
                }
            }
            GameEvent::LessonSelected(index) => {
                self.engine.select_lesson(index)?;
                self.timers.cancel_reveal();
            }
            GameEvent::ResetRequested => {
                self.engine.reset();
                self.timers.cancel_reveal();
            }
            GameEvent::NextLesson => {
                self.engine.advance()?;
                self.timers.cancel_reveal();
            }
        }
        self.sync_clock();
        Ok(())
    }

    /// Apply a timer event. Events from an earlier session are dropped.
    pub fn handle_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::RevealElapsed(ticket) => {
                self.engine.finish_reveal(ticket);
            }
            TimerEvent::ClockTick { generation } => {
                if !self.engine.tick(generation) {
                    debug!(generation, "Dropped clock tick");
                }
            }
        }
        self.sync_clock();
    }

    /// Whether the clock task is currently running.
    pub fn clock_active(&self) -> bool {
        self.timers.clock_generation().is_some()
    }

    fn sync_clock(&mut self) {
        if self.engine.clock_running() {
            self.timers.start_clock(self.engine.session().generation());
        } else {
            self.timers.stop_clock();
        }
    }
}
