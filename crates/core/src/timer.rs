//! Reveal and clock timers backed by tokio tasks.

use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle, time::MissedTickBehavior};
use tracing::debug;

use crate::session::RevealTicket;

/// Default reveal window after a judged pair.
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(1000);
/// Default clock period.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Events emitted by the timer tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// The reveal window for a judged pair has elapsed.
    RevealElapsed(RevealTicket),
    /// One clock period passed for the session with this generation.
    ClockTick {
        /// Session generation the clock was started for.
        generation: u64,
    },
}

struct ClockTask {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Owns the outstanding timer tasks and feeds their events into a channel.
///
/// At most one reveal and one clock task exist at a time. Scheduling a new one
/// aborts its predecessor, and dropping `Timers` aborts both.
pub struct Timers {
    sender: mpsc::Sender<TimerEvent>,
    reveal_delay: Duration,
    tick_interval: Duration,
    reveal: Option<JoinHandle<()>>,
    clock: Option<ClockTask>,
}

impl Timers {
    /// Create timers that report on `sender`.
    pub fn new(
        sender: mpsc::Sender<TimerEvent>,
        reveal_delay: Duration,
        tick_interval: Duration,
    ) -> Self {
        Self {
            sender,
            reveal_delay,
            tick_interval,
            reveal: None,
            clock: None,
        }
    }

    /// Send `RevealElapsed(ticket)` after the reveal delay.
    pub fn schedule_reveal(&mut self, ticket: RevealTicket) {
        self.cancel_reveal();
        let sender = self.sender.clone();
        let delay = self.reveal_delay;
        self.reveal = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = sender.send(TimerEvent::RevealElapsed(ticket)).await;
        }));
    }

    /// Drop the pending reveal, if any.
    pub fn cancel_reveal(&mut self) {
        if let Some(handle) = self.reveal.take() {
            handle.abort();
        }
    }

    /// Whether a reveal task is still waiting.
    pub fn reveal_pending(&self) -> bool {
        self.reveal
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Ensure the clock runs for `generation`, restarting it if it belongs to
    /// an older session.
    pub fn start_clock(&mut self, generation: u64) {
        if self.clock_generation() == Some(generation) {
            return;
        }
        self.stop_clock();

        let sender = self.sender.clone();
        let period = self.tick_interval;
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if sender
                    .send(TimerEvent::ClockTick { generation })
                    .await
                    .is_err()
                {
                    break;
                }
            }
        });
        debug!(generation, "Clock started");
        self.clock = Some(ClockTask { generation, handle });
    }

    /// Abort the clock task.
    pub fn stop_clock(&mut self) {
        if let Some(task) = self.clock.take() {
            task.handle.abort();
            debug!(generation = task.generation, "Clock stopped");
        }
    }

    /// Generation the running clock reports for, if any.
    pub fn clock_generation(&self) -> Option<u64> {
        self.clock
            .as_ref()
            .filter(|task| !task.handle.is_finished())
            .map(|task| task.generation)
    }

    /// Abort every outstanding task.
    pub fn cancel_all(&mut self) {
        self.cancel_reveal();
        self.stop_clock();
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
