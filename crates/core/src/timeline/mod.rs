use std::time::{Duration, Instant};

use crate::{
    animation::AnimationState,
    session::{Session, SessionId, Staleness},
};

/// One scheduled wake-up. Built by a [`Timer`] when its interval elapses and
/// consumed once by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEvent {
    pub fired_at: Instant,
    pub session: Option<SessionId>,
    pub tag: Option<u64>,
}

impl TickEvent {
    pub fn new(session: SessionId, tag: u64) -> Self {
        Self {
            fired_at: Instant::now(),
            session: Some(session),
            tag: Some(tag),
        }
    }

    /// A tick carrying neither session nor tag; the staleness filter lets it
    /// through unconditionally.
    pub fn untagged() -> Self {
        Self {
            fired_at: Instant::now(),
            session: None,
            tag: None,
        }
    }
}

/// Delayed delivery of a single [`TickEvent`]. Armed timers cannot be
/// cancelled; superseded ones are filtered out when they fire.
pub trait Timer {
    fn arm(&self, session: SessionId, tag: u64, interval: Duration);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Nothing armed. Only reachable when no interval is available.
    Idle,
    Armed { session: SessionId, tag: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The frame moved on. `rearmed` is false when the chain stopped for lack
    /// of an interval.
    Advanced { frame: usize, rearmed: bool },
    Discarded(Staleness),
}

/// Self-rescheduling tick chain. Each accepted tick advances the animation,
/// bumps the session tag and arms the next tick with the interval current at
/// that moment.
#[derive(Debug)]
pub struct TickScheduler<T> {
    timer: T,
    state: SchedulerState,
}

impl<T: Timer> TickScheduler<T> {
    pub fn new(timer: T) -> Self {
        Self {
            timer,
            state: SchedulerState::Idle,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == SchedulerState::Idle
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Schedules one tick for the session's current tag.
    pub fn arm(&mut self, session: &Session, interval: Duration) {
        let (id, tag) = (session.id(), session.current_tag());
        self.timer.arm(id, tag, interval);
        self.state = SchedulerState::Armed { session: id, tag };
        tracing::trace!(session = %id, tag, ?interval, "armed tick");
    }

    /// Supersedes the armed tick: moves the session to a new tag and arms it
    /// with `interval`. The old tick is left to fire and be discarded.
    pub fn retime(&mut self, session: &mut Session, interval: Duration) {
        session.bump_tag();
        self.arm(session, interval);
    }

    pub fn on_fire(
        &mut self,
        session: &mut Session,
        animation: &mut AnimationState,
        event: &TickEvent,
        interval: Option<Duration>,
    ) -> TickOutcome {
        if let Err(staleness) = session.check(event) {
            tracing::trace!(?staleness, "discarded stale tick");
            return TickOutcome::Discarded(staleness);
        }

        let frame = animation.advance();
        session.bump_tag();

        let rearmed = match interval {
            Some(interval) => {
                self.arm(session, interval);
                true
            }
            None => {
                self.state = SchedulerState::Idle;
                tracing::debug!(session = %session.id(), "tick chain idle until a tempo is set");
                false
            }
        };

        TickOutcome::Advanced { frame, rearmed }
    }
}
