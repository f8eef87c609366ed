use std::sync::Arc;

use crate::{
    animation::{Animation, ChordChart},
    config::{MetronomeConfig, TickMode},
    input::{Key, TextInput},
    session::{Session, SessionIds},
    tempo::{IntervalCalculator, TempoState},
    timeline::{TickEvent, TickOutcome, TickScheduler, Timer},
    Result,
};

/// Everything the event loop feeds into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    Key(Key),
    Tick(TickEvent),
    Resize,
}

impl From<TickEvent> for AppEvent {
    fn from(event: TickEvent) -> Self {
        Self::Tick(event)
    }
}

/// What the event loop should do after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Redraw,
    /// Nothing visible changed.
    Idle,
    Quit,
}

/// Read-only projection handed to the display surface.
#[derive(Debug, Clone)]
pub struct View<'a> {
    pub frame: &'a str,
    pub input: &'a TextInput,
    pub tempo: &'a TempoState,
    pub chord: Option<String>,
}

/// Owns the live session and routes key and tick events to it.
#[derive(Debug)]
pub struct SessionController<T> {
    ids: Arc<SessionIds>,
    session: Session,
    tempo: TempoState,
    animation: Animation,
    chords: ChordChart,
    input: TextInput,
    intervals: IntervalCalculator,
    scheduler: TickScheduler<T>,
}

impl<T: Timer> SessionController<T> {
    /// Creates the session and starts its tick chain straight away if an
    /// interval is already known.
    pub fn new(config: &MetronomeConfig, ids: Arc<SessionIds>, timer: T) -> Result<Self> {
        config.validate()?;

        let session = Session::new(ids.next_id()?);
        let mut controller = Self {
            ids,
            session,
            tempo: TempoState::new(),
            animation: Animation::from_config(&config.animation)?,
            chords: ChordChart::new(config.animation.chords.clone())?,
            input: TextInput::new(&config.input),
            intervals: IntervalCalculator::new(
                config.tick_mode,
                config.animation.frames_per_second,
            ),
            scheduler: TickScheduler::new(timer),
        };
        controller.start_chain();

        tracing::info!(
            session = %controller.session.id(),
            mode = ?config.tick_mode,
            "session started"
        );
        Ok(controller)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn tempo(&self) -> &TempoState {
        &self.tempo
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn scheduler(&self) -> &TickScheduler<T> {
        &self.scheduler
    }

    pub fn handle(&mut self, event: AppEvent) -> Result<Flow> {
        match event {
            AppEvent::Key(key) => self.on_key(key),
            AppEvent::Tick(tick) => Ok(self.on_tick(&tick)),
            AppEvent::Resize => Ok(Flow::Redraw),
        }
    }

    pub fn view(&self) -> View<'_> {
        let chord = match self.intervals.mode() {
            TickMode::TempoDriven => Some(self.chords.line()),
            TickMode::FixedRate => None,
        };
        View {
            frame: self.animation.glyph(),
            input: &self.input,
            tempo: &self.tempo,
            chord,
        }
    }

    /// Replaces the live session. Ticks still in flight for the old one are
    /// discarded when they arrive.
    pub fn restart(&mut self) -> Result<()> {
        let previous = self.session.id();
        self.session = Session::new(self.ids.next_id()?);
        self.animation.state_mut().reset();
        self.chords.reset();
        self.start_chain();

        tracing::info!(%previous, session = %self.session.id(), "session restarted");
        Ok(())
    }

    fn on_key(&mut self, key: Key) -> Result<Flow> {
        match key {
            Key::Esc | Key::Ctrl('c') => {
                tracing::info!(session = %self.session.id(), "quit requested");
                Ok(Flow::Quit)
            }
            Key::Ctrl('r') => {
                let mode = self.input.cursor_mode().next();
                self.input.set_cursor_mode(mode);
                tracing::debug!(%mode, "cursor mode changed");
                Ok(Flow::Redraw)
            }
            Key::Enter => {
                self.restart()?;
                Ok(Flow::Redraw)
            }
            key => {
                let text = self.input.update(key);
                self.on_tempo_text(&text);
                Ok(Flow::Redraw)
            }
        }
    }

    /// Feeds the field's text to the tempo. A changed tempo starts an idle
    /// chain, and in tempo-driven mode also supersedes the tick in flight so
    /// the new beat length applies immediately.
    fn on_tempo_text(&mut self, text: &str) {
        let previous = self.tempo.bpm();
        let bpm = match self.tempo.apply(text) {
            Ok(bpm) => bpm,
            Err(err) => {
                tracing::debug!(%err, "bad number in bpm");
                return;
            }
        };
        if previous == Some(bpm) {
            return;
        }
        tracing::info!(%bpm, "tempo updated");

        match self.intervals.interval(&self.tempo) {
            Some(interval) if self.scheduler.is_idle() => {
                self.scheduler.arm(&self.session, interval)
            }
            Some(interval) if self.intervals.mode() == TickMode::TempoDriven => {
                self.scheduler.retime(&mut self.session, interval)
            }
            _ => {}
        }
    }

    fn on_tick(&mut self, tick: &TickEvent) -> Flow {
        let interval = self.intervals.interval(&self.tempo);
        let outcome = self.scheduler.on_fire(
            &mut self.session,
            self.animation.state_mut(),
            tick,
            interval,
        );

        match outcome {
            TickOutcome::Advanced { .. } => {
                if self.intervals.mode() == TickMode::TempoDriven {
                    self.chords.advance();
                }
                Flow::Redraw
            }
            TickOutcome::Discarded(_) => Flow::Idle,
        }
    }

    fn start_chain(&mut self) {
        match self.intervals.interval(&self.tempo) {
            Some(interval) => self.scheduler.arm(&self.session, interval),
            None => tracing::debug!("no interval yet; tick chain idle"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        session::Staleness,
        tempo::Bpm,
        timeline::{testing::RecordingTimer, SchedulerState},
    };

    fn controller(mode: TickMode) -> SessionController<RecordingTimer> {
        let config = MetronomeConfig::default().with_tick_mode(mode);
        SessionController::new(&config, Arc::new(SessionIds::new()), RecordingTimer::default())
            .unwrap()
    }

    fn type_text(controller: &mut SessionController<RecordingTimer>, text: &str) {
        for ch in text.chars() {
            controller.handle(AppEvent::Key(Key::Char(ch))).unwrap();
        }
    }

    fn fire(controller: &mut SessionController<RecordingTimer>) -> Flow {
        let tick = controller.scheduler().timer().fire_last();
        controller.handle(AppEvent::Tick(tick)).unwrap()
    }

    #[test]
    fn fixed_rate_session_arms_on_creation() {
        let controller = controller(TickMode::FixedRate);
        let armed = controller.scheduler().timer().armed();

        assert_eq!(armed.len(), 1);
        assert_eq!(armed[0].tag, 0);
        assert_eq!(armed[0].interval, Duration::from_millis(10));
        assert_eq!(armed[0].session, controller.session().id());
    }

    #[test]
    fn three_accepted_ticks_cycle_two_frames() {
        let mut controller = controller(TickMode::FixedRate);
        let mut frames = Vec::new();
        for _ in 0..3 {
            assert_eq!(fire(&mut controller), Flow::Redraw);
            frames.push(controller.animation().state().frame_index());
        }

        assert_eq!(frames, vec![1, 0, 1]);
        assert_eq!(controller.view().frame, "    X");
    }

    #[test]
    fn tempo_typing_keeps_last_good_value() {
        let mut controller = controller(TickMode::FixedRate);
        type_text(&mut controller, "120");
        assert_eq!(controller.tempo().bpm(), Bpm::new(120));

        controller.handle(AppEvent::Key(Key::Home)).unwrap();
        type_text(&mut controller, "-");

        assert_eq!(controller.tempo().text(), "-120");
        assert_eq!(controller.tempo().bpm(), Bpm::new(120));
    }

    #[test]
    fn clearing_the_field_leaves_unset_tempo_unset() {
        let mut controller = controller(TickMode::FixedRate);
        type_text(&mut controller, "x");
        controller.handle(AppEvent::Key(Key::Backspace)).unwrap();

        assert_eq!(controller.tempo().text(), "");
        assert_eq!(controller.tempo().bpm(), None);
    }

    #[test]
    fn stale_tag_is_ignored() {
        let mut controller = controller(TickMode::FixedRate);
        fire(&mut controller);
        let frame = controller.animation().state().frame_index();

        let stale = TickEvent::new(controller.session().id(), 0);
        assert_eq!(controller.handle(AppEvent::Tick(stale)).unwrap(), Flow::Idle);
        assert_eq!(controller.animation().state().frame_index(), frame);
    }

    #[test]
    fn restart_discards_previous_session_ticks() {
        let mut controller = controller(TickMode::FixedRate);
        fire(&mut controller);
        let old_tick = controller.scheduler().timer().fire_last();
        let old_id = controller.session().id();

        controller.handle(AppEvent::Key(Key::Enter)).unwrap();

        assert!(controller.session().id() > old_id);
        assert_eq!(controller.session().current_tag(), 0);
        assert_eq!(controller.animation().state().frame_index(), 0);

        let mut session = controller.session().clone();
        assert!(matches!(
            session.check(&old_tick),
            Err(Staleness::Session { .. })
        ));
        assert_eq!(controller.handle(AppEvent::Tick(old_tick)).unwrap(), Flow::Idle);
        assert_eq!(controller.animation().state().frame_index(), 0);

        assert_eq!(fire(&mut controller), Flow::Redraw);
        session = controller.session().clone();
        assert_eq!(session.current_tag(), 1);
    }

    #[test]
    fn tempo_driven_waits_for_a_tempo() {
        let mut controller = controller(TickMode::TempoDriven);
        assert!(controller.scheduler().is_idle());
        assert!(controller.scheduler().timer().armed().is_empty());

        type_text(&mut controller, "120");

        // "1", "12" and "120" each parse; every change supersedes the last.
        let intervals: Vec<Duration> = controller
            .scheduler()
            .timer()
            .armed()
            .iter()
            .map(|armed| armed.interval)
            .collect();
        assert_eq!(
            intervals,
            vec![
                Duration::from_secs(60),
                Duration::from_secs(5),
                Duration::from_millis(500)
            ]
        );
        assert!(matches!(
            controller.scheduler().state(),
            SchedulerState::Armed { tag: 2, .. }
        ));
    }

    #[test]
    fn tempo_change_supersedes_in_flight_tick() {
        let mut controller = controller(TickMode::TempoDriven);
        type_text(&mut controller, "60");
        let slow = controller.scheduler().timer().fire_last();

        type_text(&mut controller, "0");
        let last = controller.scheduler().timer().last().unwrap();
        assert_eq!(last.interval, Duration::from_millis(100));

        assert_eq!(controller.handle(AppEvent::Tick(slow)).unwrap(), Flow::Idle);
        assert_eq!(controller.animation().state().frame_index(), 0);
        assert_eq!(fire(&mut controller), Flow::Redraw);
        assert_eq!(controller.animation().state().frame_index(), 1);
    }

    #[test]
    fn fixed_rate_tempo_change_does_not_rearm() {
        let mut controller = controller(TickMode::FixedRate);
        type_text(&mut controller, "120");
        assert_eq!(controller.scheduler().timer().armed().len(), 1);
    }

    #[test]
    fn tempo_driven_ticks_step_the_chord_chart() {
        let mut controller = controller(TickMode::TempoDriven);
        type_text(&mut controller, "90");
        assert_eq!(controller.view().chord.as_deref(), Some("G"));

        for _ in 0..4 {
            fire(&mut controller);
        }
        assert_eq!(controller.view().chord.as_deref(), Some("    D"));
    }

    #[test]
    fn fixed_rate_view_has_no_chord_line() {
        let controller = controller(TickMode::FixedRate);
        assert!(controller.view().chord.is_none());
    }

    #[test]
    fn ctrl_r_cycles_cursor_mode_and_quit_keys_stop() {
        let mut controller = controller(TickMode::FixedRate);
        controller.handle(AppEvent::Key(Key::Ctrl('r'))).unwrap();
        assert_eq!(controller.view().input.cursor_mode().label(), "static");

        assert_eq!(controller.handle(AppEvent::Key(Key::Esc)).unwrap(), Flow::Quit);
        assert_eq!(
            controller.handle(AppEvent::Key(Key::Ctrl('c'))).unwrap(),
            Flow::Quit
        );
    }

    #[test]
    fn other_ctrl_chords_do_not_touch_the_tempo() {
        let mut controller = controller(TickMode::FixedRate);
        type_text(&mut controller, "75");
        controller.handle(AppEvent::Key(Key::Ctrl('a'))).unwrap();

        assert_eq!(controller.tempo().text(), "75");
        assert_eq!(controller.tempo().bpm(), Bpm::new(75));
    }
}
