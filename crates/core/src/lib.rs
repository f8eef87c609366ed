//! Core library for the terminal metronome.
//!
//! The interesting part is the tick loop: a [`TickScheduler`] arms one timer
//! at a time, tags it with the live session id and a generation counter, and
//! re-arms on every accepted fire using whatever interval is current then.
//! Ticks that no longer match the live session are dropped on arrival, so the
//! tempo can change, or the session restart, without cancelling anything.
//!
//! Everything terminal-specific beyond text styling lives in the app crate.

pub mod animation;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod input;
pub mod render;
pub mod session;
pub mod tempo;
pub mod timeline;

pub use animation::{Animation, AnimationState, ChordChart};
pub use clock::{ThreadTimer, TickSink};
pub use config::{AnimationConfig, InputConfig, LogConfig, MetronomeConfig, Palette, TickMode};
pub use controller::{AppEvent, Flow, SessionController, View};
pub use error::{MetronomeError, Result};
pub use input::{CursorMode, Key, TextInput};
pub use render::{render, Styles};
pub use session::{Session, SessionId, SessionIds, Staleness};
pub use tempo::{parse_bpm, Bpm, IntervalCalculator, TempoState};
pub use timeline::{SchedulerState, TickEvent, TickOutcome, TickScheduler, Timer};
