use std::{fmt, num::NonZeroU32, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{config::TickMode, MetronomeError, Result};

const MILLIS_PER_MINUTE: u64 = 60_000;

/// A validated tempo in beats per minute. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Bpm(NonZeroU32);

impl Bpm {
    pub fn new(beats_per_minute: u32) -> Option<Self> {
        NonZeroU32::new(beats_per_minute).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Length of one beat, `60000 / bpm` whole milliseconds, never below 1 ms.
    pub fn beat_interval(self) -> Duration {
        let millis = MILLIS_PER_MINUTE / u64::from(self.get());
        Duration::from_millis(millis.max(1))
    }
}

impl fmt::Display for Bpm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses the raw tempo field. The text is taken as-is: surrounding
/// whitespace, signs and any other non-digit make it invalid, as do zero and
/// values that overflow.
pub fn parse_bpm(text: &str) -> Result<Bpm> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MetronomeError::invalid_tempo(text));
    }

    text.parse::<u32>()
        .ok()
        .and_then(Bpm::new)
        .ok_or_else(|| MetronomeError::invalid_tempo(text))
}

/// Raw tempo text together with the last tempo that parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TempoState {
    text: String,
    bpm: Option<Bpm>,
}

impl TempoState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn bpm(&self) -> Option<Bpm> {
        self.bpm
    }

    /// Records `text` and, if it parses, adopts it as the current tempo. On a
    /// parse failure the previous tempo is left in place.
    pub fn apply(&mut self, text: &str) -> Result<Bpm> {
        self.text.clear();
        self.text.push_str(text);

        let bpm = parse_bpm(text)?;
        self.bpm = Some(bpm);
        Ok(bpm)
    }
}

/// Derives the time between animation frames for the active [`TickMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalCalculator {
    mode: TickMode,
    fixed: Duration,
}

impl IntervalCalculator {
    pub fn new(mode: TickMode, frames_per_second: u32) -> Self {
        Self {
            mode,
            fixed: Self::frame_interval(frames_per_second),
        }
    }

    /// Frame length at a constant rate, `1s / fps`. A zero rate is treated as
    /// one frame per second.
    pub fn frame_interval(frames_per_second: u32) -> Duration {
        Duration::from_secs(1) / frames_per_second.max(1)
    }

    pub fn mode(&self) -> TickMode {
        self.mode
    }

    /// Interval to arm the next tick with, or `None` when tempo-driven and no
    /// tempo has been entered yet.
    pub fn interval(&self, tempo: &TempoState) -> Option<Duration> {
        match self.mode {
            TickMode::FixedRate => Some(self.fixed),
            TickMode::TempoDriven => tempo.bpm().map(Bpm::beat_interval),
        }
    }
}
