use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{MetronomeError, Result};

/// Top-level configuration structure for the metronome.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetronomeConfig {
    pub tick_mode: TickMode,
    pub animation: AnimationConfig,
    pub input: InputConfig,
    pub palette: Palette,
    pub log: LogConfig,
}

impl MetronomeConfig {
    pub fn with_tick_mode(mut self, tick_mode: TickMode) -> Self {
        self.tick_mode = tick_mode;
        self
    }

    /// Rejects values that would leave the tick loop without a frame to show
    /// or without a usable interval.
    pub fn validate(&self) -> Result<()> {
        if self.animation.frames.is_empty() {
            return Err(MetronomeError::InvalidConfig(
                "animation requires at least one frame",
            ));
        }
        if self.animation.frames_per_second == 0 {
            return Err(MetronomeError::InvalidConfig(
                "frames_per_second must be positive",
            ));
        }
        if self.animation.chords.is_empty() {
            return Err(MetronomeError::InvalidConfig(
                "chord chart requires at least one chord",
            ));
        }
        Ok(())
    }

    /// Serialises the effective configuration for the startup log line.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Selects how the interval between animation frames is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickMode {
    /// Frames advance at `animation.frames_per_second` regardless of tempo.
    #[default]
    FixedRate,
    /// Every frame lasts one beat at the entered tempo.
    TempoDriven,
}

/// Glyphs and cadence of the beat indicator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    pub frames: Vec<String>,
    pub frames_per_second: u32,
    /// Chords cycled one per beat in tempo-driven mode.
    pub chords: Vec<String>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frames: vec!["X ".to_string(), "    X".to_string()],
            frames_per_second: 100,
            chords: ["G", "G", "G", "G", "D", "D", "D", "D"]
                .iter()
                .map(|chord| chord.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub prompt: String,
    pub placeholder: String,
    pub char_limit: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            placeholder: "Beats Per Minute".to_string(),
            char_limit: 32,
        }
    }
}

/// ANSI 256-colour indices used by the view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Palette {
    pub focused: u8,
    pub blurred: u8,
    pub cursor_mode_help: u8,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            focused: 205,
            blurred: 240,
            cursor_mode_help: 244,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub path: PathBuf,
    /// Directive used when `RUST_LOG` is not set.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("metronome.log"),
            default_filter: "info".to_string(),
        }
    }
}
