use crate::{config::AnimationConfig, MetronomeError, Result};

/// Position within a fixed cycle of frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationState {
    frame_index: usize,
    frame_count: usize,
}

impl AnimationState {
    pub fn new(frame_count: usize) -> Result<Self> {
        if frame_count == 0 {
            return Err(MetronomeError::InvalidConfig(
                "animation requires at least one frame",
            ));
        }
        Ok(Self {
            frame_index: 0,
            frame_count,
        })
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Steps to the next frame, wrapping at the end of the cycle.
    pub fn advance(&mut self) -> usize {
        self.frame_index = (self.frame_index + 1) % self.frame_count;
        self.frame_index
    }

    pub fn reset(&mut self) {
        self.frame_index = 0;
    }
}

/// The beat indicator glyphs and the frame currently shown.
#[derive(Debug, Clone)]
pub struct Animation {
    frames: Vec<String>,
    state: AnimationState,
}

impl Animation {
    pub fn new(frames: Vec<String>) -> Result<Self> {
        let state = AnimationState::new(frames.len())?;
        Ok(Self { frames, state })
    }

    pub fn from_config(config: &AnimationConfig) -> Result<Self> {
        Self::new(config.frames.clone())
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AnimationState {
        &mut self.state
    }

    pub fn glyph(&self) -> &str {
        &self.frames[self.state.frame_index()]
    }
}

/// Chord progression stepped once per beat, drawn indented by its position
/// in the bar.
#[derive(Debug, Clone)]
pub struct ChordChart {
    chords: Vec<String>,
    position: usize,
}

impl ChordChart {
    pub fn new(chords: Vec<String>) -> Result<Self> {
        if chords.is_empty() {
            return Err(MetronomeError::InvalidConfig(
                "chord chart requires at least one chord",
            ));
        }
        Ok(Self {
            chords,
            position: 0,
        })
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn advance(&mut self) {
        self.position = (self.position + 1) % self.chords.len();
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    pub fn line(&self) -> String {
        format!("{}{}", " ".repeat(self.position), self.chords[self.position])
    }
}
