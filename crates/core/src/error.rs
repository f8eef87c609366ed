use std::path::PathBuf;

/// Result alias that carries the custom [`MetronomeError`] type.
pub type Result<T> = std::result::Result<T, MetronomeError>;

/// Common error type for the metronome crates.
#[derive(Debug, thiserror::Error)]
pub enum MetronomeError {
    /// The tempo field does not hold a positive base-10 integer. Callers keep
    /// the previously accepted tempo when they see this.
    #[error("invalid tempo `{input}`: expected a positive whole number")]
    InvalidTempoFormat { input: String },
    /// The diagnostic log could not be opened. Logging is disabled and the
    /// program carries on.
    #[error("error opening log file {}: {source}", path.display())]
    LogFileUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The terminal or the timer thread could not be brought up.
    #[error("{0}")]
    Startup(#[source] std::io::Error),
    /// A configuration value that would leave the animation unable to run.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// A shared lock was poisoned by a panicking thread.
    #[error("{0} has been poisoned")]
    Poisoned(&'static str),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Serialization(#[from] serde_json::Error),
}

impl MetronomeError {
    pub fn invalid_tempo<T: Into<String>>(input: T) -> Self {
        Self::InvalidTempoFormat {
            input: input.into(),
        }
    }
}
