use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Terminal failure of a song pipeline.
///
/// Per-beat degeneracies (no focused bin, empty candidate lists, no matching
/// pair) are not errors; the affected beat is skipped.
#[derive(Debug, Error)]
pub enum Error {
    /// Pattern tables or generation settings are incomplete or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The waveform or analysis parameters cannot be processed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The whole song is degenerate, e.g. silence with nothing to normalize.
    #[error("degenerate input: {0}")]
    Degenerate(String),
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub fn degenerate(msg: impl Into<String>) -> Self {
        Error::Degenerate(msg.into())
    }
}
