use thiserror::Error;

/// Every failure `speak` can run into.
///
/// The `Display` form of each variant is the exact status string handed back
/// to the tool caller, so clients can match on the text.
#[derive(Error, Debug)]
pub enum SpeakError {
    #[error("Error: TTS service not available at {endpoint}")]
    ServiceUnreachable { endpoint: String },

    #[error("Error: TTS service request timed out")]
    ServiceTimeout,

    #[error("TTS service error: HTTP {0}")]
    ServiceHttp(u16),

    #[error("Error: {0}")]
    Playback(String),

    #[error("Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error: {0}")]
    Other(String),
}

impl SpeakError {
    pub fn playback(why: impl std::fmt::Display) -> Self {
        Self::Playback(why.to_string())
    }
}
