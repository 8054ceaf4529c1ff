use thiserror::Error;

/// Error type returned by listener callbacks.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Filter design failed: {0}")]
    FilterDesign(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Clip listener failed: {0}")]
    Listener(#[source] ListenerError),

    #[error("Settings file error: {0}")]
    Settings(String),

    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),
}

pub type Result<T> = std::result::Result<T, DetectorError>;
