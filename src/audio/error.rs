// Audio layer errors
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("failed to read audio asset: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to probe audio format: {0}")]
    Probe(String),

    #[error("no audio track found")]
    NoAudioTrack,

    #[error("decoder error: {0}")]
    Codec(String),

    #[error("audio output error: {0}")]
    Output(String),

    #[error("resampler error: {0}")]
    Resample(String),
}

pub type Result<T> = std::result::Result<T, PlayerError>;
