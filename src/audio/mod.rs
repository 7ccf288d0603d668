// Module audio - CPAL output backend and the authoritative playback clock

pub mod engine;
pub mod timing;

use thiserror::Error;

/// Audio backend errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No audio output device found")]
    NoDevice,

    #[error("Configuration error: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("Unsupported sample format: {0:?}. Supported formats: F32, I16, U16")]
    UnsupportedFormat(cpal::SampleFormat),

    #[error("Error in stream creation: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Error in stream beginning: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

pub type EngineResult<T> = Result<T, EngineError>;
