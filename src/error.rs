use thiserror::Error;

/// Why an event was rejected. The session state is untouched whenever one of
/// these is returned.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("malformed upload: {0:#}")]
    MalformedUpload(anyhow::Error),

    #[error("upload of ~{size} bytes exceeds the {limit} byte limit")]
    UploadTooLarge { size: usize, limit: usize },

    #[error("could not decode audio: {0:#}")]
    Undecodable(anyhow::Error),

    #[error("no audio has been uploaded yet")]
    NoAudio,

    #[error("no clip range has been confirmed yet")]
    NoClip,

    #[error("{field} field is not a number: {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("invalid range: start {start} must not exceed end {end}")]
    InvalidRange { start: f64, end: f64 },

    #[error("malformed event: {0}")]
    BadEvent(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl EventError {
    pub fn status_code(&self) -> u16 {
        match self {
            EventError::MalformedUpload(_)
            | EventError::InvalidField { .. }
            | EventError::InvalidRange { .. }
            | EventError::BadEvent(_) => 400,
            EventError::NoAudio | EventError::NoClip => 409,
            EventError::UploadTooLarge { .. } => 413,
            EventError::Undecodable(_) => 422,
            EventError::Internal(_) => 500,
        }
    }
}
