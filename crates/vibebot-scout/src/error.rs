use std::time::Duration;
use thiserror::Error;
use vibebot_core::domain::Platform;
use vibebot_store::error::StoreError;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("reply generator not configured: {0}")]
    NotConfigured(String),
    #[error("reply generation failed: {0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("session busy: not acquired within {}s", .0.as_secs())]
    ResourceBusy(Duration),
    #[error("{platform} authentication failed: {message}")]
    Authentication { platform: Platform, message: String },
    #[error("acquisition failed: {0}")]
    Acquisition(String),
    #[error("engagement failed: {0}")]
    Engagement(String),
    #[error("store error: {0}")]
    Storage(#[from] StoreError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error("missing configuration: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("session lock file: {0}")]
    Io(#[from] std::io::Error),
}

impl ScoutError {
    pub fn auth(platform: Platform, message: impl Into<String>) -> Self {
        ScoutError::Authentication {
            platform,
            message: message.into(),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ScoutError::Authentication { .. })
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, ScoutError::ResourceBusy(_))
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for ScoutError {
    fn from(err: reqwest::Error) -> Self {
        ScoutError::Http(err.to_string())
    }
}

impl From<url::ParseError> for ScoutError {
    fn from(err: url::ParseError) -> Self {
        ScoutError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for ScoutError {
    fn from(err: serde_json::Error) -> Self {
        ScoutError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;
