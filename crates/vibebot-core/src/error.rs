use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("external post id is required")]
    EmptyExternalPostId,
    #[error("unknown platform: {0}")]
    InvalidPlatform(String),
    #[error("unknown interaction status: {0}")]
    InvalidStatus(String),
    #[error("unknown mission mode: {0}")]
    InvalidMissionMode(String),
    #[error("unknown media policy: {0}")]
    InvalidMediaPolicy(String),
    #[error("posted interaction {0} has no reply text")]
    PostedWithoutReply(String),
    #[error("invalid relevance threshold: {0}")]
    InvalidThreshold(f64),
}
