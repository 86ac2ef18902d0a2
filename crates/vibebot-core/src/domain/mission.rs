use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionMode {
    /// Capture and filter only; items stay archived for review.
    Discover,
    /// Capture, filter, then like and reply to what survives.
    Engage,
}

impl MissionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissionMode::Discover => "discover",
            MissionMode::Engage => "engage",
        }
    }
}

impl fmt::Display for MissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissionMode {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "discover" | "discover_only" => Ok(MissionMode::Discover),
            "engage" | "engaging" => Ok(MissionMode::Engage),
            _ => Err(CoreError::InvalidMissionMode(raw.to_string())),
        }
    }
}

/// What an unattended mission may do with a post that carries media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaPolicy {
    /// Archive, never engage.
    Skip,
    /// Archive and like, never reply.
    LikeOnly,
    /// Treat like any other post.
    Engage,
}

impl MediaPolicy {
    pub fn allows_engagement(&self) -> bool {
        !matches!(self, MediaPolicy::Skip)
    }

    pub fn allows_reply(&self) -> bool {
        matches!(self, MediaPolicy::Engage)
    }
}

impl FromStr for MediaPolicy {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "skip" => Ok(MediaPolicy::Skip),
            "like_only" => Ok(MediaPolicy::LikeOnly),
            "engage" => Ok(MediaPolicy::Engage),
            _ => Err(CoreError::InvalidMediaPolicy(raw.to_string())),
        }
    }
}
