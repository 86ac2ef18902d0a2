use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Origin tag of an interaction. `System` is reserved for run-level alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Twitter,
    Reddit,
    System,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "Twitter",
            Platform::Reddit => "Reddit",
            Platform::System => "System",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "twitter" | "x" => Ok(Platform::Twitter),
            "reddit" => Ok(Platform::Reddit),
            "system" => Ok(Platform::System),
            _ => Err(CoreError::InvalidPlatform(raw.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Platform;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Twitter".parse::<Platform>().unwrap(), Platform::Twitter);
        assert_eq!("REDDIT".parse::<Platform>().unwrap(), Platform::Reddit);
        assert_eq!("x".parse::<Platform>().unwrap(), Platform::Twitter);
        assert!("mastodon".parse::<Platform>().is_err());
    }

    #[test]
    fn display_matches_stored_label() {
        assert_eq!(Platform::System.to_string(), "System");
    }
}
