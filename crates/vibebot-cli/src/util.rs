use anyhow::Result;
use std::str::FromStr;
use vibebot_core::domain::{InteractionId, MissionMode, Platform};

use crate::error::invalid_input;

pub use vibebot_core::time::format_timestamp_datetime;

pub fn parse_interaction_id(raw: &str) -> Result<InteractionId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid_input("interaction id cannot be empty"));
    }
    InteractionId::from_str(trimmed).map_err(|_| invalid_input("invalid interaction id"))
}

pub fn parse_mode(raw: &str) -> Result<MissionMode> {
    MissionMode::from_str(raw).map_err(|_| invalid_input("invalid mode: expected discover|engage"))
}

/// Only real platforms can be engaged with; `System` rows are alerts.
pub fn engageable_platform(platform: Platform) -> Result<Platform> {
    match platform {
        Platform::System => Err(invalid_input("System alerts cannot be engaged with")),
        other => Ok(other),
    }
}

pub fn clean_keywords(raw: Vec<String>) -> Result<Vec<String>> {
    let keywords: Vec<String> = raw
        .into_iter()
        .map(|keyword| keyword.trim().to_string())
        .filter(|keyword| !keyword.is_empty())
        .collect();
    if keywords.is_empty() {
        return Err(invalid_input("at least one keyword is required"));
    }
    Ok(keywords)
}
