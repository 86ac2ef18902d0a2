use crate::error::{Result, ScoutError};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use std::time::Duration;
use vibebot_core::domain::Platform;

pub(crate) fn build_client(user_agent: &str) -> Result<Client> {
    Ok(Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()?)
}

/// Maps non-success responses onto the error taxonomy. Rejected credentials
/// become `Authentication` so the caller can tell them from transport noise.
pub(crate) fn check_status(platform: Platform, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    let body = body.trim();
    let detail = if body.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {}", vibebot_core::rules::truncate_chars(body, 300))
    };
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ScoutError::auth(platform, detail)),
        _ => Err(ScoutError::Http(detail)),
    }
}
