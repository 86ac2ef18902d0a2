use crate::domain::candidate::RawCandidate;
use crate::domain::ids::InteractionId;
use crate::domain::platform::Platform;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Engagement counters observed at capture time. Advisory only.
pub type Metrics = BTreeMap<String, i64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionStatus {
    Archived,
    Posted,
    Error,
}

impl InteractionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionStatus::Archived => "ARCHIVED",
            InteractionStatus::Posted => "POSTED",
            InteractionStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for InteractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionStatus {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "ARCHIVED" => Ok(InteractionStatus::Archived),
            "POSTED" => Ok(InteractionStatus::Posted),
            "ERROR" => Ok(InteractionStatus::Error),
            _ => Err(CoreError::InvalidStatus(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: InteractionId,
    pub platform: Platform,
    pub external_post_id: String,
    pub content: String,
    pub author_name: Option<String>,
    pub author_handle: Option<String>,
    pub url: Option<String>,
    pub metrics: Option<Metrics>,
    pub media_url: Option<String>,
    pub tag: Option<String>,
    pub reply_text: Option<String>,
    pub status: InteractionStatus,
    pub created_at: i64,
}

impl Interaction {
    pub fn has_media(&self) -> bool {
        self.media_url.is_some()
    }

    pub fn has_reply(&self) -> bool {
        self.reply_text.is_some()
    }
}

/// A capture or update of one external post. `None` fields leave the stored
/// value untouched; see [`crate::rules::enrich`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionUpsert {
    pub platform: Platform,
    pub external_post_id: String,
    pub content: Option<String>,
    pub status: Option<InteractionStatus>,
    pub author_name: Option<String>,
    pub author_handle: Option<String>,
    pub url: Option<String>,
    pub metrics: Option<Metrics>,
    pub media_url: Option<String>,
    pub tag: Option<String>,
    pub reply_text: Option<String>,
}

impl InteractionUpsert {
    pub fn new(platform: Platform, external_post_id: impl Into<String>) -> Self {
        Self {
            platform,
            external_post_id: external_post_id.into(),
            content: None,
            status: None,
            author_name: None,
            author_handle: None,
            url: None,
            metrics: None,
            media_url: None,
            tag: None,
            reply_text: None,
        }
    }

    /// Initial capture of a candidate seen on `platform`.
    pub fn capture(platform: Platform, candidate: &RawCandidate, tag: Option<&str>) -> Self {
        Self {
            platform,
            external_post_id: candidate.external_post_id.clone(),
            content: Some(candidate.content.clone()),
            status: Some(InteractionStatus::Archived),
            author_name: candidate.author_name.clone(),
            author_handle: candidate.author_handle.clone(),
            url: candidate.url.clone(),
            metrics: candidate.metrics.clone(),
            media_url: candidate.media_url.clone(),
            tag: tag.map(str::to_string),
            reply_text: None,
        }
    }

    /// Outcome of a successful reply.
    pub fn posted(platform: Platform, external_post_id: impl Into<String>, reply: &str) -> Self {
        let mut update = Self::new(platform, external_post_id);
        update.status = Some(InteractionStatus::Posted);
        update.reply_text = Some(reply.to_string());
        update
    }

    /// Synthetic run-level alert row.
    pub fn alert(external_post_id: impl Into<String>, message: impl Into<String>) -> Self {
        let mut update = Self::new(Platform::System, external_post_id);
        update.status = Some(InteractionStatus::Error);
        update.content = Some(message.into());
        update
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_status(mut self, status: InteractionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_author(mut self, name: Option<&str>, handle: Option<&str>) -> Self {
        self.author_name = name.map(str::to_string);
        self.author_handle = handle.map(str::to_string);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}
