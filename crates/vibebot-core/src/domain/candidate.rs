use crate::domain::interaction::Metrics;
use serde::{Deserialize, Serialize};

/// A post observed on a platform, not yet filtered or acted upon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCandidate {
    pub external_post_id: String,
    pub content: String,
    pub author_name: Option<String>,
    pub author_handle: Option<String>,
    pub url: Option<String>,
    pub metrics: Option<Metrics>,
    pub media_url: Option<String>,
}

impl RawCandidate {
    pub fn new(external_post_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            external_post_id: external_post_id.into(),
            content: content.into(),
            author_name: None,
            author_handle: None,
            url: None,
            metrics: None,
            media_url: None,
        }
    }

    pub fn has_media(&self) -> bool {
        self.media_url.is_some()
    }
}
