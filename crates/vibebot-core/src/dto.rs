use crate::domain::{Interaction, InteractionId, InteractionStatus, Platform};
use crate::rules::truncate_chars;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const EXCERPT_CHARS: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionListItemDto {
    pub id: InteractionId,
    pub platform: Platform,
    pub external_post_id: String,
    pub status: InteractionStatus,
    pub author_handle: Option<String>,
    pub tag: Option<String>,
    pub excerpt: String,
    pub replied: bool,
    pub created_at: i64,
}

impl From<&Interaction> for InteractionListItemDto {
    fn from(interaction: &Interaction) -> Self {
        let single_line = interaction.content.replace('\n', " ");
        Self {
            id: interaction.id,
            platform: interaction.platform,
            external_post_id: interaction.external_post_id.clone(),
            status: interaction.status,
            author_handle: interaction.author_handle.clone(),
            tag: interaction.tag.clone(),
            excerpt: truncate_chars(single_line.trim(), EXCERPT_CHARS).to_string(),
            replied: interaction.has_reply(),
            created_at: interaction.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsDto {
    pub total: i64,
    pub by_platform: BTreeMap<String, i64>,
    pub by_status: BTreeMap<String, i64>,
}
