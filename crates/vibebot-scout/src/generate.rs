use crate::error::GenerationError;
use serde::Deserialize;
use vibebot_core::domain::Interaction;
use vibebot_core::rules::{clean_generated_reply, truncate_chars};

const CONTEXT_EXCERPT_CHARS: usize = 200;

#[cfg_attr(not(feature = "anthropic"), allow(dead_code))]
const SYSTEM_PROMPT: &str = "You are a helpful assistant for social media interactions.";

/// Produces reply text for a target post. `Ok(None)` means "nothing worth
/// saying" and is not an error.
pub trait ReplyGenerator: Send + Sync {
    fn generate(
        &self,
        target: &Interaction,
        context: &[Interaction],
    ) -> Result<Option<String>, GenerationError>;
}

pub fn build_prompt(target: &Interaction, context: &[Interaction], max_chars: usize) -> String {
    let mut prompt = String::from(
        "You are a helpful and engaging social media bot.\n\
         Your goal is to write a relevant, friendly, and constructive comment for the following post.\n\n",
    );
    prompt.push_str(&format!("TARGET POST ({}):\n", target.platform));
    prompt.push_str(&target.content);
    prompt.push('\n');

    let author = match (
        non_blank(target.author_name.as_deref()),
        non_blank(target.author_handle.as_deref()),
    ) {
        (Some(name), Some(handle)) => Some(format!("{name} (@{})", handle.trim_start_matches('@'))),
        (Some(name), None) => Some(name.to_string()),
        (None, Some(handle)) => Some(format!("@{}", handle.trim_start_matches('@'))),
        (None, None) => None,
    };
    if let Some(author) = author {
        prompt.push_str(&format!("Author: {author}\n"));
    }
    if let Some(tag) = non_blank(target.tag.as_deref()) {
        prompt.push_str(&format!("Topic/Tag: {tag}\n"));
    }

    prompt.push_str("\nCONTEXT (Recent posts we've seen, to understand the vibe):\n");
    let excerpts: Vec<String> = context
        .iter()
        .filter(|post| post.id != target.id && post.external_post_id != target.external_post_id)
        .map(|post| {
            format!(
                "Post [{}]: {}...",
                post.platform,
                truncate_chars(&post.content, CONTEXT_EXCERPT_CHARS)
            )
        })
        .collect();
    prompt.push_str(&excerpts.join("\n\n"));

    prompt.push_str(&format!(
        "\n\nINSTRUCTIONS:\n\
         1. Keep the comment under {max_chars} characters.\n\
         2. Be encouraging and specific to the post content.\n\
         3. Do not sound robotic.\n\
         4. If the post is a question, try to answer or point to a resource.\n\
         5. Based on the context, try to maintain a consistent persona (helpful indie hacker).\n\n\
         COMMENT:\n"
    ));
    prompt
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

/// Pulls the first text block out of a Messages API response.
#[cfg_attr(not(feature = "anthropic"), allow(dead_code))]
pub(crate) fn parse_message_text(
    body: &str,
    max_chars: usize,
) -> Result<Option<String>, GenerationError> {
    let response: MessageResponse = serde_json::from_str(body)
        .map_err(|err| GenerationError::Failed(format!("invalid response: {err}")))?;
    let text = response
        .content
        .iter()
        .find(|block| block.block_type == "text")
        .and_then(|block| block.text.as_deref());
    Ok(text.and_then(|text| clean_generated_reply(text, max_chars)))
}

#[cfg(feature = "anthropic")]
mod imp {
    use super::{build_prompt, parse_message_text, ReplyGenerator, SYSTEM_PROMPT};
    use crate::error::GenerationError;
    use reqwest::blocking::Client;
    use serde::Serialize;
    use std::time::Duration;
    use tracing::debug;
    use vibebot_core::domain::Interaction;

    const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
    const ANTHROPIC_VERSION: &str = "2023-06-01";
    const MAX_TOKENS: u32 = 300;

    #[derive(Serialize)]
    struct MessageRequest<'a> {
        model: &'a str,
        max_tokens: u32,
        temperature: f32,
        system: &'a str,
        messages: [Message<'a>; 1],
    }

    #[derive(Serialize)]
    struct Message<'a> {
        role: &'a str,
        content: &'a str,
    }

    pub struct AnthropicGenerator {
        client: Client,
        api_key: Option<String>,
        model: String,
        max_chars: usize,
    }

    impl AnthropicGenerator {
        pub fn new(
            api_key: Option<String>,
            model: impl Into<String>,
            max_chars: usize,
        ) -> Result<Self, GenerationError> {
            let client = Client::builder()
                .timeout(Duration::from_secs(60))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .map_err(|err| GenerationError::Failed(err.to_string()))?;
            Ok(Self {
                client,
                api_key: api_key.filter(|key| !key.trim().is_empty()),
                model: model.into(),
                max_chars,
            })
        }
    }

    impl ReplyGenerator for AnthropicGenerator {
        fn generate(
            &self,
            target: &Interaction,
            context: &[Interaction],
        ) -> Result<Option<String>, GenerationError> {
            let Some(api_key) = self.api_key.as_deref() else {
                return Err(GenerationError::NotConfigured(
                    "missing Anthropic API key".to_string(),
                ));
            };
            let prompt = build_prompt(target, context, self.max_chars);
            let request = MessageRequest {
                model: &self.model,
                max_tokens: MAX_TOKENS,
                temperature: 0.7,
                system: SYSTEM_PROMPT,
                messages: [Message {
                    role: "user",
                    content: &prompt,
                }],
            };
            let response = self
                .client
                .post(MESSAGES_URL)
                .header("x-api-key", api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&request)
                .send()
                .map_err(|err| GenerationError::Failed(err.to_string()))?;
            let status = response.status();
            let body = response
                .text()
                .map_err(|err| GenerationError::Failed(err.to_string()))?;
            if status.as_u16() == 401 {
                return Err(GenerationError::NotConfigured(
                    "Anthropic API key rejected".to_string(),
                ));
            }
            if !status.is_success() {
                return Err(GenerationError::Failed(format!("{status}: {body}")));
            }
            debug!(model = %self.model, external_post_id = %target.external_post_id, "reply generated");
            parse_message_text(&body, self.max_chars)
        }
    }
}

#[cfg(not(feature = "anthropic"))]
mod imp {
    use super::ReplyGenerator;
    use crate::error::GenerationError;
    use vibebot_core::domain::Interaction;

    pub struct AnthropicGenerator {
        model: String,
    }

    impl AnthropicGenerator {
        pub fn new(
            _api_key: Option<String>,
            model: impl Into<String>,
            _max_chars: usize,
        ) -> Result<Self, GenerationError> {
            Ok(Self {
                model: model.into(),
            })
        }
    }

    impl ReplyGenerator for AnthropicGenerator {
        fn generate(
            &self,
            _target: &Interaction,
            _context: &[Interaction],
        ) -> Result<Option<String>, GenerationError> {
            Err(GenerationError::NotConfigured(format!(
                "reply generation with {} requires the anthropic feature",
                self.model
            )))
        }
    }
}

pub use imp::AnthropicGenerator;

#[cfg(test)]
mod tests {
    use super::{build_prompt, parse_message_text};
    use vibebot_core::domain::{Interaction, InteractionId, InteractionStatus, Platform};

    fn interaction(external_post_id: &str, content: &str) -> Interaction {
        Interaction {
            id: InteractionId::new(),
            platform: Platform::Twitter,
            external_post_id: external_post_id.to_string(),
            content: content.to_string(),
            author_name: None,
            author_handle: None,
            url: None,
            metrics: None,
            media_url: None,
            tag: None,
            reply_text: None,
            status: InteractionStatus::Archived,
            created_at: 0,
        }
    }

    #[test]
    fn prompt_includes_author_and_tag_when_present() {
        let mut target = interaction("1", "Shipped my first SaaS today");
        target.author_name = Some("Ada".to_string());
        target.author_handle = Some("@ada".to_string());
        target.tag = Some("#buildinpublic".to_string());

        let prompt = build_prompt(&target, &[], 280);
        assert!(prompt.contains("Author: Ada (@ada)"));
        assert!(prompt.contains("Topic/Tag: #buildinpublic"));
        assert!(prompt.contains("under 280 characters"));
    }

    #[test]
    fn prompt_omits_missing_identity_lines() {
        let target = interaction("1", "hello");
        let prompt = build_prompt(&target, &[], 280);
        assert!(!prompt.contains("Author:"));
        assert!(!prompt.contains("Topic/Tag:"));
    }

    #[test]
    fn context_excludes_target_and_truncates() {
        let target = interaction("1", "target text");
        let long = "x".repeat(500);
        let context = vec![target.clone(), interaction("2", &long)];
        let prompt = build_prompt(&target, &context, 280);
        assert_eq!(prompt.matches("Post [Twitter]").count(), 1);
        assert!(prompt.contains(&format!("{}...", "x".repeat(200))));
        assert!(!prompt.contains(&"x".repeat(201)));
    }

    #[test]
    fn parses_first_text_block() {
        let body = r#"{"content":[{"type":"text","text":"\"Great progress!\""}],"usage":{"input_tokens":1,"output_tokens":2}}"#;
        let text = parse_message_text(body, 280).expect("parse");
        assert_eq!(text.as_deref(), Some("Great progress!"));
    }

    #[test]
    fn empty_content_yields_none() {
        let text = parse_message_text(r#"{"content":[]}"#, 280).expect("parse");
        assert_eq!(text, None);
    }
}
