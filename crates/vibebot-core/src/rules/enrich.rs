use crate::domain::{Interaction, InteractionId, InteractionStatus, InteractionUpsert};
use crate::error::CoreError;

/// Builds the first stored version of a capture.
pub fn materialize(
    id: InteractionId,
    created_at: i64,
    update: InteractionUpsert,
) -> Result<Interaction, CoreError> {
    let external_post_id = normalize_external_id(&update.external_post_id)?;
    let interaction = Interaction {
        id,
        platform: update.platform,
        external_post_id,
        content: present(update.content).unwrap_or_default(),
        author_name: present(update.author_name),
        author_handle: present(update.author_handle),
        url: present(update.url),
        metrics: update.metrics.filter(|metrics| !metrics.is_empty()),
        media_url: present(update.media_url),
        tag: present(update.tag),
        reply_text: present(update.reply_text),
        status: update.status.unwrap_or(InteractionStatus::Archived),
        created_at,
    };
    check_posted(&interaction)?;
    Ok(interaction)
}

/// Field-level enrichment: a present value in `update` wins, an absent one
/// keeps what is stored. Identity (`id`, `created_at`) never changes and a
/// posted record never falls back to archived.
pub fn enrich(existing: &Interaction, update: InteractionUpsert) -> Result<Interaction, CoreError> {
    let status = match (existing.status, update.status) {
        (InteractionStatus::Posted, Some(InteractionStatus::Archived)) => InteractionStatus::Posted,
        (_, Some(status)) => status,
        (status, None) => status,
    };

    let merged = Interaction {
        id: existing.id,
        platform: update.platform,
        external_post_id: existing.external_post_id.clone(),
        content: present(update.content).unwrap_or_else(|| existing.content.clone()),
        author_name: keep(update.author_name, &existing.author_name),
        author_handle: keep(update.author_handle, &existing.author_handle),
        url: keep(update.url, &existing.url),
        metrics: update
            .metrics
            .filter(|metrics| !metrics.is_empty())
            .or_else(|| existing.metrics.clone()),
        media_url: keep(update.media_url, &existing.media_url),
        tag: keep(update.tag, &existing.tag),
        reply_text: keep(update.reply_text, &existing.reply_text),
        status,
        created_at: existing.created_at,
    };
    check_posted(&merged)?;
    Ok(merged)
}

pub fn normalize_external_id(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::EmptyExternalPostId);
    }
    Ok(trimmed.to_string())
}

fn check_posted(interaction: &Interaction) -> Result<(), CoreError> {
    if interaction.status == InteractionStatus::Posted && interaction.reply_text.is_none() {
        return Err(CoreError::PostedWithoutReply(
            interaction.external_post_id.clone(),
        ));
    }
    Ok(())
}

// Scraped fields come back blank as often as missing; both count as absent.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn keep(update: Option<String>, existing: &Option<String>) -> Option<String> {
    present(update).or_else(|| existing.clone())
}

#[cfg(test)]
mod tests {
    use super::{enrich, materialize};
    use crate::domain::{InteractionId, InteractionStatus, InteractionUpsert, Metrics, Platform};
    use crate::error::CoreError;

    fn stored(content: &str) -> crate::domain::Interaction {
        materialize(
            InteractionId::new(),
            1_700_000_000,
            InteractionUpsert::new(Platform::Twitter, "42").with_content(content),
        )
        .expect("materialize")
    }

    #[test]
    fn materialize_defaults_to_archived() {
        let interaction = stored("hello");
        assert_eq!(interaction.status, InteractionStatus::Archived);
        assert_eq!(interaction.content, "hello");
        assert!(interaction.reply_text.is_none());
    }

    #[test]
    fn materialize_rejects_blank_external_id() {
        let err = materialize(
            InteractionId::new(),
            0,
            InteractionUpsert::new(Platform::Reddit, "   "),
        )
        .unwrap_err();
        assert_eq!(err, CoreError::EmptyExternalPostId);
    }

    #[test]
    fn enrich_keeps_existing_when_absent() {
        let existing = stored("A");
        let update =
            InteractionUpsert::new(Platform::Twitter, "42").with_author(Some("X"), None);
        let merged = enrich(&existing, update).expect("enrich");
        assert_eq!(merged.content, "A");
        assert_eq!(merged.author_name.as_deref(), Some("X"));
        assert_eq!(merged.id, existing.id);
        assert_eq!(merged.created_at, existing.created_at);
    }

    #[test]
    fn enrich_treats_blank_as_absent() {
        let mut existing = stored("A");
        existing.author_handle = Some("@ada".to_string());
        let mut update = InteractionUpsert::new(Platform::Twitter, "42").with_content("  ");
        update.author_handle = Some(String::new());
        let merged = enrich(&existing, update).expect("enrich");
        assert_eq!(merged.content, "A");
        assert_eq!(merged.author_handle.as_deref(), Some("@ada"));
    }

    #[test]
    fn enrich_overwrites_present_values() {
        let existing = stored("A");
        let mut metrics = Metrics::new();
        metrics.insert("likes".to_string(), 3);
        let mut update = InteractionUpsert::new(Platform::Twitter, "42").with_content("B");
        update.metrics = Some(metrics.clone());
        let merged = enrich(&existing, update).expect("enrich");
        assert_eq!(merged.content, "B");
        assert_eq!(merged.metrics, Some(metrics));
    }

    #[test]
    fn posted_never_reverts_to_archived() {
        let existing = stored("A");
        let posted = enrich(
            &existing,
            InteractionUpsert::posted(Platform::Twitter, "42", "nice work!"),
        )
        .expect("post");
        assert_eq!(posted.status, InteractionStatus::Posted);

        let recaptured = enrich(
            &posted,
            InteractionUpsert::new(Platform::Twitter, "42").with_status(InteractionStatus::Archived),
        )
        .expect("recapture");
        assert_eq!(recaptured.status, InteractionStatus::Posted);
        assert_eq!(recaptured.reply_text.as_deref(), Some("nice work!"));
    }

    #[test]
    fn posted_requires_reply_text() {
        let existing = stored("A");
        let err = enrich(
            &existing,
            InteractionUpsert::new(Platform::Twitter, "42").with_status(InteractionStatus::Posted),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::PostedWithoutReply(_)));
    }
}
