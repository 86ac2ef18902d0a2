use crate::commands::{print_json, Context};
use crate::error::{invalid_input, not_found};
use crate::platforms;
use crate::util::{engageable_platform, parse_interaction_id};
use anyhow::{anyhow, Result};
use clap::Args;
use serde::Serialize;
use vibebot_core::domain::{Interaction, InteractionId, InteractionUpsert};
use vibebot_core::time::now_utc;
use vibebot_scout::engage::engage_standalone;
use vibebot_scout::{EngageOutcome, ReplyGenerator};
use vibebot_store::error::StoreError;

#[derive(Debug, Args)]
pub struct LikeArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ReplyArgs {
    pub id: String,
    #[arg(long, conflicts_with = "generate")]
    pub text: Option<String>,
    /// Ask the reply generator for the text
    #[arg(long)]
    pub generate: bool,
    /// Like the post before replying
    #[arg(long)]
    pub like: bool,
}

#[derive(Debug, Serialize)]
struct EngageDto {
    id: InteractionId,
    external_post_id: String,
    reply_text: Option<String>,
    outcome: EngageOutcome,
}

fn load(ctx: &Context<'_>, raw_id: &str) -> Result<Interaction> {
    let id = parse_interaction_id(raw_id)?;
    match ctx.store.interactions().get(id) {
        Ok(interaction) => Ok(interaction),
        Err(StoreError::NotFound(_)) => Err(not_found("interaction not found")),
        Err(err) => Err(err.into()),
    }
}

pub fn like(ctx: &Context<'_>, args: LikeArgs) -> Result<()> {
    let interaction = load(ctx, &args.id)?;
    let platform = engageable_platform(interaction.platform)?;
    let session = platforms::session(platform, ctx.config, ctx.db_path)?;

    let outcome = engage_standalone(&session, &interaction.external_post_id, None, true)?;
    report(ctx, &interaction, None, &outcome)?;
    if !outcome.succeeded() {
        return Err(anyhow!(
            "like failed: {}",
            outcome.failure().unwrap_or("unknown error")
        ));
    }
    Ok(())
}

pub fn reply(ctx: &Context<'_>, args: ReplyArgs) -> Result<()> {
    let interaction = load(ctx, &args.id)?;
    let platform = engageable_platform(interaction.platform)?;
    if interaction.has_reply() {
        return Err(invalid_input("interaction already has a reply"));
    }

    let text = match args.text {
        None if !args.generate => {
            return Err(invalid_input("provide --text or --generate"));
        }
        Some(text) => {
            let trimmed = text.trim().to_string();
            if trimmed.is_empty() {
                return Err(invalid_input("reply text cannot be empty"));
            }
            trimmed
        }
        None => {
            let generator = platforms::generator(ctx.config)?;
            let context: Vec<Interaction> = ctx
                .store
                .interactions()
                .recent(ctx.config.scout.context_size as i64)?
                .into_iter()
                .filter(|item| item.id != interaction.id)
                .collect();
            generator
                .generate(&interaction, &context)?
                .ok_or_else(|| anyhow!("reply generator returned no text"))?
        }
    };

    let session = platforms::session(platform, ctx.config, ctx.db_path)?;
    let outcome = engage_standalone(
        &session,
        &interaction.external_post_id,
        Some(&text),
        args.like,
    )?;
    if outcome.succeeded() {
        ctx.store.interactions().upsert(
            now_utc(),
            InteractionUpsert::posted(platform, interaction.external_post_id.clone(), &text),
        )?;
    }
    report(ctx, &interaction, Some(&text), &outcome)?;
    if !outcome.succeeded() {
        return Err(anyhow!(
            "reply failed: {}",
            outcome.failure().unwrap_or("unknown error")
        ));
    }
    Ok(())
}

fn report(
    ctx: &Context<'_>,
    interaction: &Interaction,
    text: Option<&str>,
    outcome: &EngageOutcome,
) -> Result<()> {
    if ctx.json {
        return print_json(&EngageDto {
            id: interaction.id,
            external_post_id: interaction.external_post_id.clone(),
            reply_text: text.map(str::to_string),
            outcome: outcome.clone(),
        });
    }
    if outcome.succeeded() {
        match text {
            Some(text) => println!("replied to {}: {text}", interaction.external_post_id),
            None => println!("liked {}", interaction.external_post_id),
        }
    }
    Ok(())
}
