use crate::commands::{print_json, Context, DEFAULT_LIST_LIMIT};
use crate::error::{invalid_input, not_found};
use crate::util::{format_timestamp_datetime, parse_interaction_id};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use vibebot_core::dto::InteractionListItemDto;
use vibebot_store::error::StoreError;

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
    pub limit: i64,
    #[arg(long, default_value_t = 0)]
    pub offset: i64,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ClearArgs {
    /// Confirm deletion of every interaction
    #[arg(long)]
    pub yes: bool,
}

#[derive(Debug, Serialize)]
struct ClearDto {
    deleted: usize,
}

pub fn list(ctx: &Context<'_>, args: ListArgs) -> Result<()> {
    if args.limit <= 0 {
        return Err(invalid_input("limit must be positive"));
    }
    if args.offset < 0 {
        return Err(invalid_input("offset cannot be negative"));
    }
    let items = ctx.store.interactions().list(args.limit, args.offset)?;
    let dtos: Vec<InteractionListItemDto> = items.iter().map(InteractionListItemDto::from).collect();

    if ctx.json {
        return print_json(&dtos);
    }
    if dtos.is_empty() {
        println!("no interactions");
        return Ok(());
    }
    for item in dtos {
        let author = item
            .author_handle
            .as_deref()
            .map(|handle| format!(" {handle}"))
            .unwrap_or_default();
        println!(
            "{}  {}  {:<8} {:<8}{}  {}",
            item.id,
            format_timestamp_datetime(item.created_at),
            item.platform.as_str(),
            item.status.as_str(),
            author,
            item.excerpt
        );
    }
    Ok(())
}

pub fn show(ctx: &Context<'_>, args: ShowArgs) -> Result<()> {
    let id = parse_interaction_id(&args.id)?;
    let interaction = match ctx.store.interactions().get(id) {
        Ok(interaction) => interaction,
        Err(StoreError::NotFound(_)) => return Err(not_found("interaction not found")),
        Err(err) => return Err(err.into()),
    };

    if ctx.json {
        return print_json(&interaction);
    }
    println!("id: {}", interaction.id);
    println!("platform: {}", interaction.platform);
    println!("external id: {}", interaction.external_post_id);
    println!("status: {}", interaction.status);
    println!("captured: {}", format_timestamp_datetime(interaction.created_at));
    if let Some(name) = &interaction.author_name {
        println!("author: {name}");
    }
    if let Some(handle) = &interaction.author_handle {
        println!("handle: {handle}");
    }
    if let Some(url) = &interaction.url {
        println!("url: {url}");
    }
    if let Some(tag) = &interaction.tag {
        println!("tag: {tag}");
    }
    if let Some(media) = &interaction.media_url {
        println!("media: {media}");
    }
    if let Some(metrics) = &interaction.metrics {
        let rendered: Vec<String> = metrics
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        println!("metrics: {}", rendered.join(" "));
    }
    println!();
    println!("{}", interaction.content);
    if let Some(reply) = &interaction.reply_text {
        println!();
        println!("reply: {reply}");
    }
    Ok(())
}

pub fn stats(ctx: &Context<'_>) -> Result<()> {
    let stats = ctx.store.interactions().stats()?;
    if ctx.json {
        return print_json(&stats);
    }
    println!("total: {}", stats.total);
    for (platform, count) in &stats.by_platform {
        println!("{platform}: {count}");
    }
    for (status, count) in &stats.by_status {
        println!("{status}: {count}");
    }
    Ok(())
}

pub fn clear(ctx: &Context<'_>, args: ClearArgs) -> Result<()> {
    if !args.yes {
        return Err(invalid_input("refusing to clear without --yes"));
    }
    let deleted = ctx.store.interactions().clear_all()?;
    if ctx.json {
        return print_json(&ClearDto { deleted });
    }
    println!("deleted {deleted} interactions");
    Ok(())
}
