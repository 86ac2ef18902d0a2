use anyhow::{Context as _, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;
use vibebot_config::{AppConfig, FilterConfig};
use vibebot_core::domain::Platform;
use vibebot_core::relevance::{
    KeywordPrefilter, SemanticFilter, DEFAULT_MUST_HAVE, DEFAULT_SKIP_WORDS,
};
use vibebot_scout::{
    AnthropicGenerator, FilterChain, MissionOptions, PlatformClient, RedditClient,
    RedditCredentials, SessionLock, TwitterClient, TwitterCredentials,
};

use crate::error::invalid_input;

pub type Session = SessionLock<Box<dyn PlatformClient>>;

/// Reads a secret from the environment. Empty values count as unset.
pub fn env_secret(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn platform_client(platform: Platform, config: &AppConfig) -> Result<Box<dyn PlatformClient>> {
    match platform {
        Platform::Twitter => {
            let twitter = &config.twitter;
            let credentials = TwitterCredentials {
                access_token: env_secret(&twitter.token_env),
                refresh_token: env_secret(&twitter.refresh_token_env),
                client_id: env_secret(&twitter.client_id_env),
                user_id: env_secret(&twitter.user_id_env),
            };
            debug!(
                has_token = credentials.access_token.is_some(),
                has_refresh = credentials.refresh_token.is_some(),
                "twitter credentials resolved"
            );
            let client = TwitterClient::new(credentials).with_context(|| "build twitter client")?;
            Ok(Box::new(client))
        }
        Platform::Reddit => {
            let reddit = &config.reddit;
            let credentials = RedditCredentials {
                client_id: env_secret(&reddit.client_id_env),
                client_secret: env_secret(&reddit.client_secret_env),
                username: env_secret(&reddit.username_env),
                password: env_secret(&reddit.password_env),
            };
            let client =
                RedditClient::new(credentials, reddit.subreddits.clone(), &reddit.user_agent)
                    .with_context(|| "build reddit client")?;
            Ok(Box::new(client))
        }
        Platform::System => Err(invalid_input("System is not a platform")),
    }
}

/// The session is exclusive per platform across every `vibebot` process
/// sharing `db_path`, so the daemon and manual commands never overlap.
pub fn session(platform: Platform, config: &AppConfig, db_path: &Path) -> Result<Session> {
    let client = platform_client(platform, config)?;
    let lock_path = session_lock_path(db_path, platform);
    debug!(path = %lock_path.display(), "session lock file");
    Ok(SessionLock::new(client, config.scout.lock_timeout).with_lock_file(lock_path))
}

pub fn session_lock_path(db_path: &Path, platform: Platform) -> PathBuf {
    let name = format!("{}.lock", platform.as_str().to_lowercase());
    db_path.with_extension(name)
}

pub fn filter_chain(config: &FilterConfig) -> Result<FilterChain> {
    let must_have = or_defaults(&config.must_have, DEFAULT_MUST_HAVE);
    let skip_words = or_defaults(&config.skip_words, DEFAULT_SKIP_WORDS);
    let semantic = SemanticFilter::new(&config.references, config.threshold)
        .with_context(|| "build semantic filter")?;
    Ok(FilterChain::new(
        Box::new(KeywordPrefilter::new(must_have, skip_words)),
        Box::new(semantic),
    ))
}

fn or_defaults(values: &[String], defaults: &[&str]) -> Vec<String> {
    if values.is_empty() {
        defaults.iter().map(|term| term.to_string()).collect()
    } else {
        values.to_vec()
    }
}

pub fn generator(config: &AppConfig) -> Result<AnthropicGenerator> {
    let settings = &config.generator;
    let generator = AnthropicGenerator::new(
        env_secret(&settings.api_key_env),
        settings.model.clone(),
        settings.max_chars,
    )
    .with_context(|| "build reply generator")?;
    Ok(generator)
}

pub fn mission_options(config: &AppConfig) -> MissionOptions {
    let scout = &config.scout;
    MissionOptions {
        mode: scout.mode,
        limit: scout.limit,
        keyword_cooldown: scout.keyword_cooldown,
        context_size: scout.context_size,
        auto_like: scout.auto_like,
        revisit_seen: scout.revisit_seen,
        media_policy: scout.media_policy,
        tag: None,
    }
}
