use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use vibebot_core::domain::{MediaPolicy, MissionMode, Platform};
use vibebot_core::relevance::DEFAULT_THRESHOLD;

const APP_DIR: &str = "vibebot";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;
pub const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REPLY_MODEL: &str = "claude-haiku-4-5-20251001";

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub scout: ScoutConfig,
    pub scheduler: SchedulerConfig,
    pub filter: FilterConfig,
    pub twitter: TwitterConfig,
    pub reddit: RedditConfig,
    pub generator: GeneratorConfig,
}

#[derive(Debug, Clone)]
pub struct ScoutConfig {
    pub limit: usize,
    pub mode: MissionMode,
    pub keyword_cooldown: Duration,
    pub lock_timeout: Duration,
    pub context_size: usize,
    pub auto_like: bool,
    pub revisit_seen: bool,
    pub media_policy: MediaPolicy,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            mode: MissionMode::Discover,
            keyword_cooldown: Duration::from_secs(5),
            lock_timeout: Duration::from_secs(DEFAULT_LOCK_TIMEOUT_SECS),
            context_size: 10,
            auto_like: true,
            revisit_seen: true,
            media_policy: MediaPolicy::Skip,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub platform: Platform,
    pub mode: MissionMode,
    pub queries: Vec<String>,
    pub query_cooldown: Duration,
    pub rotation_cooldown: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            platform: Platform::Twitter,
            mode: MissionMode::Engage,
            queries: vec![
                "#buildinpublic".to_string(),
                "vibe coding".to_string(),
                "saas".to_string(),
            ],
            query_cooldown: Duration::from_secs(300),
            rotation_cooldown: Duration::from_secs(3600),
        }
    }
}

/// Empty lists mean "use the built-in term lists".
#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub threshold: f64,
    pub must_have: Vec<String>,
    pub skip_words: Vec<String>,
    pub references: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            must_have: Vec::new(),
            skip_words: Vec::new(),
            references: Vec::new(),
        }
    }
}

/// Names of the environment variables holding Twitter credentials.
#[derive(Debug, Clone)]
pub struct TwitterConfig {
    pub token_env: String,
    pub refresh_token_env: String,
    pub client_id_env: String,
    pub user_id_env: String,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            token_env: "VIBEBOT_TWITTER_TOKEN".to_string(),
            refresh_token_env: "VIBEBOT_TWITTER_REFRESH_TOKEN".to_string(),
            client_id_env: "VIBEBOT_TWITTER_CLIENT_ID".to_string(),
            user_id_env: "VIBEBOT_TWITTER_USER_ID".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub subreddits: Vec<String>,
    pub client_id_env: String,
    pub client_secret_env: String,
    pub username_env: String,
    pub password_env: String,
    pub user_agent: String,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            subreddits: vec![
                "saas".to_string(),
                "startups".to_string(),
                "sideproject".to_string(),
                "buildinpublic".to_string(),
            ],
            client_id_env: "REDDIT_CLIENT_ID".to_string(),
            client_secret_env: "REDDIT_CLIENT_SECRET".to_string(),
            username_env: "REDDIT_USERNAME".to_string(),
            password_env: "REDDIT_PASSWORD".to_string(),
            user_agent: "vibebot/0.1".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub model: String,
    pub api_key_env: String,
    pub max_chars: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_REPLY_MODEL.to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            max_chars: 280,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid scout.limit value: {0} (expected 1..={MAX_LIMIT})")]
    InvalidLimit(usize),
    #[error("invalid scout.lock_timeout_secs value: {0}")]
    InvalidLockTimeout(u64),
    #[error("invalid filter.threshold value: {0}")]
    InvalidThreshold(f64),
    #[error("invalid generator.max_chars value: {0}")]
    InvalidMaxChars(usize),
    #[error("invalid scheduler.platform value: {0}")]
    InvalidPlatform(String),
    #[error("scheduler.queries must not be empty")]
    EmptyQueries,
    #[error("reddit.subreddits must not be empty")]
    EmptySubreddits,
    #[error("invalid {field} value: {value:?}")]
    InvalidField { field: &'static str, value: String },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    scout: Option<ScoutFile>,
    scheduler: Option<SchedulerFile>,
    filter: Option<FilterFile>,
    twitter: Option<TwitterFile>,
    reddit: Option<RedditFile>,
    generator: Option<GeneratorFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScoutFile {
    limit: Option<usize>,
    mode: Option<MissionMode>,
    keyword_cooldown_secs: Option<u64>,
    lock_timeout_secs: Option<u64>,
    context_size: Option<usize>,
    auto_like: Option<bool>,
    revisit_seen: Option<bool>,
    media_policy: Option<MediaPolicy>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchedulerFile {
    platform: Option<String>,
    mode: Option<MissionMode>,
    queries: Option<Vec<String>>,
    query_cooldown_secs: Option<u64>,
    rotation_cooldown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FilterFile {
    threshold: Option<f64>,
    must_have: Option<Vec<String>>,
    skip_words: Option<Vec<String>>,
    references: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TwitterFile {
    token_env: Option<String>,
    refresh_token_env: Option<String>,
    client_id_env: Option<String>,
    user_id_env: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RedditFile {
    subreddits: Option<Vec<String>>,
    client_id_env: Option<String>,
    client_secret_env: Option<String>,
    username_env: Option<String>,
    password_env: Option<String>,
    user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct GeneratorFile {
    model: Option<String>,
    api_key_env: Option<String>,
    max_chars: Option<usize>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(scout) = parsed.scout {
        let target = &mut config.scout;
        if let Some(limit) = scout.limit {
            if limit == 0 || limit > MAX_LIMIT {
                return Err(ConfigError::InvalidLimit(limit));
            }
            target.limit = limit;
        }
        if let Some(mode) = scout.mode {
            target.mode = mode;
        }
        if let Some(secs) = scout.keyword_cooldown_secs {
            target.keyword_cooldown = Duration::from_secs(secs);
        }
        if let Some(secs) = scout.lock_timeout_secs {
            if secs == 0 {
                return Err(ConfigError::InvalidLockTimeout(secs));
            }
            target.lock_timeout = Duration::from_secs(secs);
        }
        if let Some(size) = scout.context_size {
            target.context_size = size;
        }
        if let Some(auto_like) = scout.auto_like {
            target.auto_like = auto_like;
        }
        if let Some(revisit) = scout.revisit_seen {
            target.revisit_seen = revisit;
        }
        if let Some(policy) = scout.media_policy {
            target.media_policy = policy;
        }
    }

    if let Some(scheduler) = parsed.scheduler {
        let target = &mut config.scheduler;
        if let Some(raw) = scheduler.platform {
            let platform: Platform = raw
                .parse()
                .map_err(|_| ConfigError::InvalidPlatform(raw.clone()))?;
            if platform == Platform::System {
                return Err(ConfigError::InvalidPlatform(raw));
            }
            target.platform = platform;
        }
        if let Some(mode) = scheduler.mode {
            target.mode = mode;
        }
        if let Some(queries) = scheduler.queries {
            let queries = clean_list(queries);
            if queries.is_empty() {
                return Err(ConfigError::EmptyQueries);
            }
            target.queries = queries;
        }
        if let Some(secs) = scheduler.query_cooldown_secs {
            target.query_cooldown = Duration::from_secs(secs);
        }
        if let Some(secs) = scheduler.rotation_cooldown_secs {
            target.rotation_cooldown = Duration::from_secs(secs);
        }
    }

    if let Some(filter) = parsed.filter {
        let target = &mut config.filter;
        if let Some(threshold) = filter.threshold {
            if !(threshold > 0.0 && threshold <= 1.0) {
                return Err(ConfigError::InvalidThreshold(threshold));
            }
            target.threshold = threshold;
        }
        if let Some(terms) = filter.must_have {
            target.must_have = clean_list(terms);
        }
        if let Some(terms) = filter.skip_words {
            target.skip_words = clean_list(terms);
        }
        if let Some(references) = filter.references {
            target.references = clean_list(references);
        }
    }

    if let Some(twitter) = parsed.twitter {
        let target = &mut config.twitter;
        apply_env_name(&mut target.token_env, twitter.token_env, "twitter.token_env")?;
        apply_env_name(
            &mut target.refresh_token_env,
            twitter.refresh_token_env,
            "twitter.refresh_token_env",
        )?;
        apply_env_name(
            &mut target.client_id_env,
            twitter.client_id_env,
            "twitter.client_id_env",
        )?;
        apply_env_name(&mut target.user_id_env, twitter.user_id_env, "twitter.user_id_env")?;
    }

    if let Some(reddit) = parsed.reddit {
        let target = &mut config.reddit;
        if let Some(subreddits) = reddit.subreddits {
            let subreddits: Vec<String> = clean_list(subreddits)
                .into_iter()
                .map(|name| name.trim_start_matches("r/").to_string())
                .collect();
            if subreddits.is_empty() {
                return Err(ConfigError::EmptySubreddits);
            }
            target.subreddits = subreddits;
        }
        apply_env_name(&mut target.client_id_env, reddit.client_id_env, "reddit.client_id_env")?;
        apply_env_name(
            &mut target.client_secret_env,
            reddit.client_secret_env,
            "reddit.client_secret_env",
        )?;
        apply_env_name(&mut target.username_env, reddit.username_env, "reddit.username_env")?;
        apply_env_name(&mut target.password_env, reddit.password_env, "reddit.password_env")?;
        if let Some(agent) = reddit.user_agent {
            let agent = agent.trim().to_string();
            if agent.is_empty() {
                return Err(ConfigError::InvalidField {
                    field: "reddit.user_agent",
                    value: agent,
                });
            }
            target.user_agent = agent;
        }
    }

    if let Some(generator) = parsed.generator {
        let target = &mut config.generator;
        if let Some(model) = generator.model {
            let model = model.trim().to_string();
            if model.is_empty() {
                return Err(ConfigError::InvalidField {
                    field: "generator.model",
                    value: model,
                });
            }
            target.model = model;
        }
        apply_env_name(&mut target.api_key_env, generator.api_key_env, "generator.api_key_env")?;
        if let Some(max_chars) = generator.max_chars {
            if max_chars == 0 {
                return Err(ConfigError::InvalidMaxChars(max_chars));
            }
            target.max_chars = max_chars;
        }
    }

    Ok(config)
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

fn apply_env_name(target: &mut String, value: Option<String>, field: &'static str) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    let trimmed = value.trim();
    let valid = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if !valid {
        return Err(ConfigError::InvalidField { field, value });
    }
    *target = trimmed.to_string();
    Ok(())
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_at_path, merge_config, ConfigError, ConfigFile, ScoutFile, SchedulerFile};
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;
    use vibebot_core::domain::{MediaPolicy, MissionMode, Platform};

    fn restrict_permissions(path: &Path) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path).expect("metadata").permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).expect("chmod");
        }
    }

    #[test]
    fn merge_config_applies_values() {
        let parsed = ConfigFile {
            scout: Some(ScoutFile {
                limit: Some(3),
                mode: Some(MissionMode::Engage),
                lock_timeout_secs: Some(12),
                media_policy: Some(MediaPolicy::LikeOnly),
                ..Default::default()
            }),
            scheduler: Some(SchedulerFile {
                platform: Some("reddit".to_string()),
                queries: Some(vec![" saas ".to_string(), "".to_string()]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge_config(parsed).expect("merge");
        assert_eq!(merged.scout.limit, 3);
        assert_eq!(merged.scout.mode, MissionMode::Engage);
        assert_eq!(merged.scout.lock_timeout, Duration::from_secs(12));
        assert_eq!(merged.scout.media_policy, MediaPolicy::LikeOnly);
        assert_eq!(merged.scheduler.platform, Platform::Reddit);
        assert_eq!(merged.scheduler.queries, vec!["saas".to_string()]);
    }

    #[test]
    fn merge_config_rejects_zero_limit() {
        let parsed = ConfigFile {
            scout: Some(ScoutFile {
                limit: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(matches!(
            merge_config(parsed),
            Err(ConfigError::InvalidLimit(0))
        ));
    }

    #[test]
    fn merge_config_rejects_system_platform() {
        let parsed = ConfigFile {
            scheduler: Some(SchedulerFile {
                platform: Some("System".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(matches!(
            merge_config(parsed),
            Err(ConfigError::InvalidPlatform(_))
        ));
    }

    #[test]
    fn load_at_path_requires_file_when_requested() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        let err = load_at_path(&missing, true).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_at_path_parses_toml() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "[scout]\nlimit = 5\nmode = \"engage\"\nmedia_policy = \"engage\"\n\
             [generator]\napi_key_env = \"MY_KEY\"\nmax_chars = 200\n\
             [reddit]\nsubreddits = [\"r/rust\"]\n",
        )
        .expect("write config");
        restrict_permissions(&path);

        let config = load_at_path(&path, true).expect("load").expect("config");
        assert_eq!(config.scout.limit, 5);
        assert_eq!(config.scout.mode, MissionMode::Engage);
        assert_eq!(config.scout.media_policy, MediaPolicy::Engage);
        assert_eq!(config.generator.api_key_env, "MY_KEY");
        assert_eq!(config.generator.max_chars, 200);
        assert_eq!(config.reddit.subreddits, vec!["rust".to_string()]);
    }

    #[test]
    fn load_at_path_rejects_unknown_keys() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "[scout]\nlimitt = 5\n").expect("write config");
        restrict_permissions(&path);
        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn invalid_env_name_rejected() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "[twitter]\ntoken_env = \"has space\"\n").expect("write config");
        restrict_permissions(&path);
        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { .. }));
    }
}
