use crate::error::Result;
use serde::Deserialize;
use vibebot_core::domain::{Metrics, RawCandidate};

pub const REDDIT_REPLY_LIMIT: usize = 10_000;

const MEDIA_HOSTS: &[&str] = &["i.redd.it", "v.redd.it", "i.imgur.com", "imgur.com", "gfycat.com"];
const MEDIA_HINTS: &[&str] = &["image", "hosted:video", "rich:video"];

#[derive(Debug, Clone, Default)]
pub struct RedditCredentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Submission,
}

#[derive(Debug, Deserialize)]
struct Submission {
    name: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    permalink: String,
    author: Option<String>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: i64,
    post_hint: Option<String>,
    #[serde(default)]
    is_video: bool,
}

impl Submission {
    fn media_url(&self) -> Option<String> {
        let hinted = self
            .post_hint
            .as_deref()
            .is_some_and(|hint| MEDIA_HINTS.contains(&hint));
        let hosted = host_of(&self.url).is_some_and(|host| MEDIA_HOSTS.contains(&host.as_str()));
        if (hinted || hosted || self.is_video) && !self.url.is_empty() {
            Some(self.url.clone())
        } else {
            None
        }
    }
}

/// Lowercased host without port or a leading `www.`.
fn host_of(raw: &str) -> Option<String> {
    let url = url::Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?.trim_end_matches('.').to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(bare) => Some(bare.to_string()),
        None => Some(host),
    }
}

/// Composes the stored content of a link-style post.
pub fn compose_content(title: &str, body: &str, url: &str) -> String {
    format!("Title: {title}\nBody: {body}\nURL: {url}")
}

/// Converts a search listing into candidates keyed by fullname (`t3_…`).
#[cfg_attr(not(feature = "reddit"), allow(dead_code))]
pub(crate) fn parse_listing(body: &str) -> Result<Vec<RawCandidate>> {
    let listing: Listing = serde_json::from_str(body)?;
    Ok(listing
        .data
        .children
        .into_iter()
        .map(|child| {
            let post = child.data;
            let mut candidate = RawCandidate::new(
                post.name.clone(),
                compose_content(&post.title, &post.selftext, &post.url),
            );
            candidate.media_url = post.media_url();
            if let Some(author) = post.author.as_deref().filter(|name| *name != "[deleted]") {
                candidate.author_name = Some(author.to_string());
                candidate.author_handle = Some(format!("u/{author}"));
            }
            if !post.permalink.is_empty() {
                candidate.url = Some(format!("https://www.reddit.com{}", post.permalink));
            }
            let mut metrics = Metrics::new();
            metrics.insert("score".to_string(), post.score);
            metrics.insert("comments".to_string(), post.num_comments);
            candidate.metrics = Some(metrics);
            candidate
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct CommentResponse {
    json: CommentJson,
}

#[derive(Debug, Deserialize)]
struct CommentJson {
    #[serde(default)]
    errors: Vec<Vec<serde_json::Value>>,
}

/// Errors reported by `/api/comment` with `api_type=json`.
#[cfg_attr(not(feature = "reddit"), allow(dead_code))]
pub(crate) fn comment_errors(body: &str) -> Option<String> {
    let parsed: CommentResponse = serde_json::from_str(body).ok()?;
    if parsed.json.errors.is_empty() {
        return None;
    }
    let messages: Vec<String> = parsed
        .json
        .errors
        .iter()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.as_str())
                .collect::<Vec<_>>()
                .join(": ")
        })
        .collect();
    Some(messages.join("; "))
}

#[cfg(feature = "reddit")]
mod imp {
    use super::{comment_errors, parse_listing, RedditCredentials, REDDIT_REPLY_LIMIT};
    use crate::error::{Result, ScoutError};
    use crate::http::{build_client, check_status};
    use crate::platform::PlatformClient;
    use reqwest::blocking::Client;
    use serde::Deserialize;
    use tracing::debug;
    use url::Url;
    use vibebot_core::domain::{Platform, RawCandidate};

    const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
    const API_BASE: &str = "https://oauth.reddit.com";

    #[derive(Deserialize)]
    struct TokenResponse {
        access_token: Option<String>,
        error: Option<String>,
    }

    pub struct RedditClient {
        http: Client,
        credentials: RedditCredentials,
        subreddits: Vec<String>,
        token: Option<String>,
    }

    impl RedditClient {
        pub fn new(
            credentials: RedditCredentials,
            subreddits: Vec<String>,
            user_agent: &str,
        ) -> Result<Self> {
            if subreddits.is_empty() {
                return Err(ScoutError::Config("no subreddits configured".to_string()));
            }
            Ok(Self {
                http: build_client(user_agent)?,
                credentials,
                subreddits,
                token: None,
            })
        }

        fn token(&self) -> Result<&str> {
            self.token
                .as_deref()
                .ok_or_else(|| ScoutError::auth(Platform::Reddit, "not logged in"))
        }

        fn post_form(&mut self, path: &str, form: &[(&str, &str)]) -> Result<String> {
            let response = self
                .http
                .post(format!("{API_BASE}{path}"))
                .bearer_auth(self.token()?)
                .form(form)
                .send()?;
            match check_status(Platform::Reddit, response) {
                Ok(response) => Ok(response.text()?),
                Err(err @ ScoutError::Authentication { .. }) => {
                    self.token = None;
                    Err(err)
                }
                Err(err) => Err(err),
            }
        }
    }

    fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
        value
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ScoutError::Config(format!("missing reddit {name}")))
    }

    impl PlatformClient for RedditClient {
        fn platform(&self) -> Platform {
            Platform::Reddit
        }

        fn is_authenticated(&self) -> bool {
            self.token.is_some()
        }

        fn login(&mut self) -> Result<()> {
            let client_id = required(&self.credentials.client_id, "client id")?;
            let client_secret = required(&self.credentials.client_secret, "client secret")?;
            let username = required(&self.credentials.username, "username")?;
            let password = required(&self.credentials.password, "password")?;
            let response = self
                .http
                .post(TOKEN_URL)
                .basic_auth(client_id, Some(client_secret))
                .form(&[
                    ("grant_type", "password"),
                    ("username", username),
                    ("password", password),
                ])
                .send()?;
            let token: TokenResponse = check_status(Platform::Reddit, response)?.json()?;
            match (token.access_token, token.error) {
                (Some(access_token), _) => {
                    self.token = Some(access_token);
                    Ok(())
                }
                (None, error) => Err(ScoutError::auth(
                    Platform::Reddit,
                    error.unwrap_or_else(|| "token response without access_token".to_string()),
                )),
            }
        }

        fn search(&mut self, query: &str, limit: usize) -> Result<Vec<RawCandidate>> {
            let mut url = Url::parse(&format!(
                "{API_BASE}/r/{}/search",
                self.subreddits.join("+")
            ))?;
            url.query_pairs_mut()
                .append_pair("q", query)
                .append_pair("restrict_sr", "1")
                .append_pair("sort", "new")
                .append_pair("limit", &limit.clamp(1, 100).to_string())
                .append_pair("raw_json", "1");
            let response = self.http.get(url).bearer_auth(self.token()?).send()?;
            let response = match check_status(Platform::Reddit, response) {
                Ok(response) => response,
                Err(err @ ScoutError::Authentication { .. }) => {
                    self.token = None;
                    return Err(err);
                }
                Err(err) => return Err(err),
            };
            let mut candidates = parse_listing(&response.text()?)?;
            candidates.truncate(limit);
            debug!(query, count = candidates.len(), "reddit search");
            Ok(candidates)
        }

        fn like(&mut self, external_post_id: &str) -> Result<()> {
            self.post_form("/api/vote", &[("id", external_post_id), ("dir", "1")])?;
            Ok(())
        }

        fn reply(&mut self, external_post_id: &str, text: &str) -> Result<()> {
            let body = self.post_form(
                "/api/comment",
                &[
                    ("thing_id", external_post_id),
                    ("text", text),
                    ("api_type", "json"),
                ],
            )?;
            match comment_errors(&body) {
                Some(message) => Err(ScoutError::Engagement(message)),
                None => Ok(()),
            }
        }

        fn max_reply_chars(&self) -> usize {
            REDDIT_REPLY_LIMIT
        }
    }
}

#[cfg(not(feature = "reddit"))]
mod imp {
    use super::{RedditCredentials, REDDIT_REPLY_LIMIT};
    use crate::error::{Result, ScoutError};
    use crate::platform::PlatformClient;
    use vibebot_core::domain::{Platform, RawCandidate};

    pub struct RedditClient {
        credentials: RedditCredentials,
        subreddits: Vec<String>,
    }

    impl RedditClient {
        pub fn new(
            credentials: RedditCredentials,
            subreddits: Vec<String>,
            _user_agent: &str,
        ) -> Result<Self> {
            Ok(Self {
                credentials,
                subreddits,
            })
        }

        fn unavailable(&self) -> ScoutError {
            let _ = (&self.credentials, &self.subreddits);
            ScoutError::Unavailable("Reddit support requires the reddit feature".to_string())
        }
    }

    impl PlatformClient for RedditClient {
        fn platform(&self) -> Platform {
            Platform::Reddit
        }

        fn is_authenticated(&self) -> bool {
            false
        }

        fn login(&mut self) -> Result<()> {
            Err(self.unavailable())
        }

        fn search(&mut self, _query: &str, _limit: usize) -> Result<Vec<RawCandidate>> {
            Err(self.unavailable())
        }

        fn like(&mut self, _external_post_id: &str) -> Result<()> {
            Err(self.unavailable())
        }

        fn reply(&mut self, _external_post_id: &str, _text: &str) -> Result<()> {
            Err(self.unavailable())
        }

        fn max_reply_chars(&self) -> usize {
            REDDIT_REPLY_LIMIT
        }
    }
}

pub use imp::RedditClient;
