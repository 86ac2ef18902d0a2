use crate::error::Result;
use serde::Deserialize;
use std::collections::HashMap;
use vibebot_core::domain::{Metrics, RawCandidate};

pub const TWITTER_REPLY_LIMIT: usize = 280;

/// Credentials resolved from the environment by the caller.
#[derive(Debug, Clone, Default)]
pub struct TwitterCredentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub client_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Tweet>,
    #[serde(default)]
    includes: Includes,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: String,
    text: String,
    author_id: Option<String>,
    public_metrics: Option<HashMap<String, i64>>,
    attachments: Option<Attachments>,
}

#[derive(Debug, Deserialize)]
struct Attachments {
    #[serde(default)]
    media_keys: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Includes {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    media: Vec<Media>,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
    name: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct Media {
    media_key: String,
    url: Option<String>,
    preview_image_url: Option<String>,
}

/// Converts a v2 recent-search payload into candidates, newest first as
/// returned. Posts with attachment media keys count as media posts even when
/// the media object itself was not expanded.
#[cfg_attr(not(feature = "twitter"), allow(dead_code))]
pub(crate) fn parse_search_response(body: &str) -> Result<Vec<RawCandidate>> {
    let response: SearchResponse = serde_json::from_str(body)?;
    let users: HashMap<&str, &User> = response
        .includes
        .users
        .iter()
        .map(|user| (user.id.as_str(), user))
        .collect();
    let media: HashMap<&str, &Media> = response
        .includes
        .media
        .iter()
        .map(|item| (item.media_key.as_str(), item))
        .collect();

    let mut out = Vec::with_capacity(response.data.len());
    for tweet in &response.data {
        let author = tweet
            .author_id
            .as_deref()
            .and_then(|id| users.get(id).copied());
        let mut candidate = RawCandidate::new(tweet.id.clone(), tweet.text.clone());
        if let Some(author) = author {
            candidate.author_name = Some(author.name.clone());
            candidate.author_handle = Some(author.username.clone());
            candidate.url = Some(format!(
                "https://x.com/{}/status/{}",
                author.username, tweet.id
            ));
        } else {
            candidate.url = Some(format!("https://x.com/i/web/status/{}", tweet.id));
        }
        candidate.metrics = tweet.public_metrics.as_ref().map(|counts| {
            counts
                .iter()
                .map(|(key, value)| (key.trim_end_matches("_count").to_string(), *value))
                .collect::<Metrics>()
        });
        if let Some(first_key) = tweet
            .attachments
            .as_ref()
            .and_then(|attachments| attachments.media_keys.first())
        {
            let expanded = media.get(first_key.as_str()).and_then(|item| {
                item.url
                    .clone()
                    .or_else(|| item.preview_image_url.clone())
            });
            candidate.media_url = Some(
                expanded.unwrap_or_else(|| format!("https://x.com/i/web/status/{}/photo/1", tweet.id)),
            );
        }
        out.push(candidate);
    }
    Ok(out)
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    detail: String,
}

/// Errors reported inside a 200 response body.
#[cfg_attr(not(feature = "twitter"), allow(dead_code))]
pub(crate) fn body_errors(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let messages: Vec<&str> = parsed
        .errors
        .iter()
        .map(|err| {
            if err.detail.is_empty() {
                err.message.as_str()
            } else {
                err.detail.as_str()
            }
        })
        .filter(|message| !message.is_empty())
        .collect();
    if messages.is_empty() {
        None
    } else {
        Some(messages.join("; "))
    }
}

#[cfg(feature = "twitter")]
mod imp {
    use super::{body_errors, parse_search_response, TwitterCredentials, TWITTER_REPLY_LIMIT};
    use crate::error::{Result, ScoutError};
    use crate::http::{build_client, check_status};
    use crate::platform::PlatformClient;
    use reqwest::blocking::Client;
    use serde::Deserialize;
    use serde_json::json;
    use tracing::{debug, info};
    use url::Url;
    use vibebot_core::domain::{Platform, RawCandidate};

    const API_BASE: &str = "https://api.twitter.com/2";
    const TOKEN_URL: &str = "https://api.twitter.com/2/oauth2/token";

    #[derive(Deserialize)]
    struct TokenResponse {
        access_token: String,
        refresh_token: Option<String>,
    }

    #[derive(Deserialize)]
    struct MeResponse {
        data: MeData,
    }

    #[derive(Deserialize)]
    struct MeData {
        id: String,
    }

    pub struct TwitterClient {
        http: Client,
        credentials: TwitterCredentials,
        authenticated: bool,
    }

    impl TwitterClient {
        pub fn new(credentials: TwitterCredentials) -> Result<Self> {
            Ok(Self {
                http: build_client("vibebot")?,
                credentials,
                authenticated: false,
            })
        }

        fn token(&self) -> Result<&str> {
            self.credentials
                .access_token
                .as_deref()
                .ok_or_else(|| ScoutError::auth(Platform::Twitter, "no access token"))
        }

        fn refresh(&mut self) -> Result<()> {
            let (Some(refresh_token), Some(client_id)) = (
                self.credentials.refresh_token.clone(),
                self.credentials.client_id.clone(),
            ) else {
                return Err(ScoutError::auth(
                    Platform::Twitter,
                    "access token rejected and no refresh token configured",
                ));
            };
            let response = self
                .http
                .post(TOKEN_URL)
                .form(&[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token.as_str()),
                    ("client_id", client_id.as_str()),
                ])
                .send()?;
            let token: TokenResponse = check_status(Platform::Twitter, response)?.json()?;
            self.credentials.access_token = Some(token.access_token);
            if token.refresh_token.is_some() {
                self.credentials.refresh_token = token.refresh_token;
            }
            info!("twitter access token refreshed");
            Ok(())
        }

        fn verify(&mut self) -> Result<()> {
            let response = self
                .http
                .get(format!("{API_BASE}/users/me"))
                .bearer_auth(self.token()?)
                .send()?;
            let me: MeResponse = check_status(Platform::Twitter, response)?.json()?;
            if self.credentials.user_id.is_none() {
                self.credentials.user_id = Some(me.data.id);
            }
            Ok(())
        }

        fn user_id(&self) -> Result<&str> {
            self.credentials
                .user_id
                .as_deref()
                .ok_or_else(|| ScoutError::Config("twitter user id unknown".to_string()))
        }

        fn post_json(&mut self, url: &str, body: serde_json::Value) -> Result<()> {
            let response = self
                .http
                .post(url)
                .bearer_auth(self.token()?)
                .json(&body)
                .send()?;
            let response = match check_status(Platform::Twitter, response) {
                Ok(response) => response,
                Err(err @ ScoutError::Authentication { .. }) => {
                    self.authenticated = false;
                    return Err(err);
                }
                Err(err) => return Err(err),
            };
            let text = response.text()?;
            match body_errors(&text) {
                Some(message) => Err(ScoutError::Engagement(message)),
                None => Ok(()),
            }
        }
    }

    impl PlatformClient for TwitterClient {
        fn platform(&self) -> Platform {
            Platform::Twitter
        }

        fn is_authenticated(&self) -> bool {
            self.authenticated
        }

        fn login(&mut self) -> Result<()> {
            if self.credentials.access_token.is_none() {
                self.refresh()?;
            }
            match self.verify() {
                Ok(()) => {}
                Err(ScoutError::Authentication { .. }) => {
                    self.refresh()?;
                    self.verify()?;
                }
                Err(err) => return Err(err),
            }
            self.authenticated = true;
            Ok(())
        }

        fn search(&mut self, query: &str, limit: usize) -> Result<Vec<RawCandidate>> {
            let mut url = Url::parse(&format!("{API_BASE}/tweets/search/recent"))?;
            let max_results = limit.clamp(10, 100).to_string();
            url.query_pairs_mut()
                .append_pair("query", &format!("{query} -is:retweet"))
                .append_pair("max_results", &max_results)
                .append_pair("tweet.fields", "created_at,public_metrics,attachments,author_id")
                .append_pair("expansions", "author_id,attachments.media_keys")
                .append_pair("user.fields", "name,username")
                .append_pair("media.fields", "url,preview_image_url,type");
            let response = self.http.get(url).bearer_auth(self.token()?).send()?;
            let response = match check_status(Platform::Twitter, response) {
                Ok(response) => response,
                Err(err @ ScoutError::Authentication { .. }) => {
                    self.authenticated = false;
                    return Err(err);
                }
                Err(err) => return Err(err),
            };
            let mut candidates = parse_search_response(&response.text()?)?;
            candidates.truncate(limit);
            debug!(query, count = candidates.len(), "twitter search");
            Ok(candidates)
        }

        fn like(&mut self, external_post_id: &str) -> Result<()> {
            let url = format!("{API_BASE}/users/{}/likes", self.user_id()?);
            self.post_json(&url, json!({ "tweet_id": external_post_id }))
        }

        fn reply(&mut self, external_post_id: &str, text: &str) -> Result<()> {
            let url = format!("{API_BASE}/tweets");
            self.post_json(
                &url,
                json!({
                    "text": text,
                    "reply": { "in_reply_to_tweet_id": external_post_id },
                }),
            )
        }

        fn max_reply_chars(&self) -> usize {
            TWITTER_REPLY_LIMIT
        }
    }
}

#[cfg(not(feature = "twitter"))]
mod imp {
    use super::{TwitterCredentials, TWITTER_REPLY_LIMIT};
    use crate::error::{Result, ScoutError};
    use crate::platform::PlatformClient;
    use vibebot_core::domain::{Platform, RawCandidate};

    pub struct TwitterClient {
        credentials: TwitterCredentials,
    }

    impl TwitterClient {
        pub fn new(credentials: TwitterCredentials) -> Result<Self> {
            Ok(Self { credentials })
        }

        fn unavailable(&self) -> ScoutError {
            let _ = &self.credentials;
            ScoutError::Unavailable("Twitter support requires the twitter feature".to_string())
        }
    }

    impl PlatformClient for TwitterClient {
        fn platform(&self) -> Platform {
            Platform::Twitter
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
            TWITTER_REPLY_LIMIT
        }
    }
}

pub use imp::TwitterClient;

#[cfg(test)]
mod tests {
    use super::{body_errors, parse_search_response};

    const SEARCH_BODY: &str = r#"{
      "data": [
        {"id": "101", "text": "Day 12 of building my SaaS in public", "author_id": "7",
         "public_metrics": {"reply_count": 2, "retweet_count": 1, "like_count": 9, "quote_count": 0}},
        {"id": "102", "text": "Screenshot of the new dashboard", "author_id": "8",
         "attachments": {"media_keys": ["3_1"]}}
      ],
      "includes": {
        "users": [{"id": "7", "name": "Ada", "username": "ada"}],
        "media": [{"media_key": "3_1", "type": "photo", "url": "https://pbs.twimg.com/media/a.jpg"}]
      },
      "meta": {"result_count": 2}
    }"#;

    #[test]
    fn parses_authors_metrics_and_media() {
        let candidates = parse_search_response(SEARCH_BODY).expect("parse");
        assert_eq!(candidates.len(), 2);

        let first = &candidates[0];
        assert_eq!(first.external_post_id, "101");
        assert_eq!(first.author_name.as_deref(), Some("Ada"));
        assert_eq!(first.author_handle.as_deref(), Some("ada"));
        assert_eq!(first.url.as_deref(), Some("https://x.com/ada/status/101"));
        let metrics = first.metrics.as_ref().expect("metrics");
        assert_eq!(metrics.get("like"), Some(&9));
        assert_eq!(metrics.get("reply"), Some(&2));
        assert!(!first.has_media());

        let second = &candidates[1];
        assert_eq!(second.author_name, None);
        assert_eq!(
            second.media_url.as_deref(),
            Some("https://pbs.twimg.com/media/a.jpg")
        );
    }

    #[test]
    fn empty_search_has_no_data_key() {
        let candidates =
            parse_search_response(r#"{"meta": {"result_count": 0}}"#).expect("parse");
        assert!(candidates.is_empty());
    }

    #[test]
    fn reports_errors_embedded_in_body() {
        assert_eq!(
            body_errors(r#"{"errors":[{"message":"x","detail":"You are not allowed"}]}"#),
            Some("You are not allowed".to_string())
        );
        assert_eq!(body_errors(r#"{"data":{"liked":true}}"#), None);
    }
}
