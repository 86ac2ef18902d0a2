#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use vibebot_core::domain::{Interaction, MissionMode, Platform, RawCandidate};
use vibebot_scout::{GenerationError, MissionOptions, PlatformClient, ReplyGenerator, ScoutError};
use vibebot_store::Store;

pub fn store() -> Store {
    let store = Store::open_in_memory().expect("open store");
    store.migrate().expect("migrate");
    store
}

pub fn options(mode: MissionMode) -> MissionOptions {
    MissionOptions {
        mode,
        limit: 10,
        keyword_cooldown: Duration::ZERO,
        ..MissionOptions::default()
    }
}

pub fn keywords(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

pub fn candidate(id: &str, content: &str) -> RawCandidate {
    RawCandidate::new(id, content)
}

pub fn media_candidate(id: &str, content: &str) -> RawCandidate {
    let mut candidate = RawCandidate::new(id, content);
    candidate.media_url = Some(format!("https://media.example/{id}.png"));
    candidate
}

/// Scripted platform. Tracks every side effect it is asked to perform.
pub struct FakeClient {
    pub platform: Platform,
    pub authenticated: bool,
    pub login_succeeds: bool,
    pub login_calls: usize,
    pub results: HashMap<String, Vec<RawCandidate>>,
    pub failing_queries: HashSet<String>,
    /// Queries whose first search is rejected as unauthenticated.
    pub expiring_queries: HashSet<String>,
    /// Every successful search leaves the session logged out.
    pub expire_after_search: bool,
    pub fail_like: bool,
    pub failing_replies: HashSet<String>,
    pub searches: Vec<String>,
    pub liked: Vec<String>,
    pub replies: Vec<(String, String)>,
    pub max_reply_chars: usize,
    pub delay: Duration,
    pub in_flight: Arc<AtomicUsize>,
    pub max_in_flight: Arc<AtomicUsize>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            platform: Platform::Twitter,
            authenticated: true,
            login_succeeds: true,
            login_calls: 0,
            results: HashMap::new(),
            failing_queries: HashSet::new(),
            expiring_queries: HashSet::new(),
            expire_after_search: false,
            fail_like: false,
            failing_replies: HashSet::new(),
            searches: Vec::new(),
            liked: Vec::new(),
            replies: Vec::new(),
            max_reply_chars: 280,
            delay: Duration::ZERO,
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_results(mut self, query: &str, candidates: Vec<RawCandidate>) -> Self {
        self.results.insert(query.to_string(), candidates);
        self
    }

    pub fn failing_query(mut self, query: &str) -> Self {
        self.failing_queries.insert(query.to_string());
        self
    }

    pub fn expiring_query(mut self, query: &str) -> Self {
        self.expiring_queries.insert(query.to_string());
        self
    }

    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl PlatformClient for FakeClient {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn login(&mut self) -> vibebot_scout::Result<()> {
        self.login_calls += 1;
        if self.login_succeeds {
            self.authenticated = true;
            Ok(())
        } else {
            Err(ScoutError::auth(self.platform, "bad credentials"))
        }
    }

    fn search(&mut self, query: &str, limit: usize) -> vibebot_scout::Result<Vec<RawCandidate>> {
        self.searches.push(query.to_string());
        if self.failing_queries.contains(query) {
            return Err(ScoutError::Http("search timed out".to_string()));
        }
        if !self.authenticated || self.expiring_queries.remove(query) {
            self.authenticated = false;
            return Err(ScoutError::auth(self.platform, "token expired"));
        }
        let mut found = self.results.get(query).cloned().unwrap_or_default();
        found.truncate(limit);
        if self.expire_after_search {
            self.authenticated = false;
        }
        Ok(found)
    }

    fn like(&mut self, external_post_id: &str) -> vibebot_scout::Result<()> {
        if !self.authenticated {
            return Err(ScoutError::auth(self.platform, "token expired"));
        }
        self.enter();
        let result = if self.fail_like {
            Err(ScoutError::Http("like button missing".to_string()))
        } else {
            if !self.liked.iter().any(|id| id == external_post_id) {
                self.liked.push(external_post_id.to_string());
            }
            Ok(())
        };
        self.leave();
        result
    }

    fn reply(&mut self, external_post_id: &str, text: &str) -> vibebot_scout::Result<()> {
        if !self.authenticated {
            return Err(ScoutError::auth(self.platform, "token expired"));
        }
        self.enter();
        let result = if self.failing_replies.contains(external_post_id) {
            Err(ScoutError::Http("compose box disabled".to_string()))
        } else {
            self.replies
                .push((external_post_id.to_string(), text.to_string()));
            Ok(())
        };
        self.leave();
        result
    }

    fn max_reply_chars(&self) -> usize {
        self.max_reply_chars
    }
}

/// Returns a fixed reply and records which posts it was asked about.
pub struct FakeGenerator {
    reply: Option<String>,
    pub calls: AtomicUsize,
    pub targets: Mutex<Vec<String>>,
    pub context_sizes: Mutex<Vec<usize>>,
}

impl FakeGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            calls: AtomicUsize::new(0),
            targets: Mutex::new(Vec::new()),
            context_sizes: Mutex::new(Vec::new()),
        }
    }

    pub fn silent() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            targets: Mutex::new(Vec::new()),
            context_sizes: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReplyGenerator for FakeGenerator {
    fn generate(
        &self,
        target: &Interaction,
        context: &[Interaction],
    ) -> Result<Option<String>, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.targets
            .lock()
            .expect("targets lock")
            .push(target.external_post_id.clone());
        self.context_sizes
            .lock()
            .expect("context lock")
            .push(context.len());
        Ok(self.reply.clone())
    }
}
