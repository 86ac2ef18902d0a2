use crate::engage;
use crate::error::{Result, ScoutError};
use crate::generate::ReplyGenerator;
use crate::platform::{ensure_authenticated, relogin, PlatformClient};
use crate::session::SessionLock;
use crate::source::{Acquisition, CandidateSource, SourceOptions};
use serde::Serialize;
use std::collections::HashSet;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use vibebot_core::domain::{
    Interaction, InteractionId, InteractionUpsert, MediaPolicy, MissionMode, Platform,
    RawCandidate,
};
use vibebot_core::relevance::{CandidateFilter, PassThrough};
use vibebot_core::rules::clean_generated_reply;
use vibebot_core::time::now_utc;
use vibebot_store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionState {
    Acquiring,
    Filtering,
    DiscoverOnly,
    Engaging,
    Summarizing,
    Done,
    Aborted,
}

#[derive(Debug, Clone)]
pub struct MissionOptions {
    pub mode: MissionMode,
    pub limit: usize,
    pub keyword_cooldown: Duration,
    pub context_size: usize,
    pub auto_like: bool,
    pub revisit_seen: bool,
    pub media_policy: MediaPolicy,
    /// Stored as the tag of every capture; each keyword is used when unset.
    pub tag: Option<String>,
}

impl Default for MissionOptions {
    fn default() -> Self {
        Self {
            mode: MissionMode::Discover,
            limit: 10,
            keyword_cooldown: Duration::from_secs(5),
            context_size: 10,
            auto_like: true,
            revisit_seen: true,
            media_policy: MediaPolicy::Skip,
            tag: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MissionReport {
    pub platform: Option<Platform>,
    pub mode: MissionMode,
    pub state: MissionState,
    pub found: usize,
    pub filtered: usize,
    pub engaged: usize,
    pub liked_only: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Replies that were published but could not be marked POSTED.
    pub unrecorded: usize,
    pub failed_keywords: Vec<String>,
    /// Last authentication failure seen mid-mission.
    pub auth_error: Option<String>,
    pub alert_id: Option<InteractionId>,
    pub abort_reason: Option<String>,
}

impl MissionReport {
    fn new(mode: MissionMode) -> Self {
        Self {
            platform: None,
            mode,
            state: MissionState::Acquiring,
            found: 0,
            filtered: 0,
            engaged: 0,
            liked_only: 0,
            skipped: 0,
            failed: 0,
            unrecorded: 0,
            failed_keywords: Vec::new(),
            auth_error: None,
            alert_id: None,
            abort_reason: None,
        }
    }

    fn abort(mut self, reason: String) -> Self {
        self.state = MissionState::Aborted;
        self.abort_reason = Some(reason);
        self
    }

    pub fn aborted(&self) -> bool {
        self.state == MissionState::Aborted
    }
}

/// Cheap keyword matching, then the semantic filter on what survived.
pub struct FilterChain {
    cheap: Box<dyn CandidateFilter>,
    semantic: Box<dyn CandidateFilter>,
}

impl FilterChain {
    pub fn new(cheap: Box<dyn CandidateFilter>, semantic: Box<dyn CandidateFilter>) -> Self {
        Self { cheap, semantic }
    }

    pub fn pass_through() -> Self {
        Self::new(Box::new(PassThrough), Box::new(PassThrough))
    }

    pub fn apply(&self, candidates: Vec<RawCandidate>) -> Vec<RawCandidate> {
        let total = candidates.len();
        let kept = self.cheap.filter(candidates);
        debug!(filter = self.cheap.name(), total, kept = kept.len(), "filtered");
        if kept.is_empty() {
            return kept;
        }
        let total = kept.len();
        let kept = self.semantic.filter(kept);
        debug!(filter = self.semantic.name(), total, kept = kept.len(), "filtered");
        kept
    }
}

enum ItemOutcome {
    Engaged,
    LikedOnly,
    Unrecorded,
    Skipped(&'static str),
}

/// A session that goes stale mid-mission gets one more login; after that,
/// work needing the session fails with an authentication error.
#[derive(Default)]
struct Relogin {
    spent: bool,
}

impl Relogin {
    fn ensure<C: PlatformClient + ?Sized>(&mut self, client: &mut C) -> Result<()> {
        if client.is_authenticated() {
            return Ok(());
        }
        self.force(client)
    }

    fn force<C: PlatformClient + ?Sized>(&mut self, client: &mut C) -> Result<()> {
        if self.spent {
            return Err(ScoutError::auth(
                client.platform(),
                "session expired again after a login this mission",
            ));
        }
        self.spent = true;
        relogin(client)
    }
}

/// Runs missions: acquire, archive, filter and optionally engage.
pub struct Orchestrator<'a> {
    store: &'a Store,
    filters: &'a FilterChain,
    generator: &'a dyn ReplyGenerator,
    options: MissionOptions,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        store: &'a Store,
        filters: &'a FilterChain,
        generator: &'a dyn ReplyGenerator,
        options: MissionOptions,
    ) -> Self {
        Self {
            store,
            filters,
            generator,
            options,
        }
    }

    pub fn options(&self) -> &MissionOptions {
        &self.options
    }

    /// Holds the session for the whole mission. Only a store failure while
    /// recording an alert escapes as `Err`; everything else ends up in the
    /// report.
    pub fn run<C: PlatformClient>(
        &self,
        session: &SessionLock<C>,
        keywords: &[String],
    ) -> Result<MissionReport> {
        let mut report = MissionReport::new(self.options.mode);

        let mut client = match session.acquire() {
            Ok(client) => client,
            Err(err) => {
                warn!(error = %err, "mission aborted");
                return Ok(report.abort(err.to_string()));
            }
        };
        let platform = client.platform();
        report.platform = Some(platform);

        if let Err(err) = ensure_authenticated(&mut *client) {
            error!(%platform, error = %err, "mission aborted");
            let alert = self.record_alert(platform, &format!("{platform} login failed: {err}"))?;
            report.alert_id = Some(alert);
            return Ok(report.abort(err.to_string()));
        }

        info!(%platform, mode = %self.options.mode, keywords = keywords.len(), "mission started");
        let mut relogin = Relogin::default();
        let candidates = self.acquire_all(&mut *client, keywords, &mut relogin, &mut report);

        report.state = MissionState::Filtering;
        let candidates = self.filters.apply(candidates);
        report.filtered = candidates.len();

        match self.options.mode {
            MissionMode::Discover => report.state = MissionState::DiscoverOnly,
            MissionMode::Engage => {
                report.state = MissionState::Engaging;
                self.engage_all(&mut *client, &candidates, &mut relogin, &mut report);
            }
        }
        drop(client);

        report.state = MissionState::Summarizing;
        if report.found == 0 {
            let message = match &report.auth_error {
                Some(err) => format!(
                    "{platform} session lost during mission for keywords {}: {err}",
                    keywords.join(", ")
                ),
                None => format!(
                    "No candidates found on {platform} for keywords: {}",
                    keywords.join(", ")
                ),
            };
            warn!(%platform, "mission found nothing");
            report.alert_id = Some(self.record_alert(platform, &message)?);
        }

        report.state = MissionState::Done;
        info!(
            %platform,
            found = report.found,
            filtered = report.filtered,
            engaged = report.engaged,
            failed = report.failed,
            unrecorded = report.unrecorded,
            "mission finished"
        );
        Ok(report)
    }

    fn acquire_all<C: PlatformClient + ?Sized>(
        &self,
        client: &mut C,
        keywords: &[String],
        relogin: &mut Relogin,
        report: &mut MissionReport,
    ) -> Vec<RawCandidate> {
        let source = CandidateSource::new(
            self.store,
            SourceOptions {
                revisit_seen: self.options.revisit_seen,
                media_policy: self.options.media_policy,
            },
        );
        let mut archived = HashSet::new();
        let mut queued = HashSet::new();
        let mut candidates = Vec::new();

        for (index, keyword) in keywords.iter().enumerate() {
            if index > 0 && !self.options.keyword_cooldown.is_zero() {
                thread::sleep(self.options.keyword_cooldown);
            }
            let tag = self.options.tag.as_deref().unwrap_or(keyword);
            match self.acquire_keyword(&source, client, keyword, tag, relogin) {
                Ok(acquisition) => {
                    debug!(
                        keyword,
                        archived = acquisition.archived.len(),
                        media_skipped = acquisition.media_skipped,
                        skipped_seen = acquisition.skipped_seen,
                        "keyword acquired"
                    );
                    archived.extend(acquisition.archived);
                    for candidate in acquisition.candidates {
                        if queued.insert(candidate.external_post_id.clone()) {
                            candidates.push(candidate);
                        }
                    }
                }
                Err(err) => {
                    warn!(keyword, error = %err, "keyword skipped");
                    if err.is_auth() {
                        report.auth_error = Some(err.to_string());
                    }
                    report.failed_keywords.push(keyword.clone());
                }
            }
        }
        report.found = archived.len();
        candidates
    }

    /// A search rejected for authentication is retried once after a login,
    /// if the mission still has its login to spend.
    fn acquire_keyword<C: PlatformClient + ?Sized>(
        &self,
        source: &CandidateSource<'_>,
        client: &mut C,
        keyword: &str,
        tag: &str,
        relogin: &mut Relogin,
    ) -> Result<Acquisition> {
        relogin.ensure(client)?;
        match source.acquire_with(client, keyword, self.options.limit, Some(tag)) {
            Err(err) if err.is_auth() && !relogin.spent => {
                warn!(keyword, error = %err, "session expired, logging in again");
                relogin.force(client)?;
                source.acquire_with(client, keyword, self.options.limit, Some(tag))
            }
            other => other,
        }
    }

    fn engage_all<C: PlatformClient + ?Sized>(
        &self,
        client: &mut C,
        candidates: &[RawCandidate],
        relogin: &mut Relogin,
        report: &mut MissionReport,
    ) {
        for candidate in candidates {
            let outcome = relogin
                .ensure(client)
                .and_then(|()| self.engage_one(client, candidate));
            match outcome {
                Ok(ItemOutcome::Engaged) => report.engaged += 1,
                Ok(ItemOutcome::LikedOnly) => report.liked_only += 1,
                Ok(ItemOutcome::Unrecorded) => report.unrecorded += 1,
                Ok(ItemOutcome::Skipped(reason)) => {
                    debug!(external_post_id = %candidate.external_post_id, reason, "item skipped");
                    report.skipped += 1;
                }
                Err(err) => {
                    warn!(
                        external_post_id = %candidate.external_post_id,
                        error = %err,
                        "engagement failed"
                    );
                    report.failed += 1;
                }
            }
        }
    }

    fn engage_one<C: PlatformClient + ?Sized>(
        &self,
        client: &mut C,
        candidate: &RawCandidate,
    ) -> Result<ItemOutcome> {
        let platform = client.platform();
        let repo = self.store.interactions();
        let external_post_id = candidate.external_post_id.trim();
        let Some(record) = repo.find_by_external_id(external_post_id)? else {
            return Ok(ItemOutcome::Skipped("not archived"));
        };
        if record.has_reply() {
            return Ok(ItemOutcome::Skipped("already replied"));
        }

        if record.has_media() || candidate.has_media() {
            let policy = self.options.media_policy;
            if !policy.allows_engagement() {
                return Ok(ItemOutcome::Skipped("media"));
            }
            if !policy.allows_reply() {
                if !self.options.auto_like {
                    return Ok(ItemOutcome::Skipped("media"));
                }
                engage::like(client, external_post_id)?;
                return Ok(ItemOutcome::LikedOnly);
            }
        }

        let context: Vec<Interaction> = repo
            .recent(self.options.context_size as i64)?
            .into_iter()
            .filter(|item| item.id != record.id)
            .collect();
        let generated = match self.generator.generate(&record, &context) {
            Ok(text) => text,
            Err(err) => {
                warn!(external_post_id, error = %err, "reply generation failed");
                return Ok(ItemOutcome::Skipped("generation failed"));
            }
        };
        let max_chars = client.max_reply_chars();
        let Some(text) = generated
            .as_deref()
            .and_then(|text| clean_generated_reply(text, max_chars))
        else {
            return Ok(ItemOutcome::Skipped("no reply generated"));
        };

        let outcome = engage::engage(
            client,
            external_post_id,
            Some(&text),
            self.options.auto_like,
        );
        if !outcome.succeeded() {
            return Err(ScoutError::Engagement(
                outcome.failure().unwrap_or("reply not published").to_string(),
            ));
        }
        info!(%platform, external_post_id, "reply posted");
        Ok(self.record_posted(platform, external_post_id, &text))
    }

    /// The reply is already public, so a store failure here is retried once
    /// and then logged with the text rather than counted as a failed item.
    fn record_posted(&self, platform: Platform, external_post_id: &str, text: &str) -> ItemOutcome {
        let repo = self.store.interactions();
        let attempt = || {
            repo.upsert(
                now_utc(),
                InteractionUpsert::posted(platform, external_post_id, text),
            )
        };
        let result = attempt().or_else(|err| {
            warn!(external_post_id, error = %err, "recording reply failed, retrying");
            attempt()
        });
        match result {
            Ok(_) => ItemOutcome::Engaged,
            Err(err) => {
                error!(
                    %platform,
                    external_post_id,
                    reply_text = text,
                    error = %err,
                    "reply published but not recorded"
                );
                ItemOutcome::Unrecorded
            }
        }
    }

    fn record_alert(&self, platform: Platform, message: &str) -> Result<InteractionId> {
        let external_post_id = format!(
            "alert-{}-{}",
            platform.as_str().to_lowercase(),
            InteractionId::new()
        );
        let alert = self
            .store
            .interactions()
            .upsert(now_utc(), InteractionUpsert::alert(external_post_id, message))?;
        Ok(alert.id)
    }
}
