use crate::error::{Result, ScoutError};
use crate::platform::{ensure_authenticated, PlatformClient};
use crate::session::SessionLock;
use tracing::{debug, warn};
use vibebot_core::domain::{InteractionUpsert, MediaPolicy, RawCandidate};
use vibebot_core::time::now_utc;
use vibebot_store::Store;

#[derive(Debug, Clone, Copy)]
pub struct SourceOptions {
    /// When false, posts already in the store are skipped before capture.
    pub revisit_seen: bool,
    pub media_policy: MediaPolicy,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            revisit_seen: true,
            media_policy: MediaPolicy::Skip,
        }
    }
}

/// Result of one acquisition. `candidates` holds what may be engaged with;
/// `archived` lists every post written to the store, media posts included.
#[derive(Debug, Clone, Default)]
pub struct Acquisition {
    pub candidates: Vec<RawCandidate>,
    pub archived: Vec<String>,
    pub skipped_seen: usize,
    pub media_skipped: usize,
    pub store_failures: usize,
}

impl Acquisition {
    fn absorb(&mut self, other: Acquisition) {
        self.candidates.extend(other.candidates);
        self.archived.extend(other.archived);
        self.skipped_seen += other.skipped_seen;
        self.media_skipped += other.media_skipped;
        self.store_failures += other.store_failures;
    }
}

/// Turns platform search results into archived interactions.
pub struct CandidateSource<'a> {
    store: &'a Store,
    options: SourceOptions,
}

impl<'a> CandidateSource<'a> {
    pub fn new(store: &'a Store, options: SourceOptions) -> Self {
        Self { store, options }
    }

    /// Takes the session, authenticates, and acquires every keyword in order.
    /// Any keyword failure fails the call; the orchestrator is the place that
    /// tolerates partial failure.
    pub fn acquire<C: PlatformClient>(
        &self,
        session: &SessionLock<C>,
        keywords: &[String],
        limit: usize,
        tag: Option<&str>,
    ) -> Result<Acquisition> {
        let mut client = session.acquire()?;
        ensure_authenticated(&mut *client)?;
        let mut total = Acquisition::default();
        for keyword in keywords {
            let acquisition = self.acquire_with(&mut *client, keyword, limit, tag)?;
            total.absorb(acquisition);
        }
        Ok(total)
    }

    /// Searches one query through a session the caller already holds.
    pub fn acquire_with<C: PlatformClient + ?Sized>(
        &self,
        client: &mut C,
        query: &str,
        limit: usize,
        tag: Option<&str>,
    ) -> Result<Acquisition> {
        let platform = client.platform();
        let found = client.search(query, limit).map_err(|err| match err {
            ScoutError::Authentication { .. } | ScoutError::ResourceBusy(_) => err,
            other => ScoutError::Acquisition(format!("{platform} search for {query:?}: {other}")),
        })?;
        debug!(%platform, query, results = found.len(), "search returned");

        let repo = self.store.interactions();
        let mut acquisition = Acquisition::default();
        for candidate in found.into_iter().take(limit) {
            if !self.options.revisit_seen && repo.exists(candidate.external_post_id.trim())? {
                acquisition.skipped_seen += 1;
                continue;
            }

            let capture = InteractionUpsert::capture(platform, &candidate, tag);
            if let Err(err) = repo.upsert(now_utc(), capture) {
                warn!(
                    %platform,
                    external_post_id = %candidate.external_post_id,
                    error = %err,
                    "failed to archive candidate"
                );
                acquisition.store_failures += 1;
                continue;
            }
            acquisition
                .archived
                .push(candidate.external_post_id.trim().to_string());

            if candidate.has_media() && !self.options.media_policy.allows_engagement() {
                acquisition.media_skipped += 1;
                continue;
            }
            acquisition.candidates.push(candidate);
        }
        Ok(acquisition)
    }
}
