use crate::error::{Result, ScoutError};
use tracing::{info, warn};
use vibebot_core::domain::{Platform, RawCandidate};

/// What the core needs from one social platform. Every call is blocking and
/// assumes the caller holds the platform's [`crate::SessionLock`].
pub trait PlatformClient: Send {
    fn platform(&self) -> Platform;
    fn is_authenticated(&self) -> bool;
    /// Establishes or refreshes the session.
    fn login(&mut self) -> Result<()>;
    /// Newest-first posts matching `query`, at most `limit`.
    fn search(&mut self, query: &str, limit: usize) -> Result<Vec<RawCandidate>>;
    /// Must succeed without side effects when the post is already liked.
    fn like(&mut self, external_post_id: &str) -> Result<()>;
    fn reply(&mut self, external_post_id: &str, text: &str) -> Result<()>;
    fn max_reply_chars(&self) -> usize;
}

impl<C: PlatformClient + ?Sized> PlatformClient for Box<C> {
    fn platform(&self) -> Platform {
        (**self).platform()
    }

    fn is_authenticated(&self) -> bool {
        (**self).is_authenticated()
    }

    fn login(&mut self) -> Result<()> {
        (**self).login()
    }

    fn search(&mut self, query: &str, limit: usize) -> Result<Vec<RawCandidate>> {
        (**self).search(query, limit)
    }

    fn like(&mut self, external_post_id: &str) -> Result<()> {
        (**self).like(external_post_id)
    }

    fn reply(&mut self, external_post_id: &str, text: &str) -> Result<()> {
        (**self).reply(external_post_id, text)
    }

    fn max_reply_chars(&self) -> usize {
        (**self).max_reply_chars()
    }
}

/// Makes one login attempt when the session is not authenticated. A second
/// failure is final.
pub fn ensure_authenticated<C: PlatformClient + ?Sized>(client: &mut C) -> Result<()> {
    if client.is_authenticated() {
        return Ok(());
    }
    relogin(client)
}

/// Logs in regardless of what the client believes about its session. Any
/// failure comes back as [`ScoutError::Authentication`].
pub fn relogin<C: PlatformClient + ?Sized>(client: &mut C) -> Result<()> {
    let platform = client.platform();
    info!(%platform, "session not authenticated, logging in");
    match client.login() {
        Ok(()) if client.is_authenticated() => Ok(()),
        Ok(()) => Err(ScoutError::auth(platform, "login did not establish a session")),
        Err(err @ ScoutError::Authentication { .. }) => {
            warn!(%platform, error = %err, "login failed");
            Err(err)
        }
        Err(err) => {
            warn!(%platform, error = %err, "login failed");
            Err(ScoutError::auth(platform, err.to_string()))
        }
    }
}
