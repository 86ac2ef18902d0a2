use crate::error::{Result, ScoutError};
use crate::platform::{ensure_authenticated, PlatformClient};
use crate::session::SessionLock;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "error", rename_all = "snake_case")]
pub enum StepOutcome {
    NotRequested,
    Succeeded,
    Failed(String),
}

impl StepOutcome {
    fn from_result(result: Result<()>) -> Self {
        match result {
            Ok(()) => StepOutcome::Succeeded,
            Err(err) => StepOutcome::Failed(err.to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngageOutcome {
    pub like: StepOutcome,
    pub reply: StepOutcome,
}

impl EngageOutcome {
    /// The reply is the operation of record: when one was requested its
    /// outcome decides, otherwise the like's does.
    pub fn succeeded(&self) -> bool {
        match (&self.reply, &self.like) {
            (StepOutcome::NotRequested, StepOutcome::NotRequested) => true,
            (StepOutcome::NotRequested, like) => *like == StepOutcome::Succeeded,
            (reply, _) => *reply == StepOutcome::Succeeded,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match (&self.reply, &self.like) {
            (StepOutcome::Failed(err), _) => Some(err.as_str()),
            (StepOutcome::NotRequested, StepOutcome::Failed(err)) => Some(err.as_str()),
            _ => None,
        }
    }
}

pub fn like<C: PlatformClient + ?Sized>(client: &mut C, external_post_id: &str) -> Result<()> {
    client.like(external_post_id).map_err(|err| match err {
        ScoutError::Authentication { .. } => err,
        other => ScoutError::Engagement(format!("like {external_post_id}: {other}")),
    })
}

/// Publishes `text` as a reply. Text the platform would refuse is rejected
/// here, before anything is sent.
pub fn reply<C: PlatformClient + ?Sized>(
    client: &mut C,
    external_post_id: &str,
    text: &str,
) -> Result<()> {
    if text.trim().is_empty() {
        return Err(ScoutError::Engagement(format!(
            "reply to {external_post_id}: empty text"
        )));
    }
    let max = client.max_reply_chars();
    let length = text.chars().count();
    if length > max {
        return Err(ScoutError::Engagement(format!(
            "reply to {external_post_id}: {length} chars exceeds the {max} char limit"
        )));
    }
    client
        .reply(external_post_id, text)
        .map_err(|err| match err {
            ScoutError::Authentication { .. } => err,
            other => ScoutError::Engagement(format!("reply to {external_post_id}: {other}")),
        })
}

/// Like (best effort) then reply, through a session the caller holds.
pub fn engage<C: PlatformClient + ?Sized>(
    client: &mut C,
    external_post_id: &str,
    text: Option<&str>,
    like_first: bool,
) -> EngageOutcome {
    let like_outcome = if like_first {
        let outcome = StepOutcome::from_result(like(client, external_post_id));
        if let StepOutcome::Failed(err) = &outcome {
            warn!(external_post_id, error = %err, "like failed");
        }
        outcome
    } else {
        StepOutcome::NotRequested
    };

    let reply_outcome = match text {
        Some(text) => {
            let outcome = StepOutcome::from_result(reply(client, external_post_id, text));
            if let StepOutcome::Failed(err) = &outcome {
                warn!(external_post_id, error = %err, "reply failed");
            }
            outcome
        }
        None => StepOutcome::NotRequested,
    };

    EngageOutcome {
        like: like_outcome,
        reply: reply_outcome,
    }
}

/// Standalone form: takes the session and authenticates before engaging.
pub fn engage_standalone<C: PlatformClient>(
    session: &SessionLock<C>,
    external_post_id: &str,
    text: Option<&str>,
    like_first: bool,
) -> Result<EngageOutcome> {
    let mut client = session.acquire()?;
    ensure_authenticated(&mut *client)?;
    let outcome = engage(&mut *client, external_post_id, text, like_first);
    info!(
        platform = %client.platform(),
        external_post_id,
        succeeded = outcome.succeeded(),
        "engagement finished"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::{EngageOutcome, StepOutcome};

    fn outcome(like: StepOutcome, reply: StepOutcome) -> EngageOutcome {
        EngageOutcome { like, reply }
    }

    #[test]
    fn reply_decides_when_requested() {
        let failed = || StepOutcome::Failed("boom".to_string());
        assert!(outcome(failed(), StepOutcome::Succeeded).succeeded());
        assert!(!outcome(StepOutcome::Succeeded, failed()).succeeded());
        assert!(!outcome(StepOutcome::NotRequested, failed()).succeeded());
    }

    #[test]
    fn like_decides_without_reply() {
        assert!(outcome(StepOutcome::Succeeded, StepOutcome::NotRequested).succeeded());
        assert!(!outcome(StepOutcome::Failed("x".into()), StepOutcome::NotRequested).succeeded());
        assert!(outcome(StepOutcome::NotRequested, StepOutcome::NotRequested).succeeded());
    }

    #[test]
    fn failure_reports_reply_error_first() {
        let result = outcome(
            StepOutcome::Failed("like".into()),
            StepOutcome::Failed("reply".into()),
        );
        assert_eq!(result.failure(), Some("reply"));
    }
}
