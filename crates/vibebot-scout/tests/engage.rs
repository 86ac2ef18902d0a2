mod common;

use common::FakeClient;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use vibebot_scout::engage::{engage, engage_standalone, reply};
use vibebot_scout::{ScoutError, SessionLock, StepOutcome};

#[test]
fn like_failure_does_not_fail_reply() {
    let mut client = FakeClient::new();
    client.fail_like = true;

    let outcome = engage(&mut client, "1", Some("well done"), true);

    assert!(outcome.like.is_failed());
    assert_eq!(outcome.reply, StepOutcome::Succeeded);
    assert!(outcome.succeeded());
    assert_eq!(client.replies.len(), 1);
}

#[test]
fn reply_failure_fails_engagement() {
    let mut client = FakeClient::new();
    client.failing_replies.insert("1".to_string());

    let outcome = engage(&mut client, "1", Some("well done"), true);

    assert_eq!(outcome.like, StepOutcome::Succeeded);
    assert!(!outcome.succeeded());
}

#[test]
fn like_is_idempotent() {
    let mut client = FakeClient::new();
    assert!(engage(&mut client, "1", None, true).succeeded());
    assert!(engage(&mut client, "1", None, true).succeeded());
    assert_eq!(client.liked, vec!["1".to_string()]);
}

#[test]
fn over_long_reply_is_rejected_before_sending() {
    let mut client = FakeClient::new();
    client.max_reply_chars = 10;

    let err = reply(&mut client, "1", "this is far too long").unwrap_err();

    assert!(matches!(err, ScoutError::Engagement(_)));
    assert!(client.replies.is_empty());
}

#[test]
fn standalone_engagement_logs_in_first() {
    let mut client = FakeClient::new();
    client.authenticated = false;
    let session = SessionLock::new(client, Duration::from_millis(50));

    let outcome = engage_standalone(&session, "9", Some("hi"), false).expect("engage");

    assert!(outcome.succeeded());
    assert_eq!(outcome.like, StepOutcome::NotRequested);
    let client = session.acquire().expect("session");
    assert_eq!(client.login_calls, 1);
    assert!(client.liked.is_empty());
}

#[test]
fn standalone_engagement_reports_busy_session() {
    let session = Arc::new(SessionLock::new(FakeClient::new(), Duration::from_millis(30)));
    let held = session.acquire().expect("hold session");

    let contender = Arc::clone(&session);
    let result = thread::spawn(move || {
        engage_standalone(&contender, "1", Some("hi"), true).map(|outcome| outcome.succeeded())
    })
    .join()
    .expect("join");
    drop(held);

    assert!(matches!(result, Err(ScoutError::ResourceBusy(_))));
    assert!(session.acquire().expect("session").replies.is_empty());
}

#[test]
fn session_admits_one_engagement_at_a_time() {
    let mut client = FakeClient::new();
    client.delay = Duration::from_millis(5);
    let max_in_flight = Arc::clone(&client.max_in_flight);
    let session = Arc::new(SessionLock::new(client, Duration::from_secs(10)));

    let handles: Vec<_> = (0..6)
        .map(|index| {
            let session = Arc::clone(&session);
            thread::spawn(move || {
                let id = index.to_string();
                engage_standalone(&session, &id, Some("nice"), true).expect("engage")
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().expect("join").succeeded());
    }

    assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(session.acquire().expect("session").replies.len(), 6);
}
