mod common;

use common::{candidate, keywords, media_candidate, store, FakeClient};
use std::time::Duration;
use vibebot_core::domain::{InteractionStatus, MediaPolicy, Platform};
use vibebot_scout::{CandidateSource, ScoutError, SessionLock, SourceOptions};

#[test]
fn repeated_acquisition_enriches_instead_of_duplicating() {
    let store = store();
    let source = CandidateSource::new(&store, SourceOptions::default());
    let mut client = FakeClient::new().with_results("q", vec![candidate("1", "first sighting")]);

    source.acquire_with(&mut client, "q", 10, Some("q")).expect("first");

    let mut enriched = candidate("1", "first sighting");
    enriched.author_name = Some("Ada".to_string());
    client.results.insert("q".to_string(), vec![enriched]);
    source.acquire_with(&mut client, "q", 10, None).expect("second");

    let rows = store.interactions().list(10, 0).expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].author_name.as_deref(), Some("Ada"));
    assert_eq!(rows[0].tag.as_deref(), Some("q"));
    assert_eq!(rows[0].platform, Platform::Twitter);
}

#[test]
fn media_candidates_are_archived_but_not_returned() {
    let store = store();
    let source = CandidateSource::new(&store, SourceOptions::default());
    let mut client = FakeClient::new().with_results(
        "q",
        vec![candidate("1", "text post"), media_candidate("2", "image post")],
    );

    let acquisition = source.acquire_with(&mut client, "q", 10, None).expect("acquire");

    assert_eq!(acquisition.archived.len(), 2);
    assert_eq!(acquisition.media_skipped, 1);
    assert_eq!(acquisition.candidates.len(), 1);
    assert_eq!(acquisition.candidates[0].external_post_id, "1");

    let media = store
        .interactions()
        .find_by_external_id("2")
        .expect("find")
        .expect("row");
    assert_eq!(media.status, InteractionStatus::Archived);
}

#[test]
fn media_candidates_returned_when_policy_allows() {
    let store = store();
    let source = CandidateSource::new(
        &store,
        SourceOptions {
            revisit_seen: true,
            media_policy: MediaPolicy::Engage,
        },
    );
    let mut client = FakeClient::new().with_results("q", vec![media_candidate("2", "image post")]);

    let acquisition = source.acquire_with(&mut client, "q", 10, None).expect("acquire");
    assert_eq!(acquisition.candidates.len(), 1);
}

#[test]
fn seen_posts_skipped_when_not_revisiting() {
    let store = store();
    let mut client = FakeClient::new().with_results("q", vec![candidate("1", "old")]);
    CandidateSource::new(&store, SourceOptions::default())
        .acquire_with(&mut client, "q", 10, None)
        .expect("seed");

    client.results.insert(
        "q".to_string(),
        vec![candidate("1", "old"), candidate("2", "new")],
    );
    let source = CandidateSource::new(
        &store,
        SourceOptions {
            revisit_seen: false,
            media_policy: MediaPolicy::Skip,
        },
    );
    let acquisition = source.acquire_with(&mut client, "q", 10, None).expect("acquire");

    assert_eq!(acquisition.skipped_seen, 1);
    assert_eq!(acquisition.archived, vec!["2".to_string()]);
    assert_eq!(acquisition.candidates.len(), 1);
}

#[test]
fn limit_caps_returned_candidates() {
    let store = store();
    let source = CandidateSource::new(&store, SourceOptions::default());
    let mut client = FakeClient::new().with_results(
        "q",
        vec![candidate("1", "a"), candidate("2", "b"), candidate("3", "c")],
    );

    let acquisition = source.acquire_with(&mut client, "q", 2, None).expect("acquire");
    assert_eq!(acquisition.archived.len(), 2);
}

#[test]
fn search_failure_becomes_acquisition_error() {
    let store = store();
    let source = CandidateSource::new(&store, SourceOptions::default());
    let mut client = FakeClient::new().failing_query("q");

    let err = source.acquire_with(&mut client, "q", 10, None).unwrap_err();
    assert!(matches!(err, ScoutError::Acquisition(_)));
}

#[test]
fn standalone_acquire_fails_after_one_login_attempt() {
    let store = store();
    let mut client = FakeClient::new().with_results("q", vec![candidate("1", "a")]);
    client.authenticated = false;
    client.login_succeeds = false;
    let session = SessionLock::new(client, Duration::from_millis(50));

    let err = CandidateSource::new(&store, SourceOptions::default())
        .acquire(&session, &keywords(&["q"]), 10, None)
        .unwrap_err();

    assert!(matches!(err, ScoutError::Authentication { .. }));
    assert_eq!(session.acquire().expect("session").login_calls, 1);
    assert_eq!(store.interactions().stats().expect("stats").total, 0);
}

#[test]
fn standalone_acquire_covers_every_keyword() {
    let store = store();
    let client = FakeClient::new()
        .with_results("a", vec![candidate("1", "a")])
        .with_results("b", vec![candidate("2", "b")]);
    let session = SessionLock::new(client, Duration::from_millis(50));

    let acquisition = CandidateSource::new(&store, SourceOptions::default())
        .acquire(&session, &keywords(&["a", "b"]), 10, Some("campaign"))
        .expect("acquire");

    assert_eq!(acquisition.archived, vec!["1".to_string(), "2".to_string()]);
    let row = store
        .interactions()
        .find_by_external_id("2")
        .expect("find")
        .expect("row");
    assert_eq!(row.tag.as_deref(), Some("campaign"));
}
