use vibebot_core::domain::{InteractionStatus, InteractionUpsert, Metrics, Platform};
use vibebot_store::error::StoreErrorKind;
use vibebot_store::Store;

fn store() -> Store {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
}

fn row_count(store: &Store) -> i64 {
    store
        .connection()
        .query_row("SELECT COUNT(*) FROM interactions;", [], |row| row.get(0))
        .expect("count")
}

#[test]
fn upsert_inserts_then_enriches() {
    let store = store();
    let now = 1_700_000_000;

    let first = store
        .interactions()
        .upsert(
            now,
            InteractionUpsert::new(Platform::Twitter, "123").with_content("A"),
        )
        .expect("insert");
    assert_eq!(first.status, InteractionStatus::Archived);

    let second = store
        .interactions()
        .upsert(
            now + 60,
            InteractionUpsert::new(Platform::Twitter, "123").with_author(Some("X"), None),
        )
        .expect("enrich");

    assert_eq!(row_count(&store), 1);
    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, now);
    assert_eq!(second.content, "A");
    assert_eq!(second.author_name.as_deref(), Some("X"));

    let stored = store
        .interactions()
        .find_by_external_id("123")
        .expect("find")
        .expect("present");
    assert_eq!(stored, second);
}

#[test]
fn repeated_captures_never_duplicate() {
    let store = store();
    for attempt in 0..5 {
        let mut metrics = Metrics::new();
        metrics.insert("likes".to_string(), attempt);
        let mut update =
            InteractionUpsert::new(Platform::Reddit, "abc").with_content("Title: hi");
        update.metrics = Some(metrics);
        store
            .interactions()
            .upsert(1_700_000_000 + attempt, update)
            .expect("upsert");
    }
    assert_eq!(row_count(&store), 1);
    let stored = store
        .interactions()
        .find_by_external_id("abc")
        .expect("find")
        .expect("present");
    assert_eq!(stored.metrics.expect("metrics")["likes"], 4);
}

#[test]
fn exists_checks_unique_key() {
    let store = store();
    store
        .interactions()
        .upsert(
            1,
            InteractionUpsert::new(Platform::Reddit, "test_post_123").with_content("post"),
        )
        .expect("insert");

    assert!(store.interactions().exists("test_post_123").expect("exists"));
    assert!(!store.interactions().exists("non_existent_id").expect("exists"));
}

#[test]
fn recent_is_newest_first_and_bounded() {
    let store = store();
    for (offset, id) in ["a", "b", "c"].iter().enumerate() {
        store
            .interactions()
            .upsert(
                1_700_000_000 + offset as i64,
                InteractionUpsert::new(Platform::Twitter, *id).with_content(*id),
            )
            .expect("insert");
    }

    let recent = store.interactions().recent(2).expect("recent");
    let ids: Vec<_> = recent.iter().map(|i| i.external_post_id.as_str()).collect();
    assert_eq!(ids, vec!["c", "b"]);
}

#[test]
fn posted_requires_reply_and_sticks() {
    let store = store();
    store
        .interactions()
        .upsert(
            1,
            InteractionUpsert::new(Platform::Twitter, "9").with_content("hello"),
        )
        .expect("insert");

    let err = store
        .interactions()
        .upsert(
            2,
            InteractionUpsert::new(Platform::Twitter, "9").with_status(InteractionStatus::Posted),
        )
        .unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::InvalidTransition);

    store
        .interactions()
        .upsert(3, InteractionUpsert::posted(Platform::Twitter, "9", "nice"))
        .expect("post");
    let recaptured = store
        .interactions()
        .upsert(
            4,
            InteractionUpsert::new(Platform::Twitter, "9").with_status(InteractionStatus::Archived),
        )
        .expect("recapture");
    assert_eq!(recaptured.status, InteractionStatus::Posted);
    assert_eq!(recaptured.reply_text.as_deref(), Some("nice"));
}

#[test]
fn get_missing_is_not_found() {
    let store = store();
    let err = store
        .interactions()
        .get(vibebot_core::InteractionId::new())
        .unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::NotFound);
}

#[test]
fn stats_and_clear_all() {
    let store = store();
    let repo = store.interactions();
    repo.upsert(1, InteractionUpsert::new(Platform::Twitter, "t1").with_content("x"))
        .expect("insert");
    repo.upsert(1, InteractionUpsert::new(Platform::Reddit, "r1").with_content("y"))
        .expect("insert");
    repo.upsert(1, InteractionUpsert::alert("system-1", "nothing found"))
        .expect("insert");

    let stats = repo.stats().expect("stats");
    assert_eq!(stats.total, 3);
    assert_eq!(stats.by_platform["Twitter"], 1);
    assert_eq!(stats.by_platform["System"], 1);
    assert_eq!(stats.by_status["ERROR"], 1);

    assert_eq!(repo.clear_all().expect("clear"), 3);
    assert_eq!(row_count(&store), 0);
}
