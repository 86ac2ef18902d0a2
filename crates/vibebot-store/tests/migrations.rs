use vibebot_store::Store;

#[test]
fn migrations_apply_once() {
    let store = Store::open_in_memory().expect("open in memory");
    assert_eq!(store.schema_version().expect("fresh version"), 0);
    store.migrate().expect("migrate");
    store.migrate().expect("migrate again");

    let applied: Vec<(i64, String)> = {
        let conn = store.connection();
        let mut stmt = conn
            .prepare("SELECT version, name FROM vibebot_schema ORDER BY version;")
            .expect("prepare");
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .expect("query");
        let applied = rows.collect::<Result<_, _>>().expect("rows");
        applied
    };
    assert_eq!(applied, vec![(1, "001_init".to_string())]);
    assert_eq!(store.schema_version().expect("schema version"), 1);
}

#[test]
fn newer_database_is_refused() {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
        .connection()
        .execute(
            "INSERT INTO vibebot_schema (version, name, applied_at) VALUES (99, '099_future', 0);",
            [],
        )
        .expect("record future migration");

    let err = store.migrate().unwrap_err();
    assert!(err.to_string().contains("newer than available migrations"));
}

#[test]
fn file_database_keeps_schema_across_opens() {
    let temp = tempfile::TempDir::new().expect("tempdir");
    let path = temp.path().join("vibebot.sqlite3");
    Store::open_migrated(&path).expect("first open");

    let store = Store::open(&path).expect("reopen");
    assert_eq!(store.schema_version().expect("version"), 1);
    assert_eq!(store.journal_mode().expect("journal mode"), "wal");
}
