use quicknote_core::db::ensure_schema;
use quicknote_core::{
    CancelToken, DbError, NoteRepository, NoteStore, OpContext, RepoError, StorageError,
    StoreConfig,
};
use rusqlite::{Connection, ErrorCode};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

const BULK_ROWS: i64 = 50_000;

/// Seeds a file database with enough rows that a full sorted list takes far
/// longer than the abort delays used below.
fn seed_bulk_store(path: &Path) -> NoteStore {
    let conn = Connection::open(path).unwrap();
    ensure_schema(&conn).unwrap();
    conn.execute(
        "WITH RECURSIVE seq(n) AS (
            SELECT 1
            UNION ALL
            SELECT n + 1 FROM seq WHERE n < ?1
        )
        INSERT INTO notes (title, note, created_at)
        SELECT 'bulk note ' || n, printf('%.200c', 'x'), n FROM seq;",
        [BULK_ROWS],
    )
    .unwrap();
    drop(conn);

    NoteStore::open(&StoreConfig::default().with_db_path(path)).unwrap()
}

#[test]
fn expired_deadline_fails_before_touching_database() {
    let store = NoteStore::open_in_memory().unwrap();
    let ctx = OpContext::background().with_deadline(Instant::now());

    let err = store.create_note(&ctx, "late").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Storage(StorageError::DeadlineExceeded)
    ));
    assert!(store
        .list_notes(&OpContext::background())
        .unwrap()
        .is_empty());
}

#[test]
fn cancelled_context_rejects_every_operation() {
    let store = NoteStore::open_in_memory().unwrap();
    let created = store
        .create_note(&OpContext::background(), "existing")
        .unwrap();
    let token = CancelToken::new();
    token.cancel();
    let ctx = OpContext::with_cancel(token);

    let results = [
        store.list_notes(&ctx).map(|_| ()),
        store.get_note(&ctx, created.id).map(|_| ()),
        store.update_title(&ctx, created.id, "changed"),
        store.update_body(&ctx, created.id, "changed"),
        store.delete_note(&ctx, created.id),
    ];
    for result in results {
        assert!(matches!(
            result,
            Err(RepoError::Storage(StorageError::Cancelled))
        ));
    }

    assert_eq!(
        store
            .get_note(&OpContext::background(), created.id)
            .unwrap(),
        created
    );
}

#[test]
fn deadline_interrupts_long_running_list() {
    let dir = tempfile::tempdir().unwrap();
    let store = seed_bulk_store(&dir.path().join("bulk.sqlite"));

    let ctx = OpContext::background().with_timeout(Duration::from_millis(5));
    let err = store.list_notes(&ctx).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Storage(StorageError::DeadlineExceeded)
    ));

    let first = store
        .get_note(&OpContext::background(), BULK_ROWS)
        .unwrap();
    assert_eq!(first.title, format!("bulk note {BULK_ROWS}"));
}

#[test]
fn cancel_from_another_thread_interrupts_list() {
    let dir = tempfile::tempdir().unwrap();
    let store = seed_bulk_store(&dir.path().join("bulk.sqlite"));
    let token = CancelToken::new();
    let ctx = OpContext::with_cancel(token.clone());

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(5));
        token.cancel();
    });
    let result = store.list_notes(&ctx);
    canceller.join().unwrap();

    assert!(matches!(
        result,
        Err(RepoError::Storage(StorageError::Cancelled))
    ));
    let created = store
        .create_note(&OpContext::background(), "after cancel")
        .unwrap();
    assert!(created.id > BULK_ROWS);
}

#[test]
fn write_blocked_by_another_writer_fails_after_busy_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("busy.sqlite");
    let store = NoteStore::open(
        &StoreConfig::default()
            .with_db_path(&path)
            .with_busy_timeout(Duration::from_millis(50)),
    )
    .unwrap();
    let ctx = OpContext::background();
    let created = store.create_note(&ctx, "contended").unwrap();

    let other_writer = Connection::open(&path).unwrap();
    other_writer.execute_batch("BEGIN IMMEDIATE;").unwrap();

    let started_at = Instant::now();
    let err = store
        .update_title(&ctx, created.id, "blocked")
        .unwrap_err();
    let waited = started_at.elapsed();

    match err {
        RepoError::Storage(StorageError::Db(DbError::Sqlite(rusqlite::Error::SqliteFailure(
            failure,
            _,
        )))) => assert_eq!(failure.code, ErrorCode::DatabaseBusy),
        other => panic!("unexpected error: {other}"),
    }
    assert!(waited >= Duration::from_millis(40));
    assert!(waited < Duration::from_secs(2));

    other_writer.execute_batch("ROLLBACK;").unwrap();
    store.update_title(&ctx, created.id, "unblocked").unwrap();
    assert_eq!(store.get_note(&ctx, created.id).unwrap().title, "unblocked");
}
