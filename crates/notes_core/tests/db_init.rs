use notes_core::db::migrations::latest_version;
use notes_core::db::{initialize, initialize_at, open_db, open_db_in_memory, DbError};
use notes_core::{NoteRepository, RepoError, Settings, SqliteNoteRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "notes");
}

#[test]
fn initialize_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("notes.db");
    let settings = Settings {
        db_path: path.clone(),
        ..Settings::default()
    };

    initialize(&settings).unwrap();

    assert!(path.exists());
    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "notes");
}

#[test]
fn initialize_is_idempotent_and_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");

    initialize_at(&path).unwrap();
    {
        let mut conn = open_db(&path).unwrap();
        let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
        repo.create("kept", "across restarts").unwrap();
    }
    initialize_at(&path).unwrap();

    let mut conn = open_db(&path).unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let page = repo.list(None, 1, 10).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].title, "kept");
}

#[test]
fn initialize_adopts_table_created_without_version_tracking() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        INSERT INTO notes (title, content, created_at, updated_at)
        VALUES ('legacy', 'body', '2024-03-01T10:00:00.123456', '2024-03-01T10:00:00.123456');",
    )
    .unwrap();
    drop(conn);

    initialize_at(&path).unwrap();

    let mut conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let note = repo.get_by_id(1).unwrap().unwrap();
    assert_eq!(note.title, "legacy");
    assert_eq!(note.created_at, note.updated_at);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = initialize_at(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn initialize_fails_when_parent_is_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let err = initialize_at(blocker.join("notes.db")).unwrap_err();
    assert!(matches!(err, DbError::Io { .. }), "unexpected error: {err}");
}

#[test]
fn repository_rejects_connection_without_notes_table() {
    let mut conn = Connection::open_in_memory().unwrap();
    let err = SqliteNoteRepository::try_new(&mut conn)
        .err()
        .expect("missing table should be rejected");
    assert!(matches!(err, RepoError::MissingRequiredTable("notes")));
}

#[test]
fn repository_rejects_notes_table_missing_columns() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE notes (id INTEGER PRIMARY KEY, title TEXT NOT NULL);")
        .unwrap();
    let err = SqliteNoteRepository::try_new(&mut conn)
        .err()
        .expect("incomplete table should be rejected");
    assert!(matches!(
        err,
        RepoError::MissingRequiredColumn {
            table: "notes",
            column: "content"
        }
    ));
}

#[test]
fn repository_checks_every_required_column() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE notes (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL,
            pinned INTEGER
        );",
    )
    .unwrap();
    let err = SqliteNoteRepository::try_new(&mut conn)
        .err()
        .expect("table without updated_at should be rejected");
    assert!(matches!(
        err,
        RepoError::MissingRequiredColumn {
            table: "notes",
            column: "updated_at"
        }
    ));

    conn.execute_batch("ALTER TABLE notes ADD COLUMN updated_at TEXT;")
        .unwrap();
    assert!(SqliteNoteRepository::try_new(&mut conn).is_ok());
}

#[test]
fn connections_set_busy_timeout() {
    let conn = open_db_in_memory().unwrap();
    let busy_timeout: i64 = conn
        .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(busy_timeout, 5000);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
