//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Own every read/write against the `notes` table.
//! - Compose the optional substring filter and the pagination window.
//! - Decode rows into `Note` with a fixed column set.
//!
//! # Invariants
//! - List order is `updated_at DESC, id DESC`.
//! - `total` counts every matching row regardless of the page window.
//! - Timestamps are persisted as fixed-width RFC 3339 UTC text, so text
//!   order equals time order.
//! - A row that fails decoding is reported as `InvalidData`, never skipped.

use crate::db::DbError;
use crate::model::note::{now_utc, Note, NoteId};
use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    created_at,
    updated_at
FROM notes";

const SEARCH_FILTER_SQL: &str =
    " WHERE (title LIKE ? ESCAPE '\\' OR content LIKE ? ESCAPE '\\')";

const REQUIRED_COLUMNS: [&str; 5] = ["id", "title", "content", "created_at", "updated_at"];

/// Rows written before timestamps carried an explicit offset.
const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One page of list results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePage {
    /// Notes inside the requested window.
    pub items: Vec<Note>,
    /// Count of all matching notes, ignoring the window.
    pub total: u64,
}

/// Repository interface for note CRUD and search.
pub trait NoteRepository {
    /// Inserts a note; the store assigns the id and both timestamps.
    fn create(&self, title: &str, content: &str) -> RepoResult<Note>;
    /// Returns `None` when no note has `id`.
    fn get_by_id(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Lists notes whose title or content contains `query`.
    ///
    /// `page` is 1-indexed and must be >= 1. Pages past the end yield no
    /// items but still report the full `total`.
    fn list(&self, query: Option<&str>, page: u32, limit: u32) -> RepoResult<NotePage>;
    /// Replaces the provided fields and refreshes `updated_at`.
    ///
    /// Omitted fields keep their stored value. `updated_at` is refreshed even
    /// when both fields are omitted. Returns `None` when no note has `id`.
    fn update(
        &mut self,
        id: NoteId,
        title: Option<&str>,
        content: Option<&str>,
    ) -> RepoResult<Option<Note>>;
    /// Hard-deletes a note. Returns whether a row was removed.
    fn delete(&self, id: NoteId) -> RepoResult<bool>;
}

/// SQLite-backed note repository.
///
/// Borrows one connection for its lifetime; the caller owns (and closes)
/// the connection.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_notes_table_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create(&self, title: &str, content: &str) -> RepoResult<Note> {
        let now = now_utc();
        let stamp = format_timestamp(&now);
        self.conn.execute(
            "INSERT INTO notes (title, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3);",
            params![title, content, stamp],
        )?;

        Ok(Note {
            id: self.conn.last_insert_rowid(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    fn get_by_id(&self, id: NoteId) -> RepoResult<Option<Note>> {
        fetch_note(&*self.conn, id)
    }

    fn list(&self, query: Option<&str>, page: u32, limit: u32) -> RepoResult<NotePage> {
        debug_assert!(page >= 1, "page is 1-indexed");

        let mut filter_sql = "";
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(text) = query.filter(|text| !text.is_empty()) {
            let pattern = like_pattern(text);
            filter_sql = SEARCH_FILTER_SQL;
            bind_values.push(Value::Text(pattern.clone()));
            bind_values.push(Value::Text(pattern));
        }

        // Count and page come from one read snapshot.
        let tx = self.conn.unchecked_transaction()?;

        let total: i64 = tx.query_row(
            &format!("SELECT COUNT(*) FROM notes{filter_sql};"),
            params_from_iter(bind_values.iter()),
            |row| row.get(0),
        )?;

        // Windows past `i64::MAX` rows are clamped; they are empty either way.
        let offset = i64::from(page.saturating_sub(1)).saturating_mul(i64::from(limit));
        bind_values.push(Value::Integer(i64::from(limit)));
        bind_values.push(Value::Integer(offset));

        let items = {
            let mut stmt = tx.prepare(&format!(
                "{NOTE_SELECT_SQL}{filter_sql}
                 ORDER BY updated_at DESC, id DESC
                 LIMIT ? OFFSET ?;"
            ))?;
            let mut rows = stmt.query(params_from_iter(bind_values))?;
            let mut items = Vec::new();
            while let Some(row) = rows.next()? {
                items.push(parse_note_row(row)?);
            }
            items
        };
        tx.commit()?;

        let total = u64::try_from(total)
            .map_err(|_| RepoError::InvalidData(format!("negative note count `{total}`")))?;
        Ok(NotePage { items, total })
    }

    fn update(
        &mut self,
        id: NoteId,
        title: Option<&str>,
        content: Option<&str>,
    ) -> RepoResult<Option<Note>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(existing) = fetch_note(&tx, id)? else {
            return Ok(None);
        };

        let title = title.map_or(existing.title, str::to_string);
        let content = content.map_or(existing.content, str::to_string);
        // Keeps `updated_at` strictly increasing per note even if the clock
        // stalls or steps back.
        let updated_at = now_utc().max(existing.updated_at + Duration::microseconds(1));

        tx.execute(
            "UPDATE notes
             SET
                title = ?1,
                content = ?2,
                updated_at = ?3
             WHERE id = ?4;",
            params![title, content, format_timestamp(&updated_at), id],
        )?;
        tx.commit()?;

        Ok(Some(Note {
            id,
            title,
            content,
            created_at: existing.created_at,
            updated_at,
        }))
    }

    fn delete(&self, id: NoteId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

/// Formats a timestamp the way it is persisted.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a persisted timestamp.
///
/// Accepts RFC 3339 with any offset, and naive ISO-8601 text which is
/// interpreted as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, NAIVE_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Builds a `LIKE` pattern matching `text` literally as a substring.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn fetch_note(conn: &Connection, id: NoteId) -> RepoResult<Option<Note>> {
    let mut stmt = conn.prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_note_row(row)?)),
        None => Ok(None),
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id: NoteId = row.get("id")?;
    let created_at = parse_timestamp_column(row, id, "created_at")?;
    let updated_at = parse_timestamp_column(row, id, "updated_at")?;

    Ok(Note {
        id,
        title: row.get("title")?,
        content: row.get("content")?,
        created_at,
        updated_at,
    })
}

fn parse_timestamp_column(row: &Row<'_>, id: NoteId, column: &str) -> RepoResult<DateTime<Utc>> {
    let text: String = row.get(column)?;
    parse_timestamp(&text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid timestamp `{text}` in notes.{column} for id {id}"
        ))
    })
}

fn ensure_notes_table_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, "notes")? {
        return Err(RepoError::MissingRequiredTable("notes"));
    }

    let columns = table_columns(conn, "notes")?;
    if let Some(column) = REQUIRED_COLUMNS
        .into_iter()
        .find(|column| !columns.contains(*column))
    {
        return Err(RepoError::MissingRequiredColumn {
            table: "notes",
            column,
        });
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists = conn
        .query_row(
            "SELECT 1
             FROM sqlite_master
             WHERE type = 'table' AND name = ?1;",
            [table],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(exists.is_some())
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = HashSet::new();
    while let Some(row) = rows.next()? {
        columns.insert(row.get::<_, String>(1)?);
    }
    Ok(columns)
}
