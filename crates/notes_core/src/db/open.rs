//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Create the database's parent directories on first use.
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have a 5s busy timeout.
//! - Returned connections have migrations fully applied.
//! - Connections are closed when dropped; callers scope them per operation.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use crate::config::Settings;
use log::{debug, error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Ensures the configured database exists with an up-to-date schema.
///
/// Intended to run once at process start; the service must not accept
/// requests when this fails.
pub fn initialize(settings: &Settings) -> DbResult<()> {
    initialize_at(&settings.db_path)
}

/// Path-based variant of [`initialize`].
///
/// # Side effects
/// - Creates missing parent directories and the database file.
/// - Emits `db_init` logging events with duration and status.
pub fn initialize_at(path: impl AsRef<Path>) -> DbResult<()> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!("event=db_init module=db status=start");

    match open_db(path) {
        Ok(conn) => {
            drop(conn);
            info!(
                "event=db_init module=db status=ok path={} duration_ms={}",
                path.display(),
                started_at.elapsed().as_millis()
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=db_init module=db status=error path={} duration_ms={} error={}",
                path.display(),
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Creates missing parent directories.
/// - Performs connection bootstrap and migration checks.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();

    ensure_parent_dir(path)?;

    let mut conn = match Connection::open(path) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            debug!(
                "event=db_open module=db status=ok mode=file duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let mut conn = Connection::open_in_memory()?;
    bootstrap_connection(&mut conn)?;
    debug!("event=db_open module=db status=ok mode=memory");
    Ok(conn)
}

fn ensure_parent_dir(path: &Path) -> DbResult<()> {
    let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) else {
        return Ok(());
    };

    std::fs::create_dir_all(parent).map_err(|source| {
        error!(
            "event=db_open module=db status=error error_code=db_dir_create_failed dir={} error={}",
            parent.display(),
            source
        );
        DbError::Io {
            path: parent.to_path_buf(),
            source,
        }
    })
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)?;
    Ok(())
}
