//! Core domain logic for the personal notes service.
//! This crate is the single source of truth for note persistence and query
//! semantics; the HTTP layer only validates, delegates and serializes.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, Settings};
pub use logging::{default_log_level, init_logging, logging_status, LogDestination};
pub use model::note::{validate_title, Note, NoteId, NoteValidationError, TITLE_MAX_CHARS};
pub use repo::note_repo::{
    NotePage, NoteRepository, RepoError, RepoResult, SqliteNoteRepository,
};
pub use service::note_service::{
    NoteService, NoteServiceError, NotesListResult, LIST_DEFAULT_LIMIT, LIST_DEFAULT_PAGE,
    LIST_LIMIT_MAX,
};
