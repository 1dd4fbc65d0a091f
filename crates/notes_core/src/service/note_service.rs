//! Note use-case service.
//!
//! # Responsibility
//! - Enforce boundary rules (title length, page/limit ranges) so the
//!   repository can trust its inputs.
//! - Wrap list results in the `{total, page, limit, items}` envelope.
//! - Emit metadata-only events for every mutation.
//!
//! # Invariants
//! - Not-found outcomes stay `Option`/`bool` values, never errors.
//! - Storage failures are passed through as `NoteServiceError::Repo`.

use crate::model::note::{validate_title, Note, NoteId, NoteValidationError};
use crate::repo::note_repo::{NoteRepository, RepoError, RepoResult};
use log::{debug, info};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const LIST_DEFAULT_PAGE: u32 = 1;
pub const LIST_DEFAULT_LIMIT: u32 = 10;
pub const LIST_LIMIT_MAX: u32 = 100;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Title violates the length rules.
    InvalidTitle(NoteValidationError),
    /// Page must be >= 1.
    InvalidPage(u32),
    /// Limit must be within `1..=LIST_LIMIT_MAX`.
    InvalidLimit(u32),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl NoteServiceError {
    /// Whether this error was caused by caller input rather than storage.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Repo(_))
    }
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle(err) => write!(f, "{err}"),
            Self::InvalidPage(page) => write!(f, "page must be >= 1, got {page}"),
            Self::InvalidLimit(limit) => {
                write!(f, "limit must be between 1 and {LIST_LIMIT_MAX}, got {limit}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTitle(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::InvalidTitle(value)
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// List envelope returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotesListResult {
    /// Number of notes matching the query, ignoring pagination.
    pub total: u64,
    /// Applied 1-indexed page.
    pub page: u32,
    /// Applied page size.
    pub limit: u32,
    /// Notes sorted by `updated_at DESC, id DESC`.
    pub items: Vec<Note>,
}

impl NotesListResult {
    /// Number of pages needed to show `total` notes at `limit` per page.
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.limit.max(1)))
    }
}

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one note after validating its title.
    pub fn create_note(&self, title: &str, content: &str) -> Result<Note, NoteServiceError> {
        validate_title(title)?;
        let note = self.repo.create(title, content)?;
        info!("event=note_create module=service status=ok id={}", note.id);
        Ok(note)
    }

    /// Gets one note by id.
    pub fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        self.repo.get_by_id(id)
    }

    /// Lists notes with optional substring search and pagination.
    ///
    /// `None` page/limit fall back to `1`/`LIST_DEFAULT_LIMIT`. An empty
    /// query behaves like no query.
    pub fn list_notes(
        &self,
        query: Option<&str>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<NotesListResult, NoteServiceError> {
        let page = page.unwrap_or(LIST_DEFAULT_PAGE);
        if page < 1 {
            return Err(NoteServiceError::InvalidPage(page));
        }
        let limit = limit.unwrap_or(LIST_DEFAULT_LIMIT);
        if !(1..=LIST_LIMIT_MAX).contains(&limit) {
            return Err(NoteServiceError::InvalidLimit(limit));
        }
        let query = query.filter(|text| !text.is_empty());

        let result = self.repo.list(query, page, limit)?;
        debug!(
            "event=note_list module=service status=ok has_query={} page={} limit={} total={} returned={}",
            query.is_some(),
            page,
            limit,
            result.total,
            result.items.len()
        );

        Ok(NotesListResult {
            total: result.total,
            page,
            limit,
            items: result.items,
        })
    }

    /// Applies a partial update. Returns `Ok(None)` when the note is absent.
    ///
    /// `updated_at` is refreshed even when both fields are omitted.
    pub fn update_note(
        &mut self,
        id: NoteId,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Option<Note>, NoteServiceError> {
        if let Some(title) = title {
            validate_title(title)?;
        }
        if title.is_none() && content.is_none() {
            debug!("event=note_update module=service status=empty_patch id={id}");
        }

        let updated = self.repo.update(id, title, content)?;
        match &updated {
            Some(_) => info!("event=note_update module=service status=ok id={id}"),
            None => info!("event=note_update module=service status=not_found id={id}"),
        }
        Ok(updated)
    }

    /// Hard-deletes a note. Returns whether a note was removed.
    pub fn delete_note(&self, id: NoteId) -> RepoResult<bool> {
        let removed = self.repo.delete(id)?;
        if removed {
            info!("event=note_delete module=service status=ok id={id}");
        } else {
            info!("event=note_delete module=service status=not_found id={id}");
        }
        Ok(removed)
    }
}
