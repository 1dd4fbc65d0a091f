//! Notes REST API.
//!
//! Every handler runs its storage work on the blocking pool with a freshly
//! opened connection that is dropped before the response is built.

use actix_web::{web, HttpResponse};
use notes_core::db::open_db;
use notes_core::{NoteId, NoteService, SqliteNoteRepository};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct NoteCreate {
    title: String,
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct NoteUpdate {
    title: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListNotesQuery {
    q: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

/// Runs `f` against a note service bound to a per-request connection.
async fn with_note_service<T, F>(state: &web::Data<AppState>, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: for<'c> FnOnce(&mut NoteService<SqliteNoteRepository<'c>>) -> Result<T, ApiError>
        + Send
        + 'static,
{
    let db_path = state.db_path.clone();
    web::block(move || {
        let mut conn = open_db(&db_path)?;
        let repo = SqliteNoteRepository::try_new(&mut conn)?;
        let mut service = NoteService::new(repo);
        f(&mut service)
    })
    .await?
}

async fn create_note(
    state: web::Data<AppState>,
    body: web::Json<NoteCreate>,
) -> Result<HttpResponse, ApiError> {
    let payload = body.into_inner();
    let note = with_note_service(&state, move |service| {
        Ok(service.create_note(&payload.title, &payload.content)?)
    })
    .await?;
    Ok(HttpResponse::Created().json(note))
}

async fn list_notes(
    state: web::Data<AppState>,
    query: web::Query<ListNotesQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let result = with_note_service(&state, move |service| {
        Ok(service.list_notes(query.q.as_deref(), query.page, query.limit)?)
    })
    .await?;
    Ok(HttpResponse::Ok().json(result))
}

async fn get_note(
    state: web::Data<AppState>,
    path: web::Path<NoteId>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let note = with_note_service(&state, move |service| Ok(service.get_note(id)?)).await?;
    match note {
        Some(note) => Ok(HttpResponse::Ok().json(note)),
        None => Err(ApiError::NotFound),
    }
}

async fn update_note(
    state: web::Data<AppState>,
    path: web::Path<NoteId>,
    body: web::Json<NoteUpdate>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let patch = body.into_inner();
    let note = with_note_service(&state, move |service| {
        Ok(service.update_note(id, patch.title.as_deref(), patch.content.as_deref())?)
    })
    .await?;
    match note {
        Some(note) => Ok(HttpResponse::Ok().json(note)),
        None => Err(ApiError::NotFound),
    }
}

async fn delete_note(
    state: web::Data<AppState>,
    path: web::Path<NoteId>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let removed = with_note_service(&state, move |service| Ok(service.delete_note(id)?)).await?;
    if removed {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(ApiError::NotFound)
    }
}

/// Notes routes mounted under `{api_prefix}/notes`.
pub fn scope(api_prefix: &str) -> actix_web::Scope {
    web::scope(&format!("{}/notes", api_prefix.trim_end_matches('/')))
        .route("", web::post().to(create_note))
        .route("", web::get().to(list_notes))
        .route("/{id}", web::get().to(get_note))
        .route("/{id}", web::put().to(update_note))
        .route("/{id}", web::delete().to(delete_note))
}
