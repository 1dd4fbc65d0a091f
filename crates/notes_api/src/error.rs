//! Mapping from core outcomes to HTTP responses.
//!
//! Validation -> 422, missing note -> 404, oversized body -> 413,
//! storage -> 500. Bodies follow the
//! `{"detail": "..."}` shape; storage details are logged, never returned.

use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use notes_core::db::DbError;
use notes_core::{NoteServiceError, RepoError};
use std::fmt::{Display, Formatter};

pub const NOT_FOUND_DETAIL: &str = "Note not found";
pub const STORAGE_DETAIL: &str = "Internal server error";

/// Largest JSON request body accepted by the notes routes.
pub const JSON_BODY_LIMIT: usize = 16 * 1024 * 1024;

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound,
    PayloadTooLarge(String),
    Storage(String),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "validation failed: {message}"),
            Self::NotFound => write!(f, "{NOT_FOUND_DETAIL}"),
            Self::PayloadTooLarge(message) => write!(f, "payload too large: {message}"),
            Self::Storage(message) => write!(f, "storage failure: {message}"),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let detail = match self {
            Self::Validation(message) | Self::PayloadTooLarge(message) => message.as_str(),
            Self::NotFound => NOT_FOUND_DETAIL,
            Self::Storage(message) => {
                log::error!("event=http_error module=api status=error error={message}");
                STORAGE_DETAIL
            }
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "detail": detail }))
    }
}

impl From<NoteServiceError> for ApiError {
    fn from(value: NoteServiceError) -> Self {
        match value {
            NoteServiceError::Repo(err) => err.into(),
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(value: DbError) -> Self {
        Self::Storage(value.to_string())
    }
}

impl From<actix_web::error::BlockingError> for ApiError {
    fn from(value: actix_web::error::BlockingError) -> Self {
        Self::Storage(format!("blocking task failed: {value}"))
    }
}

impl From<JsonPayloadError> for ApiError {
    fn from(value: JsonPayloadError) -> Self {
        match value {
            JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
                Self::PayloadTooLarge(value.to_string())
            }
            other => Self::Validation(other.to_string()),
        }
    }
}

pub(crate) fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| ApiError::from(err).into())
}

pub(crate) fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| ApiError::Validation(err.to_string()).into())
}

pub(crate) fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| ApiError::Validation(err.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::{json_config, ApiError};
    use actix_web::http::StatusCode;
    use actix_web::{web, App, HttpResponse, ResponseError};
    use serde_json::{json, Value};
    use notes_core::{NoteServiceError, RepoError};

    #[test]
    fn service_errors_map_to_expected_status() {
        let validation: ApiError = NoteServiceError::InvalidPage(0).into();
        assert_eq!(validation.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let storage: ApiError =
            NoteServiceError::Repo(RepoError::InvalidData("bad row".to_string())).into();
        assert_eq!(storage.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
    }

    async fn echo(body: web::Json<Value>) -> HttpResponse {
        HttpResponse::Ok().json(body.into_inner())
    }

    #[actix_web::test]
    async fn oversized_json_body_returns_413() {
        let app = actix_web::test::init_service(
            App::new()
                .app_data(json_config(64))
                .route("/echo", web::post().to(echo)),
        )
        .await;

        let req = actix_web::test::TestRequest::post()
            .uri("/echo")
            .set_json(json!({ "content": "x".repeat(128) }))
            .to_request();
        let resp = actix_web::test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body: Value = actix_web::test::read_body_json(resp).await;
        assert!(body["detail"].is_string());

        let req = actix_web::test::TestRequest::post()
            .uri("/echo")
            .set_payload("{not json")
            .insert_header(("content-type", "application/json"))
            .to_request();
        let resp = actix_web::test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
