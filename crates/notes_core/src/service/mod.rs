//! Use-case services.
//!
//! # Responsibility
//! - Validate boundary input before it reaches the repository.
//! - Keep the HTTP layer decoupled from storage details.

pub mod note_service;
