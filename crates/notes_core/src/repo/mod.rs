//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract for notes.
//! - Isolate SQLite query details from service/boundary orchestration.
//!
//! # Invariants
//! - "Not found" is a normal return value (`Option`/`bool`), never an error.
//! - Storage failures propagate unmodified; nothing here retries.

pub mod note_repo;
