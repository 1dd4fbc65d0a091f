//! Domain model for persisted notes.
//!
//! # Responsibility
//! - Define the canonical note record returned by the repository.
//! - Own input rules that the boundary enforces before persistence.
//!
//! # Invariants
//! - Every note handed out by core carries a store-assigned id.
//! - `created_at <= updated_at`.

pub mod note;
