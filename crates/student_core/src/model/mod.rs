//! Student domain model.
//!
//! # Responsibility
//! - Define the canonical `Student` record and its closed choice sets.
//! - Keep choice values shared between form validation and list filters.
//!
//! # Invariants
//! - Every student is identified by a stable `StudentId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod choice;
pub mod student;
