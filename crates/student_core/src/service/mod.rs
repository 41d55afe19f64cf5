//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, media storage and repository calls into the
//!   student directory workflows.
//! - Keep request/response layers decoupled from storage details.

pub mod student_directory;
