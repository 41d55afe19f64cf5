//! Core domain logic for the student directory.
//! This crate owns the student record, its validation and its persistence.

pub mod db;
pub mod form;
pub mod logging;
pub mod media;
pub mod model;
pub mod repo;
pub mod service;

pub use form::student_form::{
    Attachment, BoundForm, FieldErrors, StudentSubmission, SubmissionContext, SubmissionRule,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use media::{MediaError, MediaStore};
pub use model::choice::{Choice, ChoiceOption};
pub use model::student::{AcademicLevel, EnrolledStatus, Student, StudentDraft, StudentId};
pub use repo::student_repo::{
    ChoiceFilter, RepoError, RepoResult, SqliteStudentRepository, StudentListQuery,
    StudentRepository,
};
pub use service::student_directory::{
    DeleteIntent, DeleteOutcome, DirectoryError, DirectoryResult, Notice, NoticeLevel,
    StudentDirectory, StudentListing, SubmitOutcome,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
