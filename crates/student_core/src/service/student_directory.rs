//! Student directory use-case service.
//!
//! # Responsibility
//! - List students with text, level and status filters.
//! - Run the create/edit validation-then-persist workflow.
//! - Look up profiles and perform hard deletes.
//!
//! # Invariants
//! - Nothing is written (row or file) unless validation succeeds.
//! - An upload is removed again when its row write fails.
//! - Every write is a single repository statement.
//! - Notices are returned to the caller, never queued globally.

use crate::form::student_form::{
    validate_submission, BoundForm, StudentSubmission, SubmissionContext, SubmissionRule,
    FIELD_PHOTO,
};
use crate::media::{MediaError, MediaStore};
use crate::model::choice::{Choice, ChoiceOption};
use crate::model::student::{AcademicLevel, EnrolledStatus, Student, StudentId};
use crate::repo::student_repo::{RepoError, StudentListQuery, StudentRepository};
use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

/// Service error for student directory use-cases.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Target student does not exist.
    #[error("student not found: {0}")]
    NotFound(StudentId),
    #[error(transparent)]
    Repo(RepoError),
    #[error(transparent)]
    Media(#[from] MediaError),
}

impl From<RepoError> for DirectoryError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
}

/// User-facing notification produced by a completed workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }
}

/// Result of a create or edit submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Persisted; callers redirect to the student's profile.
    Saved { student: Student, notice: Notice },
    /// Rejected; callers re-render the form.
    Invalid(BoundForm),
}

/// Whether a delete request is the confirmed destructive action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteIntent {
    Confirmed,
    /// Any other request against the delete endpoint.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { notice: Notice },
    Skipped,
}

/// List envelope carrying the filtered students plus filter metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentListing {
    /// Ordered by `created_at` descending.
    pub students: Vec<Student>,
    pub search_query: String,
    pub search_level: String,
    pub search_status: String,
    pub level_choices: Vec<ChoiceOption>,
    pub status_choices: Vec<ChoiceOption>,
}

/// Student directory facade over a repository implementation.
pub struct StudentDirectory<R: StudentRepository> {
    repo: R,
    media: Option<MediaStore>,
    rules: Vec<Box<dyn SubmissionRule>>,
}

impl<R: StudentRepository> StudentDirectory<R> {
    /// Creates a directory without upload storage or extra rules.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            media: None,
            rules: Vec::new(),
        }
    }

    /// Enables photo uploads, stored under `media`.
    pub fn with_media(mut self, media: MediaStore) -> Self {
        self.media = Some(media);
        self
    }

    /// Adds an extra validation rule run after the schema checks.
    pub fn with_rule(mut self, rule: Box<dyn SubmissionRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Lists students matching the raw `q`, `level` and `status` parameters.
    pub fn list_students(
        &self,
        q: Option<&str>,
        level: Option<&str>,
        status: Option<&str>,
    ) -> DirectoryResult<StudentListing> {
        let query = StudentListQuery::from_params(q, level, status);
        let students = self.repo.list_students(&query)?;

        Ok(StudentListing {
            students,
            search_query: trimmed(q),
            search_level: trimmed(level),
            search_status: trimmed(status),
            level_choices: AcademicLevel::options(),
            status_choices: EnrolledStatus::options(),
        })
    }

    /// Loads one student or fails with `NotFound`.
    pub fn get_profile(&self, id: StudentId) -> DirectoryResult<Student> {
        self.repo
            .get_student(id)?
            .ok_or(DirectoryError::NotFound(id))
    }

    /// Loads the edit target together with its pre-filled form.
    pub fn edit_form(&self, id: StudentId) -> DirectoryResult<(Student, BoundForm)> {
        let student = self.get_profile(id)?;
        let form = BoundForm::from_student(&student);
        Ok((student, form))
    }

    /// Validates a submission and inserts a new student when valid.
    pub fn create_student(
        &self,
        submission: &StudentSubmission,
        context: &SubmissionContext,
    ) -> DirectoryResult<SubmitOutcome> {
        let draft = match validate_submission(submission, context, &self.rules) {
            Ok(draft) => draft,
            Err(form) => {
                info!(
                    "event=student_create module=service status=invalid error_fields={}",
                    form.errors.fields().count()
                );
                return Ok(SubmitOutcome::Invalid(form));
            }
        };

        let mut student = Student::new(draft);
        student.photo = self.store_photo(submission)?;
        if let Err(err) = self.repo.create_student(&student) {
            self.discard_photo(student.photo.as_deref());
            return Err(err.into());
        }

        info!(
            "event=student_create module=service status=ok student_id={}",
            student.id
        );
        let notice = Notice::success(format!(
            "Student \"{}\" was created successfully.",
            student.full_name()
        ));
        Ok(SubmitOutcome::Saved { student, notice })
    }

    /// Validates a submission and updates `id` in place when valid.
    ///
    /// The target must exist even when the submission is invalid.
    pub fn edit_student(
        &self,
        id: StudentId,
        submission: &StudentSubmission,
        context: &SubmissionContext,
    ) -> DirectoryResult<SubmitOutcome> {
        let mut student = self.get_profile(id)?;

        let draft = match validate_submission(submission, context, &self.rules) {
            Ok(draft) => draft,
            Err(form) => {
                info!(
                    "event=student_edit module=service status=invalid student_id={id} error_fields={}",
                    form.errors.fields().count()
                );
                return Ok(SubmitOutcome::Invalid(form));
            }
        };

        let photo = self.store_photo(submission)?;
        let new_photo = photo.clone();
        if student.apply(draft, photo) {
            if let Err(err) = self.repo.update_student(&student) {
                self.discard_photo(new_photo.as_deref());
                return Err(err.into());
            }
            info!("event=student_edit module=service status=ok student_id={id}");
        } else {
            info!("event=student_edit module=service status=unchanged student_id={id}");
        }

        let notice = Notice::success(format!(
            "Student \"{}\" was updated successfully.",
            student.full_name()
        ));
        Ok(SubmitOutcome::Saved { student, notice })
    }

    /// Hard-deletes `id` when `intent` is confirmed.
    ///
    /// The lookup runs first, so a missing id is `NotFound` for any intent.
    pub fn delete_student(
        &self,
        id: StudentId,
        intent: DeleteIntent,
    ) -> DirectoryResult<DeleteOutcome> {
        let student = self.get_profile(id)?;
        let name = student.full_name();

        if intent != DeleteIntent::Confirmed {
            return Ok(DeleteOutcome::Skipped);
        }

        self.repo.delete_student(id)?;
        info!("event=student_delete module=service status=ok student_id={id}");
        Ok(DeleteOutcome::Deleted {
            notice: Notice::success(format!("Student \"{name}\" was deleted successfully.")),
        })
    }

    fn store_photo(&self, submission: &StudentSubmission) -> DirectoryResult<Option<String>> {
        let Some(attachment) = submission.attachment_for(FIELD_PHOTO) else {
            return Ok(None);
        };

        match self.media.as_ref() {
            Some(media) => Ok(Some(media.store_photo(attachment)?)),
            None => {
                warn!("event=media_store module=service status=skipped reason=no_media_store");
                Ok(None)
            }
        }
    }

    /// Removes an upload whose row write failed.
    fn discard_photo(&self, relative: Option<&str>) {
        let (Some(media), Some(relative)) = (self.media.as_ref(), relative) else {
            return;
        };
        if let Err(err) = media.remove(relative) {
            warn!("event=media_discard module=service status=error error={err}");
        }
    }
}

fn trimmed(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}
