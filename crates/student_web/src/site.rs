//! Request dispatcher for the student directory routes.
//!
//! # Responsibility
//! - Resolve the route, apply the login guard and call the directory.
//! - Build template contexts and redirects from workflow outcomes.
//!
//! # Invariants
//! - Guarded routes reject anonymous callers before any lookup.
//! - Not-found lookups end the request with a 404 reply.
//! - Store failures are returned as `SiteError`, never rendered.

use crate::auth::{login_redirect, require_authenticated};
use crate::config::SiteConfig;
use crate::request::{Method, Request};
use crate::response::{Reply, TEMPLATE_FORM, TEMPLATE_LIST, TEMPLATE_PROFILE};
use crate::routes::Route;
use log::{info, warn};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::{json, Value};
use student_core::db::{open_db, DbError};
use student_core::{
    init_logging, BoundForm, Choice, DeleteIntent, DeleteOutcome, DirectoryError, LoggingError,
    MediaStore, RepoError, SqliteStudentRepository, Student, StudentDirectory, StudentId,
    StudentListing, StudentRepository, SubmitOutcome,
};
use thiserror::Error;

const CREATE_TITLE: &str = "Add New Student";
const EDIT_TITLE: &str = "Edit Student";

#[derive(Debug, Error)]
pub enum SiteError {
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("failed to build template context: {0}")]
    Context(#[from] serde_json::Error),
}

/// Starts logging and opens the configured database.
pub fn bootstrap(config: &SiteConfig) -> Result<Connection, SiteError> {
    init_logging(&config.log_level, &config.log_dir.to_string_lossy())?;
    Ok(open_db(&config.db_path)?)
}

/// Student view shared by list and profile contexts.
#[derive(Debug, Serialize)]
struct StudentView<'a> {
    #[serde(flatten)]
    student: &'a Student,
    full_name: String,
    level_label: &'static str,
    status_label: &'static str,
}

impl<'a> From<&'a Student> for StudentView<'a> {
    fn from(student: &'a Student) -> Self {
        Self {
            student,
            full_name: student.full_name(),
            level_label: student.current_academic_level.label(),
            status_label: student.enrolled_status.label(),
        }
    }
}

/// Route dispatcher over one student directory.
pub struct StudentSite<R: StudentRepository> {
    directory: StudentDirectory<R>,
    login_url: String,
}

impl<'conn> StudentSite<SqliteStudentRepository<'conn>> {
    /// Builds a site over a migrated SQLite connection.
    pub fn open(conn: &'conn Connection, config: &SiteConfig) -> Result<Self, SiteError> {
        let mut directory = StudentDirectory::new(SqliteStudentRepository::try_new(conn)?);
        if let Some(root) = config.media_root.as_ref() {
            directory = directory.with_media(MediaStore::new(root));
        }
        Ok(Self::new(directory, config))
    }
}

impl<R: StudentRepository> StudentSite<R> {
    pub fn new(directory: StudentDirectory<R>, config: &SiteConfig) -> Self {
        Self {
            directory,
            login_url: config.login_url.clone(),
        }
    }

    pub fn directory(&self) -> &StudentDirectory<R> {
        &self.directory
    }

    /// Handles one request.
    ///
    /// # Errors
    /// Returns `SiteError` only for failures the embedding server should
    /// surface as a generic error (storage, media, serialization).
    pub fn handle(&self, request: &Request) -> Result<Reply, SiteError> {
        let Some(route) = Route::resolve(&request.path) else {
            info!(
                "event=request module=web status=not_found method={} route=none",
                request.method.as_str()
            );
            return Ok(Reply::not_found());
        };

        if route.requires_login() && require_authenticated(&request.caller).is_err() {
            info!(
                "event=request module=web status=login_required method={} route={}",
                request.method.as_str(),
                route.name()
            );
            return Ok(Reply::redirect(login_redirect(&self.login_url, &request.full_path())));
        }

        match self.dispatch(route, request) {
            Ok(reply) => {
                info!(
                    "event=request module=web status=ok method={} route={}",
                    request.method.as_str(),
                    route.name()
                );
                Ok(reply)
            }
            Err(SiteError::Directory(DirectoryError::NotFound(id))) => {
                info!(
                    "event=request module=web status=not_found method={} route={} student_id={id}",
                    request.method.as_str(),
                    route.name()
                );
                Ok(Reply::not_found())
            }
            Err(err) => {
                warn!(
                    "event=request module=web status=error method={} route={} error={err}",
                    request.method.as_str(),
                    route.name()
                );
                Err(err)
            }
        }
    }

    fn dispatch(&self, route: Route, request: &Request) -> Result<Reply, SiteError> {
        match route {
            Route::List => self.list(request),
            Route::Create => self.create(request),
            Route::Profile(id) => self.profile(id),
            Route::Edit(id) => self.edit(id, request),
            Route::Delete(id) => self.delete(id, request),
        }
    }

    fn list(&self, request: &Request) -> Result<Reply, SiteError> {
        let listing = self.directory.list_students(
            request.query_param("q"),
            request.query_param("level"),
            request.query_param("status"),
        )?;
        Ok(Reply::page(TEMPLATE_LIST, list_context(&listing)?))
    }

    fn profile(&self, id: StudentId) -> Result<Reply, SiteError> {
        let student = self.directory.get_profile(id)?;
        let context = json!({ "student": serde_json::to_value(StudentView::from(&student))? });
        Ok(Reply::page(TEMPLATE_PROFILE, context))
    }

    fn create(&self, request: &Request) -> Result<Reply, SiteError> {
        if request.method != Method::Post {
            return form_page(&BoundForm::blank(), CREATE_TITLE, None);
        }

        let outcome = self
            .directory
            .create_student(&request.submission(), &request.submission_context())?;
        match outcome {
            SubmitOutcome::Saved { student, notice } => {
                Ok(Reply::redirect(Route::Profile(student.id).path()).with_notice(notice))
            }
            SubmitOutcome::Invalid(form) => form_page(&form, CREATE_TITLE, None),
        }
    }

    fn edit(&self, id: StudentId, request: &Request) -> Result<Reply, SiteError> {
        if request.method != Method::Post {
            let (student, form) = self.directory.edit_form(id)?;
            return form_page(&form, EDIT_TITLE, Some(&student));
        }

        let outcome =
            self.directory
                .edit_student(id, &request.submission(), &request.submission_context())?;
        match outcome {
            SubmitOutcome::Saved { student, notice } => {
                Ok(Reply::redirect(Route::Profile(student.id).path()).with_notice(notice))
            }
            SubmitOutcome::Invalid(form) => {
                let student = self.directory.get_profile(id)?;
                form_page(&form, EDIT_TITLE, Some(&student))
            }
        }
    }

    fn delete(&self, id: StudentId, request: &Request) -> Result<Reply, SiteError> {
        let intent = if request.method == Method::Post {
            DeleteIntent::Confirmed
        } else {
            DeleteIntent::Ignored
        };

        let reply = Reply::redirect(Route::List.path());
        match self.directory.delete_student(id, intent)? {
            DeleteOutcome::Deleted { notice } => Ok(reply.with_notice(notice)),
            DeleteOutcome::Skipped => Ok(reply),
        }
    }
}

fn list_context(listing: &StudentListing) -> Result<Value, serde_json::Error> {
    let students = listing
        .students
        .iter()
        .map(StudentView::from)
        .collect::<Vec<_>>();

    Ok(json!({
        "students": serde_json::to_value(students)?,
        "search_query": listing.search_query,
        "search_level": listing.search_level,
        "search_status": listing.search_status,
        "level_choices": serde_json::to_value(&listing.level_choices)?,
        "status_choices": serde_json::to_value(&listing.status_choices)?,
    }))
}

fn form_page(
    form: &BoundForm,
    title: &'static str,
    student: Option<&Student>,
) -> Result<Reply, SiteError> {
    let mut context = json!({
        "form": serde_json::to_value(form)?,
        "title": title,
    });
    if let Some(student) = student {
        context["student"] = serde_json::to_value(StudentView::from(student))?;
    }
    Ok(Reply::page(TEMPLATE_FORM, context))
}
