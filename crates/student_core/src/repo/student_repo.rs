//! Student repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/update/delete/get/query over the `students` table.
//! - Translate list filters into a single parameterized query.
//!
//! # Invariants
//! - Lists are ordered by `created_at DESC, rowid DESC`.
//! - Folded name columns are rewritten on every insert and update.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::choice::Choice;
use crate::model::student::{AcademicLevel, EnrolledStatus, Student, StudentId};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use thiserror::Error;
use uuid::Uuid;

const STUDENT_SELECT_SQL: &str = "SELECT
    uuid,
    first_name,
    last_name,
    current_academic_level,
    enrolled_status,
    photo,
    created_at,
    updated_at
FROM students";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for student persistence and query operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("student not found: {0}")]
    NotFound(StudentId),
    #[error("invalid persisted student data: {0}")]
    InvalidData(String),
    #[error("connection schema version {actual_version} does not match expected {expected_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("required table `{0}` is missing")]
    MissingRequiredTable(&'static str),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Exact-match filter over one enumerated field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceFilter<T> {
    /// No restriction.
    Any,
    /// Restrict to rows holding this value.
    Only(T),
    /// A value outside the choice set; matches nothing.
    Unmatched(String),
}

impl<T> Default for ChoiceFilter<T> {
    fn default() -> Self {
        Self::Any
    }
}

impl<T: Choice> ChoiceFilter<T> {
    /// Builds a filter from a raw request parameter.
    ///
    /// Blank input means no filter. Unknown values are kept so the query
    /// returns an empty result rather than an error.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|value| !value.is_empty()) {
            None => Self::Any,
            Some(value) => match T::parse(value) {
                Some(choice) => Self::Only(choice),
                None => Self::Unmatched(value.to_string()),
            },
        }
    }

    fn is_unmatched(&self) -> bool {
        matches!(self, Self::Unmatched(_))
    }
}

/// Query options for listing students.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentListQuery {
    /// Case-insensitive substring matched against first or last name.
    pub text: Option<String>,
    pub level: ChoiceFilter<AcademicLevel>,
    pub status: ChoiceFilter<EnrolledStatus>,
}

impl StudentListQuery {
    /// Builds a query from raw `q`, `level` and `status` parameters.
    pub fn from_params(q: Option<&str>, level: Option<&str>, status: Option<&str>) -> Self {
        Self {
            text: q
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            level: ChoiceFilter::from_param(level),
            status: ChoiceFilter::from_param(status),
        }
    }
}

/// Repository interface for student CRUD operations.
pub trait StudentRepository {
    /// Inserts a new row and returns its identity.
    fn create_student(&self, student: &Student) -> RepoResult<StudentId>;
    /// Overwrites every mutable column of an existing row.
    fn update_student(&self, student: &Student) -> RepoResult<()>;
    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn list_students(&self, query: &StudentListQuery) -> RepoResult<Vec<Student>>;
    /// Hard-deletes one row.
    fn delete_student(&self, id: StudentId) -> RepoResult<()>;
    fn count_students(&self) -> RepoResult<u64>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` when the `students` table is absent.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        if !table_exists(conn, "students")? {
            return Err(RepoError::MissingRequiredTable("students"));
        }

        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create_student(&self, student: &Student) -> RepoResult<StudentId> {
        self.conn.execute(
            "INSERT INTO students (
                uuid,
                first_name,
                last_name,
                first_name_folded,
                last_name_folded,
                current_academic_level,
                enrolled_status,
                photo,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                student.id.to_string(),
                student.first_name.as_str(),
                student.last_name.as_str(),
                fold(&student.first_name),
                fold(&student.last_name),
                student.current_academic_level.as_str(),
                student.enrolled_status.as_str(),
                student.photo.as_deref(),
                student.created_at,
                student.updated_at,
            ],
        )?;

        Ok(student.id)
    }

    fn update_student(&self, student: &Student) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE students
             SET
                first_name = ?1,
                last_name = ?2,
                first_name_folded = ?3,
                last_name_folded = ?4,
                current_academic_level = ?5,
                enrolled_status = ?6,
                photo = ?7,
                updated_at = ?8
             WHERE uuid = ?9;",
            params![
                student.first_name.as_str(),
                student.last_name.as_str(),
                fold(&student.first_name),
                fold(&student.last_name),
                student.current_academic_level.as_str(),
                student.enrolled_status.as_str(),
                student.photo.as_deref(),
                student.updated_at,
                student.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(student.id));
        }

        Ok(())
    }

    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }

        Ok(None)
    }

    fn list_students(&self, query: &StudentListQuery) -> RepoResult<Vec<Student>> {
        if query.level.is_unmatched() || query.status.is_unmatched() {
            debug!("event=student_list module=repo status=short_circuit reason=unknown_choice");
            return Ok(Vec::new());
        }

        let mut sql = format!("{STUDENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(text) = query.text.as_deref() {
            sql.push_str(" AND (instr(first_name_folded, ?) > 0 OR instr(last_name_folded, ?) > 0)");
            let needle = fold(text);
            bind_values.push(Value::Text(needle.clone()));
            bind_values.push(Value::Text(needle));
        }

        if let ChoiceFilter::Only(level) = query.level {
            sql.push_str(" AND current_academic_level = ?");
            bind_values.push(Value::Text(level.as_str().to_string()));
        }

        if let ChoiceFilter::Only(status) = query.status {
            sql.push_str(" AND enrolled_status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        sql.push_str(" ORDER BY created_at DESC, rowid DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut students = Vec::new();

        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        Ok(students)
    }

    fn delete_student(&self, id: StudentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn count_students(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM students;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative student count `{count}`")))
    }
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in students.uuid"))
    })?;

    let level_text: String = row.get("current_academic_level")?;
    let current_academic_level = AcademicLevel::parse(&level_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid academic level `{level_text}` in students.current_academic_level"
        ))
    })?;

    let status_text: String = row.get("enrolled_status")?;
    let enrolled_status = EnrolledStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid enrolled status `{status_text}` in students.enrolled_status"
        ))
    })?;

    Ok(Student {
        id,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        current_academic_level,
        enrolled_status,
        photo: row.get("photo")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Case-folds a name for substring search.
///
/// Folds per character so the result never depends on neighbours
/// (`str::to_lowercase` maps a final `Σ` to `ς`).
fn fold(value: &str) -> String {
    value.chars().flat_map(char::to_lowercase).collect()
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

#[cfg(test)]
mod tests {
    use super::{ChoiceFilter, StudentListQuery};
    use crate::model::student::{AcademicLevel, EnrolledStatus};

    #[test]
    fn from_params_trims_and_drops_blank_values() {
        let query = StudentListQuery::from_params(Some("  "), Some(" L3 "), None);
        assert_eq!(query.text, None);
        assert_eq!(query.level, ChoiceFilter::Only(AcademicLevel::Licence3));
        assert_eq!(query.status, ChoiceFilter::Any);
    }

    #[test]
    fn from_params_keeps_unknown_choices_as_unmatched() {
        let query = StudentListQuery::from_params(Some(" ada "), None, Some("asleep"));
        assert_eq!(query.text.as_deref(), Some("ada"));
        assert_eq!(
            query.status,
            ChoiceFilter::<EnrolledStatus>::Unmatched("asleep".to_string())
        );
    }
}
