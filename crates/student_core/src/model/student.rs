//! Student domain model.
//!
//! # Responsibility
//! - Define the persisted student record and its enumerated fields.
//! - Provide construction and in-place update helpers for the workflows.
//!
//! # Invariants
//! - `id` is stable and never reused for another student.
//! - `created_at` is set once at creation and never changes.
//! - `current_academic_level` and `enrolled_status` are always members of
//!   their closed choice sets.

use crate::model::choice::Choice;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier assigned when a student is created.
pub type StudentId = Uuid;

/// Academic level a student is currently enrolled at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcademicLevel {
    #[serde(rename = "L1")]
    Licence1,
    #[serde(rename = "L2")]
    Licence2,
    #[serde(rename = "L3")]
    Licence3,
    #[serde(rename = "M1")]
    Master1,
    #[serde(rename = "M2")]
    Master2,
    #[serde(rename = "PHD")]
    Doctorate,
}

impl Choice for AcademicLevel {
    const ALL: &'static [Self] = &[
        Self::Licence1,
        Self::Licence2,
        Self::Licence3,
        Self::Master1,
        Self::Master2,
        Self::Doctorate,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Licence1 => "L1",
            Self::Licence2 => "L2",
            Self::Licence3 => "L3",
            Self::Master1 => "M1",
            Self::Master2 => "M2",
            Self::Doctorate => "PHD",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Licence1 => "Licence 1",
            Self::Licence2 => "Licence 2",
            Self::Licence3 => "Licence 3",
            Self::Master1 => "Master 1",
            Self::Master2 => "Master 2",
            Self::Doctorate => "Doctorate",
        }
    }
}

/// Enrollment state of a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrolledStatus {
    Active,
    Suspended,
    Graduated,
    Withdrawn,
}

impl Choice for EnrolledStatus {
    const ALL: &'static [Self] = &[
        Self::Active,
        Self::Suspended,
        Self::Graduated,
        Self::Withdrawn,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Suspended => "SUSPENDED",
            Self::Graduated => "GRADUATED",
            Self::Withdrawn => "WITHDRAWN",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Suspended => "Suspended",
            Self::Graduated => "Graduated",
            Self::Withdrawn => "Withdrawn",
        }
    }
}

/// Validated field values produced by the student form.
///
/// Carries everything a create or edit writes except identity, timestamps
/// and the stored photo path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentDraft {
    pub first_name: String,
    pub last_name: String,
    pub current_academic_level: AcademicLevel,
    pub enrolled_status: EnrolledStatus,
}

/// Canonical persisted student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub current_academic_level: AcademicLevel,
    pub enrolled_status: EnrolledStatus,
    /// Media-relative path of the uploaded photo, if any.
    pub photo: Option<String>,
    /// Unix epoch milliseconds. Immutable after creation.
    pub created_at: i64,
    /// Unix epoch milliseconds of the last effective edit.
    pub updated_at: i64,
}

impl Student {
    /// Creates a new student with a generated stable ID, stamped `now`.
    pub fn new(draft: StudentDraft) -> Self {
        Self::with_id(Uuid::new_v4(), draft, now_epoch_ms())
    }

    /// Creates a student with caller-provided identity and creation time.
    pub fn with_id(id: StudentId, draft: StudentDraft, created_at: i64) -> Self {
        Self {
            id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            current_academic_level: draft.current_academic_level,
            enrolled_status: draft.enrolled_status,
            photo: None,
            created_at,
            updated_at: created_at,
        }
    }

    /// Display name used in notices: `first last`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns the editable fields as a draft.
    pub fn draft(&self) -> StudentDraft {
        StudentDraft {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            current_academic_level: self.current_academic_level,
            enrolled_status: self.enrolled_status,
        }
    }

    /// Overwrites editable fields from `draft`.
    ///
    /// Returns `false` and leaves the record untouched when nothing differs.
    /// `id` and `created_at` are never modified.
    pub fn apply(&mut self, draft: StudentDraft, photo: Option<String>) -> bool {
        let photo = photo.or_else(|| self.photo.clone());
        if self.draft() == draft && self.photo == photo {
            return false;
        }

        self.first_name = draft.first_name;
        self.last_name = draft.last_name;
        self.current_academic_level = draft.current_academic_level;
        self.enrolled_status = draft.enrolled_status;
        self.photo = photo;
        self.updated_at = now_epoch_ms().max(self.created_at);
        true
    }
}

/// Current wall clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

#[cfg(test)]
mod tests {
    use super::{AcademicLevel, EnrolledStatus, Student, StudentDraft};
    use crate::model::choice::Choice;

    fn draft(first: &str) -> StudentDraft {
        StudentDraft {
            first_name: first.to_string(),
            last_name: "Lovelace".to_string(),
            current_academic_level: AcademicLevel::Licence1,
            enrolled_status: EnrolledStatus::Active,
        }
    }

    #[test]
    fn choice_parse_is_exact_and_case_sensitive() {
        assert_eq!(AcademicLevel::parse("M2"), Some(AcademicLevel::Master2));
        assert_eq!(AcademicLevel::parse("m2"), None);
        assert_eq!(
            EnrolledStatus::parse("GRADUATED"),
            Some(EnrolledStatus::Graduated)
        );
        assert_eq!(EnrolledStatus::parse(""), None);
    }

    #[test]
    fn choice_values_match_serde_representation() {
        for level in AcademicLevel::ALL {
            let json = serde_json::to_string(level).unwrap();
            assert_eq!(json, format!("\"{}\"", level.as_str()));
        }
        for status in EnrolledStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn apply_reports_unchanged_drafts() {
        let mut student = Student::with_id(uuid::Uuid::new_v4(), draft("Ada"), 1_000);

        assert!(!student.apply(draft("Ada"), None));
        assert_eq!(student.updated_at, 1_000);

        assert!(student.apply(draft("Augusta"), None));
        assert_eq!(student.first_name, "Augusta");
        assert_eq!(student.created_at, 1_000);
        assert!(student.updated_at >= 1_000);
    }

    #[test]
    fn apply_keeps_existing_photo_when_none_submitted() {
        let mut student = Student::with_id(uuid::Uuid::new_v4(), draft("Ada"), 1_000);
        assert!(student.apply(draft("Ada"), Some("students/photos/a.png".to_string())));
        assert!(!student.apply(draft("Ada"), None));
        assert_eq!(student.photo.as_deref(), Some("students/photos/a.png"));
    }
}
