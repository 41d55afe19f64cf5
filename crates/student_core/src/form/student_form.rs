//! Student submission types and the fixed-schema validator.

use crate::model::choice::{Choice, ChoiceOption};
use crate::model::student::{AcademicLevel, EnrolledStatus, Student, StudentDraft};
use serde::Serialize;
use std::collections::BTreeMap;

pub const FIELD_FIRST_NAME: &str = "first_name";
pub const FIELD_LAST_NAME: &str = "last_name";
pub const FIELD_ACADEMIC_LEVEL: &str = "current_academic_level";
pub const FIELD_ENROLLED_STATUS: &str = "enrolled_status";
pub const FIELD_PHOTO: &str = "photo";

/// Text fields in form order.
pub const TEXT_FIELDS: &[&str] = &[
    FIELD_FIRST_NAME,
    FIELD_LAST_NAME,
    FIELD_ACADEMIC_LEVEL,
    FIELD_ENROLLED_STATUS,
];

const REQUIRED_MESSAGE: &str = "This field is required.";

/// One uploaded file attached to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Form field the file was submitted under.
    pub field: String,
    /// Client-supplied file name.
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Raw create/edit submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentSubmission {
    pub fields: BTreeMap<String, String>,
    pub attachments: Vec<Attachment>,
}

impl StudentSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper for setting one text field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Builder-style helper for adding one attachment.
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Returns the trimmed value of `name`, or `None` when absent or blank.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Returns the attachment submitted for `field`, if any.
    pub fn attachment_for(&self, field: &str) -> Option<&Attachment> {
        self.attachments
            .iter()
            .find(|attachment| attachment.field == field && !attachment.file_name.is_empty())
    }
}

/// Field-level validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Ambient request data available to validation rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionContext {
    /// Authenticated user name of the caller, when known.
    pub actor: Option<String>,
}

/// Extra validation hook applied after the fixed-schema checks.
pub trait SubmissionRule {
    fn check(
        &self,
        context: &SubmissionContext,
        submission: &StudentSubmission,
        errors: &mut FieldErrors,
    );
}

/// Submission values paired with their errors, ready for (re-)rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoundForm {
    pub values: BTreeMap<String, String>,
    pub errors: FieldErrors,
    pub level_choices: Vec<ChoiceOption>,
    pub status_choices: Vec<ChoiceOption>,
}

impl BoundForm {
    /// Empty form for the create page.
    pub fn blank() -> Self {
        Self::with_values(BTreeMap::new(), FieldErrors::default())
    }

    /// Form pre-filled from a stored student for the edit page.
    pub fn from_student(student: &Student) -> Self {
        let values = BTreeMap::from([
            (FIELD_FIRST_NAME.to_string(), student.first_name.clone()),
            (FIELD_LAST_NAME.to_string(), student.last_name.clone()),
            (
                FIELD_ACADEMIC_LEVEL.to_string(),
                student.current_academic_level.as_str().to_string(),
            ),
            (
                FIELD_ENROLLED_STATUS.to_string(),
                student.enrolled_status.as_str().to_string(),
            ),
        ]);
        Self::with_values(values, FieldErrors::default())
    }

    fn with_values(values: BTreeMap<String, String>, errors: FieldErrors) -> Self {
        Self {
            values,
            errors,
            level_choices: AcademicLevel::options(),
            status_choices: EnrolledStatus::options(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validates `submission` against the student schema, then `rules`.
///
/// Returns the cleaned draft, or the untouched submission paired with every
/// field error found.
pub fn validate_submission(
    submission: &StudentSubmission,
    context: &SubmissionContext,
    rules: &[Box<dyn SubmissionRule>],
) -> Result<StudentDraft, BoundForm> {
    let mut errors = FieldErrors::default();

    let first_name = required(submission, FIELD_FIRST_NAME, &mut errors);
    let last_name = required(submission, FIELD_LAST_NAME, &mut errors);
    let level = choice::<AcademicLevel>(submission, FIELD_ACADEMIC_LEVEL, &mut errors);
    let status = choice::<EnrolledStatus>(submission, FIELD_ENROLLED_STATUS, &mut errors);

    for rule in rules {
        rule.check(context, submission, &mut errors);
    }

    match (first_name, last_name, level, status) {
        (Some(first_name), Some(last_name), Some(level), Some(status)) if errors.is_empty() => {
            Ok(StudentDraft {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                current_academic_level: level,
                enrolled_status: status,
            })
        }
        _ => Err(BoundForm::with_values(submission.fields.clone(), errors)),
    }
}

fn required<'a>(
    submission: &'a StudentSubmission,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<&'a str> {
    let value = submission.value(field);
    if value.is_none() {
        errors.add(field, REQUIRED_MESSAGE);
    }
    value
}

fn choice<T: Choice>(
    submission: &StudentSubmission,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<T> {
    let value = required(submission, field, errors)?;
    let parsed = T::parse(value);
    if parsed.is_none() {
        errors.add(
            field,
            format!("Select a valid choice. {value} is not one of the available choices."),
        );
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::{
        validate_submission, FieldErrors, StudentSubmission, SubmissionContext, SubmissionRule,
        FIELD_ACADEMIC_LEVEL, FIELD_ENROLLED_STATUS, FIELD_FIRST_NAME, FIELD_LAST_NAME,
    };
    use crate::model::student::{AcademicLevel, EnrolledStatus};

    fn complete() -> StudentSubmission {
        StudentSubmission::new()
            .field(FIELD_FIRST_NAME, "  Grace ")
            .field(FIELD_LAST_NAME, "Hopper")
            .field(FIELD_ACADEMIC_LEVEL, "M1")
            .field(FIELD_ENROLLED_STATUS, "ACTIVE")
    }

    #[test]
    fn complete_submission_yields_trimmed_draft() {
        let draft = validate_submission(&complete(), &SubmissionContext::default(), &[])
            .expect("complete submission should validate");
        assert_eq!(draft.first_name, "Grace");
        assert_eq!(draft.current_academic_level, AcademicLevel::Master1);
        assert_eq!(draft.enrolled_status, EnrolledStatus::Active);
    }

    #[test]
    fn blank_and_missing_fields_are_required() {
        let submission = StudentSubmission::new()
            .field(FIELD_FIRST_NAME, "   ")
            .field(FIELD_ACADEMIC_LEVEL, "L2");
        let form = validate_submission(&submission, &SubmissionContext::default(), &[])
            .expect_err("incomplete submission must fail");

        for field in [FIELD_FIRST_NAME, FIELD_LAST_NAME, FIELD_ENROLLED_STATUS] {
            assert_eq!(
                form.errors.get(field),
                Some(&["This field is required.".to_string()][..])
            );
        }
        assert!(form.errors.get(FIELD_ACADEMIC_LEVEL).is_none());
        assert_eq!(
            form.values.get(FIELD_FIRST_NAME).map(String::as_str),
            Some("   ")
        );
    }

    #[test]
    fn unknown_choice_is_rejected_with_value_in_message() {
        let submission = complete().field(FIELD_ENROLLED_STATUS, "active");
        let form = validate_submission(&submission, &SubmissionContext::default(), &[])
            .expect_err("lowercase status is not an allowed value");
        let messages = form.errors.get(FIELD_ENROLLED_STATUS).unwrap();
        assert_eq!(
            messages[0],
            "Select a valid choice. active is not one of the available choices."
        );
    }

    struct RequireActor;

    impl SubmissionRule for RequireActor {
        fn check(
            &self,
            context: &SubmissionContext,
            _submission: &StudentSubmission,
            errors: &mut FieldErrors,
        ) {
            if context.actor.is_none() {
                errors.add("__all__", "actor required");
            }
        }
    }

    #[test]
    fn extra_rules_see_the_submission_context() {
        let rules: Vec<Box<dyn SubmissionRule>> = vec![Box::new(RequireActor)];

        let anonymous = validate_submission(&complete(), &SubmissionContext::default(), &rules)
            .expect_err("rule should reject missing actor");
        assert_eq!(anonymous.errors.fields().collect::<Vec<_>>(), vec!["__all__"]);

        let context = SubmissionContext {
            actor: Some("registrar".to_string()),
        };
        assert!(validate_submission(&complete(), &context, &rules).is_ok());
    }
}
