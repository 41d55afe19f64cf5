//! Route table: path resolution and reversal.
//!
//! | Route   | Path                       | Login |
//! |---------|----------------------------|-------|
//! | List    | `/students/`               | no    |
//! | Create  | `/students/create/`        | yes   |
//! | Profile | `/students/{id}/`          | no    |
//! | Edit    | `/students/{id}/edit/`     | yes   |
//! | Delete  | `/students/{id}/delete/`   | yes   |

use once_cell::sync::Lazy;
use regex::Regex;
use student_core::StudentId;
use uuid::Uuid;

static ROUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^/students/(?:(?P<create>create/)|(?P<id>[0-9A-Fa-f-]{36})/(?P<action>edit/|delete/)?)?$",
    )
    .expect("valid route regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    List,
    Create,
    Profile(StudentId),
    Edit(StudentId),
    Delete(StudentId),
}

impl Route {
    /// Resolves a request path; `None` means no route matches.
    pub fn resolve(path: &str) -> Option<Self> {
        let caps = ROUTE_RE.captures(path)?;
        if caps.name("create").is_some() {
            return Some(Self::Create);
        }

        let Some(id) = caps.name("id") else {
            return Some(Self::List);
        };
        let id = Uuid::parse_str(id.as_str()).ok()?;

        match caps.name("action").map(|action| action.as_str()) {
            None => Some(Self::Profile(id)),
            Some("edit/") => Some(Self::Edit(id)),
            Some("delete/") => Some(Self::Delete(id)),
            Some(_) => None,
        }
    }

    /// Canonical path for this route.
    pub fn path(&self) -> String {
        match self {
            Self::List => "/students/".to_string(),
            Self::Create => "/students/create/".to_string(),
            Self::Profile(id) => format!("/students/{id}/"),
            Self::Edit(id) => format!("/students/{id}/edit/"),
            Self::Delete(id) => format!("/students/{id}/delete/"),
        }
    }

    /// Stable route name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::List => "student_list",
            Self::Create => "student_create",
            Self::Profile(_) => "student_profile",
            Self::Edit(_) => "student_edit",
            Self::Delete(_) => "student_delete",
        }
    }

    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Create | Self::Edit(_) | Self::Delete(_))
    }
}
