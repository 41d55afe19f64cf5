//! Authentication guard for mutating routes.

use thiserror::Error;

/// Identity of the party making a request, as resolved by the session layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Caller {
    #[default]
    Anonymous,
    Authenticated { username: String },
}

impl Caller {
    pub fn user(username: impl Into<String>) -> Self {
        Self::Authenticated {
            username: username.into(),
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { username } => Some(username.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("authentication required")]
pub struct AuthenticationRequired;

/// Denies anonymous callers; returns the authenticated user name otherwise.
pub fn require_authenticated(caller: &Caller) -> Result<&str, AuthenticationRequired> {
    caller.username().ok_or(AuthenticationRequired)
}

/// Builds the login redirect target carrying the originally requested path.
pub fn login_redirect(login_url: &str, next: &str) -> String {
    let separator = if login_url.contains('?') { '&' } else { '?' };
    format!("{login_url}{separator}next={}", percent_encode(next))
}

pub(crate) fn percent_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                encoded.push(char::from(byte));
            }
            other => encoded.push_str(&format!("%{other:02X}")),
        }
    }
    encoded
}
