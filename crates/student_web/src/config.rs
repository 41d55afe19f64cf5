//! Site configuration.
//!
//! Values come from `STUDENTS_*` environment variables, falling back to
//! defaults that work for local runs.

use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "STUDENTS_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "STUDENTS_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "STUDENTS_LOG_DIR";
pub const ENV_MEDIA_ROOT: &str = "STUDENTS_MEDIA_ROOT";
pub const ENV_LOGIN_URL: &str = "STUDENTS_LOGIN_URL";

const DEFAULT_DB_FILE_NAME: &str = "students.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "student_directory_logs";
const DEFAULT_LOGIN_URL: &str = "/accounts/login/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Must be absolute.
    pub log_dir: PathBuf,
    /// Photo uploads are ignored when unset.
    pub media_root: Option<PathBuf>,
    /// Anonymous callers of guarded routes are redirected here.
    pub login_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl SiteConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: get(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: get(ENV_LOG_LEVEL)
                .unwrap_or_else(|| student_core::default_log_level().to_string()),
            log_dir: get(ENV_LOG_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME)),
            media_root: get(ENV_MEDIA_ROOT).map(PathBuf::from),
            login_url: get(ENV_LOGIN_URL).unwrap_or_else(|| DEFAULT_LOGIN_URL.to_string()),
        }
    }
}
