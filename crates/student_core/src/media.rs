//! File storage for student photo uploads.
//!
//! # Responsibility
//! - Persist uploaded bytes under a media root.
//! - Return media-relative paths suitable for the `photo` column.
//!
//! # Invariants
//! - Stored names are unique per upload and never escape the media root.
//! - Existing files are never overwritten.
//! - Only uploads whose row write failed are removed again.

use crate::form::student_form::Attachment;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

const PHOTO_DIR: &str = "students/photos";
const MAX_STORED_NAME_CHARS: usize = 80;

static UNSAFE_NAME_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid file name regex"));

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to store `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Directory-backed store for uploaded student files.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a stored media-relative path to an absolute location.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Writes a photo attachment and returns its media-relative path.
    pub fn store_photo(&self, attachment: &Attachment) -> Result<String, MediaError> {
        let dir = self.root.join(PHOTO_DIR);
        std::fs::create_dir_all(&dir).map_err(|source| MediaError::Io {
            path: dir.clone(),
            source,
        })?;

        let stored_name = format!(
            "{}_{}",
            Uuid::new_v4().simple(),
            sanitize_file_name(&attachment.file_name)
        );
        let path = dir.join(&stored_name);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| MediaError::Io {
                path: path.clone(),
                source,
            })?;
        file.write_all(&attachment.bytes)
            .map_err(|source| MediaError::Io {
                path: path.clone(),
                source,
            })?;

        info!(
            "event=media_store module=media status=ok bytes={}",
            attachment.bytes.len()
        );
        Ok(format!("{PHOTO_DIR}/{stored_name}"))
    }

    /// Removes a file previously returned by `store_photo`.
    ///
    /// Paths outside the photo directory are rejected.
    pub fn remove(&self, relative: &str) -> Result<(), MediaError> {
        let path = self.resolve(relative);
        let inside_photo_dir = relative
            .strip_prefix(PHOTO_DIR)
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(|name| {
                !name.is_empty() && !name.starts_with('.') && !UNSAFE_NAME_CHARS_RE.is_match(name)
            });
        if !inside_photo_dir {
            warn!("event=media_remove module=media status=rejected reason=outside_photo_dir");
            return Err(MediaError::Io {
                path,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "not a stored photo path",
                ),
            });
        }

        std::fs::remove_file(&path).map_err(|source| MediaError::Io { path, source })?;
        info!("event=media_remove module=media status=ok");
        Ok(())
    }
}

/// Reduces a client file name to a safe single path component.
fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned = UNSAFE_NAME_CHARS_RE.replace_all(base, "_");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        return "upload".to_string();
    }
    trimmed.chars().take(MAX_STORED_NAME_CHARS).collect()
}
