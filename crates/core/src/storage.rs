//! Local file storage for request documents.
//!
//! Files live under a configurable root at
//! `solicitud_archivos/<sca_id>/<filename>`. The database stores only the
//! relative path; [`LocalStorage`] resolves it against the root.

use std::path::{Component, Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::types::DbId;

/// Top-level directory (relative to the storage root) for request documents.
pub const DOCUMENTS_DIR: &str = "solicitud_archivos";

/// Fallback name for uploads without a usable filename.
const DEFAULT_FILE_NAME: &str = "archivo";

/// Capacity of the `doc_archivo` column, in characters.
pub const MAX_STORED_PATH_LENGTH: usize = 255;

/// Longest single path segment most filesystems accept, in bytes.
const MAX_SEGMENT_BYTES: usize = 255;

/// Length of the `_xxxxxxxx` collision suffix.
const UNIQUE_SUFFIX_LEN: usize = 9;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// Reduce a client-supplied filename to a safe single path segment.
///
/// Directory components are dropped, spaces become `_` and anything other
/// than letters, digits, `_`, `-` and `.` is removed. Leading dots are
/// stripped so uploads never become hidden files.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .trim()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        DEFAULT_FILE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

fn documents_dir(sca_id: DbId) -> String {
    format!("{DOCUMENTS_DIR}/{sca_id}")
}

/// Bytes available for a file name inside the directory of request `sca_id`.
fn name_budget(sca_id: DbId) -> usize {
    MAX_STORED_PATH_LENGTH
        .saturating_sub(documents_dir(sca_id).len() + 1)
        .min(MAX_SEGMENT_BYTES)
}

/// Split `plano.pdf` into `("plano", ".pdf")`. Dotfiles have no extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Longest prefix of `s` within `max` bytes, cut at a char boundary.
fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Shorten `name` to at most `budget` bytes, keeping its extension when the
/// stem still has room for a character.
fn fit_file_name(name: &str, budget: usize) -> String {
    if name.len() <= budget {
        return name.to_string();
    }
    let (stem, ext) = split_extension(name);
    if ext.len() + 4 <= budget {
        format!("{}{ext}", truncate_bytes(stem, budget - ext.len()))
    } else {
        truncate_bytes(name, budget).to_string()
    }
}

/// Relative storage path of a document belonging to request `sca_id`.
///
/// The result always fits the `doc_archivo` column.
pub fn document_relative_path(sca_id: DbId, file_name: &str) -> String {
    let name = fit_file_name(&sanitize_file_name(file_name), name_budget(sca_id));
    format!("{}/{name}", documents_dir(sca_id))
}

/// Same as [`document_relative_path`] with a short random suffix before the
/// extension: `plano.pdf` -> `plano_1a2b3c4d.pdf`.
fn unique_relative_path(sca_id: DbId, file_name: &str) -> String {
    let budget = name_budget(sca_id).saturating_sub(UNIQUE_SUFFIX_LEN);
    let name = fit_file_name(&sanitize_file_name(file_name), budget);
    let suffix = &uuid::Uuid::new_v4().simple().to_string()[..UNIQUE_SUFFIX_LEN - 1];
    let (stem, ext) = split_extension(&name);
    format!("{}/{stem}_{suffix}{ext}", documents_dir(sca_id))
}

/// Final segment of a stored relative path.
pub fn file_name_of(relative: &str) -> &str {
    relative.rsplit('/').next().unwrap_or(relative)
}

/// Best-effort MIME type from the file extension.
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "txt" => "text/plain; charset=utf-8",
        "csv" => "text/csv; charset=utf-8",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

// ---------------------------------------------------------------------------
// LocalStorage
// ---------------------------------------------------------------------------

/// Filesystem-backed document store rooted at a media directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a stored relative path. Absolute paths and `..` are rejected.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let path = Path::new(relative);
        let is_plain = path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if relative.is_empty() || !is_plain {
            return Err(StorageError::InvalidPath(relative.to_string()));
        }
        Ok(self.root.join(path))
    }

    /// Write a document for request `sca_id` and return its relative path.
    ///
    /// An existing file with the same name is never overwritten; a random
    /// suffix is added instead.
    pub async fn save(
        &self,
        sca_id: DbId,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        let mut relative = document_relative_path(sca_id, file_name);
        let dir = self.resolve(&documents_dir(sca_id))?;
        tokio::fs::create_dir_all(&dir).await?;

        let mut file = loop {
            let target = self.resolve(&relative)?;
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&target)
                .await
            {
                Ok(file) => break file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    relative = unique_relative_path(sca_id, file_name);
                }
                Err(e) => return Err(e.into()),
            }
        };

        file.write_all(bytes).await?;
        file.flush().await?;

        tracing::debug!(sca_id, path = %relative, size = bytes.len(), "Document stored");
        Ok(relative)
    }

    /// Open a stored document for streaming.
    pub async fn open(&self, relative: &str) -> Result<(tokio::fs::File, u64), StorageError> {
        let path = self.resolve(relative)?;
        let file = tokio::fs::File::open(&path).await?;
        let len = file.metadata().await?.len();
        Ok((file, len))
    }

    /// Delete a stored document. Returns `false` if it was already absent.
    pub async fn delete(&self, relative: &str) -> Result<bool, StorageError> {
        let path = self.resolve(relative)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove several documents, logging instead of failing.
    ///
    /// Used to clean up files written for a transaction that did not commit.
    pub async fn discard_all(&self, relatives: &[String]) {
        for relative in relatives {
            if let Err(e) = self.delete(relative).await {
                tracing::warn!(path = %relative, error = %e, "Failed to discard stored document");
            }
        }
    }
}
