//! Request payload extractor accepting JSON objects or multipart forms.
//!
//! Clients submit the same field names either as a JSON object or as
//! `multipart/form-data` text parts; files only travel as multipart parts.
//! URL-encoded forms are accepted as well. Every value is exposed as text and
//! typed later by the domain parsers in `solicitudes_core::forms`.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Form;
use serde_json::Value;
use solicitudes_core::forms::{parse_id, present};
use solicitudes_core::types::DbId;

use crate::error::AppError;

/// A file part received in a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied filename (unsanitised).
    pub file_name: String,
    pub bytes: Bytes,
}

/// Text fields and file parts of a request body.
#[derive(Debug, Default)]
pub struct RequestForm {
    fields: HashMap<String, String>,
    files: Vec<(String, UploadedFile)>,
}

impl RequestForm {
    /// Build a form from text fields only.
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            files: Vec::new(),
        }
    }

    /// Raw text of a field, if it was sent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Parse a required positive id, failing with `missing_message` when absent.
    pub fn required_id(&self, name: &str, missing_message: &str) -> Result<DbId, AppError> {
        let raw = present(self.text(name))
            .ok_or_else(|| AppError::validation(missing_message))?;
        Ok(parse_id(name, raw)?)
    }

    /// Remove and return every file sent under `name`, in upload order.
    pub fn take_files(&mut self, name: &str) -> Vec<UploadedFile> {
        let (taken, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.files).into_iter().partition(|(n, _)| n == name);
        self.files = kept;
        taken.into_iter().map(|(_, file)| file).collect()
    }

    /// Remove and return the first file sent under `name`.
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        let index = self.files.iter().position(|(n, _)| n == name)?;
        Some(self.files.remove(index).1)
    }

    fn insert_json(&mut self, name: String, value: Value) {
        let text = match value {
            Value::Null => return,
            Value::String(s) => s,
            other => other.to_string(),
        };
        self.fields.insert(name, text);
    }
}

impl<S> FromRequest<S> for RequestForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return read_multipart(multipart).await;
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Ok(Self::from_fields(fields));
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("JSON inválido: {e}")))?;
        let Value::Object(map) = value else {
            return Err(AppError::BadRequest(
                "El cuerpo de la petición debe ser un objeto JSON.".into(),
            ));
        };

        let mut form = Self::default();
        for (name, value) in map {
            form.insert_json(name, value);
        }
        Ok(form)
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<RequestForm, AppError> {
    let mut form = RequestForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        if name.is_empty() {
            continue;
        }
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let bytes = field.bytes().await?;
                // Browsers send an empty part for an untouched file input.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.files.push((name, UploadedFile { file_name, bytes }));
            }
            None => {
                let text = field.text().await?;
                form.fields.insert(name, text);
            }
        }
    }

    Ok(form)
}
