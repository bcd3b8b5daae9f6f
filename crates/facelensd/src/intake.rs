//! Uploaded images, taken from a multipart form as-is.
//!
//! The only filter is the file-name extension. Bytes are not decoded,
//! sniffed for malware, or size-checked here.

use axum::extract::multipart::{Multipart, MultipartError};
use std::collections::HashMap;
use thiserror::Error;

/// Accepted upload extensions, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("could not read upload: {0}")]
    Multipart(#[from] MultipartError),
    #[error("{0} is not a supported image type ({allowed})", allowed = ALLOWED_EXTENSIONS.join(", "))]
    DisallowedExtension(String),
}

/// One uploaded file.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Best-effort content type for display, from the leading bytes.
    pub fn mime(&self) -> &'static str {
        match image::guess_format(&self.bytes) {
            Ok(image::ImageFormat::Png) => "image/png",
            Ok(image::ImageFormat::Jpeg) => "image/jpeg",
            _ => "application/octet-stream",
        }
    }
}

pub fn is_allowed(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// Files from one form submission, keyed by form field name.
#[derive(Debug, Default)]
pub struct Uploads {
    files: HashMap<String, Upload>,
    /// Files refused by the extension filter.
    pub rejected: Vec<IntakeError>,
}

impl Uploads {
    /// Read every file field of `multipart`. Non-file fields are ignored.
    pub async fn read(multipart: &mut Multipart) -> Result<Self, IntakeError> {
        let mut uploads = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            let Some(file_name) = field.file_name().map(str::to_string) else {
                continue;
            };
            let bytes = field.bytes().await?;
            uploads.accept(name, file_name, bytes.to_vec());
        }
        tracing::debug!(
            accepted = uploads.files.len(),
            rejected = uploads.rejected.len(),
            "uploads read"
        );
        Ok(uploads)
    }

    /// Keep a file unless it is empty (no file chosen) or has a disallowed extension.
    pub fn accept(&mut self, field: String, file_name: String, bytes: Vec<u8>) {
        if file_name.is_empty() && bytes.is_empty() {
            return;
        }
        if !is_allowed(&file_name) {
            tracing::warn!(field = %field, file = %file_name, "upload rejected by extension filter");
            self.rejected.push(IntakeError::DisallowedExtension(file_name));
            return;
        }
        if bytes.is_empty() {
            return;
        }
        self.files.insert(field, Upload { file_name, bytes });
    }

    pub fn take(&mut self, field: &str) -> Option<Upload> {
        self.files.remove(field)
    }
}
