use std::fs;
use std::path::Path;

use thiserror::Error;

/// Where an uploaded image ends up; each target has its own size ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// Hero image of a template.
    TemplateHero,
    /// Image attached to a single question.
    QuestionImage,
}

impl UploadKind {
    pub fn max_bytes(self) -> u64 {
        match self {
            UploadKind::TemplateHero => 5 * 1024 * 1024,
            UploadKind::QuestionImage => 500 * 1024,
        }
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("'{file}' is not an image ({mime})")]
    NotAnImage { file: String, mime: String },
    #[error("'{file}' is {size} bytes, the limit is {limit} bytes")]
    TooLarge { file: String, size: u64, limit: u64 },
    #[error("failed to read '{file}': {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

impl UploadError {
    pub fn code(&self) -> &'static str {
        match self {
            UploadError::NotAnImage { .. } => "upload_not_image",
            UploadError::TooLarge { .. } => "upload_too_large",
            UploadError::Io { .. } => "upload_io",
        }
    }
}

/// File that passed the client-side checks and is ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// MIME type guessed from the file extension.
pub fn guess_mime(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Checks type and size before anything is read or sent.
pub fn prepare(path: &Path, kind: UploadKind) -> Result<PreparedUpload, UploadError> {
    let file = path.display().to_string();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.clone());

    let mime = guess_mime(&file_name);
    if !mime.starts_with("image/") {
        return Err(UploadError::NotAnImage {
            file,
            mime: mime.to_string(),
        });
    }

    let size = fs::metadata(path)
        .map_err(|source| UploadError::Io {
            file: file.clone(),
            source,
        })?
        .len();
    let limit = kind.max_bytes();
    if size > limit {
        return Err(UploadError::TooLarge { file, size, limit });
    }

    let bytes = fs::read(path).map_err(|source| UploadError::Io { file, source })?;
    Ok(PreparedUpload {
        file_name,
        mime: mime.to_string(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(guess_mime("hero.PNG"), "image/png");
        assert_eq!(guess_mime("photo.jpeg"), "image/jpeg");
        assert_eq!(guess_mime("notes.txt"), "text/plain");
        assert_eq!(guess_mime("noext"), "application/octet-stream");
    }

    #[test]
    fn question_images_have_the_smaller_ceiling() {
        assert!(UploadKind::QuestionImage.max_bytes() < UploadKind::TemplateHero.max_bytes());
        assert_eq!(UploadKind::QuestionImage.max_bytes(), 512_000);
    }
}
