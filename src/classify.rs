//! Decides what kind of binder item a picked file or a typed-in link becomes.
//!
//! MIME type wins over the file name: a file the environment reports as
//! `image/*` is an image even when it is called `slides.pptx`. Only when the
//! MIME type says nothing useful does the extension get a say, and anything
//! still unmatched lands in the catch-all `doc` kind, so no file is ever
//! refused.

use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{debug, info};

use crate::content::{ContentRegistry, DecodedText, FileSource, PendingDecode};
use crate::models::{Content, FileType};

/// A picked file: its name, the MIME type the environment reported (possibly
/// empty), and where its bytes live.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    pub name: String,
    pub mime_type: String,
    pub source: FileSource,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, source: FileSource) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            source,
        }
    }

    /// Describe a file on disk, sniffing its MIME type from the extension.
    /// Unknown extensions report an empty MIME type.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .context("path does not name a file")?
            .to_string_lossy()
            .into_owned();
        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default();

        Ok(Self::new(name, mime_type, FileSource::Path(path.to_path_buf())))
    }
}

/// A classified file ready to be stored.
#[derive(Debug, PartialEq, Eq)]
pub struct ClassifiedFile {
    /// Always the original file name.
    pub title: String,
    pub file_type: FileType,
    pub content: Content,
}

impl From<DecodedText> for ClassifiedFile {
    fn from(decoded: DecodedText) -> Self {
        Self {
            title: decoded.file_name,
            file_type: FileType::Txt,
            content: Content::Inline(decoded.text),
        }
    }
}

/// Result of classifying a file. Text files need their bytes decoded before
/// the content exists; everything else is ready immediately.
#[derive(Debug)]
pub enum Classified {
    Ready(ClassifiedFile),
    Pending(PendingDecode),
}

/// A manually entered link ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLink {
    pub title: String,
    pub url: String,
}

impl ClassifiedLink {
    pub fn file_type(&self) -> FileType {
        FileType::Link
    }
}

/// Why a link submission produced no item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LinkRejected {
    #[error("A title is required.")]
    MissingTitle,
    #[error("A URL is required.")]
    MissingUrl,
}

/// Pick a kind from the MIME type first, then the file name.
pub fn resolve_file_type(name: &str, mime_type: &str) -> FileType {
    if let Some(kind) = type_from_mime(mime_type) {
        return kind;
    }
    type_from_extension(name).unwrap_or(FileType::Doc)
}

fn type_from_mime(mime_type: &str) -> Option<FileType> {
    let mime_type = mime_type.trim();
    if mime_type.starts_with("image/") {
        Some(FileType::Image)
    } else if mime_type.starts_with("video/") {
        Some(FileType::Video)
    } else if mime_type.starts_with("audio/") {
        Some(FileType::Audio)
    } else if mime_type == "application/pdf" {
        Some(FileType::Pdf)
    } else if mime_type == "text/plain" {
        Some(FileType::Txt)
    } else {
        None
    }
}

fn type_from_extension(name: &str) -> Option<FileType> {
    let lower = name.to_ascii_lowercase();
    let ends_with_any = |suffixes: &[&str]| suffixes.iter().any(|suffix| lower.ends_with(suffix));

    if ends_with_any(&[".ppt", ".pptx"]) {
        Some(FileType::Ppt)
    } else if ends_with_any(&[".doc", ".docx"]) {
        Some(FileType::Doc)
    } else if ends_with_any(&[".xls", ".xlsx"]) {
        Some(FileType::Xls)
    } else {
        None
    }
}

/// Classify a file and materialize its content: text files start a decode,
/// every other kind is registered and stored as a content reference.
///
/// Fails without side effects when the bytes cannot be read or registered.
pub fn classify_file(registry: &ContentRegistry, file: FileDescriptor) -> Result<Classified> {
    let file_type = resolve_file_type(&file.name, &file.mime_type);
    info!(name = %file.name, mime = %file.mime_type, kind = %file_type, "classified file");

    if file_type.is_text() {
        let pending = PendingDecode::spawn(file.name, file.source)
            .context("failed to start reading text file")?;
        return Ok(Classified::Pending(pending));
    }

    let origin = file.source.describe();
    let bytes = file
        .source
        .into_bytes()
        .with_context(|| format!("failed to read {origin}"))?;
    let reference = registry.create(&file.name, &file.mime_type, &bytes)?;
    debug!(handle = reference.handle(), "file content registered");

    Ok(Classified::Ready(ClassifiedFile {
        title: file.name,
        file_type,
        content: Content::Reference(reference),
    }))
}

/// Validate a typed-in link. URLs without an `http` prefix get `https://`.
pub fn classify_link(title: &str, url: &str) -> Result<ClassifiedLink, LinkRejected> {
    let title = title.trim();
    let url = url.trim();
    if title.is_empty() {
        return Err(LinkRejected::MissingTitle);
    }
    if url.is_empty() {
        return Err(LinkRejected::MissingUrl);
    }

    let url = if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{url}")
    };

    Ok(ClassifiedLink {
        title: title.to_string(),
        url,
    })
}
