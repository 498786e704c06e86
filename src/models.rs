//! Domain models for the binder. These types stay light-weight data holders so
//! the store can own them outright and the UI only ever borrows them.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Error};
use serde::Deserialize;

use crate::content::ContentRef;

/// Closed set of content kinds an item can hold. Rendering, badges, and the
/// open action all match on this exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Video,
    Audio,
    Pdf,
    Doc,
    Xls,
    Ppt,
    Txt,
    Link,
}

impl FileType {
    /// Every variant in display order.
    pub const ALL: [FileType; 9] = [
        FileType::Image,
        FileType::Video,
        FileType::Audio,
        FileType::Pdf,
        FileType::Doc,
        FileType::Xls,
        FileType::Ppt,
        FileType::Txt,
        FileType::Link,
    ];

    /// Lowercase tag used in configuration files and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Image => "image",
            FileType::Video => "video",
            FileType::Audio => "audio",
            FileType::Pdf => "pdf",
            FileType::Doc => "doc",
            FileType::Xls => "xls",
            FileType::Ppt => "ppt",
            FileType::Txt => "txt",
            FileType::Link => "link",
        }
    }

    /// Short uppercase label printed in the corner of a grid card. Links read
    /// as `WEB` since "LINK" says nothing about where they lead.
    pub fn badge(self) -> &'static str {
        match self {
            FileType::Link => "WEB",
            FileType::Image => "IMAGE",
            FileType::Video => "VIDEO",
            FileType::Audio => "AUDIO",
            FileType::Pdf => "PDF",
            FileType::Doc => "DOC",
            FileType::Xls => "XLS",
            FileType::Ppt => "PPT",
            FileType::Txt => "TXT",
        }
    }

    /// Whether the content of this kind is inline text rather than a reference.
    pub fn is_text(self) -> bool {
        matches!(self, FileType::Txt)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        FileType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| anyhow!("unknown file type '{value}'"))
    }
}

/// Opaque identifier for a binder item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemId(String);

impl ItemId {
    /// Allocate a fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an item actually stores. Inline content is either decoded text or a
/// URL the environment can resolve on its own; references are handles issued
/// by the content registry and owned by exactly one item.
#[derive(Debug, PartialEq, Eq)]
pub enum Content {
    Inline(String),
    Reference(ContentRef),
}

impl Content {
    /// The stored string: the text, the URL, or the reference handle.
    pub fn as_str(&self) -> &str {
        match self {
            Content::Inline(value) => value,
            Content::Reference(reference) => reference.handle(),
        }
    }

    /// Split out the owned reference, if any, so the caller can release it.
    pub fn into_reference(self) -> Option<ContentRef> {
        match self {
            Content::Inline(_) => None,
            Content::Reference(reference) => Some(reference),
        }
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Content::Inline(value)
    }
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Content::Inline(value.to_string())
    }
}

impl From<ContentRef> for Content {
    fn from(reference: ContentRef) -> Self {
        Content::Reference(reference)
    }
}

/// One entry in the binder grid.
#[derive(Debug)]
pub struct BinderItem {
    /// Stable for the item's lifetime and unique within the store.
    pub id: ItemId,
    /// User-visible label; file-derived items start with the file name.
    pub title: String,
    pub file_type: FileType,
    pub content: Content,
    /// Optional image reference shown in place of the type icon.
    pub thumbnail: Option<String>,
    /// Creation-order key handed out by the store's logical clock.
    pub timestamp: i64,
}

impl fmt::Display for BinderItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}
