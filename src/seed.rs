//! Starter items shown on first load. They are not persisted; every launch
//! begins from this set (or from the `items` list in the config file).

use serde::Deserialize;

use crate::models::FileType;

/// An item definition with a fixed id, as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    pub content: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl SeedItem {
    fn new(id: &str, title: &str, file_type: FileType, content: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            file_type,
            content: content.to_string(),
            thumbnail: None,
        }
    }
}

/// The built-in trip: travel documents, a to-do note, and a bookmark.
pub fn default_items() -> Vec<SeedItem> {
    vec![
        SeedItem::new(
            "1",
            "Passport",
            FileType::Image,
            "https://picsum.photos/id/103/600/800",
        ),
        SeedItem::new(
            "2",
            "VISA",
            FileType::Image,
            "https://picsum.photos/id/20/600/800",
        ),
        SeedItem::new(
            "3",
            "Ticket",
            FileType::Image,
            "https://picsum.photos/id/3/600/400",
        ),
        SeedItem::new(
            "11",
            "To Do List",
            FileType::Txt,
            "1. Check in hotel\n2. Meeting with CEO at 2 PM\n3. Buy souvenirs",
        ),
        SeedItem::new("12", "Google", FileType::Link, "https://www.google.com"),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn default_ids_are_unique() {
        let items = default_items();
        let ids: HashSet<&str> = items.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids.len(), items.len());
    }
}
