//! The authoritative, session-scoped collection of binder items.
//!
//! The store is the only owner of items and of the content references they
//! hold. Every operation that drops an item's reference (removal, or an update
//! that swaps in new content) revokes it in the registry before returning, and
//! removing the selected item clears the selection in the same call.

use anyhow::{bail, Result};
use tracing::{debug, info};

use crate::clock::LogicalClock;
use crate::content::{ContentRef, ContentRegistry};
use crate::models::{BinderItem, Content, FileType, ItemId};
use crate::seed::SeedItem;

/// Ordered binder items plus the single "currently open" slot.
pub struct BinderStore {
    items: Vec<BinderItem>,
    selected: Option<ItemId>,
    clock: LogicalClock,
    registry: ContentRegistry,
}

impl BinderStore {
    /// Create an empty store that releases references through `registry`.
    pub fn new(registry: ContentRegistry) -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            clock: LogicalClock::new(),
            registry,
        }
    }

    /// Create a store pre-filled with starter items, in the given order.
    pub fn seeded(
        registry: ContentRegistry,
        items: impl IntoIterator<Item = SeedItem>,
    ) -> Result<Self> {
        let mut store = Self::new(registry);
        for item in items {
            store.insert_seed(item)?;
        }
        info!(count = store.len(), "seeded binder");
        Ok(store)
    }

    /// Registry used to create, resolve, and release content references.
    pub fn registry(&self) -> &ContentRegistry {
        &self.registry
    }

    /// Insert a starter item under its own id. Seeds never overwrite an
    /// existing item.
    pub fn insert_seed(&mut self, seed: SeedItem) -> Result<()> {
        let id = ItemId::from(seed.id);
        if self.position(&id).is_some() {
            bail!("Duplicate item id '{id}' in starter items");
        }

        let timestamp = self.clock.tick();
        self.items.push(BinderItem {
            id,
            title: seed.title,
            file_type: seed.file_type,
            content: Content::Inline(seed.content),
            thumbnail: seed.thumbnail,
            timestamp,
        });
        Ok(())
    }

    /// Append a new item under a freshly allocated id.
    pub fn add(&mut self, title: impl Into<String>, file_type: FileType, content: Content) -> ItemId {
        let mut id = ItemId::generate();
        while self.position(&id).is_some() {
            id = ItemId::generate();
        }

        let item = BinderItem {
            id: id.clone(),
            title: title.into(),
            file_type,
            content,
            thumbnail: None,
            timestamp: self.clock.tick(),
        };
        info!(id = %item.id, title = %item.title, kind = %item.file_type, "added item");
        self.items.push(item);
        id
    }

    /// Rename an item and optionally swap its content and kind. Unknown ids
    /// are ignored; any reference passed in for one is released so it cannot
    /// leak.
    pub fn update(
        &mut self,
        id: &ItemId,
        title: impl Into<String>,
        content: Option<Content>,
        file_type: Option<FileType>,
    ) -> Result<()> {
        let Some(index) = self.position(id) else {
            debug!(%id, "update ignored for unknown item");
            return self.release(content.and_then(Content::into_reference));
        };

        let item = &mut self.items[index];
        item.title = title.into();
        if let Some(kind) = file_type {
            item.file_type = kind;
        }
        let displaced = content.map(|content| std::mem::replace(&mut item.content, content));
        info!(%id, title = %item.title, kind = %item.file_type, "updated item");

        self.release(displaced.and_then(Content::into_reference))
    }

    /// Delete an item and release whatever reference it owned. Clears the
    /// selection when it pointed at the removed item.
    pub fn remove(&mut self, id: &ItemId) -> Result<()> {
        let Some(index) = self.position(id) else {
            debug!(%id, "remove ignored for unknown item");
            return Ok(());
        };

        let item = self.items.remove(index);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        info!(%id, title = %item.title, "removed item");

        self.release(item.content.into_reference())
    }

    /// Open an item. Unknown ids clear the selection instead.
    pub fn select(&mut self, id: &ItemId) -> Option<&BinderItem> {
        self.selected = self.position(id).map(|_| id.clone());
        self.selected()
    }

    /// The currently open item, if any.
    pub fn selected(&self) -> Option<&BinderItem> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn get(&self, id: &ItemId) -> Option<&BinderItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Items in insertion order.
    pub fn list(&self) -> &[BinderItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    fn release(&self, reference: Option<ContentRef>) -> Result<()> {
        match reference {
            Some(reference) => self.registry.revoke(reference),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_store() -> BinderStore {
        BinderStore::new(ContentRegistry::open_in_memory().unwrap())
    }

    fn passport_store() -> BinderStore {
        let mut store = empty_store();
        store
            .insert_seed(SeedItem {
                id: "1".to_string(),
                title: "Passport".to_string(),
                file_type: FileType::Image,
                content: "https://picsum.photos/id/103/600/800".to_string(),
                thumbnail: None,
            })
            .unwrap();
        store
    }

    fn snapshot(store: &BinderStore) -> Vec<(String, String, FileType, String)> {
        store
            .list()
            .iter()
            .map(|item| {
                (
                    item.id.to_string(),
                    item.title.clone(),
                    item.file_type,
                    item.content.as_str().to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn add_appends_in_insertion_order_with_increasing_timestamps() {
        let mut store = passport_store();
        let ticket = store.add("Ticket", FileType::Link, Content::from("https://www.google.com"));
        let notes = store.add("Notes", FileType::Txt, Content::from("pack socks"));

        let titles: Vec<&str> = store.list().iter().map(|item| item.title.as_str()).collect();
        assert_eq!(titles, ["Passport", "Ticket", "Notes"]);
        assert!(store.list().windows(2).all(|pair| pair[0].timestamp < pair[1].timestamp));
        assert_ne!(ticket, notes);
    }

    #[test]
    fn add_then_remove_restores_previous_state() {
        let mut store = passport_store();
        let before = snapshot(&store);

        let id = store.add("Visa", FileType::Image, Content::from("https://example.com/v.png"));
        store.remove(&id).unwrap();

        assert_eq!(snapshot(&store), before);
    }

    #[test]
    fn title_only_update_keeps_content_and_type() {
        let mut store = passport_store();
        let id = ItemId::from("1");
        let timestamp = store.get(&id).unwrap().timestamp;

        store.update(&id, "NewTitle", None, None).unwrap();

        let item = store.get(&id).unwrap();
        assert_eq!(item.title, "NewTitle");
        assert_eq!(item.file_type, FileType::Image);
        assert_eq!(item.content.as_str(), "https://picsum.photos/id/103/600/800");
        assert_eq!(item.timestamp, timestamp);
    }

    #[test]
    fn update_of_unknown_id_changes_nothing() {
        let mut store = passport_store();
        let before = snapshot(&store);

        store
            .update(&ItemId::from("missing"), "Ghost", Some(Content::from("x")), Some(FileType::Pdf))
            .unwrap();

        assert_eq!(snapshot(&store), before);
    }

    #[test]
    fn update_of_unknown_id_releases_the_offered_reference() {
        let mut store = passport_store();
        let reference = store.registry().create("a.png", "image/png", &[1]).unwrap();

        store
            .update(&ItemId::from("missing"), "a.png", Some(reference.into()), Some(FileType::Image))
            .unwrap();

        assert_eq!(store.registry().live_count().unwrap(), 0);
    }

    #[test]
    fn replacing_content_releases_only_the_displaced_reference() {
        let mut store = empty_store();
        let old = store.registry().create("old.pdf", "application/pdf", b"old").unwrap();
        let id = store.add("old.pdf", FileType::Pdf, old.into());
        let new = store.registry().create("new.mp4", "video/mp4", b"new").unwrap();
        let new_handle = new.handle().to_string();

        store
            .update(&id, "new.mp4", Some(new.into()), Some(FileType::Video))
            .unwrap();

        let item = store.get(&id).unwrap();
        assert_eq!(item.file_type, FileType::Video);
        assert_eq!(item.content.as_str(), new_handle);
        assert_eq!(store.registry().live_count().unwrap(), 1);
        assert!(store.registry().resolve(&new_handle).is_ok());
    }

    #[test]
    fn content_only_update_keeps_the_type() {
        let mut store = passport_store();
        let id = ItemId::from("1");

        store
            .update(&id, "Passport", Some(Content::from("https://example.com/scan.png")), None)
            .unwrap();

        let item = store.get(&id).unwrap();
        assert_eq!(item.file_type, FileType::Image);
        assert_eq!(item.content.as_str(), "https://example.com/scan.png");
    }

    #[test]
    fn type_only_update_keeps_the_content_reference() {
        let mut store = empty_store();
        let reference = store.registry().create("scan", "", b"bytes").unwrap();
        let handle = reference.handle().to_string();
        let id = store.add("scan", FileType::Doc, reference.into());

        store.update(&id, "scan", None, Some(FileType::Pdf)).unwrap();

        let item = store.get(&id).unwrap();
        assert_eq!(item.file_type, FileType::Pdf);
        assert_eq!(item.content.as_str(), handle);
        assert_eq!(store.registry().live_count().unwrap(), 1);
        assert!(store.registry().resolve(&handle).is_ok());
    }

    #[test]
    fn exported_copies_go_away_with_their_item() {
        let viewing = tempfile::tempdir().unwrap();
        let mut store = empty_store();

        let removed = store.registry().create("boarding.pdf", "application/pdf", b"%PDF").unwrap();
        let removed_path = store.registry().export(removed.handle(), viewing.path()).unwrap();
        let removed_id = store.add("boarding.pdf", FileType::Pdf, removed.into());

        let replaced = store.registry().create("map.png", "image/png", b"png").unwrap();
        let replaced_path = store.registry().export(replaced.handle(), viewing.path()).unwrap();
        let replaced_id = store.add("map.png", FileType::Image, replaced.into());

        store.remove(&removed_id).unwrap();
        store
            .update(&replaced_id, "Map", Some(Content::from("https://maps.example")), None)
            .unwrap();

        assert!(!removed_path.exists());
        assert!(!replaced_path.exists());
        assert_eq!(store.registry().live_count().unwrap(), 0);
    }

    #[test]
    fn removing_an_item_releases_its_reference() {
        let mut store = empty_store();
        let reference = store.registry().create("clip.mp3", "audio/mpeg", b"ID3").unwrap();
        let handle = reference.handle().to_string();
        let id = store.add("clip.mp3", FileType::Audio, reference.into());

        store.remove(&id).unwrap();

        assert!(store.is_empty());
        assert!(store.registry().resolve(&handle).is_err());
    }

    #[test]
    fn remove_of_unknown_id_is_a_no_op() {
        let mut store = passport_store();
        store.remove(&ItemId::from("nope")).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn removing_the_selected_item_clears_selection() {
        let mut store = passport_store();
        let id = ItemId::from("1");
        assert!(store.select(&id).is_some());

        store.remove(&id).unwrap();

        assert!(store.selected().is_none());
        assert!(store.get(&id).is_none());
    }

    #[test]
    fn removing_another_item_keeps_selection() {
        let mut store = passport_store();
        let other = store.add("Ticket", FileType::Link, Content::from("https://t.example"));
        store.select(&ItemId::from("1"));

        store.remove(&other).unwrap();

        assert_eq!(store.selected().unwrap().title, "Passport");
    }

    #[test]
    fn selecting_unknown_id_yields_no_selection() {
        let mut store = passport_store();
        store.select(&ItemId::from("1"));
        assert!(store.select(&ItemId::from("404")).is_none());
        assert!(store.selected().is_none());
    }

    #[test]
    fn duplicate_seed_ids_are_rejected() {
        let mut store = passport_store();
        let duplicate = SeedItem {
            id: "1".to_string(),
            title: "Copy".to_string(),
            file_type: FileType::Txt,
            content: String::new(),
            thumbnail: None,
        };
        assert!(store.insert_seed(duplicate).is_err());
        assert_eq!(store.len(), 1);
    }
}
