use trip_binder::{
    classify_file, classify_link, BinderStore, Classified, ClassifiedFile, Content,
    ContentRegistry, FileDescriptor, FileSource, FileType, ItemId,
};
use trip_binder::seed::SeedItem;

fn passport_store() -> BinderStore {
    let passport = SeedItem {
        id: "1".to_string(),
        title: "Passport".to_string(),
        file_type: FileType::Image,
        content: "https://picsum.photos/id/103/600/800".to_string(),
        thumbnail: None,
    };
    BinderStore::seeded(ContentRegistry::open_in_memory().unwrap(), [passport]).unwrap()
}

#[test]
fn passport_and_ticket_scenario() {
    let mut store = passport_store();

    store.add("Ticket", FileType::Link, Content::from("https://www.google.com"));
    assert_eq!(store.len(), 2);
    let ticket = &store.list()[1];
    assert_eq!(ticket.file_type, FileType::Link);
    assert_eq!(ticket.content.as_str(), "https://www.google.com");

    store.remove(&ItemId::from("1")).unwrap();
    assert_eq!(store.len(), 1);
    assert!(store.get(&ItemId::from("1")).is_none());
}

#[test]
fn typed_link_flows_into_the_store() {
    let mut store = passport_store();
    let link = classify_link("Hotel", "hotel.example/booking").unwrap();

    let file_type = link.file_type();
    let id = store.add(link.title, file_type, link.url.into());

    let item = store.get(&id).unwrap();
    assert_eq!(item.content.as_str(), "https://hotel.example/booking");
    assert_eq!(item.title, "Hotel");
}

#[test]
fn picked_files_own_their_references_until_deleted() {
    let dir = tempfile::tempdir().unwrap();
    let photo = dir.path().join("visa.jpg");
    let notes = dir.path().join("notes.txt");
    std::fs::write(&photo, [0xff, 0xd8, 0xff]).unwrap();
    std::fs::write(&notes, "Embassy opens at 9").unwrap();

    let mut store = passport_store();

    let Classified::Ready(file) =
        classify_file(store.registry(), FileDescriptor::from_path(&photo).unwrap()).unwrap()
    else {
        panic!("images are registered immediately");
    };
    assert_eq!(file.file_type, FileType::Image);
    let photo_id = store.add(file.title, file.file_type, file.content);
    assert_eq!(store.registry().live_count().unwrap(), 1);

    let Classified::Pending(pending) =
        classify_file(store.registry(), FileDescriptor::from_path(&notes).unwrap()).unwrap()
    else {
        panic!("text files are decoded");
    };
    let decoded = ClassifiedFile::from(pending.wait().unwrap());
    store
        .update(&photo_id, decoded.title, Some(decoded.content), Some(decoded.file_type))
        .unwrap();

    let item = store.get(&photo_id).unwrap();
    assert_eq!(item.title, "notes.txt");
    assert_eq!(item.file_type, FileType::Txt);
    assert_eq!(item.content.as_str(), "Embassy opens at 9");
    assert_eq!(store.registry().live_count().unwrap(), 0);
}

#[test]
fn deleting_the_open_item_clears_the_selection() {
    let mut store = passport_store();
    let bytes = FileDescriptor::new("deck.key", "", FileSource::Bytes(vec![1, 2, 3]));
    let Classified::Ready(file) = classify_file(store.registry(), bytes).unwrap() else {
        panic!("binary files are registered immediately");
    };
    assert_eq!(file.file_type, FileType::Doc);
    let id = store.add(file.title, file.file_type, file.content);

    assert!(store.select(&id).is_some());
    store.remove(&id).unwrap();

    assert!(store.selected().is_none());
    assert!(store.get(&id).is_none());
    assert_eq!(store.registry().live_count().unwrap(), 0);
}
