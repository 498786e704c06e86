//! Core library surface for the trip binder.
//!
//! The model (classification, the item store, and content references) lives
//! here so the terminal front-end and the tests drive the same code.
pub mod classify;
pub mod clock;
pub mod config;
pub mod content;
pub mod logging;
pub mod models;
pub mod seed;
pub mod store;
pub mod ui;

/// Classification entry points used when a file is picked or a link typed in.
pub use classify::{
    classify_file, classify_link, resolve_file_type, Classified, ClassifiedFile, ClassifiedLink,
    FileDescriptor, LinkRejected,
};

pub use config::{Config, Paths};
pub use content::{ContentRef, ContentRegistry, FileSource, PendingDecode};

/// The domain types other layers manipulate.
pub use models::{BinderItem, Content, FileType, ItemId};

pub use store::BinderStore;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
