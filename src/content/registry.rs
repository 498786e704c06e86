use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

/// Scheme-like prefix every issued handle starts with.
const HANDLE_PREFIX: &str = "blob:trip-binder/";

/// Revocable handle to bytes held by the [`ContentRegistry`].
///
/// The handle is move-only: whoever holds it owns the registry entry, and
/// [`ContentRegistry::revoke`] consumes it, so a reference cannot be released
/// twice.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping a ContentRef without revoking it leaks the registry entry"]
pub struct ContentRef {
    handle: String,
}

impl ContentRef {
    /// The resolvable string form of the reference.
    pub fn handle(&self) -> &str {
        &self.handle
    }
}

/// Bytes and metadata behind a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContent {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Metadata for previews that do not need the bytes themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentMetadata {
    pub file_name: String,
    pub mime_type: String,
    pub size: u64,
}

/// Session-scoped store of binary content. The backing SQLite database lives in
/// memory only, so every reference disappears with the process.
pub struct ContentRegistry {
    conn: Connection,
}

impl ContentRegistry {
    /// Open an empty registry.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open content registry")?;

        conn.execute(
            "CREATE TABLE content_refs (
                handle TEXT PRIMARY KEY,
                file_name TEXT NOT NULL,
                mime_type TEXT NOT NULL,
                bytes BLOB NOT NULL
            )",
            [],
        )
        .context("failed to create content_refs table")?;

        conn.execute(
            "CREATE TABLE exports (
                handle TEXT NOT NULL,
                dir TEXT NOT NULL,
                PRIMARY KEY (handle, dir)
            )",
            [],
        )
        .context("failed to create exports table")?;

        Ok(Self { conn })
    }

    /// Register a file's bytes and hand back the owning reference.
    pub fn create(&self, file_name: &str, mime_type: &str, bytes: &[u8]) -> Result<ContentRef> {
        let handle = format!("{HANDLE_PREFIX}{}", uuid::Uuid::new_v4());
        self.conn
            .execute(
                "INSERT INTO content_refs (handle, file_name, mime_type, bytes)
                 VALUES (?1, ?2, ?3, ?4)",
                params![handle, file_name, mime_type, bytes],
            )
            .context("failed to register content")?;

        debug!(%handle, file_name, size = bytes.len(), "created content reference");
        Ok(ContentRef { handle })
    }

    /// Load the bytes behind a handle.
    pub fn resolve(&self, handle: &str) -> Result<ResolvedContent> {
        self.conn
            .query_row(
                "SELECT file_name, mime_type, bytes FROM content_refs WHERE handle = ?1",
                params![handle],
                |row| {
                    Ok(ResolvedContent {
                        file_name: row.get(0)?,
                        mime_type: row.get(1)?,
                        bytes: row.get(2)?,
                    })
                },
            )
            .optional()
            .context("failed to resolve content reference")?
            .ok_or_else(|| anyhow!("Content reference {handle} is not registered"))
    }

    /// Look up name, MIME type, and size without copying the bytes out.
    pub fn metadata(&self, handle: &str) -> Result<Option<ContentMetadata>> {
        self.conn
            .query_row(
                "SELECT file_name, mime_type, length(bytes) FROM content_refs WHERE handle = ?1",
                params![handle],
                |row| {
                    Ok(ContentMetadata {
                        file_name: row.get(0)?,
                        mime_type: row.get(1)?,
                        size: row.get::<_, i64>(2)?.max(0) as u64,
                    })
                },
            )
            .optional()
            .context("failed to read content metadata")
    }

    /// Release a reference along with any copies exported for viewing.
    /// Consuming the handle ties the release to its single owner; a missing row
    /// therefore means the registry lost track of it.
    pub fn revoke(&self, reference: ContentRef) -> Result<()> {
        let deleted = self
            .conn
            .execute(
                "DELETE FROM content_refs WHERE handle = ?1",
                params![reference.handle],
            )
            .context("failed to revoke content reference")?;

        if deleted == 0 {
            return Err(anyhow!(
                "Content reference {} was already released",
                reference.handle
            ));
        }
        debug!(handle = %reference.handle, "revoked content reference");

        self.remove_exports(&reference.handle)
    }

    /// Number of references currently alive.
    pub fn live_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM content_refs", [], |row| row.get(0))
            .context("failed to count content references")?;
        Ok(count.max(0) as usize)
    }

    /// Write the bytes behind `handle` into a per-handle folder under `root`,
    /// keeping the original file name so an external viewer can open them. The
    /// folder is deleted again when the reference is revoked.
    pub fn export(&self, handle: &str, root: &Path) -> Result<PathBuf> {
        let resolved = self.resolve(handle)?;
        let key = handle.strip_prefix(HANDLE_PREFIX).unwrap_or(handle);
        let dir = root.join(key);
        let dir_text = dir
            .to_str()
            .ok_or_else(|| anyhow!("Viewing directory {} is not valid UTF-8", dir.display()))?;

        fs::create_dir_all(&dir).context("failed to create viewing directory")?;
        self.conn
            .execute(
                "INSERT OR IGNORE INTO exports (handle, dir) VALUES (?1, ?2)",
                params![handle, dir_text],
            )
            .context("failed to record exported content")?;

        let file_name = Path::new(&resolved.file_name)
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "content".into());
        let path = dir.join(file_name);
        fs::write(&path, &resolved.bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;

        debug!(%handle, path = %path.display(), "exported content");
        Ok(path)
    }

    fn remove_exports(&self, handle: &str) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare("SELECT dir FROM exports WHERE handle = ?1")
            .context("failed to prepare export lookup")?;
        let dirs = stmt
            .query_map(params![handle], |row| row.get::<_, String>(0))
            .context("failed to look up exported content")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to read exported content rows")?;

        self.conn
            .execute("DELETE FROM exports WHERE handle = ?1", params![handle])
            .context("failed to forget exported content")?;

        for dir in dirs {
            match fs::remove_dir_all(&dir) {
                Ok(()) => debug!(%handle, %dir, "removed exported content"),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(err).with_context(|| format!("failed to remove {dir}"));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_reference_resolves_to_its_bytes() {
        let registry = ContentRegistry::open_in_memory().unwrap();
        let reference = registry
            .create("boarding.pdf", "application/pdf", b"%PDF-1.7")
            .unwrap();

        assert!(reference.handle().starts_with(HANDLE_PREFIX));
        let resolved = registry.resolve(reference.handle()).unwrap();
        assert_eq!(resolved.file_name, "boarding.pdf");
        assert_eq!(resolved.mime_type, "application/pdf");
        assert_eq!(resolved.bytes, b"%PDF-1.7");

        let metadata = registry.metadata(reference.handle()).unwrap().unwrap();
        assert_eq!(metadata.size, 8);

        registry.revoke(reference).unwrap();
    }

    #[test]
    fn revoked_reference_no_longer_resolves() {
        let registry = ContentRegistry::open_in_memory().unwrap();
        let reference = registry.create("a.png", "image/png", &[1, 2, 3]).unwrap();
        let handle = reference.handle().to_string();
        assert_eq!(registry.live_count().unwrap(), 1);

        registry.revoke(reference).unwrap();

        assert_eq!(registry.live_count().unwrap(), 0);
        assert!(registry.resolve(&handle).is_err());
        assert!(registry.metadata(&handle).unwrap().is_none());
    }

    #[test]
    fn each_reference_gets_its_own_handle() {
        let registry = ContentRegistry::open_in_memory().unwrap();
        let first = registry.create("a.png", "image/png", &[1]).unwrap();
        let second = registry.create("a.png", "image/png", &[1]).unwrap();
        assert_ne!(first.handle(), second.handle());
        registry.revoke(first).unwrap();
        registry.revoke(second).unwrap();
    }

    #[test]
    fn export_keeps_original_file_name() {
        let registry = ContentRegistry::open_in_memory().unwrap();
        let reference = registry.create("notes.docx", "", b"docx").unwrap();
        let dir = tempfile::tempdir().unwrap();

        let path = registry.export(reference.handle(), dir.path()).unwrap();

        assert!(path.starts_with(dir.path()));
        assert_eq!(path.file_name().unwrap(), "notes.docx");
        assert_eq!(fs::read(&path).unwrap(), b"docx");
        registry.revoke(reference).unwrap();
    }

    #[test]
    fn revoke_deletes_exported_copies() {
        let registry = ContentRegistry::open_in_memory().unwrap();
        let reference = registry
            .create("boarding.pdf", "application/pdf", b"%PDF-1.7")
            .unwrap();
        let dir = tempfile::tempdir().unwrap();

        let path = registry.export(reference.handle(), dir.path()).unwrap();
        let again = registry.export(reference.handle(), dir.path()).unwrap();
        assert_eq!(path, again);
        assert!(path.exists());

        registry.revoke(reference).unwrap();

        assert!(!path.exists());
        assert!(!path.parent().unwrap().exists());
        assert!(dir.path().exists());
    }

    #[test]
    fn same_named_files_export_to_separate_paths() {
        let registry = ContentRegistry::open_in_memory().unwrap();
        let first = registry.create("scan.pdf", "application/pdf", b"first").unwrap();
        let second = registry.create("scan.pdf", "application/pdf", b"second").unwrap();
        let dir = tempfile::tempdir().unwrap();

        let first_path = registry.export(first.handle(), dir.path()).unwrap();
        let second_path = registry.export(second.handle(), dir.path()).unwrap();

        assert_ne!(first_path, second_path);
        assert_eq!(fs::read(&first_path).unwrap(), b"first");
        assert_eq!(fs::read(&second_path).unwrap(), b"second");

        registry.revoke(first).unwrap();
        assert!(!first_path.exists());
        assert_eq!(fs::read(&second_path).unwrap(), b"second");
        registry.revoke(second).unwrap();
    }
}
