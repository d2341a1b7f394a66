use std::fs;
use std::io::Write;
use std::path::Path;

use super::entry::{EntryDescriptor, EntryType};
use super::FsError;

/// Ordered sequence of one directory's immediate children. Rebuilt
/// wholesale on every `list` call; never patched incrementally.
pub type DirectoryListing = Vec<EntryDescriptor>;

/// Stateless listing and mutation operations over the live filesystem.
///
/// The filesystem is the source of truth on every query: after a mutation
/// the caller re-invokes `list` to observe the new state. No in-process
/// lock is held across calls; concurrent operations against the same path
/// rely on the filesystem's own atomicity guarantees.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryLister;

impl DirectoryLister {
    pub fn new() -> Self {
        Self
    }

    /// List the immediate (non-recursive) children of `dir`.
    ///
    /// Hidden entries (leading `.`) are excluded. The result is totally
    /// ordered: directories before files, then case-insensitive name
    /// ascending, ties broken by the raw path string. An unreadable
    /// directory is an explicit error, never an empty listing.
    pub fn list(&self, dir: &Path) -> Result<DirectoryListing, FsError> {
        let read_dir = fs::read_dir(dir).map_err(|source| FsError::DirectoryUnreadable {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut entries: DirectoryListing = Vec::new();
        for item in read_dir {
            let item = match item {
                Ok(item) => item,
                Err(e) => {
                    // A single unreadable child must not fail the listing
                    tracing::debug!("skipping unreadable entry under {:?}: {}", dir, e);
                    continue;
                }
            };
            if item.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            entries.push(EntryDescriptor::new(item.path()));
        }

        // Cached keys: each descriptor hits the filesystem once for its
        // type and once for its name during the sort, not O(n log n) times.
        entries.sort_by_cached_key(|entry| {
            let rank = match entry.entry_type() {
                EntryType::Directory => 0u8,
                EntryType::File => 1u8,
            };
            (rank, entry.name().to_lowercase(), entry.path().to_path_buf())
        });

        Ok(entries)
    }

    /// Create `parent/name`, creating intermediate components as needed.
    pub fn create_subdirectory(&self, parent: &Path, name: &str) -> Result<(), FsError> {
        validate_name(name)?;
        let path = parent.join(name);
        fs::create_dir_all(&path)
            .map_err(|source| FsError::DirectoryCreateFailed { path, source })
    }

    /// Atomically write `contents` to `parent/name`, silently replacing any
    /// existing file.
    ///
    /// The bytes land in a temp file in the same directory and are renamed
    /// into place, so a concurrent `list` observes the file either fully
    /// absent or fully present. The temp name carries a leading dot, which
    /// also keeps an in-flight write out of listings.
    pub fn create_file(&self, parent: &Path, name: &str, contents: &[u8]) -> Result<(), FsError> {
        validate_name(name)?;
        let path = parent.join(name);
        write_atomic(&path, contents).map_err(|source| FsError::FileWriteFailed { path, source })
    }

    /// UTF-8 text convenience over `create_file`; same failure semantics.
    pub fn create_text_file(&self, parent: &Path, name: &str, text: &str) -> Result<(), FsError> {
        self.create_file(parent, name, text.as_bytes())
    }
}

fn validate_name(name: &str) -> Result<(), FsError> {
    if name.is_empty() || name.chars().any(std::path::is_separator) {
        return Err(FsError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
