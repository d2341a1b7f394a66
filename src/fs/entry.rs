use std::fs::Metadata;
use std::path::{Path, PathBuf};

/// Kind of a listed entry.
///
/// `File` doubles as the fallback classification when metadata cannot be
/// read, so callers must tolerate misclassification under read failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    Directory,
    File,
}

/// Icon bucket for an entry. Selects a display glyph only; carries no
/// other semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconCategory {
    Folder,
    Text,
    Image,
    Generic,
}

/// Name shown when the final path component cannot be resolved.
pub const NAME_FALLBACK: &str = "???";

/// Extended attribute marking an entry as excluded from system backups.
#[cfg(unix)]
const BACKUP_EXCLUDE_XATTR: &str = "user.backup_exclude";

/// Lazy view over a single filesystem entry.
///
/// Holds only the path; every accessor reads the live filesystem at call
/// time, so two reads of the same property may legitimately differ if the
/// entry changed in between. Metadata failures are absorbed per property
/// into the documented fallback values and logged at debug level - a
/// failing `size_bytes` never prevents `name` from resolving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDescriptor {
    path: PathBuf,
}

impl EntryDescriptor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn metadata(&self) -> Option<Metadata> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Some(meta),
            Err(e) => {
                tracing::debug!("metadata lookup failed for {:?}: {}", self.path, e);
                None
            }
        }
    }

    /// Display name: the final path component, `"???"` when the path does
    /// not have one.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| NAME_FALLBACK.to_string())
    }

    /// File length in bytes; `0` for directories and unreadable entries.
    pub fn size_bytes(&self) -> u64 {
        match self.metadata() {
            Some(meta) if meta.is_file() => meta.len(),
            _ => 0,
        }
    }

    /// Human-readable size, or `None` when metadata cannot be resolved at
    /// all (distinct from a resolved size of zero).
    pub fn size_string(&self) -> Option<String> {
        let meta = self.metadata()?;
        let size = if meta.is_file() { meta.len() } else { 0 };
        Some(format_size(size))
    }

    pub fn entry_type(&self) -> EntryType {
        match self.metadata() {
            Some(meta) if meta.is_dir() => EntryType::Directory,
            _ => EntryType::File,
        }
    }

    /// Whether the entry carries the backup-exclusion mark. `false` when
    /// the attribute is absent, unreadable, or unsupported on the platform.
    #[cfg(unix)]
    pub fn is_excluded_from_backup(&self) -> bool {
        match xattr::get(&self.path, BACKUP_EXCLUDE_XATTR) {
            Ok(Some(value)) => !value.is_empty() && value != b"0",
            Ok(None) => false,
            Err(e) => {
                tracing::debug!("xattr lookup failed for {:?}: {}", self.path, e);
                false
            }
        }
    }

    #[cfg(not(unix))]
    pub fn is_excluded_from_backup(&self) -> bool {
        false
    }

    /// Icon bucket: directories map to `Folder`, files by extension.
    pub fn category(&self) -> IconCategory {
        match self.entry_type() {
            EntryType::Directory => IconCategory::Folder,
            EntryType::File => {
                let ext = self
                    .path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.to_lowercase());
                match ext.as_deref() {
                    Some("txt") => IconCategory::Text,
                    Some("png") | Some("jpg") => IconCategory::Image,
                    _ => IconCategory::Generic,
                }
            }
        }
    }

    /// Whether the entry currently exists on disk. Checked by front-ends
    /// before navigating into a listed directory that may have vanished.
    pub fn is_reachable(&self) -> bool {
        self.path.exists()
    }
}

/// Format a byte count for display using adaptive 1024-based units.
pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} B", size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1024 * 1024), "1.00 MB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1.00 GB");
    }

    #[test]
    fn test_category_by_extension() {
        let temp_dir = tempfile::tempdir().unwrap();
        for (file_name, expected) in [
            ("notes.txt", IconCategory::Text),
            ("photo.png", IconCategory::Image),
            ("photo.JPG", IconCategory::Image),
            ("archive.tar", IconCategory::Generic),
            ("no_extension", IconCategory::Generic),
        ] {
            let path = temp_dir.path().join(file_name);
            std::fs::write(&path, b"x").unwrap();
            assert_eq!(EntryDescriptor::new(path).category(), expected);
        }

        let dir_path = temp_dir.path().join("sub.txt");
        std::fs::create_dir(&dir_path).unwrap();
        assert_eq!(
            EntryDescriptor::new(dir_path).category(),
            IconCategory::Folder,
            "directories are folders regardless of extension"
        );
    }

    #[test]
    fn test_missing_entry_fallbacks() {
        let descriptor = EntryDescriptor::new("/nonexistent/path/file.bin");
        assert_eq!(descriptor.name(), "file.bin");
        assert_eq!(descriptor.size_bytes(), 0);
        assert_eq!(descriptor.size_string(), None);
        assert_eq!(descriptor.entry_type(), EntryType::File);
        assert!(!descriptor.is_excluded_from_backup());
        assert!(!descriptor.is_reachable());
    }

    #[test]
    fn test_name_fallback_for_rootless_path() {
        let descriptor = EntryDescriptor::new("/");
        assert_eq!(descriptor.name(), NAME_FALLBACK);
    }

    #[test]
    fn test_directory_size_resolves_to_zero() {
        let temp_dir = tempfile::tempdir().unwrap();
        let descriptor = EntryDescriptor::new(temp_dir.path());
        assert_eq!(descriptor.entry_type(), EntryType::Directory);
        assert_eq!(descriptor.size_bytes(), 0);
        // Resolvable but zero: Some, not None
        assert_eq!(descriptor.size_string(), Some("0 B".to_string()));
    }

    #[test]
    fn test_descriptor_is_a_view_not_a_snapshot() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("growing.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"abc").unwrap();
        file.sync_all().unwrap();

        let descriptor = EntryDescriptor::new(&path);
        assert_eq!(descriptor.size_bytes(), 3);

        file.write_all(b"defgh").unwrap();
        file.sync_all().unwrap();
        assert_eq!(descriptor.size_bytes(), 8);
    }

    #[cfg(unix)]
    #[test]
    fn test_backup_exclusion_xattr() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("data.bin");
        std::fs::write(&path, b"payload").unwrap();

        let descriptor = EntryDescriptor::new(&path);
        assert!(!descriptor.is_excluded_from_backup());

        // Some filesystems (e.g. tmpfs on older kernels) reject user xattrs;
        // only assert the positive case when the attribute can be set.
        if xattr::set(&path, super::BACKUP_EXCLUDE_XATTR, b"1").is_ok() {
            assert!(descriptor.is_excluded_from_backup());
        }
    }
}
