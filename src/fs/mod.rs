// Filesystem core: lazy entry descriptors and directory listing/mutation
// operations. Metadata failures on individual descriptor properties are
// absorbed into fallback values; everything else surfaces as an `FsError`.

pub mod entry;
pub mod lister;

pub use entry::{format_size, EntryDescriptor, EntryType, IconCategory};
pub use lister::{DirectoryLister, DirectoryListing};

use std::io;
use std::path::PathBuf;

/// Errors produced by listing and mutation operations.
#[derive(Debug)]
pub enum FsError {
    /// The path does not exist, is not a directory, or could not be read.
    /// Distinct from an empty directory, which lists successfully.
    DirectoryUnreadable { path: PathBuf, source: io::Error },
    /// The entry name is empty or contains a path separator. Raised before
    /// any filesystem call is attempted.
    InvalidName(String),
    DirectoryCreateFailed { path: PathBuf, source: io::Error },
    FileWriteFailed { path: PathBuf, source: io::Error },
    RemoteFetchFailed(String),
}

impl std::fmt::Display for FsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FsError::DirectoryUnreadable { path, source } => {
                write!(f, "cannot read directory {}: {}", path.display(), source)
            }
            FsError::InvalidName(name) => write!(f, "invalid entry name {:?}", name),
            FsError::DirectoryCreateFailed { path, source } => {
                write!(f, "cannot create directory {}: {}", path.display(), source)
            }
            FsError::FileWriteFailed { path, source } => {
                write!(f, "cannot write file {}: {}", path.display(), source)
            }
            FsError::RemoteFetchFailed(msg) => write!(f, "remote fetch failed: {}", msg),
        }
    }
}

impl std::error::Error for FsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FsError::DirectoryUnreadable { source, .. }
            | FsError::DirectoryCreateFailed { source, .. }
            | FsError::FileWriteFailed { source, .. } => Some(source),
            FsError::InvalidName(_) | FsError::RemoteFetchFailed(_) => None,
        }
    }
}
