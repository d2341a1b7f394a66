// Filesystem browser library - exposes the core modules for the CLI and tests

pub mod config;
pub mod fs;
pub mod services;

pub use fs::{DirectoryLister, DirectoryListing, EntryDescriptor, EntryType, FsError, IconCategory};
