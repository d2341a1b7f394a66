//! Remote fetch-and-store.
//!
//! Downloads a file over HTTP(S) on a background thread and stores it into
//! a directory through the same atomic write path as local file creation.
//! Completion is reported on a caller-supplied channel, so the caller
//! drains results from whatever context it uses to refresh its listing;
//! concurrent fetches complete independently, each with its own message.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::fs::{DirectoryLister, FsError};

/// Result of a single fetch request. Exactly one outcome is delivered per
/// call to `fetch_remote_and_store`.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The full body was written to `path`.
    Stored { path: PathBuf },
    Failed(FsError),
    /// The handle was cancelled before the file was written. No partial
    /// file is left behind.
    Cancelled,
}

/// Best-effort cancellation handle for an in-flight fetch.
pub struct FetchHandle {
    cancelled: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl FetchHandle {
    /// Request cancellation. The flag is checked before the request is
    /// issued and again before the write, so a cancelled fetch either
    /// never writes or completes the full atomic write.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Block until the background thread has finished and its outcome has
    /// been sent.
    pub fn join(mut self) {
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

/// Retrieve `uri` with a single GET and store the body as `parent/name`.
///
/// Never blocks the caller: the transfer and the write run on a background
/// thread. Non-success HTTP statuses and transport errors are reported as
/// `FsError::RemoteFetchFailed`; no retries are attempted. On success the
/// caller is expected to re-list the directory.
pub fn fetch_remote_and_store(
    uri: &str,
    parent: &Path,
    name: &str,
    timeout: Duration,
    completions: Sender<FetchOutcome>,
) -> FetchHandle {
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);
    let uri = uri.to_string();
    let parent = parent.to_path_buf();
    let name = name.to_string();

    let thread = thread::spawn(move || {
        let outcome = run_fetch(&uri, &parent, &name, timeout, &flag);
        if completions.send(outcome).is_err() {
            tracing::debug!("fetch completion receiver dropped for {}", uri);
        }
    });

    FetchHandle {
        cancelled,
        thread: Some(thread),
    }
}

fn run_fetch(
    uri: &str,
    parent: &Path,
    name: &str,
    timeout: Duration,
    cancelled: &AtomicBool,
) -> FetchOutcome {
    if cancelled.load(Ordering::Relaxed) {
        return FetchOutcome::Cancelled;
    }

    let response = match ureq::get(uri).timeout(timeout).call() {
        Ok(response) => response,
        Err(e) => {
            return FetchOutcome::Failed(FsError::RemoteFetchFailed(format!(
                "GET {}: {}",
                uri, e
            )))
        }
    };

    let mut body = Vec::new();
    if let Err(e) = response.into_reader().read_to_end(&mut body) {
        return FetchOutcome::Failed(FsError::RemoteFetchFailed(format!(
            "reading body of {}: {}",
            uri, e
        )));
    }
    tracing::debug!("fetched {} bytes from {}", body.len(), uri);

    if cancelled.load(Ordering::Relaxed) {
        return FetchOutcome::Cancelled;
    }

    match DirectoryLister::new().create_file(parent, name, &body) {
        Ok(()) => FetchOutcome::Stored {
            path: parent.join(name),
        },
        Err(e) => FetchOutcome::Failed(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_cancel_before_start_skips_the_request() {
        // An unroutable URI: if cancellation were ignored the call would
        // fail rather than cancel, so the outcome distinguishes the paths.
        let temp_dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel();
        let handle = fetch_remote_and_store(
            "http://127.0.0.1:1/never",
            temp_dir.path(),
            "out.bin",
            Duration::from_secs(1),
            tx,
        );
        handle.cancel();
        let outcome = rx.recv().unwrap();
        handle.join();
        // The thread may have issued the request before observing the
        // flag; either way nothing must have been written.
        assert!(matches!(
            outcome,
            FetchOutcome::Cancelled | FetchOutcome::Failed(_)
        ));
        assert!(!temp_dir.path().join("out.bin").exists());
    }

    #[test]
    fn test_invalid_target_name_fails_without_a_write() {
        let temp_dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel();
        let handle = fetch_remote_and_store(
            "http://127.0.0.1:1/never",
            temp_dir.path(),
            "bad/name",
            Duration::from_millis(200),
            tx,
        );
        let outcome = rx.recv().unwrap();
        handle.join();
        assert!(matches!(outcome, FetchOutcome::Failed(_)));
        assert!(DirectoryLister::new().list(temp_dir.path()).unwrap().is_empty());
    }
}
