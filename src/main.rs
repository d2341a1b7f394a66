use anyhow::{bail, Context, Result as AnyhowResult};
use clap::{Parser, Subcommand};
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use fsbrowse::config::Config;
use fsbrowse::fs::{DirectoryLister, DirectoryListing, EntryType, IconCategory};
use fsbrowse::services::remote::{fetch_remote_and_store, FetchOutcome};

/// A small hierarchical filesystem browser
#[derive(Parser, Debug)]
#[command(name = "fsbrowse")]
#[command(about = "Browse directories and create files from the command line", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the contents of a directory
    Ls {
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,
    },
    /// Create a subdirectory, then show the refreshed listing
    Mkdir {
        dir: PathBuf,
        name: String,
    },
    /// Create a text file holding the current time
    NewText {
        dir: PathBuf,
        #[arg(default_value = "current-time.txt")]
        name: String,
    },
    /// Write stdin (or --text) to a file atomically
    Write {
        dir: PathBuf,
        name: String,
        #[arg(long)]
        text: Option<String>,
    },
    /// Download a remote file into a directory
    Fetch {
        uri: String,
        dir: PathBuf,
        name: String,
    },
    /// Download a random sample image into a directory
    FetchImage {
        dir: PathBuf,
    },
}

fn main() -> AnyhowResult<()> {
    init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };

    let lister = DirectoryLister::new();
    let timeout = Duration::from_secs(config.fetch.timeout_secs);

    match args.command {
        Command::Ls { dir } => {
            print_listing(&lister.list(&dir)?);
        }
        Command::Mkdir { dir, name } => {
            lister.create_subdirectory(&dir, &name)?;
            print_listing(&lister.list(&dir)?);
        }
        Command::NewText { dir, name } => {
            let now = chrono::Local::now().to_string();
            lister.create_text_file(&dir, &name, &now)?;
            print_listing(&lister.list(&dir)?);
        }
        Command::Write { dir, name, text } => {
            let contents = match text {
                Some(text) => text.into_bytes(),
                None => {
                    let mut buf = Vec::new();
                    std::io::stdin()
                        .read_to_end(&mut buf)
                        .context("reading file contents from stdin")?;
                    buf
                }
            };
            lister.create_file(&dir, &name, &contents)?;
            print_listing(&lister.list(&dir)?);
        }
        Command::Fetch { uri, dir, name } => {
            fetch_and_report(&uri, &dir, &name, timeout)?;
            print_listing(&lister.list(&dir)?);
        }
        Command::FetchImage { dir } => {
            let index = random_index(config.sample_images.max_index);
            let uri = format!("{}/{}.jpg", config.sample_images.base_url, index);
            let name = format!("{}.jpg", index);
            fetch_and_report(&uri, &dir, &name, timeout)?;
            print_listing(&lister.list(&dir)?);
        }
    }

    Ok(())
}

fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    let _ = subscriber.try_init();
}

/// Run a remote fetch and block until its completion message arrives.
/// The completion channel is drained here, on the same context that
/// re-lists the directory afterwards.
fn fetch_and_report(uri: &str, dir: &Path, name: &str, timeout: Duration) -> AnyhowResult<()> {
    let (tx, rx) = mpsc::channel();
    let handle = fetch_remote_and_store(uri, dir, name, timeout, tx);
    let outcome = rx.recv().context("fetch thread exited without a result")?;
    handle.join();

    match outcome {
        FetchOutcome::Stored { path } => {
            println!("stored {}", path.display());
            Ok(())
        }
        FetchOutcome::Failed(e) => Err(e.into()),
        FetchOutcome::Cancelled => bail!("fetch was cancelled"),
    }
}

fn print_listing(listing: &DirectoryListing) {
    if listing.is_empty() {
        println!("(empty directory)");
        return;
    }

    for entry in listing {
        let icon = icon_glyph(entry.category());
        let backup_marker = if entry.is_excluded_from_backup() {
            "  [no backup]"
        } else {
            ""
        };
        match entry.entry_type() {
            EntryType::Directory => {
                println!("{} [{}]{}", icon, entry.name(), backup_marker);
            }
            EntryType::File => {
                let size = entry.size_string().unwrap_or_default();
                println!("{} {}  {}{}", icon, entry.name(), size, backup_marker);
            }
        }
    }
}

fn icon_glyph(category: IconCategory) -> &'static str {
    match category {
        IconCategory::Folder => "📁",
        IconCategory::Text => "📝",
        IconCategory::Image => "🖼️ ",
        IconCategory::Generic => "📄",
    }
}

/// Pick a sample image index in `1..=max` using std's RandomState.
fn random_index(max: u32) -> u32 {
    let state = RandomState::new();
    let mut hasher = state.build_hasher();
    hasher.write_u128(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0),
    );
    (hasher.finish() % u64::from(max)) as u32 + 1
}
