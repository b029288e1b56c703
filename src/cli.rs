use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use crate::service::ReadingService;
use crate::store::{DEFAULT_QUOTA_BYTES, LocalFsStore};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub storage: StorageArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct StorageArgs {
    /// Directory holding the durable store (`store.json`).
    #[arg(long, global = true, env = "READMARK_DATA_DIR", default_value = ".readmark")]
    pub data_dir: PathBuf,

    /// Maximum total size of stored keys and values, in bytes.
    #[arg(long, global = true, env = "READMARK_QUOTA_BYTES", default_value_t = DEFAULT_QUOTA_BYTES)]
    pub quota_bytes: usize,

    /// Versioned prefix for storage keys (rendered as `<prefix>:<key>`).
    #[arg(long, global = true, env = "READMARK_KEY_PREFIX")]
    pub key_prefix: Option<String>,
}

impl StorageArgs {
    pub fn open_service(&self) -> anyhow::Result<ReadingService<LocalFsStore>> {
        let store = LocalFsStore::open(&self.data_dir, Some(self.quota_bytes))
            .with_context(|| format!("open store: {}", self.data_dir.display()))?;
        Ok(ReadingService::with_key_prefix(store, self.key_prefix.clone()))
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a book's per-chapter and overall progress.
    Show(ShowArgs),
    Nav {
        #[command(subcommand)]
        command: NavCommand,
    },
    Bookmark {
        #[command(subcommand)]
        command: BookmarkCommand,
    },
    Favorite {
        #[command(subcommand)]
        command: FavoriteCommand,
    },
    Purchase {
        #[command(subcommand)]
        command: PurchaseCommand,
    },
    Stats {
        #[command(subcommand)]
        command: StatsCommand,
    },
    /// Remove stored reading data.
    Clear(ClearArgs),
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Book file (`.json`, `.yaml` or `.yml`).
    #[arg(long)]
    pub book: PathBuf,
}

#[derive(Debug, Args)]
pub struct PositionArgs {
    /// Book file (`.json`, `.yaml` or `.yml`).
    #[arg(long)]
    pub book: PathBuf,

    /// Zero-based chapter index of the current position.
    #[arg(long, default_value_t = 0)]
    pub chapter: usize,

    /// Zero-based page index of the current position.
    #[arg(long, default_value_t = 0)]
    pub page: usize,
}

#[derive(Debug, Subcommand)]
pub enum NavCommand {
    /// Move one page forward from the given position.
    Next(PositionArgs),
    /// Move one page back from the given position.
    Prev(PositionArgs),
    /// Go to the first page of a chapter.
    Chapter(ChapterArgs),
}

#[derive(Debug, Args)]
pub struct ChapterArgs {
    /// Book file (`.json`, `.yaml` or `.yml`).
    #[arg(long)]
    pub book: PathBuf,

    /// Zero-based chapter index to open.
    #[arg(long)]
    pub index: usize,
}

#[derive(Debug, Subcommand)]
pub enum BookmarkCommand {
    /// Add or remove a bookmark at the given position.
    Toggle(PositionArgs),
    List(BookIdArgs),
}

#[derive(Debug, Args)]
pub struct BookIdArgs {
    #[arg(long)]
    pub book_id: String,
}

#[derive(Debug, Subcommand)]
pub enum FavoriteCommand {
    Toggle(BookIdArgs),
    List,
}

#[derive(Debug, Subcommand)]
pub enum PurchaseCommand {
    Add(BookIdArgs),
    List,
}

#[derive(Debug, Subcommand)]
pub enum StatsCommand {
    /// Add a reading session to the running totals.
    Record(StatsRecordArgs),
    Show(BookIdArgs),
}

#[derive(Debug, Args)]
pub struct StatsRecordArgs {
    #[arg(long)]
    pub book_id: String,

    #[arg(long, default_value_t = 0)]
    pub words: u64,

    #[arg(long, default_value_t = 0)]
    pub pages: u64,

    /// Session length in seconds.
    #[arg(long, default_value_t = 0.0)]
    pub seconds: f64,
}

#[derive(Debug, Args)]
pub struct ClearArgs {
    /// Clear progress, bookmarks and stats of one book.
    #[arg(long, conflicts_with = "all")]
    pub book_id: Option<String>,

    /// Wipe the whole store, favorites and purchases included.
    #[arg(long)]
    pub all: bool,
}
