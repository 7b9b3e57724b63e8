pub mod logger;

pub mod accounting;
pub mod cli;
pub mod compressor;
pub mod config;
pub mod constants;
pub mod error;
pub mod formats;
pub mod report;
pub mod run;
pub mod service;
pub mod tinify;
pub mod utils;
pub mod walker;

pub use accounting::{free_quota_remaining, RunState, RunSummary};
pub use compressor::{CompressionOutcome, Compressor};
pub use config::{load_env_files, Config};
pub use error::{Result, ServiceError, ServiceErrorCategory, SqueezeError};
pub use formats::{detect_image_kind, Detected, ImageKind};
pub use report::{Importance, MemoryReporter, ReportEvent, Reporter, Terminal};
pub use run::{RunPhase, Runner};
pub use service::CompressionService;
pub use tinify::{TinifyClient, TinifyOptions};
pub use utils::format_elapsed;
pub use walker::{classify, list_directory, DirectoryEntry, EntryKind, IgnoreReason, TreeWalker};
