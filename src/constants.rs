/// Monthly number of free compressions granted by the TinyPNG service.
pub const FREE_TIER_LIMIT: i64 = 500;

pub const TINIFY_API_ENDPOINT: &str = "https://api.tinify.com";
pub const TINIFY_SHRINK_PATH: &str = "/shrink";
pub const TINIFY_AUTH_USER: &str = "api";
pub const COMPRESSION_COUNT_HEADER: &str = "compression-count";
pub const USER_AGENT: &str = concat!("tree-squeeze/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Directories nested deeper than this below the root are skipped.
pub const MAX_DEPTH: usize = 256;

pub const ENV_FILE: &str = ".env";
pub const ENV_LOCAL_FILE: &str = ".env.local";

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";

// Common output message prefixes
pub const INFO_PREFIX: &str = "📋";
pub const HIGHLIGHT_PREFIX: &str = "📊";
pub const SUCCESS_PREFIX: &str = "✅";
pub const WARNING_PREFIX: &str = "⚠️ ";
pub const ERROR_PREFIX: &str = "❌";
pub const VERBOSE_PREFIX: &str = "🔍";
