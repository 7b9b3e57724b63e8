use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqueezeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing API key: set API_KEY in .env/.env.local or pass --api-key")]
    MissingApiKey,

    #[error("Missing root directory: set ROOT_DIRECTORY in .env/.env.local or pass --root")]
    MissingRootDirectory,

    #[error("Root directory does not exist or is not a directory: {0}")]
    InvalidRootDirectory(PathBuf),

    #[error("Invalid request timeout: {0}s. Must be at least 1 second")]
    InvalidTimeout(u64),

    #[error("API key was rejected by the compression service: {0}")]
    CredentialRejected(String),

    #[error("Directory unreadable: {path}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Compression service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

pub type Result<T> = std::result::Result<T, SqueezeError>;

/// Broad classes of failure reported by the compression service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceErrorCategory {
    /// Invalid key or monthly limit exceeded.
    Account,
    /// The request or the submitted image was rejected.
    Client,
    /// Temporary issue on the service side.
    Server,
    /// Network failure or timeout.
    Connection,
    Other,
}

impl fmt::Display for ServiceErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceErrorCategory::Account => "account",
            ServiceErrorCategory::Client => "client",
            ServiceErrorCategory::Server => "server",
            ServiceErrorCategory::Connection => "connection",
            ServiceErrorCategory::Other => "other",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{category} error: {message}")]
pub struct ServiceError {
    pub category: ServiceErrorCategory,
    pub message: String,
}

impl ServiceError {
    pub fn new(category: ServiceErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}
