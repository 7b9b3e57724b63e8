use crate::cli::Args;
use crate::constants::{DEFAULT_REQUEST_TIMEOUT_SECS, ENV_FILE, ENV_LOCAL_FILE};
use crate::error::{Result, SqueezeError};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::time::Duration;

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    /// Always ends with a path separator.
    pub root_directory: PathBuf,
    pub timeout: Duration,
}

impl Config {
    pub fn new(
        api_key: Option<String>,
        root_directory: Option<PathBuf>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(SqueezeError::MissingApiKey)?;

        let root_directory = root_directory
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(SqueezeError::MissingRootDirectory)?;
        if !root_directory.is_dir() {
            return Err(SqueezeError::InvalidRootDirectory(root_directory));
        }

        let timeout = timeout.unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
        if timeout.is_zero() {
            return Err(SqueezeError::InvalidTimeout(0));
        }

        Ok(Self {
            api_key,
            root_directory: with_trailing_separator(root_directory),
            timeout,
        })
    }

    pub fn from_args(args: &Args) -> Result<Self> {
        Self::new(
            args.api_key.clone(),
            args.root.clone(),
            args.timeout.map(Duration::from_secs),
        )
    }
}

/// Loads `.env` and then `.env.local` from `dir` into the process
/// environment. Variables already set in the environment win over `.env`;
/// `.env.local` overrides `.env` only.
///
/// Returns the files that were loaded. Missing files are not an error.
pub fn load_env_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut loaded = Vec::new();

    let preset: Vec<String> = std::env::vars().map(|(k, _)| k).collect();

    let env_file = dir.join(ENV_FILE);
    if env_file.is_file() {
        dotenvy::from_path(&env_file).map_err(env_file_error)?;
        loaded.push(env_file);
    }

    let local_file = dir.join(ENV_LOCAL_FILE);
    if local_file.is_file() {
        for item in dotenvy::from_path_iter(&local_file).map_err(env_file_error)? {
            let (key, value) = item.map_err(env_file_error)?;
            if !preset.contains(&key) {
                std::env::set_var(key, value);
            }
        }
        loaded.push(local_file);
    }

    Ok(loaded)
}

fn env_file_error(err: dotenvy::Error) -> SqueezeError {
    match err {
        dotenvy::Error::Io(e) => SqueezeError::Io(e),
        other => SqueezeError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            other.to_string(),
        )),
    }
}

fn with_trailing_separator(path: PathBuf) -> PathBuf {
    if path.as_os_str().to_string_lossy().ends_with(MAIN_SEPARATOR) {
        return path;
    }
    let mut path = path;
    // pushing an empty component appends the separator
    path.push("");
    path
}
