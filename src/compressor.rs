use crate::accounting::RunState;
use crate::error::{ServiceError, ServiceErrorCategory};
use crate::report::{Importance, Reporter};
use crate::service::CompressionService;
use crate::utils::{
    create_progress_spinner, format_duration, format_file_size, format_reduction, reduction_ratio,
};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

/// Result of one compress-and-replace attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CompressionOutcome {
    Success {
        original_size: u64,
        new_size: u64,
        elapsed: Duration,
    },
    Failure {
        category: ServiceErrorCategory,
        message: String,
    },
}

impl CompressionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CompressionOutcome::Success { .. })
    }

    /// Reduction in percent; `None` for failures and empty originals.
    pub fn reduction(&self) -> Option<f64> {
        match self {
            CompressionOutcome::Success {
                original_size,
                new_size,
                ..
            } => reduction_ratio(*original_size, *new_size),
            CompressionOutcome::Failure { .. } => None,
        }
    }

    fn failure(category: ServiceErrorCategory, message: impl Into<String>) -> Self {
        CompressionOutcome::Failure {
            category,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for CompressionOutcome {
    fn from(err: ServiceError) -> Self {
        CompressionOutcome::failure(err.category, err.message)
    }
}

impl fmt::Display for CompressionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionOutcome::Success {
                original_size,
                new_size,
                ..
            } => write!(
                f,
                "{} -> {} ({})",
                format_file_size(*original_size),
                format_file_size(*new_size),
                format_reduction(self.reduction())
            ),
            CompressionOutcome::Failure { category, message } => {
                write!(f, "{} error: {}", category, message)
            }
        }
    }
}

/// Compresses single files in place through a [`CompressionService`].
pub struct Compressor<'a> {
    service: &'a dyn CompressionService,
    reporter: &'a dyn Reporter,
}

impl<'a> Compressor<'a> {
    pub fn new(service: &'a dyn CompressionService, reporter: &'a dyn Reporter) -> Self {
        Self { service, reporter }
    }

    /// Sends `path` to the service and overwrites it with the result.
    ///
    /// Never fails: every problem becomes a [`CompressionOutcome::Failure`],
    /// in which case the file and the success counters are left untouched.
    pub fn compress(&self, path: &Path, state: &mut RunState) -> CompressionOutcome {
        let name = display_name(path);
        self.reporter.blank_line(1);
        self.reporter
            .info(&format!("[RUN] Compressing image: {}", name), Importance::Normal);

        let started = Instant::now();
        let outcome = match self.replace_with_compressed(path) {
            Ok((original_size, new_size)) => CompressionOutcome::Success {
                original_size,
                new_size,
                elapsed: started.elapsed(),
            },
            Err(outcome) => outcome,
        };

        match &outcome {
            CompressionOutcome::Success {
                original_size,
                new_size,
                elapsed,
            } => {
                state.record_compression(*original_size, *new_size);
                self.report_success(&outcome, *elapsed, state);
            }
            CompressionOutcome::Failure { message, .. } => {
                state.record_failure();
                self.reporter.error(&format!(
                    "Failed to compress image: {}\n{}",
                    path.display(),
                    message
                ));
            }
        }

        outcome
    }

    fn replace_with_compressed(
        &self,
        path: &Path,
    ) -> std::result::Result<(u64, u64), CompressionOutcome> {
        let original = fs::read(path).map_err(|e| {
            CompressionOutcome::failure(
                ServiceErrorCategory::Other,
                format!("Failed to read image: {}", e),
            )
        })?;

        let spinner = create_progress_spinner(&format!("Waiting for {}", display_name(path)));
        let result = self.service.compress_file(&original);
        spinner.finish_and_clear();
        let compressed = result?;

        replace_file(path, &compressed).map_err(|e| {
            CompressionOutcome::failure(
                ServiceErrorCategory::Other,
                format!("Failed to write compressed image: {}", e),
            )
        })?;

        Ok((original.len() as u64, compressed.len() as u64))
    }

    fn report_success(&self, outcome: &CompressionOutcome, elapsed: Duration, state: &RunState) {
        self.reporter
            .info(&format!("=== Elapsed time: {}", format_duration(elapsed)), Importance::Normal);
        self.reporter.info(
            &format!("=== Reduction: {}", format_reduction(outcome.reduction())),
            Importance::Normal,
        );
        self.reporter.info(&format!("=== Size: {}", outcome), Importance::Low);
        self.reporter.info(
            &format!("=== Images compressed: {}", state.images_compressed()),
            Importance::Normal,
        );
        self.reporter.info(
            &format!(
                "=== Free compressions remaining: {}",
                state.free_quota_remaining()
            ),
            Importance::Normal,
        );
    }
}

/// Writes `bytes` next to `path` and renames the result over it, so a failed
/// write never leaves a truncated image behind.
fn replace_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    replace_file_with(path, |file| file.write_all(bytes))
}

/// Runs `write` against a temporary sibling of `path` and only renames it
/// into place once `write` succeeded. Keeps the original permissions.
fn replace_file_with<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut fs::File) -> io::Result<()>,
{
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path)?.permissions();

    let mut temp = NamedTempFile::new_in(parent)?;
    write(temp.as_file_mut())?;
    temp.as_file().sync_all()?;
    fs::set_permissions(temp.path(), permissions)?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemoryReporter;
    use std::cell::Cell;
    use tempfile::TempDir;

    /// Halves the payload, or fails with a fixed error.
    struct HalvingService {
        fail_with: Option<ServiceError>,
        calls: Cell<usize>,
    }

    impl HalvingService {
        fn ok() -> Self {
            Self {
                fail_with: None,
                calls: Cell::new(0),
            }
        }

        fn failing(category: ServiceErrorCategory) -> Self {
            Self {
                fail_with: Some(ServiceError::new(category, "Service unavailable")),
                calls: Cell::new(0),
            }
        }
    }

    impl CompressionService for HalvingService {
        fn validate_credential(&self) -> Result<(), ServiceError> {
            Ok(())
        }

        fn current_usage_count(&self) -> Result<u64, ServiceError> {
            Ok(0)
        }

        fn compress_file(&self, bytes: &[u8]) -> Result<Vec<u8>, ServiceError> {
            self.calls.set(self.calls.get() + 1);
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(bytes[..bytes.len() / 2].to_vec()),
            }
        }
    }

    #[test]
    fn test_success_overwrites_file_and_counts() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.png");
        fs::write(&path, vec![7u8; 1000]).unwrap();

        let service = HalvingService::ok();
        let reporter = MemoryReporter::new();
        let mut state = RunState::new(10);

        let outcome = Compressor::new(&service, &reporter).compress(&path, &mut state);

        assert!(outcome.is_success());
        assert_eq!(outcome.reduction(), Some(50.0));
        assert_eq!(fs::metadata(&path).unwrap().len(), 500);
        assert_eq!(state.images_compressed(), 1);
        assert_eq!(state.free_quota_remaining(), 489);
        assert!(reporter.contains("Reduction: 50.00%"));
        assert!(reporter.contains("Free compressions remaining: 489"));
    }

    #[test]
    fn test_failure_leaves_file_and_counter_alone() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.png");
        fs::write(&path, b"original bytes").unwrap();

        let service = HalvingService::failing(ServiceErrorCategory::Server);
        let reporter = MemoryReporter::new();
        let mut state = RunState::new(0);

        let outcome = Compressor::new(&service, &reporter).compress(&path, &mut state);

        assert_eq!(
            outcome,
            CompressionOutcome::Failure {
                category: ServiceErrorCategory::Server,
                message: "Service unavailable".to_string(),
            }
        );
        assert_eq!(fs::read(&path).unwrap(), b"original bytes");
        assert_eq!(state.images_compressed(), 0);
        assert_eq!(state.images_failed(), 1);

        let errors = reporter.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("broken.png"));
        assert!(errors[0].contains("Service unavailable"));
    }

    #[test]
    fn test_missing_file_is_a_failure_not_a_panic() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gone.jpg");

        let service = HalvingService::ok();
        let reporter = MemoryReporter::new();
        let mut state = RunState::new(0);

        let outcome = Compressor::new(&service, &reporter).compress(&path, &mut state);

        assert!(!outcome.is_success());
        assert_eq!(service.calls.get(), 0);
        assert_eq!(state.images_compressed(), 0);
    }

    #[test]
    fn test_empty_original_reports_na() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.png");
        fs::write(&path, b"").unwrap();

        let service = HalvingService::ok();
        let reporter = MemoryReporter::new();
        let mut state = RunState::new(0);

        let outcome = Compressor::new(&service, &reporter).compress(&path, &mut state);

        assert!(outcome.is_success());
        assert_eq!(outcome.reduction(), None);
        assert!(reporter.contains("Reduction: N/A"));
    }

    #[test]
    fn test_interrupted_write_keeps_original() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.png");
        let original = vec![9u8; 3008];
        fs::write(&path, &original).unwrap();

        let result = replace_file_with(&path, |file| {
            file.write_all(&[1u8; 4096])?;
            Err(io::Error::new(io::ErrorKind::Other, "File too large"))
        });

        assert!(result.is_err());
        assert_eq!(fs::read(&path).unwrap(), original);
        let leftovers: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_replace_file_leaves_no_temporaries() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.png");
        fs::write(&path, vec![9u8; 100]).unwrap();

        replace_file(&path, b"smaller").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"smaller");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_file_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("shared.jpg");
        fs::write(&path, vec![9u8; 100]).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        replace_file(&path, b"smaller").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_unwritable_directory_is_a_failure_with_original_intact() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let locked = temp_dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        let path = locked.join("a.png");
        fs::write(&path, vec![7u8; 1000]).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // privileged users can write anyway
        if NamedTempFile::new_in(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let service = HalvingService::ok();
        let reporter = MemoryReporter::new();
        let mut state = RunState::new(0);
        let outcome = Compressor::new(&service, &reporter).compress(&path, &mut state);

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(
            outcome,
            CompressionOutcome::Failure {
                category: ServiceErrorCategory::Other,
                ..
            }
        ));
        assert_eq!(fs::read(&path).unwrap(), vec![7u8; 1000]);
        assert_eq!(state.images_compressed(), 0);
        assert_eq!(state.images_failed(), 1);
    }

    #[test]
    fn test_outcome_display() {
        let outcome = CompressionOutcome::Success {
            original_size: 2048,
            new_size: 1024,
            elapsed: Duration::from_secs(1),
        };
        assert_eq!(outcome.to_string(), "2.0 KB -> 1.0 KB (50.00%)");

        let failure: CompressionOutcome =
            ServiceError::new(ServiceErrorCategory::Connection, "timed out").into();
        assert_eq!(failure.to_string(), "connection error: timed out");
    }
}
