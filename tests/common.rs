#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;
use tree_squeeze::{CompressionService, ServiceError, ServiceErrorCategory};

pub const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
pub const JPEG_HEADER: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

/// Files whose payload contains this marker make the mock fail.
pub const FAIL_MARKER: &[u8] = b"broken";
/// Files whose payload contains this marker come back larger.
pub const GROW_MARKER: &[u8] = b"grow";

/// In-memory stand-in for the Tinify API.
///
/// Keeps the image header and halves the rest, so compressed files stay
/// detectable as images and can be compressed again.
pub struct MockService {
    pub usage_at_start: u64,
    pub reject_key: bool,
    pub failure_category: ServiceErrorCategory,
    calls: AtomicUsize,
    seen: Mutex<Vec<usize>>,
}

impl MockService {
    pub fn new(usage_at_start: u64) -> Self {
        Self {
            usage_at_start,
            reject_key: false,
            failure_category: ServiceErrorCategory::Server,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            reject_key: true,
            ..Self::new(0)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Payload sizes received, in call order.
    pub fn seen_sizes(&self) -> Vec<usize> {
        self.seen.lock().unwrap().clone()
    }
}

impl CompressionService for MockService {
    fn validate_credential(&self) -> Result<(), ServiceError> {
        if self.reject_key {
            return Err(ServiceError::new(
                ServiceErrorCategory::Account,
                "Credentials are invalid. (HTTP 401/Unauthorized)",
            ));
        }
        Ok(())
    }

    fn current_usage_count(&self) -> Result<u64, ServiceError> {
        Ok(self.usage_at_start)
    }

    fn compress_file(&self, bytes: &[u8]) -> Result<Vec<u8>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(bytes.len());

        if contains(bytes, FAIL_MARKER) {
            return Err(ServiceError::new(
                self.failure_category,
                "Temporary issue with the compression API (HTTP 503)",
            ));
        }
        if contains(bytes, GROW_MARKER) {
            let mut grown = bytes.to_vec();
            grown.extend_from_slice(&[0u8; 64]);
            return Ok(grown);
        }

        let header_len = PNG_HEADER.len().min(bytes.len());
        let body = &bytes[header_len..];
        let mut out = bytes[..header_len].to_vec();
        out.extend_from_slice(&body[..body.len() / 2]);
        Ok(out)
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}

pub fn write_png(path: &Path, payload: &[u8]) -> PathBuf {
    write_with_header(path, PNG_HEADER, payload)
}

pub fn write_jpeg(path: &Path, payload: &[u8]) -> PathBuf {
    write_with_header(path, JPEG_HEADER, payload)
}

fn write_with_header(path: &Path, header: &[u8], payload: &[u8]) -> PathBuf {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut file = File::create(path).unwrap();
    file.write_all(header).unwrap();
    file.write_all(payload).unwrap();
    path.to_path_buf()
}

/// `a.png`, `readme.txt` and `sub/b.jpg`.
pub fn create_basic_tree(root: &Path) {
    write_png(&root.join("a.png"), &[1u8; 200]);
    File::create(root.join("readme.txt"))
        .unwrap()
        .write_all(b"not an image")
        .unwrap();
    write_jpeg(&root.join("sub").join("b.jpg"), &[2u8; 300]);
}

pub fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).unwrap().len()
}
