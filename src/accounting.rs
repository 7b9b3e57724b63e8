//! Run-wide counters and the end-of-run summary.

use crate::constants::FREE_TIER_LIMIT;
use crate::utils::{format_duration, format_file_size, format_reduction, reduction_ratio};
use std::time::{Duration, Instant};

/// Counters for a single invocation.
///
/// Owned by the runner and lent to the walker and compressor. Every counter
/// only moves up.
#[derive(Debug, Clone)]
pub struct RunState {
    quota_used_at_start: u64,
    directories_processed: u64,
    images_compressed: u64,
    images_failed: u64,
    bytes_before: u64,
    bytes_after: u64,
    started_at: Instant,
    finished_at: Option<Instant>,
}

impl RunState {
    pub fn new(quota_used_at_start: u64) -> Self {
        Self {
            quota_used_at_start,
            directories_processed: 0,
            images_compressed: 0,
            images_failed: 0,
            bytes_before: 0,
            bytes_after: 0,
            started_at: Instant::now(),
            finished_at: None,
        }
    }

    pub fn record_directory(&mut self) {
        self.directories_processed += 1;
    }

    pub fn record_compression(&mut self, original_size: u64, new_size: u64) {
        self.images_compressed += 1;
        self.bytes_before += original_size;
        self.bytes_after += new_size;
    }

    pub fn record_failure(&mut self) {
        self.images_failed += 1;
    }

    /// Stops the clock. Later calls keep the first end time.
    pub fn finish(&mut self) {
        if self.finished_at.is_none() {
            self.finished_at = Some(Instant::now());
        }
    }

    pub fn quota_used_at_start(&self) -> u64 {
        self.quota_used_at_start
    }

    pub fn directories_processed(&self) -> u64 {
        self.directories_processed
    }

    pub fn images_compressed(&self) -> u64 {
        self.images_compressed
    }

    pub fn images_failed(&self) -> u64 {
        self.images_failed
    }

    pub fn free_quota_remaining(&self) -> i64 {
        free_quota_remaining(self.quota_used_at_start, self.images_compressed)
    }

    pub fn elapsed(&self) -> Duration {
        let end = self.finished_at.unwrap_or_else(Instant::now);
        end.duration_since(self.started_at)
    }

    pub fn summarize(&self) -> RunSummary {
        RunSummary {
            elapsed: self.elapsed(),
            directories_processed: self.directories_processed,
            images_compressed: self.images_compressed,
            images_failed: self.images_failed,
            quota_used_at_start: self.quota_used_at_start,
            free_quota_remaining: self.free_quota_remaining(),
            bytes_before: self.bytes_before,
            bytes_after: self.bytes_after,
        }
    }
}

/// `FREE_TIER_LIMIT − (used_at_start + compressed)`. Goes negative once the
/// free allotment is exhausted.
pub fn free_quota_remaining(quota_used_at_start: u64, images_compressed: u64) -> i64 {
    let used = quota_used_at_start.saturating_add(images_compressed);
    FREE_TIER_LIMIT - i64::try_from(used).unwrap_or(i64::MAX)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub elapsed: Duration,
    pub directories_processed: u64,
    pub images_compressed: u64,
    pub images_failed: u64,
    pub quota_used_at_start: u64,
    pub free_quota_remaining: i64,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

impl RunSummary {
    pub fn bytes_saved(&self) -> i64 {
        self.bytes_before as i64 - self.bytes_after as i64
    }

    pub fn overall_reduction(&self) -> Option<f64> {
        reduction_ratio(self.bytes_before, self.bytes_after)
    }

    /// Summary lines in display order, without prefixes.
    pub fn lines(&self) -> Vec<String> {
        let saved = self.bytes_saved();
        let saved_text = if saved < 0 {
            format!("-{}", format_file_size(saved.unsigned_abs()))
        } else {
            format_file_size(saved as u64)
        };

        vec![
            format!("Elapsed time: {}", format_duration(self.elapsed)),
            format!("Directories processed: {}", self.directories_processed),
            format!("Images compressed: {}", self.images_compressed),
            format!("Images failed: {}", self.images_failed),
            format!("Space saved: {}", saved_text),
            format!("Overall reduction: {}", format_reduction(self.overall_reduction())),
            format!("Free compressions remaining: {}", self.free_quota_remaining),
        ]
    }
}
