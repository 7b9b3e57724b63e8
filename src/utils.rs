//! Formatting helpers shared by the compressor and the run summary.

use crate::constants::PROGRESS_SPINNER_TEMPLATE;
use crate::logger;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a progress spinner with consistent styling
///
/// Returns a hidden bar in quiet mode; indicatif also hides it on its own
/// when stderr is not a terminal.
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    if logger::is_quiet() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(PROGRESS_SPINNER_TEMPLATE) {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Format file size in human-readable format
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * Human-readable size string (e.g., "1.2 MB", "512 B")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Size reduction in percent, `100 × (1 − new/old)`.
///
/// `None` when the original was empty. Negative when the file grew.
pub fn reduction_ratio(original_size: u64, new_size: u64) -> Option<f64> {
    if original_size == 0 {
        return None;
    }
    Some((original_size as f64 - new_size as f64) / original_size as f64 * 100.0)
}

pub fn format_reduction(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{:.2}%", r),
        None => "N/A".to_string(),
    }
}

/// Renders whole seconds as `<1s`, `Ns`, `Nm` or `Nh`.
///
/// Each step truncates, and the unit only escalates once the value reaches 60.
pub fn format_elapsed(seconds: u64) -> String {
    if seconds == 0 {
        return "<1s".to_string();
    }

    let mut value = seconds;
    let mut unit = 's';

    if value >= 60 {
        value /= 60;
        unit = 'm';
    }
    if value >= 60 {
        value /= 60;
        unit = 'h';
    }

    format!("{}{}", value, unit)
}

pub fn format_duration(duration: Duration) -> String {
    format_elapsed(duration.as_secs())
}
