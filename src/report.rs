//! Where run events go.
//!
//! The pipeline never prints directly; it talks to a [`Reporter`]. The
//! terminal implementation sits on top of the `logger` macros, and
//! [`MemoryReporter`] keeps events in memory for callers that want to
//! inspect them afterwards.

use crate::constants::{HIGHLIGHT_PREFIX, INFO_PREFIX};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Importance {
    /// Detail only shown with `--verbose`.
    Low,
    Normal,
    /// Headline figures (counters, summary).
    High,
}

pub trait Reporter {
    fn info(&self, message: &str, importance: Importance);
    fn success(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
    fn blank_line(&self, count: usize);
}

/// Prints to stdout/stderr, honoring the quiet and verbose switches.
#[derive(Debug, Default, Clone, Copy)]
pub struct Terminal;

impl Reporter for Terminal {
    fn info(&self, message: &str, importance: Importance) {
        match importance {
            Importance::Low => crate::verbose!("{}", message),
            Importance::Normal => crate::info!("{} {}", INFO_PREFIX, message),
            Importance::High => crate::info!("{} {}", HIGHLIGHT_PREFIX, message),
        }
    }

    fn success(&self, message: &str) {
        crate::success!("{}", message);
    }

    fn warn(&self, message: &str) {
        crate::warn!("{}", message);
    }

    fn error(&self, message: &str) {
        crate::error!("{}", message);
    }

    fn blank_line(&self, count: usize) {
        for _ in 0..count {
            crate::info!();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    Info(String, Importance),
    Success(String),
    Warn(String),
    Error(String),
    BlankLine(usize),
}

/// Records every event in order.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                ReportEvent::Error(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                ReportEvent::Warn(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    /// True if any info, success, warning or error message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lock().iter().any(|e| match e {
            ReportEvent::Info(m, _)
            | ReportEvent::Success(m)
            | ReportEvent::Warn(m)
            | ReportEvent::Error(m) => m.contains(needle),
            ReportEvent::BlankLine(_) => false,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ReportEvent>> {
        // a panic while holding the lock leaves the Vec intact
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, event: ReportEvent) {
        self.lock().push(event);
    }
}

impl Reporter for MemoryReporter {
    fn info(&self, message: &str, importance: Importance) {
        self.push(ReportEvent::Info(message.to_string(), importance));
    }

    fn success(&self, message: &str) {
        self.push(ReportEvent::Success(message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.push(ReportEvent::Warn(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(ReportEvent::Error(message.to_string()));
    }

    fn blank_line(&self, count: usize) {
        self.push(ReportEvent::BlankLine(count));
    }
}
