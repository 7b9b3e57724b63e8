//! Process-wide output switches and the printing macros built on them.
//!
//! Errors are always printed. Everything else is silenced by `--quiet`, and
//! `verbose!` lines only appear with `--verbose`.

use std::sync::atomic::{AtomicBool, Ordering};

static QUIET_MODE: AtomicBool = AtomicBool::new(false);
static VERBOSE_MODE: AtomicBool = AtomicBool::new(false);

/// Applies both switches at once.
pub fn init(quiet: bool, verbose: bool) {
    let (quiet, verbose) = resolve_modes(quiet, verbose);
    QUIET_MODE.store(quiet, Ordering::Relaxed);
    VERBOSE_MODE.store(verbose, Ordering::Relaxed);
}

/// Quiet wins over verbose.
fn resolve_modes(quiet: bool, verbose: bool) -> (bool, bool) {
    (quiet, verbose && !quiet)
}

pub fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

pub fn is_verbose() -> bool {
    VERBOSE_MODE.load(Ordering::Relaxed)
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        if !$crate::logger::is_quiet() {
            println!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        if !$crate::logger::is_quiet() {
            println!("{} {}", $crate::constants::SUCCESS_PREFIX, format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        if $crate::logger::is_verbose() && !$crate::logger::is_quiet() {
            println!("{} {}", $crate::constants::VERBOSE_PREFIX, format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        eprintln!("{} {}", $crate::constants::ERROR_PREFIX, format!($($arg)*));
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        if !$crate::logger::is_quiet() {
            eprintln!("{} {}", $crate::constants::WARNING_PREFIX, format!($($arg)*));
        }
    };
}
