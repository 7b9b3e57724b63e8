use crate::accounting::RunState;
use crate::compressor::Compressor;
use crate::constants::MAX_DEPTH;
use crate::error::{Result, SqueezeError};
use crate::formats::{detect_image_kind, Detected, ImageKind};
use crate::report::{Importance, Reporter};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Names that never count as subdirectories.
const RESERVED_NAMES: [&str; 2] = [".", ".."];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    NotAnImage,
    UnsupportedImage(String),
    /// Special file (socket, fifo, device) or a reserved name.
    NotRegular,
    BrokenLink,
    /// Directory already visited under its canonical path.
    SymlinkCycle(PathBuf),
    /// Directory nested deeper than the walker's limit.
    DepthLimit(usize),
    Unreadable(String),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::NotAnImage => write!(f, "not an image"),
            IgnoreReason::UnsupportedImage(format) => write!(f, "unsupported image type {}", format),
            IgnoreReason::NotRegular => write!(f, "not a regular file"),
            IgnoreReason::BrokenLink => write!(f, "broken symbolic link"),
            IgnoreReason::SymlinkCycle(target) => {
                write!(f, "symbolic link cycle, already visited as {}", target.display())
            }
            IgnoreReason::DepthLimit(limit) => write!(f, "depth limit of {} levels reached", limit),
            IgnoreReason::Unreadable(msg) => write!(f, "unreadable: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    EligibleImage(ImageKind),
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl DirectoryEntry {
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Classifies a single path. Symbolic links are judged by their target.
pub fn classify(path: &Path) -> EntryKind {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if RESERVED_NAMES.contains(&name.as_str()) {
        return EntryKind::Ignored(IgnoreReason::NotRegular);
    }

    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) => {
            let is_link = fs::symlink_metadata(path)
                .map(|m| m.file_type().is_symlink())
                .unwrap_or(false);
            return EntryKind::Ignored(if is_link {
                IgnoreReason::BrokenLink
            } else {
                IgnoreReason::Unreadable(e.to_string())
            });
        }
    };

    if metadata.is_dir() {
        return EntryKind::Directory;
    }
    if !metadata.is_file() {
        return EntryKind::Ignored(IgnoreReason::NotRegular);
    }

    match detect_image_kind(path) {
        Ok(Detected::Supported(kind)) => EntryKind::EligibleImage(kind),
        Ok(Detected::Unsupported(format)) => {
            EntryKind::Ignored(IgnoreReason::UnsupportedImage(format!("{:?}", format)))
        }
        Ok(Detected::NotAnImage) => EntryKind::Ignored(IgnoreReason::NotAnImage),
        Err(e) => EntryKind::Ignored(IgnoreReason::Unreadable(e.to_string())),
    }
}

/// Lists `dir` once, sorted by file name, and classifies every entry.
///
/// Fails only when the directory itself cannot be read; problems with single
/// entries turn into [`EntryKind::Ignored`].
pub fn list_directory(dir: &Path) -> Result<Vec<DirectoryEntry>> {
    let mut entries = Vec::new();

    for item in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        match item {
            Ok(entry) => {
                let path = entry.into_path();
                let kind = classify(&path);
                entries.push(DirectoryEntry { path, kind });
            }
            Err(err) if err.depth() == 0 || err.path() == Some(dir) => {
                return Err(SqueezeError::DirectoryUnreadable {
                    path: dir.to_path_buf(),
                    source: err,
                });
            }
            Err(err) => {
                let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                entries.push(DirectoryEntry {
                    path,
                    kind: EntryKind::Ignored(IgnoreReason::Unreadable(err.to_string())),
                });
            }
        }
    }

    Ok(entries)
}

/// Depth-first walk that compresses the images of each directory before
/// descending into its subdirectories.
pub struct TreeWalker<'a> {
    compressor: Compressor<'a>,
    reporter: &'a dyn Reporter,
    visited: HashSet<PathBuf>,
    max_depth: usize,
}

impl<'a> TreeWalker<'a> {
    pub fn new(compressor: Compressor<'a>, reporter: &'a dyn Reporter) -> Self {
        Self {
            compressor,
            reporter,
            visited: HashSet::new(),
            max_depth: MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Processes `dir` and everything below it.
    ///
    /// Only an unreadable `dir` is an error. Unreadable subdirectories are
    /// logged and skipped so their siblings still run.
    pub fn walk(&mut self, dir: &Path, state: &mut RunState) -> Result<()> {
        if let Ok(canonical) = dir.canonicalize() {
            self.visited.insert(canonical);
        }
        self.walk_at(dir, 0, state)
    }

    fn walk_at(&mut self, dir: &Path, depth: usize, state: &mut RunState) -> Result<()> {
        self.reporter.blank_line(1);
        self.reporter.info(
            &format!("Entering directory: {}", dir.display()),
            Importance::Normal,
        );

        let entries = list_directory(dir)?;

        state.record_directory();
        self.reporter.info(
            &format!("=== Directories processed: {}", state.directories_processed()),
            Importance::High,
        );

        let mut subdirectories = Vec::new();
        let mut images = Vec::new();
        for entry in entries {
            if let EntryKind::Ignored(reason) = &entry.kind {
                self.reporter.info(
                    &format!("Ignoring {}: {}", entry.path.display(), reason),
                    Importance::Low,
                );
            } else if entry.kind == EntryKind::Directory {
                subdirectories.push(entry);
            } else {
                images.push(entry);
            }
        }

        self.report_found("Directories found", "No directories found.", &subdirectories);
        self.report_found("Images found", "No images found.", &images);

        for image in &images {
            self.compressor.compress(&image.path, state);
        }

        for subdirectory in &subdirectories {
            if let Some(reason) = self.refuse_descent(&subdirectory.path, depth + 1) {
                self.reporter
                    .warn(&format!("Skipping {}: {}", subdirectory.path.display(), reason));
                continue;
            }
            if let Err(err) = self.walk_at(&subdirectory.path, depth + 1, state) {
                self.reporter.error(&err.to_string());
            }
        }

        Ok(())
    }

    /// Turns a subdirectory into an ignored entry when it is too deep or was
    /// already seen under another path, which is how symlink cycles show up.
    fn refuse_descent(&mut self, path: &Path, depth: usize) -> Option<IgnoreReason> {
        if depth > self.max_depth {
            return Some(IgnoreReason::DepthLimit(self.max_depth));
        }

        match path.canonicalize() {
            Ok(canonical) => {
                if self.visited.contains(&canonical) {
                    Some(IgnoreReason::SymlinkCycle(canonical))
                } else {
                    self.visited.insert(canonical);
                    None
                }
            }
            Err(e) => Some(IgnoreReason::Unreadable(e.to_string())),
        }
    }

    fn report_found(&self, label: &str, none: &str, entries: &[DirectoryEntry]) {
        if entries.is_empty() {
            self.reporter.info(none, Importance::Normal);
        } else {
            let names: Vec<String> = entries.iter().map(DirectoryEntry::name).collect();
            self.reporter
                .info(&format!("{}: {}.", label, names.join(", ")), Importance::Normal);
        }
    }
}
