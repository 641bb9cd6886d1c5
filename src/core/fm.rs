//! File and directory browsing logic for fex.
//!
//! Provides the [FileEntry] struct which is used throughout fex, the directory
//! listing function [browse_dir] and the bounded symlink resolution used when
//! an entry is activated.

use crate::core::classify::Classifier;
use crate::core::error::PathError;

use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};

/// Maximum number of links followed before a chain is treated as a cycle.
pub const MAX_SYMLINK_DEPTH: usize = 40;

/// Entry kind decided once, at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Directory,
    Executable,
    Regular,
    Symlink,
    Unknown,
}

/// Represents a single entry in a directory listing or a search result.
///
/// Everything but `selected` is fixed by a single `lstat` probe when the entry
/// is created.
#[derive(Debug, Clone)]
pub struct FileEntry {
    full_path: PathBuf,
    display_name: String,
    kind: FileKind,
    symlink: Option<PathBuf>,
    size: u64,
    description: String,
    selected: bool,
}

impl FileEntry {
    /// Used to set the Executable kind for files which can be executed.
    #[cfg(unix)]
    const EXEC_FLAG: u32 = 0o111;

    /// Probes `full_path` and builds the entry.
    ///
    /// With a classifier the description drives the Regular/Executable/Unknown
    /// decision; without one (or when it fails) only metadata is used.
    pub fn probe(
        full_path: PathBuf,
        display_name: String,
        classifier: Option<&dyn Classifier>,
    ) -> io::Result<Self> {
        let meta = fs::symlink_metadata(&full_path)?;
        let description = classifier
            .and_then(|c| c.classify(&full_path).ok())
            .unwrap_or_default();

        let ft = meta.file_type();
        let (kind, symlink) = if ft.is_dir() {
            (FileKind::Directory, None)
        } else if ft.is_symlink() {
            (FileKind::Symlink, fs::read_link(&full_path).ok())
        } else if !description.is_empty() {
            (kind_from_description(&description), None)
        } else {
            (kind_from_metadata(&meta), None)
        };

        Ok(FileEntry {
            full_path,
            display_name,
            kind,
            symlink,
            size: meta.len(),
            description,
            selected: false,
        })
    }

    pub fn new(full_path: PathBuf, display_name: String, kind: FileKind, size: u64) -> Self {
        FileEntry {
            full_path,
            display_name,
            kind,
            symlink: None,
            size,
            description: String::new(),
            selected: false,
        }
    }

    // Accessors

    #[inline]
    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    #[inline]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[inline]
    pub fn kind(&self) -> FileKind {
        self.kind
    }

    #[inline]
    pub fn symlink_target(&self) -> Option<&Path> {
        self.symlink.as_deref()
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[inline]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

fn kind_from_description(desc: &str) -> FileKind {
    if desc.contains("text") || desc.contains("JSON") || desc.contains("CSV") {
        FileKind::Regular
    } else if desc.contains("executable") {
        FileKind::Executable
    } else {
        FileKind::Unknown
    }
}

fn kind_from_metadata(meta: &Metadata) -> FileKind {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if meta.is_file() && meta.permissions().mode() & FileEntry::EXEC_FLAG != 0 {
            return FileKind::Executable;
        }
    }
    #[cfg(not(unix))]
    let _ = meta;
    FileKind::Unknown
}

/// Reads the contents of `path` into a vector of [FileEntry], in listing order.
///
/// With `dot_entries` the `.` and `..` pseudo-entries lead the listing, as a
/// `readdir` listing would. Entries that vanish between listing and probing are
/// skipped.
pub fn browse_dir(
    path: &Path,
    classifier: Option<&dyn Classifier>,
    dot_entries: bool,
) -> io::Result<Vec<FileEntry>> {
    let mut entries = Vec::with_capacity(256);

    let read = fs::read_dir(path)?;

    if dot_entries {
        entries.push(FileEntry::probe(path.to_path_buf(), ".".into(), None)?);
        let parent = path.parent().unwrap_or(path).to_path_buf();
        entries.push(FileEntry::probe(parent, "..".into(), None)?);
    }

    for entry in read {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Ok(fe) = FileEntry::probe(entry.path(), name, classifier) {
            entries.push(fe);
        }
    }
    Ok(entries)
}

/// Follows a symlink chain to its final target.
///
/// Relative link targets are resolved against the directory holding the link.
/// A chain longer than [MAX_SYMLINK_DEPTH] is reported as a loop.
pub fn resolve_symlink(path: &Path) -> Result<PathBuf, PathError> {
    let mut current = path.to_path_buf();
    for _ in 0..MAX_SYMLINK_DEPTH {
        let meta = fs::symlink_metadata(&current).map_err(|e| PathError::new(&current, e))?;
        if !meta.file_type().is_symlink() {
            return Ok(current);
        }
        let target = fs::read_link(&current).map_err(|e| PathError::new(&current, e))?;
        current = match current.parent() {
            Some(parent) if target.is_relative() => parent.join(target),
            _ => target,
        };
    }
    Err(PathError::new(
        path,
        io::Error::other("too many levels of symbolic links"),
    ))
}
