//! Filesystem probe
//!
//! Stateless predicates over paths. Nothing here fails the walk: a missing
//! path is "not a directory", and a directory that cannot be opened lists as
//! empty.

use std::ffi::{OsStr, OsString};
use std::fs::{self, ReadDir};
use std::io;
use std::path::{Path, PathBuf};

/// Name of the directory entry that marks a repository root
pub const REPO_MARKER: &str = ".git";

/// True if `path` exists and is a directory, following symlinks
pub fn is_directory(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

/// True if `path` directly contains a `.git` directory
pub fn has_repository_marker(path: &Path) -> bool {
    is_directory(&path.join(REPO_MARKER))
}

/// True for the `.` and `..` pseudo-entries
pub fn is_special(name: &OsStr) -> bool {
    name == "." || name == ".."
}

/// One immediate child of a directory
#[derive(Debug, Clone)]
pub struct ChildEntry {
    /// Entry name
    pub name: OsString,

    /// Whether the entry is a directory, if known without a stat
    ///
    /// `None` means the caller must fall back to [`is_directory`].
    pub is_dir_hint: Option<bool>,
}

impl ChildEntry {
    /// Resolve whether this entry is a directory inside `parent`
    pub fn is_dir_in(&self, parent: &Path) -> bool {
        match self.is_dir_hint {
            Some(hint) => hint,
            None => is_directory(&parent.join(&self.name)),
        }
    }
}

/// Lazy, non-restartable listing of a directory's children
///
/// A directory that cannot be opened yields nothing; the open error is kept
/// so the caller can report it.
pub struct Children {
    inner: Option<ReadDir>,
    open_error: Option<io::Error>,
    follow_symlinks: bool,
}

impl Children {
    /// Error from opening the directory, if it could not be opened
    pub fn open_error(&self) -> Option<&io::Error> {
        self.open_error.as_ref()
    }
}

impl Iterator for Children {
    type Item = ChildEntry;

    fn next(&mut self) -> Option<ChildEntry> {
        let inner = self.inner.as_mut()?;
        loop {
            match inner.next()? {
                Ok(entry) => {
                    let is_dir_hint = match entry.file_type() {
                        Ok(ft) if ft.is_symlink() => {
                            // The link target needs a stat
                            if self.follow_symlinks {
                                None
                            } else {
                                Some(false)
                            }
                        }
                        Ok(ft) => Some(ft.is_dir()),
                        Err(_) => None,
                    };
                    return Some(ChildEntry {
                        name: entry.file_name(),
                        is_dir_hint,
                    });
                }
                // Entry vanished between readdir and inspection
                Err(_) => continue,
            }
        }
    }
}

/// List the immediate children of `path`
pub fn list_children(path: &Path, follow_symlinks: bool) -> Children {
    match fs::read_dir(path) {
        Ok(inner) => Children {
            inner: Some(inner),
            open_error: None,
            follow_symlinks,
        },
        Err(e) => Children {
            inner: None,
            open_error: Some(e),
            follow_symlinks,
        },
    }
}

/// Resolve the scan root to an absolute canonical path
pub fn canonical_root(path: &Path) -> io::Result<PathBuf> {
    fs::canonicalize(path)
}
