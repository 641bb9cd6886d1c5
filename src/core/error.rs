//! Error taxonomy for fex.
//!
//! Every failure is recoverable by default: it is reported through
//! [crate::core::Diagnostics], surfaced in the footer on the next frame, and the
//! operation that produced it is dropped.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Resolution, listing or stat failure for a path.
#[derive(Debug, Error)]
#[error("{}: {source}", path.display())]
pub struct PathError {
    path: PathBuf,
    #[source]
    source: io::Error,
}

impl PathError {
    pub fn new(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }
}

/// Classifier failure. Never surfaced: the entry degrades to an empty description.
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("classifier command failed: {0}")]
    Command(String),
}

/// Bad command line typed in command mode.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("{cmd} requires {expected} argument(s), got {got}")]
    ArgCount {
        cmd: String,
        expected: usize,
        got: usize,
    },
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("{0}: no selection")]
    EmptySelection(String),
    #[error("no home directory")]
    NoHome,
}

/// Subprocess failure.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{0}: command not found")]
    NotFound(String),
    #[error("{cmd}: exited with status {code}")]
    Exit { cmd: String, code: i32 },
    #[error("{0}: terminated by signal")]
    Signal(String),
    #[error("{cmd}: {source}")]
    Spawn {
        cmd: String,
        #[source]
        source: io::Error,
    },
    #[error("trash: {0}")]
    Trash(String),
}

/// Any reportable error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Shell(#[from] ShellError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        let err = Error::from(CommandError::ArgCount {
            cmd: "mv".into(),
            expected: 1,
            got: 0,
        });
        assert_eq!(err.to_string(), "mv requires 1 argument(s), got 0");

        let err = Error::from(PathError::new(
            "/nope",
            io::Error::new(io::ErrorKind::NotFound, "not found"),
        ));
        assert_eq!(err.to_string(), "/nope: not found");

        let err = Error::from(ShellError::Exit {
            cmd: "mv a b".into(),
            code: 1,
        });
        assert!(err.to_string().contains("status 1"));
    }
}
