//! Content classification for file entries.
//!
//! A [Classifier] turns a path into a free-text description, the way `file(1)`
//! does. [MagicClassifier] sniffs the first bytes of the file in-process,
//! [FileCommandClassifier] asks the `file` command. Failures are swallowed by the
//! caller and the entry falls back to metadata-only type inference.

use crate::core::error::ClassificationError;

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};

// Number of bytes to peek from file start for header checks (eg. ELF, PNG, ZIP, etc..)
const HEADER_PEEK_BYTES: usize = 16;
// Bytes to peek for null bytes and text detection
const BINARY_PEEK_BYTES: usize = 1024;

/// Content-type oracle consulted once per listed entry.
pub trait Classifier {
    fn classify(&self, path: &Path) -> Result<String, ClassificationError>;
}

/// In-process classifier based on magic numbers and a text heuristic.
#[derive(Debug, Default, Clone, Copy)]
pub struct MagicClassifier;

impl Classifier for MagicClassifier {
    fn classify(&self, path: &Path) -> Result<String, ClassificationError> {
        let read_err = |source| ClassificationError::Read {
            path: path.to_path_buf(),
            source,
        };

        let meta = fs::symlink_metadata(path).map_err(read_err)?;
        if meta.file_type().is_symlink() {
            let target = fs::read_link(path).map_err(read_err)?;
            return Ok(format!("symbolic link to {}", target.display()));
        }
        if meta.is_dir() {
            return Ok("directory".into());
        }
        if !meta.is_file() {
            return Ok("special file".into());
        }
        if meta.len() == 0 {
            return Ok("empty".into());
        }

        let mut buf = Vec::with_capacity(BINARY_PEEK_BYTES);
        File::open(path)
            .and_then(|f| f.take(BINARY_PEEK_BYTES as u64).read_to_end(&mut buf))
            .map_err(read_err)?;
        Ok(describe_bytes(&buf))
    }
}

/// Classifier backed by the `file -b` command.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileCommandClassifier;

impl FileCommandClassifier {
    /// Returns `None` when the `file` command is not on PATH.
    pub fn detect() -> Option<Self> {
        which::which("file").ok().map(|_| Self)
    }
}

impl Classifier for FileCommandClassifier {
    fn classify(&self, path: &Path) -> Result<String, ClassificationError> {
        let output = Command::new("file")
            .arg("-b")
            .arg("--")
            .arg(path)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| ClassificationError::Command(e.to_string()))?;

        if !output.status.success() {
            return Err(ClassificationError::Command(format!(
                "file exited with {}",
                output.status
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Describes a file from its leading bytes.
pub(crate) fn describe_bytes(buf: &[u8]) -> String {
    let header = &buf[..buf.len().min(HEADER_PEEK_BYTES)];

    if let Some(desc) = describe_magic(header) {
        return desc.to_string();
    }

    if let Some(rest) = buf.strip_prefix(b"#!") {
        let line = rest.split(|&b| b == b'\n').next().unwrap_or_default();
        let line = String::from_utf8_lossy(line);
        let interp = line
            .split_whitespace()
            .next()
            .map(|p| p.rsplit('/').next().unwrap_or(p))
            .filter(|p| !p.is_empty());
        return match interp {
            Some("env") => {
                let prog = line.split_whitespace().nth(1).unwrap_or("env");
                format!("{prog} script text executable")
            }
            Some(prog) => format!("{prog} script text executable"),
            None => "script text executable".into(),
        };
    }

    if buf.contains(&0) {
        return "data".into();
    }

    // A multi-byte sequence may be cut at the peek boundary
    let text = match std::str::from_utf8(buf) {
        Ok(s) => s,
        Err(e) if e.error_len().is_none() => match std::str::from_utf8(&buf[..e.valid_up_to()]) {
            Ok(s) => s,
            Err(_) => return "data".into(),
        },
        Err(_) => return "data".into(),
    };

    let charset = if text.is_ascii() {
        "ASCII text"
    } else {
        "Unicode text, UTF-8 text"
    };

    let trimmed = text.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return "JSON text data".into();
    }
    if looks_like_csv(text) {
        return format!("CSV {charset}");
    }
    charset.into()
}

fn describe_magic(header: &[u8]) -> Option<&'static str> {
    const MAGICS: &[(&[u8], &str)] = &[
        (b"\x7fELF", "ELF executable"),
        (b"\xcf\xfa\xed\xfe", "Mach-O 64-bit executable"),
        (b"\xce\xfa\xed\xfe", "Mach-O executable"),
        (b"\xca\xfe\xba\xbe", "Mach-O universal binary executable"),
        (b"MZ", "PE32 executable"),
        (b"\x89PNG\r\n\x1a\n", "PNG image data"),
        (b"\xff\xd8\xff", "JPEG image data"),
        (b"GIF87a", "GIF image data"),
        (b"GIF89a", "GIF image data"),
        (b"%PDF-", "PDF document"),
        (b"PK\x03\x04", "Zip archive data"),
        (b"\x1f\x8b", "gzip compressed data"),
        (b"BZh", "bzip2 compressed data"),
        (b"\xfd7zXZ\x00", "XZ compressed data"),
        (b"7z\xbc\xaf\x27\x1c", "7-zip archive data"),
    ];
    MAGICS
        .iter()
        .find(|(magic, _)| header.starts_with(magic))
        .map(|(_, desc)| *desc)
}

fn looks_like_csv(text: &str) -> bool {
    let mut lines = text.lines().filter(|l| !l.is_empty()).take(4);
    let Some(first) = lines.next() else {
        return false;
    };
    let columns = first.matches(',').count();
    columns > 0 && lines.all(|l| l.matches(',').count() == columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn magic_numbers() {
        assert_eq!(describe_bytes(b"\x7fELF\x02\x01\x01"), "ELF executable");
        assert_eq!(describe_bytes(b"\x89PNG\r\n\x1a\n...."), "PNG image data");
        assert_eq!(describe_bytes(b"%PDF-1.7\n"), "PDF document");
    }

    #[test]
    fn scripts_are_text_executables() {
        assert_eq!(
            describe_bytes(b"#!/bin/sh\necho hi\n"),
            "sh script text executable"
        );
        assert_eq!(
            describe_bytes(b"#!/usr/bin/env python3\nprint(1)\n"),
            "python3 script text executable"
        );
    }

    #[test]
    fn text_flavours() {
        assert_eq!(describe_bytes(b"hello world\n"), "ASCII text");
        assert_eq!(
            describe_bytes("grüße\n".as_bytes()),
            "Unicode text, UTF-8 text"
        );
        assert_eq!(describe_bytes(b"  {\"a\": 1}"), "JSON text data");
        assert_eq!(describe_bytes(b"a,b,c\n1,2,3\n"), "CSV ASCII text");
        assert_eq!(describe_bytes(b"ab\0cd"), "data");
    }

    #[test]
    fn classify_files_on_disk() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let text = dir.path().join("notes.txt");
        let mut f = File::create(&text)?;
        writeln!(f, "plain words")?;
        File::create(dir.path().join("empty"))?;

        let classifier = MagicClassifier;
        assert_eq!(classifier.classify(&text)?, "ASCII text");
        assert_eq!(classifier.classify(&dir.path().join("empty"))?, "empty");
        assert_eq!(classifier.classify(dir.path())?, "directory");
        assert!(classifier.classify(&dir.path().join("missing")).is_err());
        Ok(())
    }
}
