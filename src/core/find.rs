//! Name matching and recursive search for fex.
//!
//! [NameMatcher] implements the shared matching rule used by both the live
//! filter and the recursive search: a pattern starting with [REGEX_PREFIX] is a
//! case-insensitive regular expression that must match the whole name,
//! anything else is a case-sensitive substring test.
//!
//! [search_recursive] walks the tree breadth-first from a root directory and
//! collects every entry whose final path segment matches.

use crate::core::error::PathError;
use crate::core::fm::FileEntry;

use regex::{Regex, RegexBuilder};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

/// Marker that turns a pattern into a regular expression.
pub const REGEX_PREFIX: &str = "r:";

/// Compiled form of a filter/search pattern.
#[derive(Debug, Clone)]
pub enum NameMatcher {
    Substring(String),
    Regex(Regex),
    /// An invalid expression; matches nothing.
    Nothing,
}

impl NameMatcher {
    pub fn new(pattern: &str) -> Self {
        match pattern.strip_prefix(REGEX_PREFIX) {
            Some(expr) => RegexBuilder::new(&format!("^(?:{expr})$"))
                .case_insensitive(true)
                .build()
                .map(NameMatcher::Regex)
                .unwrap_or(NameMatcher::Nothing),
            None => NameMatcher::Substring(pattern.to_string()),
        }
    }

    pub fn is_match(&self, name: &str) -> bool {
        match self {
            NameMatcher::Substring(s) => name.contains(s.as_str()),
            NameMatcher::Regex(re) => re.is_match(name),
            NameMatcher::Nothing => false,
        }
    }
}

/// Breadth-first search from `root` for entries whose file name matches.
///
/// Each result's display name is its path relative to `root`. Directories are
/// always descended into (symlinked directories are not followed) and only
/// reported when they match themselves. Unreadable subdirectories are skipped;
/// only an unreadable root is an error.
pub fn search_recursive(root: &Path, matcher: &NameMatcher) -> Result<Vec<FileEntry>, PathError> {
    let mut out = Vec::new();
    let mut queue = VecDeque::from([root.to_path_buf()]);

    while let Some(dir) = queue.pop_front() {
        let read = match fs::read_dir(&dir) {
            Ok(read) => read,
            Err(e) if dir == root => return Err(PathError::new(root, e)),
            Err(_) => continue,
        };

        for entry in read.flatten() {
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name == "." || name == ".." {
                continue;
            }

            let relative = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_string_lossy()
                .into_owned();

            let Ok(fe) = FileEntry::probe(path.clone(), relative, None) else {
                continue;
            };

            if fe.is_dir() {
                queue.push_back(path);
            }

            if matcher.is_match(&name) {
                out.push(fe);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::error;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn substring_is_case_sensitive() {
        let m = NameMatcher::new("Read");
        assert!(m.is_match("ReadMe.md"));
        assert!(!m.is_match("readme.md"));
        assert!(NameMatcher::new("").is_match("anything"));
    }

    #[test]
    fn regex_is_full_match_and_case_insensitive() {
        let m = NameMatcher::new(r"r:.*\.RS");
        assert!(m.is_match("main.rs"));
        assert!(!m.is_match("main.rs.bak"));

        let m = NameMatcher::new("r:ma");
        assert!(!m.is_match("main.rs"), "partial match must not count");
    }

    #[test]
    fn invalid_regex_matches_nothing() {
        let m = NameMatcher::new("r:(unclosed");
        assert!(matches!(m, NameMatcher::Nothing));
        assert!(!m.is_match("(unclosed"));
    }

    #[test]
    fn search_is_breadth_first_and_relative() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let deep = dir.path().join("a").join("b");
        fs::create_dir_all(&deep)?;
        File::create(deep.join("crab.rs"))?;
        File::create(dir.path().join("crab.txt"))?;
        File::create(dir.path().join("a").join("other.txt"))?;

        let out = search_recursive(dir.path(), &NameMatcher::new("crab"))?;
        let names: Vec<_> = out.iter().map(|e| e.display_name().to_string()).collect();
        assert_eq!(names.len(), 2);
        assert_eq!(names[0], "crab.txt", "shallow matches come first");
        assert_eq!(
            Path::new(&names[1]),
            Path::new("a").join("b").join("crab.rs")
        );
        Ok(())
    }

    #[test]
    fn directories_reported_only_when_matching() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("crabdir"))?;
        fs::create_dir(dir.path().join("plain"))?;
        File::create(dir.path().join("plain").join("crab"))?;

        let out = search_recursive(dir.path(), &NameMatcher::new("crab"))?;
        assert_eq!(out.len(), 2);
        assert!(out.iter().any(|e| e.is_dir() && e.display_name() == "crabdir"));
        assert!(!out.iter().any(|e| e.display_name() == "plain"));
        Ok(())
    }

    #[test]
    fn search_missing_root_fails() {
        let err = search_recursive(Path::new("/path/does/not/exist"), &NameMatcher::new("x"));
        assert!(err.is_err());
    }
}
