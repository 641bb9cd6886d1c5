//! Helpers for fex.
//!
//! Small path and string utilities used throughout fex:
//! - Locating the home directory and expanding a leading `~`
//! - Displaying home directories as "~" in file paths
//! - Escaping paths for the shell command line

use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Returns the user's home directory.
pub fn get_home() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Expands a leading `~` (alone or followed by a separator) to the home directory.
///
/// Anything else, including `~user`, is returned unchanged.
pub fn expand_home_path(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = get_home() {
            return home;
        }
    } else if let Some(rest) = path
        .strip_prefix("~/")
        .or_else(|| path.strip_prefix(&format!("~{}", MAIN_SEPARATOR)))
        && let Some(home) = get_home()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

/// Util function to shorten home directory to ~.
/// Used for the path shown in the header.
pub fn shorten_home_path<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    if let Some(home_dir) = get_home()
        && let Ok(stripped) = path.strip_prefix(&home_dir)
    {
        if stripped.as_os_str().is_empty() {
            return "~".to_string();
        } else {
            let mut short = stripped.display().to_string();
            if short.starts_with(MAIN_SEPARATOR) {
                short.remove(0);
            }
            return format!("~{}{}", MAIN_SEPARATOR, short);
        }
    }
    path.display().to_string()
}

/// Backslash-escapes every character the shell would treat specially.
///
/// `foo bar` becomes `foo\ bar`. The command-line parser applies the inverse.
pub fn escape_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if needs_escape(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn needs_escape(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '\\' | '\'' | '"' | '`' | '$' | '&' | '|' | ';' | '<' | '>' | '(' | ')' | '*' | '?'
                | '[' | ']' | '#' | '~' | '!' | '{' | '}'
        )
}
