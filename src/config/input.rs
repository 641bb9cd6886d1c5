//! Input configuration options for fex
//!
//! This module defines the key bindings and the external programs which are read from the
//! fex.toml configuration file.

use serde::Deserialize;

/// Key sequences for every verb, in key notation (`"gg"`, `"<enter>"`, `"<c-x>"`).
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Keys {
    down: Vec<String>,
    up: Vec<String>,
    top: Vec<String>,
    bottom: Vec<String>,
    open: Vec<String>,
    describe: Vec<String>,
    back: Vec<String>,
    cycle_sort: Vec<String>,
    toggle_select: Vec<String>,
    clear_selection: Vec<String>,
    refresh: Vec<String>,
    home: Vec<String>,
    select_mode: Vec<String>,
    search_mode: Vec<String>,
    recursive_search_mode: Vec<String>,
    command_mode: Vec<String>,
    quit: Vec<String>,
}

macro_rules! accessor {
    ($($name:ident),+ $(,)?) => {
        impl Keys {
            $(
                #[inline]
                pub fn $name(&self) -> &[String] {
                    &self.$name
                }
            )+
        }
    };
}

accessor!(
    down,
    up,
    top,
    bottom,
    open,
    describe,
    back,
    cycle_sort,
    toggle_select,
    clear_selection,
    refresh,
    home,
    select_mode,
    search_mode,
    recursive_search_mode,
    command_mode,
    quit,
);

/// Default key bindings
impl Default for Keys {
    fn default() -> Self {
        Keys {
            down: vec!["j".into()],
            up: vec!["k".into()],
            top: vec!["gg".into()],
            bottom: vec!["G".into()],
            open: vec!["<enter>".into()],
            describe: vec!["d".into()],
            back: vec!["b".into()],
            cycle_sort: vec!["x".into()],
            toggle_select: vec!["s".into()],
            clear_selection: vec!["S".into()],
            refresh: vec!["R".into()],
            home: vec!["~".into()],
            select_mode: vec!["v".into()],
            search_mode: vec!["/".into()],
            recursive_search_mode: vec!["?".into()],
            command_mode: vec![":".into()],
            quit: vec!["q".into()],
        }
    }
}

/// External programs used to activate entries
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Programs {
    editor: String,
    terminal: String,
    opener: String,
}

impl Programs {
    pub fn new(editor: &str, terminal: &str, opener: &str) -> Self {
        Self {
            editor: editor.into(),
            terminal: terminal.into(),
            opener: opener.into(),
        }
    }

    #[inline]
    pub fn editor(&self) -> &str {
        let trimmed = self.editor.trim();
        if trimmed.is_empty() { "vi" } else { trimmed }
    }

    /// Command prefix for editors and executables. Empty runs them in place.
    #[inline]
    pub fn terminal(&self) -> &str {
        self.terminal.trim()
    }

    #[inline]
    pub fn opener(&self) -> &str {
        let trimmed = self.opener.trim();
        if trimmed.is_empty() {
            default_opener()
        } else {
            trimmed
        }
    }

    pub fn editor_exists(&self) -> bool {
        self.editor()
            .split_whitespace()
            .next()
            .is_some_and(|cmd| which::which(cmd).is_ok())
    }
}

fn default_opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}

impl Default for Programs {
    fn default() -> Self {
        Programs {
            editor: "nvim".into(),
            terminal: String::new(),
            opener: default_opener().into(),
        }
    }
}
