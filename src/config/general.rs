//! The general configuration settings for fex.
//!
//! This module defines the [General] struct for deserializing
//! general settings from the fex.toml configuration file
//! and the [InternalGeneral] struct for internal use within fex.
//!
//! It covers classification, the initial sort order, trash handling and the
//! diagnostics switches.

use crate::app::SortMode;
use crate::utils::expand_home_path;

use serde::Deserialize;
use std::path::PathBuf;

/// Which content classifier is consulted when listing a directory.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierChoice {
    /// In-process magic-number sniffing.
    #[default]
    Internal,
    /// The `file -b` command.
    File,
    /// No classification; kinds come from metadata only.
    Off,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub(crate) struct General {
    classifier: ClassifierChoice,
    sort: SortMode,
    dot_entries: bool,
    trash_dir: String,
    system_trash: bool,
    force_exit_on_error: bool,
    logging: bool,
    print_log_on_exit: bool,
    print_log_on_crash: bool,
    log_file: Option<String>,
}

impl Default for General {
    fn default() -> Self {
        General {
            classifier: ClassifierChoice::Internal,
            sort: SortMode::NameAsc,
            dot_entries: true,
            trash_dir: default_trash_dir().into(),
            system_trash: false,
            force_exit_on_error: false,
            logging: true,
            print_log_on_exit: false,
            print_log_on_crash: false,
            log_file: None,
        }
    }
}

fn default_trash_dir() -> &'static str {
    if cfg!(target_os = "macos") {
        "~/.Trash"
    } else {
        "~/.local/share/Trash/files"
    }
}

#[derive(Debug, Clone)]
pub struct InternalGeneral {
    classifier: ClassifierChoice,
    sort: SortMode,
    dot_entries: bool,
    trash_dir: PathBuf,
    system_trash: bool,
    force_exit_on_error: bool,
    logging: bool,
    print_log_on_exit: bool,
    print_log_on_crash: bool,
    log_file: Option<PathBuf>,
}

impl From<General> for InternalGeneral {
    fn from(g: General) -> Self {
        Self {
            classifier: g.classifier,
            sort: g.sort,
            dot_entries: g.dot_entries,
            trash_dir: expand_home_path(&g.trash_dir),
            system_trash: g.system_trash,
            force_exit_on_error: g.force_exit_on_error,
            logging: g.logging,
            print_log_on_exit: g.print_log_on_exit,
            print_log_on_crash: g.print_log_on_crash,
            log_file: g
                .log_file
                .filter(|p| !p.trim().is_empty())
                .map(|p| expand_home_path(&p)),
        }
    }
}

impl Default for InternalGeneral {
    fn default() -> Self {
        General::default().into()
    }
}

impl InternalGeneral {
    #[inline]
    pub fn classifier(&self) -> ClassifierChoice {
        self.classifier
    }

    #[inline]
    pub fn sort(&self) -> SortMode {
        self.sort
    }

    #[inline]
    pub fn dot_entries(&self) -> bool {
        self.dot_entries
    }

    #[inline]
    pub fn trash_dir(&self) -> &PathBuf {
        &self.trash_dir
    }

    #[inline]
    pub fn system_trash(&self) -> bool {
        self.system_trash
    }

    #[inline]
    pub fn force_exit_on_error(&self) -> bool {
        self.force_exit_on_error
    }

    #[inline]
    pub fn logging(&self) -> bool {
        self.logging
    }

    #[inline]
    pub fn print_log_on_exit(&self) -> bool {
        self.print_log_on_exit
    }

    #[inline]
    pub fn print_log_on_crash(&self) -> bool {
        self.print_log_on_crash
    }

    #[inline]
    pub fn log_file(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }
}
