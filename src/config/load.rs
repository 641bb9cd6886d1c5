//! The main config loading module for fex.
//!
//! Handles loading and deserializing settings from `fex.toml`.
//!
//! Provides and manages the main [Config] struct, as well as the internal [RawConfig] used for parsing and processing.
//!
//! Also implements default config initialization when `fex.toml` is not present.

use crate::config::{Display, General, InternalGeneral, Keys, Programs};
use crate::utils::get_home;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{fs, io};

/// Raw configuration as read from the toml file
/// It is converted into the main [Config] struct after parsing.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub(crate) struct RawConfig {
    general: General,
    display: Display,
    programs: Programs,
    keys: Keys,
}

/// Main configuration struct for fex
#[derive(Debug, Clone, Default)]
pub struct Config {
    general: InternalGeneral,
    display: Display,
    programs: Programs,
    keys: Keys,
}

/// Conversion from RawConfig to Config
impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self {
            general: InternalGeneral::from(raw.general),
            display: raw.display.normalized(),
            programs: raw.programs,
            keys: raw.keys,
        }
    }
}

impl Config {
    /// Load configuration from the default path
    /// If the file does not exist or fails to parse, returns the default configuration.
    pub fn load() -> Self {
        let path = Self::default_path();

        if !path.exists() {
            eprintln!(
                "No fex.toml config file found. Using internal defaults. (Tip: run 'fex --init' to generate a config file.)"
            );
            return Self::default();
        }

        match Self::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error parsing config: {}", e);
                Self::default()
            }
        }
    }

    /// Reads and parses a config file.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> io::Result<Self> {
        toml::from_str::<RawConfig>(content)
            .map(Config::from)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    // Getters

    #[inline]
    pub fn general(&self) -> &InternalGeneral {
        &self.general
    }

    #[inline]
    pub fn display(&self) -> &Display {
        &self.display
    }

    #[inline]
    pub fn programs(&self) -> &Programs {
        &self.programs
    }

    #[inline]
    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    /// Determine the default configuration file path: `~/.config/fex/fex.toml`,
    /// or `fex.toml` in the working directory when there is no home directory.
    pub fn default_path() -> PathBuf {
        match get_home() {
            Some(home) => home.join(".config").join("fex").join("fex.toml"),
            None => PathBuf::from("fex.toml"),
        }
    }

    /// Generate a default configuration file at the specified path.
    /// If the file already exists, returns an error.
    pub fn generate_default(path: &Path) -> io::Result<()> {
        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Config file already exists at {:?}", path),
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_TOML)?;
        println!("Default config generated at {:?}", path);
        Ok(())
    }
}

const DEFAULT_TOML: &str = r##"# fex.toml - default configuration for fex
# Commented values are the internal defaults.

[general]
# classifier = "internal"        # "internal", "file" or "off"
# sort = "name_asc"              # "name_asc", "name_desc", "size_asc", "size_desc", "none"
# dot_entries = true
# trash_dir = "~/.local/share/Trash/files"
# system_trash = false
# force_exit_on_error = false
# logging = true
# print_log_on_exit = false
# print_log_on_crash = false
# log_file = "~/.cache/fex/fex.log"

[display]
# title = "File Explorer"
# columns.name = 0.8
# columns.size = 0.2

[programs]
# editor = "nvim"
# terminal = ""
# opener = "xdg-open"

# [keys]
# down = ["j"]
# up = ["k"]
# top = ["gg"]
# bottom = ["G"]
# open = ["<enter>"]
# describe = ["d"]
# back = ["b"]
# cycle_sort = ["x"]
# toggle_select = ["s"]
# clear_selection = ["S"]
# refresh = ["R"]
# home = ["~"]
# select_mode = ["v"]
# search_mode = ["/"]
# recursive_search_mode = ["?"]
# command_mode = [":"]
# quit = ["q"]
"##;
