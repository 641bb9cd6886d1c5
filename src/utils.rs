//! Miscellaneous utility functions for fex.
//!
//! This module holds the [helpers] submodule (home directory handling, shell escaping)
//! and the [cli] argument parser.

pub mod cli;
pub mod helpers;

pub use helpers::{escape_path, expand_home_path, get_home, shorten_home_path};
