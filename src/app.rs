//! Application state and input handling for fex.
//!
//! - [explorer]: directory listing, filter/sort view, selection and history.
//! - [keymap]: raw key codes, key notation and the verb bindings.
//! - [mode]: the pure mode transition function.
//! - [controller]: applies transitions to the explorer.
//! - [command]: the `:` command line.

pub mod command;
pub mod controller;
pub mod explorer;
pub mod keymap;
pub mod mode;

pub use controller::{Controller, Flow};
pub use explorer::{Explorer, ExplorerOptions, SortMode};
pub use keymap::{Keymap, Verb};
pub use mode::{Action, Mode, Motion};
