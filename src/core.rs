//! Core runtime logic for fex.
//!
//! The non-UI engine pieces used by the application:
//! - [fm]: directory listing, file kinds and symlink resolution (see [browse_dir], [FileEntry]).
//! - [find]: name matching and the recursive search.
//! - [classify]: content based file classification.
//! - [proc]: external programs (editor, opener, `mv`, trash).
//! - [terminal]: terminal setup/teardown and the blocking event loop.
//! - [diagnostics]: the diagnostic trail and last error.
//! - [error]: typed errors.

pub mod classify;
pub mod diagnostics;
pub mod error;
pub mod find;
pub mod fm;
pub mod proc;
pub mod terminal;

pub use diagnostics::Diagnostics;
pub use error::Error;
pub use fm::{FileEntry, FileKind, browse_dir};
