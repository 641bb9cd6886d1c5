//! Configuration for fex.
//!
//! Settings are read once at startup from `fex.toml` (see [load]) and split into
//! [general], [display] and [input] sections.

pub mod display;
pub mod general;
pub mod input;
pub mod load;

pub use display::{Columns, Display};
pub(crate) use general::General;
pub use general::{ClassifierChoice, InternalGeneral};
pub use input::{Keys, Programs};
pub use load::Config;
