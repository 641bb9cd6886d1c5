//! Terminal UI for fex.
//!
//! [layout] turns the explorer state into proportional rows and keeps the
//! scroll offset. [render] paints those rows with ratatui.

pub mod layout;
pub mod render;

pub use layout::{Align, Attr, Col, Row, Win, divide_col, divide_row, format_file_size};
