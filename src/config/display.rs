//! Display configuration options for fex
//!
//! This module defines the display configuration options which are read from the fex.toml
//! configuration file.

use serde::Deserialize;

/// Display configuration options
///
/// `columns` holds the body's name/size width fractions. They are relative to
/// the space left after the line-number column.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Display {
    title: String,
    columns: Columns,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Columns {
    name: f32,
    size: f32,
}

impl Display {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn columns(&self) -> Columns {
        self.columns
    }

    /// Rescales the column fractions so they sum to at most 1.
    pub(crate) fn normalized(mut self) -> Self {
        self.columns = self.columns.normalized();
        self
    }
}

impl Columns {
    pub fn new(name: f32, size: f32) -> Self {
        Self { name, size }
    }

    pub fn name(&self) -> f32 {
        self.name
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    fn normalized(self) -> Self {
        let name = self.name.max(0.0);
        let size = self.size.max(0.0);
        let sum = name + size;
        if sum <= 1.0 {
            return Self { name, size };
        }
        eprintln!(
            "[Warning] display.columns sum to {:.2}, scaled down to fit the terminal width",
            sum
        );
        Self {
            name: name / sum,
            size: size / sum,
        }
    }
}

impl Default for Display {
    fn default() -> Self {
        Display {
            title: "File Explorer".into(),
            columns: Columns::default(),
        }
    }
}

impl Default for Columns {
    fn default() -> Self {
        Columns {
            name: 0.8,
            size: 0.2,
        }
    }
}
