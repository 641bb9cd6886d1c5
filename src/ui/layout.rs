//! Proportional text layout for fex.
//!
//! A frame is three groups of rows: header, body and footer. Each [Row] is a
//! list of [Col]s whose widths are fractions of the terminal width. Text that
//! does not fit its column is wrapped into several physical rows, and every
//! column of a logical row wraps in lockstep (missing chunks become empty
//! cells).
//!
//! [Win] builds those rows from the controller and explorer state and keeps
//! the scroll offset that holds the cursor inside the body viewport.

use crate::app::{Controller, Explorer, SortMode};
use crate::config::{Columns, Display};
use crate::core::diagnostics::Diagnostics;
use crate::core::fm::{FileEntry, FileKind};
use crate::utils::shorten_home_path;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Rows taken by the two separator lines.
const SEPARATOR_ROWS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Attr {
    pub align: Align,
    pub reversed: bool,
    pub underlined: bool,
}

impl Attr {
    pub fn start() -> Self {
        Self::default()
    }

    pub fn end() -> Self {
        Self {
            align: Align::End,
            ..Self::default()
        }
    }
}

/// A column: text, display attributes and width as a fraction of the terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct Col {
    pub text: String,
    pub attr: Attr,
    pub fraction: f32,
}

impl Col {
    pub fn new(text: impl Into<String>, attr: Attr, fraction: f32) -> Self {
        Self {
            text: text.into(),
            attr,
            fraction,
        }
    }

    /// Display width of the text.
    pub fn width(&self) -> usize {
        self.text.width()
    }

    /// An empty cell with the same attributes and width.
    fn blank(&self) -> Self {
        Self {
            text: String::new(),
            attr: self.attr,
            fraction: self.fraction,
        }
    }
}

pub type Row = Vec<Col>;

/// Width in cells of a column on a `width`-wide terminal. At least 1.
pub fn col_cells(fraction: f32, width: u16) -> usize {
    ((fraction * width as f32).floor() as usize).max(1)
}

/// Splits a column into chunks of at most its cell width.
///
/// Control characters are shown as `?`. Empty text yields one empty chunk.
pub fn divide_col(col: &Col, width: u16) -> Vec<Col> {
    let cells = col_cells(col.fraction, width);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut used = 0;

    for c in col.text.chars() {
        let c = if c.is_control() { '?' } else { c };
        let w = c.width().unwrap_or(0);
        if used + w > cells && !current.is_empty() {
            chunks.push(Col::new(std::mem::take(&mut current), col.attr, col.fraction));
            used = 0;
        }
        current.push(c);
        used += w;
    }
    if !current.is_empty() || chunks.is_empty() {
        chunks.push(Col::new(current, col.attr, col.fraction));
    }
    chunks
}

/// Wraps every column of `row` and zips the chunks into physical rows.
pub fn divide_row(row: &[Col], width: u16) -> Vec<Row> {
    let divided: Vec<Vec<Col>> = row.iter().map(|c| divide_col(c, width)).collect();
    let lines = divided.iter().map(Vec::len).max().unwrap_or(0);

    (0..lines)
        .map(|i| {
            divided
                .iter()
                .zip(row)
                .map(|(chunks, col)| chunks.get(i).cloned().unwrap_or_else(|| col.blank()))
                .collect()
        })
        .collect()
}

/// Start x of each column in a physical row.
pub fn place_row(row: &[Col], width: u16) -> Vec<u16> {
    let w = width as f32;
    let mut acc = 0.0f32;
    row.iter()
        .map(|col| {
            let x = match col.attr.align {
                Align::Start => (acc * w).floor() as usize,
                Align::End => (((acc + col.fraction) * w).floor() as usize).saturating_sub(col.width()),
            };
            acc += col.fraction;
            x.min(u16::MAX as usize) as u16
        })
        .collect()
}

/// Human readable size with one decimal, in the largest unit that keeps the
/// value at or above 1.
pub fn format_file_size(size: u64) -> String {
    let unit = if size == 0 {
        0
    } else {
        ((size as f64).log2() / 10.0).floor() as usize
    }
    .min(SIZE_UNITS.len() - 1);
    let scaled = size as f64 / 1024f64.powi(unit as i32);
    format!("{:.1} {}", scaled, SIZE_UNITS[unit])
}

/// Name decoration by kind: `/` for directories, `*` for executables and
/// ` -> target` for symlinks.
pub fn decorated_name(entry: &FileEntry) -> String {
    let name = entry.display_name();
    match entry.kind() {
        FileKind::Directory => format!("{name}/"),
        FileKind::Executable => format!("{name}*"),
        FileKind::Symlink => match entry.symlink_target() {
            Some(target) => format!("{name} -> {}", target.display()),
            None => format!("{name} -> "),
        },
        FileKind::Regular | FileKind::Unknown => name.to_string(),
    }
}

fn digits(mut n: usize) -> usize {
    let mut d = 1;
    while n >= 10 {
        n /= 10;
        d += 1;
    }
    d
}

/// Wrapped rows of one body entry: line number, decorated name and size.
fn entry_rows(
    entry: &FileEntry,
    pos: usize,
    cursor: usize,
    [line_no, name, size]: [f32; 3],
    width: u16,
) -> Vec<Row> {
    let attr = Attr {
        align: Align::Start,
        reversed: pos == cursor,
        underlined: entry.is_selected(),
    };
    let row = [
        Col::new(format!("{pos})"), attr, line_no),
        Col::new(decorated_name(entry), attr, name),
        Col::new(
            format_file_size(entry.size()),
            Attr {
                align: Align::End,
                ..attr
            },
            size,
        ),
    ];
    divide_row(&row, width)
}

/// Frame builder and scroll state.
pub struct Win {
    width: u16,
    height: u16,
    header: Vec<Row>,
    body: Vec<Row>,
    footer: Vec<Row>,
    scroll: usize,
    title: String,
    columns: Columns,
    diag: Diagnostics,
}

impl Win {
    pub fn new(width: u16, height: u16, display: &Display, diag: Diagnostics) -> Self {
        Self {
            width,
            height,
            header: Vec::new(),
            body: Vec::new(),
            footer: Vec::new(),
            scroll: 0,
            title: display.title().to_string(),
            columns: display.columns(),
            diag,
        }
    }

    // Getters / Accessors

    #[inline]
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    #[inline]
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    #[inline]
    pub fn header(&self) -> &[Row] {
        &self.header
    }

    #[inline]
    pub fn body(&self) -> &[Row] {
        &self.body
    }

    #[inline]
    pub fn footer(&self) -> &[Row] {
        &self.footer
    }

    /// Rows available for the body between the two separators.
    pub fn viewport(&self) -> usize {
        (self.height as usize)
            .saturating_sub(self.header.len())
            .saturating_sub(self.footer.len())
            .saturating_sub(SEPARATOR_ROWS)
    }

    /// Updates the cached terminal size.
    pub fn resize(&mut self, width: u16, height: u16) {
        if (width, height) != (self.width, self.height) {
            self.diag.note(format!("resize: {width}x{height}"));
        }
        self.width = width;
        self.height = height;
    }

    /// Drops the pending rows.
    pub fn clear(&mut self) {
        self.header.clear();
        self.body.clear();
        self.footer.clear();
    }

    /// Builds the next frame from the controller and explorer state.
    pub fn set_ui(&mut self, controller: &Controller, explorer: &Explorer) -> &mut Self {
        self.compose(&controller.status(), &controller.echo(), explorer)
    }

    /// Builds the next frame from a status line, the key echo and the explorer.
    ///
    /// The footer's second line is the most recent error when there is one
    /// (consumed here), the key echo otherwise.
    pub fn compose(&mut self, status: &str, echo: &str, explorer: &Explorer) -> &mut Self {
        self.clear();
        let width = self.width;
        let full = |text: String| Col::new(text, Attr::start(), 1.0);

        // header
        self.push_header(full(self.title.clone()));
        self.push_header(full(format!("  {}", shorten_home_path(explorer.cwd()))));
        self.push_header(full(format!("  {} Files", explorer.len())));
        let sort = explorer.sort_mode();
        if sort != SortMode::None {
            self.push_header(full(format!("  Sort by: {}", sort.describe())));
        }

        // footer
        self.push_footer(full(status.to_string()));
        match self.diag.take_error() {
            Some(err) => self.push_footer(full(err.trim_start().to_string())),
            None => self.push_footer(Col::new(echo, Attr::end(), 1.0)),
        }

        let viewport = self.viewport();
        if viewport == 0 {
            return self;
        }

        // body: | line no | name | size |
        let line_no = (digits(explorer.len()) + 3) as f32 / width.max(1) as f32;
        let fractions = [
            line_no,
            self.columns.name() * (1.0 - line_no),
            self.columns.size() * (1.0 - line_no),
        ];
        let cursor = explorer.cursor();
        let rows_at = |pos: usize| -> Vec<Row> {
            explorer
                .entry_at(pos)
                .map(|entry| entry_rows(entry, pos, cursor, fractions, width))
                .unwrap_or_default()
        };

        // scrolling, by entry first, then by wrapped rows
        if cursor >= self.scroll + viewport {
            self.scroll = cursor + 1 - viewport;
        } else if cursor < self.scroll {
            self.scroll = cursor;
        }
        let mut heights: Vec<usize> = (self.scroll..=cursor).map(|pos| rows_at(pos).len()).collect();
        while self.scroll < cursor && heights.iter().sum::<usize>() > viewport {
            heights.remove(0);
            self.scroll += 1;
        }

        for pos in self.scroll..explorer.len() {
            let rows = rows_at(pos);
            if !self.body.is_empty() && self.body.len() + rows.len() > viewport {
                break;
            }
            self.body.extend(rows);
            if self.body.len() >= viewport {
                break;
            }
        }
        self
    }

    fn push_header(&mut self, col: Col) {
        let rows = divide_col(&col, self.width).into_iter().map(|c| vec![c]);
        self.header.extend(rows);
    }

    fn push_footer(&mut self, col: Col) {
        let rows = divide_col(&col, self.width).into_iter().map(|c| vec![c]);
        self.footer.extend(rows);
    }
}
