//! Frame renderer.
//!
//! Paints the rows built by [Win::set_ui] into a ratatui [Buffer]: header,
//! a dashed separator, the body clipped to the viewport, a second separator
//! and the footer at the bottom of the screen.

use crate::ui::layout::{Col, Row, Win, place_row};

use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::style::{Modifier, Style};
use std::io;

fn col_style(col: &Col) -> Style {
    let mut style = Style::default();
    if col.attr.reversed {
        style = style.add_modifier(Modifier::REVERSED);
    }
    if col.attr.underlined {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    style
}

fn put_row(buf: &mut Buffer, y: u16, row: &Row, width: u16) {
    let area = buf.area;
    if y >= area.height {
        return;
    }
    for (col, x) in row.iter().zip(place_row(row, width)) {
        let x = area.x.saturating_add(x);
        if x >= area.right() || col.text.is_empty() {
            continue;
        }
        let room = (area.right() - x) as usize;
        buf.set_stringn(x, area.y + y, &col.text, room, col_style(col));
    }
}

fn put_separator(buf: &mut Buffer, y: u16) {
    let area = buf.area;
    if y >= area.height {
        return;
    }
    let line = "-".repeat(area.width as usize);
    buf.set_string(area.x, area.y + y, line, Style::default());
}

impl Win {
    /// Paints the pending frame into `buf`. Cells outside the buffer are skipped.
    pub fn render(&self, buf: &mut Buffer) {
        let (width, height) = self.size();
        let mut y: u16 = 0;

        for row in self.header() {
            put_row(buf, y, row, width);
            y = y.saturating_add(1);
        }
        put_separator(buf, y);
        y = y.saturating_add(1);

        for row in self.body().iter().take(self.viewport()) {
            put_row(buf, y, row, width);
            y = y.saturating_add(1);
        }

        let footer = self.footer().len() as u16;
        let Some(sep) = height.checked_sub(footer + 1) else {
            return;
        };
        put_separator(buf, sep);
        for (i, row) in self.footer().iter().enumerate() {
            put_row(buf, sep + 1 + i as u16, row, width);
        }
    }

    /// Renders the pending frame to the terminal.
    pub fn draw<B: Backend>(&self, terminal: &mut Terminal<B>) -> io::Result<()>
    where
        io::Error: From<<B as Backend>::Error>,
    {
        terminal.draw(|f| self.render(f.buffer_mut()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::layout::Attr;
    use ratatui::layout::Rect;

    fn line(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn row_placement_in_buffer() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 2));
        let row = vec![
            Col::new("ab", Attr::start(), 0.5),
            Col::new("xyz", Attr::end(), 0.5),
        ];
        put_row(&mut buf, 0, &row, 20);
        assert_eq!(line(&buf, 0), "ab               xyz");

        // rows past the bottom are dropped
        put_row(&mut buf, 5, &row, 20);
        put_separator(&mut buf, 1);
        assert_eq!(line(&buf, 1), "-".repeat(20));
    }

    #[test]
    fn styles_follow_attributes() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 1));
        let attr = Attr {
            reversed: true,
            underlined: true,
            ..Attr::start()
        };
        put_row(&mut buf, 0, &vec![Col::new("hi", attr, 1.0)], 10);
        let modifier = buf[(0, 0)].modifier;
        assert!(modifier.contains(Modifier::REVERSED));
        assert!(modifier.contains(Modifier::UNDERLINED));
        assert!(!buf[(3, 0)].modifier.contains(Modifier::REVERSED));
    }
}
