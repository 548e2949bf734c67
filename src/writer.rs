//! Terminal layout: tables, key/value blocks, bullet lists and banners.

use std::io::{self, Write};

use crate::style::{underline, Color, Styled};

/// Spaces appended after every table column.
const COLUMN_PADDING: usize = 3;

/// Spaces between a dict key's colon and its value.
const KEY_PADDING: usize = 3;

/// Writes styled text to an output stream.
pub struct CliWriter<W> {
    out: W,
    colors: bool,
}

impl<W: Write> CliWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, colors: true }
    }

    pub fn disable_colors(&mut self) {
        self.colors = false;
    }

    pub fn colors(&self) -> bool {
        self.colors
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn write(&mut self, text: impl Into<Styled>) -> io::Result<()> {
        let text = text.into().render(self.colors);
        self.out.write_all(text.as_bytes())
    }

    pub fn writeline(&mut self, text: impl Into<Styled>) -> io::Result<()> {
        self.write(text)?;
        self.newline()
    }

    pub fn newline(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")
    }

    /// Underlined title surrounded by blank lines.
    pub fn headline(&mut self, text: &str) -> io::Result<()> {
        self.newline()?;
        self.writeline(underline(text))?;
        self.newline()
    }

    /// White on red banner.
    pub fn alert(&mut self, text: &str) -> io::Result<()> {
        self.write_boxed(text, Color::White, Color::Red)
    }

    /// White on green banner.
    pub fn success(&mut self, text: &str) -> io::Result<()> {
        self.write_boxed(text, Color::White, Color::Green)
    }

    fn write_boxed(&mut self, text: &str, fg: Color, bg: Color) -> io::Result<()> {
        let blank = " ".repeat(text.chars().count() + 4);

        self.newline()?;
        self.writeline(Styled::plain(blank.as_str()).bg(bg))?;
        self.writeline(Styled::plain(format!("  {}  ", text)).fg(fg).bg(bg))?;
        self.writeline(Styled::plain(blank).bg(bg))?;
        self.newline()
    }
}

/// Column-aligned table with a header row.
#[derive(Debug, Clone)]
pub struct Table {
    header: Vec<Styled>,
    rows: Vec<Vec<Styled>>,
    widths: Vec<usize>,
}

impl Table {
    pub fn new(header: &[&str]) -> Self {
        let header: Vec<Styled> = header.iter().map(|h| Styled::plain(*h)).collect();
        let widths = header.iter().map(Styled::width).collect();
        Self {
            header,
            rows: Vec::new(),
            widths,
        }
    }

    /// Append a row. It must have one cell per header column.
    pub fn row(&mut self, cells: Vec<Styled>) -> &mut Self {
        assert_eq!(
            cells.len(),
            self.header.len(),
            "table row does not match header"
        );

        for (width, cell) in self.widths.iter_mut().zip(&cells) {
            *width = (*width).max(cell.width());
        }
        self.rows.push(cells);
        self
    }

    pub fn write<W: Write>(&self, writer: &mut CliWriter<W>) -> io::Result<()> {
        self.write_row(writer, &self.header)?;
        for row in &self.rows {
            self.write_row(writer, row)?;
        }
        Ok(())
    }

    fn write_row<W: Write>(&self, writer: &mut CliWriter<W>, cells: &[Styled]) -> io::Result<()> {
        for (cell, width) in cells.iter().zip(&self.widths) {
            writer.write(cell.clone())?;
            writer.write(" ".repeat(width + COLUMN_PADDING - cell.width()))?;
        }
        writer.newline()
    }
}

/// `key:` / value pairs with the values aligned.
#[derive(Debug, Clone, Default)]
pub struct Dict {
    items: Vec<(String, Styled)>,
    key_width: usize,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str, value: impl Into<Styled>) -> &mut Self {
        self.key_width = self.key_width.max(key.chars().count());
        self.items.push((key.to_string(), value.into()));
        self
    }

    pub fn write<W: Write>(&self, writer: &mut CliWriter<W>) -> io::Result<()> {
        let column = self.key_width + KEY_PADDING;
        for (key, value) in &self.items {
            writer.write(format!("{:<width$}", format!("{}:", key), width = column))?;
            writer.writeline(value.clone())?;
        }
        Ok(())
    }
}

/// Bulleted list.
#[derive(Debug, Clone, Default)]
pub struct List {
    items: Vec<Styled>,
}

impl List {
    pub fn write<W: Write>(&self, writer: &mut CliWriter<W>) -> io::Result<()> {
        for item in &self.items {
            writer.write("  \u{2022} ")?;
            writer.writeline(item.clone())?;
        }
        Ok(())
    }
}

impl<T: Into<Styled>> FromIterator<T> for List {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}
