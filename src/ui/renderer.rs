//! Terminal renderer using crossterm
//!
//! Keeps the scrollback of finished lines and draws it, followed by the input
//! prompt, to the alternate screen.

use std::io::{self, Write};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use tracing::debug;
use unicode_width::UnicodeWidthChar;

use crate::config::ColorScheme;
use crate::core::markup::{Style, StyledLine};
use crate::core::sink::LineSink;

/// Oldest lines are dropped past this many
const SCROLLBACK_LIMIT: usize = 10_000;

/// One character on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
    /// Position inside its segment (drives rainbow coloring)
    pub index: usize,
}

/// One screen row after wrapping
pub type Row = Vec<Cell>;

/// Split a sequence of cells into rows no wider than `width` columns
pub fn wrap_cells(cells: impl IntoIterator<Item = Cell>, width: usize) -> Vec<Row> {
    let width = width.max(1);
    let mut rows = vec![Row::new()];
    let mut used = 0;

    for cell in cells {
        let w = cell.ch.width().unwrap_or(0);
        if used + w > width && used > 0 {
            rows.push(Row::new());
            used = 0;
        }
        if let Some(row) = rows.last_mut() {
            row.push(cell);
        }
        used += w;
    }
    rows
}

/// Cells of a finished line
pub fn line_cells(line: &StyledLine) -> Vec<Cell> {
    line.segments()
        .iter()
        .flat_map(|segment| {
            segment
                .display_text()
                .chars()
                .enumerate()
                .map(move |(index, ch)| Cell { ch, style: segment.style, index })
        })
        .collect()
}

/// Cells of the open prompt: prompt text, input value, caret
pub fn prompt_cells(prompt: &str, input: &str, caret: &str) -> Vec<Cell> {
    prompt
        .chars()
        .chain(input.chars())
        .chain(caret.chars())
        .enumerate()
        .map(|(index, ch)| Cell { ch, style: Style::Default, index })
        .collect()
}

/// Write a line with ANSI colors (for non-interactive output)
pub fn write_line_ansi<W: Write>(out: &mut W, line: &StyledLine, scheme: &ColorScheme) -> io::Result<()> {
    for cell in line_cells(line) {
        apply_style(out, scheme, cell.style, cell.index)?;
        queue!(out, Print(cell.ch))?;
    }
    queue!(out, SetAttribute(Attribute::Reset), ResetColor, Print("\n"))?;
    Ok(())
}

fn apply_style<W: Write>(out: &mut W, scheme: &ColorScheme, style: Style, index: usize) -> io::Result<()> {
    queue!(out, SetAttribute(Attribute::Reset))?;
    if style == Style::Header {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    queue!(out, SetForegroundColor(scheme.style_fg(style, index).to_crossterm()))?;
    Ok(())
}

/// Terminal renderer
pub struct Renderer {
    /// Finished lines, oldest first
    lines: Vec<StyledLine>,
    /// Rows scrolled back from the newest line
    scroll_offset: usize,
    /// Shifts the rainbow palette
    rainbow_phase: usize,
    scheme: ColorScheme,
    /// Whether the terminal has been initialized
    initialized: bool,
    /// Something changed since the last frame
    dirty: bool,
}

impl Renderer {
    pub fn new(scheme: ColorScheme) -> Self {
        Self {
            lines: Vec::new(),
            scroll_offset: 0,
            rainbow_phase: 0,
            scheme,
            initialized: false,
            dirty: true,
        }
    }

    /// Initialize the terminal for rendering
    pub fn init(&mut self) -> io::Result<()> {
        debug!("renderer init");
        terminal::enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            DisableLineWrap,
            Hide,
            Clear(ClearType::All),
            MoveTo(0, 0)
        )?;

        stdout.flush()?;
        self.initialized = true;
        self.dirty = true;
        Ok(())
    }

    /// Cleanup the terminal
    pub fn cleanup(&mut self) -> io::Result<()> {
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;

        let mut stdout = io::stdout();

        // Reset all attributes first
        let _ = execute!(stdout, ResetColor, SetAttribute(Attribute::Reset));
        let _ = execute!(stdout, Show, EnableLineWrap, LeaveAlternateScreen);
        let _ = stdout.flush();

        // Disable raw mode - this is the most important part
        terminal::disable_raw_mode()?;
        debug!("renderer cleaned up");
        Ok(())
    }

    pub fn needs_redraw(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Move the view `n` rows towards older output
    pub fn scroll_view_up(&mut self, n: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(n);
        self.dirty = true;
    }

    /// Move the view `n` rows towards newer output
    pub fn scroll_view_down(&mut self, n: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
        self.dirty = true;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
        self.dirty = true;
    }

    pub fn is_scrolled(&self) -> bool {
        self.scroll_offset > 0
    }

    /// Shift rainbow colors by one step
    pub fn advance_rainbow(&mut self) {
        self.rainbow_phase = self.rainbow_phase.wrapping_add(1);
        if self.lines.iter().any(|l| l.segments().iter().any(|s| s.style == Style::Rainbow)) {
            self.dirty = true;
        }
    }

    /// Rows visible in a `cols` x `rows` window, prompt last.
    /// Clamps the scroll offset to the available history.
    pub fn visible_rows(&mut self, cols: u16, rows: u16, prompt: &[Cell]) -> Vec<Row> {
        let width = cols as usize;
        let height = (rows as usize).max(1);

        let mut all: Vec<Row> = Vec::new();
        for line in &self.lines {
            all.extend(wrap_cells(line_cells(line), width));
        }
        all.extend(wrap_cells(prompt.iter().copied(), width));

        let max_offset = all.len().saturating_sub(height);
        self.scroll_offset = self.scroll_offset.min(max_offset);

        let end = all.len() - self.scroll_offset;
        let start = end.saturating_sub(height);
        all.drain(start..end).collect()
    }

    /// Draw the scrollback and the prompt
    pub fn render(&mut self, prompt: &str, input: &str, caret: &str) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        let prompt = prompt_cells(prompt, input, caret);
        let visible = self.visible_rows(cols, rows, &prompt);

        // Use a buffered writer for better performance
        let stdout = io::stdout();
        let mut stdout = io::BufWriter::with_capacity(65536, stdout.lock());

        // Begin synchronized update (reduces flicker)
        write!(stdout, "\x1b[?2026h")?;
        queue!(stdout, SetBackgroundColor(self.scheme.background.to_crossterm()))?;

        for y in 0..rows {
            queue!(stdout, MoveTo(0, y))?;
            if let Some(row) = visible.get(y as usize) {
                for cell in row {
                    let index = if cell.style == Style::Rainbow {
                        cell.index.wrapping_add(self.rainbow_phase)
                    } else {
                        cell.index
                    };
                    apply_style(&mut stdout, &self.scheme, cell.style, index)?;
                    queue!(
                        stdout,
                        SetBackgroundColor(self.scheme.background.to_crossterm()),
                        Print(cell.ch)
                    )?;
                }
            }
            queue!(stdout, Clear(ClearType::UntilNewLine))?;
        }

        // Show scroll indicator if scrolled
        if self.is_scrolled() {
            let indicator = format!("[↑ {} lines]", self.scroll_offset);
            let x = cols.saturating_sub(indicator.chars().count() as u16);
            queue!(
                stdout,
                MoveTo(x, 0),
                SetAttribute(Attribute::Reset),
                SetBackgroundColor(self.scheme.background.to_crossterm()),
                SetForegroundColor(self.scheme.indicator_fg.to_crossterm()),
                Print(indicator)
            )?;
        }

        queue!(stdout, SetAttribute(Attribute::Reset), ResetColor)?;

        // End synchronized update
        write!(stdout, "\x1b[?2026l")?;
        stdout.flush()?;

        self.dirty = false;
        Ok(())
    }
}

impl LineSink for Renderer {
    fn push_line(&mut self, line: StyledLine) {
        self.lines.push(line);
        if self.lines.len() > SCROLLBACK_LIMIT {
            let excess = self.lines.len() - SCROLLBACK_LIMIT;
            self.lines.drain(..excess);
        }
        // New output always brings the view back to the newest line
        self.scroll_to_bottom();
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(row: &Row) -> String {
        row.iter().map(|c| c.ch).collect()
    }

    #[test]
    fn test_wrap_ascii() {
        let line = StyledLine::parse("abcdefg");
        let rows = wrap_cells(line_cells(&line), 3);
        let text: Vec<String> = rows.iter().map(row_text).collect();
        assert_eq!(text, vec!["abc", "def", "g"]);
    }

    #[test]
    fn test_wrap_wide_chars() {
        // Each CJK character takes two columns
        let line = StyledLine::parse("a日本");
        let rows = wrap_cells(line_cells(&line), 4);
        let text: Vec<String> = rows.iter().map(row_text).collect();
        assert_eq!(text, vec!["a日", "本"]);
    }

    #[test]
    fn test_line_cells_styles() {
        let line = StyledLine::parse("#Hab#rcd");
        let cells = line_cells(&line);
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0].style, Style::Header);
        assert_eq!(cells[2], Cell { ch: 'c', style: Style::Rainbow, index: 0 });
        assert_eq!(cells[3].index, 1);
    }

    #[test]
    fn test_visible_rows_follow_newest_line() {
        let mut renderer = Renderer::new(ColorScheme::default());
        for i in 0..10 {
            renderer.push_line(StyledLine::parse(&format!("line {}", i)));
        }
        let prompt = prompt_cells("> ", "ls", "_");
        let rows = renderer.visible_rows(20, 3, &prompt);
        let text: Vec<String> = rows.iter().map(row_text).collect();
        assert_eq!(text, vec!["line 8", "line 9", "> ls_"]);
    }

    #[test]
    fn test_scroll_clamps_and_resets() {
        let mut renderer = Renderer::new(ColorScheme::default());
        for i in 0..5 {
            renderer.push_line(StyledLine::parse(&format!("{}", i)));
        }
        let prompt = prompt_cells(">", "", "_");

        renderer.scroll_view_up(100);
        let rows = renderer.visible_rows(10, 2, &prompt);
        let text: Vec<String> = rows.iter().map(row_text).collect();
        assert_eq!(text, vec!["0", "1"]);
        assert!(renderer.is_scrolled());

        renderer.push_line(StyledLine::blank());
        assert!(!renderer.is_scrolled());
    }

    #[test]
    fn test_write_line_ansi_contains_text() {
        let mut out = Vec::new();
        let line = StyledLine::parse("#Hfoo#D=bar");
        write_line_ansi(&mut out, &line, &ColorScheme::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        for ch in "foo=bar".chars() {
            assert!(text.contains(ch));
        }
        assert!(text.ends_with('\n'));
    }
}
