//! ASCII-art banner and its placement on screen.
//!
//! The banner is centered in the terminal. When the terminal is smaller than
//! the art in either direction, the middle of the art is shown instead of
//! failing, so a small console still gets a recognisable excerpt.

use unicode_width::UnicodeWidthStr;

use super::renderer::fit_columns;
use crate::core::terminal::TermSize;

/// Immutable banner text, measured in display columns
#[derive(Debug, Clone)]
pub struct Banner {
    lines: Vec<String>,
    width: usize,
}

/// Where and which part of the banner is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BannerLayout {
    /// First screen row
    pub row: usize,
    /// First screen column
    pub col: usize,
    /// Banner lines skipped at the top
    pub skip_lines: usize,
    /// Banner columns skipped on the left
    pub skip_cols: usize,
    /// Number of lines drawn
    pub lines: usize,
    /// Maximum number of columns drawn per line
    pub cols: usize,
}

impl Banner {
    pub fn new(art: &str) -> Self {
        let lines: Vec<String> = art
            .trim_end_matches(|c: char| c == '\r' || c == '\n')
            .split('\n')
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect();
        let width = lines.iter().map(|l| l.width()).max().unwrap_or(0);
        Self { lines, width }
    }

    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// Center the banner in `size`, clipping symmetrically when it does not fit
    pub fn layout(&self, size: TermSize) -> BannerLayout {
        let (rows, cols) = (size.rows as usize, size.cols as usize);
        let skip_lines = self.height().saturating_sub(rows) / 2;
        let skip_cols = self.width.saturating_sub(cols) / 2;
        BannerLayout {
            row: rows.saturating_sub(self.height()) / 2,
            col: cols.saturating_sub(self.width) / 2,
            skip_lines,
            skip_cols,
            lines: (self.height() - skip_lines).min(rows),
            cols: (self.width - skip_cols).min(cols),
        }
    }

    /// The lines to draw for `layout`, already clipped
    pub fn excerpt(&self, layout: &BannerLayout) -> Vec<String> {
        self.lines
            .iter()
            .skip(layout.skip_lines)
            .take(layout.lines)
            .map(|line| fit_columns(line, layout.skip_cols, layout.cols))
            .collect()
    }
}
