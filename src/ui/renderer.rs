//! Login screen renderer using crossterm
//!
//! Draws the banner, the status message and the form. Every frame starts
//! from the top-left corner; a full redraw clears the screen first.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{Clear, ClearType},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::banner::Banner;
use super::field::Field;
use super::form::Form;
use crate::core::terminal::TermSize;

/// Widest the form gets, in columns
pub const FORM_WIDTH: usize = 40;

/// Marks the focused field
const FOCUS_MARKER: &str = "> ";

/// Everything one frame shows
pub struct Frame<'a> {
    pub size: TermSize,
    pub banner: &'a Banner,
    pub form: &'a Form,
    pub message: &'a str,
    /// Clear the whole screen before drawing
    pub full_redraw: bool,
}

/// Take up to `width` display columns of `text` after skipping `skip`
/// columns. A wide glyph cut by the left edge is replaced with blanks so the
/// rest keeps its position; one cut by the right edge is dropped.
pub fn fit_columns(text: &str, skip: usize, width: usize) -> String {
    let mut out = String::new();
    let mut col = 0;
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        let start = col;
        col += w;
        if col <= skip {
            continue;
        }
        let visible = if start < skip { col - skip } else { w };
        if used + visible > width {
            break;
        }
        if visible < w {
            out.extend(std::iter::repeat(' ').take(visible));
        } else {
            out.push(ch);
        }
        used += visible;
    }
    out
}

/// The longest suffix of `text` that fits in `width` columns
pub fn tail_columns(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut start = text.len();
    for (idx, ch) in text.char_indices().rev() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = idx;
    }
    text[start..].to_string()
}

/// Screen positions of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FormLayout {
    message_row: usize,
    first_field_row: usize,
    col: usize,
    width: usize,
}

impl FormLayout {
    /// Below the banner, pulled up if it would run off the screen
    fn new(size: TermSize, banner_bottom: usize, fields: usize) -> Self {
        let rows = size.rows as usize;
        let cols = size.cols as usize;
        let width = cols.min(FORM_WIDTH);
        // message, blank line, fields
        let height = 2 + fields;
        let top = (banner_bottom + 1).min(rows.saturating_sub(height));
        Self {
            message_row: top,
            first_field_row: top + 2,
            col: (cols - width) / 2,
            width,
        }
    }
}

/// Login screen renderer
pub struct Renderer;

impl Renderer {
    /// Draw one frame to `out`
    pub fn draw<W: Write>(out: &mut W, frame: &Frame) -> io::Result<()> {
        let rows = frame.size.rows as usize;
        let cols = frame.size.cols as usize;

        queue!(out, Hide)?;
        if frame.full_redraw {
            queue!(out, Clear(ClearType::All))?;
        }
        queue!(out, MoveTo(0, 0))?;

        let layout = frame.banner.layout(frame.size);
        for (i, line) in frame.banner.excerpt(&layout).iter().enumerate() {
            Self::draw_line(out, layout.row + i, layout.col, line)?;
        }

        let form_layout = FormLayout::new(frame.size, layout.row + layout.lines, frame.form.len());

        if form_layout.message_row < rows {
            let message = fit_columns(frame.message, 0, cols);
            let col = (cols - message.width()) / 2;
            Self::draw_line(out, form_layout.message_row, col, &message)?;
        }

        let mut cursor = None;
        for (i, field) in frame.form.fields().iter().enumerate() {
            let row = form_layout.first_field_row + i;
            if row >= rows {
                break;
            }
            let focused = i == frame.form.focus();
            let marker = if focused { FOCUS_MARKER } else { "  " };
            let marker = fit_columns(marker, 0, form_layout.width);
            let text = field.render(form_layout.width - marker.width());

            queue!(out, MoveTo(0, row as u16), Clear(ClearType::CurrentLine))?;
            queue!(out, MoveTo(form_layout.col as u16, row as u16), Print(&marker))?;
            if focused {
                queue!(out, SetAttribute(Attribute::Bold), Print(&text), SetAttribute(Attribute::Reset))?;
                if let Field::TextInput(_) = field {
                    cursor = Some((form_layout.col + marker.width() + text.width(), row));
                }
            } else {
                queue!(out, Print(&text))?;
            }
        }

        if let Some((col, row)) = cursor {
            let col = col.min(cols.saturating_sub(1));
            queue!(out, MoveTo(col as u16, row as u16), Show)?;
        }
        out.flush()
    }

    fn draw_line<W: Write>(out: &mut W, row: usize, col: usize, text: &str) -> io::Result<()> {
        queue!(
            out,
            MoveTo(0, row as u16),
            Clear(ClearType::CurrentLine),
            MoveTo(col as u16, row as u16),
            Print(text)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LastSession, Session, SessionCatalog};
    use crate::ui::keymapper::Key;

    fn form() -> Form {
        Form::login(&SessionCatalog {
            sessions: vec![Session {
                name: "sway".to_string(),
                ..Session::default()
            }],
            last: Some(LastSession {
                session: "sway".to_string(),
                user: "alice".to_string(),
            }),
        })
    }

    fn draw(frame: &Frame) -> String {
        let mut out = Vec::new();
        Renderer::draw(&mut out, frame).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_fit_columns() {
        assert_eq!(fit_columns("hello", 0, 3), "hel");
        assert_eq!(fit_columns("hello", 2, 10), "llo");
        assert_eq!(fit_columns("hello", 9, 10), "");
        assert_eq!(fit_columns("日本", 0, 3), "日");
        assert_eq!(fit_columns("日本", 1, 4), " 本");
    }

    #[test]
    fn test_tail_columns() {
        assert_eq!(tail_columns("username", 4), "name");
        assert_eq!(tail_columns("abc", 10), "abc");
        assert_eq!(tail_columns("日本語", 5), "本語");
        assert_eq!(tail_columns("abc", 0), "");
    }

    #[test]
    fn test_full_redraw_clears_first() {
        let banner = Banner::new("BANNER");
        let form = form();
        let output = draw(&Frame {
            size: TermSize::new(24, 80),
            banner: &banner,
            form: &form,
            message: "Welcome",
            full_redraw: true,
        });
        let clear = output.find("\x1b[2J").expect("screen cleared");
        let home = output.find("\x1b[1;1H").expect("cursor homed");
        let art = output.find("BANNER").expect("banner drawn");
        assert!(clear < art && home < art);
        assert!(output.contains("Welcome"));
        assert!(output.contains("< sway >"));
        assert!(output.contains("username: alice"));
    }

    #[test]
    fn test_incremental_redraw_starts_top_left() {
        let banner = Banner::new("BANNER");
        let form = form();
        let output = draw(&Frame {
            size: TermSize::new(24, 80),
            banner: &banner,
            form: &form,
            message: "",
            full_redraw: false,
        });
        assert!(!output.contains("\x1b[2J"));
        let home = output.find("\x1b[1;1H").expect("cursor homed");
        assert!(home < output.find("BANNER").unwrap());
    }

    #[test]
    fn test_password_never_drawn() {
        let banner = Banner::new("x");
        let mut form = form();
        form.focus_next();
        for ch in "s3cr3t".chars() {
            form.handle(&Key::Char(ch));
        }
        let output = draw(&Frame {
            size: TermSize::new(24, 80),
            banner: &banner,
            form: &form,
            message: "",
            full_redraw: true,
        });
        assert!(!output.contains("s3cr3t"));
        assert!(output.contains("password: ******"));
    }

    #[test]
    fn test_form_stays_on_small_screen() {
        let banner = Banner::new(&vec!["#".repeat(100); 50].join("\n"));
        let form = form();
        let layout = FormLayout::new(TermSize::new(10, 20), 10, form.len());
        assert_eq!(layout.message_row, 5);
        assert_eq!(layout.first_field_row + form.len(), 10);
        assert_eq!(layout.width, 20);

        // Drawing must not panic or write past the screen
        draw(&Frame {
            size: TermSize::new(10, 20),
            banner: &banner,
            form: &form,
            message: "a message longer than the screen is wide",
            full_redraw: true,
        });
        draw(&Frame {
            size: TermSize::new(1, 1),
            banner: &banner,
            form: &form,
            message: "",
            full_redraw: true,
        });
    }
}
