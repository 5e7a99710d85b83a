//! Login screen state and event loop.
//!
//! The loop is single threaded: read one key sequence, act on it, redraw.
//! A login attempt moves the screen through
//!
//! ```text
//! Editing --Enter on last field--> Authenticating --ok--> LoggedIn
//!                                        |
//!                                        +--failure--> Editing (password cleared)
//! ```
//!
//! The authenticator runs in cooked mode; raw mode is restored as soon as it
//! returns, whatever the result.

use std::io::Write;

use tracing::{debug, info, warn};

use crate::config::{AsciiArt, Session, SessionCatalog};
use crate::core::auth::Authenticator;
use crate::core::terminal::{TermSize, Terminal, TerminalError};
use crate::ui::{Banner, Command, Form, Frame, KeyMapper, Renderer};

/// Status message after a successful login
pub const SUCCESS_MESSAGE: &str = "Success!";

/// How the login screen ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    LoggedIn { session: Session, username: String },
    /// Ctrl+C
    Interrupted,
}

/// Login screen state
pub struct App {
    size: TermSize,
    form: Form,
    catalog: SessionCatalog,
    banner: Banner,
    message: String,
    logged_in: bool,
    /// Clear the screen on the next draw
    full_redraw: bool,
}

impl App {
    pub fn new(size: TermSize, catalog: SessionCatalog, art: &AsciiArt) -> Self {
        Self {
            size,
            form: Form::login(&catalog),
            catalog,
            banner: Banner::new(&art.art),
            message: art.message(),
            logged_in: false,
            full_redraw: true,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Run until login or Ctrl+C. The terminal is released before this
    /// returns, so the caller can exit right away.
    pub fn run<T, A, W>(&mut self, mut term: T, auth: &mut A, out: &mut W) -> Result<Outcome, TerminalError>
    where
        T: Terminal,
        A: Authenticator,
        W: Write,
    {
        self.full_redraw = true;
        self.draw(&term, out)?;

        loop {
            let bytes = match term.read_key() {
                Ok(bytes) => bytes,
                Err(TerminalError::Closed) => return Err(TerminalError::Closed),
                Err(e) => {
                    warn!("Key read failed: {}", e);
                    self.message = e.to_string();
                    self.draw(&term, out)?;
                    continue;
                }
            };

            if let Some(outcome) = self.handle_input(&bytes, &mut term, auth) {
                return Ok(outcome);
            }
            self.draw(&term, out)?;
        }
    }

    /// Act on one key sequence. Returns the outcome when the screen is done.
    pub fn handle_input<T, A>(&mut self, bytes: &[u8], term: &mut T, auth: &mut A) -> Option<Outcome>
    where
        T: Terminal,
        A: Authenticator,
    {
        match KeyMapper::command(KeyMapper::decode(bytes)) {
            Command::FocusPrev => self.form.focus_prev(),
            Command::FocusNext => self.form.focus_next(),
            Command::Submit => {
                if self.form.is_last_field() {
                    return self.login(term, auth);
                }
                self.form.focus_next();
            }
            Command::Abort => {
                info!("Interrupted");
                return Some(Outcome::Interrupted);
            }
            Command::Edit(key) => self.form.handle(&key),
        }
        None
    }

    fn login<T, A>(&mut self, term: &mut T, auth: &mut A) -> Option<Outcome>
    where
        T: Terminal,
        A: Authenticator,
    {
        // Both results show different field contents
        self.full_redraw = true;

        let credentials = self.form.credentials();
        let session = self.resolve_session(credentials.session.as_deref());
        info!(user = %credentials.username, session = %session.name, "Login attempt");

        let result = with_cooked_mode(term, || {
            auth.authenticate(&credentials.username, &credentials.password, &session)
        });

        match result {
            Ok(()) => {
                info!(user = %credentials.username, "Login succeeded");
                self.message = SUCCESS_MESSAGE.to_string();
                self.logged_in = true;
                Some(Outcome::LoggedIn {
                    session,
                    username: credentials.username,
                })
            }
            Err(e) => {
                warn!(user = %credentials.username, "Login failed: {}", e);
                self.message = status_line(&e.to_string());
                self.form.reset_password();
                None
            }
        }
    }

    /// Exact name lookup. An unknown or missing name yields the empty
    /// descriptor; the authenticator decides what that means.
    fn resolve_session(&self, name: Option<&str>) -> Session {
        match name.and_then(|name| self.catalog.find(name)) {
            Some(session) => session.clone(),
            None => {
                warn!(session = ?name, "No matching session, using an empty one");
                Session::default()
            }
        }
    }

    fn draw<T: Terminal, W: Write>(&mut self, term: &T, out: &mut W) -> Result<(), TerminalError> {
        match term.size() {
            Ok(size) if size != self.size => {
                debug!("Resized to {}x{}", size.cols, size.rows);
                self.size = size;
                // Rows outside the new layout still hold the old frame
                self.full_redraw = true;
            }
            Ok(_) => {}
            Err(e) => debug!("Keeping previous size: {}", e),
        }
        let frame = Frame {
            size: self.size,
            banner: &self.banner,
            form: &self.form,
            message: &self.message,
            full_redraw: self.full_redraw,
        };
        Renderer::draw(out, &frame).map_err(TerminalError::Draw)?;
        self.full_redraw = false;
        Ok(())
    }
}

#[cfg(test)]
impl App {
    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn needs_full_redraw(&self) -> bool {
        self.full_redraw
    }
}

/// First non-blank line of `text` with control characters blanked, so a
/// helper's multi-line or colored output cannot break the frame.
fn status_line(text: &str) -> String {
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    line.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Run `f` with the terminal in cooked mode and switch back to raw mode
/// afterwards, even when `f` reports a failure.
fn with_cooked_mode<T, R, F>(term: &mut T, f: F) -> R
where
    T: Terminal,
    F: FnOnce() -> R,
{
    if let Err(e) = term.enter_cooked() {
        warn!("Could not leave raw mode: {}", e);
    }
    let result = f();
    if let Err(e) = term.enter_raw() {
        warn!("Could not restore raw mode: {}", e);
    }
    result
}
