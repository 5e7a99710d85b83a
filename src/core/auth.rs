//! Credential verification
//!
//! The login screen hands (username, password, session) to an
//! [`Authenticator`] and only cares whether it succeeded. The stock
//! implementation delegates to an external helper program so that the
//! PAM (or other) stack stays outside this process.

use std::io::{self, Write};
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::config::Session;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The credentials were refused; the text is shown to the user
    #[error("{0}")]
    Rejected(String),

    #[error("No authentication command configured")]
    NotConfigured,

    #[error("Failed to start authentication helper: {0}")]
    Spawn(#[source] io::Error),

    #[error("Authentication helper failed: {0}")]
    Io(#[source] io::Error),
}

pub trait Authenticator {
    /// Verify the credentials for `session`. `Ok` means logged in.
    fn authenticate(&mut self, username: &str, password: &str, session: &Session) -> Result<(), AuthError>;
}

/// Runs a helper program for every login attempt.
///
/// The password is written to the helper's stdin followed by a newline.
/// The user and session are passed in the environment:
///
/// | Variable | Value |
/// |----------|-------|
/// | `APORIA_USER` | username |
/// | `APORIA_SESSION` | session name |
/// | `APORIA_SESSION_KIND` | `wayland`, `x11` or `shell` |
/// | `APORIA_SESSION_EXEC` | session command |
///
/// Exit status 0 means success. Otherwise the helper's stderr (or its exit
/// status when stderr is empty) becomes the failure message.
pub struct CommandAuthenticator {
    command: Vec<String>,
}

impl CommandAuthenticator {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl Authenticator for CommandAuthenticator {
    fn authenticate(&mut self, username: &str, password: &str, session: &Session) -> Result<(), AuthError> {
        let (program, args) = self.command.split_first().ok_or(AuthError::NotConfigured)?;

        let mut child = Command::new(program)
            .args(args)
            .env("APORIA_USER", username)
            .env("APORIA_SESSION", &session.name)
            .env("APORIA_SESSION_KIND", session.kind.as_str())
            .env("APORIA_SESSION_EXEC", &session.exec)
            .stdin(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(AuthError::Spawn)?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = writeln!(stdin, "{}", password) {
                // The helper may decide without reading the password
                if e.kind() != io::ErrorKind::BrokenPipe {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(AuthError::Io(e));
                }
            }
        }

        let output = child.wait_with_output().map_err(AuthError::Io)?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = stderr.trim();
        if message.is_empty() {
            Err(AuthError::Rejected(format!("Login failed ({})", output.status)))
        } else {
            Err(AuthError::Rejected(message.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandAuthenticator {
        CommandAuthenticator::new(vec!["sh".to_string(), "-c".to_string(), script.to_string()])
    }

    #[test]
    fn test_not_configured() {
        let mut auth = CommandAuthenticator::new(Vec::new());
        let err = auth.authenticate("alice", "pw", &Session::default()).unwrap_err();
        assert!(matches!(err, AuthError::NotConfigured));
    }

    #[test]
    fn test_rejected_message_is_displayable() {
        let err = AuthError::Rejected("bad password".to_string());
        assert_eq!(err.to_string(), "bad password");
    }

    #[test]
    #[cfg(unix)]
    fn test_helper_receives_credentials() {
        let mut auth = sh(
            r#"read pw; [ "$pw" = secret ] && [ "$APORIA_USER" = alice ] && [ "$APORIA_SESSION" = sway ] && [ "$APORIA_SESSION_KIND" = wayland ]"#,
        );
        let session = Session {
            name: "sway".to_string(),
            kind: crate::config::SessionKind::Wayland,
            exec: "sway".to_string(),
        };
        assert!(auth.authenticate("alice", "secret", &session).is_ok());
        assert!(auth.authenticate("alice", "wrong", &session).is_err());
    }

    #[test]
    #[cfg(unix)]
    fn test_helper_stderr_becomes_message() {
        let mut auth = sh("echo 'bad password' >&2; exit 1");
        let err = auth.authenticate("alice", "pw", &Session::default()).unwrap_err();
        assert_eq!(err.to_string(), "bad password");
    }

    #[test]
    #[cfg(unix)]
    fn test_helper_silent_failure() {
        let mut auth = sh("exit 3");
        let err = auth.authenticate("alice", "pw", &Session::default()).unwrap_err();
        assert!(err.to_string().starts_with("Login failed"));
    }

    #[test]
    fn test_missing_helper() {
        let mut auth = CommandAuthenticator::new(vec!["/nonexistent/aporia-auth".to_string()]);
        let err = auth.authenticate("alice", "pw", &Session::default()).unwrap_err();
        assert!(matches!(err, AuthError::Spawn(_)));
    }
}
