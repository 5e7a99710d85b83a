//! Configuration for the aporia login screen.
//!
//! This module provides:
//! - TOML configuration loading from `/etc/aporia/config.toml`
//! - The session catalog offered in the session picker
//! - The last used session and user, remembered between logins
//! - ASCII-art banners and their welcome messages
//!
//! # Configuration File
//!
//! ```toml
//! # Helper program that verifies credentials (program + arguments)
//! auth_command = ["/usr/libexec/aporia-auth"]
//!
//! # Where the last used session and username are remembered
//! last_session_file = "/var/cache/aporia/last_session.toml"
//!
//! # Banner to show; a random one is picked when unset
//! banner = "aporia"
//!
//! [[sessions]]
//! name = "sway"
//! kind = "wayland"
//! exec = "sway"
//!
//! [[ascii_art]]
//! name = "aporia"
//! art = """
//!  _
//! (_)
//! """
//! messages = ["Welcome back"]
//! ```
//!
//! A missing file gives the defaults. A file that does not parse is an
//! error, so a typo never silently drops the session list.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/aporia/config.toml";

/// Default location of the remembered session
pub const DEFAULT_LAST_SESSION_PATH: &str = "/var/cache/aporia/last_session.toml";

/// Shown when the chosen banner has no messages
pub const FALLBACK_MESSAGE: &str = "SATA ANDAGI";

const DEFAULT_ART: &str = r#"
   __ _ _ __   ___  _ __(_) __ _
  / _` | '_ \ / _ \| '__| |/ _` |
 | (_| | |_) | (_) | |  | | (_| |
  \__,_| .__/ \___/|_|  |_|\__,_|
       |_|"#;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Authentication helper, program followed by its arguments
    pub auth_command: Vec<String>,
    /// Remembered session file
    pub last_session_file: PathBuf,
    /// Banner name to use instead of a random one
    pub banner: Option<String>,
    /// Sessions offered in the picker, in display order
    pub sessions: Vec<Session>,
    /// Available banners
    pub ascii_art: Vec<AsciiArt>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_command: vec!["/usr/libexec/aporia-auth".to_string()],
            last_session_file: PathBuf::from(DEFAULT_LAST_SESSION_PATH),
            banner: None,
            sessions: Vec::new(),
            ascii_art: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or the defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Sessions together with the remembered one
    pub fn catalog(&self) -> SessionCatalog {
        let last = match LastSession::load(&self.last_session_file) {
            Ok(last) => last,
            Err(e) => {
                tracing::warn!("Ignoring last session: {}", e);
                None
            }
        };
        SessionCatalog {
            sessions: self.sessions.clone(),
            last,
        }
    }

    /// Pick the banner to show: the configured one if it exists, otherwise
    /// a random entry, otherwise the built-in art.
    pub fn choose_art(&self) -> AsciiArt {
        if let Some(name) = &self.banner {
            if let Some(art) = self.ascii_art.iter().find(|a| &a.name == name) {
                return art.clone();
            }
            tracing::warn!("Banner '{}' not found", name);
        }
        if self.ascii_art.is_empty() {
            return AsciiArt::default();
        }
        self.ascii_art[random_index(self.ascii_art.len())].clone()
    }
}

/// Kind of graphical (or not) session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Wayland,
    X11,
    #[default]
    Shell,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Wayland => "wayland",
            SessionKind::X11 => "x11",
            SessionKind::Shell => "shell",
        }
    }
}

/// A login target. The default value is the empty descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub name: String,
    pub kind: SessionKind,
    /// Command that starts the session
    pub exec: String,
}

/// Session and user of the last successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastSession {
    pub session: String,
    pub user: String,
}

impl LastSession {
    /// Read the record, `None` if there is none yet
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Write the record, creating the parent directory if needed
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// What the login form is built from
#[derive(Debug, Clone, Default)]
pub struct SessionCatalog {
    pub sessions: Vec<Session>,
    pub last: Option<LastSession>,
}

impl SessionCatalog {
    /// Exact name match
    pub fn find(&self, name: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.sessions.iter().map(|s| s.name.clone()).collect()
    }

    /// Position of the remembered session in the list
    pub fn last_session_index(&self) -> Option<usize> {
        let last = self.last.as_ref()?;
        self.sessions.iter().position(|s| s.name == last.session)
    }

    pub fn last_user(&self) -> Option<&str> {
        self.last.as_ref().map(|l| l.user.as_str())
    }
}

/// A banner and the welcome messages that go with it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AsciiArt {
    pub name: String,
    pub art: String,
    pub messages: Vec<String>,
}

impl Default for AsciiArt {
    fn default() -> Self {
        Self {
            name: "aporia".to_string(),
            art: DEFAULT_ART.trim_start_matches('\n').to_string(),
            messages: vec![FALLBACK_MESSAGE.to_string()],
        }
    }
}

impl AsciiArt {
    /// A random welcome message
    pub fn message(&self) -> String {
        if self.messages.is_empty() {
            return FALLBACK_MESSAGE.to_string();
        }
        self.messages[random_index(self.messages.len())].clone()
    }
}

/// Uniform-enough index in `0..len`. Falls back to 0 without entropy.
fn random_index(len: usize) -> usize {
    let mut buf = [0u8; 4];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u32::from_le_bytes(buf) as usize % len,
        Err(e) => {
            tracing::debug!("No entropy for banner choice: {}", e);
            0
        }
    }
}
