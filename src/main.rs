//! aporia - a console login manager
//!
//! aporia draws an ASCII-art banner on the console, asks for a session,
//! a username and a password, and hands them to an authentication helper.
//!
//! # Features
//!
//! - **Session picker**: choose a session with ←/→
//! - **Remembers you**: the last session and username are preselected
//! - **Banners**: centered ASCII art with a random welcome message
//! - **Small terminals**: oversized art is clipped around its center
//!
//! # Keys
//!
//! | Key | Action |
//! |-----|--------|
//! | ↑ | Previous field |
//! | ↓ / Tab | Next field |
//! | ←/→ | Cycle sessions |
//! | Enter | Next field, or log in from the password field |
//! | Ctrl+C | Quit (exit status 1) |

mod app;
mod config;
mod core;
mod ui;

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::app::{App, Outcome};
use crate::config::{Config, LastSession, DEFAULT_CONFIG_PATH};
use crate::core::auth::CommandAuthenticator;
use crate::core::terminal::{ConsoleTerminal, Terminal};

/// Default log file
const DEFAULT_LOG_PATH: &str = "/var/log/aporia.log";

/// Environment variable holding the log filter
const LOG_ENV: &str = "APORIA_LOG";

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command line options
#[derive(Debug, PartialEq)]
struct Options {
    config: PathBuf,
    log: PathBuf,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG_PATH),
            log: PathBuf::from(DEFAULT_LOG_PATH),
        }
    }
}

/// What the command line asks for
#[derive(Debug, PartialEq)]
enum Action {
    Run(Options),
    Help,
    Version,
}

fn print_help() {
    eprintln!("aporia {} - console login manager", VERSION);
    eprintln!();
    eprintln!("Usage: aporia [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --config <PATH>   Configuration file (default: {})", DEFAULT_CONFIG_PATH);
    eprintln!("  -l, --log <PATH>      Log file (default: {})", DEFAULT_LOG_PATH);
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Log level: {}=debug|info|warn (default: info)", LOG_ENV);
}

fn parse_args<I>(args: I) -> Result<Action, String>
where
    I: IntoIterator<Item = String>,
{
    let mut options = Options::default();
    let mut args = args.into_iter().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Action::Help),
            "-v" | "--version" => return Ok(Action::Version),
            "-c" | "--config" => {
                let path = args.next().ok_or("Missing config path")?;
                options.config = PathBuf::from(path);
            }
            "-l" | "--log" => {
                let path = args.next().ok_or("Missing log path")?;
                options.log = PathBuf::from(path);
            }
            other => {
                return Err(format!("Unknown argument: {}. Use -h for help.", other));
            }
        }
    }

    Ok(Action::Run(options))
}

/// Log to a file; the console belongs to the login screen.
fn init_logging(path: &Path) {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    let options = match parse_args(env::args()) {
        Ok(Action::Run(options)) => options,
        Ok(Action::Help) => {
            print_help();
            return Ok(());
        }
        Ok(Action::Version) => {
            eprintln!("aporia {}", VERSION);
            return Ok(());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    init_logging(&options.log);
    info!("aporia {} starting...", VERSION);

    let config = Config::load(&options.config)?;
    let catalog = config.catalog();
    let art = config.choose_art();
    info!("Sessions: {}", catalog.sessions.len());
    info!("Banner: {}", art.name);

    let mut auth = CommandAuthenticator::new(config.auth_command.clone());

    let terminal = ConsoleTerminal::open().context("Terminal unavailable")?;
    let size = terminal.size()?;
    info!("Terminal size: {}x{}", size.cols, size.rows);

    let mut app = App::new(size, catalog, &art);
    let stdout = io::stdout();
    // The terminal is moved in and restored before `run` returns
    let outcome = app.run(terminal, &mut auth, &mut stdout.lock())?;
    info!("Login screen closed: {}", app.message());

    match outcome {
        Outcome::Interrupted => {
            info!("Exiting on interrupt");
            std::process::exit(1);
        }
        Outcome::LoggedIn { session, username } => {
            info!(user = %username, session = %session.name, "Logged in");
            let last = LastSession {
                session: session.name,
                user: username,
            };
            if let Err(e) = last.save(&config.last_session_file) {
                warn!("Could not remember session: {}", e);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("aporia")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_defaults() {
        assert_eq!(parse_args(args(&[])), Ok(Action::Run(Options::default())));
    }

    #[test]
    fn test_paths() {
        let action = parse_args(args(&["-c", "/tmp/a.toml", "--log", "/tmp/a.log"])).unwrap();
        assert_eq!(
            action,
            Action::Run(Options {
                config: PathBuf::from("/tmp/a.toml"),
                log: PathBuf::from("/tmp/a.log"),
            })
        );
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(parse_args(args(&["--help"])), Ok(Action::Help));
        assert_eq!(parse_args(args(&["-v"])), Ok(Action::Version));
    }

    #[test]
    fn test_errors() {
        assert!(parse_args(args(&["--config"])).is_err());
        assert!(parse_args(args(&["--bogus"])).unwrap_err().contains("--bogus"));
    }
}
