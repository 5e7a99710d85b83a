//! External collaborators of the login screen.
//!
//! - **terminal**: raw mode guard, terminal size, key sequence reads
//! - **auth**: credential verification for a chosen session
//!
//! Both are reached through traits so the login loop can be driven by
//! scripted input in tests.

pub mod auth;
pub mod terminal;
