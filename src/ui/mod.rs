//! User interface rendering and input handling.
//!
//! - **keymapper**: raw key sequences to keys and form commands
//! - **field**: session picker and text inputs
//! - **form**: the login form and its focus
//! - **banner**: ASCII-art banner centering and clipping
//! - **renderer**: draws a frame with crossterm

pub mod banner;
pub mod field;
pub mod form;
pub mod keymapper;
pub mod renderer;

pub use banner::Banner;
pub use form::Form;
pub use keymapper::{Command, KeyMapper};
pub use renderer::{Frame, Renderer};
