//! Window placement and display state
//!
//! Everything here talks to the OS through [`platform::Platform`] only.

pub mod animation;
pub mod frame;
pub mod monitor;
pub mod placement;
pub mod platform;
pub mod shell;
pub mod snap;
pub mod state;
pub mod summon;

#[cfg(test)]
pub mod testing;

pub use platform::{Platform, WindowHandle};
pub use shell::{ContentHost, MessageResult, ShellMessage, WindowEvent, WindowShell};
pub use state::DisplayMode;
