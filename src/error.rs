//! Platform error type
//!
//! Errors raised at the OS seam. None of these are fatal: callers either fall
//! back to a conservative default or log and carry on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("X11 connection error: {0}")]
    Connection(#[from] x11rb::errors::ConnectionError),

    #[error("X11 request failed: {0}")]
    Reply(#[from] x11rb::errors::ReplyError),

    #[error("X11 id allocation failed: {0}")]
    ReplyOrId(#[from] x11rb::errors::ReplyOrIdError),

    #[error("required X11 extension {0} is not available")]
    MissingExtension(&'static str),

    #[error("window {0:#x} does not exist")]
    NoWindow(u32),

    #[error("no monitors are attached")]
    NoMonitors,

    #[error("request rejected: {0}")]
    Rejected(String),
}

pub type PlatformResult<T> = std::result::Result<T, PlatformError>;
