//! Area Window
//!
//! Display-state management for a single top-level window: monitor and DPI
//! aware placement, snapped resizing, fullscreen, focus and quake modes, and
//! the summon/dismiss animation.

pub mod config;
pub mod error;
pub mod shared;
pub mod window;
pub mod x11;
pub mod x11_async;
