//! Platform Module
//!
//! The seam between the window components and the native windowing system.
//! Everything that touches the OS goes through [`Platform`], so the placement
//! logic can be driven by a real display server or by a scripted fake.

use bitflags::bitflags;
use tracing::warn;

use crate::error::PlatformResult;
use crate::shared::{Point, Rect, Size};
use crate::window::frame::StyleFlags;

/// Opaque, OS-issued identity of a native window
///
/// The OS owns the window's lifetime. This crate only ever borrows the value;
/// creating and destroying the native window is the host's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u32);

/// One attached monitor as reported by the OS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorInfo {
    /// Full monitor rectangle
    pub rect: Rect,
    /// Monitor rectangle minus reserved system UI (panels, docks)
    pub work: Rect,
    pub dpi_x: u32,
    pub dpi_y: u32,
    pub primary: bool,
}

/// Z-order group requested through [`Platform::set_z_order`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrder {
    /// Raise within the current group
    Top,
    /// Enter the always-on-top group
    TopMost,
    /// Leave the always-on-top group
    NoTopMost,
}

/// Visibility commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowCommand {
    Show,
    Hide,
    Minimize,
    Restore,
    Maximize,
}

bitflags! {
    /// Modifiers for [`Platform::set_window_pos`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PosFlags: u32 {
        const NO_MOVE       = 1 << 0;
        const NO_SIZE       = 1 << 1;
        const NO_ZORDER     = 1 << 2;
        const NO_ACTIVATE   = 1 << 3;
        const SHOW_WINDOW   = 1 << 4;
        /// Recompute the non-client frame after a style change
        const FRAME_CHANGED = 1 << 5;
    }
}

/// Native windowing system operations
///
/// Query methods may fail at any time because display topology changes
/// asynchronously; callers decide how to recover. Command methods report OS
/// rejections, which callers log and otherwise ignore.
pub trait Platform {
    /// Outer rectangle of the window, frame included
    fn window_rect(&self, window: WindowHandle) -> PlatformResult<Rect>;

    fn is_visible(&self, window: WindowHandle) -> PlatformResult<bool>;

    fn is_minimized(&self, window: WindowHandle) -> PlatformResult<bool>;

    fn is_maximized(&self, window: WindowHandle) -> PlatformResult<bool>;

    /// All attached monitors
    fn monitors(&self) -> PlatformResult<Vec<MonitorInfo>>;

    /// Size of the primary display, used for fallback descriptors
    fn screen_size(&self) -> Size;

    fn cursor_position(&self) -> PlatformResult<Point>;

    /// Window that currently holds input focus, if any
    fn foreground_window(&self) -> Option<WindowHandle>;

    /// Whether the user asked the system to minimise motion effects
    fn reduce_motion(&self) -> bool;

    fn set_window_pos(
        &mut self,
        window: WindowHandle,
        rect: Rect,
        flags: PosFlags,
    ) -> PlatformResult<()>;

    fn set_style(&mut self, window: WindowHandle, style: StyleFlags) -> PlatformResult<()>;

    fn set_z_order(&mut self, window: WindowHandle, order: ZOrder) -> PlatformResult<()>;

    fn show(&mut self, window: WindowHandle, command: ShowCommand) -> PlatformResult<()>;

    /// Clip the visible part of the window to `region` (window-relative), or
    /// remove the clip when `None`
    fn set_clip_region(&mut self, window: WindowHandle, region: Option<Rect>)
        -> PlatformResult<()>;

    fn set_title(&mut self, window: WindowHandle, title: &str) -> PlatformResult<()>;

    /// Publish the smallest outer size the OS should allow
    fn set_min_track_size(&mut self, window: WindowHandle, size: Size) -> PlatformResult<()>;

    fn activate(&mut self, window: WindowHandle) -> PlatformResult<()>;

    /// Ask for a repaint of the whole window
    fn invalidate(&mut self, window: WindowHandle) -> PlatformResult<()>;

    /// Push buffered requests to the OS
    fn flush(&mut self) -> PlatformResult<()>;
}

/// Log a rejected command and carry on
///
/// OS rejections of geometry or style changes are never fatal; the next
/// resize event brings the in-memory state and the OS back in line.
pub(crate) fn log_rejection(result: PlatformResult<()>, action: &str) {
    if let Err(e) = result {
        warn!("Failed to {}: {}", action, e);
    }
}
