//! Frame Module
//!
//! Window style flags and the non-client geometry they imply: how many pixels
//! the frame adds around a client area at a given DPI, and the smallest
//! window the OS may track.

use bitflags::bitflags;

use crate::config::DecorationConfig;
use crate::shared::geometry::{px_per_dip, scale_for_dpi};
use crate::shared::{Rect, Size};
use crate::window::snap::{Axis, SnapCallback};
use crate::window::state::DisplayMode;

/// Smallest client width, in logical units
pub const MINIMUM_CLIENT_WIDTH: f32 = 460.0;
/// Smallest client height, in logical units
pub const MINIMUM_CLIENT_HEIGHT: f32 = 172.0;

bitflags! {
    /// Native window style, always derived from the display mode
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StyleFlags: u32 {
        const CAPTION      = 1 << 0;
        const SYSMENU      = 1 << 1;
        /// Thick, user-resizable frame
        const SIZEBOX      = 1 << 2;
        const MINIMIZEBOX  = 1 << 3;
        const MAXIMIZEBOX  = 1 << 4;
        /// Thin one-pixel border
        const BORDER       = 1 << 5;
        const POPUP        = 1 << 6;
        /// Raised edge drawn around unfocused windows
        const WINDOWEDGE   = 1 << 7;

        const OVERLAPPED_WINDOW = Self::CAPTION.bits()
            | Self::SYSMENU.bits()
            | Self::SIZEBOX.bits()
            | Self::MINIMIZEBOX.bits()
            | Self::MAXIMIZEBOX.bits();
    }
}

impl StyleFlags {
    /// Style for a display mode
    ///
    /// `fullscreen` wins over everything else, so a borderless window that is
    /// also flagged fullscreen gets the fullscreen style.
    pub fn for_mode(mode: DisplayMode, fullscreen: bool) -> Self {
        if fullscreen || mode == DisplayMode::Fullscreen {
            return Self::POPUP;
        }
        match mode {
            DisplayMode::Borderless => Self::BORDER | Self::SIZEBOX | Self::WINDOWEDGE,
            _ => Self::OVERLAPPED_WINDOW | Self::WINDOWEDGE,
        }
    }

    pub fn has_caption(self) -> bool {
        self.contains(Self::CAPTION)
    }

    pub fn is_resizable(self) -> bool {
        self.contains(Self::SIZEBOX)
    }
}

/// Frame dimensions at 96 DPI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMetrics {
    pub titlebar_height: i32,
    pub border_width: i32,
    /// Invisible grab area outside the visible border
    pub resize_border: i32,
}

impl Default for FrameMetrics {
    fn default() -> Self {
        Self {
            titlebar_height: 32,
            border_width: 1,
            resize_border: 8,
        }
    }
}

impl From<&DecorationConfig> for FrameMetrics {
    fn from(config: &DecorationConfig) -> Self {
        Self {
            titlebar_height: config.titlebar_height as i32,
            border_width: config.border_width as i32,
            resize_border: config.resize_border as i32,
        }
    }
}

impl FrameMetrics {
    /// Margins of the frame relative to the client area
    ///
    /// `left` and `top` are negative, `right` and `bottom` positive. The top
    /// margin includes the titlebar.
    pub fn frame_margins(&self, dpi: u32, style: StyleFlags) -> Rect {
        let side = if style.is_resizable() {
            scale_for_dpi(self.resize_border + self.border_width, dpi)
        } else if style.contains(StyleFlags::BORDER) {
            scale_for_dpi(self.border_width, dpi)
        } else {
            0
        };
        let caption = if style.has_caption() {
            scale_for_dpi(self.titlebar_height, dpi)
        } else {
            0
        };
        Rect::new(-side, -(side + caption), side, side)
    }

    /// Extra width and height the frame adds around a client area
    pub fn exclusive_size(&self, dpi: u32, style: StyleFlags) -> Size {
        let margins = self.frame_margins(dpi, style);
        Size::new(margins.width(), margins.height())
    }

    /// Smallest client area in physical pixels at `dpi`
    ///
    /// Rounded up, so the result is never below the logical minimum.
    pub fn minimum_client_size(&self, dpi: u32) -> Size {
        let scale = px_per_dip(dpi);
        Size::new(
            (MINIMUM_CLIENT_WIDTH * scale).ceil() as i32,
            (MINIMUM_CLIENT_HEIGHT * scale).ceil() as i32,
        )
    }

    /// Smallest outer window size the OS may track at `dpi`
    ///
    /// Without a snap callback (for example while the window is still being
    /// created) the logical minimum is used as is.
    pub fn minimum_track_size(
        &self,
        dpi: u32,
        style: StyleFlags,
        snap: Option<&SnapCallback>,
    ) -> Size {
        let scale = px_per_dip(dpi);
        let (width, height) = match snap {
            Some(snap) => (
                snap(Axis::Width, MINIMUM_CLIENT_WIDTH),
                snap(Axis::Height, MINIMUM_CLIENT_HEIGHT),
            ),
            None => (MINIMUM_CLIENT_WIDTH, MINIMUM_CLIENT_HEIGHT),
        };
        let floor = self.minimum_client_size(dpi);
        let client = Size::new(
            ((width * scale).round() as i32).max(floor.width),
            ((height * scale).round() as i32).max(floor.height),
        );
        client + self.exclusive_size(dpi, style)
    }
}
