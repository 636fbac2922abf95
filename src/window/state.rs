//! Display State Module
//!
//! Owns the window's display mode and the geometry saved to leave it. Every
//! transition recomputes the style from the mode, so flags are never toggled
//! piecemeal. Transitions requested from the wrong mode are ignored.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::shared::geometry::mul_div;
use crate::shared::{Point, Rect, Size, WindowGeometry};
use crate::window::frame::{FrameMetrics, StyleFlags};
use crate::window::monitor::{MonitorDescriptor, MonitorService};
use crate::window::platform::{log_rejection, Platform, PosFlags, ShowCommand, WindowHandle, ZOrder};

/// Display modes. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    Normal,
    Maximized,
    Fullscreen,
    /// No caption or border, still resizable ("focus" mode)
    Borderless,
    /// Docked to the top of its monitor, only the bottom edge resizes
    Quake,
}

/// Everything needed to undo a fullscreen transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreSnapshot {
    /// Window rectangle and the DPI of its monitor before fullscreen
    pub window: WindowGeometry,
    pub was_maximized: bool,
    /// Work area of that monitor before fullscreen
    pub work: Rect,
    /// Mode to return to
    pub prior_mode: DisplayMode,
}

/// Display-state machine for one window
#[derive(Debug)]
pub struct DisplayState {
    mode: DisplayMode,
    /// Present exactly while the mode is fullscreen
    snapshot: Option<RestoreSnapshot>,
    always_on_top: bool,
    metrics: FrameMetrics,
}

impl DisplayState {
    /// Create a new state machine in normal mode
    pub fn new(metrics: FrameMetrics) -> Self {
        Self {
            mode: DisplayMode::Normal,
            snapshot: None,
            always_on_top: false,
            metrics,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn is_fullscreen(&self) -> bool {
        self.mode == DisplayMode::Fullscreen
    }

    pub fn is_quake(&self) -> bool {
        self.mode == DisplayMode::Quake
    }

    pub fn snapshot(&self) -> Option<&RestoreSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn always_on_top(&self) -> bool {
        self.always_on_top
    }

    pub fn metrics(&self) -> &FrameMetrics {
        &self.metrics
    }

    pub fn set_metrics(&mut self, metrics: FrameMetrics) {
        self.metrics = metrics;
    }

    /// Style for the current mode
    pub fn style(&self) -> StyleFlags {
        StyleFlags::for_mode(self.mode, self.is_fullscreen())
    }

    /// Enter fullscreen on the monitor nearest the window
    ///
    /// Valid from normal, maximized and borderless. Returns whether the
    /// transition ran.
    pub fn enter_fullscreen<P: Platform + ?Sized>(&mut self, os: &mut P, window: WindowHandle) -> bool {
        if !matches!(
            self.mode,
            DisplayMode::Normal | DisplayMode::Maximized | DisplayMode::Borderless
        ) {
            debug!("Ignoring fullscreen request in {:?} mode", self.mode);
            return false;
        }

        let current = Self::current_rect(&*os, window);
        let monitor = MonitorService::from_rect(&*os, current);
        let was_maximized = os
            .is_maximized(window)
            .unwrap_or(self.mode == DisplayMode::Maximized);

        self.snapshot = Some(RestoreSnapshot {
            window: WindowGeometry::new(current, monitor.dpi()),
            was_maximized,
            work: monitor.work,
            prior_mode: self.mode,
        });
        self.mode = DisplayMode::Fullscreen;
        info!("Entering fullscreen on monitor {:?}", monitor.rect);

        self.apply_style(os, window);
        log_rejection(
            os.set_window_pos(window, monitor.rect, PosFlags::NO_ZORDER | PosFlags::FRAME_CHANGED),
            "resize window to monitor",
        );
        true
    }

    /// Leave fullscreen, restoring the saved geometry
    ///
    /// A window that was maximized is simply re-maximized. Otherwise the
    /// saved rectangle is corrected for DPI and work-area changes and kept
    /// on screen.
    pub fn exit_fullscreen<P: Platform + ?Sized>(&mut self, os: &mut P, window: WindowHandle) -> bool {
        if self.mode != DisplayMode::Fullscreen {
            debug!("Ignoring fullscreen exit in {:?} mode", self.mode);
            return false;
        }
        let Some(snapshot) = self.snapshot.take() else {
            warn!("Fullscreen without a restore snapshot, returning to normal");
            self.mode = DisplayMode::Normal;
            self.apply_style(os, window);
            return true;
        };

        self.mode = match snapshot.prior_mode {
            DisplayMode::Borderless => DisplayMode::Borderless,
            _ if snapshot.was_maximized => DisplayMode::Maximized,
            _ => DisplayMode::Normal,
        };
        info!("Leaving fullscreen for {:?}", self.mode);
        self.apply_style(os, window);

        if snapshot.was_maximized {
            log_rejection(os.show(window, ShowCommand::Maximize), "maximize window");
            log_rejection(
                os.set_window_pos(
                    window,
                    Rect::default(),
                    PosFlags::NO_MOVE | PosFlags::NO_SIZE | PosFlags::NO_ZORDER | PosFlags::FRAME_CHANGED,
                ),
                "refresh window frame",
            );
            return true;
        }

        let monitor = MonitorService::from_window(&*os, window);
        let nc = self.metrics.exclusive_size(monitor.dpi(), self.style());
        let restored = restored_rect(&snapshot, &monitor, nc);
        log_rejection(
            os.set_window_pos(
                window,
                restored,
                PosFlags::SHOW_WINDOW | PosFlags::NO_ZORDER | PosFlags::NO_ACTIVATE | PosFlags::FRAME_CHANGED,
            ),
            "restore window position",
        );
        true
    }

    pub fn set_fullscreen<P: Platform + ?Sized>(&mut self, os: &mut P, window: WindowHandle, on: bool) -> bool {
        if on {
            self.enter_fullscreen(os, window)
        } else {
            self.exit_fullscreen(os, window)
        }
    }

    /// Drop the caption and border, keeping a thin resize frame
    pub fn enter_borderless<P: Platform + ?Sized>(&mut self, os: &mut P, window: WindowHandle) -> bool {
        if !matches!(self.mode, DisplayMode::Normal | DisplayMode::Maximized) {
            debug!("Ignoring borderless request in {:?} mode", self.mode);
            return false;
        }
        self.mode = DisplayMode::Borderless;
        self.relayout_frame(os, window);
        true
    }

    pub fn exit_borderless<P: Platform + ?Sized>(&mut self, os: &mut P, window: WindowHandle) -> bool {
        if self.mode != DisplayMode::Borderless {
            debug!("Ignoring borderless exit in {:?} mode", self.mode);
            return false;
        }
        self.mode = if os.is_maximized(window).unwrap_or(false) {
            DisplayMode::Maximized
        } else {
            DisplayMode::Normal
        };
        self.relayout_frame(os, window);
        true
    }

    pub fn set_borderless<P: Platform + ?Sized>(&mut self, os: &mut P, window: WindowHandle, on: bool) -> bool {
        if on {
            self.enter_borderless(os, window)
        } else {
            self.exit_borderless(os, window)
        }
    }

    /// Dock the window to the top half of its monitor
    pub fn enter_quake<P: Platform + ?Sized>(&mut self, os: &mut P, window: WindowHandle) -> bool {
        if matches!(self.mode, DisplayMode::Fullscreen | DisplayMode::Quake) {
            debug!("Ignoring quake request in {:?} mode", self.mode);
            return false;
        }
        if self.mode == DisplayMode::Maximized {
            log_rejection(os.show(window, ShowCommand::Restore), "restore window");
        }
        self.mode = DisplayMode::Quake;
        info!("Entering quake mode");
        self.apply_style(os, window);
        self.refit_quake(os, window);
        true
    }

    /// Leave quake mode. The window stays where it is.
    pub fn exit_quake<P: Platform + ?Sized>(&mut self, os: &mut P, window: WindowHandle) -> bool {
        if self.mode != DisplayMode::Quake {
            return false;
        }
        self.mode = DisplayMode::Normal;
        self.apply_style(os, window);
        true
    }

    /// Re-fit a quake window to the monitor it is on
    pub fn refit_quake<P: Platform + ?Sized>(&mut self, os: &mut P, window: WindowHandle) {
        if self.mode != DisplayMode::Quake {
            return;
        }
        let monitor = MonitorService::from_window(&*os, window);
        let rect = self.quake_rect(&monitor);
        debug!("Fitting quake window to {:?}", rect);
        log_rejection(
            os.set_window_pos(window, rect, PosFlags::NO_ZORDER | PosFlags::NO_ACTIVATE),
            "fit quake window",
        );
    }

    /// Rectangle a quake window occupies on `monitor`
    ///
    /// Full work-area width less one pixel per side so it never bleeds onto a
    /// neighbour, half the work-area height, docked to the top.
    pub fn quake_rect(&self, monitor: &MonitorDescriptor) -> Rect {
        let nc = self.metrics.exclusive_size(monitor.dpi(), self.style());
        let work = monitor.work;
        let origin = Point::new(work.left - nc.width / 2 + 1, work.top);
        let size = Size::new(work.width() + nc.width - 2, (work.height() + nc.height) / 2);
        Rect::from_origin_size(origin, size)
    }

    /// Whether `rect` spans the quake slot of its monitor, at any height
    pub fn occupies_quake_slot<P: Platform + ?Sized>(&self, os: &P, rect: Rect) -> bool {
        let slot = self.quake_rect(&MonitorService::from_rect(os, rect));
        (rect.left, rect.top, rect.right) == (slot.left, slot.top, slot.right)
    }

    /// Hook for a pending position change
    ///
    /// When a quake window is about to land on a different monitor, returns
    /// the rectangle that fits the new monitor instead.
    pub fn on_position_changing<P: Platform + ?Sized>(
        &self,
        os: &P,
        window: WindowHandle,
        proposed: Rect,
        no_move: bool,
    ) -> Option<Rect> {
        if self.mode != DisplayMode::Quake || no_move {
            return None;
        }
        let target = MonitorService::from_rect(os, proposed);
        let current = MonitorService::from_window(os, window);
        if target.rect == current.rect {
            return None;
        }
        debug!("Quake window crossing to monitor {:?}", target.rect);
        Some(self.quake_rect(&target))
    }

    /// Track maximize/restore performed by the OS or the user
    pub fn on_maximize_changed(&mut self, maximized: bool) {
        self.mode = match (self.mode, maximized) {
            (DisplayMode::Normal, true) => DisplayMode::Maximized,
            (DisplayMode::Maximized, false) => DisplayMode::Normal,
            (mode, _) => mode,
        };
    }

    /// Move the window in or out of the always-on-top group
    pub fn set_always_on_top<P: Platform + ?Sized>(&mut self, os: &mut P, window: WindowHandle, on: bool) {
        self.always_on_top = on;
        let order = if on { ZOrder::TopMost } else { ZOrder::NoTopMost };
        log_rejection(os.set_z_order(window, order), "change z-order");
    }

    fn apply_style<P: Platform + ?Sized>(&self, os: &mut P, window: WindowHandle) {
        log_rejection(os.set_style(window, self.style()), "apply window style");
    }

    fn relayout_frame<P: Platform + ?Sized>(&self, os: &mut P, window: WindowHandle) {
        self.apply_style(os, window);
        let rect = Self::current_rect(&*os, window);
        log_rejection(
            os.set_window_pos(
                window,
                rect,
                PosFlags::SHOW_WINDOW | PosFlags::FRAME_CHANGED | PosFlags::NO_ACTIVATE,
            ),
            "recompute window frame",
        );
    }

    fn current_rect<P: Platform + ?Sized>(os: &P, window: WindowHandle) -> Rect {
        os.window_rect(window).unwrap_or_else(|e| {
            warn!("Cannot read window rectangle ({}), using work area", e);
            MonitorService::from_window(os, window).work
        })
    }
}

/// Where a non-maximized window goes when it leaves fullscreen
///
/// The size follows the DPI change, the position follows the work-area
/// origin, and the result is pushed back inside the work area grown by half
/// the frame so invisible resize borders may hang off screen. Right and
/// bottom are clamped first so the top-left corner wins.
pub fn restored_rect(snapshot: &RestoreSnapshot, monitor: &MonitorDescriptor, nc: Size) -> Rect {
    let saved = snapshot.window.rect;
    let dpi = monitor.dpi() as i32;
    let size = Size::new(
        mul_div(saved.width(), dpi, snapshot.window.dpi as i32),
        mul_div(saved.height(), dpi, snapshot.window.dpi as i32),
    );
    let mut rect = Rect::from_origin_size(saved.origin(), size).offset(
        monitor.work.left - snapshot.work.left,
        monitor.work.top - snapshot.work.top,
    );

    let bounds = monitor.work.inflate(nc.width / 2, nc.height / 2);
    if rect.right > bounds.right {
        rect = rect.offset(bounds.right - rect.right, 0);
    }
    if rect.left < bounds.left {
        rect = rect.offset(bounds.left - rect.left, 0);
    }
    if rect.bottom > bounds.bottom {
        rect = rect.offset(0, bounds.bottom - rect.bottom);
    }
    if rect.top < bounds.top {
        rect = rect.offset(0, bounds.top - rect.top);
    }
    rect
}
