//! Placement Module
//!
//! Where the window appears at launch and how it follows a summon onto
//! another monitor.

use tracing::{debug, info};

use crate::config::WindowConfig;
use crate::shared::geometry::px_per_dip;
use crate::shared::{Point, Rect, Size};
use crate::window::frame::{FrameMetrics, StyleFlags};
use crate::window::monitor::{MonitorDescriptor, MonitorService};
use crate::window::platform::{log_rejection, Platform, PosFlags, WindowHandle};
use crate::window::state::DisplayState;

/// Launch rectangle for a new window
///
/// `proposed` is what the OS suggested; a configured position overrides its
/// origin. A titlebar that would start off every monitor is moved to the
/// nearest work area. Quake placement is left to the display state.
pub fn initial_rect<P: Platform + ?Sized>(
    os: &P,
    config: &WindowConfig,
    metrics: &FrameMetrics,
    style: StyleFlags,
    proposed: Rect,
) -> Rect {
    let mut origin = config
        .initial_position
        .map(|[x, y]| Point::new(x, y))
        .unwrap_or(proposed.origin());

    let monitor = MonitorService::from_rect(os, probe(origin));
    let titlebar_visible = os
        .monitors()
        .map(|monitors| monitors.iter().any(|m| m.rect.contains(origin)))
        .unwrap_or(true);
    if !titlebar_visible {
        debug!("Launch position {:?} is off screen, using work area origin", origin);
        origin = monitor.work.origin();
    }

    let dpi = monitor.dpi();
    let scale = px_per_dip(dpi);
    let [width, height] = config.initial_size;
    let client = Size::new(
        ((width * scale).round() as i32).max(1),
        ((height * scale).round() as i32).max(1),
    );
    let size = client + metrics.exclusive_size(dpi, style);
    let frame = metrics.frame_margins(dpi, style);

    let nearest = MonitorService::from_rect(os, probe(origin));
    // Only the side borders are compensated, the top margin holds the titlebar
    let mut origin = Point::new(origin.x + frame.left, origin.y);
    if config.center_on_launch {
        origin = centered_origin(&nearest, size);
    }

    let rect = Rect::from_origin_size(origin, size);
    info!("Initial window rectangle {:?} at {} DPI", rect, dpi);
    rect
}

fn probe(origin: Point) -> Rect {
    Rect::from_origin_size(origin, Size::new(1, 1))
}

fn centered_origin(monitor: &MonitorDescriptor, size: Size) -> Point {
    let work = monitor.work;
    Point::new(
        work.left + (work.width() / 2 - size.width / 2),
        work.top + (work.height() / 2 - size.height / 2),
    )
}

/// Move the window onto `target`, keeping its offset from the monitor origin
///
/// Returns whether the window moved. A quake window is re-fitted to the
/// new monitor.
pub fn move_to_monitor<P: Platform + ?Sized>(
    os: &mut P,
    window: WindowHandle,
    target: &MonitorDescriptor,
    state: &mut DisplayState,
) -> bool {
    let Ok(current) = MonitorService::try_from_window(&*os, window) else {
        return false;
    };
    if current.rect == target.rect {
        return false;
    }
    let Ok(rect) = os.window_rect(window) else {
        return false;
    };

    let origin = Point::new(
        target.rect.left + (rect.left - current.rect.left),
        target.rect.top + (rect.top - current.rect.top),
    );
    debug!("Moving window to monitor {:?}", target.rect);
    log_rejection(
        os.set_window_pos(
            window,
            Rect::from_origin_size(origin, rect.size()),
            PosFlags::NO_ZORDER | PosFlags::NO_SIZE | PosFlags::NO_ACTIVATE,
        ),
        "move window to monitor",
    );
    state.refit_quake(os, window);
    true
}
