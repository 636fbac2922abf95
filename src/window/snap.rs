//! Snap Module
//!
//! Negotiates interactive move/resize proposals. Each proposal is adjusted so
//! the client area lands on the content grid supplied by the snap callback,
//! never shrinks below the minimum, and keeps the stationary edges in place.
//! Quake windows only accept bottom-edge resizes and never move.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::shared::geometry::px_per_dip;
use crate::shared::{Rect, Size};
use crate::window::frame::{FrameMetrics, MINIMUM_CLIENT_HEIGHT, MINIMUM_CLIENT_WIDTH, StyleFlags};
use crate::window::monitor::MonitorService;
use crate::window::platform::{Platform, WindowHandle};
use crate::window::state::DisplayMode;

/// Dimension a snap request refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Width,
    Height,
}

/// Maps a proposed client dimension (logical units) to the snapped one
pub type SnapCallback = Box<dyn Fn(Axis, f32) -> f32>;

/// Edge or corner being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizingEdge {
    Left,
    Right,
    Top,
    TopLeft,
    TopRight,
    Bottom,
    BottomLeft,
    BottomRight,
}

impl SizingEdge {
    pub const ALL: [SizingEdge; 8] = [
        Self::Left,
        Self::Right,
        Self::Top,
        Self::TopLeft,
        Self::TopRight,
        Self::Bottom,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    pub fn affects_width(self) -> bool {
        !matches!(self, Self::Top | Self::Bottom)
    }

    pub fn affects_height(self) -> bool {
        !matches!(self, Self::Left | Self::Right)
    }

    fn drags_left(self) -> bool {
        matches!(self, Self::Left | Self::TopLeft | Self::BottomLeft)
    }

    fn drags_top(self) -> bool {
        matches!(self, Self::Top | Self::TopLeft | Self::TopRight)
    }

    /// Work out which edge was dragged from the rectangle before and after
    ///
    /// Returns `None` when the size is unchanged (a plain move).
    pub fn from_change(before: Rect, after: Rect) -> Option<Self> {
        if before.size() == after.size() {
            return None;
        }
        let left = before.left != after.left && before.right == after.right;
        let right = before.right != after.right;
        let top = before.top != after.top && before.bottom == after.bottom;
        let bottom = before.bottom != after.bottom;
        let horizontal = if left {
            Some(false)
        } else if right && before.width() != after.width() {
            Some(true)
        } else {
            None
        };
        let vertical = if top {
            Some(false)
        } else if bottom && before.height() != after.height() {
            Some(true)
        } else {
            None
        };
        match (horizontal, vertical) {
            (Some(false), None) => Some(Self::Left),
            (Some(true), None) => Some(Self::Right),
            (None, Some(false)) => Some(Self::Top),
            (None, Some(true)) => Some(Self::Bottom),
            (Some(false), Some(false)) => Some(Self::TopLeft),
            (Some(true), Some(false)) => Some(Self::TopRight),
            (Some(false), Some(true)) => Some(Self::BottomLeft),
            (Some(true), Some(true)) => Some(Self::BottomRight),
            (None, None) => None,
        }
    }
}

/// Per-event move/resize negotiation
pub struct ResizeNegotiator {
    metrics: FrameMetrics,
    snap: Option<SnapCallback>,
}

impl ResizeNegotiator {
    pub fn new(metrics: FrameMetrics) -> Self {
        Self { metrics, snap: None }
    }

    pub fn set_snap_callback(&mut self, snap: Option<SnapCallback>) {
        self.snap = snap;
    }

    pub fn snap_callback(&self) -> Option<&SnapCallback> {
        self.snap.as_ref()
    }

    pub fn metrics(&self) -> &FrameMetrics {
        &self.metrics
    }

    pub fn set_metrics(&mut self, metrics: FrameMetrics) {
        self.metrics = metrics;
    }

    /// Adjust an interactive resize proposal
    ///
    /// The returned rectangle keeps every edge not being dragged where it was
    /// in `proposed`. If the monitor cannot be resolved the proposal is
    /// passed through untouched. `current` is the rectangle before the
    /// gesture and is the answer for every rejected resize.
    pub fn on_sizing<P: Platform + ?Sized>(
        &self,
        os: &P,
        current: Rect,
        mode: DisplayMode,
        style: StyleFlags,
        edge: SizingEdge,
        proposed: Rect,
    ) -> Rect {
        if mode == DisplayMode::Quake && edge != SizingEdge::Bottom {
            return current;
        }

        let monitor = match MonitorService::try_from_rect(os, proposed) {
            Ok(monitor) => monitor,
            Err(e) => {
                debug!("Sizing without snapping, monitor lookup failed: {}", e);
                return proposed;
            }
        };
        let dpi = monitor.dpi();
        let nc = self.metrics.exclusive_size(dpi, style);
        let floor = self.metrics.minimum_client_size(dpi);
        let scale = px_per_dip(dpi);

        let mut client = Size::new(proposed.width() - nc.width, proposed.height() - nc.height);

        if edge.affects_width() {
            let mut width = (client.width as f32 / scale).max(MINIMUM_CLIENT_WIDTH);
            if let Some(snap) = &self.snap {
                width = snap(Axis::Width, width);
            }
            client.width = ((width * scale).round() as i32).max(floor.width);
        }
        if edge.affects_height() {
            let mut height = (client.height as f32 / scale).max(MINIMUM_CLIENT_HEIGHT);
            if let Some(snap) = &self.snap {
                height = snap(Axis::Height, height);
            }
            client.height = ((height * scale).round() as i32).max(floor.height);
        }

        let mut rect = proposed;
        if edge.affects_width() {
            if edge.drags_left() {
                rect.left = rect.right - (client.width + nc.width);
            } else {
                rect.right = rect.left + (client.width + nc.width);
            }
        }
        if edge.affects_height() {
            if edge.drags_top() {
                rect.top = rect.bottom - (client.height + nc.height);
            } else {
                rect.bottom = rect.top + (client.height + nc.height);
            }
        }
        rect
    }

    /// Adjust an interactive move proposal. Quake windows stay put.
    pub fn on_moving(&self, current: Rect, mode: DisplayMode, proposed: Rect) -> Rect {
        if mode == DisplayMode::Quake {
            return current;
        }
        proposed
    }

    /// Minimum outer size to report before a resize or maximize gesture
    pub fn on_min_max_info<P: Platform + ?Sized>(
        &self,
        os: &P,
        window: WindowHandle,
        style: StyleFlags,
    ) -> Size {
        let dpi = MonitorService::from_window(os, window).dpi();
        self.metrics.minimum_track_size(dpi, style, self.snap.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::testing::{FakePlatform, monitor};

    fn grid_negotiator() -> ResizeNegotiator {
        let mut negotiator = ResizeNegotiator::new(FrameMetrics::default());
        negotiator.set_snap_callback(Some(Box::new(|axis, v| {
            let cell = match axis {
                Axis::Width => 9.0,
                Axis::Height => 19.0,
            };
            (v / cell).floor() * cell
        })));
        negotiator
    }

    fn normal() -> StyleFlags {
        StyleFlags::for_mode(DisplayMode::Normal, false)
    }

    #[test]
    fn test_stationary_edges_are_preserved() {
        let os = FakePlatform::single();
        let negotiator = grid_negotiator();
        let proposed = Rect::new(103, 91, 917, 707);

        for edge in SizingEdge::ALL {
            let out = negotiator.on_sizing(&os, os.rect, DisplayMode::Normal, normal(), edge, proposed);
            if !edge.drags_left() {
                assert_eq!(out.left, proposed.left, "{:?} moved left", edge);
            }
            if edge.drags_left() || !edge.affects_width() {
                assert_eq!(out.right, proposed.right, "{:?} moved right", edge);
            }
            if !edge.drags_top() {
                assert_eq!(out.top, proposed.top, "{:?} moved top", edge);
            }
            if edge.drags_top() || !edge.affects_height() {
                assert_eq!(out.bottom, proposed.bottom, "{:?} moved bottom", edge);
            }
        }
    }

    #[test]
    fn test_client_area_lands_on_grid() {
        let os = FakePlatform::single();
        let negotiator = grid_negotiator();
        let proposed = Rect::new(100, 100, 917, 707);
        let out = negotiator.on_sizing(&os, os.rect, DisplayMode::Normal, normal(), SizingEdge::BottomRight, proposed);
        // 817 - 18 = 799 -> 792 ; 607 - 50 = 557 -> 551
        assert_eq!(out, Rect::new(100, 100, 100 + 792 + 18, 100 + 551 + 50));
    }

    #[test]
    fn test_width_never_below_minimum() {
        let negotiator = grid_negotiator();
        for dpi in [96, 100, 120, 144, 168, 192, 240] {
            let os = FakePlatform::new(vec![monitor(
                Rect::xywh(0, 0, 3840, 2160),
                Rect::xywh(0, 0, 3840, 2100),
                dpi,
            )]);
            let nc = FrameMetrics::default().exclusive_size(dpi, normal());
            let limit = MINIMUM_CLIENT_WIDTH * dpi as f32 / 96.0;
            for w in [1, 50, 200, 400, (limit as i32) - 1] {
                let proposed = Rect::xywh(200, 200, w + nc.width, 800);
                let out = negotiator.on_sizing(&os, os.rect, DisplayMode::Normal, normal(), SizingEdge::Right, proposed);
                let client_width = (out.width() - nc.width) as f32;
                assert!(client_width >= limit, "dpi {} width {} gave {}", dpi, w, client_width);
            }
        }
    }

    #[test]
    fn test_minimum_applies_without_snap_callback() {
        let os = FakePlatform::single();
        let negotiator = ResizeNegotiator::new(FrameMetrics::default());
        let proposed = Rect::new(500, 100, 600, 700);
        let out = negotiator.on_sizing(&os, os.rect, DisplayMode::Normal, normal(), SizingEdge::Left, proposed);
        assert_eq!(out.right, 600);
        assert_eq!(out.width(), 460 + 18);
    }

    #[test]
    fn test_monitor_failure_passes_proposal_through() {
        let mut os = FakePlatform::single();
        os.fail_monitor_queries = true;
        let negotiator = grid_negotiator();
        let proposed = Rect::new(100, 100, 150, 130);
        let out = negotiator.on_sizing(&os, os.rect, DisplayMode::Normal, normal(), SizingEdge::BottomRight, proposed);
        assert_eq!(out, proposed);
    }

    #[test]
    fn test_quake_rejects_all_but_bottom_edge() {
        let os = FakePlatform::single();
        let negotiator = grid_negotiator();
        let current = os.rect;
        let proposed = Rect::new(50, 60, 1200, 900);
        for edge in SizingEdge::ALL {
            let out = negotiator.on_sizing(&os, os.rect, DisplayMode::Quake, normal(), edge, proposed);
            if edge == SizingEdge::Bottom {
                assert_eq!((out.left, out.top, out.right), (50, 60, 1200));
                assert_eq!((out.height() - 50) % 19, 0);
            } else {
                assert_eq!(out, current, "{:?} should be rejected", edge);
            }
        }
    }

    #[test]
    fn test_quake_window_does_not_move() {
        let os = FakePlatform::single();
        let negotiator = grid_negotiator();
        for proposed in [Rect::xywh(0, 0, 800, 600), Rect::xywh(-500, 300, 800, 600)] {
            assert_eq!(negotiator.on_moving(os.rect, DisplayMode::Quake, proposed), os.rect);
            assert_eq!(negotiator.on_moving(os.rect, DisplayMode::Normal, proposed), proposed);
        }
    }

    #[test]
    fn test_min_max_info_tracks_window_dpi() {
        let mut os = FakePlatform::new(vec![
            monitor(Rect::xywh(0, 0, 1920, 1080), Rect::xywh(0, 0, 1920, 1040), 96),
            monitor(Rect::xywh(1920, 0, 1920, 1080), Rect::xywh(1920, 0, 1920, 1040), 192),
        ]);
        let negotiator = ResizeNegotiator::new(FrameMetrics::default());
        assert_eq!(negotiator.on_min_max_info(&os, os.window, normal()), Size::new(478, 222));
        os.rect = Rect::xywh(2000, 100, 800, 600);
        assert_eq!(negotiator.on_min_max_info(&os, os.window, normal()), Size::new(920 + 36, 344 + 100));
    }

    #[test]
    fn test_edge_from_change() {
        let before = Rect::new(100, 100, 900, 700);
        assert_eq!(SizingEdge::from_change(before, Rect::new(100, 100, 950, 700)), Some(SizingEdge::Right));
        assert_eq!(SizingEdge::from_change(before, Rect::new(80, 100, 900, 700)), Some(SizingEdge::Left));
        assert_eq!(SizingEdge::from_change(before, Rect::new(80, 90, 900, 700)), Some(SizingEdge::TopLeft));
        assert_eq!(SizingEdge::from_change(before, Rect::new(100, 100, 950, 720)), Some(SizingEdge::BottomRight));
        assert_eq!(SizingEdge::from_change(before, before.offset(10, 10)), None);
    }
}
