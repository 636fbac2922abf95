//! Monitor Module
//!
//! Resolves which monitor a window, point or rectangle belongs to. Pure query,
//! nothing is cached: display topology can change between any two calls.

use tracing::warn;

use crate::error::{PlatformError, PlatformResult};
use crate::shared::geometry::USER_DEFAULT_DPI;
use crate::shared::{Point, Rect, Size};
use crate::window::platform::{MonitorInfo, Platform, WindowHandle};

/// Snapshot of one monitor's geometry and scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorDescriptor {
    pub rect: Rect,
    pub work: Rect,
    pub dpi_x: u32,
    pub dpi_y: u32,
}

impl MonitorDescriptor {
    /// Descriptor used when the OS cannot resolve any monitor
    pub fn fallback(screen: Size) -> Self {
        let rect = Rect::from_origin_size(Point::default(), screen);
        Self {
            rect,
            work: rect,
            dpi_x: USER_DEFAULT_DPI,
            dpi_y: USER_DEFAULT_DPI,
        }
    }

    /// Effective DPI. Both axes are equal in practice; the horizontal one is used.
    pub fn dpi(&self) -> u32 {
        self.dpi_x
    }
}

impl From<&MonitorInfo> for MonitorDescriptor {
    fn from(info: &MonitorInfo) -> Self {
        Self {
            rect: info.rect,
            work: info.work,
            dpi_x: info.dpi_x,
            dpi_y: info.dpi_y,
        }
    }
}

/// Monitor geometry queries
pub struct MonitorService;

impl MonitorService {
    /// Monitor with the greatest overlap with `rect`, or the nearest one
    pub fn try_from_rect<P: Platform + ?Sized>(os: &P, rect: Rect) -> PlatformResult<MonitorDescriptor> {
        let monitors = os.monitors()?;
        Self::pick_for_rect(&monitors, rect)
            .map(MonitorDescriptor::from)
            .ok_or(PlatformError::NoMonitors)
    }

    /// Monitor containing `point`, or the nearest one
    pub fn try_from_point<P: Platform + ?Sized>(os: &P, point: Point) -> PlatformResult<MonitorDescriptor> {
        let monitors = os.monitors()?;
        Self::pick_for_point(&monitors, point)
            .map(MonitorDescriptor::from)
            .ok_or(PlatformError::NoMonitors)
    }

    /// Monitor the window mostly sits on
    pub fn try_from_window<P: Platform + ?Sized>(
        os: &P,
        window: WindowHandle,
    ) -> PlatformResult<MonitorDescriptor> {
        let rect = os.window_rect(window)?;
        Self::try_from_rect(os, rect)
    }

    pub fn from_rect<P: Platform + ?Sized>(os: &P, rect: Rect) -> MonitorDescriptor {
        Self::try_from_rect(os, rect).unwrap_or_else(|e| Self::fallback(os, e))
    }

    pub fn from_point<P: Platform + ?Sized>(os: &P, point: Point) -> MonitorDescriptor {
        Self::try_from_point(os, point).unwrap_or_else(|e| Self::fallback(os, e))
    }

    pub fn from_window<P: Platform + ?Sized>(os: &P, window: WindowHandle) -> MonitorDescriptor {
        Self::try_from_window(os, window).unwrap_or_else(|e| Self::fallback(os, e))
    }

    /// Monitor under the mouse cursor
    pub fn from_cursor<P: Platform + ?Sized>(os: &P) -> MonitorDescriptor {
        match os.cursor_position() {
            Ok(point) => Self::from_point(os, point),
            Err(e) => Self::fallback(os, e),
        }
    }

    fn fallback<P: Platform + ?Sized>(os: &P, error: PlatformError) -> MonitorDescriptor {
        warn!("Monitor lookup failed ({}), using default monitor", error);
        MonitorDescriptor::fallback(os.screen_size())
    }

    fn pick_for_rect(monitors: &[MonitorInfo], rect: Rect) -> Option<&MonitorInfo> {
        let best = monitors
            .iter()
            .map(|m| (m.rect.intersection_area(&rect), m))
            .filter(|(area, _)| *area > 0)
            .fold(None::<(i64, &MonitorInfo)>, |best, (area, m)| match best {
                Some((best_area, _)) if best_area >= area => best,
                _ => Some((area, m)),
            });
        if let Some((_, m)) = best {
            return Some(m);
        }
        monitors.iter().min_by_key(|m| m.rect.distance_sq_to_rect(&rect))
    }

    fn pick_for_point(monitors: &[MonitorInfo], point: Point) -> Option<&MonitorInfo> {
        monitors
            .iter()
            .find(|m| m.rect.contains(point))
            .or_else(|| monitors.iter().min_by_key(|m| m.rect.distance_sq_to(point)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::testing::{FakePlatform, monitor};

    fn two_monitors() -> FakePlatform {
        FakePlatform::new(vec![
            monitor(Rect::xywh(0, 0, 1920, 1080), Rect::xywh(0, 0, 1920, 1040), 96),
            monitor(Rect::xywh(1920, 0, 2560, 1440), Rect::xywh(1920, 0, 2560, 1400), 144),
        ])
    }

    #[test]
    fn test_rect_picks_greatest_overlap() {
        let os = two_monitors();
        // Straddles the boundary, mostly on the right monitor
        let m = MonitorService::from_rect(&os, Rect::xywh(1800, 100, 800, 600));
        assert_eq!(m.dpi(), 144);
        let m = MonitorService::from_rect(&os, Rect::xywh(1300, 100, 800, 600));
        assert_eq!(m.dpi(), 96);
    }

    #[test]
    fn test_offscreen_rect_falls_back_to_nearest() {
        let os = two_monitors();
        let m = MonitorService::from_rect(&os, Rect::xywh(5000, 0, 100, 100));
        assert_eq!(m.rect.left, 1920);
        let m = MonitorService::from_rect(&os, Rect::xywh(-900, 200, 100, 100));
        assert_eq!(m.rect.left, 0);
    }

    #[test]
    fn test_point_lookup() {
        let os = two_monitors();
        assert_eq!(MonitorService::from_point(&os, Point::new(2000, 10)).dpi(), 144);
        assert_eq!(MonitorService::from_point(&os, Point::new(-50, 10)).dpi(), 96);
    }

    #[test]
    fn test_window_lookup_uses_window_rect() {
        let mut os = two_monitors();
        let window = os.window;
        os.rect = Rect::xywh(2100, 100, 800, 600);
        assert_eq!(MonitorService::from_window(&os, window).dpi(), 144);
    }

    #[test]
    fn test_failed_query_returns_default_descriptor() {
        let mut os = two_monitors();
        os.fail_monitor_queries = true;
        let m = MonitorService::from_rect(&os, Rect::xywh(2000, 0, 10, 10));
        assert_eq!(m, MonitorDescriptor::fallback(os.screen_size()));
        assert_eq!(m.dpi(), 96);
        assert_eq!(m.rect.origin(), Point::new(0, 0));
    }

    #[test]
    fn test_no_monitors_is_an_error_for_try_variants() {
        let os = FakePlatform::new(Vec::new());
        assert!(MonitorService::try_from_point(&os, Point::new(0, 0)).is_err());
        assert_eq!(MonitorService::from_point(&os, Point::new(0, 0)).dpi(), 96);
    }
}
