//! X11 event translation
//!
//! Turns X events for the managed window into [`ShellMessage`]s. X reports
//! geometry only once it has changed, so sizing and moving messages carry
//! the rectangle the window already has next to the one it had before; the
//! host applies any negotiated correction as a follow-up configure.

use tracing::{debug, warn};
use x11rb::protocol::xproto::{NotifyMode, Window};
use x11rb::protocol::Event;

use crate::shared::geometry::mul_div;
use crate::shared::{Point, Rect, Size};
use crate::window::monitor::MonitorService;
use crate::window::platform::{Platform, WindowHandle};
use crate::window::shell::{ShellMessage, SizeKind};
use crate::window::snap::SizingEdge;
use crate::x11::atoms::Atoms;

/// Part of the self-drawn frame under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameHit {
    Caption,
    Edge(SizingEdge),
}

impl FrameHit {
    /// `_NET_WM_MOVERESIZE` direction
    pub fn moveresize_direction(self) -> u32 {
        match self {
            Self::Edge(SizingEdge::TopLeft) => 0,
            Self::Edge(SizingEdge::Top) => 1,
            Self::Edge(SizingEdge::TopRight) => 2,
            Self::Edge(SizingEdge::Right) => 3,
            Self::Edge(SizingEdge::BottomRight) => 4,
            Self::Edge(SizingEdge::Bottom) => 5,
            Self::Edge(SizingEdge::BottomLeft) => 6,
            Self::Edge(SizingEdge::Left) => 7,
            Self::Caption => crate::x11::atoms::NET_WM_MOVERESIZE_MOVE,
        }
    }
}

/// Locate a window-relative point on the frame
///
/// `margins` are the frame margins at the window's DPI, as returned by
/// `FrameMetrics::frame_margins`.
pub fn hit_test(point: Point, size: Size, margins: Rect) -> Option<FrameHit> {
    let side = margins.right;
    if side > 0 {
        let left = point.x < side;
        let right = point.x >= size.width - side;
        let top = point.y < side;
        let bottom = point.y >= size.height - side;
        let edge = match (left, right, top, bottom) {
            (true, _, true, _) => Some(SizingEdge::TopLeft),
            (_, true, true, _) => Some(SizingEdge::TopRight),
            (true, _, _, true) => Some(SizingEdge::BottomLeft),
            (_, true, _, true) => Some(SizingEdge::BottomRight),
            (true, ..) => Some(SizingEdge::Left),
            (_, true, ..) => Some(SizingEdge::Right),
            (_, _, true, _) => Some(SizingEdge::Top),
            (.., true) => Some(SizingEdge::Bottom),
            _ => None,
        };
        if let Some(edge) = edge {
            return Some(FrameHit::Edge(edge));
        }
    }
    (point.y < -margins.top).then_some(FrameHit::Caption)
}

/// Client area of an outer rectangle
fn client_size(rect: Rect, margins: Rect) -> Size {
    Size::new(
        (rect.width() - margins.width()).max(0),
        (rect.height() - margins.height()).max(0),
    )
}

/// Stateful translator for one window
pub struct EventTranslator {
    window: WindowHandle,
    root: Window,
    atoms: Atoms,
    last_rect: Option<Rect>,
    last_dpi: Option<u32>,
    /// (minimized, maximized) as last reported
    last_state: (bool, bool),
}

impl EventTranslator {
    pub fn new(window: WindowHandle, root: Window, atoms: Atoms) -> Self {
        Self {
            window,
            root,
            atoms,
            last_rect: None,
            last_dpi: None,
            last_state: (false, false),
        }
    }

    /// Outer rectangle seen in the last configure
    pub fn last_rect(&self) -> Option<Rect> {
        self.last_rect
    }

    /// Messages for one X event; `margins` are the current frame margins
    pub fn translate<P: Platform + ?Sized>(
        &mut self,
        os: &P,
        event: &Event,
        margins: Rect,
    ) -> Vec<ShellMessage> {
        let window = self.window.0;
        match event {
            // Coordinates in the event are parent-relative under a
            // reparenting window manager, so the root position is queried
            Event::ConfigureNotify(e) if e.window == window => match os.window_rect(self.window) {
                Ok(rect) => self.on_geometry(os, rect, margins),
                Err(e) => {
                    warn!("Failed to query window geometry: {}", e);
                    Vec::new()
                }
            },
            Event::FocusIn(e) if e.event == window && is_real_focus(e.mode) => {
                vec![ShellMessage::Activate { active: true }]
            }
            Event::FocusOut(e) if e.event == window && is_real_focus(e.mode) => {
                vec![ShellMessage::Activate { active: false }]
            }
            Event::ButtonPress(e) if e.event == window => {
                let size = self.last_rect.map(|r| r.size()).unwrap_or_default();
                let point = Point::new(e.event_x as i32, e.event_y as i32);
                match hit_test(point, size, margins) {
                    Some(_) => vec![ShellMessage::NonClientButton],
                    None => Vec::new(),
                }
            }
            Event::ClientMessage(e)
                if e.window == window
                    && e.type_ == self.atoms.wm_protocols
                    && e.data.as_data32()[0] == self.atoms.wm_delete_window =>
            {
                vec![ShellMessage::Close]
            }
            Event::PropertyNotify(e)
                if e.window == window
                    && (e.atom == self.atoms.wm_state || e.atom == self.atoms.net_wm_state) =>
            {
                self.on_state_change(os, margins)
            }
            Event::PropertyNotify(e) if e.window == self.root && e.atom == self.atoms.net_workarea => {
                vec![ShellMessage::DisplayChanged]
            }
            Event::RandrScreenChangeNotify(_) | Event::RandrNotify(_) => {
                vec![ShellMessage::DisplayChanged]
            }
            _ => Vec::new(),
        }
    }

    /// Messages for a new outer rectangle
    ///
    /// The first rectangle is only recorded.
    pub fn on_geometry<P: Platform + ?Sized>(
        &mut self,
        os: &P,
        rect: Rect,
        margins: Rect,
    ) -> Vec<ShellMessage> {
        let mut messages = Vec::new();
        let dpi = MonitorService::from_rect(os, rect).dpi();
        let previous_dpi = self.last_dpi.replace(dpi);
        let Some(previous) = self.last_rect.replace(rect) else {
            return messages;
        };
        if previous == rect {
            return messages;
        }

        if let Some(old) = previous_dpi.filter(|old| *old != dpi) {
            let suggested = Rect::from_origin_size(
                rect.origin(),
                Size::new(
                    mul_div(rect.width(), dpi as i32, old as i32),
                    mul_div(rect.height(), dpi as i32, old as i32),
                ),
            );
            debug!("Window moved from {} to {} DPI", old, dpi);
            messages.push(ShellMessage::DpiChanged { dpi, suggested });
        }

        if let Some(edge) = SizingEdge::from_change(previous, rect) {
            messages.push(ShellMessage::Sizing {
                edge,
                proposed: rect,
                current: previous,
            });
        }
        if previous.size() != rect.size() {
            let kind = self.refresh_state(os);
            let client = match kind {
                SizeKind::Minimized => Size::default(),
                _ => client_size(rect, margins),
            };
            messages.push(ShellMessage::Size { kind, client });
        }
        if previous.origin() != rect.origin() {
            messages.push(ShellMessage::Moving {
                proposed: rect,
                current: previous,
            });
            messages.push(ShellMessage::WindowPosChanging {
                proposed: rect,
                no_move: false,
            });
            messages.push(ShellMessage::Move);
        }
        messages
    }

    /// Messages for a minimize or maximize performed outside the shell
    pub fn on_state_change<P: Platform + ?Sized>(&mut self, os: &P, margins: Rect) -> Vec<ShellMessage> {
        let before = self.last_state;
        let kind = self.refresh_state(os);
        if self.last_state == before {
            return Vec::new();
        }
        let client = match kind {
            SizeKind::Minimized => Size::default(),
            _ => os
                .window_rect(self.window)
                .map(|rect| client_size(rect, margins))
                .unwrap_or_default(),
        };
        vec![ShellMessage::Size { kind, client }]
    }

    fn refresh_state<P: Platform + ?Sized>(&mut self, os: &P) -> SizeKind {
        let minimized = os.is_minimized(self.window).unwrap_or(false);
        let maximized = os.is_maximized(self.window).unwrap_or(false);
        self.last_state = (minimized, maximized);
        if minimized {
            SizeKind::Minimized
        } else if maximized {
            SizeKind::Maximized
        } else {
            SizeKind::Restored
        }
    }
}

/// Focus changes caused by keyboard grabs are transient
fn is_real_focus(mode: NotifyMode) -> bool {
    mode != NotifyMode::GRAB && mode != NotifyMode::UNGRAB
}
