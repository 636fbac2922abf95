//! X11 backend
//!
//! Implements [`Platform`] on top of x11rb. The window draws its own frame,
//! so the window manager is asked for no decorations and the outer X window
//! geometry is the outer window rectangle.

pub mod atoms;
pub mod events;

use std::cell::Cell;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use x11rb::connection::{Connection, RequestConnection};
use x11rb::properties::WmSizeHints;
use x11rb::protocol::randr::{self, ConnectionExt as _};
use x11rb::protocol::shape::{self, ConnectionExt as _, SK, SO};
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use crate::error::{PlatformError, PlatformResult};
use crate::shared::geometry::USER_DEFAULT_DPI;
use crate::shared::{Point, Rect, Size};
use crate::window::frame::StyleFlags;
use crate::window::platform::{MonitorInfo, Platform, PosFlags, ShowCommand, WindowHandle, ZOrder};
use atoms::{Atoms, MotifWmHints, ICONIC_STATE, NET_WM_STATE_ADD, NET_WM_STATE_REMOVE};
use events::FrameHit;

/// Highest DPI reported for a monitor; bogus physical sizes go above it
const MAX_DPI: u32 = 480;

/// DPI of a monitor from its pixel and physical width
///
/// Rounded to the nearest 24 DPI step (25% scale) and never below 96.
/// Monitors without a physical size report 96.
pub fn dpi_from_physical(pixels: u16, millimeters: u32) -> u32 {
    if millimeters == 0 {
        return USER_DEFAULT_DPI;
    }
    let raw = pixels as f64 * 25.4 / millimeters as f64;
    let stepped = ((raw / 24.0).round() * 24.0) as u32;
    stepped.clamp(USER_DEFAULT_DPI, MAX_DPI)
}

/// Work area of one monitor from the desktop-wide `_NET_WORKAREA`
pub fn monitor_work_area(monitor: Rect, workarea: Option<Rect>) -> Rect {
    workarea
        .and_then(|work| monitor.intersect(&work))
        .unwrap_or(monitor)
}

/// Size of the primary monitor, else of the first one
pub fn primary_size(monitors: &[MonitorInfo]) -> Option<Size> {
    monitors
        .iter()
        .find(|m| m.primary)
        .or_else(|| monitors.first())
        .map(|m| m.rect.size())
}

/// Display server connection plus the state needed to answer queries
pub struct X11Platform {
    conn: Arc<RustConnection>,
    root: Window,
    /// Root window size, spanning every monitor
    screen_size: Size,
    /// Primary CRTC size from the last RandR query that succeeded
    primary_size: Cell<Option<Size>>,
    black_pixel: u32,
    atoms: Atoms,
    has_shape: bool,
    has_randr: bool,
    reduce_motion: bool,
}

impl X11Platform {
    pub fn new(conn: Arc<RustConnection>, screen_num: usize, reduce_motion: bool) -> Result<Self> {
        let screen = conn
            .setup()
            .roots
            .get(screen_num)
            .context("Invalid screen number")?;
        let root = screen.root;
        let screen_size = Size::new(screen.width_in_pixels as i32, screen.height_in_pixels as i32);
        let black_pixel = screen.black_pixel;

        let atoms = Atoms::new(conn.as_ref()).context("Failed to intern atoms")?;

        let has_shape = conn
            .extension_information(shape::X11_EXTENSION_NAME)?
            .is_some();
        if !has_shape {
            warn!("SHAPE extension not available, slide animations disabled");
        }
        let has_randr = conn
            .extension_information(randr::X11_EXTENSION_NAME)?
            .is_some();
        if has_randr {
            let version = conn
                .randr_query_version(1, 3)?
                .reply()
                .context("Failed to query RandR version")?;
            info!("RandR extension {}.{}", version.major_version, version.minor_version);
        } else {
            warn!("RandR extension not available, treating the screen as one monitor");
        }

        let platform = Self {
            conn,
            root,
            screen_size,
            primary_size: Cell::new(None),
            black_pixel,
            atoms,
            has_shape,
            has_randr,
            reduce_motion,
        };
        if has_randr {
            match platform.randr_monitors(None) {
                Ok(monitors) => debug!("Found {} monitors", monitors.len()),
                Err(e) => warn!("Failed to query monitors: {}", e),
            }
        }
        Ok(platform)
    }

    pub fn root(&self) -> Window {
        self.root
    }

    pub fn atoms(&self) -> &Atoms {
        &self.atoms
    }

    pub fn set_reduce_motion(&mut self, reduce_motion: bool) {
        self.reduce_motion = reduce_motion;
    }

    /// Create the top-level window, unmapped
    pub fn create_window(&mut self, rect: Rect) -> PlatformResult<WindowHandle> {
        let window = self.conn.generate_id()?;
        let aux = CreateWindowAux::new()
            .background_pixel(self.black_pixel)
            .event_mask(
                EventMask::EXPOSURE
                    | EventMask::STRUCTURE_NOTIFY
                    | EventMask::PROPERTY_CHANGE
                    | EventMask::FOCUS_CHANGE
                    | EventMask::BUTTON_PRESS
                    | EventMask::KEY_PRESS,
            );
        self.conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            window,
            self.root,
            rect.left as i16,
            rect.top as i16,
            rect.width().max(1) as u16,
            rect.height().max(1) as u16,
            0,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &aux,
        )?;

        self.conn.change_property32(
            PropMode::REPLACE,
            window,
            self.atoms.wm_protocols,
            AtomEnum::ATOM,
            &[self.atoms.wm_delete_window],
        )?;

        // Work area and monitor layout changes
        self.conn.change_window_attributes(
            self.root,
            &ChangeWindowAttributesAux::new().event_mask(EventMask::PROPERTY_CHANGE),
        )?;
        if self.has_randr {
            self.conn.randr_select_input(
                self.root,
                randr::NotifyMask::SCREEN_CHANGE
                    | randr::NotifyMask::CRTC_CHANGE
                    | randr::NotifyMask::OUTPUT_CHANGE,
            )?;
        }

        debug!("Created window {:#x}", window);
        Ok(WindowHandle(window))
    }

    /// Grab a key on the root window, for the global summon hotkey
    pub fn grab_key(&self, keycode: Keycode) -> PlatformResult<()> {
        self.conn.grab_key(
            true,
            self.root,
            ModMask::ANY,
            keycode,
            GrabMode::ASYNC,
            GrabMode::ASYNC,
        )?;
        Ok(())
    }

    /// Hand an interactive move or resize of the self-drawn frame to the
    /// window manager
    pub fn begin_move_resize(
        &mut self,
        window: WindowHandle,
        hit: FrameHit,
        root_pointer: Point,
        button: u8,
    ) -> PlatformResult<()> {
        self.conn.ungrab_pointer(x11rb::CURRENT_TIME)?;
        self.send_root_message(
            window,
            self.atoms.net_wm_moveresize,
            [
                root_pointer.x as u32,
                root_pointer.y as u32,
                hit.moveresize_direction(),
                button as u32,
                1,
            ],
        )
    }

    fn send_root_message(&self, window: WindowHandle, type_: Atom, data: [u32; 5]) -> PlatformResult<()> {
        if window.0 == 0 {
            return Err(PlatformError::NoWindow(0));
        }
        let event = ClientMessageEvent::new(32, window.0, type_, data);
        self.conn.send_event(
            false,
            self.root,
            EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
            event,
        )?;
        Ok(())
    }

    fn net_wm_state(&self, window: WindowHandle) -> PlatformResult<Vec<Atom>> {
        let reply = self
            .conn
            .get_property(false, window.0, self.atoms.net_wm_state, AtomEnum::ATOM, 0, 64)?
            .reply()?;
        Ok(reply.value32().map(|values| values.collect()).unwrap_or_default())
    }

    /// Add or remove up to two `_NET_WM_STATE` atoms
    ///
    /// A mapped window asks the window manager; an unmapped one has its
    /// property edited so the state applies when it is mapped.
    fn change_net_wm_state(
        &self,
        window: WindowHandle,
        add: bool,
        first: Atom,
        second: Atom,
    ) -> PlatformResult<()> {
        if self.is_visible(window)? {
            let action = if add { NET_WM_STATE_ADD } else { NET_WM_STATE_REMOVE };
            return self.send_root_message(window, self.atoms.net_wm_state, [action, first, second, 1, 0]);
        }

        let mut state = self.net_wm_state(window)?;
        state.retain(|atom| *atom != first && *atom != second);
        if add {
            state.extend([first, second].into_iter().filter(|atom| *atom != x11rb::NONE));
        }
        self.conn.change_property32(
            PropMode::REPLACE,
            window.0,
            self.atoms.net_wm_state,
            AtomEnum::ATOM,
            &state,
        )?;
        Ok(())
    }

    /// First rectangle of `_NET_WORKAREA`
    fn workarea(&self) -> Option<Rect> {
        let reply = self
            .conn
            .get_property(false, self.root, self.atoms.net_workarea, AtomEnum::CARDINAL, 0, 4)
            .ok()?
            .reply()
            .ok()?;
        let values: Vec<u32> = reply.value32()?.collect();
        match values[..] {
            [x, y, width, height] => Some(Rect::xywh(x as i32, y as i32, width as i32, height as i32)),
            _ => None,
        }
    }

    fn randr_monitors(&self, workarea: Option<Rect>) -> PlatformResult<Vec<MonitorInfo>> {
        let conn = self.conn.as_ref();
        let resources = randr::get_screen_resources(conn, self.root)?.reply()?;
        let primary = randr::get_output_primary(conn, self.root)?.reply()?.output;

        let mut monitors: Vec<MonitorInfo> = Vec::new();
        for &output in &resources.outputs {
            let info = randr::get_output_info(conn, output, resources.config_timestamp)?.reply()?;
            if info.connection != randr::Connection::CONNECTED || info.crtc == x11rb::NONE {
                continue;
            }
            let crtc = randr::get_crtc_info(conn, info.crtc, resources.config_timestamp)?.reply()?;
            if crtc.width == 0 || crtc.height == 0 {
                continue;
            }
            let rect = Rect::xywh(crtc.x as i32, crtc.y as i32, crtc.width as i32, crtc.height as i32);
            // Mirrored outputs share one CRTC
            if let Some(existing) = monitors.iter_mut().find(|m| m.rect == rect) {
                existing.primary |= output == primary;
                continue;
            }
            // Both axes use the horizontal density
            let dpi = dpi_from_physical(crtc.width, info.mm_width);
            monitors.push(MonitorInfo {
                rect,
                work: monitor_work_area(rect, workarea),
                dpi_x: dpi,
                dpi_y: dpi,
                primary: output == primary,
            });
        }
        if let Some(size) = primary_size(&monitors) {
            self.primary_size.set(Some(size));
        }
        Ok(monitors)
    }
}

impl Platform for X11Platform {
    fn window_rect(&self, window: WindowHandle) -> PlatformResult<Rect> {
        let geometry = self.conn.get_geometry(window.0)?.reply()?;
        let origin = self
            .conn
            .translate_coordinates(window.0, self.root, 0, 0)?
            .reply()?;
        Ok(Rect::xywh(
            origin.dst_x as i32,
            origin.dst_y as i32,
            geometry.width as i32,
            geometry.height as i32,
        ))
    }

    fn is_visible(&self, window: WindowHandle) -> PlatformResult<bool> {
        let attributes = self.conn.get_window_attributes(window.0)?.reply()?;
        Ok(attributes.map_state == MapState::VIEWABLE)
    }

    fn is_minimized(&self, window: WindowHandle) -> PlatformResult<bool> {
        let reply = self
            .conn
            .get_property(false, window.0, self.atoms.wm_state, self.atoms.wm_state, 0, 2)?
            .reply()?;
        let iconic = reply.value32().and_then(|mut values| values.next()) == Some(ICONIC_STATE);
        Ok(iconic || self.net_wm_state(window)?.contains(&self.atoms.net_wm_state_hidden))
    }

    fn is_maximized(&self, window: WindowHandle) -> PlatformResult<bool> {
        let state = self.net_wm_state(window)?;
        Ok(state.contains(&self.atoms.net_wm_state_maximized_vert)
            && state.contains(&self.atoms.net_wm_state_maximized_horz))
    }

    fn monitors(&self) -> PlatformResult<Vec<MonitorInfo>> {
        let workarea = self.workarea();
        let mut monitors = if self.has_randr {
            self.randr_monitors(workarea)?
        } else {
            Vec::new()
        };
        if monitors.is_empty() {
            let rect = Rect::from_origin_size(Point::default(), self.screen_size);
            monitors.push(MonitorInfo {
                rect,
                work: monitor_work_area(rect, workarea),
                dpi_x: USER_DEFAULT_DPI,
                dpi_y: USER_DEFAULT_DPI,
                primary: true,
            });
        }
        Ok(monitors)
    }

    /// Primary monitor size, the root size until RandR has answered
    fn screen_size(&self) -> Size {
        self.primary_size.get().unwrap_or(self.screen_size)
    }

    fn cursor_position(&self) -> PlatformResult<Point> {
        let pointer = self.conn.query_pointer(self.root)?.reply()?;
        Ok(Point::new(pointer.root_x as i32, pointer.root_y as i32))
    }

    fn foreground_window(&self) -> Option<WindowHandle> {
        let reply = self
            .conn
            .get_property(false, self.root, self.atoms.net_active_window, AtomEnum::WINDOW, 0, 1)
            .ok()?
            .reply()
            .ok()?;
        reply
            .value32()?
            .next()
            .filter(|window| *window != x11rb::NONE)
            .map(WindowHandle)
    }

    fn reduce_motion(&self) -> bool {
        // Without SHAPE the slide cannot be drawn
        self.reduce_motion || !self.has_shape
    }

    fn set_window_pos(&mut self, window: WindowHandle, rect: Rect, flags: PosFlags) -> PlatformResult<()> {
        let mut aux = ConfigureWindowAux::new();
        if !flags.contains(PosFlags::NO_MOVE) {
            aux = aux.x(rect.left).y(rect.top);
        }
        if !flags.contains(PosFlags::NO_SIZE) {
            aux = aux
                .width(rect.width().max(1) as u32)
                .height(rect.height().max(1) as u32);
        }
        if !flags.contains(PosFlags::NO_ZORDER) {
            aux = aux.stack_mode(StackMode::ABOVE);
        }
        self.conn.configure_window(window.0, &aux)?;

        if flags.contains(PosFlags::SHOW_WINDOW) {
            self.conn.map_window(window.0)?;
        }
        if flags.contains(PosFlags::FRAME_CHANGED) {
            self.conn.clear_area(true, window.0, 0, 0, 0, 0)?;
        }
        if !flags.contains(PosFlags::NO_ACTIVATE) {
            self.activate(window)?;
        }
        Ok(())
    }

    fn set_style(&mut self, window: WindowHandle, style: StyleFlags) -> PlatformResult<()> {
        let hints = MotifWmHints::self_drawn(
            style.is_resizable(),
            style.contains(StyleFlags::MAXIMIZEBOX),
        );
        self.conn.change_property32(
            PropMode::REPLACE,
            window.0,
            self.atoms.motif_wm_hints,
            self.atoms.motif_wm_hints,
            &hints.to_property(),
        )?;
        self.change_net_wm_state(
            window,
            style.contains(StyleFlags::POPUP),
            self.atoms.net_wm_state_fullscreen,
            x11rb::NONE,
        )
    }

    fn set_z_order(&mut self, window: WindowHandle, order: ZOrder) -> PlatformResult<()> {
        match order {
            ZOrder::Top => {
                self.conn.configure_window(
                    window.0,
                    &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
                )?;
                Ok(())
            }
            ZOrder::TopMost | ZOrder::NoTopMost => self.change_net_wm_state(
                window,
                order == ZOrder::TopMost,
                self.atoms.net_wm_state_above,
                x11rb::NONE,
            ),
        }
    }

    fn show(&mut self, window: WindowHandle, command: ShowCommand) -> PlatformResult<()> {
        match command {
            ShowCommand::Show => {
                self.conn.map_window(window.0)?;
            }
            ShowCommand::Hide => {
                self.conn.unmap_window(window.0)?;
            }
            ShowCommand::Minimize => {
                self.send_root_message(window, self.atoms.wm_change_state, [ICONIC_STATE, 0, 0, 0, 0])?;
            }
            ShowCommand::Restore => {
                // Un-minimizing keeps a maximized window maximized
                if self.is_minimized(window)? {
                    self.conn.map_window(window.0)?;
                    self.activate(window)?;
                } else {
                    self.change_net_wm_state(
                        window,
                        false,
                        self.atoms.net_wm_state_maximized_vert,
                        self.atoms.net_wm_state_maximized_horz,
                    )?;
                }
            }
            ShowCommand::Maximize => {
                self.conn.map_window(window.0)?;
                self.change_net_wm_state(
                    window,
                    true,
                    self.atoms.net_wm_state_maximized_vert,
                    self.atoms.net_wm_state_maximized_horz,
                )?;
            }
        }
        Ok(())
    }

    fn set_clip_region(&mut self, window: WindowHandle, region: Option<Rect>) -> PlatformResult<()> {
        if !self.has_shape {
            return Err(PlatformError::MissingExtension("SHAPE"));
        }
        match region {
            Some(rect) => {
                let clip = Rectangle {
                    x: rect.left as i16,
                    y: rect.top as i16,
                    width: rect.width().max(0) as u16,
                    height: rect.height().max(0) as u16,
                };
                self.conn.shape_rectangles(
                    SO::SET,
                    SK::BOUNDING,
                    ClipOrdering::UNSORTED,
                    window.0,
                    0,
                    0,
                    &[clip],
                )?;
            }
            None => {
                self.conn
                    .shape_mask(SO::SET, SK::BOUNDING, window.0, 0, 0, x11rb::NONE)?;
            }
        }
        Ok(())
    }

    fn set_title(&mut self, window: WindowHandle, title: &str) -> PlatformResult<()> {
        self.conn.change_property8(
            PropMode::REPLACE,
            window.0,
            self.atoms.net_wm_name,
            self.atoms.utf8_string,
            title.as_bytes(),
        )?;
        self.conn.change_property8(
            PropMode::REPLACE,
            window.0,
            AtomEnum::WM_NAME,
            AtomEnum::STRING,
            title.as_bytes(),
        )?;
        Ok(())
    }

    fn set_min_track_size(&mut self, window: WindowHandle, size: Size) -> PlatformResult<()> {
        let mut hints = WmSizeHints::new();
        hints.min_size = Some((size.width, size.height));
        hints.set_normal_hints(self.conn.as_ref(), window.0)?;
        Ok(())
    }

    fn activate(&mut self, window: WindowHandle) -> PlatformResult<()> {
        // Source indication 2 (pager) so focus stealing prevention lets a summon through
        self.send_root_message(window, self.atoms.net_active_window, [2, x11rb::CURRENT_TIME, 0, 0, 0])
    }

    fn invalidate(&mut self, window: WindowHandle) -> PlatformResult<()> {
        self.conn.clear_area(true, window.0, 0, 0, 0, 0)?;
        Ok(())
    }

    fn flush(&mut self) -> PlatformResult<()> {
        self.conn.flush()?;
        Ok(())
    }
}
