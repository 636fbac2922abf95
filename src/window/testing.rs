//! Scripted platform used by the unit tests

use crate::error::{PlatformError, PlatformResult};
use crate::shared::{Point, Rect, Size};
use crate::window::frame::StyleFlags;
use crate::window::platform::{
    MonitorInfo, Platform, PosFlags, ShowCommand, WindowHandle, ZOrder,
};

/// Build a monitor with equal horizontal and vertical DPI
pub fn monitor(rect: Rect, work: Rect, dpi: u32) -> MonitorInfo {
    MonitorInfo {
        rect,
        work,
        dpi_x: dpi,
        dpi_y: dpi,
        primary: rect.left == 0 && rect.top == 0,
    }
}

/// Everything the components asked the OS to do, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetWindowPos(Rect, PosFlags),
    SetStyle(StyleFlags),
    ZOrder(ZOrder),
    Show(ShowCommand),
    Clip(Option<Rect>),
    Title(String),
    MinTrackSize(Size),
    Activate,
    Invalidate,
}

pub struct FakePlatform {
    pub window: WindowHandle,
    pub rect: Rect,
    pub monitors: Vec<MonitorInfo>,
    pub cursor: Point,
    pub visible: bool,
    pub minimized: bool,
    pub maximized: bool,
    pub foreground: Option<WindowHandle>,
    pub reduce_motion: bool,
    pub fail_monitor_queries: bool,
    pub reject_commands: bool,
    pub commands: Vec<Command>,
    /// Rectangles of other top-level windows
    pub others: Vec<(WindowHandle, Rect)>,
}

impl FakePlatform {
    pub fn new(monitors: Vec<MonitorInfo>) -> Self {
        Self {
            window: WindowHandle(0x0040_0001),
            rect: Rect::xywh(100, 100, 800, 600),
            monitors,
            cursor: Point::new(0, 0),
            visible: true,
            minimized: false,
            maximized: false,
            foreground: None,
            reduce_motion: false,
            fail_monitor_queries: false,
            reject_commands: false,
            commands: Vec::new(),
            others: Vec::new(),
        }
    }

    /// One 1920x1080 monitor at 96 DPI with a 40px panel at the bottom
    pub fn single() -> Self {
        Self::new(vec![monitor(
            Rect::xywh(0, 0, 1920, 1080),
            Rect::xywh(0, 0, 1920, 1040),
            96,
        )])
    }

    pub fn clip_regions(&self) -> Vec<Option<Rect>> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Clip(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    pub fn styles(&self) -> Vec<StyleFlags> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::SetStyle(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub fn shows(&self) -> Vec<ShowCommand> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Show(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, command: Command) -> PlatformResult<()> {
        self.commands.push(command);
        if self.reject_commands {
            return Err(PlatformError::Rejected("scripted rejection".into()));
        }
        Ok(())
    }
}

impl Platform for FakePlatform {
    fn window_rect(&self, window: WindowHandle) -> PlatformResult<Rect> {
        if window == self.window {
            return Ok(self.rect);
        }
        self.others
            .iter()
            .find(|(w, _)| *w == window)
            .map(|(_, r)| *r)
            .ok_or(PlatformError::NoWindow(window.0))
    }

    fn is_visible(&self, _window: WindowHandle) -> PlatformResult<bool> {
        Ok(self.visible)
    }

    fn is_minimized(&self, _window: WindowHandle) -> PlatformResult<bool> {
        Ok(self.minimized)
    }

    fn is_maximized(&self, _window: WindowHandle) -> PlatformResult<bool> {
        Ok(self.maximized)
    }

    fn monitors(&self) -> PlatformResult<Vec<MonitorInfo>> {
        if self.fail_monitor_queries {
            return Err(PlatformError::Rejected("monitor query failed".into()));
        }
        Ok(self.monitors.clone())
    }

    fn screen_size(&self) -> Size {
        Size::new(1920, 1080)
    }

    fn cursor_position(&self) -> PlatformResult<Point> {
        Ok(self.cursor)
    }

    fn foreground_window(&self) -> Option<WindowHandle> {
        self.foreground
    }

    fn reduce_motion(&self) -> bool {
        self.reduce_motion
    }

    fn set_window_pos(
        &mut self,
        window: WindowHandle,
        rect: Rect,
        flags: PosFlags,
    ) -> PlatformResult<()> {
        self.record(Command::SetWindowPos(rect, flags))?;
        if window != self.window {
            return Err(PlatformError::NoWindow(window.0));
        }
        let origin = if flags.contains(PosFlags::NO_MOVE) {
            self.rect.origin()
        } else {
            rect.origin()
        };
        let size = if flags.contains(PosFlags::NO_SIZE) {
            self.rect.size()
        } else {
            rect.size()
        };
        self.rect = Rect::from_origin_size(origin, size);
        if flags.contains(PosFlags::SHOW_WINDOW) {
            self.visible = true;
        }
        Ok(())
    }

    fn set_style(&mut self, _window: WindowHandle, style: StyleFlags) -> PlatformResult<()> {
        self.record(Command::SetStyle(style))
    }

    fn set_z_order(&mut self, _window: WindowHandle, order: ZOrder) -> PlatformResult<()> {
        self.record(Command::ZOrder(order))
    }

    fn show(&mut self, _window: WindowHandle, command: ShowCommand) -> PlatformResult<()> {
        self.record(Command::Show(command))?;
        match command {
            ShowCommand::Show => self.visible = true,
            ShowCommand::Hide => self.visible = false,
            ShowCommand::Minimize => self.minimized = true,
            ShowCommand::Restore => {
                self.minimized = false;
                self.maximized = false;
                self.visible = true;
            }
            ShowCommand::Maximize => {
                self.minimized = false;
                self.maximized = true;
                self.visible = true;
            }
        }
        Ok(())
    }

    fn set_clip_region(
        &mut self,
        _window: WindowHandle,
        region: Option<Rect>,
    ) -> PlatformResult<()> {
        self.record(Command::Clip(region))
    }

    fn set_title(&mut self, _window: WindowHandle, title: &str) -> PlatformResult<()> {
        self.record(Command::Title(title.to_string()))
    }

    fn set_min_track_size(&mut self, _window: WindowHandle, size: Size) -> PlatformResult<()> {
        self.record(Command::MinTrackSize(size))
    }

    fn activate(&mut self, window: WindowHandle) -> PlatformResult<()> {
        self.record(Command::Activate)?;
        self.foreground = Some(window);
        Ok(())
    }

    fn invalidate(&mut self, _window: WindowHandle) -> PlatformResult<()> {
        self.record(Command::Invalidate)
    }

    fn flush(&mut self) -> PlatformResult<()> {
        Ok(())
    }
}
