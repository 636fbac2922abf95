//! Window Shell
//!
//! Owns the native window for its whole life and routes window-system
//! messages to the negotiator and the display-state machine. The UI host
//! talks to the shell only: it sets content, title and theme, asks for mode
//! changes, and drains the [`WindowEvent`]s the shell produces.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{Config, LaunchMode, Theme, WindowConfig};
use crate::shared::geometry::px_per_dip;
use crate::shared::{Rect, Size};
use crate::window::frame::FrameMetrics;
use crate::window::monitor::MonitorService;
use crate::window::placement::initial_rect;
use crate::window::platform::{log_rejection, Platform, PosFlags, ShowCommand, WindowHandle};
use crate::window::snap::{ResizeNegotiator, SizingEdge, SnapCallback};
use crate::window::state::{DisplayMode, DisplayState};
use crate::window::summon::{self, SummonBehavior, SummonOutcome};

/// Hosted UI tree
pub trait ContentHost {
    /// New client size in logical units
    fn resize(&mut self, width: f32, height: f32);

    fn set_theme(&mut self, theme: Theme);
}

/// Why the window was resized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeKind {
    Restored,
    Minimized,
    Maximized,
}

/// System menu / titlebar button commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysCommand {
    Restore,
    Maximize,
    Minimize,
}

/// Window-system messages the shell understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellMessage {
    /// The native window exists but is not shown yet
    Create { proposed: Rect },
    /// Sent before a resize or maximize gesture
    GetMinMaxInfo,
    /// Interactive resize in progress; `current` is the rectangle before it
    Sizing {
        edge: SizingEdge,
        proposed: Rect,
        current: Rect,
    },
    /// Interactive move in progress
    Moving { proposed: Rect, current: Rect },
    /// Position or size about to change for any reason
    WindowPosChanging { proposed: Rect, no_move: bool },
    /// Client area resized, in physical pixels
    Size { kind: SizeKind, client: Size },
    Move,
    Activate { active: bool },
    /// Mouse button on the titlebar or frame
    NonClientButton,
    Close,
    SysCommand(SysCommand),
    ThemeChanged,
    /// The window's monitor DPI changed; `suggested` keeps its logical size
    DpiChanged { dpi: u32, suggested: Rect },
    /// Monitors were added, removed or rearranged
    DisplayChanged,
}

/// Answer to a [`ShellMessage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageResult {
    Handled,
    /// Let the OS apply its default behavior
    Unhandled,
    /// Use this rectangle instead of the proposal
    Rect(Rect),
    MinTrackSize(Size),
}

/// Events for the UI host and application shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WindowEvent {
    Activated { active: bool },
    Moved,
    MaximizeChanged { maximized: bool },
    VisibilityChanged { visible: bool },
    DragRegionClicked,
    CloseRequested,
}

/// One top-level window and its display state
pub struct WindowShell<P: Platform> {
    os: P,
    window: WindowHandle,
    state: DisplayState,
    negotiator: ResizeNegotiator,
    config: WindowConfig,
    summon: SummonBehavior,
    content: Option<Box<dyn ContentHost>>,
    theme: Theme,
    dpi: u32,
    events: Vec<WindowEvent>,
}

impl<P: Platform> WindowShell<P> {
    /// Create a new shell for an existing native window
    pub fn new(os: P, window: WindowHandle, config: &Config) -> Self {
        let metrics = FrameMetrics::from(&config.decorations);
        let dpi = MonitorService::from_window(&os, window).dpi();
        Self {
            os,
            window,
            state: DisplayState::new(metrics),
            negotiator: ResizeNegotiator::new(metrics),
            config: config.window.clone(),
            summon: SummonBehavior::from(&config.summon),
            content: None,
            theme: config.window.theme,
            dpi,
            events: Vec::new(),
        }
    }

    pub fn window(&self) -> WindowHandle {
        self.window
    }

    pub fn platform(&self) -> &P {
        &self.os
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.os
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn mode(&self) -> DisplayMode {
        self.state.mode()
    }

    /// Register the dimension snapping policy, or remove it with `None`
    pub fn set_snap_callback(&mut self, snap: Option<SnapCallback>) {
        self.negotiator.set_snap_callback(snap);
        self.publish_min_track_size();
    }

    /// Events produced since the last call
    pub fn drain_events(&mut self) -> Vec<WindowEvent> {
        std::mem::take(&mut self.events)
    }

    /// Route one window-system message
    pub fn handle(&mut self, message: ShellMessage) -> MessageResult {
        let window = self.window;
        match message {
            ShellMessage::Create { proposed } => {
                self.on_create(proposed);
                MessageResult::Handled
            }
            ShellMessage::GetMinMaxInfo => MessageResult::MinTrackSize(self.negotiator.on_min_max_info(
                &self.os,
                window,
                self.state.style(),
            )),
            ShellMessage::Sizing {
                edge,
                proposed,
                current,
            } => MessageResult::Rect(self.negotiator.on_sizing(
                &self.os,
                self.pinned_rect(current, proposed),
                self.state.mode(),
                self.state.style(),
                edge,
                proposed,
            )),
            ShellMessage::Moving { proposed, current } => MessageResult::Rect(self.negotiator.on_moving(
                self.pinned_rect(current, proposed),
                self.state.mode(),
                proposed,
            )),
            ShellMessage::WindowPosChanging { proposed, no_move } => {
                match self.state.on_position_changing(&self.os, window, proposed, no_move) {
                    Some(rect) => MessageResult::Rect(rect),
                    None => MessageResult::Unhandled,
                }
            }
            ShellMessage::Size { kind, client } => {
                self.on_size(kind, client);
                MessageResult::Unhandled
            }
            ShellMessage::Move => {
                self.events.push(WindowEvent::Moved);
                MessageResult::Unhandled
            }
            ShellMessage::Activate { active } => {
                self.on_activate(active);
                MessageResult::Unhandled
            }
            ShellMessage::NonClientButton => {
                self.events.push(WindowEvent::DragRegionClicked);
                MessageResult::Unhandled
            }
            ShellMessage::Close => {
                // Closing is the application's decision
                self.events.push(WindowEvent::CloseRequested);
                MessageResult::Handled
            }
            ShellMessage::SysCommand(command) => self.on_sys_command(command),
            ShellMessage::ThemeChanged => {
                log_rejection(self.os.invalidate(window), "repaint window");
                MessageResult::Handled
            }
            ShellMessage::DpiChanged { dpi, suggested } => {
                debug!("DPI changed to {}", dpi);
                self.dpi = dpi;
                log_rejection(
                    self.os.set_window_pos(window, suggested, PosFlags::NO_ZORDER | PosFlags::NO_ACTIVATE),
                    "apply DPI suggested rectangle",
                );
                self.publish_min_track_size();
                MessageResult::Handled
            }
            ShellMessage::DisplayChanged => {
                self.refresh_dpi();
                self.state.refit_quake(&mut self.os, window);
                self.publish_min_track_size();
                MessageResult::Handled
            }
        }
    }

    fn on_create(&mut self, proposed: Rect) {
        let window = self.window;
        let rect = initial_rect(
            &self.os,
            &self.config,
            self.state.metrics(),
            self.state.style(),
            proposed,
        );
        log_rejection(
            self.os.set_window_pos(window, rect, PosFlags::NO_ACTIVATE | PosFlags::NO_ZORDER),
            "place window",
        );
        self.refresh_dpi();
        log_rejection(self.os.set_title(window, &self.config.title), "set window title");

        if self.config.quake_mode {
            self.state.enter_quake(&mut self.os, window);
        } else {
            self.apply_launch_mode(self.config.launch_mode);
        }
        if self.config.always_on_top {
            self.state.set_always_on_top(&mut self.os, window, true);
        }
        self.publish_min_track_size();
    }

    fn apply_launch_mode(&mut self, mode: LaunchMode) {
        let window = self.window;
        info!("Launching {:?}", mode);
        match mode {
            LaunchMode::Default => {}
            LaunchMode::Maximized => self.maximize(),
            LaunchMode::Fullscreen => {
                self.state.enter_fullscreen(&mut self.os, window);
            }
            LaunchMode::Focus => {
                self.state.enter_borderless(&mut self.os, window);
            }
            LaunchMode::MaximizedFocus => {
                self.maximize();
                self.state.enter_borderless(&mut self.os, window);
            }
        }
    }

    fn on_size(&mut self, kind: SizeKind, client: Size) {
        match kind {
            SizeKind::Restored | SizeKind::Maximized => {
                let maximized = kind == SizeKind::Maximized;
                self.events.push(WindowEvent::VisibilityChanged { visible: true });
                self.events.push(WindowEvent::MaximizeChanged { maximized });
                self.state.on_maximize_changed(maximized);
                let scale = self.dpi_scale();
                if let Some(content) = self.content.as_mut() {
                    content.resize(client.width as f32 / scale, client.height as f32 / scale);
                }
            }
            SizeKind::Minimized => {
                self.events.push(WindowEvent::VisibilityChanged { visible: false });
                if self.state.is_quake() || self.config.minimize_to_notification_area {
                    log_rejection(self.os.show(self.window, ShowCommand::Hide), "hide window");
                }
            }
        }
    }

    fn on_activate(&mut self, active: bool) {
        self.events.push(WindowEvent::Activated { active });
        if active || !self.config.auto_hide_window {
            return;
        }
        let command = if self.state.is_quake() || self.config.minimize_to_notification_area {
            ShowCommand::Hide
        } else {
            ShowCommand::Minimize
        };
        debug!("Auto-hiding window with {:?}", command);
        log_rejection(self.os.show(self.window, command), "auto-hide window");
    }

    fn on_sys_command(&mut self, command: SysCommand) -> MessageResult {
        if matches!(command, SysCommand::Restore | SysCommand::Maximize) {
            self.events.push(WindowEvent::MaximizeChanged {
                maximized: command == SysCommand::Maximize,
            });
        }
        if command == SysCommand::Restore && self.state.is_fullscreen() {
            self.set_fullscreen(false);
            return MessageResult::Handled;
        }
        MessageResult::Unhandled
    }

    /// Place the hosted UI tree
    pub fn set_content(&mut self, mut content: Box<dyn ContentHost>) {
        content.set_theme(self.theme);
        self.content = Some(content);
    }

    pub fn set_title(&mut self, title: &str) {
        self.config.title = title.to_string();
        log_rejection(self.os.set_title(self.window, title), "set window title");
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        if let Some(content) = self.content.as_mut() {
            content.set_theme(theme);
        }
        // Frame parts we draw ourselves follow the theme too
        log_rejection(self.os.invalidate(self.window), "repaint window");
    }

    /// Physical pixels per logical unit on the window's monitor
    pub fn dpi_scale(&self) -> f32 {
        px_per_dip(self.dpi)
    }

    pub fn set_fullscreen(&mut self, on: bool) -> bool {
        let changed = self.state.set_fullscreen(&mut self.os, self.window, on);
        self.after_transition(changed)
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        self.set_fullscreen(!self.state.is_fullscreen())
    }

    /// Focus mode
    pub fn set_borderless(&mut self, on: bool) -> bool {
        let changed = self.state.set_borderless(&mut self.os, self.window, on);
        self.after_transition(changed)
    }

    pub fn toggle_borderless(&mut self) -> bool {
        self.set_borderless(self.state.mode() != DisplayMode::Borderless)
    }

    pub fn set_quake(&mut self, on: bool) -> bool {
        let changed = if on {
            self.state.enter_quake(&mut self.os, self.window)
        } else {
            self.state.exit_quake(&mut self.os, self.window)
        };
        if changed {
            self.config.quake_mode = on;
        }
        self.after_transition(changed)
    }

    pub fn toggle_quake(&mut self) -> bool {
        self.set_quake(!self.state.is_quake())
    }

    pub fn set_always_on_top(&mut self, on: bool) {
        self.config.always_on_top = on;
        self.state.set_always_on_top(&mut self.os, self.window, on);
    }

    /// Maximize a restored window, restore a maximized one
    pub fn toggle_maximize(&mut self) {
        if self.os.is_maximized(self.window).unwrap_or(false) {
            log_rejection(self.os.show(self.window, ShowCommand::Restore), "restore window");
            self.state.on_maximize_changed(false);
        } else {
            self.maximize();
        }
    }

    fn maximize(&mut self) {
        log_rejection(self.os.show(self.window, ShowCommand::Maximize), "maximize window");
        self.state.on_maximize_changed(true);
    }

    /// Resize so the client area is `client` physical pixels, keeping the origin
    pub fn resize_client(&mut self, client: Size) {
        let Ok(rect) = self.os.window_rect(self.window) else {
            return;
        };
        let nc = self.state.metrics().exclusive_size(self.dpi, self.state.style());
        let size = Size::new(client.width.max(1), client.height.max(1)) + nc;
        log_rejection(
            self.os.set_window_pos(
                self.window,
                Rect::from_origin_size(rect.origin(), size),
                PosFlags::NO_ACTIVATE | PosFlags::NO_ZORDER,
            ),
            "resize window",
        );
    }

    /// Show or hide on request of the application
    ///
    /// Showing only restores a minimized window, so a maximized one is not
    /// restored down.
    pub fn show_window_changed(&mut self, show: bool) {
        if show {
            if self.os.is_minimized(self.window).unwrap_or(false) {
                log_rejection(self.os.show(self.window, ShowCommand::Restore), "restore window");
            }
        } else {
            log_rejection(self.os.show(self.window, ShowCommand::Minimize), "minimize window");
        }
    }

    /// Summon with the configured behavior
    pub fn summon(&mut self) -> SummonOutcome {
        let behavior = self.summon;
        self.summon_with(&behavior)
    }

    pub fn summon_with(&mut self, behavior: &SummonBehavior) -> SummonOutcome {
        let outcome = summon::summon(&mut self.os, self.window, &mut self.state, behavior);
        self.refresh_dpi();
        outcome
    }

    /// Apply a reloaded configuration
    pub fn apply_config(&mut self, config: &Config) {
        let window = &config.window;
        if window.title != self.config.title {
            self.set_title(&window.title);
        }
        if window.theme != self.theme {
            self.set_theme(window.theme);
        }
        if window.always_on_top != self.state.always_on_top() {
            self.set_always_on_top(window.always_on_top);
        }
        if window.quake_mode != self.state.is_quake() {
            self.set_quake(window.quake_mode);
        }

        let metrics = FrameMetrics::from(&config.decorations);
        if metrics != *self.state.metrics() {
            self.state.set_metrics(metrics);
            self.negotiator.set_metrics(metrics);
            self.publish_min_track_size();
        }

        self.config = window.clone();
        self.summon = SummonBehavior::from(&config.summon);
        info!("Applied reloaded configuration");
    }

    /// Frame margins at the window's current DPI and style
    pub fn frame_margins(&self) -> Rect {
        self.state.metrics().frame_margins(self.dpi, self.state.style())
    }

    /// Put a quake window back into its slot on the current monitor
    pub fn refit_quake(&mut self) {
        self.state.refit_quake(&mut self.os, self.window);
    }

    /// Apply a negotiated rectangle after the OS already moved the window
    ///
    /// For window systems that report geometry only once it has changed.
    /// Maximized and fullscreen windows are left where the OS put them.
    pub fn correct_geometry(&mut self, actual: Rect, result: MessageResult) -> bool {
        let MessageResult::Rect(rect) = result else {
            return false;
        };
        if rect == actual
            || matches!(self.mode(), DisplayMode::Fullscreen | DisplayMode::Maximized)
            || self.os.is_maximized(self.window).unwrap_or(false)
        {
            return false;
        }
        debug!("Correcting window rectangle {:?} to {:?}", actual, rect);
        log_rejection(
            self.os.set_window_pos(self.window, rect, PosFlags::NO_ZORDER | PosFlags::NO_ACTIVATE),
            "apply negotiated rectangle",
        );
        true
    }

    /// Handle a message for a change the window system already made
    ///
    /// Negotiated rectangles are applied as corrections and a quake window
    /// that moved is put back into its slot.
    pub fn handle_reported(&mut self, message: ShellMessage) -> MessageResult {
        let result = self.handle(message);
        match message {
            ShellMessage::Sizing { proposed, .. }
            | ShellMessage::Moving { proposed, .. }
            | ShellMessage::WindowPosChanging { proposed, .. } => {
                self.correct_geometry(proposed, result);
            }
            ShellMessage::Move if self.mode() == DisplayMode::Quake => self.refit_quake(),
            _ => {}
        }
        result
    }

    /// Rectangle a rejected quake gesture falls back to
    ///
    /// A proposal that already sits in the quake slot is the shell's own
    /// fit arriving, so it is kept.
    fn pinned_rect(&self, current: Rect, proposed: Rect) -> Rect {
        if self.state.is_quake() && self.state.occupies_quake_slot(&self.os, proposed) {
            proposed
        } else {
            current
        }
    }

    fn after_transition(&mut self, changed: bool) -> bool {
        if changed {
            self.refresh_dpi();
            self.publish_min_track_size();
        }
        changed
    }

    fn refresh_dpi(&mut self) {
        self.dpi = MonitorService::from_window(&self.os, self.window).dpi();
    }

    fn publish_min_track_size(&mut self) {
        let size = self
            .negotiator
            .on_min_max_info(&self.os, self.window, self.state.style());
        log_rejection(
            self.os.set_min_track_size(self.window, size),
            "publish minimum window size",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::platform::ZOrder;
    use crate::window::testing::{monitor, Command, FakePlatform};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorded {
        sizes: Vec<(f32, f32)>,
        themes: Vec<Theme>,
    }

    struct RecordingContent(Rc<RefCell<Recorded>>);

    impl ContentHost for RecordingContent {
        fn resize(&mut self, width: f32, height: f32) {
            self.0.borrow_mut().sizes.push((width, height));
        }

        fn set_theme(&mut self, theme: Theme) {
            self.0.borrow_mut().themes.push(theme);
        }
    }

    fn shell_with(os: FakePlatform, config: Config) -> WindowShell<FakePlatform> {
        let window = os.window;
        WindowShell::new(os, window, &config)
    }

    fn shell() -> WindowShell<FakePlatform> {
        shell_with(FakePlatform::single(), Config::default())
    }

    fn min_track_sizes(os: &FakePlatform) -> Vec<Size> {
        os.commands
            .iter()
            .filter_map(|c| match c {
                Command::MinTrackSize(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_create_places_window_and_publishes_minimum() {
        let mut shell = shell();
        let result = shell.handle(ShellMessage::Create {
            proposed: Rect::xywh(100, 100, 10, 10),
        });
        assert_eq!(result, MessageResult::Handled);
        assert_eq!(shell.platform().rect, Rect::xywh(91, 100, 818, 650));
        assert_eq!(min_track_sizes(shell.platform()), vec![Size::new(478, 222)]);
        assert!(shell.platform().commands.contains(&Command::Title("Area".to_string())));
        assert_eq!(shell.mode(), DisplayMode::Normal);
    }

    #[test]
    fn test_create_in_quake_mode() {
        let mut config = Config::default();
        config.window.quake_mode = true;
        config.window.launch_mode = LaunchMode::Fullscreen;
        let mut shell = shell_with(FakePlatform::single(), config);
        shell.handle(ShellMessage::Create {
            proposed: Rect::xywh(100, 100, 10, 10),
        });
        assert_eq!(shell.mode(), DisplayMode::Quake);
        assert_eq!(shell.platform().rect, Rect::xywh(-8, 0, 1936, 545));
    }

    #[test]
    fn test_launch_modes() {
        for (launch, mode, maximized) in [
            (LaunchMode::Default, DisplayMode::Normal, false),
            (LaunchMode::Maximized, DisplayMode::Maximized, true),
            (LaunchMode::Fullscreen, DisplayMode::Fullscreen, false),
            (LaunchMode::Focus, DisplayMode::Borderless, false),
            (LaunchMode::MaximizedFocus, DisplayMode::Borderless, true),
        ] {
            let mut config = Config::default();
            config.window.launch_mode = launch;
            config.window.always_on_top = true;
            let mut shell = shell_with(FakePlatform::single(), config);
            shell.handle(ShellMessage::Create {
                proposed: Rect::xywh(100, 100, 10, 10),
            });
            assert_eq!(shell.mode(), mode, "{:?}", launch);
            assert_eq!(shell.platform().maximized, maximized, "{:?}", launch);
            assert!(shell.platform().commands.contains(&Command::ZOrder(ZOrder::TopMost)));
        }
    }

    #[test]
    fn test_quake_sizing_and_moving_are_pinned() {
        let mut shell = shell();
        shell.set_quake(true);
        let current = shell.platform().rect;

        let result = shell.handle(ShellMessage::Sizing {
            edge: SizingEdge::Top,
            proposed: current.inflate(0, 30),
            current,
        });
        assert_eq!(result, MessageResult::Rect(current));

        let result = shell.handle(ShellMessage::Moving {
            proposed: current.offset(100, 100),
            current,
        });
        assert_eq!(result, MessageResult::Rect(current));

        let taller = Rect::new(current.left, current.top, current.right, current.bottom + 100);
        let result = shell.handle(ShellMessage::Sizing {
            edge: SizingEdge::Bottom,
            proposed: taller,
            current,
        });
        assert_eq!(result, MessageResult::Rect(taller));
    }

    #[test]
    fn test_quake_window_refits_on_monitor_change() {
        let os = FakePlatform::new(vec![
            monitor(Rect::xywh(0, 0, 1920, 1080), Rect::xywh(0, 0, 1920, 1040), 96),
            monitor(Rect::xywh(1920, 0, 1920, 1080), Rect::xywh(1920, 0, 1920, 1080), 96),
        ]);
        let mut shell = shell_with(os, Config::default());
        shell.set_quake(true);

        let result = shell.handle(ShellMessage::WindowPosChanging {
            proposed: Rect::xywh(2000, 0, 1936, 545),
            no_move: false,
        });
        assert_eq!(result, MessageResult::Rect(Rect::xywh(1912, 0, 1936, 565)));

        shell.set_quake(false);
        let result = shell.handle(ShellMessage::WindowPosChanging {
            proposed: Rect::xywh(2000, 0, 1936, 545),
            no_move: false,
        });
        assert_eq!(result, MessageResult::Unhandled);
    }

    #[test]
    fn test_size_messages_produce_events_and_resize_content() {
        let os = FakePlatform::new(vec![monitor(
            Rect::xywh(0, 0, 2880, 1620),
            Rect::xywh(0, 0, 2880, 1560),
            144,
        )]);
        let mut shell = shell_with(os, Config::default());
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        shell.set_content(Box::new(RecordingContent(recorded.clone())));
        assert_eq!(shell.dpi_scale(), 1.5);

        shell.handle(ShellMessage::Size {
            kind: SizeKind::Maximized,
            client: Size::new(1200, 900),
        });
        assert_eq!(recorded.borrow().sizes, vec![(800.0, 600.0)]);
        assert_eq!(recorded.borrow().themes, vec![Theme::System]);
        assert_eq!(shell.mode(), DisplayMode::Maximized);
        assert_eq!(
            shell.drain_events(),
            vec![
                WindowEvent::VisibilityChanged { visible: true },
                WindowEvent::MaximizeChanged { maximized: true },
            ]
        );
        assert!(shell.drain_events().is_empty());
    }

    #[test]
    fn test_minimized_quake_window_is_hidden() {
        let mut shell = shell();
        shell.set_quake(true);
        shell.platform_mut().commands.clear();
        shell.handle(ShellMessage::Size {
            kind: SizeKind::Minimized,
            client: Size::new(0, 0),
        });
        assert_eq!(shell.platform().shows(), vec![ShowCommand::Hide]);
        assert_eq!(
            shell.drain_events(),
            vec![WindowEvent::VisibilityChanged { visible: false }]
        );
    }

    #[test]
    fn test_auto_hide_on_deactivation() {
        let mut config = Config::default();
        config.window.auto_hide_window = true;
        let mut shell = shell_with(FakePlatform::single(), config);

        shell.handle(ShellMessage::Activate { active: true });
        assert!(shell.platform().shows().is_empty());
        shell.handle(ShellMessage::Activate { active: false });
        assert_eq!(shell.platform().shows(), vec![ShowCommand::Minimize]);

        shell.set_quake(true);
        shell.platform_mut().commands.clear();
        shell.handle(ShellMessage::Activate { active: false });
        assert_eq!(shell.platform().shows(), vec![ShowCommand::Hide]);
        assert_eq!(
            shell.drain_events(),
            vec![
                WindowEvent::Activated { active: true },
                WindowEvent::Activated { active: false },
                WindowEvent::Activated { active: false },
            ]
        );
    }

    #[test]
    fn test_simple_events() {
        let mut shell = shell();
        assert_eq!(shell.handle(ShellMessage::Close), MessageResult::Handled);
        shell.handle(ShellMessage::NonClientButton);
        shell.handle(ShellMessage::Move);
        assert_eq!(
            shell.drain_events(),
            vec![
                WindowEvent::CloseRequested,
                WindowEvent::DragRegionClicked,
                WindowEvent::Moved,
            ]
        );
    }

    #[test]
    fn test_restore_command_leaves_fullscreen() {
        let mut shell = shell();
        assert!(shell.toggle_fullscreen());
        let result = shell.handle(ShellMessage::SysCommand(SysCommand::Restore));
        assert_eq!(result, MessageResult::Handled);
        assert_eq!(shell.mode(), DisplayMode::Normal);
        assert_eq!(shell.platform().rect, Rect::xywh(100, 100, 800, 600));
    }

    #[test]
    fn test_show_window_changed_only_restores_minimized() {
        let mut shell = shell();
        shell.platform_mut().maximized = true;
        shell.show_window_changed(true);
        assert!(shell.platform().shows().is_empty());

        shell.show_window_changed(false);
        assert_eq!(shell.platform().shows(), vec![ShowCommand::Minimize]);
        shell.show_window_changed(true);
        assert_eq!(
            shell.platform().shows(),
            vec![ShowCommand::Minimize, ShowCommand::Restore]
        );
    }

    #[test]
    fn test_toggle_maximize() {
        let mut shell = shell();
        shell.toggle_maximize();
        assert!(shell.platform().maximized);
        assert_eq!(shell.mode(), DisplayMode::Maximized);
        shell.toggle_maximize();
        assert!(!shell.platform().maximized);
        assert_eq!(shell.mode(), DisplayMode::Normal);
    }

    #[test]
    fn test_resize_client_keeps_origin() {
        let mut shell = shell();
        shell.resize_client(Size::new(1000, 700));
        assert_eq!(shell.platform().rect, Rect::xywh(100, 100, 1018, 750));
    }

    #[test]
    fn test_set_theme_repaints() {
        let mut shell = shell();
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        shell.set_content(Box::new(RecordingContent(recorded.clone())));
        shell.set_theme(Theme::Dark);
        assert_eq!(recorded.borrow().themes, vec![Theme::System, Theme::Dark]);
        assert_eq!(shell.platform().commands, vec![Command::Invalidate]);
    }

    #[test]
    fn test_snap_callback_tightens_minimum() {
        let mut shell = shell();
        shell.set_snap_callback(Some(Box::new(|_, v| (v / 10.0).ceil() * 10.0)));
        assert_eq!(
            shell.handle(ShellMessage::GetMinMaxInfo),
            MessageResult::MinTrackSize(Size::new(478, 230))
        );
    }

    #[test]
    fn test_reload_applies_changes() {
        let mut shell = shell();
        let mut config = Config::default();
        config.window.always_on_top = true;
        config.window.title = "Dropdown".to_string();
        config.decorations.titlebar_height = 40;
        shell.apply_config(&config);

        let commands = &shell.platform().commands;
        assert!(commands.contains(&Command::Title("Dropdown".to_string())));
        assert!(commands.contains(&Command::ZOrder(ZOrder::TopMost)));
        assert_eq!(min_track_sizes(shell.platform()), vec![Size::new(478, 230)]);
    }

    #[test]
    fn test_correct_geometry() {
        let mut shell = shell();
        let actual = shell.platform().rect;
        let snapped = Rect::xywh(100, 100, 810, 600);
        assert!(!shell.correct_geometry(actual, MessageResult::Unhandled));
        assert!(!shell.correct_geometry(actual, MessageResult::Rect(actual)));
        assert!(shell.correct_geometry(actual, MessageResult::Rect(snapped)));
        assert_eq!(shell.platform().rect, snapped);

        shell.toggle_fullscreen();
        let actual = shell.platform().rect;
        assert!(!shell.correct_geometry(actual, MessageResult::Rect(snapped)));
        assert_eq!(shell.platform().rect, actual);
    }

    #[test]
    fn test_refit_quake_and_margins() {
        let mut shell = shell();
        assert_eq!(shell.frame_margins(), Rect::new(-9, -41, 9, 9));
        shell.set_quake(true);
        shell.platform_mut().rect = Rect::xywh(300, 200, 1936, 545);
        shell.refit_quake();
        assert_eq!(shell.platform().rect, Rect::xywh(-8, 0, 1936, 545));
    }

    #[test]
    fn test_rejected_quake_keeps_config() {
        let mut shell = shell();
        assert!(shell.toggle_fullscreen());
        assert!(!shell.set_quake(true));
        assert!(!shell.config.quake_mode);
        assert_eq!(shell.mode(), DisplayMode::Fullscreen);

        assert!(shell.toggle_fullscreen());
        assert!(shell.set_quake(true));
        assert!(shell.config.quake_mode);
        assert!(shell.set_quake(false));
        assert!(!shell.config.quake_mode);
    }

    #[test]
    fn test_events_serialize_as_tagged_json() {
        let json = serde_json::to_string(&WindowEvent::MaximizeChanged { maximized: true }).unwrap();
        assert_eq!(json, r#"{"event":"maximize_changed","maximized":true}"#);
        let json = serde_json::to_string(&WindowEvent::CloseRequested).unwrap();
        assert_eq!(json, r#"{"event":"close_requested"}"#);
    }
}
