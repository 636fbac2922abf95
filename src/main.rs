//! Area Window
//!
//! Hosts one top-level X11 window and drives its display state: placement,
//! snapped resizing, fullscreen, focus mode, quake mode and the summon hotkey.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use x11rb::protocol::xproto::{ButtonPressEvent, KeyPressEvent};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

use area_window::config::{Config, Theme};
use area_window::shared::{Point, Rect};
use area_window::window::monitor::MonitorService;
use area_window::window::platform::ShowCommand;
use area_window::window::snap::SizingEdge;
use area_window::window::{
    ContentHost, DisplayMode, Platform, ShellMessage, WindowEvent, WindowHandle, WindowShell,
};
use area_window::x11::events::{hit_test, EventTranslator, FrameHit};
use area_window::x11::X11Platform;
use area_window::x11_async::X11EventStream;

// evdev keycodes
const KEY_F8: u8 = 74;
const KEY_F9: u8 = 75;
const KEY_F10: u8 = 76;
const KEY_F11: u8 = 95;
const KEY_F12: u8 = 96;

/// Offset of the launch position from the work-area origin
const LAUNCH_OFFSET: i32 = 64;

/// Requests from the signal handlers
enum Control {
    Shutdown,
    Reload,
}

/// Stand-in for a UI tree, logs the layout it is asked for
struct LoggedContent;

impl ContentHost for LoggedContent {
    fn resize(&mut self, width: f32, height: f32) {
        debug!("Content area {:.1}x{:.1}", width, height);
    }

    fn set_theme(&mut self, theme: Theme) {
        debug!("Content theme {:?}", theme);
    }
}

struct WindowApp {
    x11_stream: X11EventStream,
    shell: WindowShell<X11Platform>,
    translator: EventTranslator,
    config: Config,
}

impl WindowApp {
    fn new(conn: Arc<RustConnection>, screen_num: usize, config: Config) -> Result<Self> {
        let mut platform = X11Platform::new(conn.clone(), screen_num, config.accessibility.reduce_motion)?;

        let work = MonitorService::from_cursor(&platform).work;
        let proposed = Rect::xywh(work.left + LAUNCH_OFFSET, work.top + LAUNCH_OFFSET, 1, 1);
        let window = platform
            .create_window(proposed)
            .context("Failed to create window")?;
        if let Err(e) = platform.grab_key(KEY_F8) {
            warn!("Failed to grab summon key: {}", e);
        }
        let translator = EventTranslator::new(window, platform.root(), *platform.atoms());

        let mut shell = WindowShell::new(platform, window, &config);
        shell.set_content(Box::new(LoggedContent));
        shell.handle(ShellMessage::Create { proposed });
        // Launch modes that map the window themselves are already visible
        if !shell.platform().is_visible(window).unwrap_or(false) {
            shell
                .platform_mut()
                .show(window, ShowCommand::Show)
                .context("Failed to map window")?;
        }

        let x11_stream = X11EventStream::new(conn).context("Failed to create X11 event stream")?;
        info!("Window {:#x} ready in {:?} mode", window.0, shell.mode());

        Ok(Self {
            x11_stream,
            shell,
            translator,
            config,
        })
    }

    fn window(&self) -> WindowHandle {
        self.shell.window()
    }

    async fn run(mut self, mut control: tokio::sync::mpsc::Receiver<Control>) -> Result<()> {
        info!("Starting main event loop");
        let mut event_buffer: Vec<Event> = Vec::new();

        loop {
            if let Err(e) = self.x11_stream.flush() {
                warn!("Failed to flush X11 requests: {}", e);
            }

            for event in event_buffer.drain(..) {
                self.handle_event(&event);
            }
            if self.publish_events() {
                info!("Close requested, exiting");
                return Ok(());
            }

            tokio::select! {
                () = self.x11_stream.wait_readable() => {
                    while let Some(event) = self
                        .x11_stream
                        .poll_next_event()
                        .context("Error polling for X11 events")?
                    {
                        event_buffer.push(event);
                    }
                }
                request = control.recv() => match request {
                    Some(Control::Reload) => self.reload(),
                    Some(Control::Shutdown) | None => {
                        info!("Shutdown signal received");
                        return Ok(());
                    }
                }
            }
        }
    }

    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::KeyPress(e) => self.on_key(e),
            Event::ButtonPress(e) if e.event == self.window().0 => self.on_button(e),
            _ => {}
        }

        let margins = self.shell.frame_margins();
        let messages = self.translator.translate(self.shell.platform(), event, margins);
        for message in messages {
            self.shell.handle_reported(message);
        }
    }

    fn on_key(&mut self, event: &KeyPressEvent) {
        match event.detail {
            KEY_F8 => {
                let outcome = self.shell.summon();
                debug!("Summon: {:?}", outcome);
            }
            KEY_F9 => {
                self.shell.toggle_quake();
            }
            KEY_F10 => {
                let on = !self.shell.state().always_on_top();
                self.shell.set_always_on_top(on);
            }
            KEY_F11 => {
                self.shell.toggle_fullscreen();
            }
            KEY_F12 => {
                self.shell.toggle_borderless();
            }
            _ => {}
        }
    }

    /// Start a window-manager move or resize from the self-drawn frame
    fn on_button(&mut self, event: &ButtonPressEvent) {
        if event.detail != 1 {
            return;
        }
        let Some(size) = self.translator.last_rect().map(|r| r.size()) else {
            return;
        };
        let point = Point::new(event.event_x as i32, event.event_y as i32);
        let Some(hit) = hit_test(point, size, self.shell.frame_margins()) else {
            return;
        };
        let allowed = match self.shell.mode() {
            DisplayMode::Fullscreen => false,
            DisplayMode::Quake => hit == FrameHit::Edge(SizingEdge::Bottom),
            _ => true,
        };
        if !allowed {
            return;
        }
        let window = self.window();
        let root_pointer = Point::new(event.root_x as i32, event.root_y as i32);
        if let Err(e) = self
            .shell
            .platform_mut()
            .begin_move_resize(window, hit, root_pointer, event.detail)
        {
            warn!("Failed to start interactive {:?}: {}", hit, e);
        }
    }

    /// Log drained window events; returns whether closing was requested
    fn publish_events(&mut self) -> bool {
        let mut close = false;
        for event in self.shell.drain_events() {
            close |= event == WindowEvent::CloseRequested;
            match serde_json::to_string(&event) {
                Ok(json) => info!("{}", json),
                Err(e) => warn!("Failed to serialize window event: {}", e),
            }
        }
        close
    }

    fn reload(&mut self) {
        match self.config.reload() {
            Ok(true) => {
                self.shell
                    .platform_mut()
                    .set_reduce_motion(self.config.accessibility.reduce_motion);
                self.shell.apply_config(&self.config);
            }
            Ok(false) => info!("Configuration unchanged"),
            Err(e) => warn!("Failed to reload configuration: {:#}", e),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "area_window=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Area Window");

    let config = Config::load().context("Failed to load configuration")?;

    let (control_tx, control_rx) = tokio::sync::mpsc::channel::<Control>(4);

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sighup = signal(SignalKind::hangup())?;
        tokio::spawn(async move {
            loop {
                let request = tokio::select! {
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down gracefully");
                        Control::Shutdown
                    }
                    _ = sigint.recv() => {
                        info!("Received SIGINT, shutting down gracefully");
                        Control::Shutdown
                    }
                    _ = sighup.recv() => {
                        info!("Received SIGHUP, reloading configuration");
                        Control::Reload
                    }
                };
                let shutdown = matches!(request, Control::Shutdown);
                if control_tx.send(request).await.is_err() || shutdown {
                    return;
                }
            }
        });
    }

    let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to X server")?;
    let conn = Arc::new(conn);
    info!("Connected to X server, screen {}", screen_num);

    let app = WindowApp::new(conn, screen_num, config)?;
    if let Err(e) = app.run(control_rx).await {
        error!("Application error: {:#}", e);
        return Err(e);
    }
    Ok(())
}
