//! Summon Module
//!
//! Global summon and dismiss of the window, typically bound to a hotkey.
//! A summoned window is brought to the front on the monitor the user is
//! working on; summoning it again while it has focus dismisses it.

use std::time::Duration;

use tracing::{debug, info};

use crate::config::{MonitorBehavior, SummonConfig};
use crate::window::animation::{SlideAnimator, SlideDirection};
use crate::window::monitor::{MonitorDescriptor, MonitorService};
use crate::window::placement::move_to_monitor;
use crate::window::platform::{log_rejection, Platform, ShowCommand, WindowHandle, ZOrder};
use crate::window::state::DisplayState;

/// Parameters of one summon request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummonBehavior {
    pub toggle_visibility: bool,
    pub dropdown_duration: Duration,
    pub to_monitor: MonitorBehavior,
}

impl From<&SummonConfig> for SummonBehavior {
    fn from(config: &SummonConfig) -> Self {
        Self {
            toggle_visibility: config.toggle_visibility,
            dropdown_duration: Duration::from_millis(config.dropdown_duration_ms as u64),
            to_monitor: config.monitor,
        }
    }
}

/// What a summon request ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummonOutcome {
    Activated,
    Dismissed,
}

/// Summon the window, or dismiss it when it already has focus and the
/// behavior asks for toggling
pub fn summon<P: Platform + ?Sized>(
    os: &mut P,
    window: WindowHandle,
    state: &mut DisplayState,
    behavior: &SummonBehavior,
) -> SummonOutcome {
    let duration = if os.reduce_motion() {
        Duration::ZERO
    } else {
        behavior.dropdown_duration
    };

    if behavior.toggle_visibility && os.foreground_window() == Some(window) {
        if behavior.to_monitor == MonitorBehavior::ToMouse {
            let cursor = MonitorService::from_cursor(&*os);
            let current = MonitorService::from_window(&*os, window);
            if cursor.rect != current.rect {
                activate(os, window, state, duration, behavior.to_monitor);
                return SummonOutcome::Activated;
            }
        }
        dismiss(os, window, duration);
        return SummonOutcome::Dismissed;
    }

    activate(os, window, state, duration, behavior.to_monitor);
    SummonOutcome::Activated
}

/// Bring the window to the front, restoring it if minimized
///
/// A minimized window drops down with the slide animation when `duration`
/// is non-zero.
pub fn activate<P: Platform + ?Sized>(
    os: &mut P,
    window: WindowHandle,
    state: &mut DisplayState,
    duration: Duration,
    to_monitor: MonitorBehavior,
) {
    let previous = os.foreground_window();
    info!("Summoning window");

    if os.is_minimized(window).unwrap_or(false) {
        // Hidden is not the same as minimized, show first
        if !os.is_visible(window).unwrap_or(true) {
            log_rejection(os.show(window, ShowCommand::Show), "show window");
        }
        log_rejection(os.show(window, ShowCommand::Restore), "restore window");
        follow_user(os, window, state, to_monitor, previous);
        if !duration.is_zero() {
            SlideAnimator::animate(os, window, duration, SlideDirection::Down);
        }
    } else {
        log_rejection(os.set_z_order(window, ZOrder::Top), "raise window");
        log_rejection(os.show(window, ShowCommand::Show), "show window");
        log_rejection(os.activate(window), "activate window");
        follow_user(os, window, state, to_monitor, previous);
    }
}

/// Minimize the window, sliding it up first when `duration` is non-zero
pub fn dismiss<P: Platform + ?Sized>(os: &mut P, window: WindowHandle, duration: Duration) {
    info!("Dismissing window");
    if !duration.is_zero() {
        SlideAnimator::animate(os, window, duration, SlideDirection::Up);
    }
    log_rejection(os.show(window, ShowCommand::Minimize), "minimize window");
}

/// Monitor a summoned window should land on, if any
pub fn target_monitor<P: Platform + ?Sized>(
    os: &P,
    to_monitor: MonitorBehavior,
    previous_foreground: Option<WindowHandle>,
) -> Option<MonitorDescriptor> {
    match to_monitor {
        MonitorBehavior::ToCurrent => previous_foreground
            .and_then(|w| MonitorService::try_from_window(os, w).ok()),
        MonitorBehavior::ToMouse => Some(MonitorService::from_cursor(os)),
        MonitorBehavior::Any => None,
    }
}

fn follow_user<P: Platform + ?Sized>(
    os: &mut P,
    window: WindowHandle,
    state: &mut DisplayState,
    to_monitor: MonitorBehavior,
    previous: Option<WindowHandle>,
) {
    if let Some(target) = target_monitor(&*os, to_monitor, previous) {
        if move_to_monitor(os, window, &target, state) {
            debug!("Summoned onto monitor {:?}", target.rect);
        }
    }
}
