//! Animation Module
//!
//! Dropdown and retract effect for summoned windows. The window's visible
//! region is clipped to a band that grows from the top (down) or shrinks
//! back to it (up), then the clip is removed.
//!
//! The animation runs to completion on the calling thread. Nothing else is
//! processed until it ends, so the window is never seen half-updated.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::shared::Rect;
use crate::window::platform::{log_rejection, Platform, WindowHandle};

/// Delay between two frames
const FRAME_INTERVAL: Duration = Duration::from_millis(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    /// Reveal from the top edge downwards
    Down,
    /// Retract towards the top edge
    Up,
}

/// Source of elapsed time for the frame loop
pub trait FrameClock {
    fn elapsed(&mut self) -> Duration;

    /// Block until the next frame is due
    fn wait_frame(&mut self);
}

/// Wall-clock time since the animation started
pub struct WallClock {
    start: Instant,
}

impl WallClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl FrameClock for WallClock {
    fn elapsed(&mut self) -> Duration {
        self.start.elapsed()
    }

    fn wait_frame(&mut self) {
        std::thread::sleep(FRAME_INTERVAL);
    }
}

/// Height of the visible band after `elapsed` out of `duration`
pub fn clip_height(elapsed: Duration, duration: Duration, full: i32, direction: SlideDirection) -> i32 {
    if duration.is_zero() {
        return match direction {
            SlideDirection::Down => full,
            SlideDirection::Up => 0,
        };
    }
    let progress = (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0);
    let fraction = match direction {
        SlideDirection::Down => progress,
        SlideDirection::Up => 1.0 - progress,
    };
    (fraction * full as f64) as i32
}

/// Summon/dismiss animator
pub struct SlideAnimator;

impl SlideAnimator {
    /// Play the slide for `duration`, blocking until it is over
    ///
    /// With reduce-motion on, or a zero duration, nothing is drawn.
    pub fn animate<P: Platform + ?Sized>(
        os: &mut P,
        window: WindowHandle,
        duration: Duration,
        direction: SlideDirection,
    ) {
        let duration = if os.reduce_motion() { Duration::ZERO } else { duration };
        Self::animate_with(os, window, duration, direction, &mut WallClock::start());
    }

    /// Frame loop driven by an explicit clock
    pub fn animate_with<P: Platform + ?Sized, C: FrameClock>(
        os: &mut P,
        window: WindowHandle,
        duration: Duration,
        direction: SlideDirection,
        clock: &mut C,
    ) {
        if duration.is_zero() {
            return;
        }
        let full = match os.window_rect(window) {
            Ok(rect) => rect,
            Err(e) => {
                warn!("Skipping slide animation: {}", e);
                return;
            }
        };
        debug!("Sliding {:?} over {:?}", direction, duration);

        let mut last = None;
        let mut draw = |os: &mut P, height: i32| {
            if last == Some(height) {
                return;
            }
            last = Some(height);
            log_rejection(
                os.set_clip_region(window, Some(Rect::new(0, 0, full.width(), height))),
                "clip window region",
            );
            log_rejection(os.flush(), "flush animation frame");
        };

        loop {
            let elapsed = clock.elapsed();
            if elapsed >= duration {
                break;
            }
            draw(&mut *os, clip_height(elapsed, duration, full.height(), direction));
            clock.wait_frame();
        }
        draw(&mut *os, clip_height(duration, duration, full.height(), direction));

        log_rejection(os.set_clip_region(window, None), "reset window region");
        log_rejection(os.flush(), "flush animation frame");
    }
}
