//! Cadence timers for the preview loop and the quiescence debounce
//!
//! Both cadences are plain state driven by an explicit `now`, owned by the
//! session. Nothing here spawns tasks, so cancelling is a method call and
//! tests can step time deterministically.

use std::time::{Duration, Instant};

use maskpaint_config::EditorConfig;

/// Rate limiter: fires at most once per interval
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_fire: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fire: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Would a fire at `now` respect the interval?
    pub fn ready(&self, now: Instant) -> bool {
        match self.last_fire {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    /// Record a fire at `now` if ready. Returns whether it fired.
    pub fn fire(&mut self, now: Instant) -> bool {
        if !self.ready(now) {
            return false;
        }
        self.last_fire = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.last_fire = None;
    }
}

/// Trailing-edge debounce: fires once `delay` after the last trigger
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// (Re)start the window at `now`
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fire if the window has elapsed. A fired debounce is no longer pending.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Take a pending fire immediately, regardless of the deadline
    pub fn flush(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}

/// Frame-callback loop: runs between `start` and `stop`, paused while hidden
#[derive(Debug, Clone)]
pub struct FrameLoop {
    active: bool,
    visible: bool,
    throttle: Throttle,
}

impl FrameLoop {
    pub fn new(interval: Duration) -> Self {
        Self {
            active: false,
            visible: true,
            throttle: Throttle::new(interval),
        }
    }

    pub fn start(&mut self) {
        self.active = true;
        self.throttle.reset();
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// A frame at `now`: true when the loop should do its work
    pub fn frame(&mut self, now: Instant) -> bool {
        self.active && self.visible && self.throttle.fire(now)
    }
}

/// The two cadences of an editing session
#[derive(Debug, Clone)]
pub struct CadenceScheduler {
    pub preview: FrameLoop,
    pub quiescence: Debounce,
}

impl CadenceScheduler {
    pub fn new(preview_interval: Duration, quiescence_delay: Duration) -> Self {
        Self {
            preview: FrameLoop::new(preview_interval),
            quiescence: Debounce::new(quiescence_delay),
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.preview_throttle(), config.quiescence_delay())
    }

    /// Stop the preview loop and drop any pending regeneration
    pub fn cancel_all(&mut self) {
        self.preview.stop();
        self.quiescence.cancel();
    }
}
