//! Single-threaded scheduling primitives driven by a host-supplied clock.
//!
//! Nothing here owns a timer. The host passes a monotonic `now_ms` into `request`/`poll`
//! (typically once per frame) and the primitive decides whether the deferred work is due.

/// Trailing-edge debounce: collapses a burst of requests into one run, `wait_ms` after the
/// last request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Debounce {
    wait_ms: u64,
    deadline: Option<u64>,
}

impl Debounce {
    pub const fn new(wait_ms: u64) -> Self {
        Self {
            wait_ms,
            deadline: None,
        }
    }

    pub fn wait_ms(&self) -> u64 {
        self.wait_ms
    }

    pub fn set_wait_ms(&mut self, wait_ms: u64) {
        self.wait_ms = wait_ms;
    }

    /// (Re)schedules the run; a newer request supersedes the pending one.
    pub fn request(&mut self, now_ms: u64) {
        self.deadline = Some(now_ms.saturating_add(self.wait_ms));
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    /// Returns `true` exactly once when the pending run is due.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Leading + trailing throttle: at most one run per `wait_ms` window.
///
/// The first request in a quiet window runs immediately; requests inside the window collapse
/// into one trailing run at the window's end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Throttle {
    wait_ms: u64,
    last_run: Option<u64>,
    trailing: bool,
}

impl Throttle {
    pub const fn new(wait_ms: u64) -> Self {
        Self {
            wait_ms,
            last_run: None,
            trailing: false,
        }
    }

    pub fn wait_ms(&self) -> u64 {
        self.wait_ms
    }

    pub fn set_wait_ms(&mut self, wait_ms: u64) {
        self.wait_ms = wait_ms;
    }

    fn window_open(&self, now_ms: u64) -> bool {
        match self.last_run {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.wait_ms,
        }
    }

    /// Returns `true` when the caller should run now (leading edge).
    pub fn request(&mut self, now_ms: u64) -> bool {
        if self.window_open(now_ms) {
            self.last_run = Some(now_ms);
            self.trailing = false;
            return true;
        }
        self.trailing = true;
        false
    }

    /// Returns `true` when a trailing run is due.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if self.trailing && self.window_open(now_ms) {
            self.trailing = false;
            self.last_run = Some(now_ms);
            return true;
        }
        false
    }

    pub fn cancel(&mut self) {
        self.trailing = false;
    }

    pub fn is_pending(&self) -> bool {
        self.trailing
    }

    pub fn deadline(&self) -> Option<u64> {
        if !self.trailing {
            return None;
        }
        self.last_run.map(|last| last.saturating_add(self.wait_ms))
    }
}

/// Work deferred to the next paint ("critical") or to the next idle period.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameQueue {
    critical: bool,
    idle: bool,
    // Frames to skip before `critical` is raised.
    delayed_frames: u8,
}

impl FrameQueue {
    pub fn request_critical(&mut self) {
        self.critical = true;
    }

    pub fn request_idle(&mut self) {
        self.idle = true;
    }

    /// Raises a critical request after `frames` further frames have passed.
    pub fn request_critical_after(&mut self, frames: u8) {
        if frames == 0 {
            self.critical = true;
            return;
        }
        self.delayed_frames = self.delayed_frames.max(frames);
    }

    pub fn has_critical(&self) -> bool {
        self.critical
    }

    pub fn has_idle(&self) -> bool {
        self.idle
    }

    pub fn is_empty(&self) -> bool {
        !self.critical && !self.idle && self.delayed_frames == 0
    }

    /// Advances one frame and reports whether a critical run is due on it.
    ///
    /// A request released by `request_critical_after` is served on the frame after the one
    /// that released it.
    pub fn take_frame(&mut self) -> bool {
        let due = core::mem::take(&mut self.critical);
        if self.delayed_frames > 0 {
            self.delayed_frames -= 1;
            if self.delayed_frames == 0 {
                self.critical = true;
            }
        }
        due
    }

    pub fn take_idle(&mut self) -> bool {
        core::mem::take(&mut self.idle)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
